//! Builders producing fully populated domain entities with sensible test
//! defaults.

use chrono::NaiveDate;
use summit_core::types::{month_of, TeeShirtSize};
use summit_core::{Conference, ConferenceId, Profile, Session, SessionId, UserId};

/// Builder for [`Conference`] fixtures.
pub struct ConferenceBuilder {
    conference: Conference,
}

impl ConferenceBuilder {
    /// Starts a conference named `name`, organized by `"organizer"`, with
    /// 100 open seats in `"Default City"`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            conference: Conference {
                id: ConferenceId::new(),
                organizer_user_id: UserId::new("organizer"),
                name: name.to_owned(),
                city: "Default City".to_owned(),
                topics: vec!["Default".to_owned(), "Topic".to_owned()],
                month: 0,
                max_attendees: 100,
                seats_available: 100,
                start_date: None,
                end_date: None,
            },
        }
    }

    /// Sets the organizer.
    #[must_use]
    pub fn organizer(mut self, user: &str) -> Self {
        self.conference.organizer_user_id = UserId::new(user);
        self
    }

    /// Sets the host city.
    #[must_use]
    pub fn city(mut self, city: &str) -> Self {
        self.conference.city = city.to_owned();
        self
    }

    /// Replaces the topic list.
    #[must_use]
    pub fn topics(mut self, topics: &[&str]) -> Self {
        self.conference.topics = topics.iter().map(|t| (*t).to_owned()).collect();
        self
    }

    /// Sets capacity and open seats together.
    #[must_use]
    pub const fn seats(mut self, seats: u32) -> Self {
        self.conference.max_attendees = seats;
        self.conference.seats_available = seats;
        self
    }

    /// Leaves capacity untouched but overrides the open seat count.
    #[must_use]
    pub const fn seats_available(mut self, seats: u32) -> Self {
        self.conference.seats_available = seats;
        self
    }

    /// Sets the date range and derives the month.
    #[must_use]
    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.conference.start_date = Some(start);
        self.conference.end_date = Some(end);
        self.conference.month = month_of(Some(start));
        self
    }

    /// Finishes the fixture.
    #[must_use]
    pub fn build(self) -> Conference {
        self.conference
    }
}

/// Builder for [`Session`] fixtures.
pub struct SessionBuilder {
    session: Session,
}

impl SessionBuilder {
    /// Starts a session named `name` under the given conference, with 20
    /// open seats and no speaker.
    #[must_use]
    pub fn new(conference: ConferenceId, name: &str) -> Self {
        Self {
            session: Session {
                id: SessionId::new(),
                conference_id: conference,
                organizer_user_id: UserId::new("organizer"),
                name: name.to_owned(),
                speaker: None,
                session_type: None,
                highlights: None,
                duration_minutes: None,
                month: 0,
                max_attendees: 20,
                seats_available: 20,
                start_date: None,
                end_date: None,
            },
        }
    }

    /// Assigns a speaker.
    #[must_use]
    pub fn speaker(mut self, speaker: &str) -> Self {
        self.session.speaker = Some(speaker.to_owned());
        self
    }

    /// Sets the session type.
    #[must_use]
    pub fn session_type(mut self, kind: &str) -> Self {
        self.session.session_type = Some(kind.to_owned());
        self
    }

    /// Sets capacity and open seats together.
    #[must_use]
    pub const fn seats(mut self, seats: u32) -> Self {
        self.session.max_attendees = seats;
        self.session.seats_available = seats;
        self
    }

    /// Finishes the fixture.
    #[must_use]
    pub fn build(self) -> Session {
        self.session
    }
}

/// Builder for [`Profile`] fixtures.
pub struct ProfileBuilder {
    profile: Profile,
}

impl ProfileBuilder {
    /// Starts a profile for the given user id, using the id as the display
    /// name.
    #[must_use]
    pub fn new(user: &str) -> Self {
        Self {
            profile: Profile::lazy(&UserId::new(user)),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, name: &str) -> Self {
        self.profile.display_name = name.to_owned();
        self
    }

    /// Sets the contact email.
    #[must_use]
    pub fn email(mut self, email: &str) -> Self {
        self.profile.main_email = email.to_owned();
        self
    }

    /// Sets the tee-shirt size.
    #[must_use]
    pub const fn tee_shirt_size(mut self, size: TeeShirtSize) -> Self {
        self.profile.tee_shirt_size = size;
        self
    }

    /// Marks the user as registered for a conference.
    #[must_use]
    pub fn attending(mut self, conference: ConferenceId) -> Self {
        self.profile.conferences_to_attend.push(conference);
        self
    }

    /// Adds a session to the wish list.
    #[must_use]
    pub fn wishing(mut self, session: SessionId) -> Self {
        self.profile.wish_list.push(session);
        self
    }

    /// Finishes the fixture.
    #[must_use]
    pub fn build(self) -> Profile {
        self.profile
    }
}
