//! Domain types for the Summit conference registration service.
//!
//! Value objects and entities: conferences with bounded seating, sessions
//! hosted inside a conference, and attendee profiles carrying registration
//! and wish-list membership.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a conference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConferenceId(Uuid);

impl ConferenceId {
    /// Creates a new random `ConferenceId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ConferenceId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConferenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random `SessionId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `SessionId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque user identity, as resolved by the external authentication layer.
///
/// The service never mints these itself; they arrive with every
/// authenticated request and double as the profile key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a `UserId` from the external identity string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Domain Entities
// ============================================================================

/// Conference entity with bounded seating.
///
/// `seats_available` starts at `max_attendees` and moves in lockstep with
/// the attendee profiles' membership lists: `0 <= seats_available <=
/// max_attendees` whenever `max_attendees > 0`. A `max_attendees` of zero
/// means the conference was created uncapped and seat tracking is inert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conference {
    /// Unique conference identifier
    pub id: ConferenceId,
    /// Identity of the organizing user (owner)
    pub organizer_user_id: UserId,
    /// Conference name
    pub name: String,
    /// Host city
    pub city: String,
    /// Topics covered, in announcement order
    pub topics: Vec<String>,
    /// Month of the start date (1-12), or 0 when no start date is set
    pub month: u32,
    /// Seating capacity fixed at creation (0 = uncapped)
    pub max_attendees: u32,
    /// Seats still open for registration
    pub seats_available: u32,
    /// First day of the conference
    pub start_date: Option<NaiveDate>,
    /// Last day of the conference
    pub end_date: Option<NaiveDate>,
}

/// Session entity, hosted inside a conference.
///
/// Seat semantics mirror [`Conference`] at session granularity; wish-list
/// additions consume seats, removals return them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: SessionId,
    /// Conference this session belongs to (ancestor scope)
    pub conference_id: ConferenceId,
    /// Identity of the organizing user who created the session
    pub organizer_user_id: UserId,
    /// Session name
    pub name: String,
    /// Speaker, if one has been assigned
    pub speaker: Option<String>,
    /// Kind of session (workshop, lecture, keynote, ...)
    pub session_type: Option<String>,
    /// Free-form highlights blurb
    pub highlights: Option<String>,
    /// Planned duration in minutes
    pub duration_minutes: Option<u32>,
    /// Month of the start date (1-12), or 0 when no start date is set
    pub month: u32,
    /// Seating capacity fixed at creation (0 = uncapped)
    pub max_attendees: u32,
    /// Seats still open for wish-listing
    pub seats_available: u32,
    /// First day of the session
    pub start_date: Option<NaiveDate>,
    /// Last day of the session
    pub end_date: Option<NaiveDate>,
}

/// Attendee profile, keyed 1:1 by user identity.
///
/// Created lazily on first access. The two membership lists are
/// duplicate-free; a key appears in one iff the user currently holds a
/// reserved seat at that conference or session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// User identity this profile belongs to
    pub user_id: UserId,
    /// Display name shown alongside organized conferences
    pub display_name: String,
    /// Primary contact email
    pub main_email: String,
    /// Tee-shirt size choice
    pub tee_shirt_size: TeeShirtSize,
    /// Conferences the user holds a seat at
    pub conferences_to_attend: Vec<ConferenceId>,
    /// Sessions on the user's wish list, each holding a seat
    pub wish_list: Vec<SessionId>,
}

impl Profile {
    /// Creates a fresh profile with empty membership lists
    #[must_use]
    pub const fn new(user_id: UserId, display_name: String, main_email: String) -> Self {
        Self {
            user_id,
            display_name,
            main_email,
            tee_shirt_size: TeeShirtSize::NotSpecified,
            conferences_to_attend: Vec::new(),
            wish_list: Vec::new(),
        }
    }

    /// Creates the minimal profile used when a registration action arrives
    /// before the user ever opened their profile. The display name falls
    /// back to the identity string; a later profile save fills real values.
    #[must_use]
    pub fn lazy(user_id: &UserId) -> Self {
        Self::new(user_id.clone(), user_id.as_str().to_owned(), String::new())
    }

    /// Checks whether the user holds a seat at the given conference
    #[must_use]
    pub fn attends(&self, conference: &ConferenceId) -> bool {
        self.conferences_to_attend.contains(conference)
    }

    /// Checks whether the session is on the user's wish list
    #[must_use]
    pub fn wishes(&self, session: &SessionId) -> bool {
        self.wish_list.contains(session)
    }
}

/// Tee-shirt size enumeration, fixed set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeeShirtSize {
    /// No size chosen yet
    #[default]
    #[serde(rename = "NOT_SPECIFIED")]
    NotSpecified,
    /// Extra small, men's cut
    #[serde(rename = "XS_M")]
    XsM,
    /// Extra small, women's cut
    #[serde(rename = "XS_W")]
    XsW,
    /// Small, men's cut
    #[serde(rename = "S_M")]
    SM,
    /// Small, women's cut
    #[serde(rename = "S_W")]
    SW,
    /// Medium, men's cut
    #[serde(rename = "M_M")]
    MM,
    /// Medium, women's cut
    #[serde(rename = "M_W")]
    MW,
    /// Large, men's cut
    #[serde(rename = "L_M")]
    LM,
    /// Large, women's cut
    #[serde(rename = "L_W")]
    LW,
    /// Extra large, men's cut
    #[serde(rename = "XL_M")]
    XlM,
    /// Extra large, women's cut
    #[serde(rename = "XL_W")]
    XlW,
    /// Double extra large, men's cut
    #[serde(rename = "XXL_M")]
    XxlM,
    /// Double extra large, women's cut
    #[serde(rename = "XXL_W")]
    XxlW,
    /// Triple extra large, men's cut
    #[serde(rename = "XXXL_M")]
    XxxlM,
    /// Triple extra large, women's cut
    #[serde(rename = "XXXL_W")]
    XxxlW,
}

/// Month number (1-12) of an optional calendar date, 0 when unset.
#[must_use]
pub fn month_of(date: Option<NaiveDate>) -> u32 {
    date.map_or(0, |d| d.month())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_month_of() {
        assert_eq!(month_of(None), 0);
        let june = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(month_of(Some(june)), 6);
    }

    #[test]
    fn test_lazy_profile_defaults() {
        let user = UserId::new("user@example.com");
        let profile = Profile::lazy(&user);
        assert_eq!(profile.display_name, "user@example.com");
        assert_eq!(profile.tee_shirt_size, TeeShirtSize::NotSpecified);
        assert!(profile.conferences_to_attend.is_empty());
        assert!(profile.wish_list.is_empty());
    }

    #[test]
    fn test_tee_shirt_size_serialization() {
        let size = serde_json::to_string(&TeeShirtSize::XlW).unwrap();
        assert_eq!(size, "\"XL_W\"");
        let parsed: TeeShirtSize = serde_json::from_str("\"NOT_SPECIFIED\"").unwrap();
        assert_eq!(parsed, TeeShirtSize::NotSpecified);
    }
}
