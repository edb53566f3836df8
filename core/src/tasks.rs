//! Task dispatcher port: fire-and-forget background job submission.
//!
//! Delivery is at-least-once with no ordering guarantee; the core never
//! observes a job's result. Two well-known targets exist: featured-speaker
//! derivation and the confirmation email sent after conference creation
//! (the email itself is handled outside the core).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Task target that recomputes the featured-speaker summary.
pub const SET_FEATURED_SPEAKER_TASK: &str = "set_featured_speaker";

/// Task target that sends the conference-creation confirmation email.
pub const SEND_CONFIRMATION_EMAIL_TASK: &str = "send_confirmation_email";

/// Errors surfaced by task dispatcher implementations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dispatch backend refused the submission
    #[error("dispatch backend error: {0}")]
    Backend(String),
}

/// A background job submission: a named target plus a string parameter map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Name of the job target to invoke
    pub target: String,
    /// Job parameters
    pub params: HashMap<String, String>,
}

impl TaskRequest {
    /// Creates a request for the given target with no parameters
    #[must_use]
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_owned(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter, builder-style
    #[must_use]
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_owned(), value.into());
        self
    }

    /// Looks up a parameter by name
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Capability contract for the external task dispatcher.
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    /// Submit a job; returns once the dispatcher has accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Backend`] if the submission is refused.
    async fn submit(&self, task: TaskRequest) -> Result<(), DispatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_request_builder() {
        let task = TaskRequest::new(SET_FEATURED_SPEAKER_TASK)
            .with_param("speaker", "Ada Lovelace")
            .with_param("conference_id", "abc");
        assert_eq!(task.target, SET_FEATURED_SPEAKER_TASK);
        assert_eq!(task.param("speaker"), Some("Ada Lovelace"));
        assert_eq!(task.param("missing"), None);
    }
}
