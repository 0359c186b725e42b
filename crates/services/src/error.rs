//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::model::{CourseId, SessionError, TestId};
use backend::BackendError;

/// Where to send the user when an attempt cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// The test list of the owning course, when its metadata was loaded.
    TestList { course_id: CourseId },
    Home,
}

/// Errors emitted by `SessionLoader`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("test {0} was not found")]
    NotFound(TestId),
    #[error("test data is invalid: {0}")]
    InvalidMetadata(String),
    #[error("could not reach the assessment server: {0}")]
    Network(#[source] BackendError),
}

impl LoadError {
    /// Whether re-running the whole load may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadError::Network(err) if err.is_retryable())
    }

    pub(crate) fn from_backend(test_id: TestId, err: BackendError) -> Self {
        match err {
            BackendError::NotFound => LoadError::NotFound(test_id),
            BackendError::InvalidPayload(message) => LoadError::InvalidMetadata(message),
            other => LoadError::Network(other),
        }
    }
}

/// A failed submission. The attempt stays open for a manual retry.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SubmitError {
    /// User-facing text; the server's own message when it refused the attempt.
    pub message: String,
    /// Hint that the failure looked transient (timeouts, 5xx).
    pub transient: bool,
    #[source]
    pub source: BackendError,
}

impl From<BackendError> for SubmitError {
    fn from(source: BackendError) -> Self {
        let message = match &source {
            BackendError::Rejected { message } => message.clone(),
            other => format!("submission failed: {other}"),
        };
        Self {
            message,
            transient: source.is_retryable(),
            source,
        }
    }
}

/// Errors emitted by `AttemptController` and `AttemptService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("{source}")]
    Load {
        #[source]
        source: LoadError,
        redirect: Redirect,
    },
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("could not fetch the attempt result: {0}")]
    ResultUnavailable(#[source] BackendError),
    #[error("attempt state lock poisoned")]
    Poisoned,
}

impl AttemptError {
    /// Redirect target for a failed load.
    #[must_use]
    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            AttemptError::Load { redirect, .. } => Some(*redirect),
            _ => None,
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_map_to_load_errors() {
        let id = TestId::new(4);
        assert!(matches!(
            LoadError::from_backend(id, BackendError::NotFound),
            LoadError::NotFound(t) if t == id
        ));
        assert!(matches!(
            LoadError::from_backend(id, BackendError::InvalidPayload("bad".into())),
            LoadError::InvalidMetadata(_)
        ));
        let network = LoadError::from_backend(id, BackendError::Connection("reset".into()));
        assert!(network.is_retryable());
    }

    #[test]
    fn rejected_submission_keeps_server_message() {
        let err = SubmitError::from(BackendError::Rejected {
            message: "attempt limit reached".into(),
        });
        assert_eq!(err.to_string(), "attempt limit reached");
        assert!(!err.transient);
    }

    #[test]
    fn only_load_errors_carry_a_redirect() {
        let err = AttemptError::Load {
            source: LoadError::NotFound(TestId::new(1)),
            redirect: Redirect::Home,
        };
        assert_eq!(err.redirect(), Some(Redirect::Home));
        assert_eq!(AttemptError::Poisoned.redirect(), None);
    }
}
