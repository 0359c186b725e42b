use dioxus::prelude::*;
use services::{AttemptError, LoadError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    NotFound,
    Unavailable,
    NoResult,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::NotFound => "This test does not exist.",
            ViewError::Unavailable => "The assessment server could not be reached. Please try again.",
            ViewError::NoResult => "No submitted attempt was found for this test.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&AttemptError> for ViewError {
    fn from(err: &AttemptError) -> Self {
        match err {
            AttemptError::Load {
                source: LoadError::NotFound(_),
                ..
            } => ViewError::NotFound,
            AttemptError::Load { .. } => ViewError::Unavailable,
            AttemptError::ResultUnavailable(source) if source.is_retryable() => {
                ViewError::Unavailable
            }
            AttemptError::ResultUnavailable(_) => ViewError::NoResult,
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
