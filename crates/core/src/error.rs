use thiserror::Error;

use crate::model::{ChoiceParseError, DurationParseError, QuestionError, SessionError};
use crate::timer::TimerError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Duration(#[from] DurationParseError),
    #[error(transparent)]
    Choice(#[from] ChoiceParseError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Timer(#[from] TimerError),
}
