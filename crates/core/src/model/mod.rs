mod answers;
mod choice;
mod ids;
mod metadata;
mod question;
mod result;
mod session;

pub use ids::{AttemptId, CourseId, ParseIdError, QuestionId, TestId};

pub use answers::{AnswerEntry, AnswerStore, AttemptProgress};
pub use choice::{Choice, ChoiceParseError};
pub use question::{Question, QuestionError, QuestionOption};
pub use result::{AttemptResult, ReviewedAnswer, SubmitReceipt};
pub use session::{
    CountdownPlan, FailureStage, Session, SessionError, SessionStatus, SubmissionPayload,
    SubmitGate, SubmitTrigger,
};
pub use metadata::{DurationParseError, TestMetadata, TimeLimit, UNLIMITED_SENTINEL};
