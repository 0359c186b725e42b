//! JSON shapes exchanged with the REST backend, and their mapping to domain types.
//!
//! Field names are camelCase on the wire.

use assess_core::model::{
    AttemptResult, Choice, CourseId, Question, QuestionId, ReviewedAnswer, SubmissionPayload,
    SubmitReceipt, TestId, TestMetadata, TimeLimit,
};
use serde::{Deserialize, Serialize};

use crate::client::BackendError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestMetadataDto {
    pub test_id: u64,
    pub title: String,
    #[serde(default)]
    pub duration_string: Option<String>,
    #[serde(default)]
    pub passing_score: Option<u32>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    pub course_id: u64,
}

impl TestMetadataDto {
    /// # Errors
    ///
    /// Returns `BackendError::InvalidPayload` if the duration string is malformed.
    pub fn into_domain(self) -> Result<TestMetadata, BackendError> {
        let time_limit = TimeLimit::from_duration_string(self.duration_string.as_deref())
            .map_err(|e| BackendError::InvalidPayload(e.to_string()))?;
        Ok(TestMetadata {
            test_id: TestId::new(self.test_id),
            course_id: CourseId::new(self.course_id),
            title: self.title,
            time_limit,
            passing_score: self.passing_score,
            max_attempts: self.max_attempts,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub question_id: u64,
    /// Blank or null for image-only questions.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub option_a: Option<String>,
    #[serde(default)]
    pub option_b: Option<String>,
    #[serde(default)]
    pub option_c: Option<String>,
    #[serde(default)]
    pub option_d: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl QuestionDto {
    /// # Errors
    ///
    /// Returns `BackendError::InvalidPayload` if the question has neither prompt nor image,
    /// or no options.
    pub fn into_domain(self) -> Result<Question, BackendError> {
        Question::new(
            QuestionId::new(self.question_id),
            self.content.unwrap_or_default(),
            [self.option_a, self.option_b, self.option_c, self.option_d],
            self.image_path,
        )
        .map_err(|e| BackendError::InvalidPayload(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    pub test_id: u64,
    pub answers: Vec<AnswerDto>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDto {
    pub question_id: u64,
    pub selected_choice: Choice,
}

impl From<&SubmissionPayload> for SubmitAttemptRequest {
    fn from(payload: &SubmissionPayload) -> Self {
        Self {
            test_id: payload.test_id.value(),
            answers: payload
                .answers
                .iter()
                .map(|a| AnswerDto {
                    question_id: a.question_id.value(),
                    selected_choice: a.selected_choice,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmitAttemptResponse {
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` when `success` is false.
    pub fn into_receipt(self) -> Result<SubmitReceipt, BackendError> {
        if self.success {
            Ok(SubmitReceipt {
                message: self.message,
            })
        } else {
            Err(BackendError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "submission was not accepted".to_string()),
            })
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedAnswerDto {
    pub question_id: u64,
    #[serde(default)]
    pub selected_choice: Option<String>,
    pub correct_choice: Choice,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResultDto {
    pub test_id: u64,
    pub score: u32,
    pub passed: bool,
    pub correct_count: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub answers: Vec<ReviewedAnswerDto>,
}

impl AttemptResultDto {
    /// # Errors
    ///
    /// Returns `BackendError::InvalidPayload` for an unknown selected choice letter.
    pub fn into_domain(self) -> Result<AttemptResult, BackendError> {
        let answers = self
            .answers
            .into_iter()
            .map(|a| -> Result<ReviewedAnswer, BackendError> {
                // The backend sends "" for questions left unanswered.
                let selected = match a.selected_choice.as_deref().map(str::trim) {
                    None | Some("") => None,
                    Some(raw) => Some(
                        raw.parse::<Choice>()
                            .map_err(|e| BackendError::InvalidPayload(e.to_string()))?,
                    ),
                };
                Ok(ReviewedAnswer {
                    question_id: QuestionId::new(a.question_id),
                    selected,
                    correct: a.correct_choice,
                })
            })
            .collect::<Result<Vec<_>, BackendError>>()?;

        Ok(AttemptResult {
            test_id: TestId::new(self.test_id),
            score: self.score.min(100),
            passed: self.passed,
            correct_count: self.correct_count,
            total_questions: self.total_questions,
            answers,
        })
    }
}
