use assess_core::model::{
    AttemptResult, Choice, Question, ReviewedAnswer, SubmissionPayload, SubmitReceipt, TestId,
    TestMetadata,
};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::config::BackendConfig;
use crate::http::HttpBackend;

/// Errors surfaced by backend adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("not found")]
    NotFound,

    #[error("request rejected: {message}")]
    Rejected { message: String },

    #[error("backend responded with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BackendError {
    /// Whether repeating the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Http(_) | BackendError::Connection(_) => true,
            BackendError::HttpStatus(status) => status.is_server_error(),
            BackendError::NotFound
            | BackendError::Rejected { .. }
            | BackendError::InvalidPayload(_)
            | BackendError::InvalidConfig(_) => false,
        }
    }
}

/// Remote collaborator contract for taking a test.
#[async_trait]
pub trait AssessmentBackend: Send + Sync {
    /// Fetch title, time limit and thresholds for a test.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the test does not exist, or other transport errors.
    async fn get_test(&self, test_id: TestId) -> Result<TestMetadata, BackendError>;

    /// Fetch the ordered question set for a new attempt.
    ///
    /// Selection and order are decided by the backend.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the test does not exist, or other transport errors.
    async fn get_attempt_questions(&self, test_id: TestId) -> Result<Vec<Question>, BackendError>;

    /// Transmit the sparse answer payload.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` when the backend refuses the attempt,
    /// or transport errors.
    async fn submit_attempt(&self, payload: &SubmissionPayload) -> Result<SubmitReceipt, BackendError>;

    /// Fetch the graded result of the latest submitted attempt.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if nothing was submitted yet, or transport errors.
    async fn get_result(&self, test_id: TestId) -> Result<AttemptResult, BackendError>;
}

#[derive(Clone)]
struct KeyedQuestion {
    question: Question,
    correct: Choice,
}

/// In-memory backend for tests, demos and offline prototyping.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    tests: Arc<Mutex<HashMap<TestId, TestMetadata>>>,
    questions: Arc<Mutex<HashMap<TestId, Vec<KeyedQuestion>>>>,
    submissions: Arc<Mutex<Vec<SubmissionPayload>>>,
    question_sample: Option<usize>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a shuffled subset of at most `size` questions per attempt.
    #[must_use]
    pub fn with_question_sample(mut self, size: usize) -> Self {
        self.question_sample = Some(size);
        self
    }

    /// # Errors
    ///
    /// Returns `BackendError::Connection` if the store lock is poisoned.
    pub fn insert_test(&self, metadata: TestMetadata) -> Result<(), BackendError> {
        let mut guard = self
            .tests
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard.insert(metadata.test_id, metadata);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `BackendError::Connection` if the store lock is poisoned.
    pub fn insert_question(
        &self,
        test_id: TestId,
        question: Question,
        correct: Choice,
    ) -> Result<(), BackendError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard
            .entry(test_id)
            .or_default()
            .push(KeyedQuestion { question, correct });
        Ok(())
    }

    /// Every payload received so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Connection` if the store lock is poisoned.
    pub fn submissions(&self) -> Result<Vec<SubmissionPayload>, BackendError> {
        let guard = self
            .submissions
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    fn metadata(&self, test_id: TestId) -> Result<TestMetadata, BackendError> {
        let guard = self
            .tests
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard.get(&test_id).cloned().ok_or(BackendError::NotFound)
    }

    fn keyed_questions(&self, test_id: TestId) -> Result<Vec<KeyedQuestion>, BackendError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(guard.get(&test_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl AssessmentBackend for InMemoryBackend {
    async fn get_test(&self, test_id: TestId) -> Result<TestMetadata, BackendError> {
        self.metadata(test_id)
    }

    async fn get_attempt_questions(&self, test_id: TestId) -> Result<Vec<Question>, BackendError> {
        self.metadata(test_id)?;
        let mut questions: Vec<Question> = self
            .keyed_questions(test_id)?
            .into_iter()
            .map(|k| k.question)
            .collect();

        if let Some(size) = self.question_sample {
            let mut rng = rand::rng();
            questions.as_mut_slice().shuffle(&mut rng);
            questions.truncate(size);
        }
        Ok(questions)
    }

    async fn submit_attempt(&self, payload: &SubmissionPayload) -> Result<SubmitReceipt, BackendError> {
        self.metadata(payload.test_id)?;
        let mut guard = self
            .submissions
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard.push(payload.clone());
        Ok(SubmitReceipt {
            message: Some(format!("{} answers recorded", payload.answers.len())),
        })
    }

    async fn get_result(&self, test_id: TestId) -> Result<AttemptResult, BackendError> {
        let metadata = self.metadata(test_id)?;
        let latest = {
            let guard = self
                .submissions
                .lock()
                .map_err(|e| BackendError::Connection(e.to_string()))?;
            guard
                .iter()
                .rev()
                .find(|s| s.test_id == test_id)
                .cloned()
                .ok_or(BackendError::NotFound)?
        };

        let selected: HashMap<_, _> = latest
            .answers
            .iter()
            .map(|a| (a.question_id, a.selected_choice))
            .collect();
        let reviewed = self
            .keyed_questions(test_id)?
            .into_iter()
            .map(|k| ReviewedAnswer {
                question_id: k.question.id(),
                selected: selected.get(&k.question.id()).copied(),
                correct: k.correct,
            })
            .collect();

        Ok(AttemptResult::grade(test_id, reviewed, metadata.passing_score))
    }
}

/// Backend handle behind a trait object for easy swapping.
#[derive(Clone)]
pub struct Backend {
    pub api: Arc<dyn AssessmentBackend>,
}

impl Backend {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(InMemoryBackend::new())
    }

    #[must_use]
    pub fn from_in_memory(backend: InMemoryBackend) -> Self {
        let api: Arc<dyn AssessmentBackend> = Arc::new(backend);
        Self { api }
    }

    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be built.
    pub fn http(config: BackendConfig) -> Result<Self, BackendError> {
        let api: Arc<dyn AssessmentBackend> = Arc::new(HttpBackend::new(config)?);
        Ok(Self { api })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{AnswerEntry, CourseId, QuestionId, SubmitTrigger, TimeLimit};

    fn metadata(id: u64) -> TestMetadata {
        TestMetadata {
            test_id: TestId::new(id),
            course_id: CourseId::new(1),
            title: format!("Test {id}"),
            time_limit: TimeLimit::Unlimited,
            passing_score: Some(50),
            max_attempts: None,
        }
    }

    fn question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            ["a", "b", "c", "d"].map(|s| Some(s.to_string())),
            None,
        )
        .unwrap()
    }

    fn seeded(n: u64) -> InMemoryBackend {
        let backend = InMemoryBackend::new();
        backend.insert_test(metadata(1)).unwrap();
        for i in 1..=n {
            backend.insert_question(TestId::new(1), question(i), Choice::A).unwrap();
        }
        backend
    }

    #[tokio::test]
    async fn unknown_test_is_not_found() {
        let backend = InMemoryBackend::new();
        let err = backend.get_test(TestId::new(9)).await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound));
        let err = backend.get_attempt_questions(TestId::new(9)).await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound));
    }

    #[tokio::test]
    async fn questions_keep_insertion_order() {
        let backend = seeded(3);
        let ids: Vec<_> = backend
            .get_attempt_questions(TestId::new(1))
            .await
            .unwrap()
            .iter()
            .map(Question::id)
            .collect();
        assert_eq!(ids, vec![QuestionId::new(1), QuestionId::new(2), QuestionId::new(3)]);
    }

    #[tokio::test]
    async fn sampling_limits_question_count() {
        let backend = seeded(10).with_question_sample(4);
        let questions = backend.get_attempt_questions(TestId::new(1)).await.unwrap();
        assert_eq!(questions.len(), 4);
    }

    #[tokio::test]
    async fn result_grades_latest_submission() {
        let backend = seeded(4);
        let payload = SubmissionPayload {
            test_id: TestId::new(1),
            trigger: SubmitTrigger::Manual,
            answers: vec![
                AnswerEntry {
                    question_id: QuestionId::new(1),
                    selected_choice: Choice::A,
                },
                AnswerEntry {
                    question_id: QuestionId::new(2),
                    selected_choice: Choice::A,
                },
                AnswerEntry {
                    question_id: QuestionId::new(3),
                    selected_choice: Choice::B,
                },
            ],
        };
        backend.submit_attempt(&payload).await.unwrap();

        let result = backend.get_result(TestId::new(1)).await.unwrap();
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.total_questions, 4);
        assert_eq!(result.score, 50);
        assert!(result.passed);
        assert_eq!(backend.submissions().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn result_before_submission_is_not_found() {
        let backend = seeded(1);
        let err = backend.get_result(TestId::new(1)).await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound));
    }

    #[test]
    fn retryable_classification() {
        assert!(BackendError::Connection("reset".into()).is_retryable());
        assert!(BackendError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY).is_retryable());
        assert!(!BackendError::HttpStatus(reqwest::StatusCode::FORBIDDEN).is_retryable());
        assert!(!BackendError::NotFound.is_retryable());
    }
}
