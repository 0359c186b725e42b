use chrono::{DateTime, Utc};

use assess_core::model::{
    AttemptId, AttemptProgress, Choice, Question, Session, SessionStatus, TestId, TestMetadata,
};

/// Read-only copy of an attempt for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptSnapshot {
    pub attempt_id: AttemptId,
    pub test_id: TestId,
    pub status: SessionStatus,
    pub metadata: Option<TestMetadata>,
    pub questions: Vec<Question>,
    /// Selection per question, in question order.
    pub selections: Vec<Option<Choice>>,
    pub current_index: usize,
    pub progress: AttemptProgress,
    /// `-1` for unlimited attempts, `None` until loaded.
    pub remaining_seconds: Option<i64>,
    pub last_error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl AttemptSnapshot {
    pub(crate) fn capture(session: &Session) -> Self {
        let questions = session.questions().to_vec();
        let selections = questions
            .iter()
            .map(|q| session.answer_for(q.id()))
            .collect();
        Self {
            attempt_id: session.attempt_id(),
            test_id: session.test_id(),
            status: session.status(),
            metadata: session.metadata().cloned(),
            questions,
            selections,
            current_index: session.current_index(),
            progress: session.progress(),
            remaining_seconds: session.remaining_seconds(),
            last_error: session.last_error().map(str::to_owned),
            started_at: session.started_at(),
            submitted_at: session.submitted_at(),
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    #[must_use]
    pub fn current_selection(&self) -> Option<Choice> {
        self.selections.get(self.current_index).copied().flatten()
    }

    #[must_use]
    pub fn answered_flags(&self) -> Vec<bool> {
        self.selections.iter().map(Option::is_some).collect()
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.title.as_str())
    }
}
