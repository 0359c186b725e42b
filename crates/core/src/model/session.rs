use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::model::{
    AnswerEntry, AnswerStore, AttemptId, AttemptProgress, Choice, Question, QuestionId,
    TestId, TestMetadata, TimeLimit,
};
use crate::timer::{CountdownToken, TickOutcome, TimerEngine, TimerError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("question {0} is not part of this attempt")]
    UnknownQuestion(QuestionId),

    #[error("question {0} appears more than once in the loaded set")]
    DuplicateQuestion(QuestionId),

    #[error("question index {index} is out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("metadata for test {got} does not belong to session for test {expected}")]
    TestMismatch { expected: TestId, got: TestId },

    #[error("operation not allowed while session is {0}")]
    InvalidStatus(SessionStatus),

    #[error("session has been closed")]
    Closed,

    #[error(transparent)]
    Timer(#[from] TimerError),
}

/// Which step of the attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Metadata or questions could not be loaded. Not recoverable.
    Load,
    /// Submission failed; a manual retry is allowed.
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    InProgress,
    Submitting,
    Submitted,
    Failed(FailureStage),
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Submitted | SessionStatus::Failed(FailureStage::Load)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Loading => "loading",
            SessionStatus::InProgress => "in progress",
            SessionStatus::Submitting => "submitting",
            SessionStatus::Submitted => "submitted",
            SessionStatus::Failed(FailureStage::Load) => "failed to load",
            SessionStatus::Failed(FailureStage::Submit) => "failed to submit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Timeout,
}

impl fmt::Display for SubmitTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitTrigger::Manual => f.write_str("manual"),
            SubmitTrigger::Timeout => f.write_str("timeout"),
        }
    }
}

/// Sparse answer set handed to the submit collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub test_id: TestId,
    pub trigger: SubmitTrigger,
    pub answers: Vec<AnswerEntry>,
}

/// Decision of the one-shot submit guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitGate {
    /// The caller owns the submission and must report back with
    /// [`Session::complete_submission`] or [`Session::fail_submission`].
    Proceed(SubmissionPayload),
    /// Another submission is on the wire.
    InFlight,
    /// The attempt was already accepted by the backend.
    AlreadySubmitted,
}

/// How the countdown should be driven once the session is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPlan {
    Unlimited,
    /// A zero-length limit: submit right away without ticking.
    ExpireImmediately,
    Run { seconds: u32 },
}

/// One assessment attempt, from load to submission.
pub struct Session {
    attempt_id: AttemptId,
    test_id: TestId,
    metadata: Option<TestMetadata>,
    questions: Vec<Question>,
    current_index: usize,
    answers: AnswerStore,
    timer: TimerEngine,
    status: SessionStatus,
    started_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
    last_trigger: Option<SubmitTrigger>,
    submit_attempts: u32,
    last_error: Option<String>,
    closed: bool,
}

impl Session {
    #[must_use]
    pub fn new(test_id: TestId) -> Self {
        Self {
            attempt_id: AttemptId::generate(),
            test_id,
            metadata: None,
            questions: Vec::new(),
            current_index: 0,
            answers: AnswerStore::default(),
            timer: TimerEngine::new(),
            status: SessionStatus::Loading,
            started_at: None,
            submitted_at: None,
            last_trigger: None,
            submit_attempts: 0,
            last_error: None,
            closed: false,
        }
    }

    /// Install loaded metadata and questions and move to `InProgress`.
    ///
    /// Every question gets an unanswered entry. The countdown is not started here;
    /// the returned plan tells the owner what to do with it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidStatus` unless the session is `Loading`.
    /// Returns `SessionError::TestMismatch` if the metadata is for another test.
    /// Returns `SessionError::DuplicateQuestion` if two questions share an id.
    pub fn begin(
        &mut self,
        metadata: TestMetadata,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<CountdownPlan, SessionError> {
        self.ensure_open()?;
        if self.status != SessionStatus::Loading {
            return Err(SessionError::InvalidStatus(self.status));
        }
        if metadata.test_id != self.test_id {
            return Err(SessionError::TestMismatch {
                expected: self.test_id,
                got: metadata.test_id,
            });
        }

        let mut seen = HashSet::with_capacity(questions.len());
        if let Some(repeated) = questions.iter().map(Question::id).find(|id| !seen.insert(*id)) {
            return Err(SessionError::DuplicateQuestion(repeated));
        }

        let plan = match metadata.time_limit {
            TimeLimit::Unlimited => CountdownPlan::Unlimited,
            TimeLimit::Limited { seconds: 0 } => CountdownPlan::ExpireImmediately,
            TimeLimit::Limited { seconds } => CountdownPlan::Run { seconds },
        };

        self.answers = AnswerStore::for_questions(&questions);
        self.questions = questions;
        self.current_index = 0;
        self.metadata = Some(metadata);
        self.started_at = Some(started_at);
        self.status = SessionStatus::InProgress;
        Ok(plan)
    }

    /// Mark the load as failed. The session cannot be reused afterwards.
    pub fn fail_load(&mut self, message: impl Into<String>) {
        if self.status == SessionStatus::Loading {
            self.status = SessionStatus::Failed(FailureStage::Load);
            self.last_error = Some(message.into());
        }
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidStatus` unless the session is `InProgress`.
    /// Returns `SessionError::Timer` if the duration is zero or the countdown already finished.
    pub fn start_timer(&mut self, seconds: u32) -> Result<CountdownToken, SessionError> {
        self.ensure_in_progress()?;
        Ok(self.timer.start(seconds)?)
    }

    /// Advance the countdown. Ticks outside `InProgress` are ignored.
    pub fn tick(&mut self, token: CountdownToken) -> TickOutcome {
        if self.closed || self.status != SessionStatus::InProgress {
            return TickOutcome::Inactive;
        }
        self.timer.tick(token)
    }

    /// Stop the countdown; a no-op when it is not running.
    pub fn stop_timer(&mut self) -> bool {
        self.timer.stop()
    }

    /// Stop the countdown and refuse any further mutation.
    pub fn close(&mut self) {
        self.timer.stop();
        self.closed = true;
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ─── Answers ───────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` for ids outside the loaded set.
    /// Returns `SessionError::InvalidStatus` unless the session is `InProgress`.
    pub fn set_answer(&mut self, question_id: QuestionId, choice: Choice) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.answers.set(question_id, Some(choice))
    }

    /// # Errors
    ///
    /// Same as [`Session::set_answer`].
    pub fn clear_answer(&mut self, question_id: QuestionId) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.answers.set(question_id, None)
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<Choice> {
        self.answers.get(question_id)
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    #[must_use]
    pub fn progress(&self) -> AttemptProgress {
        self.answers.progress()
    }

    // ─── Navigation ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// # Errors
    ///
    /// Returns `SessionError::IndexOutOfRange` if `index` is past the last question.
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if index >= self.questions.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        self.current_index = index;
        Ok(())
    }

    /// Move to the next question, staying on the last one. Returns the new index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidStatus` unless the session is `InProgress`.
    pub fn next(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
        }
        Ok(self.current_index)
    }

    /// Move to the previous question, staying on the first one. Returns the new index.
    ///
    /// # Errors
    ///
    /// Same as [`Session::next`].
    pub fn previous(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(self.current_index)
    }

    // ─── Submission ────────────────────────────────────────────────────────────

    /// One-shot guard in front of the submit collaborator.
    ///
    /// Check and transition happen in the same call, so two triggers racing on the
    /// same session can never both receive `SubmitGate::Proceed`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidStatus` while loading or after a load failure.
    /// Returns `SessionError::Closed` after teardown.
    pub fn begin_submission(&mut self, trigger: SubmitTrigger) -> Result<SubmitGate, SessionError> {
        self.ensure_open()?;
        match self.status {
            SessionStatus::InProgress | SessionStatus::Failed(FailureStage::Submit) => {}
            SessionStatus::Submitting => return Ok(SubmitGate::InFlight),
            SessionStatus::Submitted => return Ok(SubmitGate::AlreadySubmitted),
            other => return Err(SessionError::InvalidStatus(other)),
        }

        self.timer.stop();
        self.status = SessionStatus::Submitting;
        self.last_trigger = Some(trigger);
        self.submit_attempts = self.submit_attempts.saturating_add(1);
        self.last_error = None;

        Ok(SubmitGate::Proceed(SubmissionPayload {
            test_id: self.test_id,
            trigger,
            answers: self.answers.sparse_entries(),
        }))
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidStatus` unless a submission is in flight.
    pub fn complete_submission(&mut self, submitted_at: DateTime<Utc>) -> Result<(), SessionError> {
        if self.status != SessionStatus::Submitting {
            return Err(SessionError::InvalidStatus(self.status));
        }
        self.status = SessionStatus::Submitted;
        self.submitted_at = Some(submitted_at);
        Ok(())
    }

    /// Record a failed submission and reopen the guard for a manual retry.
    ///
    /// The countdown is not resumed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidStatus` unless a submission is in flight.
    pub fn fail_submission(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        if self.status != SessionStatus::Submitting {
            return Err(SessionError::InvalidStatus(self.status));
        }
        self.status = SessionStatus::Failed(FailureStage::Submit);
        self.last_error = Some(message.into());
        Ok(())
    }

    // ─── Accessors ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn test_id(&self) -> TestId {
        self.test_id
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&TestMetadata> {
        self.metadata.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    /// Remaining seconds using the `-1` sentinel for unlimited attempts.
    ///
    /// Returns `None` while loading or before the countdown started.
    #[must_use]
    pub fn remaining_seconds(&self) -> Option<i64> {
        let limit = self.metadata.as_ref()?.time_limit;
        match limit {
            TimeLimit::Unlimited => Some(limit.as_sentinel_seconds()),
            TimeLimit::Limited { seconds: 0 } => Some(0),
            TimeLimit::Limited { .. } => self.timer.remaining_seconds().map(i64::from),
        }
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    #[must_use]
    pub fn last_trigger(&self) -> Option<SubmitTrigger> {
        self.last_trigger
    }

    /// Number of times the submit guard let a submission through.
    #[must_use]
    pub fn submit_attempts(&self) -> u32 {
        self.submit_attempts
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.status == SessionStatus::InProgress {
            Ok(())
        } else {
            Err(SessionError::InvalidStatus(self.status))
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("attempt_id", &self.attempt_id)
            .field("test_id", &self.test_id)
            .field("status", &self.status)
            .field("questions_len", &self.questions.len())
            .field("current_index", &self.current_index)
            .field("answered", &self.answers.answered_count())
            .field("timer", &self.timer.state())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CourseId;
    use crate::time::fixed_now;
    use crate::timer::TimerState;

    fn metadata(test_id: u64, time_limit: TimeLimit) -> TestMetadata {
        TestMetadata {
            test_id: TestId::new(test_id),
            course_id: CourseId::new(1),
            title: "Ownership basics".to_string(),
            time_limit,
            passing_score: Some(60),
            max_attempts: Some(3),
        }
    }

    fn questions(n: u64) -> Vec<Question> {
        (1..=n)
            .map(|i| {
                Question::new(
                    QuestionId::new(i * 10),
                    format!("Q{i}"),
                    ["a", "b", "c", "d"].map(|s| Some(s.to_string())),
                    None,
                )
                .unwrap()
            })
            .collect()
    }

    fn started(n: u64, time_limit: TimeLimit) -> Session {
        let mut session = Session::new(TestId::new(1));
        session.begin(metadata(1, time_limit), questions(n), fixed_now()).unwrap();
        session
    }

    #[test]
    fn begin_prepopulates_every_answer() {
        let session = started(3, TimeLimit::Unlimited);
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.answers().len(), session.questions().len());
        for q in session.questions() {
            assert!(session.answers().contains(q.id()));
            assert_eq!(session.answer_for(q.id()), None);
        }
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn begin_reports_countdown_plan() {
        let mut unlimited = Session::new(TestId::new(1));
        let plan = unlimited
            .begin(metadata(1, TimeLimit::Unlimited), questions(1), fixed_now())
            .unwrap();
        assert_eq!(plan, CountdownPlan::Unlimited);
        assert_eq!(unlimited.remaining_seconds(), Some(-1));
        assert_eq!(unlimited.timer().state(), TimerState::Idle);

        let mut zero = Session::new(TestId::new(1));
        let plan = zero
            .begin(metadata(1, TimeLimit::Limited { seconds: 0 }), questions(1), fixed_now())
            .unwrap();
        assert_eq!(plan, CountdownPlan::ExpireImmediately);

        let mut timed = Session::new(TestId::new(1));
        let plan = timed
            .begin(metadata(1, TimeLimit::Limited { seconds: 90 }), questions(1), fixed_now())
            .unwrap();
        assert_eq!(plan, CountdownPlan::Run { seconds: 90 });
    }

    #[test]
    fn begin_rejects_foreign_metadata() {
        let mut session = Session::new(TestId::new(1));
        let err = session
            .begin(metadata(2, TimeLimit::Unlimited), questions(1), fixed_now())
            .unwrap_err();
        assert!(matches!(err, SessionError::TestMismatch { .. }));
        assert_eq!(session.status(), SessionStatus::Loading);
    }

    #[test]
    fn answers_require_in_progress() {
        let mut session = Session::new(TestId::new(1));
        let err = session.set_answer(QuestionId::new(10), Choice::A).unwrap_err();
        assert_eq!(err, SessionError::InvalidStatus(SessionStatus::Loading));
    }

    #[test]
    fn clear_answer_returns_entry_to_unanswered() {
        let mut session = started(2, TimeLimit::Unlimited);
        let id = session.questions()[0].id();
        session.set_answer(id, Choice::B).unwrap();
        assert_eq!(session.progress().answered, 1);
        session.clear_answer(id).unwrap();
        assert_eq!(session.progress().answered, 0);
        assert_eq!(session.answers().len(), 2);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut session = started(3, TimeLimit::Unlimited);
        assert_eq!(session.previous(), Ok(0));
        assert_eq!(session.next(), Ok(1));
        assert_eq!(session.next(), Ok(2));
        assert_eq!(session.next(), Ok(2));
        session.go_to(0).unwrap();
        assert_eq!(
            session.go_to(3),
            Err(SessionError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn begin_rejects_repeated_question_ids() {
        let mut repeated = questions(2);
        repeated.push(repeated[0].clone());
        let mut session = Session::new(TestId::new(1));
        let err = session
            .begin(metadata(1, TimeLimit::Unlimited), repeated, fixed_now())
            .unwrap_err();
        assert_eq!(err, SessionError::DuplicateQuestion(QuestionId::new(10)));
        assert_eq!(session.status(), SessionStatus::Loading);
        assert!(session.questions().is_empty());
    }

    #[test]
    fn navigation_is_refused_after_close() {
        let mut session = started(3, TimeLimit::Unlimited);
        assert_eq!(session.next(), Ok(1));
        session.close();
        assert_eq!(session.next(), Err(SessionError::Closed));
        assert_eq!(session.previous(), Err(SessionError::Closed));
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn navigation_on_empty_attempt_is_noop() {
        let mut session = started(0, TimeLimit::Unlimited);
        assert_eq!(session.next(), Ok(0));
        assert!(session.current_question().is_none());
        assert_eq!(session.progress().percent, 100);
    }

    #[test]
    fn guard_lets_exactly_one_submission_through() {
        let mut session = started(2, TimeLimit::Limited { seconds: 60 });
        session.start_timer(60).unwrap();

        let first = session.begin_submission(SubmitTrigger::Manual).unwrap();
        assert!(matches!(first, SubmitGate::Proceed(_)));
        assert_eq!(session.timer().state(), TimerState::Stopped);

        let second = session.begin_submission(SubmitTrigger::Timeout).unwrap();
        assert_eq!(second, SubmitGate::InFlight);
        assert_eq!(session.submit_attempts(), 1);

        session.complete_submission(fixed_now()).unwrap();
        assert_eq!(
            session.begin_submission(SubmitTrigger::Manual).unwrap(),
            SubmitGate::AlreadySubmitted
        );
        assert!(session.status().is_terminal());
    }

    #[test]
    fn failed_submission_reopens_the_guard() {
        let mut session = started(1, TimeLimit::Unlimited);
        let _ = session.begin_submission(SubmitTrigger::Manual).unwrap();
        session.fail_submission("503").unwrap();
        assert_eq!(session.status(), SessionStatus::Failed(FailureStage::Submit));
        assert_eq!(session.last_error(), Some("503"));

        let retry = session.begin_submission(SubmitTrigger::Manual).unwrap();
        assert!(matches!(retry, SubmitGate::Proceed(_)));
        assert_eq!(session.submit_attempts(), 2);
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn failed_timeout_submission_does_not_resume_countdown() {
        let mut session = started(1, TimeLimit::Limited { seconds: 1 });
        let token = session.start_timer(1).unwrap();
        assert_eq!(session.tick(token), TickOutcome::Expired);
        let _ = session.begin_submission(SubmitTrigger::Timeout).unwrap();
        session.fail_submission("offline").unwrap();
        assert_eq!(session.tick(token), TickOutcome::Inactive);
        assert_eq!(session.remaining_seconds(), Some(0));
    }

    #[test]
    fn payload_is_sparse() {
        let mut session = started(5, TimeLimit::Unlimited);
        let ids: Vec<_> = session.questions().iter().map(Question::id).collect();
        session.set_answer(ids[0], Choice::A).unwrap();
        session.set_answer(ids[4], Choice::C).unwrap();

        let SubmitGate::Proceed(payload) = session.begin_submission(SubmitTrigger::Manual).unwrap()
        else {
            panic!("expected proceed");
        };
        assert_eq!(payload.answers.len(), 2);
        assert_eq!(payload.answers[0].question_id, ids[0]);
        assert_eq!(payload.answers[0].selected_choice, Choice::A);
        assert_eq!(payload.answers[1].question_id, ids[4]);
        assert_eq!(payload.answers[1].selected_choice, Choice::C);
    }

    #[test]
    fn submission_refused_while_loading_or_after_load_failure() {
        let mut session = Session::new(TestId::new(1));
        assert!(session.begin_submission(SubmitTrigger::Manual).is_err());
        session.fail_load("not found");
        assert_eq!(session.status(), SessionStatus::Failed(FailureStage::Load));
        assert!(session.status().is_terminal());
        assert!(session.begin_submission(SubmitTrigger::Timeout).is_err());
    }

    #[test]
    fn closed_session_rejects_mutation_and_stops_timer() {
        let mut session = started(1, TimeLimit::Limited { seconds: 30 });
        let token = session.start_timer(30).unwrap();
        session.close();
        assert_eq!(session.timer().state(), TimerState::Stopped);
        assert_eq!(session.tick(token), TickOutcome::Inactive);
        let id = session.questions()[0].id();
        assert_eq!(session.set_answer(id, Choice::A), Err(SessionError::Closed));
        assert_eq!(
            session.begin_submission(SubmitTrigger::Timeout),
            Err(SessionError::Closed)
        );
    }
}
