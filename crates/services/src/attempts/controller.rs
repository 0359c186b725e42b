use std::sync::{Arc, Mutex, MutexGuard};

use assess_core::Clock;
use assess_core::model::{
    AttemptId, AttemptProgress, Choice, CountdownPlan, QuestionId, Session, SessionError,
    SessionStatus, SubmitGate, SubmitTrigger, TestId,
};
use assess_core::timer::{CountdownToken, TickOutcome};
use tracing::{Instrument, Span, debug, info, info_span, warn};

use super::countdown::{self, Countdown};
use super::loader::SessionLoader;
use super::snapshot::AttemptSnapshot;
use super::submitter::Submitter;
use crate::error::{AttemptError, LoadError, Redirect};

/// Where to go once the attempt was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSubmit {
    Result { test_id: TestId },
}

/// Shown before a manual submit that leaves questions unanswered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitConfirmation {
    pub answered: usize,
    pub total: usize,
}

impl SubmitConfirmation {
    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// This call transmitted the attempt.
    Submitted {
        destination: PostSubmit,
        message: Option<String>,
    },
    /// Another call is transmitting; nothing was sent.
    InFlight,
    /// The attempt was accepted earlier; nothing was sent.
    AlreadySubmitted { destination: PostSubmit },
}

impl SubmitOutcome {
    #[must_use]
    pub fn destination(&self) -> Option<PostSubmit> {
        match self {
            SubmitOutcome::Submitted { destination, .. }
            | SubmitOutcome::AlreadySubmitted { destination } => Some(*destination),
            SubmitOutcome::InFlight => None,
        }
    }
}

struct Inner {
    test_id: TestId,
    session: Mutex<Session>,
    countdown: Countdown,
    loader: SessionLoader,
    submitter: Submitter,
    clock: Clock,
    span: Span,
}

/// Drives one attempt: load, answer buffering, countdown and the one-shot submit.
///
/// Cloning shares the attempt. Dropping the last clone stops the countdown task.
#[derive(Clone)]
pub struct AttemptController {
    inner: Arc<Inner>,
}

impl AttemptController {
    /// Create a controller in the `Loading` state. Nothing is fetched until [`AttemptController::load`].
    #[must_use]
    pub fn new(test_id: TestId, loader: SessionLoader, submitter: Submitter, clock: Clock) -> Self {
        let session = Session::new(test_id);
        let span = info_span!(
            "attempt",
            test_id = %test_id,
            attempt_id = %session.attempt_id()
        );
        Self {
            inner: Arc::new(Inner {
                test_id,
                session: Mutex::new(session),
                countdown: Countdown::default(),
                loader,
                submitter,
                clock,
                span,
            }),
        }
    }

    /// Fetch metadata then questions, start the attempt and its countdown.
    ///
    /// A zero time limit submits with `SubmitTrigger::Timeout` right after loading.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Load` with a redirect target when either fetch fails;
    /// the attempt is then unusable. Returns `AttemptError::Session` if called twice.
    pub async fn load(&self) -> Result<CountdownPlan, AttemptError> {
        self.load_inner().instrument(self.inner.span.clone()).await
    }

    async fn load_inner(&self) -> Result<CountdownPlan, AttemptError> {
        let test_id = self.test_id();
        let status = self.session()?.status();
        if status != SessionStatus::Loading {
            return Err(self.invariant(SessionError::InvalidStatus(status)));
        }

        let metadata = match self.inner.loader.load_test(test_id).await {
            Ok(metadata) => metadata,
            Err(err) => return Err(self.load_failed(err, Redirect::Home)),
        };
        let redirect = Redirect::TestList {
            course_id: metadata.course_id,
        };
        let questions = match self.inner.loader.load_questions(test_id).await {
            Ok(questions) => questions,
            Err(err) => return Err(self.load_failed(err, redirect)),
        };

        let plan = {
            let mut session = self.session()?;
            session
                .begin(metadata, questions, self.inner.clock.now())
                .map_err(|e| self.invariant(e))?
        };
        info!(?plan, "attempt started");

        match plan {
            CountdownPlan::Unlimited => {}
            CountdownPlan::Run { seconds } => self.start_countdown(seconds)?,
            CountdownPlan::ExpireImmediately => {
                if let Err(err) = self.submit_inner(SubmitTrigger::Timeout).await {
                    warn!(error = %err, "immediate timeout submission failed");
                }
            }
        }
        Ok(plan)
    }

    fn load_failed(&self, err: LoadError, redirect: Redirect) -> AttemptError {
        warn!(error = %err, ?redirect, "attempt failed to load");
        if let Ok(mut session) = self.session() {
            session.fail_load(err.to_string());
        }
        AttemptError::Load {
            source: err,
            redirect,
        }
    }

    fn start_countdown(&self, seconds: u32) -> Result<(), AttemptError> {
        let token = {
            let mut session = self.session()?;
            session.start_timer(seconds).map_err(|e| self.invariant(e))?
        };
        let weak = Arc::downgrade(&self.inner);
        let span = self.inner.span.clone();
        let handle = countdown::spawn_ticker(move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => AttemptController { inner }.on_tick(token).await,
                    None => false,
                }
            }
            .instrument(span.clone())
        });
        self.inner.countdown.install(handle);
        debug!(seconds, "countdown started");
        Ok(())
    }

    async fn on_tick(&self, token: CountdownToken) -> bool {
        let outcome = match self.session() {
            Ok(mut session) => session.tick(token),
            Err(_) => return false,
        };
        match outcome {
            TickOutcome::Ticked { .. } => true,
            TickOutcome::Inactive => false,
            TickOutcome::Expired => {
                info!("time limit reached");
                if let Err(err) = self.submit_inner(SubmitTrigger::Timeout).await {
                    warn!(error = %err, "timeout submission failed");
                }
                false
            }
        }
    }

    // ─── Answers & navigation ─────────────────────────────────────────────────

    /// Record `choice` for `question_id`, replacing any earlier selection.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Session` for unknown questions or outside `InProgress`.
    pub fn set_answer(&self, question_id: QuestionId, choice: Choice) -> Result<AttemptProgress, AttemptError> {
        let mut session = self.session()?;
        session
            .set_answer(question_id, choice)
            .map_err(|e| self.invariant(e))?;
        Ok(session.progress())
    }

    /// # Errors
    ///
    /// Same as [`AttemptController::set_answer`].
    pub fn clear_answer(&self, question_id: QuestionId) -> Result<AttemptProgress, AttemptError> {
        let mut session = self.session()?;
        session
            .clear_answer(question_id)
            .map_err(|e| self.invariant(e))?;
        Ok(session.progress())
    }

    /// # Errors
    ///
    /// Returns `AttemptError::Poisoned` if the attempt state is unusable.
    pub fn progress(&self) -> Result<AttemptProgress, AttemptError> {
        Ok(self.session()?.progress())
    }

    /// # Errors
    ///
    /// Returns `AttemptError::Session` for an out-of-range index or outside `InProgress`.
    pub fn go_to(&self, index: usize) -> Result<usize, AttemptError> {
        let mut session = self.session()?;
        session.go_to(index).map_err(|e| self.invariant(e))?;
        Ok(session.current_index())
    }

    /// # Errors
    ///
    /// Returns `AttemptError::Session` outside `InProgress` or after teardown.
    pub fn next(&self) -> Result<usize, AttemptError> {
        self.session()?.next().map_err(|e| self.invariant(e))
    }

    /// # Errors
    ///
    /// Same as [`AttemptController::next`].
    pub fn previous(&self) -> Result<usize, AttemptError> {
        self.session()?.previous().map_err(|e| self.invariant(e))
    }

    // ─── Submission ───────────────────────────────────────────────────────────

    /// Confirmation to show before a manual submit; `None` when every question is answered.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Poisoned` if the attempt state is unusable.
    pub fn confirmation_for_manual_submit(&self) -> Result<Option<SubmitConfirmation>, AttemptError> {
        let progress = self.session()?.progress();
        if progress.is_complete() {
            return Ok(None);
        }
        Ok(Some(SubmitConfirmation {
            answered: progress.answered,
            total: progress.total,
        }))
    }

    /// Submit the attempt at most once.
    ///
    /// Calls racing an in-flight submission, or arriving after success, send nothing.
    /// After a failure the next call transmits again.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Submit` when the transmission fails and
    /// `AttemptError::Session` while loading, after a load failure or after teardown.
    pub async fn submit(&self, trigger: SubmitTrigger) -> Result<SubmitOutcome, AttemptError> {
        self.submit_inner(trigger)
            .instrument(self.inner.span.clone())
            .await
    }

    async fn submit_inner(&self, trigger: SubmitTrigger) -> Result<SubmitOutcome, AttemptError> {
        let gate = {
            let mut session = self.session()?;
            session
                .begin_submission(trigger)
                .map_err(|e| self.invariant(e))?
        };
        let destination = PostSubmit::Result {
            test_id: self.test_id(),
        };
        let payload = match gate {
            SubmitGate::Proceed(payload) => payload,
            SubmitGate::InFlight => {
                debug!(%trigger, "submission already in flight");
                return Ok(SubmitOutcome::InFlight);
            }
            SubmitGate::AlreadySubmitted => {
                debug!(%trigger, "attempt already submitted");
                return Ok(SubmitOutcome::AlreadySubmitted { destination });
            }
        };

        info!(%trigger, answered = payload.answers.len(), "submitting attempt");
        match self.inner.submitter.transmit(&payload).await {
            Ok(receipt) => {
                {
                    let mut session = self.session()?;
                    session
                        .complete_submission(self.inner.clock.now())
                        .map_err(|e| self.invariant(e))?;
                }
                info!(%trigger, "attempt submitted");
                Ok(SubmitOutcome::Submitted {
                    destination,
                    message: receipt.message,
                })
            }
            Err(err) => {
                {
                    let mut session = self.session()?;
                    session
                        .fail_submission(err.message.clone())
                        .map_err(|e| self.invariant(e))?;
                }
                warn!(%trigger, error = %err, transient = err.transient, "submission failed");
                Err(AttemptError::Submit(err))
            }
        }
    }

    /// Stop the countdown and refuse further changes. Safe to call more than once.
    pub fn teardown(&self) {
        let aborted = self.inner.countdown.abort();
        if let Ok(mut session) = self.session() {
            if !session.is_closed() {
                session.close();
                let _entered = self.inner.span.enter();
                info!(status = %session.status(), aborted, "attempt closed");
            }
        }
    }

    // ─── Accessors ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn test_id(&self) -> TestId {
        self.inner.test_id
    }

    /// # Errors
    ///
    /// Returns `AttemptError::Poisoned` if the attempt state is unusable.
    pub fn attempt_id(&self) -> Result<AttemptId, AttemptError> {
        Ok(self.session()?.attempt_id())
    }

    /// # Errors
    ///
    /// Returns `AttemptError::Poisoned` if the attempt state is unusable.
    pub fn status(&self) -> Result<SessionStatus, AttemptError> {
        Ok(self.session()?.status())
    }

    /// `-1` for unlimited attempts, `None` until loaded.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Poisoned` if the attempt state is unusable.
    pub fn remaining_seconds(&self) -> Result<Option<i64>, AttemptError> {
        Ok(self.session()?.remaining_seconds())
    }

    /// # Errors
    ///
    /// Returns `AttemptError::Poisoned` if the attempt state is unusable.
    pub fn snapshot(&self) -> Result<AttemptSnapshot, AttemptError> {
        Ok(AttemptSnapshot::capture(&*self.session()?))
    }

    /// Whether a countdown task is still alive.
    #[must_use]
    pub fn countdown_active(&self) -> bool {
        self.inner.countdown.is_active()
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>, AttemptError> {
        self.inner.session.lock().map_err(|_| AttemptError::Poisoned)
    }

    fn invariant(&self, err: SessionError) -> AttemptError {
        let _entered = self.inner.span.enter();
        warn!(error = %err, "rejected attempt operation");
        AttemptError::Session(err)
    }
}

impl std::fmt::Debug for AttemptController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("AttemptController");
        match self.inner.session.lock() {
            Ok(session) => debug.field("session", &*session),
            Err(_) => debug.field("session", &"<poisoned>"),
        };
        debug
            .field("countdown_active", &self.countdown_active())
            .finish()
    }
}
