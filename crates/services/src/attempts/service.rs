use std::sync::Arc;

use assess_core::Clock;
use assess_core::model::{AttemptResult, TestId};
use backend::AssessmentBackend;
use tracing::debug;

use super::controller::AttemptController;
use super::loader::SessionLoader;
use super::submitter::Submitter;
use crate::error::AttemptError;

/// Creates attempts and fetches their graded results.
#[derive(Clone)]
pub struct AttemptService {
    clock: Clock,
    backend: Arc<dyn AssessmentBackend>,
}

impl AttemptService {
    #[must_use]
    pub fn new(clock: Clock, backend: Arc<dyn AssessmentBackend>) -> Self {
        Self { clock, backend }
    }

    /// A controller in the `Loading` state; call [`AttemptController::load`] to start it.
    #[must_use]
    pub fn prepare(&self, test_id: TestId) -> AttemptController {
        AttemptController::new(
            test_id,
            SessionLoader::new(Arc::clone(&self.backend)),
            Submitter::new(Arc::clone(&self.backend)),
            self.clock,
        )
    }

    /// Prepare and load an attempt.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Load` when the test or its questions cannot be fetched.
    pub async fn start_attempt(&self, test_id: TestId) -> Result<AttemptController, AttemptError> {
        let controller = self.prepare(test_id);
        controller.load().await?;
        Ok(controller)
    }

    /// Graded result of the latest submitted attempt.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::ResultUnavailable` if the backend has no result or cannot be reached.
    pub async fn fetch_result(&self, test_id: TestId) -> Result<AttemptResult, AttemptError> {
        let result = self
            .backend
            .get_result(test_id)
            .await
            .map_err(AttemptError::ResultUnavailable)?;
        debug!(%test_id, score = result.score, passed = result.passed, "fetched result");
        Ok(result)
    }
}
