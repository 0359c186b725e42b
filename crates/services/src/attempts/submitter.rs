use std::sync::Arc;

use assess_core::model::{SubmissionPayload, SubmitReceipt};
use backend::AssessmentBackend;
use tracing::debug;

use crate::error::SubmitError;

/// Transmits a sparse answer payload. Holds no state; the one-shot guard lives in the session.
#[derive(Clone)]
pub struct Submitter {
    backend: Arc<dyn AssessmentBackend>,
}

impl Submitter {
    #[must_use]
    pub fn new(backend: Arc<dyn AssessmentBackend>) -> Self {
        Self { backend }
    }

    /// # Errors
    ///
    /// Returns `SubmitError` when the backend refuses the attempt or cannot be reached.
    pub async fn transmit(&self, payload: &SubmissionPayload) -> Result<SubmitReceipt, SubmitError> {
        debug!(
            test_id = %payload.test_id,
            trigger = %payload.trigger,
            answers = payload.answers.len(),
            "transmitting attempt"
        );
        Ok(self.backend.submit_attempt(payload).await?)
    }
}
