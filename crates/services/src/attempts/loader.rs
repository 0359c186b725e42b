use std::collections::HashSet;
use std::sync::Arc;

use assess_core::model::{Question, TestId, TestMetadata};
use backend::AssessmentBackend;
use tracing::debug;

use crate::error::LoadError;

/// Fetches what an attempt needs before it can start.
#[derive(Clone)]
pub struct SessionLoader {
    backend: Arc<dyn AssessmentBackend>,
}

impl SessionLoader {
    #[must_use]
    pub fn new(backend: Arc<dyn AssessmentBackend>) -> Self {
        Self { backend }
    }

    /// Title, time limit and thresholds for `test_id`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` for an unknown test, `LoadError::InvalidMetadata`
    /// for an unparseable duration and `LoadError::Network` for transport failures.
    pub async fn load_test(&self, test_id: TestId) -> Result<TestMetadata, LoadError> {
        let metadata = self
            .backend
            .get_test(test_id)
            .await
            .map_err(|e| LoadError::from_backend(test_id, e))?;
        if metadata.test_id != test_id {
            return Err(LoadError::InvalidMetadata(format!(
                "requested test {test_id}, received test {}",
                metadata.test_id
            )));
        }
        debug!(%test_id, limit = %metadata.time_limit, "loaded test metadata");
        Ok(metadata)
    }

    /// The ordered question set for a new attempt. An empty set is valid.
    ///
    /// # Errors
    ///
    /// Same as [`SessionLoader::load_test`]; a set repeating a question id is
    /// `LoadError::InvalidMetadata`.
    pub async fn load_questions(&self, test_id: TestId) -> Result<Vec<Question>, LoadError> {
        let questions = self
            .backend
            .get_attempt_questions(test_id)
            .await
            .map_err(|e| LoadError::from_backend(test_id, e))?;
        let mut seen = HashSet::with_capacity(questions.len());
        if let Some(repeated) = questions.iter().map(Question::id).find(|id| !seen.insert(*id)) {
            return Err(LoadError::InvalidMetadata(format!(
                "question {repeated} appears more than once in test {test_id}"
            )));
        }
        debug!(%test_id, count = questions.len(), "loaded questions");
        Ok(questions)
    }
}
