use std::sync::Arc;

use backend::{Backend, BackendConfig, InMemoryBackend};
use tracing::info;

use crate::Clock;
use crate::attempts::AttemptService;
use crate::error::AppServicesError;

/// Assembles app-facing services around one backend.
#[derive(Clone)]
pub struct AppServices {
    attempts: Arc<AttemptService>,
    backend_label: String,
}

impl AppServices {
    /// Build services talking to the REST backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Backend` if the HTTP client cannot be built.
    pub fn new_http(config: BackendConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let label = config.base_url.to_string();
        let backend = Backend::http(config)?;
        info!(base_url = %label, "using REST backend");
        Ok(Self::from_backend(&backend, clock, label))
    }

    /// Build services over an in-memory backend.
    #[must_use]
    pub fn new_in_memory(backend: InMemoryBackend, clock: Clock) -> Self {
        info!("using in-memory backend");
        Self::from_backend(&Backend::from_in_memory(backend), clock, "in-memory".to_string())
    }

    fn from_backend(backend: &Backend, clock: Clock, backend_label: String) -> Self {
        let attempts = Arc::new(AttemptService::new(clock, Arc::clone(&backend.api)));
        Self {
            attempts,
            backend_label,
        }
    }

    #[must_use]
    pub fn attempts(&self) -> Arc<AttemptService> {
        Arc::clone(&self.attempts)
    }

    /// Human-readable description of the backend, for the window footer.
    #[must_use]
    pub fn backend_label(&self) -> &str {
        &self.backend_label
    }
}
