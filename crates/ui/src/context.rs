use std::sync::{Arc, Mutex};

use assess_core::model::TestId;
use services::AttemptService;

pub trait UiApp: Send + Sync {
    fn attempts(&self) -> Arc<AttemptService>;
    fn backend_label(&self) -> String;

    /// Test to open right after launch, if any.
    fn launch_test_id(&self) -> Option<TestId> {
        None
    }
}

#[derive(Clone)]
pub struct AppContext {
    attempts: Arc<AttemptService>,
    backend_label: String,
    launch_test_once: Arc<Mutex<Option<TestId>>>,
    flash: Arc<Mutex<Option<String>>>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            attempts: app.attempts(),
            backend_label: app.backend_label(),
            launch_test_once: Arc::new(Mutex::new(app.launch_test_id())),
            flash: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn attempts(&self) -> Arc<AttemptService> {
        Arc::clone(&self.attempts)
    }

    #[must_use]
    pub fn backend_label(&self) -> &str {
        &self.backend_label
    }

    /// The launch test id, handed out once.
    #[must_use]
    pub fn take_launch_test_id(&self) -> Option<TestId> {
        self.launch_test_once.lock().ok().and_then(|mut slot| slot.take())
    }

    /// Leave a message for the next page, e.g. why the user was redirected.
    pub fn set_flash(&self, message: impl Into<String>) {
        if let Ok(mut slot) = self.flash.lock() {
            *slot = Some(message.into());
        }
    }

    #[must_use]
    pub fn take_flash(&self) -> Option<String> {
        self.flash.lock().ok().and_then(|mut slot| slot.take())
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
