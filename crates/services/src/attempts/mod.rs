mod controller;
mod countdown;
mod loader;
mod service;
mod snapshot;
mod submitter;

// Public API of the attempt subsystem.
pub use crate::error::{AttemptError, LoadError, Redirect, SubmitError};
pub use controller::{AttemptController, PostSubmit, SubmitConfirmation, SubmitOutcome};
pub use countdown::TICK_PERIOD;
pub use loader::SessionLoader;
pub use service::AttemptService;
pub use snapshot::AttemptSnapshot;
pub use submitter::Submitter;
