#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod http;
pub mod wire;

pub use client::{AssessmentBackend, Backend, BackendError, InMemoryBackend};
pub use config::BackendConfig;
pub use http::HttpBackend;
