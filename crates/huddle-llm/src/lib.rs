//! Generative model service access for huddle.
//!
//! Defines the `ModelService` contract consumed by classification,
//! parameter extraction, and generic answers, plus an HTTP client and a
//! scripted mock.

pub mod client;
pub mod error;
pub mod mock;
pub mod service;

pub use client::{ApiFormat, HttpModelService};
pub use error::LlmError;
pub use mock::{RecordedRequest, ScriptedModel};
pub use service::{complete_with_deadline, ModelService};
