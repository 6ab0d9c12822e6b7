//! Intent classification.
//!
//! Maps an utterance to one registered capability or to NO_ACTION. The
//! model does the judging; this module owns the prompt and the strict
//! interpretation of its reply.

pub mod classifier;

pub use classifier::{Intent, IntentClassifier, NO_ACTION};
