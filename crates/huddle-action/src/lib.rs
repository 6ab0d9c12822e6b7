//! Action dispatch engine for huddle.
//!
//! Decides whether an utterance maps to one of a closed set of capabilities,
//! extracts structured parameters for it from the conversation, runs the
//! capability once per parameter set, and merges the outcomes into a single
//! spoken and displayed response.

pub mod aggregate;
pub mod capability;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod extract;
pub mod intent;
pub mod types;

pub use aggregate::aggregate;
pub use capability::registry::{CapabilityRegistry, RegistryBuilder};
pub use capability::Capability;
pub use dispatcher::ActionDispatcher;
pub use error::{ActionError, ExtractError};
pub use executor::ActionExecutor;
pub use extract::{parse_parameter_sets, ParameterExtractor};
pub use intent::{Intent, IntentClassifier, NO_ACTION};
pub use types::{ActionResult, AggregatedResult, CapabilityName, Outcome, ParameterSet};
