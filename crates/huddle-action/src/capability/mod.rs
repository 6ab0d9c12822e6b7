//! Capability trait definition and the closed set of implementations.
//!
//! A capability is a named, side-effecting unit the dispatcher can invoke.
//! Each one tells the extractor what records to produce (schema template
//! plus instruction) and resolves missing fields to its own defaults.

pub mod create_work_item;
pub mod notifier;
pub mod registry;
pub mod send_email;
pub mod tracker;

use async_trait::async_trait;

use crate::error::ActionError;
use crate::types::{ActionResult, CapabilityName, Outcome, ParameterSet};

pub use create_work_item::CreateWorkItemCapability;
pub use notifier::{LogNotifier, Notifier, WebhookNotifier};
pub use send_email::SendEmailCapability;
pub use tracker::{HttpWorkTracker, WorkTracker};

#[async_trait]
pub trait Capability: Send + Sync {
    fn name(&self) -> CapabilityName;

    /// Example record(s) the extractor asks the model to imitate.
    fn parameter_schema_template(&self) -> &str;

    /// Task-specific directive placed ahead of the schema template.
    fn extraction_instruction(&self) -> &str;

    /// Keys every extracted record must carry to count as well formed.
    fn required_fields(&self) -> &[&'static str] {
        &[]
    }

    fn outcome(&self) -> Outcome;

    /// Perform the side effect once for `params`.
    ///
    /// Absent optional fields resolve to defaults; only a failing downstream
    /// dependency is an error.
    async fn execute(&self, params: &ParameterSet) -> Result<ActionResult, ActionError>;

    /// Short human description of what `execute` would do with `params`.
    fn describe(&self, params: &ParameterSet) -> String;
}
