//! Email capability.
//!
//! Sends a notification-style email. Subject and message are optional in the
//! extracted record and fall back to configured defaults.

use std::sync::Arc;

use async_trait::async_trait;
use huddle_core::config::NotificationConfig;

use crate::capability::{Capability, Notifier};
use crate::error::ActionError;
use crate::types::{ActionResult, CapabilityName, Outcome, ParameterSet};

const TEMPLATE: &str = "{ 'subject': 'Your subject here', 'message': 'Your message here' }";
const INSTRUCTION: &str =
    "Write the email the user asked for, with a short subject and a message body, \
     and format it in below template";

pub struct SendEmailCapability {
    notifier: Arc<dyn Notifier>,
    default_subject: String,
    default_message: String,
}

impl SendEmailCapability {
    pub fn new(notifier: Arc<dyn Notifier>, config: &NotificationConfig) -> Self {
        Self {
            notifier,
            default_subject: config.default_subject.clone(),
            default_message: config.default_message.clone(),
        }
    }

    fn subject<'a>(&'a self, params: &'a ParameterSet) -> &'a str {
        params
            .get_non_empty("subject")
            .unwrap_or(self.default_subject.as_str())
    }
}

#[async_trait]
impl Capability for SendEmailCapability {
    fn name(&self) -> CapabilityName {
        CapabilityName::SendEmail
    }

    fn parameter_schema_template(&self) -> &str {
        TEMPLATE
    }

    fn extraction_instruction(&self) -> &str {
        INSTRUCTION
    }

    fn outcome(&self) -> Outcome {
        Outcome::new("email", "send", "sent")
    }

    async fn execute(&self, params: &ParameterSet) -> Result<ActionResult, ActionError> {
        let subject = self.subject(params);
        let message = params
            .get_non_empty("message")
            .unwrap_or(self.default_message.as_str());

        let receipt = self.notifier.send(subject, message).await?;

        let summary = format!("Email sent - {}", subject);
        let display = match receipt {
            Some(id) => format!("{} ({})", summary, id),
            None => summary.clone(),
        };
        Ok(ActionResult::success(summary, display))
    }

    fn describe(&self, params: &ParameterSet) -> String {
        format!("email '{}'", self.subject(params))
    }
}
