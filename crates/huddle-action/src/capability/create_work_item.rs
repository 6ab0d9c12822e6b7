//! Work-item capability.
//!
//! Files one tracked work item per extracted record and reports the URL the
//! tracker returns.

use std::sync::Arc;

use async_trait::async_trait;
use huddle_core::config::DispatchConfig;

use crate::capability::{Capability, WorkTracker};
use crate::error::ActionError;
use crate::types::{ActionResult, CapabilityName, Outcome, ParameterSet};

const TEMPLATE: &str = "[{ 'title': 'Task title', 'description': 'Task description' }]";
const INSTRUCTION: &str = "Create one or more deliverable and format them in below template";
const REQUIRED_FIELDS: &[&str] = &["title", "description"];

pub struct CreateWorkItemCapability {
    tracker: Arc<dyn WorkTracker>,
    default_title: String,
    default_description: String,
}

impl CreateWorkItemCapability {
    /// Missing titles and descriptions resolve to the dispatch fallback strings.
    pub fn new(tracker: Arc<dyn WorkTracker>, config: &DispatchConfig) -> Self {
        Self {
            tracker,
            default_title: config.fallback_title.clone(),
            default_description: config.fallback_description.clone(),
        }
    }

    fn title<'a>(&'a self, params: &'a ParameterSet) -> &'a str {
        params
            .get_non_empty("title")
            .unwrap_or(self.default_title.as_str())
    }
}

#[async_trait]
impl Capability for CreateWorkItemCapability {
    fn name(&self) -> CapabilityName {
        CapabilityName::CreateWorkItem
    }

    fn parameter_schema_template(&self) -> &str {
        TEMPLATE
    }

    fn extraction_instruction(&self) -> &str {
        INSTRUCTION
    }

    fn required_fields(&self) -> &[&'static str] {
        REQUIRED_FIELDS
    }

    fn outcome(&self) -> Outcome {
        Outcome::new("task", "create", "created")
    }

    async fn execute(&self, params: &ParameterSet) -> Result<ActionResult, ActionError> {
        let title = self.title(params);
        let description = params
            .get_non_empty("description")
            .unwrap_or(self.default_description.as_str());

        let url = self.tracker.create_work_item(title, description).await?;

        Ok(ActionResult::success(
            format!("Task '{}' created", title),
            format!("Task '{}' - {}", title, url),
        ))
    }

    fn describe(&self, params: &ParameterSet) -> String {
        format!("task '{}'", self.title(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTracker {
        created: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl WorkTracker for RecordingTracker {
        async fn create_work_item(
            &self,
            title: &str,
            description: &str,
        ) -> Result<String, ActionError> {
            let mut created = self.created.lock().unwrap();
            created.push((title.to_string(), description.to_string()));
            Ok(format!("https://tracker.example.com/items/{}", created.len()))
        }
    }

    fn capability(tracker: Arc<dyn WorkTracker>) -> CreateWorkItemCapability {
        CreateWorkItemCapability::new(tracker, &DispatchConfig::default())
    }

    #[tokio::test]
    async fn test_create_work_item() {
        let tracker = Arc::new(RecordingTracker::default());
        let cap = capability(tracker.clone());
        let params: ParameterSet = [("title", "Fix login"), ("description", "500 on submit")]
            .into_iter()
            .collect();

        let result = cap.execute(&params).await.unwrap();
        assert!(result.succeeded);
        assert_eq!(result.spoken_summary, "Task 'Fix login' created");
        assert_eq!(
            result.display_text,
            "Task 'Fix login' - https://tracker.example.com/items/1"
        );
        assert_eq!(
            tracker.created.lock().unwrap()[0],
            ("Fix login".to_string(), "500 on submit".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_description_uses_default() {
        let tracker = Arc::new(RecordingTracker::default());
        let cap = capability(tracker.clone());
        let params: ParameterSet = [("title", "Write docs")].into_iter().collect();

        let result = cap.execute(&params).await.unwrap();
        assert!(result.succeeded);
        assert_eq!(tracker.created.lock().unwrap()[0].1, "Create Web API");
    }

    #[tokio::test]
    async fn test_missing_title_uses_default() {
        let cap = capability(Arc::new(RecordingTracker::default()));
        let result = cap.execute(&ParameterSet::new()).await.unwrap();
        assert_eq!(result.spoken_summary, "Task 'Create Web API' created");
    }

    #[test]
    fn test_metadata() {
        let cap = capability(Arc::new(RecordingTracker::default()));
        assert_eq!(cap.name(), CapabilityName::CreateWorkItem);
        assert_eq!(cap.required_fields(), &["title", "description"]);
        assert!(cap.parameter_schema_template().starts_with('['));
        assert_eq!(cap.outcome(), Outcome::new("task", "create", "created"));
        let params: ParameterSet = [("title", "Ship it")].into_iter().collect();
        assert_eq!(cap.describe(&params), "task 'Ship it'");
    }
}
