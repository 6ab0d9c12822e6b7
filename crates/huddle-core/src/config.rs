use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HuddleError, Result};

/// Top-level configuration for the huddle assistant.
///
/// Loaded from `~/.huddle/config.toml` by default. Every section falls back
/// to its defaults when absent from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HuddleConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub work_tracker: WorkTrackerConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
}

impl HuddleConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HuddleConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HuddleError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Generative model service connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat completions endpoint. Anthropic URLs switch the request format.
    pub api_url: String,
    /// API key. Empty means read `LLM_API_KEY` from the environment.
    pub api_key: String,
    /// Model or deployment name.
    pub model: String,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Transport-level timeout for a single request.
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1024,
            request_timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// The configured key, or `LLM_API_KEY` when the file leaves it empty.
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

/// Persona and conversation window for generic answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// System prompt for free-form answers. Output may be spoken aloud.
    pub system_prompt: String,
    /// Number of user/assistant turns kept per session.
    pub context_turns: usize,
    /// Idle minutes after which a session starts over.
    pub session_timeout_minutes: u32,
    /// Maximum accepted utterance length in characters.
    pub max_message_length: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a team assistant taking part in meetings and chats. \
                Your answers may be played back as audio, so keep them brief and clear, \
                ideally under 250 words. If the question is unclear or you do not know \
                the answer, politely say so."
                .to_string(),
            context_turns: 10,
            session_timeout_minutes: 30,
            max_message_length: 2000,
        }
    }
}

/// Action dispatch tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Timeout for the classification round-trip. Expiry routes to NO_ACTION.
    pub classify_timeout_secs: u64,
    /// Timeout for the extraction round-trip. Expiry yields the fallback set.
    pub extract_timeout_secs: u64,
    /// Run multiple parameter sets concurrently.
    pub parallel_execution: bool,
    /// Title of the placeholder parameter set used when extraction fails.
    pub fallback_title: String,
    /// Description of the placeholder parameter set used when extraction fails.
    pub fallback_description: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            classify_timeout_secs: 15,
            extract_timeout_secs: 30,
            parallel_execution: false,
            fallback_title: "Create Web API".to_string(),
            fallback_description: "Create Web API".to_string(),
        }
    }
}

/// Work-tracking integration used by the work-item capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkTrackerConfig {
    /// Organization URL, e.g. `https://dev.azure.com/contoso`.
    pub base_url: String,
    /// Project that receives new work items.
    pub project: String,
    /// Work item type to create.
    pub work_item_type: String,
    /// Access token. Empty means read `WORK_TRACKER_TOKEN` from the environment.
    pub access_token: String,
    /// Per-request timeout for tracker calls.
    pub request_timeout_secs: u64,
}

impl Default for WorkTrackerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            project: String::new(),
            work_item_type: "Task".to_string(),
            access_token: String::new(),
            request_timeout_secs: 30,
        }
    }
}

impl WorkTrackerConfig {
    /// The configured token, or `WORK_TRACKER_TOKEN` when the file leaves it empty.
    pub fn resolve_access_token(&self) -> Option<String> {
        if !self.access_token.is_empty() {
            return Some(self.access_token.clone());
        }
        std::env::var("WORK_TRACKER_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
    }
}

/// Notification delivery used by the email capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Optional webhook receiving `{subject, message}` JSON. Unset means log only.
    pub webhook_url: Option<String>,
    /// Subject used when the conversation did not yield one.
    pub default_subject: String,
    /// Body used when the conversation did not yield one.
    pub default_message: String,
    /// Per-request timeout for webhook calls.
    pub request_timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            default_subject: "Default Mail Subject".to_string(),
            default_message: String::new(),
            request_timeout_secs: 30,
        }
    }
}
