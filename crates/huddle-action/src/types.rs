//! Core types and value objects for the action engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Identity of a registered capability.
///
/// The set is closed: every variant has exactly one implementation, chosen
/// at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityName {
    SendEmail,
    CreateWorkItem,
}

impl CapabilityName {
    /// Every variant, in presentation order.
    pub const ALL: [CapabilityName; 2] = [CapabilityName::SendEmail, CapabilityName::CreateWorkItem];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityName::SendEmail => "SendEmail",
            CapabilityName::CreateWorkItem => "CreateWorkItem",
        }
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CapabilityName {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SendEmail" => Ok(CapabilityName::SendEmail),
            "CreateWorkItem" => Ok(CapabilityName::CreateWorkItem),
            _ => Err(format!("Unknown capability: {}", s)),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// Structured arguments for one capability invocation.
///
/// Fields absent here are resolved to capability defaults at execution time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet(BTreeMap<String, String>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Value of `field` when present and not blank.
    pub fn get_non_empty(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|v| !v.trim().is_empty())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Outcome of one capability execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Short sentence suitable for speech.
    pub spoken_summary: String,
    /// Line shown in the chat window.
    pub display_text: String,
    /// False when the capability failed and this result describes the failure.
    pub succeeded: bool,
}

impl ActionResult {
    pub fn success(spoken_summary: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            spoken_summary: spoken_summary.into(),
            display_text: display_text.into(),
            succeeded: true,
        }
    }

    /// A user-visible description of a failed execution.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            spoken_summary: message.clone(),
            display_text: message,
            succeeded: false,
        }
    }
}

/// All results of one dispatch merged into a single response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub spoken_summary: String,
    pub display_text: String,
}

/// How a capability's results are phrased when aggregated,
/// e.g. noun "task", infinitive "create", past "created".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub noun: &'static str,
    pub infinitive: &'static str,
    pub past: &'static str,
}

impl Outcome {
    pub const fn new(noun: &'static str, infinitive: &'static str, past: &'static str) -> Self {
        Self {
            noun,
            infinitive,
            past,
        }
    }

    /// `noun` pluralised for `count`.
    pub fn noun_for(&self, count: usize) -> String {
        if count == 1 {
            self.noun.to_string()
        } else {
            format!("{}s", self.noun)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
