//! Immutable name to capability map, built once at startup.

use std::collections::HashMap;
use std::sync::Arc;

use huddle_core::config::HuddleConfig;

use crate::capability::{
    Capability, CreateWorkItemCapability, Notifier, SendEmailCapability, WorkTracker,
};
use crate::error::ActionError;
use crate::types::CapabilityName;

/// Collects capabilities before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    capabilities: HashMap<CapabilityName, Arc<dyn Capability>>,
    order: Vec<CapabilityName>,
}

impl RegistryBuilder {
    /// Add a capability under its own name. Registering a name twice keeps
    /// the first position and the latest implementation.
    pub fn register(mut self, capability: Arc<dyn Capability>) -> Self {
        let name = capability.name();
        if self.capabilities.insert(name, capability).is_some() {
            tracing::warn!(capability = %name, "Capability registered twice, replacing");
        } else {
            self.order.push(name);
        }
        self
    }

    pub fn build(self) -> CapabilityRegistry {
        tracing::info!(count = self.order.len(), "Capability registry built");
        CapabilityRegistry {
            capabilities: self.capabilities,
            order: self.order,
        }
    }
}

/// Read-only capability registry. Safe to share across turns behind an `Arc`.
pub struct CapabilityRegistry {
    capabilities: HashMap<CapabilityName, Arc<dyn Capability>>,
    order: Vec<CapabilityName>,
}

impl CapabilityRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Register the full capability set with the given downstream integrations.
    pub fn with_defaults(
        config: &HuddleConfig,
        tracker: Arc<dyn WorkTracker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::builder()
            .register(Arc::new(SendEmailCapability::new(
                notifier,
                &config.notification,
            )))
            .register(Arc::new(CreateWorkItemCapability::new(
                tracker,
                &config.dispatch,
            )))
            .build()
    }

    /// Resolve a name as produced by classification.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Capability>, ActionError> {
        name.parse::<CapabilityName>()
            .ok()
            .and_then(|n| self.get(n))
            .ok_or_else(|| ActionError::UnknownCapability(name.to_string()))
    }

    pub fn get(&self, name: CapabilityName) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(&name).cloned()
    }

    /// Registered names in registration order.
    pub fn list_names(&self) -> &[CapabilityName] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
