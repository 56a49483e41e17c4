//! # Capability Registry
//!
//! Ordered arena of registered components. Each record caches what the
//! component declared in `describe`, so capability lookups never call back
//! into the component.
//!
//! Registration order is preserved and is the basis of the start order.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::DuplicatePolicy;
use crate::domain::descriptor::{CapabilityKey, Descriptor, Hooks};
use crate::domain::inject::SlotBinder;
use crate::domain::{Component, ComponentId};
use crate::error::{LifecycleError, LifecycleResult};

/// A registered component and everything it declared.
pub(crate) struct ComponentRecord {
    pub id: ComponentId,
    /// Address of the `Arc` allocation; identity is reference equality.
    identity: usize,
    /// Keeps the component alive for as long as the manager is.
    _component: Arc<dyn Component>,
    pub descriptor: Descriptor,
}

impl ComponentRecord {
    pub fn hooks(&self) -> &Hooks {
        &self.descriptor.hooks
    }

    pub fn slots(&self) -> &[Box<dyn SlotBinder>] {
        &self.descriptor.slots
    }

    pub fn provides(&self, key: &CapabilityKey) -> bool {
        self.descriptor.provides_key(key)
    }
}

/// Ordered registry of components.
pub(crate) struct ComponentRegistry {
    records: Vec<ComponentRecord>,
    duplicate_policy: DuplicatePolicy,
}

impl ComponentRegistry {
    pub fn new(duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            records: Vec::new(),
            duplicate_policy,
        }
    }

    /// Append a component and cache its declarations.
    ///
    /// Under [`DuplicatePolicy::Ignore`] a repeated instance yields the id of
    /// its first registration.
    pub fn register(&mut self, component: Arc<dyn Component>) -> LifecycleResult<ComponentId> {
        let identity = identity_of(&component);

        if let Some(existing) = self.records.iter().find(|r| r.identity == identity) {
            return match self.duplicate_policy {
                DuplicatePolicy::Reject => Err(LifecycleError::DuplicateComponent {
                    component: existing.id.clone(),
                }),
                DuplicatePolicy::Ignore => {
                    warn!(
                        component = %existing.id,
                        "[Registry] Component already registered, keeping first registration"
                    );
                    Ok(existing.id.clone())
                }
            };
        }

        let id = ComponentId::new(self.records.len(), component.name());
        let mut descriptor = Descriptor::new();
        Arc::clone(&component).describe(&mut descriptor);

        debug!(
            component = %id,
            provides = descriptor.provided.len(),
            slots = descriptor.slots.len(),
            "[Registry] Registered component"
        );

        self.records.push(ComponentRecord {
            id: id.clone(),
            identity,
            _component: component,
            descriptor,
        });

        Ok(id)
    }

    pub fn records(&self) -> &[ComponentRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ComponentRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record providing `key`, in registration order, except the one
    /// at `exclude`.
    pub fn providers_of(
        &self,
        key: &CapabilityKey,
        exclude: Option<usize>,
    ) -> Vec<&ComponentRecord> {
        self.records
            .iter()
            .filter(|r| Some(r.id.index()) != exclude)
            .filter(|r| r.provides(key))
            .collect()
    }
}

fn identity_of(component: &Arc<dyn Component>) -> usize {
    Arc::as_ptr(component) as *const () as usize
}
