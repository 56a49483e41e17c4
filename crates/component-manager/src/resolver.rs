//! # Dependency Resolver
//!
//! Binds every declared slot to the single component providing the required
//! capability.
//!
//! ## Policy
//!
//! - Components are visited in registration order, slots in declaration order.
//! - A component is never a candidate for its own slots.
//! - Exactly one local candidate: bind. Several: `AmbiguousDependency`.
//! - No local candidate: ask the parent managers, nearest first. Still none:
//!   `UnsatisfiedDependency`.
//! - The first failure aborts resolution (fail-fast). Slots bound before the
//!   failure stay bound; a later successful run rebinds everything.
//!
//! No cycle detection: a slot only needs a value, not a started provider.

use tracing::{debug, info};

use crate::domain::descriptor::CapabilityKey;
use crate::domain::inject::SlotBinder;
use crate::error::{LifecycleError, LifecycleResult};
use crate::registry::{ComponentRecord, ComponentRegistry};

/// One resolution pass over a registry.
pub(crate) struct Resolver<'a> {
    local: &'a ComponentRegistry,
    /// Parent registries, nearest first.
    ancestors: Vec<&'a ComponentRegistry>,
}

impl<'a> Resolver<'a> {
    pub fn new(local: &'a ComponentRegistry) -> Self {
        Self {
            local,
            ancestors: Vec::new(),
        }
    }

    pub fn with_ancestors(mut self, ancestors: Vec<&'a ComponentRegistry>) -> Self {
        self.ancestors = ancestors;
        self
    }

    /// Bind every slot of every local component. Returns the number of
    /// slots bound.
    pub fn resolve(&self) -> LifecycleResult<usize> {
        let mut bound = 0;

        for consumer in self.local.records() {
            for slot in consumer.slots() {
                self.bind_slot(consumer, slot.as_ref())?;
                bound += 1;
            }
        }

        info!(
            components = self.local.len(),
            slots = bound,
            "[Resolver] All dependencies resolved"
        );
        Ok(bound)
    }

    fn bind_slot(&self, consumer: &ComponentRecord, slot: &dyn SlotBinder) -> LifecycleResult<()> {
        let key = slot.key();
        let provider = self.find_provider(consumer, &key)?;

        let bound = provider
            .descriptor
            .capability(&key)
            .map(|handle| slot.bind(handle))
            .unwrap_or(false);
        if !bound {
            return Err(unsatisfied(consumer, &key));
        }

        debug!(
            consumer = %consumer.id,
            provider = %provider.id,
            capability = key.name(),
            "[Resolver] Bound dependency"
        );
        Ok(())
    }

    fn find_provider(
        &self,
        consumer: &ComponentRecord,
        key: &CapabilityKey,
    ) -> LifecycleResult<&'a ComponentRecord> {
        let local = self.local.providers_of(key, Some(consumer.id.index()));
        if let Some(provider) = single(consumer, key, local)? {
            return Ok(provider);
        }

        for ancestor in self.ancestors.iter().copied() {
            if let Some(provider) = single(consumer, key, ancestor.providers_of(key, None))? {
                return Ok(provider);
            }
        }

        Err(unsatisfied(consumer, key))
    }
}

/// `Ok(None)` for no candidates, the candidate for exactly one, an
/// ambiguity error otherwise.
fn single<'r>(
    consumer: &ComponentRecord,
    key: &CapabilityKey,
    mut candidates: Vec<&'r ComponentRecord>,
) -> LifecycleResult<Option<&'r ComponentRecord>> {
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop()),
        _ => Err(LifecycleError::AmbiguousDependency {
            consumer: consumer.id.clone(),
            capability: key.name(),
            providers: candidates.iter().map(|c| c.id.clone()).collect(),
        }),
    }
}

fn unsatisfied(consumer: &ComponentRecord, key: &CapabilityKey) -> LifecycleError {
    LifecycleError::UnsatisfiedDependency {
        consumer: consumer.id.clone(),
        capability: key.name(),
    }
}
