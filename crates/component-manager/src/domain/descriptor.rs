//! Self-registration of capabilities, slots and hooks.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::domain::component::{GracefulStop, Init, Start, Stop};
use crate::domain::inject::{Inject, SlotBinder};

/// Identifies a capability: any `'static` type, usually a trait object.
#[derive(Clone, Copy)]
pub struct CapabilityKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl CapabilityKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Type name of the capability, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for CapabilityKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CapabilityKey {}

impl Hash for CapabilityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// A capability handed out by a provider. `handle` holds an `Arc<T>`.
pub(crate) struct ProvidedCapability {
    pub key: CapabilityKey,
    pub handle: Box<dyn Any + Send + Sync>,
}

/// Lifecycle hooks a component chose to expose.
#[derive(Default, Clone)]
pub(crate) struct Hooks {
    pub init: Option<Arc<dyn Init>>,
    pub start: Option<Arc<dyn Start>>,
    pub graceful_stop: Option<Arc<dyn GracefulStop>>,
    pub stop: Option<Arc<dyn Stop>>,
}

/// Collects what a component declares in [`Component::describe`](crate::Component::describe).
#[derive(Default)]
pub struct Descriptor {
    pub(crate) provided: Vec<ProvidedCapability>,
    pub(crate) slots: Vec<Box<dyn SlotBinder>>,
    pub(crate) hooks: Hooks,
}

impl Descriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer `capability` to every other component that requires `T`.
    ///
    /// Declaring the same capability twice keeps the last handle.
    pub fn provide<T>(&mut self, capability: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = CapabilityKey::of::<T>();
        self.provided.retain(|p| p.key != key);
        self.provided.push(ProvidedCapability {
            key,
            handle: Box::new(capability),
        });
        self
    }

    /// Declare a dependency slot to be filled by the resolver.
    pub fn require<T>(&mut self, slot: &Inject<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.slots.push(slot.binder());
        self
    }

    pub fn on_init(&mut self, hook: Arc<dyn Init>) -> &mut Self {
        self.hooks.init = Some(hook);
        self
    }

    pub fn on_start(&mut self, hook: Arc<dyn Start>) -> &mut Self {
        self.hooks.start = Some(hook);
        self
    }

    pub fn on_graceful_stop(&mut self, hook: Arc<dyn GracefulStop>) -> &mut Self {
        self.hooks.graceful_stop = Some(hook);
        self
    }

    pub fn on_stop(&mut self, hook: Arc<dyn Stop>) -> &mut Self {
        self.hooks.stop = Some(hook);
        self
    }

    /// Whether a capability of type `T` was declared.
    pub fn provides<T: ?Sized + 'static>(&self) -> bool {
        self.provides_key(&CapabilityKey::of::<T>())
    }

    pub(crate) fn provides_key(&self, key: &CapabilityKey) -> bool {
        self.provided.iter().any(|p| p.key == *key)
    }

    pub(crate) fn capability(&self, key: &CapabilityKey) -> Option<&(dyn Any + Send + Sync)> {
        self.provided
            .iter()
            .find(|p| p.key == *key)
            .map(|p| &*p.handle)
    }

    pub(crate) fn provided_names(&self) -> Vec<&'static str> {
        self.provided.iter().map(|p| p.key.name()).collect()
    }

    /// Number of declared dependency slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field(
                "provided",
                &self.provided.iter().map(|p| p.key).collect::<Vec<_>>(),
            )
            .field(
                "slots",
                &self.slots.iter().map(|s| s.key()).collect::<Vec<_>>(),
            )
            .field("init", &self.hooks.init.is_some())
            .field("start", &self.hooks.start.is_some())
            .field("graceful_stop", &self.hooks.graceful_stop.is_some())
            .field("stop", &self.hooks.stop.is_some())
            .finish()
    }
}
