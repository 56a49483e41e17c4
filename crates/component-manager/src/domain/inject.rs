//! Dependency slots.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::domain::descriptor::CapabilityKey;
use crate::error::SlotError;

/// A field a component wants filled with some provider of `T`.
///
/// The slot keeps a weak reference: the provider stays owned by whoever
/// registered it, and two components injected into each other do not leak.
///
/// ```rust,ignore
/// struct Worker {
///     queue: Inject<dyn Queue>,
/// }
///
/// #[async_trait]
/// impl Start for Worker {
///     async fn start(&self, _ctx: &LifecycleContext) -> anyhow::Result<()> {
///         self.queue.get()?.subscribe("jobs");
///         Ok(())
///     }
/// }
/// ```
pub struct Inject<T: ?Sized> {
    cell: Arc<RwLock<Option<Weak<T>>>>,
}

impl<T: ?Sized + Send + Sync + 'static> Inject<T> {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(RwLock::new(None)),
        }
    }

    /// The bound provider.
    pub fn get(&self) -> Result<Arc<T>, SlotError> {
        let capability = std::any::type_name::<T>();
        let guard = self.cell.read();
        let weak = guard
            .as_ref()
            .ok_or(SlotError::Unbound { capability })?;
        weak.upgrade()
            .ok_or(SlotError::ProviderDropped { capability })
    }

    pub fn is_bound(&self) -> bool {
        self.cell.read().is_some()
    }

    /// Whether the slot points at the same allocation as `provider`.
    pub fn is_bound_to<U: ?Sized>(&self, provider: &Arc<U>) -> bool {
        match self.cell.read().as_ref() {
            Some(weak) => std::ptr::addr_eq(weak.as_ptr(), Arc::as_ptr(provider)),
            None => false,
        }
    }

    pub(crate) fn binder(&self) -> Box<dyn SlotBinder> {
        Box::new(SlotHandle {
            cell: Arc::clone(&self.cell),
        })
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("capability", &std::any::type_name::<T>())
            .field("bound", &self.cell.read().is_some())
            .finish()
    }
}

/// Type-erased write side of an [`Inject`] slot, held by the registry.
pub(crate) trait SlotBinder: Send + Sync {
    fn key(&self) -> CapabilityKey;

    /// Bind to `handle`, which must hold an `Arc<T>`. Returns `false` on a
    /// type mismatch.
    fn bind(&self, handle: &(dyn Any + Send + Sync)) -> bool;

    fn is_bound(&self) -> bool;
}

struct SlotHandle<T: ?Sized> {
    cell: Arc<RwLock<Option<Weak<T>>>>,
}

impl<T: ?Sized + Send + Sync + 'static> SlotBinder for SlotHandle<T> {
    fn key(&self) -> CapabilityKey {
        CapabilityKey::of::<T>()
    }

    fn bind(&self, handle: &(dyn Any + Send + Sync)) -> bool {
        match handle.downcast_ref::<Arc<T>>() {
            Some(provider) => {
                *self.cell.write() = Some(Arc::downgrade(provider));
                true
            }
            None => false,
        }
    }

    fn is_bound(&self) -> bool {
        self.cell.read().is_some()
    }
}
