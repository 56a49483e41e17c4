//! Component contract and lifecycle hooks.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::LifecycleContext;
use crate::domain::descriptor::Descriptor;

/// Identity of a registered component.
///
/// `index` is the registration position, which is also the component's
/// place in the start order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentId {
    index: usize,
    name: Arc<str>,
}

impl ComponentId {
    pub fn new(index: usize, name: impl Into<Arc<str>>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    /// Registration position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Diagnostic name reported by [`Component::name`].
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.index)
    }
}

/// A value the manager can wire and drive.
///
/// Components are constructed by the caller and handed over as `Arc`s. The
/// manager calls [`describe`](Component::describe) exactly once, at
/// registration, and never looks inside the component again.
///
/// ```rust,ignore
/// struct Api {
///     store: Inject<dyn Store>,
/// }
///
/// impl Component for Api {
///     fn describe(self: Arc<Self>, d: &mut Descriptor) {
///         d.require(&self.store);
///         d.provide::<dyn Handler>(self.clone());
///         d.on_start(self);
///     }
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Declare provided capabilities, dependency slots and lifecycle hooks.
    fn describe(self: Arc<Self>, descriptor: &mut Descriptor);
}

/// Optional one-shot setup run before Start, in registration order.
#[async_trait]
pub trait Init: Send + Sync {
    async fn init(&self, ctx: &LifecycleContext) -> anyhow::Result<()>;
}

/// Called once when the manager starts, in registration order.
///
/// An error aborts the start sweep; components after this one are left
/// unstarted.
#[async_trait]
pub trait Start: Send + Sync {
    async fn start(&self, ctx: &LifecycleContext) -> anyhow::Result<()>;
}

/// Optional drain step run in stop order before [`Stop`].
#[async_trait]
pub trait GracefulStop: Send + Sync {
    async fn graceful_stop(&self, ctx: &LifecycleContext) -> anyhow::Result<()>;
}

/// Called once on shutdown, in reverse start order, and only if the
/// component was started.
#[async_trait]
pub trait Stop: Send + Sync {
    async fn stop(&self, ctx: &LifecycleContext) -> anyhow::Result<()>;
}

/// Strip the module path from a type name.
///
/// `app::store::Sql<app::Pg>` becomes `Sql<app::Pg>`.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let head = match full.find('<') {
        Some(generic_start) => &full[..generic_start],
        None => full,
    };
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
