//! # Component Manager
//!
//! Facade tying the registry, resolver, orderer and executor together.
//!
//! ## Lifecycle
//!
//! ```text
//! register* → [resolve] → [init] → start → [graceful_stop] → stop
//! ```
//!
//! - `start` resolves implicitly when resolution has not run or is stale.
//! - `stop` before `start` is a successful no-op, and so is a second `stop`.
//! - Starting twice, starting after stop and registering after start are
//!   rejected with [`LifecycleError::Misuse`].

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ManagerConfig;
use crate::context::LifecycleContext;
use crate::domain::{Component, ComponentId, ComponentState, Phase};
use crate::error::{LifecycleError, LifecycleResult};
use crate::executor::LifecycleExecutor;
use crate::registry::ComponentRegistry;
use crate::resolver::Resolver;

/// Read-only snapshot of one registered component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    pub id: ComponentId,
    pub state: ComponentState,
    /// Capability type names, in declaration order.
    pub provides: Vec<&'static str>,
    /// Declared slots.
    pub slots: usize,
    /// Slots currently holding a live provider.
    pub bound_slots: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitState {
    Pending,
    Running,
    Done,
    Failed,
}

#[derive(Debug)]
struct RunState {
    phase: Phase,
    resolved: bool,
    init: InitState,
}

/// Registers components, wires their dependencies and drives their
/// lifecycle.
pub struct ComponentManager {
    config: ManagerConfig,
    instance_id: Uuid,
    registry: ComponentRegistry,
    parent: Option<Arc<ComponentManager>>,
    run: Mutex<RunState>,
    /// Indexed by registration order, mutated only by the executor.
    states: Mutex<Vec<ComponentState>>,
}

impl ComponentManager {
    /// Create an empty manager. `None` means default configuration.
    pub fn new(config: Option<ManagerConfig>) -> Self {
        let config = config.unwrap_or_default();
        let instance_id = Uuid::new_v4();

        debug!(
            manager = %config.name,
            instance_id = %instance_id,
            duplicate_policy = %config.duplicate_policy,
            "Component manager created"
        );

        Self {
            registry: ComponentRegistry::new(config.duplicate_policy),
            config,
            instance_id,
            parent: None,
            run: Mutex::new(RunState {
                phase: Phase::Assembling,
                resolved: false,
                init: InitState::Pending,
            }),
            states: Mutex::new(Vec::new()),
        }
    }

    /// Fall back to `parent` for capabilities no local component provides.
    ///
    /// The parent's components are only borrowed as dependencies; this
    /// manager never starts or stops them.
    pub fn with_parent(mut self, parent: Arc<ComponentManager>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn parent(&self) -> Option<&Arc<ComponentManager>> {
        self.parent.as_ref()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register one component. Its `describe` runs exactly once, here.
    pub fn register<C: Component>(&mut self, component: Arc<C>) -> LifecycleResult<ComponentId> {
        self.register_dyn(component)
    }

    /// Register components in iteration order, stopping at the first error.
    pub fn register_all<I>(&mut self, components: I) -> LifecycleResult<Vec<ComponentId>>
    where
        I: IntoIterator<Item = Arc<dyn Component>>,
    {
        components
            .into_iter()
            .map(|component| self.register_dyn(component))
            .collect()
    }

    /// Register components and resolve every slot immediately.
    pub fn inject<I>(&mut self, components: I) -> LifecycleResult<Vec<ComponentId>>
    where
        I: IntoIterator<Item = Arc<dyn Component>>,
    {
        let ids = self.register_all(components)?;
        self.resolve()?;
        Ok(ids)
    }

    fn register_dyn(&mut self, component: Arc<dyn Component>) -> LifecycleResult<ComponentId> {
        let run = self.run.get_mut();
        if run.phase != Phase::Assembling {
            return Err(LifecycleError::Misuse(format!(
                "cannot register {} after the manager has started",
                component.name()
            )));
        }

        let before = self.registry.len();
        let id = self.registry.register(component)?;
        if self.registry.len() > before {
            self.states.get_mut().push(ComponentState::Registered);
            run.resolved = false;
        }
        Ok(id)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Bind every slot of every local component. Fail-fast: the first
    /// unsatisfied or ambiguous slot is returned.
    pub fn resolve(&self) -> LifecycleResult<()> {
        if self.run.lock().phase != Phase::Assembling {
            return Err(LifecycleError::Misuse(
                "cannot resolve after the manager has started".to_string(),
            ));
        }

        let result = Resolver::new(&self.registry)
            .with_ancestors(self.ancestors())
            .resolve();

        match result {
            Ok(slots) => {
                self.run.lock().resolved = true;
                info!(
                    manager = %self.config.name,
                    instance_id = %self.instance_id,
                    components = self.registry.len(),
                    slots,
                    "Dependencies resolved"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    manager = %self.config.name,
                    instance_id = %self.instance_id,
                    error = %e,
                    "Dependency resolution failed"
                );
                Err(e)
            }
        }
    }

    /// Parent registries, nearest first.
    fn ancestors(&self) -> Vec<&ComponentRegistry> {
        let mut chain = Vec::new();
        let mut next = self.parent.as_deref();
        while let Some(manager) = next {
            chain.push(&manager.registry);
            next = manager.parent.as_deref();
        }
        chain
    }

    fn ensure_resolved(&self) -> LifecycleResult<()> {
        if self.run.lock().resolved {
            return Ok(());
        }
        self.resolve()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Run every Init hook in registration order. Optional, at most once,
    /// before [`start`](Self::start).
    ///
    /// A failed init makes the manager unstartable.
    pub async fn init(&self, ctx: &LifecycleContext) -> LifecycleResult<()> {
        {
            let run = self.run.lock();
            if run.phase != Phase::Assembling {
                return Err(LifecycleError::Misuse(
                    "init must run before start".to_string(),
                ));
            }
            if run.init != InitState::Pending {
                return Err(LifecycleError::Misuse("init called twice".to_string()));
            }
        }
        self.ensure_resolved()?;
        self.run.lock().init = InitState::Running;

        let result = self.executor().init(ctx).await;
        self.run.lock().init = match result {
            Ok(_) => InitState::Done,
            Err(_) => InitState::Failed,
        };
        let invoked = result?;
        info!(
            manager = %self.config.name,
            instance_id = %self.instance_id,
            invoked,
            "Components initialized"
        );
        Ok(())
    }

    /// Resolve if needed, then start components in registration order.
    ///
    /// On failure the components started so far stay started and are the
    /// ones a later [`stop`](Self::stop) will visit.
    pub async fn start(&self, ctx: &LifecycleContext) -> LifecycleResult<()> {
        self.check_startable()?;
        self.ensure_resolved()?;
        {
            let mut run = self.run.lock();
            if run.phase != Phase::Assembling {
                return Err(LifecycleError::Misuse("start called twice".to_string()));
            }
            run.phase = Phase::Started;
        }

        info!(
            manager = %self.config.name,
            instance_id = %self.instance_id,
            components = self.registry.len(),
            "Starting components"
        );
        let started = self.executor().start(ctx).await?;
        info!(
            manager = %self.config.name,
            instance_id = %self.instance_id,
            started,
            "✓ All components started"
        );
        Ok(())
    }

    fn check_startable(&self) -> LifecycleResult<()> {
        let run = self.run.lock();
        match run.init {
            InitState::Failed => {
                return Err(LifecycleError::Misuse(
                    "cannot start after init failed".to_string(),
                ))
            }
            InitState::Running => {
                return Err(LifecycleError::Misuse("init is still running".to_string()))
            }
            InitState::Pending | InitState::Done => {}
        }
        match run.phase {
            Phase::Assembling => Ok(()),
            Phase::Started => Err(LifecycleError::Misuse("start called twice".to_string())),
            Phase::Stopped => Err(LifecycleError::Misuse(
                "cannot restart a stopped manager".to_string(),
            )),
        }
    }

    /// Run GracefulStop hooks on started components, newest first.
    ///
    /// Does nothing unless the manager is started. States are unchanged;
    /// [`stop`](Self::stop) must still follow.
    pub async fn graceful_stop(&self, ctx: &LifecycleContext) -> LifecycleResult<()> {
        if self.run.lock().phase != Phase::Started {
            debug!(manager = %self.config.name, "Graceful stop skipped, manager not started");
            return Ok(());
        }

        let invoked = self.executor().graceful_stop(ctx).await?;
        info!(
            manager = %self.config.name,
            instance_id = %self.instance_id,
            invoked,
            "Components stopped gracefully"
        );
        Ok(())
    }

    /// Stop every started component in reverse start order.
    ///
    /// A no-op unless the manager is started. All started components are
    /// visited even when some Stop hooks fail; the failures come back
    /// together.
    pub async fn stop(&self, ctx: &LifecycleContext) -> LifecycleResult<()> {
        {
            let mut run = self.run.lock();
            if run.phase != Phase::Started {
                debug!(
                    manager = %self.config.name,
                    phase = ?run.phase,
                    "Stop requested but manager not started, nothing to do"
                );
                return Ok(());
            }
            run.phase = Phase::Stopped;
        }

        info!(
            manager = %self.config.name,
            instance_id = %self.instance_id,
            "Stopping components"
        );
        let stopped = self.executor().stop(ctx).await?;
        info!(
            manager = %self.config.name,
            instance_id = %self.instance_id,
            stopped,
            "✓ All components stopped"
        );
        Ok(())
    }

    fn executor(&self) -> LifecycleExecutor<'_> {
        LifecycleExecutor::new(&self.registry, &self.states)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub fn phase(&self) -> Phase {
        self.run.lock().phase
    }

    pub fn is_started(&self) -> bool {
        self.phase() == Phase::Started
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// State of one component, `None` if the id is not from this manager.
    pub fn status(&self, id: &ComponentId) -> Option<ComponentState> {
        let record = self.registry.get(id.index())?;
        if record.id != *id {
            return None;
        }
        self.states.lock().get(id.index()).copied()
    }

    /// States of all components in registration order.
    pub fn states(&self) -> Vec<(ComponentId, ComponentState)> {
        let states = self.states.lock();
        self.registry
            .records()
            .iter()
            .zip(states.iter())
            .map(|(record, state)| (record.id.clone(), *state))
            .collect()
    }

    /// Snapshot of every component in registration order.
    pub fn components(&self) -> Vec<ComponentInfo> {
        let states = self.states.lock();
        self.registry
            .records()
            .iter()
            .zip(states.iter())
            .map(|(record, state)| ComponentInfo {
                id: record.id.clone(),
                state: *state,
                provides: record.descriptor.provided_names(),
                slots: record.slots().len(),
                bound_slots: record.slots().iter().filter(|s| s.is_bound()).count(),
            })
            .collect()
    }
}

impl Default for ComponentManager {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentManager")
            .field("name", &self.config.name)
            .field("instance_id", &self.instance_id)
            .field("components", &self.registry.len())
            .field("phase", &self.run.lock().phase)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// Collect component handles into a `Vec<Arc<dyn Component>>` for
/// [`ComponentManager::register_all`] and [`ComponentManager::inject`].
///
/// ```ignore
/// manager.inject(components![db.clone(), cache.clone(), api])?;
/// ```
#[macro_export]
macro_rules! components {
    ($($component:expr),* $(,)?) => {
        ::std::vec![$(($component) as ::std::sync::Arc<dyn $crate::Component>),*]
    };
}
