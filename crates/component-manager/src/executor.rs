//! # Lifecycle Executor
//!
//! Walks the orderer's sequences and invokes hooks.
//!
//! - Init and Start are fail-fast: the first error stops the sweep and the
//!   remaining components are left untouched.
//! - GracefulStop and Stop are best-effort: every eligible component is
//!   visited, failures are collected and reported together.
//! - Stop only ever reaches components whose Start succeeded.

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::context::LifecycleContext;
use crate::domain::ComponentState;
use crate::error::{HookFailure, LifecycleError, LifecycleResult};
use crate::orderer;
use crate::registry::ComponentRegistry;

/// Drives hooks over a registry and records per-component state.
pub(crate) struct LifecycleExecutor<'a> {
    registry: &'a ComponentRegistry,
    states: &'a Mutex<Vec<ComponentState>>,
}

impl<'a> LifecycleExecutor<'a> {
    pub fn new(registry: &'a ComponentRegistry, states: &'a Mutex<Vec<ComponentState>>) -> Self {
        Self { registry, states }
    }

    /// Run Init hooks in start order. Returns the number of hooks invoked.
    pub async fn init(&self, ctx: &LifecycleContext) -> LifecycleResult<usize> {
        let mut invoked = 0;

        for index in orderer::start_order(self.registry.len()) {
            let Some(record) = self.registry.get(index) else {
                continue;
            };
            let Some(hook) = record.hooks().init.clone() else {
                continue;
            };

            debug!(component = %record.id, "[Executor] Initializing");
            if let Err(e) = hook.init(ctx).await {
                error!(component = %record.id, error = %e, "[Executor] ✗ Init failed");
                return Err(LifecycleError::InitFailed {
                    component: record.id.clone(),
                    source: e,
                });
            }
            invoked += 1;
        }

        Ok(invoked)
    }

    /// Start components in registration order, stopping at the first error.
    ///
    /// Components without a Start hook are marked started without a call.
    /// Returns the number of components started.
    pub async fn start(&self, ctx: &LifecycleContext) -> LifecycleResult<usize> {
        let order = orderer::start_order(self.registry.len());
        info!("[Executor] Starting {} components in registration order", order.len());

        let mut started = 0;
        for index in order {
            let Some(record) = self.registry.get(index) else {
                continue;
            };

            match record.hooks().start.clone() {
                Some(hook) => {
                    debug!(component = %record.id, "[Executor] Starting");
                    if let Err(e) = hook.start(ctx).await {
                        error!(component = %record.id, error = %e, "[Executor] ✗ Start failed");
                        return Err(LifecycleError::StartFailed {
                            component: record.id.clone(),
                            source: e,
                        });
                    }
                }
                None => debug!(component = %record.id, "[Executor] No Start hook, marking started"),
            }

            self.states.lock()[index] = ComponentState::Started;
            started += 1;
            debug!(component = %record.id, "[Executor] ✓ Started");
        }

        info!("[Executor] All {} components started", started);
        Ok(started)
    }

    /// Run GracefulStop hooks in stop order. States are left unchanged.
    pub async fn graceful_stop(&self, ctx: &LifecycleContext) -> LifecycleResult<usize> {
        let order = orderer::stop_order(&self.states.lock());
        let mut failures = Vec::new();
        let mut invoked = 0;

        for index in order {
            let Some(record) = self.registry.get(index) else {
                continue;
            };
            let Some(hook) = record.hooks().graceful_stop.clone() else {
                continue;
            };

            debug!(component = %record.id, "[Executor] Stopping gracefully");
            invoked += 1;
            if let Err(e) = hook.graceful_stop(ctx).await {
                warn!(component = %record.id, error = %e, "[Executor] ✗ Graceful stop failed, continuing");
                failures.push(HookFailure {
                    component: record.id.clone(),
                    error: e,
                });
            }
        }

        if failures.is_empty() {
            Ok(invoked)
        } else {
            Err(LifecycleError::GracefulStopFailed { failures })
        }
    }

    /// Stop started components in reverse start order.
    ///
    /// Every started component is marked stopped whatever its hook returns;
    /// failures are collected and the sweep always completes. Returns the
    /// number of components stopped.
    pub async fn stop(&self, ctx: &LifecycleContext) -> LifecycleResult<usize> {
        let order = orderer::stop_order(&self.states.lock());
        if order.is_empty() {
            debug!("[Executor] Nothing to stop");
            return Ok(0);
        }
        info!("[Executor] Stopping {} components in reverse order", order.len());

        let mut failures = Vec::new();
        let mut stopped = 0;
        for index in order {
            let Some(record) = self.registry.get(index) else {
                continue;
            };

            let outcome = match record.hooks().stop.clone() {
                Some(hook) => {
                    debug!(component = %record.id, "[Executor] Stopping");
                    hook.stop(ctx).await
                }
                None => Ok(()),
            };

            self.states.lock()[index] = ComponentState::Stopped;
            stopped += 1;

            match outcome {
                Ok(()) => debug!(component = %record.id, "[Executor] ✓ Stopped"),
                Err(e) => {
                    error!(
                        component = %record.id,
                        error = %e,
                        "[Executor] ✗ Failed to stop cleanly, continuing"
                    );
                    failures.push(HookFailure {
                        component: record.id.clone(),
                        error: e,
                    });
                }
            }
        }

        if failures.is_empty() {
            info!("[Executor] All {} components stopped", stopped);
            Ok(stopped)
        } else {
            Err(LifecycleError::StopFailed { failures })
        }
    }
}
