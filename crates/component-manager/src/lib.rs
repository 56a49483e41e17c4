//! # Component Manager
//!
//! Dependency injection and ordered lifecycle management for a set of
//! long-lived components.
//!
//! ## How it works
//!
//! - **Declare**: each component lists, in [`Component::describe`], the
//!   capabilities it provides, the [`Inject`] slots it needs and the
//!   lifecycle hooks it implements.
//! - **Resolve**: every slot is bound to the single other component that
//!   provides the required capability. None or several is an error.
//! - **Start**: components start in registration order, stopping at the
//!   first failure.
//! - **Stop**: started components stop in reverse order; every one is
//!   visited even when some fail.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut manager = ComponentManager::new(None);
//! manager.inject(components![store.clone(), api.clone()])?;
//!
//! let ctx = LifecycleContext::background();
//! manager.start(&ctx).await?;
//! // ...
//! manager.stop(&ctx).await?;
//! ```

pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod telemetry;

mod executor;
mod manager;
mod orderer;
mod registry;
mod resolver;

pub use config::{ConfigError, DuplicatePolicy, ManagerConfig};
pub use context::LifecycleContext;
pub use domain::{
    CapabilityKey, Component, ComponentId, ComponentState, Descriptor, GracefulStop, Init, Inject,
    Phase, Start, Stop,
};
pub use error::{HookFailure, LifecycleError, LifecycleResult, SlotError};
pub use manager::{ComponentInfo, ComponentManager};
pub use telemetry::{init_logging, TelemetryConfig, TelemetryError};

/// Re-exported so hook implementations need no direct dependency.
pub use async_trait::async_trait;
