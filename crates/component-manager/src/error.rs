//! # Error Types
//!
//! Errors surfaced by the registry, the resolver and the lifecycle executor.
//!
//! Resolution, init and start errors stop further progress. Stop and
//! graceful-stop errors are collected into a single [`LifecycleError`] after
//! the whole sweep has run.

use std::fmt;

use thiserror::Error;

use crate::domain::ComponentId;

/// Result alias used across the crate.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Errors produced while wiring or driving components.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No registered component provides the capability a slot requires.
    #[error("Unsatisfied dependency: {consumer} requires {capability}, but no component provides it")]
    UnsatisfiedDependency {
        consumer: ComponentId,
        capability: &'static str,
    },

    /// More than one registered component provides the required capability.
    #[error(
        "Ambiguous dependency: {consumer} requires {capability}, provided by {}",
        join_ids(.providers)
    )]
    AmbiguousDependency {
        consumer: ComponentId,
        capability: &'static str,
        providers: Vec<ComponentId>,
    },

    /// A component's Init hook returned an error.
    #[error("Component {component} failed to initialize: {source}")]
    InitFailed {
        component: ComponentId,
        #[source]
        source: anyhow::Error,
    },

    /// A component's Start hook returned an error.
    #[error("Component {component} failed to start: {source}")]
    StartFailed {
        component: ComponentId,
        #[source]
        source: anyhow::Error,
    },

    /// One or more GracefulStop hooks returned an error.
    #[error("{} component(s) failed to stop gracefully: {}", .failures.len(), join_failures(.failures))]
    GracefulStopFailed { failures: Vec<HookFailure> },

    /// One or more Stop hooks returned an error.
    #[error("{} component(s) failed to stop: {}", .failures.len(), join_failures(.failures))]
    StopFailed { failures: Vec<HookFailure> },

    /// The same component instance was registered twice.
    #[error("Component already registered: {component}")]
    DuplicateComponent { component: ComponentId },

    /// The manager was driven out of sequence (caller bug, not retryable).
    #[error("Lifecycle misuse: {0}")]
    Misuse(String),
}

impl LifecycleError {
    /// Failures collected by a stop or graceful-stop sweep.
    ///
    /// Empty for every other variant.
    pub fn failures(&self) -> &[HookFailure] {
        match self {
            Self::StopFailed { failures } | Self::GracefulStopFailed { failures } => failures,
            _ => &[],
        }
    }

    /// The component a fail-fast error is attributed to.
    pub fn component(&self) -> Option<&ComponentId> {
        match self {
            Self::UnsatisfiedDependency { consumer, .. }
            | Self::AmbiguousDependency { consumer, .. } => Some(consumer),
            Self::InitFailed { component, .. }
            | Self::StartFailed { component, .. }
            | Self::DuplicateComponent { component } => Some(component),
            _ => None,
        }
    }
}

/// A single hook failure inside an aggregated stop error.
#[derive(Debug)]
pub struct HookFailure {
    /// Component whose hook failed.
    pub component: ComponentId,
    /// Error returned by the hook.
    pub error: anyhow::Error,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.component, self.error)
    }
}

/// Returned by [`Inject::get`](crate::Inject::get).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    /// The slot was read before the manager resolved it.
    #[error("Dependency slot for {capability} has not been resolved")]
    Unbound { capability: &'static str },

    /// The provider bound to the slot has been dropped.
    #[error("Provider of {capability} is no longer alive")]
    ProviderDropped { capability: &'static str },
}

fn join_ids(ids: &[ComponentId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_failures(failures: &[HookFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
