//! Per-component lifecycle state.

use serde::{Deserialize, Serialize};

/// Where a component is in its lifecycle.
///
/// `Registered → Started → Stopped`. There is no way back: a stopped
/// component is never started again by the same manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComponentState {
    /// Registered, Start not (successfully) run.
    #[default]
    Registered,
    /// Start succeeded, or the component has no Start hook.
    Started,
    /// Stop has been attempted. Terminal, even if the hook failed.
    Stopped,
}

impl ComponentState {
    /// True once Start has succeeded, including after Stop.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started | Self::Stopped)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Whether the stop sweep should visit this component.
    pub fn needs_stop(&self) -> bool {
        matches!(self, Self::Started)
    }
}

/// Manager-wide phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Accepting registrations.
    Assembling,
    /// Start has been invoked (successfully or not).
    Started,
    /// Stop has run after a Start.
    Stopped,
}
