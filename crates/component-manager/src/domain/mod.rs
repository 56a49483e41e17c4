//! # Domain Layer
//!
//! Pure types shared by the registry, resolver and executor:
//!
//! - `Component`: what callers implement
//! - `Descriptor`: how a component declares capabilities, slots and hooks
//! - `Inject<T>`: a dependency slot
//! - `ComponentState` / `Phase`: lifecycle bookkeeping

pub mod component;
pub mod descriptor;
pub mod inject;
pub mod state;

pub use component::{Component, ComponentId, GracefulStop, Init, Start, Stop};
pub use descriptor::{CapabilityKey, Descriptor};
pub use inject::Inject;
pub use state::{ComponentState, Phase};
