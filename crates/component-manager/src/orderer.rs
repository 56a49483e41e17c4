//! # Lifecycle Orderer
//!
//! Start order is registration order. This is deliberately not a
//! topological sort: every slot is bound before the first Start call, so a
//! component may call into its dependencies whether or not their own Start
//! has run.
//!
//! Stop order is the exact reverse of the realized start order, restricted
//! to components that actually started.

use crate::domain::ComponentState;

/// Indices in the order Init and Start are invoked.
pub(crate) fn start_order(component_count: usize) -> Vec<usize> {
    (0..component_count).collect()
}

/// Indices in the order GracefulStop and Stop are invoked.
pub(crate) fn stop_order(states: &[ComponentState]) -> Vec<usize> {
    start_order(states.len())
        .into_iter()
        .rev()
        .filter(|&index| states[index].needs_stop())
        .collect()
}
