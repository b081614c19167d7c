//! Planner observer trait for diagnostics and tests.

use pf_core::VertexId;

/// Callbacks invoked by [`PathPlanner::plan_with`][crate::PathPlanner::plan_with]
/// at key points of one planning call.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Destination arguments are indices into the
/// slice last passed to [`on_destinations`](Self::on_destinations).
///
/// # Example — hit-target logger
///
/// ```rust,ignore
/// struct Reached(Vec<VertexId>);
///
/// impl PlanObserver for Reached {
///     fn on_destination_finished(&mut self, _index: usize, vertex: VertexId) {
///         self.0.push(vertex);
///     }
/// }
/// ```
pub trait PlanObserver {
    /// Called once per call with the destination set in effect.
    fn on_destinations(&mut self, _destinations: &[VertexId]) {}

    /// A popped node was not accepted because it is the start vertex or was
    /// emitted by an earlier call.  Its neighbours are still expanded.
    fn on_skip(&mut self, _vertex: VertexId) {}

    /// A popped node changed destination before acceptance.
    fn on_reassign(&mut self, _vertex: VertexId, _from: Option<usize>, _to: usize) {}

    /// A vertex was appended to the result.
    fn on_accept(&mut self, _vertex: VertexId, _destination: usize) {}

    /// Destination `index` was reached by an accepted vertex this call.
    fn on_destination_finished(&mut self, _index: usize, _vertex: VertexId) {}
}

/// A [`PlanObserver`] that does nothing.
pub struct NoopObserver;

impl PlanObserver for NoopObserver {}
