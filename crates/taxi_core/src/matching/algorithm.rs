use crate::error::PlanningResult;

use super::types::{Assignment, CostMatrix};

/// Strategy that turns a taxi/passenger cost matrix into an assignment.
///
/// Implementations must be deterministic: identical matrices always produce
/// identical assignments, so that scenario runs are reproducible.
pub trait AssignmentAlgorithm: Send + Sync {
    /// Short stable name used in logs and experiment exports.
    fn name(&self) -> &'static str;

    fn assign(&self, costs: &CostMatrix) -> PlanningResult<Assignment>;
}
