use thiserror::Error;

use crate::grid::Coord;

/// Failures raised while building or querying a [`GridGraph`](crate::grid::GridGraph).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Malformed grid description: {reason}")]
    MalformedGrid { reason: String },

    #[error("No path from {from} to {to}")]
    NoPath { from: Coord, to: Coord },

    #[error("Coordinate {coord} is outside the grid")]
    OutOfBounds { coord: Coord },
}

/// Failures raised by assignment, agent execution and scenario setup.
///
/// None of these are transient: every variant reflects bad input data or a
/// broken precondition, so callers abort the planning cycle instead of retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Assignment requires at least one taxi and one passenger")]
    EmptyInput,

    #[error("Allocation failed: {reason}")]
    Allocation { reason: String },

    #[error("Passenger data mismatch: {pickups} pickups but {destinations} destinations")]
    MismatchedPassengerData { pickups: usize, destinations: usize },

    #[error("Taxi {taxi} exceeded the step limit of {limit}")]
    StepLimitExceeded { taxi: usize, limit: usize },

    #[error("Invalid scenario: {reason}")]
    InvalidScenario { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlanningError {
    pub(crate) fn allocation(reason: impl Into<String>) -> Self {
        PlanningError::Allocation {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_scenario(reason: impl Into<String>) -> Self {
        PlanningError::InvalidScenario {
            reason: reason.into(),
        }
    }
}

pub type GridResult<T> = Result<T, GridError>;
pub type PlanningResult<T> = Result<T, PlanningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_errors_convert_into_planning_errors() {
        let err: PlanningError = GridError::NoPath {
            from: Coord::new(0, 0),
            to: Coord::new(1, 1),
        }
        .into();
        assert_eq!(err.to_string(), "No path from (0, 0) to (1, 1)");
    }
}
