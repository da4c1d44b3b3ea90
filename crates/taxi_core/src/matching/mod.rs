//! Taxi-to-passenger assignment.
//!
//! - [`cost_matrix`]: pairwise travel cost over the grid graph
//! - [`ExhaustiveAssignment`]: optimal by permutation search (small fleets)
//! - [`HungarianAssignment`]: optimal by Kuhn-Munkres (any fleet size)
//! - [`AuctionAssignment`]: greedy per-passenger lowest-bid auction

pub mod algorithm;
pub mod auction;
pub mod cost;
pub mod exhaustive;
pub mod hungarian;
pub mod types;

use serde::{Deserialize, Serialize};

pub use algorithm::AssignmentAlgorithm;
pub use auction::{auction_assignment, AuctionAssignment};
pub use cost::{bids_from_costs, cost_matrix};
pub use exhaustive::{optimal_assignment, ExhaustiveAssignment};
pub use hungarian::HungarianAssignment;
pub use types::{Assignment, CostMatrix};

/// Which assignment algorithm a scenario uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    #[default]
    Exhaustive,
    Hungarian,
    Auction,
}

impl AssignmentStrategy {
    pub const ALL: [AssignmentStrategy; 3] = [
        AssignmentStrategy::Exhaustive,
        AssignmentStrategy::Hungarian,
        AssignmentStrategy::Auction,
    ];

    pub fn algorithm(self) -> Box<dyn AssignmentAlgorithm> {
        match self {
            AssignmentStrategy::Exhaustive => Box::new(ExhaustiveAssignment),
            AssignmentStrategy::Hungarian => Box::new(HungarianAssignment),
            AssignmentStrategy::Auction => Box::new(AuctionAssignment),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStrategy::Exhaustive => "exhaustive",
            AssignmentStrategy::Hungarian => "hungarian",
            AssignmentStrategy::Auction => "auction",
        }
    }
}

impl std::str::FromStr for AssignmentStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AssignmentStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown assignment strategy '{value}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_round_trip_through_from_str() {
        for strategy in AssignmentStrategy::ALL {
            assert_eq!(strategy.as_str().parse::<AssignmentStrategy>(), Ok(strategy));
            assert_eq!(strategy.algorithm().name(), strategy.as_str());
        }
        assert!("greedy".parse::<AssignmentStrategy>().is_err());
    }
}
