//! Sequential auction assignment.
//!
//! Passengers are auctioned one at a time in index order. Every taxi that has
//! not already won a passenger bids its total travel cost; the lowest bid
//! wins and ties go to the lowest taxi index. Greedy and not globally optimal;
//! an independent strategy rather than an approximation of the exhaustive one.

use crate::error::{PlanningError, PlanningResult};

use super::algorithm::AssignmentAlgorithm;
use super::cost::bids_from_costs;
use super::types::{Assignment, CostMatrix};

#[derive(Debug, Default, Clone, Copy)]
pub struct AuctionAssignment;

impl AssignmentAlgorithm for AuctionAssignment {
    fn name(&self) -> &'static str {
        "auction"
    }

    fn assign(&self, costs: &CostMatrix) -> PlanningResult<Assignment> {
        auction_assignment(&bids_from_costs(costs), costs.num_taxis())
    }
}

/// Run the auction. `bids[p][t]` is taxi `t`'s bid on passenger `p`.
pub fn auction_assignment(bids: &[Vec<u64>], num_taxis: usize) -> PlanningResult<Assignment> {
    if bids.is_empty() || num_taxis == 0 {
        return Err(PlanningError::EmptyInput);
    }

    let mut assignment = Assignment::empty(num_taxis);
    let mut taken = vec![false; num_taxis];

    for (passenger, bids_on_passenger) in bids.iter().enumerate() {
        if bids_on_passenger.len() != num_taxis {
            return Err(PlanningError::allocation(format!(
                "passenger {} received {} bids, expected one per taxi ({})",
                passenger,
                bids_on_passenger.len(),
                num_taxis
            )));
        }

        // min_by_key keeps the first minimum, i.e. the lowest taxi index.
        let winner = bids_on_passenger
            .iter()
            .enumerate()
            .filter(|(taxi, _)| !taken[*taxi])
            .min_by_key(|&(_, bid)| *bid)
            .map(|(taxi, _)| taxi)
            .ok_or_else(|| {
                PlanningError::allocation(format!(
                    "no taxi left to bid on passenger {}",
                    passenger
                ))
            })?;

        taken[winner] = true;
        assignment.assign(winner, passenger);
    }

    Ok(assignment)
}
