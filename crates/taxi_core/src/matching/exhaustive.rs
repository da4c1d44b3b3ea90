//! Exhaustive optimal assignment.
//!
//! Enumerates every permutation of passenger indices in lexicographic order
//! and pairs permutation slot `t` with taxi `t`. The first permutation that
//! reaches the minimum total wins, which makes the tie-break explicit:
//! the lexicographically smallest optimal passenger ordering.
//!
//! O(n!) in the fleet size; intended for small fleets. [`HungarianAssignment`]
//! gives the same optimum in polynomial time.
//!
//! [`HungarianAssignment`]: super::HungarianAssignment

use crate::error::{PlanningError, PlanningResult};

use super::algorithm::AssignmentAlgorithm;
use super::types::{Assignment, CostMatrix};

#[derive(Debug, Default, Clone, Copy)]
pub struct ExhaustiveAssignment;

impl AssignmentAlgorithm for ExhaustiveAssignment {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn assign(&self, costs: &CostMatrix) -> PlanningResult<Assignment> {
        optimal_assignment(costs)
    }
}

/// Minimum-total-cost bijection found by exhaustive search.
pub fn optimal_assignment(costs: &CostMatrix) -> PlanningResult<Assignment> {
    if !costs.is_square() {
        return Err(PlanningError::allocation(format!(
            "exhaustive assignment needs equal counts, got {} taxis and {} passengers",
            costs.num_taxis(),
            costs.num_passengers()
        )));
    }

    let n = costs.num_taxis();
    let mut permutation: Vec<usize> = (0..n).collect();
    let mut best = permutation.clone();
    let mut best_total = permutation_total(costs, &permutation);

    while next_permutation(&mut permutation) {
        let total = permutation_total(costs, &permutation);
        if total < best_total {
            best_total = total;
            best.copy_from_slice(&permutation);
        }
    }

    Ok(Assignment::from_permutation(&best))
}

fn permutation_total(costs: &CostMatrix, permutation: &[usize]) -> u64 {
    permutation
        .iter()
        .enumerate()
        .map(|(taxi, &passenger)| costs.get(taxi, passenger))
        .sum()
}

/// Advance to the next lexicographic permutation in place.
/// Returns false once the last permutation has been produced.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }
    let mut pivot = items.len() - 1;
    while pivot > 0 && items[pivot - 1] >= items[pivot] {
        pivot -= 1;
    }
    if pivot == 0 {
        return false;
    }
    let mut successor = items.len() - 1;
    while items[successor] <= items[pivot - 1] {
        successor -= 1;
    }
    items.swap(pivot - 1, successor);
    items[pivot..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutations_are_lexicographic() {
        let mut items = vec![0, 1, 2];
        let mut seen = vec![items.clone()];
        while next_permutation(&mut items) {
            seen.push(items.clone());
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
    }

    #[test]
    fn ties_keep_first_permutation() {
        let costs = CostMatrix::from_rows(vec![vec![1, 1], vec![1, 1]]).unwrap();
        let assignment = optimal_assignment(&costs).unwrap();
        assert_eq!(assignment, Assignment::from_permutation(&[0, 1]));
    }

    #[test]
    fn rejects_rectangular_matrices() {
        let costs = CostMatrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert!(matches!(
            optimal_assignment(&costs),
            Err(PlanningError::Allocation { .. })
        ));
    }

    #[test]
    fn single_taxi_gets_single_passenger() {
        let costs = CostMatrix::from_rows(vec![vec![7]]).unwrap();
        let assignment = optimal_assignment(&costs).unwrap();
        assert_eq!(assignment.passenger_for(0), Some(0));
    }
}
