//! Hungarian (Kuhn-Munkres) optimal assignment.
//!
//! Same contract as [`ExhaustiveAssignment`](super::ExhaustiveAssignment):
//! the returned assignment minimises the total cost, and ties resolve to the
//! same pick. Taxis are settled in index order; each takes the
//! lowest-indexed passenger that still allows a minimum total given the
//! taxis settled before it. On a square matrix this is the lexicographically
//! smallest optimal passenger ordering, exactly what the exhaustive search
//! returns.
//!
//! More taxis than passengers is accepted: every passenger gets a distinct
//! taxi and the surplus taxis stay unassigned. Staying idle ranks after every
//! real passenger, so among equal totals the lower-indexed taxis serve.
//!
//! The solver runs once in O(n³). The tie-break then works on the tight
//! edges of that solution (zero reduced cost), which are exactly the edges
//! used by some optimal assignment, and costs O(n⁴) in the worst case.

use std::collections::VecDeque;

use pathfinding::kuhn_munkres::kuhn_munkres_min;
use pathfinding::matrix::Matrix;

use crate::error::{PlanningError, PlanningResult};

use super::algorithm::AssignmentAlgorithm;
use super::types::{Assignment, CostMatrix};

#[derive(Debug, Default, Clone, Copy)]
pub struct HungarianAssignment;

impl AssignmentAlgorithm for HungarianAssignment {
    fn name(&self) -> &'static str {
        "hungarian"
    }

    fn assign(&self, costs: &CostMatrix) -> PlanningResult<Assignment> {
        let taxis = costs.num_taxis();
        let passengers = costs.num_passengers();
        if taxis < passengers {
            return Err(PlanningError::allocation(format!(
                "{} passengers cannot be served by {} taxis",
                passengers, taxis
            )));
        }

        // Square weights with taxis as rows. Columns past the last passenger
        // stand for "stay idle" and cost nothing.
        let cap = weight_cap(taxis);
        let weights: Vec<Vec<i64>> = (0..taxis)
            .map(|taxi| {
                (0..taxis)
                    .map(|column| {
                        if column < passengers {
                            costs.get(taxi, column).min(cap) as i64
                        } else {
                            0
                        }
                    })
                    .collect()
            })
            .collect();
        let matrix = Matrix::from_rows(weights.clone())
            .map_err(|error| PlanningError::allocation(format!("invalid cost matrix: {error}")))?;

        let (_total, column_by_taxi) = kuhn_munkres_min(&matrix);
        let column_by_taxi = lowest_optimal_columns(&weights, column_by_taxi);

        let mut assignment = Assignment::empty(taxis);
        for (taxi, &column) in column_by_taxi.iter().enumerate() {
            if column < passengers {
                assignment.assign(taxi, column);
            }
        }
        Ok(assignment)
    }
}

/// Costs are hop counts, far below `i64::MAX`; clamp anyway so sums of `n`
/// weights and the solver's internal negation cannot overflow.
fn weight_cap(size: usize) -> u64 {
    i64::MAX as u64 / (4 * size as u64 + 4)
}

/// Rewrite an optimal square assignment into the optimal one where every
/// taxi, in index order, holds the lowest column it can.
fn lowest_optimal_columns(weights: &[Vec<i64>], mut column_by_taxi: Vec<usize>) -> Vec<usize> {
    let size = weights.len();
    let mut taxi_by_column = vec![0; size];
    for (taxi, &column) in column_by_taxi.iter().enumerate() {
        taxi_by_column[column] = taxi;
    }

    let tight = tight_edges(weights, &column_by_taxi, &taxi_by_column);

    for taxi in 0..size {
        for column in (0..size).filter(|&column| tight[taxi][column]) {
            if column == column_by_taxi[taxi] {
                break;
            }
            if taxi_by_column[column] < taxi {
                continue;
            }
            if let Some(moves) = reroute(&tight, &column_by_taxi, &taxi_by_column, taxi, column) {
                for (mover, target) in moves {
                    column_by_taxi[mover] = target;
                    taxi_by_column[target] = mover;
                }
                break;
            }
        }
    }
    column_by_taxi
}

/// Edges with zero reduced cost under dual potentials derived from an
/// optimal assignment. An assignment is optimal iff it only uses these.
fn tight_edges(
    weights: &[Vec<i64>],
    column_by_taxi: &[usize],
    taxi_by_column: &[usize],
) -> Vec<Vec<bool>> {
    let size = weights.len();

    // Column potentials are shortest distances in the exchange graph, where
    // moving the holder of `from` onto `to` costs the change in its weight.
    // Optimality rules out negative cycles, so this settles within `size`
    // rounds.
    let mut potential = vec![0i64; size];
    for _ in 0..size {
        let mut changed = false;
        for from in 0..size {
            let holder = taxi_by_column[from];
            for to in 0..size {
                let through = potential[from] + weights[holder][to] - weights[holder][from];
                if through < potential[to] {
                    potential[to] = through;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    (0..size)
        .map(|taxi| {
            let held = column_by_taxi[taxi];
            (0..size)
                .map(|column| {
                    weights[taxi][column] - weights[taxi][held] + potential[held]
                        - potential[column]
                        == 0
                })
                .collect()
        })
        .collect()
}

/// Moves that let `taxi` take `column` while keeping a tight perfect
/// assignment and leaving every lower-indexed taxi where it is.
///
/// Breadth-first search for an alternating path: the holder of `column`
/// moves to another tight column, that column's holder moves on, and so on
/// until someone takes the column `taxi` gives up.
fn reroute(
    tight: &[Vec<bool>],
    column_by_taxi: &[usize],
    taxi_by_column: &[usize],
    taxi: usize,
    column: usize,
) -> Option<Vec<(usize, usize)>> {
    let size = tight.len();
    let freed = column_by_taxi[taxi];
    let start = taxi_by_column[column];

    let mut mover_onto: Vec<Option<usize>> = vec![None; size];
    let mut queued = vec![false; size];
    queued[taxi] = true;
    queued[start] = true;
    let mut queue = VecDeque::from([start]);

    while let Some(mover) = queue.pop_front() {
        for next in 0..size {
            if !tight[mover][next] || mover_onto[next].is_some() {
                continue;
            }
            if next == freed {
                mover_onto[next] = Some(mover);
                let mut moves = vec![(taxi, column)];
                let mut current = next;
                while let Some(step) = mover_onto[current] {
                    moves.push((step, current));
                    if step == start {
                        break;
                    }
                    current = column_by_taxi[step];
                }
                return Some(moves);
            }
            let holder = taxi_by_column[next];
            if holder < taxi || queued[holder] {
                continue;
            }
            mover_onto[next] = Some(mover);
            queued[holder] = true;
            queue.push_back(holder);
        }
    }
    None
}
