//! Test helpers for common grid and world setup.
//!
//! Shared by unit tests, integration tests and benches.

use std::sync::Arc;

use crate::environment::PassengerState;
use crate::grid::{Coord, GridGraph};
use crate::scenario::DEFAULT_TAXI_MAP;
use crate::world::GridWorld;

/// Description of a `rows` x `cols` grid with every passage open.
pub fn open_grid_description(rows: usize, cols: usize) -> Vec<String> {
    let border = format!("+{}+", "-".repeat(cols * 2 - 1));
    let cells = format!("|{}|", vec![" "; cols].join(":"));
    let mut desc = Vec::with_capacity(rows + 2);
    desc.push(border.clone());
    desc.extend(std::iter::repeat(cells).take(rows));
    desc.push(border);
    desc
}

/// # Panics
///
/// Panics if `rows` or `cols` is zero.
pub fn open_grid(rows: usize, cols: usize) -> GridGraph {
    GridGraph::build(&open_grid_description(rows, cols)).expect("open grid should parse")
}

pub fn taxi_map() -> GridGraph {
    GridGraph::build(&DEFAULT_TAXI_MAP).expect("default taxi map should parse")
}

/// World on `graph` with waiting passengers given as `(pickup, destination)`.
///
/// # Panics
///
/// Panics if any placement lies outside the grid.
pub fn world_with(
    graph: &Arc<GridGraph>,
    taxis: &[Coord],
    passengers: &[(Coord, Coord)],
) -> GridWorld {
    let passengers = passengers
        .iter()
        .map(|&(pickup, destination)| PassengerState::waiting(pickup, destination))
        .collect();
    GridWorld::new(Arc::clone(graph), taxis.to_vec(), passengers)
        .expect("test placements should lie on the grid")
}
