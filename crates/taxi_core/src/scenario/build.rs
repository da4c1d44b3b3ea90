use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::environment::PassengerState;
use crate::error::{PlanningError, PlanningResult};
use crate::grid::{Coord, GridGraph};
use crate::world::GridWorld;

use super::params::ScenarioParams;

/// The classic 5x5 taxi map with its four landmark stands.
pub const DEFAULT_TAXI_MAP: [&str; 7] = [
    "+---------+",
    "|R: | : :G|",
    "| : | : : |",
    "| : : : : |",
    "| | : | : |",
    "|Y| : |B: |",
    "+---------+",
];

pub fn default_taxi_map() -> Vec<String> {
    DEFAULT_TAXI_MAP.iter().map(|row| row.to_string()).collect()
}

pub fn build_graph(params: &ScenarioParams) -> PlanningResult<Arc<GridGraph>> {
    Ok(Arc::new(GridGraph::build(&params.map)?))
}

/// Build the initial world for a scenario.
///
/// Explicit placements are used as given; anything left unset is placed
/// at random from a `StdRng` seeded with the scenario seed, so equal params
/// always build equal worlds.
pub fn build_world(params: &ScenarioParams) -> PlanningResult<GridWorld> {
    params.validate()?;
    let graph = build_graph(params)?;
    let mut rng = StdRng::seed_from_u64(params.effective_seed());

    let taxi_locations = match &params.taxi_locations {
        Some(locations) => locations.clone(),
        None => random_taxi_locations(&mut rng, &graph, params.num_taxis),
    };
    let passengers = match &params.passengers {
        Some(placements) => placements
            .iter()
            .map(|p| PassengerState::waiting(p.pickup, p.destination))
            .collect(),
        None => random_passengers(&mut rng, &graph, params.num_passengers)?,
    };

    debug!(
        taxis = ?taxi_locations,
        passengers = passengers.len(),
        seed = params.effective_seed(),
        "scenario world built"
    );
    GridWorld::new(graph, taxi_locations, passengers)
}

/// Uniform cells for taxis; several taxis may share a cell.
pub fn random_taxi_locations<R: Rng>(rng: &mut R, graph: &GridGraph, count: usize) -> Vec<Coord> {
    (0..count)
        .map(|_| graph.coord_of(rng.gen_range(0..graph.node_count())))
        .collect()
}

/// Random waiting passengers on distinct pickup cells, each with a
/// destination that differs from its pickup and is reachable from it.
///
/// Pickup boards whichever passenger waits at the taxi's cell, so two
/// passengers never start on the same cell.
pub fn random_passengers<R: Rng>(
    rng: &mut R,
    graph: &GridGraph,
    count: usize,
) -> PlanningResult<Vec<PassengerState>> {
    let cells: Vec<Coord> = graph.cells().collect();
    if count > cells.len() {
        return Err(PlanningError::invalid_scenario(format!(
            "{} passengers need distinct pickups but the grid has {} cells",
            count,
            cells.len()
        )));
    }
    let pickups: Vec<Coord> = cells.choose_multiple(rng, count).copied().collect();

    pickups
        .into_iter()
        .map(|pickup| {
            let destination = random_destination(rng, graph, pickup).ok_or_else(|| {
                PlanningError::invalid_scenario(format!(
                    "no reachable destination distinct from pickup {}",
                    pickup
                ))
            })?;
            Ok(PassengerState::waiting(pickup, destination))
        })
        .collect()
}

pub fn random_destination<R: Rng>(rng: &mut R, graph: &GridGraph, pickup: Coord) -> Option<Coord> {
    let candidates: Vec<Coord> = graph
        .cells()
        .filter(|&cell| cell != pickup && graph.distance(pickup, cell).is_ok())
        .collect();
    candidates.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::TaxiEnvironment;

    #[test]
    fn default_map_is_five_by_five() {
        let graph = GridGraph::build(&DEFAULT_TAXI_MAP).unwrap();
        assert_eq!((graph.rows(), graph.cols()), (5, 5));
    }

    #[test]
    fn same_seed_builds_same_world() {
        let params = ScenarioParams::default().with_fleet(3, 3).with_seed(11);
        let a = build_world(&params).unwrap().snapshot();
        let b = build_world(&params).unwrap().snapshot();
        assert_eq!(a, b);
        for passenger in &a.passengers {
            assert_ne!(passenger.location, passenger.destination);
        }
    }

    #[test]
    fn random_passengers_never_share_a_pickup() {
        let graph = GridGraph::build(&DEFAULT_TAXI_MAP).unwrap();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let passengers = random_passengers(&mut rng, &graph, 6).unwrap();
            let mut pickups: Vec<Coord> = passengers.iter().map(|p| p.location).collect();
            pickups.sort();
            pickups.dedup();
            assert_eq!(pickups.len(), 6, "seed {seed}");
        }
    }

    #[test]
    fn more_passengers_than_cells_is_rejected() {
        let params = ScenarioParams::default()
            .with_map(&["+---+", "| : |", "+---+"])
            .with_fleet(3, 3);
        assert!(matches!(
            build_world(&params),
            Err(PlanningError::InvalidScenario { .. })
        ));
    }

    #[test]
    fn single_cell_map_cannot_place_passengers() {
        let params = ScenarioParams::default().with_map(&["+-+", "| |", "+-+"]);
        assert!(matches!(
            build_world(&params),
            Err(PlanningError::InvalidScenario { .. })
        ));
    }
}
