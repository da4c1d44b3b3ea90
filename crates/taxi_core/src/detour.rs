//! Opportunistic detours: picking up one extra waiting passenger on the way.
//!
//! The planner is local and greedy. Passengers are scanned in index order and
//! only the first one whose pickup is within the deviation budget is
//! evaluated (first match, not best match). That candidate is accepted when
//! some cell on the taxi's own primary route leaves it strictly closer to its
//! destination than it is now; otherwise the scan ends with no detour.
//!
//! The comparison only charges the distance remaining after drop-off. Hops
//! the extra passenger spends riding in the taxi are not counted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::environment::{EnvSnapshot, PassengerStatus, TaxiId};
use crate::error::{GridError, GridResult, PlanningError, PlanningResult};
use crate::grid::{Coord, GridGraph, Route};
use crate::scenario::DEFAULT_DEVIATION_BUDGET;

/// A detour the planner recommends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Index of the extra passenger.
    pub passenger: usize,
    pub pickup: Coord,
    /// Cell on the taxi's primary route where the passenger is let off.
    pub drop_off: Coord,
    /// Hops from the taxi to the pickup.
    pub hops_to_pickup: usize,
    /// Passenger's pickup-to-destination distance without the detour.
    pub baseline_distance: usize,
    /// Passenger's drop-off-to-destination distance with the detour.
    pub remaining_distance: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetourPlanner {
    /// Maximum hops a taxi may travel to reach an extra pickup; `None`
    /// disables detours entirely.
    budget: Option<usize>,
}

/// Enabled, with [`DEFAULT_DEVIATION_BUDGET`].
impl Default for DetourPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_DEVIATION_BUDGET)
    }
}

impl DetourPlanner {
    pub fn new(budget: usize) -> Self {
        Self {
            budget: Some(budget),
        }
    }

    /// Planner that never proposes a detour (direct routing).
    pub fn disabled() -> Self {
        Self { budget: None }
    }

    pub fn budget(&self) -> Option<usize> {
        self.budget
    }

    pub fn is_enabled(&self) -> bool {
        self.budget.is_some()
    }

    /// Look for one extra passenger `taxi` can serve without leaving its
    /// route to `own_passenger` by more than the budget.
    pub fn find_opportunity(
        &self,
        graph: &GridGraph,
        snapshot: &EnvSnapshot,
        taxi: TaxiId,
        own_passenger: usize,
    ) -> PlanningResult<Option<Opportunity>> {
        let Some(budget) = self.budget else {
            return Ok(None);
        };
        let current = taxi_location(snapshot, taxi)?;

        let candidates = snapshot
            .waiting_passengers()
            .filter(|(index, _)| *index != own_passenger);

        for (index, candidate) in candidates {
            let Some(hops_to_pickup) = reachable_distance(graph, current, candidate.location)?
            else {
                continue;
            };
            if hops_to_pickup > budget {
                continue;
            }

            // Only this first candidate inside the budget is ever evaluated.
            let primary = primary_route(graph, snapshot, taxi, own_passenger)?;
            let Some((drop_off, remaining_distance)) =
                best_drop_off(graph, &primary, candidate.destination)?
            else {
                debug!(%taxi, passenger = index, "no cell on primary route reaches destination");
                return Ok(None);
            };
            let Some(baseline_distance) =
                reachable_distance(graph, candidate.location, candidate.destination)?
            else {
                return Ok(None);
            };

            if remaining_distance >= baseline_distance {
                debug!(
                    %taxi,
                    passenger = index,
                    remaining_distance,
                    baseline_distance,
                    "detour rejected: drop-off does not bring passenger closer"
                );
                return Ok(None);
            }

            return Ok(Some(Opportunity {
                passenger: index,
                pickup: candidate.location,
                drop_off,
                hops_to_pickup,
                baseline_distance,
                remaining_distance,
            }));
        }

        Ok(None)
    }
}

/// The cell on `route` closest to `destination`, with its distance.
/// Ties keep the earliest cell on the route.
pub fn best_drop_off(
    graph: &GridGraph,
    route: &Route,
    destination: Coord,
) -> GridResult<Option<(Coord, usize)>> {
    let mut best: Option<(Coord, usize)> = None;
    for &coord in &route.coords {
        let Some(distance) = reachable_distance(graph, coord, destination)? else {
            continue;
        };
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((coord, distance));
        }
    }
    Ok(best)
}

/// Route that completes `passenger`'s trip from the taxi's current cell:
/// through the pickup while the passenger waits, straight to the destination
/// once it rides in this taxi, and empty when there is nothing left to do.
pub fn primary_route(
    graph: &GridGraph,
    snapshot: &EnvSnapshot,
    taxi: TaxiId,
    passenger: usize,
) -> PlanningResult<Route> {
    let current = taxi_location(snapshot, taxi)?;
    let state = snapshot.passenger(passenger).ok_or_else(|| {
        PlanningError::invalid_scenario(format!(
            "passenger {} does not exist ({} passengers)",
            passenger,
            snapshot.num_passengers()
        ))
    })?;

    match state.status {
        PassengerStatus::Waiting => {
            let mut route = graph.shortest_path(current, state.location)?;
            route.extend(graph.shortest_path(state.location, state.destination)?);
            Ok(route)
        }
        PassengerStatus::InTaxi(carrier) if carrier == taxi => {
            Ok(graph.shortest_path(current, state.destination)?)
        }
        PassengerStatus::InTaxi(_) | PassengerStatus::Delivered => Ok(Route::default()),
    }
}

pub(crate) fn taxi_location(snapshot: &EnvSnapshot, taxi: TaxiId) -> PlanningResult<Coord> {
    snapshot.taxi_location(taxi).ok_or_else(|| {
        PlanningError::invalid_scenario(format!(
            "{} does not exist ({} taxis)",
            taxi,
            snapshot.num_taxis()
        ))
    })
}

/// Distance between two cells, `None` when they are not connected.
fn reachable_distance(graph: &GridGraph, from: Coord, to: Coord) -> GridResult<Option<usize>> {
    match graph.distance(from, to) {
        Ok(distance) => Ok(Some(distance)),
        Err(GridError::NoPath { .. }) => Ok(None),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::PassengerState;

    fn open_graph() -> GridGraph {
        GridGraph::build(&[
            "+---------+",
            "| : : : : |",
            "| : : : : |",
            "| : : : : |",
            "| : : : : |",
            "+---------+",
        ])
        .expect("grid")
    }

    fn snapshot(passengers: Vec<PassengerState>) -> EnvSnapshot {
        EnvSnapshot {
            taxi_locations: vec![Coord::new(0, 0)],
            passengers,
        }
    }

    #[test]
    fn default_planner_uses_the_standard_budget() {
        let planner = DetourPlanner::default();
        assert!(planner.is_enabled());
        assert_eq!(planner.budget(), Some(DEFAULT_DEVIATION_BUDGET));
    }

    #[test]
    fn disabled_planner_never_proposes() {
        let graph = open_graph();
        let snap = snapshot(vec![
            PassengerState::waiting(Coord::new(0, 1), Coord::new(0, 4)),
            PassengerState::waiting(Coord::new(1, 0), Coord::new(1, 4)),
        ]);
        let found = DetourPlanner::disabled()
            .find_opportunity(&graph, &snap, TaxiId(0), 0)
            .unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn drop_off_is_closest_route_cell_to_destination() {
        let graph = open_graph();
        let snap = snapshot(vec![
            PassengerState::waiting(Coord::new(0, 1), Coord::new(0, 4)),
            PassengerState::waiting(Coord::new(1, 0), Coord::new(1, 4)),
        ]);
        let found = DetourPlanner::new(1)
            .find_opportunity(&graph, &snap, TaxiId(0), 0)
            .unwrap()
            .expect("opportunity");
        assert_eq!(found.passenger, 1);
        assert_eq!(found.pickup, Coord::new(1, 0));
        assert_eq!(found.drop_off, Coord::new(0, 4));
        assert_eq!(found.hops_to_pickup, 1);
        assert_eq!(found.baseline_distance, 4);
        assert_eq!(found.remaining_distance, 1);
    }

    #[test]
    fn earliest_cell_wins_ties() {
        let graph = open_graph();
        let route = Route {
            coords: vec![Coord::new(0, 1), Coord::new(1, 2), Coord::new(2, 1)],
            directions: Vec::new(),
        };
        let best = best_drop_off(&graph, &route, Coord::new(1, 1)).unwrap();
        assert_eq!(best, Some((Coord::new(0, 1), 1)));
    }

    #[test]
    fn primary_route_skips_pickup_once_aboard() {
        let graph = open_graph();
        let mut snap = snapshot(vec![PassengerState::waiting(
            Coord::new(2, 0),
            Coord::new(0, 3),
        )]);
        let waiting = primary_route(&graph, &snap, TaxiId(0), 0).unwrap();
        assert_eq!(waiting.len(), 2 + 5);

        snap.passengers[0].status = PassengerStatus::InTaxi(TaxiId(0));
        snap.passengers[0].location = Coord::new(0, 0);
        let aboard = primary_route(&graph, &snap, TaxiId(0), 0).unwrap();
        assert_eq!(aboard.len(), 3);

        snap.passengers[0].status = PassengerStatus::Delivered;
        assert!(primary_route(&graph, &snap, TaxiId(0), 0).unwrap().is_empty());
    }
}
