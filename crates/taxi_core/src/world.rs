//! In-process grid world implementing [`TaxiEnvironment`].
//!
//! Deliberately minimal: no fuel, no rewards, no collisions. Moves only
//! succeed along open passages, passengers aboard travel with their taxi, and
//! every issued action is kept in a history for inspection.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use crate::action::Action;
use crate::environment::{EnvSnapshot, PassengerState, PassengerStatus, TaxiEnvironment, TaxiId};
use crate::error::{GridError, PlanningError, PlanningResult};
use crate::grid::{Coord, GridGraph};

#[derive(Debug, Clone)]
pub struct GridWorld {
    graph: Arc<GridGraph>,
    state: EnvSnapshot,
    history: Vec<(TaxiId, Action)>,
}

impl GridWorld {
    /// Create a world, checking that every placement lies on the grid.
    pub fn new(
        graph: Arc<GridGraph>,
        taxi_locations: Vec<Coord>,
        passengers: Vec<PassengerState>,
    ) -> PlanningResult<Self> {
        let placements = taxi_locations
            .iter()
            .chain(passengers.iter().flat_map(|p| [&p.location, &p.destination]));
        for &coord in placements {
            if !graph.contains(coord) {
                return Err(PlanningError::Grid(GridError::OutOfBounds { coord }));
            }
        }
        Ok(Self {
            graph,
            state: EnvSnapshot {
                taxi_locations,
                passengers,
            },
            history: Vec::new(),
        })
    }

    pub fn graph(&self) -> &Arc<GridGraph> {
        &self.graph
    }

    pub fn state(&self) -> &EnvSnapshot {
        &self.state
    }

    pub fn history(&self) -> &[(TaxiId, Action)] {
        &self.history
    }

    fn apply(&mut self, taxi: TaxiId, action: Action) {
        let Some(here) = self.state.taxi_location(taxi) else {
            trace!(%taxi, %action, "ignoring action for unknown taxi");
            return;
        };

        match action {
            Action::Move(direction) => {
                let Some(next) = self.graph.step(here, direction) else {
                    trace!(%taxi, ?direction, %here, "move blocked");
                    return;
                };
                self.state.taxi_locations[taxi.index()] = next;
                for passenger in self.state.passengers.iter_mut() {
                    if passenger.is_aboard(taxi) {
                        passenger.location = next;
                    }
                }
            }
            Action::Pickup => {
                let boarding = self
                    .state
                    .passengers
                    .iter_mut()
                    .find(|p| p.is_waiting() && p.location == here);
                if let Some(passenger) = boarding {
                    passenger.status = PassengerStatus::InTaxi(taxi);
                }
            }
            Action::DropOff(index) => {
                let Some(passenger) = self.state.passengers.get_mut(index) else {
                    return;
                };
                if !passenger.is_aboard(taxi) {
                    return;
                }
                passenger.location = here;
                passenger.status = if here == passenger.destination {
                    PassengerStatus::Delivered
                } else {
                    PassengerStatus::Waiting
                };
            }
        }
    }
}

impl TaxiEnvironment for GridWorld {
    fn snapshot(&self) -> EnvSnapshot {
        self.state.clone()
    }

    fn step(&mut self, actions: &BTreeMap<TaxiId, Action>) {
        for (&taxi, &action) in actions {
            self.apply(taxi, action);
            self.history.push((taxi, action));
        }
    }

    fn render(&self) {
        trace!(
            taxis = ?self.state.taxi_locations,
            passengers = ?self.state.passengers,
            "world state"
        );
    }
}
