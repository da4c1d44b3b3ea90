//! Contract with the environment that owns taxi and passenger state.
//!
//! The planner never mutates the environment directly. It reads an immutable
//! [`EnvSnapshot`] and submits one [`Action`] per taxi through
//! [`TaxiEnvironment::step`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::grid::Coord;

/// Index of a taxi within its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaxiId(pub usize);

impl TaxiId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Environments name their agents `taxi_1`, `taxi_2`, ...
impl fmt::Display for TaxiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "taxi_{}", self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassengerStatus {
    Waiting,
    InTaxi(TaxiId),
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerState {
    /// Current cell: the pickup while waiting, the carrying taxi's cell while aboard.
    pub location: Coord,
    pub destination: Coord,
    pub status: PassengerStatus,
}

impl PassengerState {
    pub fn waiting(location: Coord, destination: Coord) -> Self {
        Self {
            location,
            destination,
            status: PassengerStatus::Waiting,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == PassengerStatus::Waiting
    }

    pub fn is_aboard(&self, taxi: TaxiId) -> bool {
        self.status == PassengerStatus::InTaxi(taxi)
    }
}

/// Immutable view of the environment at one tick.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvSnapshot {
    pub taxi_locations: Vec<Coord>,
    pub passengers: Vec<PassengerState>,
}

impl EnvSnapshot {
    pub fn num_taxis(&self) -> usize {
        self.taxi_locations.len()
    }

    pub fn num_passengers(&self) -> usize {
        self.passengers.len()
    }

    pub fn taxi_location(&self, taxi: TaxiId) -> Option<Coord> {
        self.taxi_locations.get(taxi.index()).copied()
    }

    pub fn passenger(&self, index: usize) -> Option<&PassengerState> {
        self.passengers.get(index)
    }

    pub fn pickups(&self) -> Vec<Coord> {
        self.passengers.iter().map(|p| p.location).collect()
    }

    pub fn destinations(&self) -> Vec<Coord> {
        self.passengers.iter().map(|p| p.destination).collect()
    }

    /// Waiting passengers with their indices, in index order.
    pub fn waiting_passengers(&self) -> impl Iterator<Item = (usize, &PassengerState)> {
        self.passengers
            .iter()
            .enumerate()
            .filter(|(_, passenger)| passenger.is_waiting())
    }

    pub fn all_delivered(&self) -> bool {
        self.passengers
            .iter()
            .all(|p| p.status == PassengerStatus::Delivered)
    }
}

/// The external environment the agents drive.
pub trait TaxiEnvironment {
    /// Fresh snapshot of the current state.
    fn snapshot(&self) -> EnvSnapshot;

    /// Apply one action for each listed taxi.
    fn step(&mut self, actions: &BTreeMap<TaxiId, Action>);

    /// Presentation hook; planning never depends on it.
    fn render(&self) {}
}
