use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::DEFAULT_MAX_STEPS;
use crate::error::{PlanningError, PlanningResult};
use crate::grid::Coord;
use crate::matching::AssignmentStrategy;

use super::build::default_taxi_map;

/// Hops a taxi may travel to reach an extra passenger.
pub const DEFAULT_DEVIATION_BUDGET: usize = 3;

/// Seed used when a scenario does not set one.
pub const DEFAULT_SEED: u64 = 42;

/// Explicit pickup and destination for one passenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerPlacement {
    pub pickup: Coord,
    pub destination: Coord,
}

impl PassengerPlacement {
    pub fn new(pickup: Coord, destination: Coord) -> Self {
        Self {
            pickup,
            destination,
        }
    }
}

/// Parameters for building and running one scenario.
///
/// Missing fields in a JSON config fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    /// Framed grid description, one string per text row.
    pub map: Vec<String>,
    pub num_taxis: usize,
    pub num_passengers: usize,
    pub deviation_budget: usize,
    /// Random seed for placements (optional; if None, uses [`DEFAULT_SEED`]).
    pub seed: Option<u64>,
    pub assignment_strategy: AssignmentStrategy,
    /// Loop cap for each agent run.
    pub max_agent_steps: usize,
    /// Fixed taxi cells. Overrides random taxi placement when set.
    pub taxi_locations: Option<Vec<Coord>>,
    /// Fixed passengers. Overrides random passenger placement when set.
    pub passengers: Option<Vec<PassengerPlacement>>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            map: default_taxi_map(),
            num_taxis: 2,
            num_passengers: 2,
            deviation_budget: DEFAULT_DEVIATION_BUDGET,
            seed: None,
            assignment_strategy: AssignmentStrategy::default(),
            max_agent_steps: DEFAULT_MAX_STEPS,
            taxi_locations: None,
            passengers: None,
        }
    }
}

impl ScenarioParams {
    pub fn with_map<S: AsRef<str>>(mut self, map: &[S]) -> Self {
        self.map = map.iter().map(|row| row.as_ref().to_string()).collect();
        self
    }

    pub fn with_fleet(mut self, num_taxis: usize, num_passengers: usize) -> Self {
        self.num_taxis = num_taxis;
        self.num_passengers = num_passengers;
        self
    }

    pub fn with_deviation_budget(mut self, budget: usize) -> Self {
        self.deviation_budget = budget;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_assignment_strategy(mut self, strategy: AssignmentStrategy) -> Self {
        self.assignment_strategy = strategy;
        self
    }

    pub fn with_max_agent_steps(mut self, max_steps: usize) -> Self {
        self.max_agent_steps = max_steps;
        self
    }

    /// Place taxis explicitly; also sets `num_taxis`.
    pub fn with_taxi_locations(mut self, locations: Vec<Coord>) -> Self {
        self.num_taxis = locations.len();
        self.taxi_locations = Some(locations);
        self
    }

    /// Place passengers explicitly; also sets `num_passengers`.
    pub fn with_passengers(mut self, passengers: Vec<PassengerPlacement>) -> Self {
        self.num_passengers = passengers.len();
        self.passengers = Some(passengers);
        self
    }

    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn from_json_str(json: &str) -> PlanningResult<Self> {
        let params: ScenarioParams = serde_json::from_str(json)
            .map_err(|err| PlanningError::Config(format!("invalid scenario JSON: {err}")))?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> PlanningResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            PlanningError::Config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> PlanningResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| PlanningError::Config(format!("cannot serialise scenario: {err}")))
    }

    /// Check the counts agree with each other and with any explicit placements,
    /// and that no two explicit passengers share a pickup cell.
    /// Map contents are checked when the graph is built.
    pub fn validate(&self) -> PlanningResult<()> {
        if self.num_taxis == 0 || self.num_passengers == 0 {
            return Err(PlanningError::Config(format!(
                "scenario needs at least one taxi and one passenger (got {} taxis, {} passengers)",
                self.num_taxis, self.num_passengers
            )));
        }
        if self.max_agent_steps == 0 {
            return Err(PlanningError::Config(
                "max_agent_steps must be positive".to_string(),
            ));
        }
        if let Some(locations) = &self.taxi_locations {
            if locations.len() != self.num_taxis {
                return Err(PlanningError::Config(format!(
                    "{} taxi locations given for {} taxis",
                    locations.len(),
                    self.num_taxis
                )));
            }
        }
        if let Some(passengers) = &self.passengers {
            if passengers.len() != self.num_passengers {
                return Err(PlanningError::Config(format!(
                    "{} passenger placements given for {} passengers",
                    passengers.len(),
                    self.num_passengers
                )));
            }
            let mut pickups = BTreeSet::new();
            if let Some(repeated) = passengers.iter().find(|p| !pickups.insert(p.pickup)) {
                return Err(PlanningError::Config(format!(
                    "two passengers share pickup cell {}",
                    repeated.pickup
                )));
            }
        }
        Ok(())
    }
}
