//! Per-taxi agent: plans the primary trip, takes detours, drives the
//! environment one action at a time.
//!
//! Lifecycle: `Idle -> PlanningPrimary -> Executing -> Delivered -> Idle`.
//! The agent owns its path and its action map; everything it knows about the
//! world comes from fresh snapshots, and every change goes through
//! [`TaxiEnvironment::step`].

pub mod action_map;

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::action::{Action, Direction};
use crate::detour::{primary_route, taxi_location, DetourPlanner, Opportunity};
use crate::environment::{EnvSnapshot, PassengerStatus, TaxiEnvironment, TaxiId};
use crate::error::{PlanningError, PlanningResult};
use crate::grid::{Coord, GridGraph};
use crate::telemetry::{AgentReport, DetourRecord};

pub use action_map::ActionCoordinateMap;

pub const DEFAULT_MAX_STEPS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    Idle,
    PlanningPrimary,
    Executing,
    Delivered,
}

#[derive(Debug, Clone)]
pub struct TaxiAgent {
    id: TaxiId,
    passenger: Option<usize>,
    state: AgentState,
    /// Remaining moves: each entry is the cell entered and the direction taken.
    path: VecDeque<(Coord, Direction)>,
    actions: ActionCoordinateMap,
    actions_issued: usize,
    detours: Vec<DetourRecord>,
    max_steps: usize,
}

impl TaxiAgent {
    pub fn new(id: TaxiId) -> Self {
        Self {
            id,
            passenger: None,
            state: AgentState::Idle,
            path: VecDeque::new(),
            actions: ActionCoordinateMap::new(),
            actions_issued: 0,
            detours: Vec::new(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Cap on loop iterations before the run is abandoned.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn id(&self) -> TaxiId {
        self.id
    }

    pub fn passenger(&self) -> Option<usize> {
        self.passenger
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn actions_issued(&self) -> usize {
        self.actions_issued
    }

    pub fn detours(&self) -> &[DetourRecord] {
        &self.detours
    }

    pub fn pending_actions(&self) -> &ActionCoordinateMap {
        &self.actions
    }

    /// Moves still to be made on the committed path.
    pub fn remaining_path(&self) -> impl Iterator<Item = &(Coord, Direction)> {
        self.path.iter()
    }

    /// Bind the agent to its primary passenger.
    pub fn assign(&mut self, passenger: usize) {
        debug!(taxi = %self.id, passenger, "passenger assigned");
        self.passenger = Some(passenger);
        self.state = AgentState::PlanningPrimary;
    }

    /// Register the primary pickup and drop-off and compute the path that
    /// connects them.
    pub fn plan_primary(&mut self, graph: &GridGraph, snapshot: &EnvSnapshot) -> PlanningResult<()> {
        let passenger = self.passenger.ok_or_else(|| {
            PlanningError::invalid_scenario(format!("{} has no assigned passenger", self.id))
        })?;
        let state = snapshot.passenger(passenger).ok_or_else(|| {
            PlanningError::invalid_scenario(format!(
                "passenger {} does not exist ({} passengers)",
                passenger,
                snapshot.num_passengers()
            ))
        })?;

        match state.status {
            PassengerStatus::Waiting => {
                self.actions.register(state.location, Action::Pickup);
                self.actions
                    .register(state.destination, Action::DropOff(passenger));
            }
            PassengerStatus::InTaxi(carrier) if carrier == self.id => {
                self.actions
                    .register(state.destination, Action::DropOff(passenger));
            }
            PassengerStatus::InTaxi(_) | PassengerStatus::Delivered => {
                debug!(taxi = %self.id, passenger, status = ?state.status, "nothing to plan");
            }
        }

        let route = primary_route(graph, snapshot, self.id, passenger)?;
        debug!(taxi = %self.id, passenger, hops = route.len(), "primary route planned");
        self.path = route.steps().collect();
        self.state = AgentState::Executing;
        Ok(())
    }

    /// Drive the environment until the assigned trip is complete.
    ///
    /// Returns the number of discrete actions issued. An agent without a
    /// passenger issues nothing.
    pub fn run<E: TaxiEnvironment>(
        &mut self,
        graph: &GridGraph,
        env: &mut E,
        planner: &DetourPlanner,
    ) -> PlanningResult<usize> {
        let Some(passenger) = self.passenger else {
            return Ok(0);
        };
        if self.state == AgentState::PlanningPrimary {
            self.plan_primary(graph, &env.snapshot())?;
        }

        let mut iterations = 0;
        loop {
            iterations += 1;
            if iterations > self.max_steps {
                warn!(taxi = %self.id, limit = self.max_steps, "step limit exceeded");
                return Err(PlanningError::StepLimitExceeded {
                    taxi: self.id.index(),
                    limit: self.max_steps,
                });
            }

            let here = taxi_location(&env.snapshot(), self.id)?;
            self.execute_ready_actions(env, here);

            if self.path.is_empty() {
                break;
            }

            let snapshot = env.snapshot();
            if let Some(opportunity) =
                planner.find_opportunity(graph, &snapshot, self.id, passenger)?
            {
                self.take_detour(graph, env, passenger, opportunity)?;
                continue;
            }

            if let Some((next, direction)) = self.path.pop_front() {
                trace!(taxi = %self.id, %next, ?direction, "move");
                self.issue(env, Action::Move(direction));
            }
        }

        self.state = AgentState::Delivered;
        if !self.actions.is_empty() {
            warn!(
                taxi = %self.id,
                pending = ?self.actions.iter().collect::<Vec<_>>(),
                "trip finished with unexecuted actions"
            );
        }
        info!(
            taxi = %self.id,
            passenger,
            actions = self.actions_issued,
            detours = self.detours.len(),
            "trip complete"
        );
        Ok(self.actions_issued)
    }

    /// Forget the finished trip and return to `Idle`.
    pub fn release(&mut self) {
        self.passenger = None;
        self.path.clear();
        self.actions.clear();
        self.actions_issued = 0;
        self.detours.clear();
        self.state = AgentState::Idle;
    }

    pub fn report(&self) -> AgentReport {
        AgentReport {
            taxi: self.id,
            passenger: self.passenger,
            actions_issued: self.actions_issued,
            detours: self.detours.clone(),
            pending_actions: self.actions.iter().collect(),
        }
    }

    fn issue<E: TaxiEnvironment>(&mut self, env: &mut E, action: Action) {
        env.step(&BTreeMap::from([(self.id, action)]));
        env.render();
        self.actions_issued += 1;
    }

    /// Run, in registration order, every action at `here` that can run now.
    /// A drop-off waits until its passenger is aboard this taxi.
    fn execute_ready_actions<E: TaxiEnvironment>(&mut self, env: &mut E, here: Coord) {
        let mut deferred = Vec::new();
        for action in self.actions.take(here) {
            let ready = match action {
                Action::DropOff(passenger) => env
                    .snapshot()
                    .passenger(passenger)
                    .is_some_and(|p| p.is_aboard(self.id)),
                Action::Pickup | Action::Move(_) => true,
            };
            if ready {
                trace!(taxi = %self.id, %here, %action, "registered action");
                self.issue(env, action);
            } else {
                deferred.push(action);
            }
        }
        self.actions.restore(here, deferred);
    }

    /// Travel to the extra passenger, board it, then resume the primary trip
    /// from wherever the detour left the taxi.
    fn take_detour<E: TaxiEnvironment>(
        &mut self,
        graph: &GridGraph,
        env: &mut E,
        own_passenger: usize,
        opportunity: Opportunity,
    ) -> PlanningResult<()> {
        info!(
            taxi = %self.id,
            passenger = opportunity.passenger,
            pickup = %opportunity.pickup,
            drop_off = %opportunity.drop_off,
            hops = opportunity.hops_to_pickup,
            baseline = opportunity.baseline_distance,
            remaining = opportunity.remaining_distance,
            "taking detour"
        );

        let here = taxi_location(&env.snapshot(), self.id)?;
        let approach = graph.shortest_path(here, opportunity.pickup)?;
        for direction in approach.directions {
            self.issue(env, Action::Move(direction));
        }
        self.issue(env, Action::Pickup);

        let route = primary_route(graph, &env.snapshot(), self.id, own_passenger)?;
        self.path = route.steps().collect();
        self.actions
            .register(opportunity.drop_off, Action::DropOff(opportunity.passenger));
        self.detours.push(DetourRecord {
            taxi: self.id,
            own_passenger,
            opportunity,
        });
        Ok(())
    }
}
