//! Multi-taxi route planning on a grid with opportunistic ride sharing.
//!
//! Taxis are assigned one primary passenger each, then drive their trips one
//! action at a time. On the way a taxi may pick up one extra waiting
//! passenger when that passenger's pickup is within a deviation budget and
//! some cell of the taxi's own route leaves them closer to their destination.

pub mod action;
pub mod agent;
pub mod detour;
pub mod environment;
pub mod error;
pub mod grid;
pub mod matching;
pub mod runner;
pub mod scenario;
pub mod telemetry;
pub mod world;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use action::{Action, Direction};
pub use agent::{AgentState, TaxiAgent};
pub use detour::{DetourPlanner, Opportunity};
pub use environment::{EnvSnapshot, PassengerState, PassengerStatus, TaxiEnvironment, TaxiId};
pub use error::{GridError, GridResult, PlanningError, PlanningResult};
pub use grid::{Coord, GridGraph, Route};
pub use runner::{compare_routing, run_scenario, RoutingComparison, RoutingMode, ScenarioRun};
pub use scenario::ScenarioParams;
pub use world::GridWorld;
