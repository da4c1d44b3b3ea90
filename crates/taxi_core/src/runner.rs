//! Scenario runner: one assignment pass, then each agent driven to completion.
//!
//! Agents run one after another against the same environment; each plans
//! from a fresh snapshot, so later agents see passengers earlier agents have
//! already picked up or dropped off.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agent::TaxiAgent;
use crate::detour::DetourPlanner;
use crate::environment::{EnvSnapshot, PassengerStatus, TaxiEnvironment, TaxiId};
use crate::error::PlanningResult;
use crate::grid::GridGraph;
use crate::matching::{cost_matrix, Assignment, AssignmentStrategy, CostMatrix};
use crate::scenario::{build_world, ScenarioParams};
use crate::telemetry::{AgentReport, DetourRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Detours allowed within the scenario's deviation budget.
    Social,
    /// Every taxi serves only its assigned passenger.
    Direct,
}

impl RoutingMode {
    pub fn planner(self, deviation_budget: usize) -> DetourPlanner {
        match self {
            RoutingMode::Social => DetourPlanner::new(deviation_budget),
            RoutingMode::Direct => DetourPlanner::disabled(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub mode: RoutingMode,
    pub assignment: Assignment,
    /// Cost of the assignment under the cost matrix.
    pub assignment_cost: u64,
    pub agents: Vec<AgentReport>,
    pub final_state: EnvSnapshot,
}

impl ScenarioRun {
    pub fn total_actions(&self) -> usize {
        self.agents.iter().map(|agent| agent.actions_issued).sum()
    }

    pub fn detours(&self) -> impl Iterator<Item = &DetourRecord> {
        self.agents.iter().flat_map(|agent| agent.detours.iter())
    }

    pub fn pending_action_count(&self) -> usize {
        self.agents
            .iter()
            .map(|agent| agent.pending_actions.len())
            .sum()
    }

    pub fn delivered_count(&self) -> usize {
        self.final_state
            .passengers
            .iter()
            .filter(|p| p.status == PassengerStatus::Delivered)
            .count()
    }
}

/// Social and direct runs of the same scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingComparison {
    pub social: ScenarioRun,
    pub direct: ScenarioRun,
}

impl RoutingComparison {
    /// Direct actions minus social actions; positive when detours saved work.
    pub fn actions_saved(&self) -> i64 {
        self.direct.total_actions() as i64 - self.social.total_actions() as i64
    }
}

/// Compute costs for the current snapshot and solve the assignment.
pub fn plan_assignment(
    graph: &GridGraph,
    snapshot: &EnvSnapshot,
    strategy: AssignmentStrategy,
) -> PlanningResult<(Assignment, CostMatrix)> {
    let costs = cost_matrix(
        graph,
        &snapshot.taxi_locations,
        &snapshot.pickups(),
        &snapshot.destinations(),
    )?;
    let assignment = strategy.algorithm().assign(&costs)?;
    Ok((assignment, costs))
}

/// Drive one agent per assigned taxi, in taxi order.
pub fn run_agents<E: TaxiEnvironment>(
    graph: &GridGraph,
    env: &mut E,
    assignment: &Assignment,
    planner: &DetourPlanner,
    max_steps: usize,
) -> PlanningResult<Vec<AgentReport>> {
    let mut reports = Vec::with_capacity(assignment.num_taxis());
    for (taxi, passenger) in assignment.pairs() {
        let mut agent = TaxiAgent::new(TaxiId(taxi)).with_max_steps(max_steps);
        agent.assign(passenger);
        agent.run(graph, env, planner)?;
        reports.push(agent.report());
    }
    Ok(reports)
}

pub fn run_scenario(params: &ScenarioParams, mode: RoutingMode) -> PlanningResult<ScenarioRun> {
    let mut world = build_world(params)?;
    let graph = world.graph().clone();

    let (assignment, costs) =
        plan_assignment(&graph, &world.snapshot(), params.assignment_strategy)?;
    let assignment_cost = costs.total(&assignment);
    info!(
        ?mode,
        strategy = params.assignment_strategy.as_str(),
        pairs = ?assignment.pairs().collect::<Vec<_>>(),
        assignment_cost,
        "assignment planned"
    );

    let planner = mode.planner(params.deviation_budget);
    let agents = run_agents(
        &graph,
        &mut world,
        &assignment,
        &planner,
        params.max_agent_steps,
    )?;

    let run = ScenarioRun {
        mode,
        assignment,
        assignment_cost,
        agents,
        final_state: world.snapshot(),
    };
    if run.pending_action_count() > 0 {
        warn!(
            ?mode,
            pending = run.pending_action_count(),
            "scenario finished with unexecuted actions"
        );
    }
    info!(
        ?mode,
        actions = run.total_actions(),
        detours = run.detours().count(),
        delivered = run.delivered_count(),
        "scenario complete"
    );
    Ok(run)
}

/// Run the scenario twice from identical initial worlds: with detours and
/// without.
pub fn compare_routing(params: &ScenarioParams) -> PlanningResult<RoutingComparison> {
    let social = run_scenario(params, RoutingMode::Social)?;
    let direct = run_scenario(params, RoutingMode::Direct)?;
    info!(
        social = social.total_actions(),
        direct = direct.total_actions(),
        "routing comparison"
    );
    Ok(RoutingComparison { social, direct })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coord;
    use crate::scenario::PassengerPlacement;

    fn open_map() -> Vec<&'static str> {
        vec![
            "+---------+",
            "| : : : : |",
            "| : : : : |",
            "| : : : : |",
            "| : : : : |",
            "+---------+",
        ]
    }

    #[test]
    fn direct_run_delivers_every_passenger() {
        let params = ScenarioParams::default()
            .with_map(&open_map())
            .with_taxi_locations(vec![Coord::new(0, 0), Coord::new(3, 4)])
            .with_passengers(vec![
                PassengerPlacement::new(Coord::new(1, 1), Coord::new(3, 0)),
                PassengerPlacement::new(Coord::new(2, 3), Coord::new(0, 4)),
            ]);
        let run = run_scenario(&params, RoutingMode::Direct).unwrap();
        assert_eq!(run.assignment_cost, 10);
        assert_eq!(run.delivered_count(), 2);
        // Each trip is 5 hops plus a pickup and a drop-off.
        assert_eq!(run.total_actions(), 14);
        assert_eq!(run.detours().count(), 0);
    }

    #[test]
    fn direct_mode_disables_the_planner() {
        assert!(!RoutingMode::Direct.planner(3).is_enabled());
        assert_eq!(RoutingMode::Social.planner(3).budget(), Some(3));
    }
}
