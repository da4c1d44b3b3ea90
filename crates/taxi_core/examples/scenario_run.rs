//! Run the default taxi-map scenario with and without detours and print both.
//!
//! Run with: cargo run -p taxi_core --example scenario_run

use taxi_core::runner::{compare_routing, ScenarioRun};
use taxi_core::scenario::ScenarioParams;

fn print_run(label: &str, run: &ScenarioRun) {
    println!("--- {} routing ---", label);
    for agent in &run.agents {
        println!(
            "  {}  passenger={:?}  actions={}  detours={}  pending={}",
            agent.taxi,
            agent.passenger,
            agent.actions_issued,
            agent.detours.len(),
            agent.pending_actions.len()
        );
        for detour in &agent.detours {
            let o = &detour.opportunity;
            println!(
                "    picked up passenger {} at {} and let off at {} ({} -> {} hops to go)",
                o.passenger, o.pickup, o.drop_off, o.baseline_distance, o.remaining_distance
            );
        }
    }
    println!(
        "  total actions: {}  delivered: {}/{}",
        run.total_actions(),
        run.delivered_count(),
        run.final_state.num_passengers()
    );
}

fn main() {
    const SEED: u64 = 123;
    const FLEET: usize = 4;

    let params = ScenarioParams::default()
        .with_fleet(FLEET, FLEET)
        .with_seed(SEED);

    let comparison = match compare_routing(&params) {
        Ok(comparison) => comparison,
        Err(err) => {
            eprintln!("scenario failed: {err}");
            std::process::exit(1);
        }
    };

    println!(
        "Scenario: {} taxis, {} passengers, budget {}, seed {}",
        FLEET, FLEET, params.deviation_budget, SEED
    );
    println!("Assignment cost: {}", comparison.social.assignment_cost);
    print_run("Social", &comparison.social);
    print_run("Direct", &comparison.direct);
    println!("Actions saved by detours: {}", comparison.actions_saved());
}
