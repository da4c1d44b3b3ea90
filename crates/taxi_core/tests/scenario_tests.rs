mod support;

use std::io::Write;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use taxi_core::error::{GridError, PlanningError};
use taxi_core::grid::Coord;
use taxi_core::matching::AssignmentStrategy;
use taxi_core::runner::{compare_routing, run_scenario, RoutingMode};
use taxi_core::scenario::{build_world, random_destination, PassengerPlacement, ScenarioParams};
use taxi_core::test_helpers::{open_grid_description, taxi_map};

fn handoff_params() -> ScenarioParams {
    ScenarioParams::default()
        .with_map(&open_grid_description(4, 5))
        .with_deviation_budget(1)
        .with_taxi_locations(vec![Coord::new(0, 0), Coord::new(3, 0)])
        .with_passengers(vec![
            PassengerPlacement::new(Coord::new(0, 1), Coord::new(0, 4)),
            PassengerPlacement::new(Coord::new(1, 0), Coord::new(1, 4)),
        ])
}

#[test]
fn scenario_config_loads_from_json_file() {
    let params = handoff_params().with_assignment_strategy(AssignmentStrategy::Auction);
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(params.to_json_string().unwrap().as_bytes())
        .expect("write config");

    let loaded = ScenarioParams::from_json_file(file.path()).unwrap();
    assert_eq!(loaded, params);
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = ScenarioParams::from_json_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(PlanningError::Config(_))));
}

#[test]
fn social_routing_hands_the_extra_passenger_on() {
    let comparison = compare_routing(&handoff_params()).unwrap();
    let social = &comparison.social;
    let direct = &comparison.direct;

    assert_eq!(social.assignment, direct.assignment);
    assert_eq!(social.assignment.passenger_for(0), Some(0));
    assert_eq!(social.assignment.passenger_for(1), Some(1));
    assert_eq!(social.assignment_cost, 10);

    // Taxi 0 drops passenger 1 at (0,4); taxi 1 then collects it there.
    assert_eq!(social.detours().count(), 1);
    assert_eq!(social.agents[0].actions_issued, 10);
    assert_eq!(social.agents[1].actions_issued, 10);
    assert_eq!(social.delivered_count(), 2);

    assert_eq!(direct.detours().count(), 0);
    assert_eq!(direct.agents[0].actions_issued, 6);
    assert_eq!(direct.agents[1].actions_issued, 8);
    assert_eq!(direct.delivered_count(), 2);

    assert_eq!(comparison.actions_saved(), 14 - 20);
}

#[test]
fn direct_runs_cost_exactly_the_assignment() {
    // With distinct pickups nothing interferes, so every taxi issues its
    // assigned travel cost plus one pickup and one drop-off.
    let graph = taxi_map();
    let cells: Vec<Coord> = graph.cells().collect();
    let mut rng = StdRng::seed_from_u64(31);

    for n in 1..=4 {
        for strategy in AssignmentStrategy::ALL {
            let pickups: Vec<Coord> = cells.choose_multiple(&mut rng, n).copied().collect();
            let passengers = pickups
                .iter()
                .map(|&pickup| {
                    let destination =
                        random_destination(&mut rng, &graph, pickup).expect("connected map");
                    PassengerPlacement::new(pickup, destination)
                })
                .collect();
            let taxis = cells.choose_multiple(&mut rng, n).copied().collect();
            let params = ScenarioParams::default()
                .with_taxi_locations(taxis)
                .with_passengers(passengers)
                .with_assignment_strategy(strategy);

            let run = run_scenario(&params, RoutingMode::Direct).unwrap();
            assert_eq!(
                run.total_actions() as u64,
                run.assignment_cost + 2 * n as u64
            );
            assert_eq!(run.delivered_count(), n);
            assert_eq!(run.pending_action_count(), 0);
        }
    }
}

#[test]
fn seeded_direct_runs_deliver_everyone_under_every_strategy() {
    for strategy in [AssignmentStrategy::Auction, AssignmentStrategy::Hungarian] {
        for seed in 0..200 {
            let params = ScenarioParams::default()
                .with_fleet(4, 4)
                .with_seed(seed)
                .with_assignment_strategy(strategy);
            let run = run_scenario(&params, RoutingMode::Direct).unwrap();
            assert_eq!(run.delivered_count(), 4, "{:?} seed {}", strategy, seed);
            assert_eq!(run.pending_action_count(), 0, "{:?} seed {}", strategy, seed);
        }
    }
}

#[test]
fn shared_pickup_cells_are_rejected_before_planning() {
    let params = ScenarioParams::default()
        .with_map(&open_grid_description(1, 5))
        .with_assignment_strategy(AssignmentStrategy::Auction)
        .with_taxi_locations(vec![Coord::new(0, 0), Coord::new(0, 3)])
        .with_passengers(vec![
            PassengerPlacement::new(Coord::new(0, 2), Coord::new(0, 4)),
            PassengerPlacement::new(Coord::new(0, 2), Coord::new(0, 0)),
        ]);
    assert!(matches!(
        run_scenario(&params, RoutingMode::Direct),
        Err(PlanningError::Config(_))
    ));
}

#[test]
fn seeded_scenarios_are_reproducible() {
    let params = ScenarioParams::default().with_fleet(3, 3).with_seed(8);
    let first = compare_routing(&params).unwrap();
    let second = compare_routing(&params).unwrap();
    assert_eq!(first, second);
    for detour in first.social.detours() {
        assert!(detour.opportunity.remaining_distance < detour.opportunity.baseline_distance);
    }
}

#[test]
fn planning_errors_abort_the_run() {
    let malformed = ScenarioParams::default().with_map(&["+--+", "|  |", "+--+"]);
    assert!(matches!(
        run_scenario(&malformed, RoutingMode::Social),
        Err(PlanningError::Grid(GridError::MalformedGrid { .. }))
    ));

    let uneven = ScenarioParams::default().with_fleet(2, 3);
    assert!(matches!(
        run_scenario(&uneven, RoutingMode::Direct),
        Err(PlanningError::Allocation { .. })
    ));

    let off_grid = ScenarioParams::default()
        .with_taxi_locations(vec![Coord::new(9, 9)])
        .with_passengers(vec![PassengerPlacement::new(
            Coord::new(0, 0),
            Coord::new(1, 1),
        )]);
    assert!(matches!(
        build_world(&off_grid),
        Err(PlanningError::Grid(GridError::OutOfBounds { .. }))
    ));
}
