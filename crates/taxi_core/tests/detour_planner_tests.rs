mod support;

use rand::rngs::StdRng;
use rand::SeedableRng;
use taxi_core::detour::{primary_route, DetourPlanner};
use taxi_core::environment::{EnvSnapshot, PassengerState, PassengerStatus, TaxiId};
use taxi_core::grid::{Coord, GridGraph};
use taxi_core::scenario::{random_passengers, random_taxi_locations};
use taxi_core::test_helpers::{open_grid, taxi_map};

fn snapshot(taxi: Coord, passengers: &[(Coord, Coord)]) -> EnvSnapshot {
    EnvSnapshot {
        taxi_locations: vec![taxi],
        passengers: passengers
            .iter()
            .map(|&(pickup, destination)| PassengerState::waiting(pickup, destination))
            .collect(),
    }
}

fn own_trip() -> (Coord, Coord) {
    (Coord::new(0, 1), Coord::new(0, 4))
}

#[test]
fn accepted_detours_always_bring_the_passenger_closer() {
    let graph = taxi_map();
    let planner = DetourPlanner::new(3);
    let mut rng = StdRng::seed_from_u64(99);
    let mut accepted = 0;

    for _ in 0..300 {
        let snap = EnvSnapshot {
            taxi_locations: random_taxi_locations(&mut rng, &graph, 1),
            passengers: random_passengers(&mut rng, &graph, 4).unwrap(),
        };
        let Some(found) = planner
            .find_opportunity(&graph, &snap, TaxiId(0), 0)
            .unwrap()
        else {
            continue;
        };
        accepted += 1;

        let candidate = snap.passengers[found.passenger];
        assert_ne!(found.passenger, 0);
        assert!(candidate.is_waiting());
        assert_eq!(found.pickup, candidate.location);
        assert!(found.hops_to_pickup <= 3);
        assert!(found.remaining_distance < found.baseline_distance);
        assert_eq!(
            graph.distance(found.drop_off, candidate.destination),
            Ok(found.remaining_distance)
        );

        let route = primary_route(&graph, &snap, TaxiId(0), 0).unwrap();
        assert!(route.coords.contains(&found.drop_off));
    }

    assert!(accepted > 0, "no detour accepted in 300 random scenarios");
}

#[test]
fn first_candidate_in_budget_decides_the_scan() {
    let graph = open_grid(4, 5);
    let (pickup, destination) = own_trip();
    // Passenger 1 is in budget but its destination is nowhere near the
    // route; passenger 2 would be a good detour but is never evaluated.
    let mut snap = snapshot(
        Coord::new(0, 0),
        &[
            (pickup, destination),
            (Coord::new(1, 0), Coord::new(2, 0)),
            (Coord::new(0, 0), Coord::new(1, 4)),
        ],
    );
    let planner = DetourPlanner::new(1);
    assert_eq!(
        planner
            .find_opportunity(&graph, &snap, TaxiId(0), 0)
            .unwrap(),
        None
    );

    snap.passengers[1].status = PassengerStatus::Delivered;
    let found = planner
        .find_opportunity(&graph, &snap, TaxiId(0), 0)
        .unwrap()
        .expect("passenger 2 is evaluated once passenger 1 is gone");
    assert_eq!(found.passenger, 2);
    assert_eq!(found.drop_off, Coord::new(0, 4));
    assert_eq!(found.baseline_distance, 5);
    assert_eq!(found.remaining_distance, 1);
}

#[test]
fn candidates_beyond_the_budget_are_skipped() {
    let graph = open_grid(4, 5);
    let (pickup, destination) = own_trip();
    let snap = snapshot(
        Coord::new(0, 0),
        &[
            (pickup, destination),
            (Coord::new(3, 4), Coord::new(0, 4)),
            (Coord::new(1, 0), Coord::new(1, 4)),
        ],
    );

    let found = DetourPlanner::new(1)
        .find_opportunity(&graph, &snap, TaxiId(0), 0)
        .unwrap()
        .expect("passenger 2 is within one hop");
    assert_eq!(found.passenger, 2);
    assert_eq!(found.hops_to_pickup, 1);

    let none = DetourPlanner::new(0)
        .find_opportunity(&graph, &snap, TaxiId(0), 0)
        .unwrap();
    assert_eq!(none, None);
}

#[test]
fn unreachable_candidates_are_skipped() {
    let graph = GridGraph::build(&support::maps::SPLIT_ROWS).unwrap();
    let snap = snapshot(
        Coord::new(0, 0),
        &[
            (Coord::new(0, 1), Coord::new(0, 2)),
            (Coord::new(1, 0), Coord::new(1, 2)),
        ],
    );
    let found = DetourPlanner::new(10)
        .find_opportunity(&graph, &snap, TaxiId(0), 0)
        .unwrap();
    assert_eq!(found, None);
}

#[test]
fn passengers_already_aboard_are_not_candidates() {
    let graph = open_grid(4, 5);
    let (pickup, destination) = own_trip();
    let mut snap = snapshot(
        Coord::new(0, 0),
        &[(pickup, destination), (Coord::new(1, 0), Coord::new(1, 4))],
    );
    snap.passengers[1].status = PassengerStatus::InTaxi(TaxiId(1));
    let found = DetourPlanner::new(3)
        .find_opportunity(&graph, &snap, TaxiId(0), 0)
        .unwrap();
    assert_eq!(found, None);
}

/// Acceptance only compares the distance left after drop-off with the
/// direct trip. The hops spent riding in the taxi are not charged, so a
/// detour can be accepted even when the passenger travels further overall.
#[test]
fn acceptance_ignores_hops_spent_aboard() {
    let graph = open_grid(4, 5);
    let (pickup, destination) = own_trip();
    let snap = snapshot(
        Coord::new(0, 0),
        &[(pickup, destination), (Coord::new(1, 0), Coord::new(1, 4))],
    );
    let found = DetourPlanner::new(1)
        .find_opportunity(&graph, &snap, TaxiId(0), 0)
        .unwrap()
        .expect("detour accepted");

    // Pickup (1,0) -> back to (0,0) -> own pickup (0,1) -> drop-off (0,4).
    let hops_aboard = graph.distance(found.pickup, pickup).unwrap()
        + graph.distance(pickup, found.drop_off).unwrap();
    assert_eq!(hops_aboard, 5);
    assert!(hops_aboard + found.remaining_distance > found.baseline_distance);
}
