use crate::error::{PlanningError, PlanningResult};
use crate::grid::{Coord, GridGraph};

use super::types::CostMatrix;

/// Pairwise travel cost: hops from each taxi to each pickup, plus the
/// pickup-to-destination hops of that passenger.
///
/// Computed fresh for every planning cycle.
pub fn cost_matrix(
    graph: &GridGraph,
    taxi_locations: &[Coord],
    passenger_pickups: &[Coord],
    passenger_destinations: &[Coord],
) -> PlanningResult<CostMatrix> {
    if taxi_locations.is_empty() || passenger_pickups.is_empty() {
        return Err(PlanningError::EmptyInput);
    }
    if passenger_pickups.len() != passenger_destinations.len() {
        return Err(PlanningError::MismatchedPassengerData {
            pickups: passenger_pickups.len(),
            destinations: passenger_destinations.len(),
        });
    }

    // Trip length does not depend on the taxi.
    let trip_lengths = passenger_pickups
        .iter()
        .zip(passenger_destinations)
        .map(|(&pickup, &destination)| graph.distance(pickup, destination))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::with_capacity(taxi_locations.len());
    for &taxi in taxi_locations {
        let mut row = Vec::with_capacity(passenger_pickups.len());
        for (&pickup, &trip) in passenger_pickups.iter().zip(&trip_lengths) {
            let approach = graph.distance(taxi, pickup)?;
            row.push((approach + trip) as u64);
        }
        rows.push(row);
    }
    CostMatrix::from_rows(rows)
}

/// Auction bids derived from the cost matrix: `bids[p][t]` is the total
/// travel taxi `t` would need to serve passenger `p`.
pub fn bids_from_costs(costs: &CostMatrix) -> Vec<Vec<u64>> {
    (0..costs.num_passengers())
        .map(|passenger| {
            (0..costs.num_taxis())
                .map(|taxi| costs.get(taxi, passenger))
                .collect()
        })
        .collect()
}
