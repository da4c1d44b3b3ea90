use serde::{Deserialize, Serialize};

use crate::error::{PlanningError, PlanningResult};

/// Total travel cost of serving passenger `p` with taxi `t`, indexed `[t][p]`.
///
/// Serialised as the bare array of rows; deserialising goes through
/// [`CostMatrix::from_rows`], so empty or ragged input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u64>>", into = "Vec<Vec<u64>>")]
pub struct CostMatrix {
    rows: Vec<Vec<u64>>,
}

impl CostMatrix {
    /// Build from per-taxi rows. Rows must be non-empty and equally long.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> PlanningResult<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Err(PlanningError::EmptyInput);
        }
        if rows.iter().any(|row| row.len() != width) {
            return Err(PlanningError::allocation(
                "cost matrix rows have different lengths",
            ));
        }
        Ok(Self { rows })
    }

    pub fn num_taxis(&self) -> usize {
        self.rows.len()
    }

    pub fn num_passengers(&self) -> usize {
        self.rows[0].len()
    }

    pub fn is_square(&self) -> bool {
        self.num_taxis() == self.num_passengers()
    }

    pub fn get(&self, taxi: usize, passenger: usize) -> u64 {
        self.rows[taxi][passenger]
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.rows
    }

    /// Summed cost of every pair in `assignment`.
    pub fn total(&self, assignment: &Assignment) -> u64 {
        assignment
            .pairs()
            .map(|(taxi, passenger)| self.get(taxi, passenger))
            .sum()
    }
}

impl TryFrom<Vec<Vec<u64>>> for CostMatrix {
    type Error = PlanningError;

    fn try_from(rows: Vec<Vec<u64>>) -> PlanningResult<Self> {
        Self::from_rows(rows)
    }
}

impl From<CostMatrix> for Vec<Vec<u64>> {
    fn from(costs: CostMatrix) -> Self {
        costs.rows
    }
}

/// Taxi index -> passenger index. Unassigned taxis hold `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    passenger_by_taxi: Vec<Option<usize>>,
}

impl Assignment {
    pub fn empty(num_taxis: usize) -> Self {
        Self {
            passenger_by_taxi: vec![None; num_taxis],
        }
    }

    /// Full assignment where taxi `t` serves `passengers[t]`.
    pub fn from_permutation(passengers: &[usize]) -> Self {
        Self {
            passenger_by_taxi: passengers.iter().copied().map(Some).collect(),
        }
    }

    pub fn assign(&mut self, taxi: usize, passenger: usize) {
        self.passenger_by_taxi[taxi] = Some(passenger);
    }

    pub fn passenger_for(&self, taxi: usize) -> Option<usize> {
        self.passenger_by_taxi.get(taxi).copied().flatten()
    }

    pub fn taxi_for(&self, passenger: usize) -> Option<usize> {
        self.passenger_by_taxi
            .iter()
            .position(|p| *p == Some(passenger))
    }

    pub fn num_taxis(&self) -> usize {
        self.passenger_by_taxi.len()
    }

    /// Assigned `(taxi, passenger)` pairs in taxi order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.passenger_by_taxi
            .iter()
            .enumerate()
            .filter_map(|(taxi, passenger)| passenger.map(|p| (taxi, p)))
    }

    pub fn len(&self) -> usize {
        self.pairs().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every taxi serves exactly one of `num_passengers` passengers
    /// and every passenger is served.
    pub fn is_bijection(&self, num_passengers: usize) -> bool {
        if self.num_taxis() != num_passengers || self.len() != num_passengers {
            return false;
        }
        let mut seen = vec![false; num_passengers];
        for (_, passenger) in self.pairs() {
            if passenger >= num_passengers || seen[passenger] {
                return false;
            }
            seen[passenger] = true;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_ragged_matrices() {
        assert_eq!(CostMatrix::from_rows(vec![]), Err(PlanningError::EmptyInput));
        assert_eq!(
            CostMatrix::from_rows(vec![vec![]]),
            Err(PlanningError::EmptyInput)
        );
        assert!(matches!(
            CostMatrix::from_rows(vec![vec![1, 2], vec![3]]),
            Err(PlanningError::Allocation { .. })
        ));
    }

    #[test]
    fn deserialising_checks_the_shape() {
        let costs: CostMatrix = serde_json::from_str("[[1, 2], [3, 4]]").unwrap();
        assert_eq!(costs.num_passengers(), 2);
        assert_eq!(serde_json::to_string(&costs).unwrap(), "[[1,2],[3,4]]");

        assert!(serde_json::from_str::<CostMatrix>("[]").is_err());
        assert!(serde_json::from_str::<CostMatrix>("[[]]").is_err());
        assert!(serde_json::from_str::<CostMatrix>("[[1, 2], [3]]").is_err());
    }

    #[test]
    fn bijection_check_detects_duplicates() {
        assert!(Assignment::from_permutation(&[1, 0, 2]).is_bijection(3));
        assert!(!Assignment::from_permutation(&[1, 1, 2]).is_bijection(3));
        let mut partial = Assignment::empty(3);
        partial.assign(0, 2);
        assert!(!partial.is_bijection(3));
        assert_eq!(partial.taxi_for(2), Some(0));
    }
}
