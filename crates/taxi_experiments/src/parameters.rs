//! Parameter variation for routing experiments.
//!
//! A [`ParameterSpace`] lists the values to try for each swept dimension;
//! [`ParameterSpace::generate`] expands them into one [`ParameterSet`] per
//! combination and seed. Dimensions left empty keep the base scenario's value,
//! so a base with explicit placements can be swept over budgets and strategies.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use taxi_core::matching::AssignmentStrategy;
use taxi_core::scenario::ScenarioParams;

/// One scenario configuration in a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSet {
    /// Base scenario parameters.
    pub params: ScenarioParams,
    /// Identifies the parameter combination; shared by all its seeds.
    pub experiment_id: String,
    /// Index of this seed within the combination.
    pub run_id: usize,
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(params: ScenarioParams, experiment_id: String, run_id: usize, seed: u64) -> Self {
        Self {
            params,
            experiment_id,
            run_id,
            seed,
        }
    }

    /// Scenario params with this run's seed applied.
    pub fn scenario_params(&self) -> ScenarioParams {
        let mut params = self.params.clone();
        params.seed = Some(self.seed);
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Combination {
    deviation_budget: usize,
    fleet_size: Option<usize>,
    strategy: AssignmentStrategy,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterSpace {
    base: ScenarioParams,
    deviation_budgets: Vec<usize>,
    /// Taxis and passengers per scenario (equal counts).
    fleet_sizes: Vec<usize>,
    strategies: Vec<AssignmentStrategy>,
    seeds: Vec<u64>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new parameter space for grid search.
    pub fn grid() -> Self {
        Self::new()
    }

    pub fn with_base(mut self, base: ScenarioParams) -> Self {
        self.base = base;
        self
    }

    pub fn deviation_budget(mut self, budgets: Vec<usize>) -> Self {
        self.deviation_budgets = budgets;
        self
    }

    pub fn fleet_size(mut self, sizes: Vec<usize>) -> Self {
        self.fleet_sizes = sizes;
        self
    }

    pub fn assignment_strategy(mut self, strategies: Vec<AssignmentStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Seeds to repeat every combination with.
    pub fn seeds(mut self, seeds: Vec<u64>) -> Self {
        self.seeds = seeds;
        self
    }

    /// `count` consecutive seeds starting at `first`.
    pub fn seed_range(self, first: u64, count: usize) -> Self {
        self.seeds((first..first + count as u64).collect())
    }

    fn combinations(&self) -> Vec<Combination> {
        let budgets = or_base(&self.deviation_budgets, self.base.deviation_budget);
        let fleets: Vec<Option<usize>> = if self.fleet_sizes.is_empty() {
            vec![None]
        } else {
            self.fleet_sizes.iter().copied().map(Some).collect()
        };
        let strategies = or_base(&self.strategies, self.base.assignment_strategy);

        let mut combinations = Vec::with_capacity(budgets.len() * fleets.len() * strategies.len());
        for &deviation_budget in &budgets {
            for &fleet_size in &fleets {
                for &strategy in &strategies {
                    combinations.push(Combination {
                        deviation_budget,
                        fleet_size,
                        strategy,
                    });
                }
            }
        }
        combinations
    }

    fn seeds_or_base(&self) -> Vec<u64> {
        or_base(&self.seeds, self.base.effective_seed())
    }

    fn parameter_set(&self, index: usize, combination: Combination, run_id: usize, seed: u64) -> ParameterSet {
        let mut params = self
            .base
            .clone()
            .with_deviation_budget(combination.deviation_budget)
            .with_assignment_strategy(combination.strategy);
        if let Some(size) = combination.fleet_size {
            params = params.with_fleet(size, size);
        }
        ParameterSet::new(params, format!("exp_{}", index), run_id, seed)
    }

    /// Every combination of the swept values, once per seed.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let seeds = self.seeds_or_base();
        self.combinations()
            .into_iter()
            .enumerate()
            .flat_map(|(index, combination)| {
                seeds
                    .iter()
                    .enumerate()
                    .map(move |(run_id, &seed)| (index, combination, run_id, seed))
            })
            .map(|(index, combination, run_id, seed)| {
                self.parameter_set(index, combination, run_id, seed)
            })
            .collect()
    }

    /// Up to `count` distinct combinations drawn at random, each run once per
    /// seed. Experiment ids keep the combination's grid index.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        let mut rng = StdRng::seed_from_u64(seed);
        let indexed: Vec<(usize, Combination)> = self.combinations().into_iter().enumerate().collect();
        let seeds = self.seeds_or_base();

        indexed
            .choose_multiple(&mut rng, count)
            .flat_map(|&(index, combination)| {
                seeds
                    .iter()
                    .enumerate()
                    .map(move |(run_id, &run_seed)| (index, combination, run_id, run_seed))
            })
            .map(|(index, combination, run_id, run_seed)| {
                self.parameter_set(index, combination, run_id, run_seed)
            })
            .collect()
    }
}

fn or_base<T: Clone>(values: &[T], base: T) -> Vec<T> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}
