//! Parallel experiment execution using rayon.
//!
//! Every parameter set runs its scenario twice (social and direct) on a
//! fresh world, so runs share no state and can be spread across threads.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use taxi_core::runner::compare_routing;
use tracing::{debug, warn};

use crate::metrics::{extract_metrics, ExperimentResult};
use crate::parameters::ParameterSet;

/// Run one parameter set. Planning errors become a failed row instead of
/// aborting the sweep.
pub fn run_single_experiment(param_set: &ParameterSet) -> ExperimentResult {
    let params = param_set.scenario_params();
    match compare_routing(&params) {
        Ok(comparison) => {
            let result = extract_metrics(param_set, &comparison);
            debug!(
                experiment = %param_set.experiment_id,
                run = param_set.run_id,
                saved = result.actions_saved,
                "experiment finished"
            );
            result
        }
        Err(error) => {
            warn!(
                experiment = %param_set.experiment_id,
                run = param_set.run_id,
                seed = param_set.seed,
                %error,
                "experiment failed"
            );
            ExperimentResult::failed(param_set, error)
        }
    }
}

/// Run multiple experiments in parallel with a progress bar.
///
/// Results come back in the same order as `parameter_sets`.
pub fn run_parallel_experiments(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
) -> Vec<ExperimentResult> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Run multiple experiments in parallel with optional progress bar.
///
/// `num_threads` of `None` uses rayon's default pool size.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Vec<ExperimentResult> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Some(bar)
    } else {
        None
    };

    let run_all = || -> Vec<ExperimentResult> {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_experiment(param_set);
                if let Some(ref progress_bar) = pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect()
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let results = match builder.build() {
        Ok(pool) => pool.install(run_all),
        Err(error) => {
            warn!(%error, "could not build thread pool, using the global pool");
            run_all()
        }
    };

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterSpace;
    use taxi_core::grid::Coord;
    use taxi_core::scenario::{PassengerPlacement, ScenarioParams};

    #[test]
    fn single_experiment_fills_every_column() {
        let sets = ParameterSpace::grid().fleet_size(vec![3]).seeds(vec![5]).generate();
        let result = run_single_experiment(&sets[0]);

        assert!(result.is_success());
        assert_eq!((result.num_taxis, result.num_passengers), (3, 3));
        assert_eq!(result.seed, 5);
        // Every taxi issues at least its own pickup and drop-off.
        assert!(result.direct_actions >= 6);
        assert_eq!(result.direct_delivered, 3);
        assert_eq!(
            result.actions_saved,
            result.direct_actions as i64 - result.social_actions as i64
        );
    }

    #[test]
    fn parallel_results_keep_input_order() {
        let sets = ParameterSpace::grid()
            .deviation_budget(vec![0, 3])
            .fleet_size(vec![2, 3])
            .seeds(vec![1, 2])
            .generate();
        let expected: Vec<_> = sets
            .iter()
            .map(|s| (s.experiment_id.clone(), s.run_id))
            .collect();

        let results = run_parallel_experiments_with_progress(sets.clone(), Some(2), false);
        assert_eq!(results.len(), 8);
        let got: Vec<_> = results
            .iter()
            .map(|r| (r.experiment_id.clone(), r.run_id))
            .collect();
        assert_eq!(got, expected);

        let sequential: Vec<_> = sets.iter().map(run_single_experiment).collect();
        assert_eq!(results, sequential);
    }

    #[test]
    fn budget_sweep_over_fixed_placements() {
        let base = ScenarioParams::default()
            .with_map(&[
                "+---------+",
                "| : : : : |",
                "| : : : : |",
                "| : : : : |",
                "| : : : : |",
                "+---------+",
            ])
            .with_taxi_locations(vec![Coord::new(0, 0), Coord::new(3, 0)])
            .with_passengers(vec![
                PassengerPlacement::new(Coord::new(0, 1), Coord::new(0, 4)),
                PassengerPlacement::new(Coord::new(1, 0), Coord::new(1, 4)),
            ]);
        let sets = ParameterSpace::grid()
            .with_base(base)
            .deviation_budget(vec![0, 1])
            .generate();
        let results = run_parallel_experiments_with_progress(sets, Some(1), false);

        let no_budget = &results[0];
        assert_eq!(no_budget.detours, 0);
        assert_eq!(no_budget.social_actions, 14);
        assert_eq!(no_budget.actions_saved, 0);

        let one_hop = &results[1];
        assert_eq!(one_hop.assignment_cost, 10);
        assert_eq!(one_hop.detours, 1);
        assert_eq!(one_hop.social_actions, 20);
        assert_eq!(one_hop.direct_actions, 14);
        assert_eq!(one_hop.actions_saved, -6);
        assert_eq!(one_hop.social_delivered, 2);
    }

    #[test]
    fn planning_errors_become_failed_rows() {
        let base = ScenarioParams::default().with_map(&["+--+", "|  |", "+--+"]);
        let sets = ParameterSpace::grid().with_base(base).generate();
        let result = run_single_experiment(&sets[0]);
        assert!(!result.is_success());
        assert!(result.error.is_some());
        assert_eq!(result.social_actions, 0);
    }
}
