//! Metrics extraction from routing comparisons.
//!
//! Each parameter set produces one [`ExperimentResult`] row: the sweep
//! coordinates, action counts for the social and direct runs, and detour
//! bookkeeping. Failed runs keep their coordinates and carry the error text.

use serde::{Deserialize, Serialize};
use taxi_core::runner::RoutingComparison;

use crate::parameters::ParameterSet;

/// Metrics from a single social-vs-direct comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub experiment_id: String,
    pub run_id: usize,
    pub seed: u64,
    pub num_taxis: usize,
    pub num_passengers: usize,
    pub deviation_budget: usize,
    pub strategy: String,
    /// Travel cost of the primary assignment.
    pub assignment_cost: u64,
    /// Actions issued by all taxis with detours enabled.
    pub social_actions: usize,
    /// Actions issued by all taxis serving only their own passenger.
    pub direct_actions: usize,
    /// `direct_actions - social_actions`.
    pub actions_saved: i64,
    /// Detours taken in the social run.
    pub detours: usize,
    pub social_delivered: usize,
    pub direct_delivered: usize,
    /// Registered actions the social run never executed.
    pub pending_actions: usize,
    pub error: Option<String>,
}

impl ExperimentResult {
    fn blank(param_set: &ParameterSet) -> Self {
        Self {
            experiment_id: param_set.experiment_id.clone(),
            run_id: param_set.run_id,
            seed: param_set.seed,
            num_taxis: param_set.params.num_taxis,
            num_passengers: param_set.params.num_passengers,
            deviation_budget: param_set.params.deviation_budget,
            strategy: param_set.params.assignment_strategy.as_str().to_string(),
            assignment_cost: 0,
            social_actions: 0,
            direct_actions: 0,
            actions_saved: 0,
            detours: 0,
            social_delivered: 0,
            direct_delivered: 0,
            pending_actions: 0,
            error: None,
        }
    }

    /// Row for a parameter set whose scenario could not be planned.
    pub fn failed(param_set: &ParameterSet, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::blank(param_set)
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Calculate statistics from a vector of values.
    fn calculate_stats(values: &[u64]) -> (f64, f64, f64) {
        if values.is_empty() {
            return (0.0, 0.0, 0.0);
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let avg = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
        let median = if sorted.len() % 2 == 0 {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) as f64 / 2.0
        } else {
            sorted[sorted.len() / 2] as f64
        };
        let p90_idx = ((sorted.len() - 1) as f64 * 0.9) as usize;
        let p90 = sorted[p90_idx.min(sorted.len() - 1)] as f64;

        (avg, median, p90)
    }
}

/// Extract one result row from a finished comparison.
pub fn extract_metrics(param_set: &ParameterSet, comparison: &RoutingComparison) -> ExperimentResult {
    let social = &comparison.social;
    let direct = &comparison.direct;
    ExperimentResult {
        assignment_cost: social.assignment_cost,
        social_actions: social.total_actions(),
        direct_actions: direct.total_actions(),
        actions_saved: comparison.actions_saved(),
        detours: social.detours().count(),
        social_delivered: social.delivered_count(),
        direct_delivered: direct.delivered_count(),
        pending_actions: social.pending_action_count(),
        ..ExperimentResult::blank(param_set)
    }
}

/// Distribution of action counts across the successful rows of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub runs: usize,
    pub failed: usize,
    pub avg_social_actions: f64,
    pub median_social_actions: f64,
    pub p90_social_actions: f64,
    pub avg_direct_actions: f64,
    pub median_direct_actions: f64,
    pub p90_direct_actions: f64,
    pub avg_actions_saved: f64,
    pub total_detours: usize,
    /// Runs in which the social mode used fewer actions than the direct one.
    pub runs_with_savings: usize,
}

pub fn summarize(results: &[ExperimentResult]) -> SweepSummary {
    let ok: Vec<&ExperimentResult> = results.iter().filter(|r| r.is_success()).collect();
    let social: Vec<u64> = ok.iter().map(|r| r.social_actions as u64).collect();
    let direct: Vec<u64> = ok.iter().map(|r| r.direct_actions as u64).collect();

    let (avg_social_actions, median_social_actions, p90_social_actions) =
        ExperimentResult::calculate_stats(&social);
    let (avg_direct_actions, median_direct_actions, p90_direct_actions) =
        ExperimentResult::calculate_stats(&direct);
    let avg_actions_saved = if ok.is_empty() {
        0.0
    } else {
        ok.iter().map(|r| r.actions_saved).sum::<i64>() as f64 / ok.len() as f64
    };

    SweepSummary {
        runs: results.len(),
        failed: results.len() - ok.len(),
        avg_social_actions,
        median_social_actions,
        p90_social_actions,
        avg_direct_actions,
        median_direct_actions,
        p90_direct_actions,
        avg_actions_saved,
        total_detours: ok.iter().map(|r| r.detours).sum(),
        runs_with_savings: ok.iter().filter(|r| r.actions_saved > 0).count(),
    }
}

/// Index of the successful row that saved the most actions. Ties go to the
/// earliest row.
pub fn best_result_index(results: &[ExperimentResult]) -> Option<usize> {
    results
        .iter()
        .enumerate()
        .filter(|(_, result)| result.is_success())
        .max_by(|(ia, a), (ib, b)| a.actions_saved.cmp(&b.actions_saved).then(ib.cmp(ia)))
        .map(|(index, _)| index)
}
