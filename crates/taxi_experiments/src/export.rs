//! Result export to CSV and JSON.

use std::path::Path;

use taxi_core::runner::RoutingComparison;

use crate::metrics::{best_result_index, ExperimentResult};
use crate::parameters::ParameterSet;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export experiment results to CSV, one row per parameter set.
///
/// # Errors
///
/// Returns an error if `results` is empty, or if file creation or CSV
/// writing fails.
pub fn export_to_csv(
    results: &[ExperimentResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, file)
}

/// Export experiment results to JSON as a pretty-printed array.
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_to_json(
    results: &[ExperimentResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::write_pretty_json(results, file)
}

/// Write a full social-vs-direct comparison, including per-agent reports and
/// final passenger states.
pub fn export_comparison_to_json(
    comparison: &RoutingComparison,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::write_pretty_json(comparison, file)
}

/// Parameter set of the result that saved the most actions.
pub fn find_best_parameters<'a>(
    results: &[ExperimentResult],
    parameter_sets: &'a [ParameterSet],
) -> Option<&'a ParameterSet> {
    if results.len() != parameter_sets.len() {
        return None;
    }
    best_result_index(results).map(|index| &parameter_sets[index])
}
