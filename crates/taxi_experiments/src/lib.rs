//! Parallel routing experiments for the social taxi planner.
//!
//! Sweeps deviation budgets, fleet sizes, assignment strategies and seeds,
//! runs every scenario with and without detours, and reports how many
//! actions ride sharing saved.
//!
//! # Quick Start
//!
//! ```no_run
//! use taxi_experiments::{export_to_csv, run_parallel_experiments, summarize, ParameterSpace};
//!
//! let space = ParameterSpace::grid()
//!     .deviation_budget(vec![0, 1, 2, 3, 4])
//!     .fleet_size(vec![2, 3, 4])
//!     .seed_range(0, 10);
//!
//! let results = run_parallel_experiments(space.generate(), None);
//! let summary = summarize(&results);
//! println!("average actions saved: {:.2}", summary.avg_actions_saved);
//! export_to_csv(&results, "sweep.csv").unwrap();
//! ```
//!
//! # Modules
//!
//! - [`parameters`]: grid search and random sampling over scenario params
//! - [`runner`]: parallel execution using rayon
//! - [`metrics`]: per-run result rows and sweep summaries
//! - [`export`]: CSV and JSON output

pub mod export;
pub mod metrics;
pub mod parameters;
pub mod runner;

pub use export::{export_comparison_to_json, export_to_csv, export_to_json, find_best_parameters};
pub use metrics::{best_result_index, extract_metrics, summarize, ExperimentResult, SweepSummary};
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{run_parallel_experiments, run_parallel_experiments_with_progress, run_single_experiment};
