//! Example: how the deviation budget changes total work.
//!
//! Sweeps budgets 0..=5 over three fleet sizes and 20 seeds each, prints the
//! mean actions saved per budget and writes every row to `budget_sweep.csv`.

use std::collections::BTreeMap;

use taxi_experiments::{export_to_csv, run_parallel_experiments, summarize, ParameterSpace};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let space = ParameterSpace::grid()
        .deviation_budget((0..=5).collect())
        .fleet_size(vec![2, 3, 4])
        .seed_range(0, 20);

    let parameter_sets = space.generate();
    println!("Running {} scenarios...", parameter_sets.len());
    let results = run_parallel_experiments(parameter_sets, None);

    let mut by_budget: BTreeMap<usize, Vec<_>> = BTreeMap::new();
    for result in &results {
        by_budget
            .entry(result.deviation_budget)
            .or_default()
            .push(result.clone());
    }

    println!("\nbudget  runs  detours  avg saved  better");
    for (budget, rows) in &by_budget {
        let summary = summarize(rows);
        println!(
            "{:>6}  {:>4}  {:>7}  {:>9.2}  {:>6}",
            budget,
            summary.runs - summary.failed,
            summary.total_detours,
            summary.avg_actions_saved,
            summary.runs_with_savings
        );
    }

    export_to_csv(&results, "budget_sweep.csv")?;
    println!("\nWrote budget_sweep.csv");
    Ok(())
}
