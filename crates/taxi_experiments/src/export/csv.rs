use crate::metrics::ExperimentResult;

pub(crate) fn export_to_csv_impl(
    results: &[ExperimentResult],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "num_taxis",
        "num_passengers",
        "deviation_budget",
        "strategy",
        "assignment_cost",
        "social_actions",
        "direct_actions",
        "actions_saved",
        "detours",
        "social_delivered",
        "direct_delivered",
        "pending_actions",
        "error",
    ])?;

    for result in results {
        wtr.write_record([
            result.experiment_id.as_str(),
            &result.run_id.to_string(),
            &result.seed.to_string(),
            &result.num_taxis.to_string(),
            &result.num_passengers.to_string(),
            &result.deviation_budget.to_string(),
            &result.strategy,
            &result.assignment_cost.to_string(),
            &result.social_actions.to_string(),
            &result.direct_actions.to_string(),
            &result.actions_saved.to_string(),
            &result.detours.to_string(),
            &result.social_delivered.to_string(),
            &result.direct_delivered.to_string(),
            &result.pending_actions.to_string(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
