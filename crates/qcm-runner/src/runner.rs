use std::path::PathBuf;

use qcm_core::{run_pipeline, PipelineInput, PipelineOutput};
use qcm_ingest::{read_catch_records, read_cost_records, read_limit_records, write_report};
use serde::Serialize;
use tracing::info;

use crate::config::RunnerConfig;
use crate::error::RunnerError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub trips_scored: usize,
    pub trips_rejected: usize,
    pub stocks: usize,
    pub mean_p_score: f64,
    pub output_path: PathBuf,
}

pub struct QuotaChangeRunner {
    config: RunnerConfig,
}

impl QuotaChangeRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn ingest(&self) -> Result<PipelineInput, RunnerError> {
        let cfg = &self.config;
        let input = PipelineInput {
            catch: read_catch_records(&cfg.catch_path)?,
            costs: read_cost_records(&cfg.cost_path)?,
            limits: read_limit_records(&cfg.acl_path, &cfg.limit_column)?,
        };
        info!(
            catch = input.catch.len(),
            costs = input.costs.len(),
            limits = input.limits.len(),
            limit_column = %cfg.limit_column,
            "inputs ingested"
        );
        Ok(input)
    }

    pub fn calculate_p_scores(&self, input: &PipelineInput) -> Result<PipelineOutput, RunnerError> {
        Ok(run_pipeline(input, &self.config.policy)?)
    }

    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        let input = self.ingest()?;
        let output = self.calculate_p_scores(&input)?;
        write_report(&self.config.output_path, &output)?;

        let summary = RunSummary {
            trips_scored: output.trips.len(),
            trips_rejected: output.rejected.len(),
            stocks: output.stocks.len(),
            mean_p_score: output.mean_p_score(),
            output_path: self.config.output_path.clone(),
        };
        info!(
            trips_scored = summary.trips_scored,
            trips_rejected = summary.trips_rejected,
            stocks = summary.stocks,
            mean_p_score = summary.mean_p_score,
            output = %summary.output_path.display(),
            "p-score report written"
        );
        Ok(summary)
    }
}
