use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::aggregate;
use crate::efficiency::compute_efficiency;
use crate::error::QcmError;
use crate::filter::{filter_trips, TripRejection};
use crate::policy::ScoringPolicy;
use crate::scoring::{score_trips, StockScoreReport};
use crate::types::{CatchRecord, CostRecord, LimitRecord, ScoredTrip, StockLimit};

#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub catch: Vec<CatchRecord>,
    pub costs: Vec<CostRecord>,
    pub limits: Vec<LimitRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub policy: ScoringPolicy,
    pub limits: BTreeMap<String, StockLimit>,
    pub stocks: BTreeMap<String, StockScoreReport>,
    pub rejected: Vec<TripRejection>,
    pub trips: BTreeMap<String, ScoredTrip>,
}

impl PipelineOutput {
    pub fn mean_p_score(&self) -> f64 {
        if self.trips.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trips.values().map(|t| t.p_score).sum();
        #[allow(clippy::cast_precision_loss)]
        let n = self.trips.len() as f64;
        total / n
    }
}

pub fn run_pipeline(
    input: &PipelineInput,
    policy: &ScoringPolicy,
) -> Result<PipelineOutput, QcmError> {
    policy.validate()?;

    let dataset = aggregate(&input.catch, &input.costs, &input.limits, policy);
    let filtered = filter_trips(dataset.trips, policy);
    let efficient = filtered
        .kept
        .into_iter()
        .map(|(trip_id, trip)| (trip_id, compute_efficiency(trip)))
        .collect();
    let scored = score_trips(efficient, &dataset.limits, policy);

    let output = PipelineOutput {
        policy: policy.clone(),
        limits: dataset.limits,
        stocks: scored.stocks,
        rejected: filtered.rejected,
        trips: scored.trips,
    };
    info!(
        scored = output.trips.len(),
        rejected = output.rejected.len(),
        mean_p_score = output.mean_p_score(),
        "pipeline complete"
    );
    Ok(output)
}
