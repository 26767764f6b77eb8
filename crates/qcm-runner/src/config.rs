use std::path::PathBuf;

use qcm_core::{
    CatchAggregation, ScoringPolicy, DEFAULT_LOW_BUFFER, DEFAULT_MIN_GFISH_CATCH,
    DEFAULT_MIN_GFISH_RATIO,
};
use qcm_ingest::DEFAULT_LIMIT_COLUMN;

use crate::error::RunnerError;
use crate::logging::LogFormat;

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub catch_path: PathBuf,
    pub cost_path: PathBuf,
    pub acl_path: PathBuf,
    pub output_path: PathBuf,
    pub limit_column: String,
    pub policy: ScoringPolicy,
    pub log_format: LogFormat,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            catch_path: PathBuf::from("./data/catch.csv"),
            cost_path: PathBuf::from("./data/costs.csv"),
            acl_path: PathBuf::from("./data/acl.csv"),
            output_path: PathBuf::from("./data/p_scores.json"),
            limit_column: DEFAULT_LIMIT_COLUMN.to_string(),
            policy: ScoringPolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let text = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |name: &str, default: f64, min: f64, max: f64| {
            text(name)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
                .clamp(min, max)
        };

        let defaults = Self::default();
        let catch_aggregation = match text("QCM_CATCH_AGGREGATION") {
            Some(raw) => raw.parse::<CatchAggregation>()?,
            None => CatchAggregation::default(),
        };
        let valid_stocks = match text("QCM_VALID_STOCKS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.policy.valid_stocks.clone(),
        };
        let log_format = match text("QCM_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>()?,
            None => LogFormat::default(),
        };

        let policy = ScoringPolicy {
            min_gfish_catch: number("QCM_MIN_GFISH_CATCH", DEFAULT_MIN_GFISH_CATCH, 0.0, 1.0e12),
            min_gfish_ratio: number("QCM_MIN_GFISH_RATIO", DEFAULT_MIN_GFISH_RATIO, 0.0, 1.0e6),
            low_buffer: number("QCM_LOW_BUFFER", DEFAULT_LOW_BUFFER, 0.0, 0.99),
            catch_aggregation,
            valid_stocks,
            ..defaults.policy
        };
        policy.validate()?;

        Ok(Self {
            catch_path: text("QCM_CATCH_PATH").map_or(defaults.catch_path, PathBuf::from),
            cost_path: text("QCM_COST_PATH").map_or(defaults.cost_path, PathBuf::from),
            acl_path: text("QCM_ACL_PATH").map_or(defaults.acl_path, PathBuf::from),
            output_path: text("QCM_OUTPUT_PATH").map_or(defaults.output_path, PathBuf::from),
            limit_column: text("QCM_ACL_LIMIT_COLUMN").unwrap_or(defaults.limit_column),
            policy,
            log_format,
        })
    }
}
