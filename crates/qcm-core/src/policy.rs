use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QcmError;

pub const DEFAULT_MIN_GFISH_CATCH: f64 = 15.0;
pub const DEFAULT_MIN_GFISH_RATIO: f64 = 0.0075;
pub const DEFAULT_NON_GFISH_GUARD: f64 = 0.1;
pub const DEFAULT_LOW_BUFFER: f64 = 0.15;
pub const NON_GFISH_TAG: &str = "non_gfish";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchAggregation {
    #[default]
    LastWins,
    Sum,
    Mean,
}

impl CatchAggregation {
    pub fn label(self) -> &'static str {
        match self {
            Self::LastWins => "last",
            Self::Sum => "sum",
            Self::Mean => "mean",
        }
    }
}

impl FromStr for CatchAggregation {
    type Err = QcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" | "last_wins" | "last-wins" => Ok(Self::LastWins),
            "sum" | "total" => Ok(Self::Sum),
            "mean" | "avg" | "average" => Ok(Self::Mean),
            other => Err(QcmError::InvalidPolicy(format!(
                "unknown catch aggregation `{other}` (expected last, sum or mean)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub min_gfish_catch: f64,
    pub min_gfish_ratio: f64,
    pub non_gfish_guard: f64,
    pub low_buffer: f64,
    pub catch_aggregation: CatchAggregation,
    pub valid_stocks: BTreeSet<String>,
    pub non_gfish_tag: String,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            min_gfish_catch: DEFAULT_MIN_GFISH_CATCH,
            min_gfish_ratio: DEFAULT_MIN_GFISH_RATIO,
            non_gfish_guard: DEFAULT_NON_GFISH_GUARD,
            low_buffer: DEFAULT_LOW_BUFFER,
            catch_aggregation: CatchAggregation::default(),
            valid_stocks: default_valid_stocks(),
            non_gfish_tag: NON_GFISH_TAG.to_string(),
        }
    }
}

impl ScoringPolicy {
    pub fn is_valid_stock(&self, stock_id: &str) -> bool {
        self.valid_stocks.contains(stock_id)
    }

    pub fn validate(&self) -> Result<(), QcmError> {
        let finite = [
            ("min_gfish_catch", self.min_gfish_catch),
            ("min_gfish_ratio", self.min_gfish_ratio),
            ("non_gfish_guard", self.non_gfish_guard),
            ("low_buffer", self.low_buffer),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(QcmError::InvalidPolicy(format!("{name} must be finite")));
            }
        }
        if self.min_gfish_catch < 0.0 || self.min_gfish_ratio < 0.0 {
            return Err(QcmError::InvalidPolicy(
                "groundfish thresholds cannot be negative".to_string(),
            ));
        }
        if self.non_gfish_guard <= 0.0 {
            return Err(QcmError::InvalidPolicy(
                "non_gfish_guard must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.low_buffer) {
            return Err(QcmError::InvalidPolicy(
                "low_buffer must lie in [0, 1)".to_string(),
            ));
        }
        if self.valid_stocks.is_empty() {
            return Err(QcmError::InvalidPolicy(
                "valid stock allow-list is empty".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn default_valid_stocks() -> BTreeSet<String> {
    (1..=17).map(|id: u32| id.to_string()).collect()
}
