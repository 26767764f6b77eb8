use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchRecord {
    #[serde(alias = "TRIP_ID")]
    pub trip_id: Option<String>,
    pub mri: Option<String>,
    pub spec: Option<String>,
    #[serde(alias = "stock_id1")]
    pub stock_id: Option<String>,
    #[serde(alias = "land")]
    pub landed: Option<String>,
    #[serde(alias = "disc")]
    pub discarded: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRecord {
    #[serde(alias = "TRIP_ID")]
    pub trip_id: Option<String>,
    pub trip_revenue: Option<String>,
    pub variable_cost: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitRecord {
    #[serde(alias = "stock_id1")]
    pub stock_id: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesGroup {
    Gfish,
    NonGfish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLimit {
    pub stock_id: String,
    pub limit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripCatch {
    pub trip_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mri: Option<String>,
    pub stock_catch: BTreeMap<String, f64>,
    pub spec_totals: BTreeMap<SpeciesGroup, f64>,
    pub trip_revenue: f64,
    pub variable_cost: f64,
}

impl TripCatch {
    pub fn new(trip_id: impl Into<String>) -> Self {
        Self {
            trip_id: trip_id.into(),
            ..Self::default()
        }
    }

    pub fn spec_total(&self, group: SpeciesGroup) -> Option<f64> {
        self.spec_totals.get(&group).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripEfficiency {
    #[serde(flatten)]
    pub catch: TripCatch,
    pub netrev: f64,
    pub stock_effics: BTreeMap<String, f64>,
}

impl TripEfficiency {
    pub fn trip_id(&self) -> &str {
        &self.catch.trip_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrip {
    #[serde(flatten)]
    pub trip: TripEfficiency,
    pub stock_p_scores: BTreeMap<String, f64>,
    pub p_score: f64,
}

impl ScoredTrip {
    pub fn trip_id(&self) -> &str {
        self.trip.trip_id()
    }
}
