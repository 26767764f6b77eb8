use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::bounded;
use crate::policy::ScoringPolicy;
use crate::types::{SpeciesGroup, TripCatch};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    NoRegulatedStock,
    LowGroundfish { gfish: f64, ratio: f64 },
}

impl RejectionReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoRegulatedStock => "no_regulated_stock",
            Self::LowGroundfish { .. } => "low_groundfish",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRejection {
    pub trip_id: String,
    #[serde(flatten)]
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub kept: BTreeMap<String, TripCatch>,
    pub rejected: Vec<TripRejection>,
}

pub fn check_trip(trip: &TripCatch, policy: &ScoringPolicy) -> Option<RejectionReason> {
    if !trip
        .stock_catch
        .keys()
        .any(|stock_id| policy.is_valid_stock(stock_id))
    {
        return Some(RejectionReason::NoRegulatedStock);
    }

    let gfish = trip.spec_total(SpeciesGroup::Gfish).unwrap_or(0.0);
    let non_gfish = trip
        .spec_total(SpeciesGroup::NonGfish)
        .unwrap_or(policy.non_gfish_guard);
    let ratio = bounded(gfish / non_gfish);
    if gfish <= policy.min_gfish_catch || ratio <= policy.min_gfish_ratio {
        return Some(RejectionReason::LowGroundfish { gfish, ratio });
    }
    None
}

pub fn filter_trips(trips: BTreeMap<String, TripCatch>, policy: &ScoringPolicy) -> FilterOutcome {
    let total = trips.len();
    let mut outcome = FilterOutcome::default();
    for (trip_id, trip) in trips {
        match check_trip(&trip, policy) {
            None => {
                outcome.kept.insert(trip_id, trip);
            }
            Some(reason) => {
                debug!(trip_id = %trip_id, reason = reason.label(), "trip rejected");
                outcome.rejected.push(TripRejection { trip_id, reason });
            }
        }
    }
    info!(
        trips = total,
        kept = outcome.kept.len(),
        rejected = outcome.rejected.len(),
        "trip filter complete"
    );
    outcome
}
