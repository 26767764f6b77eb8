use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::policy::{CatchAggregation, ScoringPolicy};
use crate::types::{CatchRecord, CostRecord, LimitRecord, SpeciesGroup, StockLimit, TripCatch};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDataset {
    pub trips: BTreeMap<String, TripCatch>,
    pub limits: BTreeMap<String, StockLimit>,
}

#[derive(Debug, Clone, Copy, Default)]
struct StockCatchAcc {
    total: f64,
    count: u32,
    last: f64,
}

impl StockCatchAcc {
    fn push(&mut self, catch: f64) {
        self.total = bounded(self.total + catch);
        self.count = self.count.saturating_add(1);
        self.last = catch;
    }

    fn resolve(self, policy: CatchAggregation) -> f64 {
        match policy {
            CatchAggregation::LastWins => self.last,
            CatchAggregation::Sum => self.total,
            CatchAggregation::Mean => {
                if self.count == 0 {
                    0.0
                } else {
                    self.total / f64::from(self.count)
                }
            }
        }
    }
}

// missing, unparseable, non-finite and negative cells all read as zero
pub fn coerce_quantity(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

// overflowed sums and ratios pin to the largest finite value
pub fn bounded(value: f64) -> f64 {
    value.clamp(-f64::MAX, f64::MAX)
}

fn present(raw: Option<&String>) -> Option<&str> {
    raw.map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub fn normalize_spec(spec: &str, policy: &ScoringPolicy) -> SpeciesGroup {
    if spec == policy.non_gfish_tag {
        SpeciesGroup::NonGfish
    } else {
        SpeciesGroup::Gfish
    }
}

pub fn aggregate_catch(
    records: &[CatchRecord],
    policy: &ScoringPolicy,
) -> BTreeMap<String, TripCatch> {
    let mut trips: BTreeMap<String, TripCatch> = BTreeMap::new();
    let mut stock_acc: BTreeMap<String, BTreeMap<String, StockCatchAcc>> = BTreeMap::new();
    let mut skipped = 0_usize;

    for record in records {
        let (Some(trip_id), Some(spec)) = (
            present(record.trip_id.as_ref()),
            present(record.spec.as_ref()),
        ) else {
            skipped += 1;
            continue;
        };

        let trip = trips
            .entry(trip_id.to_string())
            .or_insert_with(|| TripCatch::new(trip_id));
        if trip.mri.is_none() {
            trip.mri = present(record.mri.as_ref()).map(str::to_string);
        }

        let catch = bounded(
            coerce_quantity(record.landed.as_deref())
                + coerce_quantity(record.discarded.as_deref()),
        );
        if catch <= 0.0 {
            continue;
        }

        let total = trip
            .spec_totals
            .entry(normalize_spec(spec, policy))
            .or_insert(0.0);
        *total = bounded(*total + catch);

        if let Some(stock_id) = present(record.stock_id.as_ref()) {
            stock_acc
                .entry(trip_id.to_string())
                .or_default()
                .entry(stock_id.to_string())
                .or_default()
                .push(catch);
        }
    }

    for (trip_id, stocks) in stock_acc {
        if let Some(trip) = trips.get_mut(&trip_id) {
            trip.stock_catch = stocks
                .into_iter()
                .map(|(stock_id, acc)| (stock_id, acc.resolve(policy.catch_aggregation)))
                .collect();
        }
    }

    debug!(
        trips = trips.len(),
        skipped,
        aggregation = policy.catch_aggregation.label(),
        "aggregated catch records"
    );
    trips
}

pub fn apply_costs(trips: &mut BTreeMap<String, TripCatch>, records: &[CostRecord]) {
    let mut orphaned = 0_usize;
    for record in records {
        let Some(trip_id) = present(record.trip_id.as_ref()) else {
            continue;
        };
        let Some(trip) = trips.get_mut(trip_id) else {
            orphaned += 1;
            continue;
        };
        trip.trip_revenue = coerce_quantity(record.trip_revenue.as_deref());
        trip.variable_cost = coerce_quantity(record.variable_cost.as_deref());
    }
    if orphaned > 0 {
        debug!(orphaned, "cost records without matching catch trip");
    }
}

pub fn aggregate_limits(
    records: &[LimitRecord],
    policy: &ScoringPolicy,
) -> BTreeMap<String, StockLimit> {
    let mut limits = BTreeMap::new();
    for record in records {
        let Some(stock_id) = present(record.stock_id.as_ref()) else {
            continue;
        };
        if !policy.is_valid_stock(stock_id) {
            debug!(stock_id, "ignoring limit for stock outside allow-list");
            continue;
        }
        limits.insert(
            stock_id.to_string(),
            StockLimit {
                stock_id: stock_id.to_string(),
                limit: coerce_quantity(record.limit.as_deref()),
            },
        );
    }
    limits
}

pub fn aggregate(
    catch: &[CatchRecord],
    costs: &[CostRecord],
    limits: &[LimitRecord],
    policy: &ScoringPolicy,
) -> AggregatedDataset {
    let mut trips = aggregate_catch(catch, policy);
    apply_costs(&mut trips, costs);
    let limits = aggregate_limits(limits, policy);
    info!(
        catch_records = catch.len(),
        cost_records = costs.len(),
        trips = trips.len(),
        stocks = limits.len(),
        "record aggregation complete"
    );
    AggregatedDataset { trips, limits }
}
