use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::bounded;
use crate::policy::ScoringPolicy;
use crate::types::{ScoredTrip, StockLimit, TripEfficiency};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockBand {
    NoEligibleTrips,
    NonPositive {
        max_efficiency: f64,
        min_efficiency: Option<f64>,
    },
    Banded {
        max_efficiency: f64,
        min_efficiency: f64,
        buffered_min: f64,
        range_modifier: f64,
    },
    // zero-width range: trips at the max score 1, the rest 0
    Degenerate {
        max_efficiency: f64,
        min_efficiency: f64,
        buffered_min: f64,
    },
}

impl StockBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoEligibleTrips => "no_eligible_trips",
            Self::NonPositive { .. } => "non_positive",
            Self::Banded { .. } => "banded",
            Self::Degenerate { .. } => "degenerate",
        }
    }

    pub fn from_bounds(max_efficiency: f64, min_efficiency: Option<f64>, low_buffer: f64) -> Self {
        let min = match min_efficiency {
            Some(min) if max_efficiency > 0.0 && min > 0.0 => min,
            _ => {
                return Self::NonPositive {
                    max_efficiency,
                    min_efficiency,
                }
            }
        };

        let buffered_min = min * (1.0 - low_buffer);
        let range_modifier = 1.0 - buffered_min / max_efficiency;
        if range_modifier <= 0.0 {
            Self::Degenerate {
                max_efficiency,
                min_efficiency: min,
                buffered_min,
            }
        } else {
            Self::Banded {
                max_efficiency,
                min_efficiency: min,
                buffered_min,
                range_modifier,
            }
        }
    }

    pub fn score(&self, efficiency: f64) -> f64 {
        if efficiency <= 0.0 {
            return 0.0;
        }
        match *self {
            Self::NoEligibleTrips | Self::NonPositive { .. } => 0.0,
            Self::Banded {
                buffered_min,
                range_modifier,
                ..
            } => {
                let relative_efficiency = 1.0 - buffered_min / efficiency;
                (relative_efficiency / range_modifier).max(0.0)
            }
            Self::Degenerate { max_efficiency, .. } => {
                if efficiency >= max_efficiency {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockScoreReport {
    pub stock_id: String,
    pub limit: f64,
    pub eligible: usize,
    pub admitted: usize,
    pub cumulative_catch: f64,
    pub band: StockBand,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedTrip<'a> {
    pub trip_id: &'a str,
    pub efficiency: f64,
    pub catch: f64,
}

pub fn rank_eligible<'a>(
    trips: &'a BTreeMap<String, TripEfficiency>,
    stock_id: &str,
) -> Vec<RankedTrip<'a>> {
    let mut ranked: Vec<RankedTrip<'a>> = trips
        .values()
        .filter_map(|trip| {
            let efficiency = trip
                .stock_effics
                .get(stock_id)
                .copied()
                .filter(|e| e.is_finite())?;
            Some(RankedTrip {
                trip_id: trip.trip_id(),
                efficiency,
                catch: trip.catch.stock_catch.get(stock_id).copied().unwrap_or(0.0),
            })
        })
        .collect();
    // ties go to the lower trip id so the cutoff window is stable
    ranked.sort_by(|a, b| {
        b.efficiency
            .total_cmp(&a.efficiency)
            .then_with(|| a.trip_id.cmp(b.trip_id))
    });
    ranked
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CutoffWalk {
    pub min_efficiency: Option<f64>,
    pub admitted: usize,
    pub cumulative_catch: f64,
}

pub fn walk_cutoff(ranked: &[RankedTrip<'_>], limit: f64) -> CutoffWalk {
    let mut walk = CutoffWalk::default();
    for entry in ranked {
        if entry.efficiency <= 0.0 {
            break;
        }
        walk.cumulative_catch = bounded(walk.cumulative_catch + entry.catch);
        walk.min_efficiency = Some(entry.efficiency);
        walk.admitted += 1;
        // the trip crossing the limit is admitted before stopping
        if walk.cumulative_catch >= limit {
            break;
        }
    }
    walk
}

pub fn score_stock(
    trips: &BTreeMap<String, TripEfficiency>,
    limit: &StockLimit,
    policy: &ScoringPolicy,
) -> (BTreeMap<String, f64>, StockScoreReport) {
    let ranked = rank_eligible(trips, &limit.stock_id);
    let Some(top) = ranked.first() else {
        return (
            BTreeMap::new(),
            StockScoreReport {
                stock_id: limit.stock_id.clone(),
                limit: limit.limit,
                eligible: 0,
                admitted: 0,
                cumulative_catch: 0.0,
                band: StockBand::NoEligibleTrips,
            },
        );
    };

    let walk = walk_cutoff(&ranked, limit.limit);
    let band = StockBand::from_bounds(top.efficiency, walk.min_efficiency, policy.low_buffer);
    let scores = ranked
        .iter()
        .map(|entry| (entry.trip_id.to_string(), band.score(entry.efficiency)))
        .collect();

    (
        scores,
        StockScoreReport {
            stock_id: limit.stock_id.clone(),
            limit: limit.limit,
            eligible: ranked.len(),
            admitted: walk.admitted,
            cumulative_catch: walk.cumulative_catch,
            band,
        },
    )
}

pub fn final_p_score(stock_p_scores: &BTreeMap<String, f64>) -> f64 {
    stock_p_scores
        .values()
        .copied()
        .reduce(f64::min)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    pub trips: BTreeMap<String, ScoredTrip>,
    pub stocks: BTreeMap<String, StockScoreReport>,
}

pub fn score_trips(
    trips: BTreeMap<String, TripEfficiency>,
    limits: &BTreeMap<String, StockLimit>,
    policy: &ScoringPolicy,
) -> ScoringOutcome {
    let mut per_trip: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut stocks = BTreeMap::new();

    for limit in limits.values() {
        let (scores, report) = score_stock(&trips, limit, policy);
        debug!(
            stock_id = %report.stock_id,
            limit = report.limit,
            eligible = report.eligible,
            admitted = report.admitted,
            band = report.band.label(),
            "stock scored"
        );
        for (trip_id, score) in scores {
            per_trip
                .entry(trip_id)
                .or_default()
                .insert(limit.stock_id.clone(), score);
        }
        stocks.insert(limit.stock_id.clone(), report);
    }

    let trips: BTreeMap<String, ScoredTrip> = trips
        .into_iter()
        .map(|(trip_id, trip)| {
            let stock_p_scores = per_trip.remove(&trip_id).unwrap_or_default();
            let p_score = final_p_score(&stock_p_scores);
            (
                trip_id,
                ScoredTrip {
                    trip,
                    stock_p_scores,
                    p_score,
                },
            )
        })
        .collect();

    info!(
        trips = trips.len(),
        stocks = stocks.len(),
        "probability scoring complete"
    );
    ScoringOutcome { trips, stocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::efficiency::compute_efficiency;
    use crate::types::TripCatch;

    const EPS: f64 = 1e-9;

    fn trip(id: &str, netrev: f64, stocks: &[(&str, f64)]) -> TripEfficiency {
        let mut catch = TripCatch::new(id);
        catch.trip_revenue = netrev.max(0.0);
        catch.variable_cost = (-netrev).max(0.0);
        for (stock, c) in stocks {
            catch.stock_catch.insert((*stock).to_string(), *c);
        }
        compute_efficiency(catch)
    }

    fn trips(list: Vec<TripEfficiency>) -> BTreeMap<String, TripEfficiency> {
        list.into_iter()
            .map(|t| (t.trip_id().to_string(), t))
            .collect()
    }

    fn limit(stock: &str, value: f64) -> StockLimit {
        StockLimit {
            stock_id: stock.to_string(),
            limit: value,
        }
    }

    #[test]
    fn sole_trip_scores_one() {
        let set = trips(vec![trip("T1", 600.0, &[("3", 15.0)])]);
        let (scores, report) = score_stock(&set, &limit("3", 100.0), &ScoringPolicy::default());

        assert!((scores["T1"] - 1.0).abs() < EPS);
        match report.band {
            StockBand::Banded {
                max_efficiency,
                min_efficiency,
                buffered_min,
                range_modifier,
            } => {
                assert!((max_efficiency - 40.0).abs() < EPS);
                assert!((min_efficiency - 40.0).abs() < EPS);
                assert!((buffered_min - 34.0).abs() < EPS);
                assert!((range_modifier - 0.15).abs() < EPS);
            }
            other => unreachable!("unexpected band {other:?}"),
        }
    }

    #[test]
    fn ranking_breaks_ties_by_trip_id() {
        let set = trips(vec![
            trip("B", 100.0, &[("1", 10.0)]),
            trip("A", 100.0, &[("1", 10.0)]),
            trip("C", 300.0, &[("1", 10.0)]),
            trip("D", 50.0, &[("2", 10.0)]),
        ]);
        let ranked = rank_eligible(&set, "1");
        let ids: Vec<&str> = ranked.iter().map(|r| r.trip_id).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn walk_admits_the_trip_crossing_the_limit() {
        let set = trips(vec![
            trip("A", 1000.0, &[("1", 10.0)]), // 100
            trip("B", 1000.0, &[("1", 20.0)]), // 50
            trip("C", 1000.0, &[("1", 50.0)]), // 20
        ]);
        let ranked = rank_eligible(&set, "1");
        let walk = walk_cutoff(&ranked, 25.0);
        assert_eq!(walk.admitted, 2);
        assert_eq!(walk.min_efficiency, Some(50.0));
        assert_eq!(walk.cumulative_catch, 30.0);
    }

    #[test]
    fn walk_stops_before_non_positive_efficiency() {
        let set = trips(vec![
            trip("A", 1000.0, &[("1", 10.0)]),
            trip("B", -100.0, &[("1", 10.0)]),
        ]);
        let ranked = rank_eligible(&set, "1");
        let walk = walk_cutoff(&ranked, 1_000.0);
        assert_eq!(walk.admitted, 1);
        assert_eq!(walk.min_efficiency, Some(100.0));
    }

    #[test]
    fn cumulative_catch_saturates_instead_of_overflowing() {
        let ranked = [
            RankedTrip {
                trip_id: "A",
                efficiency: 2.0,
                catch: 1.0e308,
            },
            RankedTrip {
                trip_id: "B",
                efficiency: 1.0,
                catch: 1.0e308,
            },
        ];
        let walk = walk_cutoff(&ranked, f64::MAX);
        assert_eq!(walk.admitted, 2);
        assert_eq!(walk.cumulative_catch, f64::MAX);
        assert_eq!(walk.min_efficiency, Some(1.0));
    }

    #[test]
    fn exhausted_walk_keeps_last_processed_efficiency() {
        let set = trips(vec![
            trip("A", 1000.0, &[("1", 10.0)]),
            trip("B", 500.0, &[("1", 10.0)]),
        ]);
        let ranked = rank_eligible(&set, "1");
        let walk = walk_cutoff(&ranked, 1_000_000.0);
        assert_eq!(walk.admitted, 2);
        assert_eq!(walk.min_efficiency, Some(50.0));
    }

    #[test]
    fn scores_every_eligible_trip_not_only_the_window() {
        let set = trips(vec![
            trip("A", 1000.0, &[("1", 10.0)]), // 100
            trip("B", 1000.0, &[("1", 20.0)]), // 50
            trip("C", 1000.0, &[("1", 50.0)]), // 20
            trip("D", -10.0, &[("1", 5.0)]),   // -2
        ]);
        let (scores, report) = score_stock(&set, &limit("1", 25.0), &ScoringPolicy::default());
        assert_eq!(report.eligible, 4);
        assert_eq!(scores.len(), 4);

        // buffered_min = 42.5, range_modifier = 0.575
        assert!((scores["A"] - 1.0).abs() < EPS);
        let b = (1.0 - 42.5 / 50.0) / 0.575;
        assert!((scores["B"] - b).abs() < EPS);
        // below the buffered cutoff clamps to zero
        assert_eq!(scores["C"], 0.0);
        assert_eq!(scores["D"], 0.0);
        assert!(scores["A"] >= scores["B"]);
    }

    #[test]
    fn non_positive_top_zeroes_the_stock() {
        let set = trips(vec![
            trip("A", -100.0, &[("1", 10.0)]),
            trip("B", 0.0, &[("1", 10.0)]),
        ]);
        let (scores, report) = score_stock(&set, &limit("1", 5.0), &ScoringPolicy::default());
        assert!(matches!(report.band, StockBand::NonPositive { .. }));
        assert_eq!(scores.len(), 2);
        assert!(scores.values().all(|s| *s == 0.0));
    }

    #[test]
    fn empty_eligible_set_adds_no_scores() {
        let set = trips(vec![trip("A", 100.0, &[("2", 10.0)])]);
        let (scores, report) = score_stock(&set, &limit("1", 5.0), &ScoringPolicy::default());
        assert!(scores.is_empty());
        assert_eq!(report.band, StockBand::NoEligibleTrips);
    }

    #[test]
    fn zero_buffer_single_trip_is_degenerate() {
        let policy = ScoringPolicy {
            low_buffer: 0.0,
            ..ScoringPolicy::default()
        };
        let set = trips(vec![
            trip("A", 1000.0, &[("1", 10.0)]),
            trip("B", 100.0, &[("1", 10.0)]),
        ]);
        let (scores, report) = score_stock(&set, &limit("1", 10.0), &policy);
        assert_eq!(report.band.label(), "degenerate");
        assert_eq!(scores["A"], 1.0);
        assert_eq!(scores["B"], 0.0);
    }

    #[test]
    fn p_score_is_minimum_across_stocks() {
        let set = trips(vec![
            trip("A", 1000.0, &[("1", 10.0), ("2", 40.0)]),
            trip("B", 1000.0, &[("1", 20.0), ("2", 10.0)]),
            trip("C", 100.0, &[("23", 10.0)]),
        ]);
        let mut limits = BTreeMap::new();
        limits.insert("1".to_string(), limit("1", 10.0));
        limits.insert("2".to_string(), limit("2", 10.0));

        let out = score_trips(set, &limits, &ScoringPolicy::default());
        for scored in out.trips.values() {
            let expected = scored
                .stock_p_scores
                .values()
                .copied()
                .fold(f64::INFINITY, f64::min);
            if scored.stock_p_scores.is_empty() {
                assert_eq!(scored.p_score, 0.0);
            } else {
                assert_eq!(scored.p_score, expected);
            }
        }
        assert!(out.trips["C"].stock_p_scores.is_empty());
        assert_eq!(out.trips["C"].p_score, 0.0);
        assert_eq!(out.stocks.len(), 2);
    }

    #[test]
    fn final_p_score_of_empty_map_is_zero() {
        assert_eq!(final_p_score(&BTreeMap::new()), 0.0);
    }
}
