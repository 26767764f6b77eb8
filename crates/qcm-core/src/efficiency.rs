use crate::aggregate::bounded;
use crate::types::{TripCatch, TripEfficiency};

pub fn net_revenue(trip: &TripCatch) -> f64 {
    trip.trip_revenue - trip.variable_cost
}

pub fn catch_efficiency(netrev: f64, catch: f64) -> f64 {
    if catch > 0.0 {
        bounded(netrev / catch)
    } else {
        0.0
    }
}

pub fn compute_efficiency(trip: TripCatch) -> TripEfficiency {
    let netrev = net_revenue(&trip);
    let stock_effics = trip
        .stock_catch
        .iter()
        .map(|(stock_id, catch)| (stock_id.clone(), catch_efficiency(netrev, *catch)))
        .collect();
    TripEfficiency {
        catch: trip,
        netrev,
        stock_effics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficiency_is_netrev_per_unit_catch() {
        let mut trip = TripCatch::new("T1");
        trip.trip_revenue = 1000.0;
        trip.variable_cost = 400.0;
        trip.stock_catch.insert("3".to_string(), 15.0);
        trip.stock_catch.insert("4".to_string(), 60.0);

        let out = compute_efficiency(trip);
        assert_eq!(out.netrev, 600.0);
        assert_eq!(out.stock_effics["3"], 40.0);
        assert_eq!(out.stock_effics["4"], 10.0);
        assert_eq!(
            out.stock_effics.keys().collect::<Vec<_>>(),
            out.catch.stock_catch.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn negative_netrev_and_zero_catch() {
        assert_eq!(catch_efficiency(-300.0, 30.0), -10.0);
        assert_eq!(catch_efficiency(500.0, 0.0), 0.0);
    }

    #[test]
    fn tiny_catch_keeps_efficiency_finite() {
        assert_eq!(catch_efficiency(1.0e10, 1.0e-300), f64::MAX);
        assert_eq!(catch_efficiency(-1.0e10, 1.0e-300), -f64::MAX);
    }
}
