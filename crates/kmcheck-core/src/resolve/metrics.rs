use crate::model::InspectionEvent;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub days_between: Option<i64>,
    pub km_between_itvs: Option<i64>,
    pub km_per_year: Option<i64>,
}

/// A data-quality problem found while computing metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricDefect {
    /// The last inspection predates the penultimate one.
    NegativeInterval { days: i64 },
    /// The odometer went down between the selected pair.
    DecreasingOdometer { km: i64 },
    /// Both inspections fall on the same day; no yearly projection.
    ZeroInterval,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsOutcome {
    pub metrics: Metrics,
    pub defect: Option<MetricDefect>,
}

/// Compute elapsed days and mileage from the selected pair.
///
/// Any missing event or reading leaves every metric absent.
pub fn compute(
    penultimate: Option<&InspectionEvent>,
    last: Option<&InspectionEvent>,
) -> MetricsOutcome {
    let (Some(pen), Some(last)) = (penultimate, last) else {
        return MetricsOutcome::default();
    };
    let (Some(pen_km), Some(last_km)) = (pen.odometer_km, last.odometer_km) else {
        return MetricsOutcome::default();
    };

    let days = last.date.signed_duration_since(pen.date).num_days();
    if days < 0 {
        tracing::warn!(days, "last ITV predates penultimate ITV");
        return defect(MetricDefect::NegativeInterval { days });
    }

    let (Ok(pen_km), Ok(last_km)) = (i64::try_from(pen_km), i64::try_from(last_km)) else {
        tracing::warn!(pen_km, last_km, "odometer reading out of range");
        return MetricsOutcome::default();
    };
    let km = last_km - pen_km;
    if km < 0 {
        tracing::warn!(km, "decreasing odometer between selected ITVs");
        return defect(MetricDefect::DecreasingOdometer { km });
    }

    let metrics = Metrics {
        days_between: Some(days),
        km_between_itvs: Some(km),
        km_per_year: km_per_year(km, days),
    };

    MetricsOutcome {
        metrics,
        defect: (days == 0).then_some(MetricDefect::ZeroInterval),
    }
}

/// Yearly projection `km * 365 / days`, rounded half-up to whole km.
pub fn km_per_year(km: i64, days: i64) -> Option<i64> {
    if days <= 0 {
        return None;
    }
    let projected = Decimal::from(km) * Decimal::from(365) / Decimal::from(days);
    projected
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

fn defect(defect: MetricDefect) -> MetricsOutcome {
    MetricsOutcome {
        metrics: Metrics::default(),
        defect: Some(defect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InspectionResult;
    use chrono::NaiveDate;

    fn fav(date: &str, km: Option<u64>) -> InspectionEvent {
        InspectionEvent {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            result: InspectionResult::Favorable,
            odometer_km: km,
            station: None,
        }
    }

    #[test]
    fn test_one_year_interval() {
        let pen = fav("2022-01-01", Some(10000));
        let last = fav("2023-01-01", Some(22500));
        let out = compute(Some(&pen), Some(&last));
        assert_eq!(out.metrics.days_between, Some(365));
        assert_eq!(out.metrics.km_between_itvs, Some(12500));
        assert_eq!(out.metrics.km_per_year, Some(12500));
        assert!(out.defect.is_none());
    }

    #[test]
    fn test_missing_reading_leaves_metrics_absent() {
        let pen = fav("2022-01-01", None);
        let last = fav("2023-01-01", Some(22500));
        let out = compute(Some(&pen), Some(&last));
        assert_eq!(out.metrics, Metrics::default());
        assert!(out.defect.is_none());
        assert_eq!(compute(None, Some(&last)).metrics, Metrics::default());
    }

    #[test]
    fn test_negative_interval_is_defect() {
        let pen = fav("2023-01-01", Some(10000));
        let last = fav("2022-01-01", Some(20000));
        let out = compute(Some(&pen), Some(&last));
        assert_eq!(out.metrics, Metrics::default());
        assert_eq!(
            out.defect,
            Some(MetricDefect::NegativeInterval { days: -365 })
        );
    }

    #[test]
    fn test_decreasing_km_is_defect() {
        let pen = fav("2022-01-01", Some(20000));
        let last = fav("2023-01-01", Some(10000));
        let out = compute(Some(&pen), Some(&last));
        assert_eq!(out.metrics.km_between_itvs, None);
        assert_eq!(
            out.defect,
            Some(MetricDefect::DecreasingOdometer { km: -10000 })
        );
    }

    #[test]
    fn test_out_of_range_reading_leaves_metrics_absent() {
        let pen = fav("2022-01-01", Some(10000));
        let last = fav("2023-01-01", Some(u64::MAX));
        let out = compute(Some(&pen), Some(&last));
        assert_eq!(out.metrics, Metrics::default());
        assert!(out.defect.is_none());
    }

    #[test]
    fn test_zero_interval_keeps_delta() {
        let pen = fav("2022-01-01", Some(10000));
        let last = fav("2022-01-01", Some(10100));
        let out = compute(Some(&pen), Some(&last));
        assert_eq!(out.metrics.days_between, Some(0));
        assert_eq!(out.metrics.km_between_itvs, Some(100));
        assert_eq!(out.metrics.km_per_year, None);
        assert_eq!(out.defect, Some(MetricDefect::ZeroInterval));
    }

    #[test]
    fn test_rounding_half_up() {
        // 1 * 365 / 730 = 0.5
        assert_eq!(km_per_year(1, 730), Some(1));
        // 100 * 365 / 300 = 121.666..
        assert_eq!(km_per_year(100, 300), Some(122));
        // 3 * 365 / 1000 = 1.095
        assert_eq!(km_per_year(3, 1000), Some(1));
        assert_eq!(km_per_year(500, 0), None);
    }
}
