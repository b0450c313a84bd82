use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Marker for mileage columns this system does not compute.
pub const NOT_AVAILABLE: &str = "N/A";

/// Normalized summary of one vehicle report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// License plate (Matrícula).
    pub plate: String,
    pub penultimate_date: Option<NaiveDate>,
    /// Odometer reading at the penultimate ITV, in km.
    pub penultimate_km: Option<u64>,
    pub last_date: Option<NaiveDate>,
    /// Odometer reading at the last ITV, in km.
    pub last_km: Option<u64>,
    pub days_between: Option<i64>,
    pub km_between_itvs: Option<i64>,
    /// Yearly projection of `km_between_itvs`, rounded half-up.
    pub km_per_year: Option<i64>,
    pub km_international: String,
    pub km_national: String,
    /// Advisory comments in evaluation order.
    pub comments: Vec<String>,
}

impl OutputRecord {
    /// True when the record carries a full mileage comparison.
    pub fn has_metrics(&self) -> bool {
        self.km_per_year.is_some()
    }
}
