use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a periodic technical inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InspectionResult {
    Favorable,
    Desfavorable,
    Negative,
    Other,
}

impl InspectionResult {
    /// Map a result cell from the report. "FAVORABLE CON DEFECTOS" and
    /// similar variants count as favorable.
    pub fn from_str_loose(s: &str) -> InspectionResult {
        let upper = s.trim().to_uppercase();
        if upper.starts_with("DESFAVORABLE") {
            InspectionResult::Desfavorable
        } else if upper.starts_with("NEGATIV") {
            InspectionResult::Negative
        } else if upper.starts_with("FAVORABLE") {
            InspectionResult::Favorable
        } else {
            InspectionResult::Other
        }
    }

    /// Failed inspections never count toward mileage comparison.
    pub fn is_failed(&self) -> bool {
        match self {
            InspectionResult::Desfavorable | InspectionResult::Negative => true,
            InspectionResult::Favorable | InspectionResult::Other => false,
        }
    }
}

impl fmt::Display for InspectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectionResult::Favorable => write!(f, "FAVORABLE"),
            InspectionResult::Desfavorable => write!(f, "DESFAVORABLE"),
            InspectionResult::Negative => write!(f, "NEGATIVE"),
            InspectionResult::Other => write!(f, "OTHER"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionEvent {
    pub date: NaiveDate,
    pub result: InspectionResult,
    /// Odometer reading in km, if the station recorded one.
    #[serde(default)]
    pub odometer_km: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
}

/// A period during which a party held the vehicle (as owner or lessee).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenure {
    pub name: String,
    pub start: NaiveDate,
    /// `None` while the tenure is still open.
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl Tenure {
    /// True when the tenure lasted strictly longer than `months` calendar
    /// months. Open tenures are measured up to `as_of`; without a reference
    /// date they never qualify.
    pub fn exceeds_months(&self, months: u32, as_of: Option<NaiveDate>) -> bool {
        let Some(end) = self.end.or(as_of) else {
            return false;
        };
        match self.start.checked_add_months(Months::new(months)) {
            Some(threshold) => end > threshold,
            None => false,
        }
    }
}

/// A period of administrative withdrawal from circulation ("baja").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deregistration {
    pub start: NaiveDate,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Structured facts extracted from one vehicle-history report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleFacts {
    pub plate: String,
    #[serde(default)]
    pub current_owner: String,
    #[serde(default)]
    pub is_renting: bool,
    #[serde(default)]
    pub current_lessee: Option<String>,
    #[serde(default)]
    pub owner_history: Vec<Tenure>,
    #[serde(default)]
    pub lessee_history: Vec<Tenure>,
    #[serde(default)]
    pub inspection_history: Vec<InspectionEvent>,
    #[serde(default)]
    pub deregistration_history: Vec<Deregistration>,
    /// Issue date of the report; reference point for open-ended tenures.
    #[serde(default)]
    pub report_date: Option<NaiveDate>,
}

impl VehicleFacts {
    /// Re-derive the current lessee from the lessee history: the tenure
    /// still running at the report date (open-ended or ending later),
    /// latest start first. Only renting vehicles have one.
    pub fn refresh_current_lessee(&mut self) {
        if !self.is_renting {
            return;
        }
        let as_of = self.report_date;
        self.current_lessee = self
            .lessee_history
            .iter()
            .filter(|t| match (t.end, as_of) {
                (None, _) => true,
                (Some(end), Some(as_of)) => end > as_of,
                (Some(_), None) => false,
            })
            .max_by_key(|t| t.start)
            .map(|t| t.name.clone());
    }

    /// Use `as_of` as the report date when the report carries none.
    ///
    /// A lessee given explicitly is kept; otherwise it is re-derived against
    /// the new reference date.
    pub fn fill_report_date(&mut self, as_of: Option<NaiveDate>) {
        if self.report_date.is_some() || as_of.is_none() {
            return;
        }
        self.report_date = as_of;
        if self.current_lessee.is_none() {
            self.refresh_current_lessee();
        }
    }
}

/// Render a date the way the authority prints it (DD/MM/YYYY).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
