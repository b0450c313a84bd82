use super::eligibility::Eligibility;
use super::metrics::MetricDefect;
use super::selector::{InspectionQuality, Selection};
use crate::model::{format_date, Deregistration, Tenure, VehicleFacts};
use chrono::NaiveDate;

pub const NOT_ELIGIBLE: &str = "The vehicle is not eligible to generate CAEs";
pub const NO_VALID_ITVS: &str = "No valid ITVs (all DESFAVORABLE/NEGATIVE)";
pub const SINGLE_VALID_ITV: &str = "Only one valid ITV available";
pub const SINGLE_ODOMETER_ITV: &str = "Only one ITV with odometer reading available";
pub const ITVS_WITHOUT_ODOMETER: &str = "Valid ITVs without odometer readings";
pub const RENTING_ACTIVE: &str = "Renting currently active";

/// Deregistrations and ownership changes before this date are ignored.
pub fn cutoff_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Ordered, duplicate-free list of advisory comments.
#[derive(Debug, Clone, Default)]
pub struct Comments {
    items: Vec<String>,
}

impl Comments {
    pub fn push(&mut self, comment: impl Into<String>) {
        let comment = comment.into();
        if !self.items.contains(&comment) {
            self.items.push(comment);
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

/// Inputs the comment engine evaluates, already computed by the assembler.
pub struct CommentInputs<'a> {
    pub facts: &'a VehicleFacts,
    pub eligibility: Eligibility,
    pub selection: &'a Selection,
    pub metric_defect: Option<MetricDefect>,
    pub report_changes: bool,
}

/// Build the comment list in evaluation order: eligibility, deregistrations,
/// change notes, rollback notes, metric defects, inspection quality.
pub fn build(inputs: &CommentInputs<'_>) -> Vec<String> {
    let mut comments = Comments::default();

    if !inputs.eligibility.is_eligible() {
        comments.push(NOT_ELIGIBLE);
    }

    deregistration_comments(&inputs.facts.deregistration_history, &mut comments);

    if inputs.report_changes {
        change_comments(inputs.facts, &mut comments);
    }

    for rollback in &inputs.selection.discarded_rollbacks {
        let km = rollback
            .odometer_km
            .map(|km| format!(" ({km} km)"))
            .unwrap_or_default();
        comments.push(format!(
            "Odometer rollback discarded at {}{}",
            format_date(rollback.date),
            km
        ));
    }

    match inputs.metric_defect {
        Some(MetricDefect::NegativeInterval { .. }) => {
            comments.push("ITV dates out of order; metrics not computed")
        }
        Some(MetricDefect::DecreasingOdometer { .. }) => {
            comments.push("Decreasing odometer between selected ITVs; metrics not computed")
        }
        Some(MetricDefect::ZeroInterval) => {
            comments.push("Days between ITVs is zero; km 1 year not computable")
        }
        None => {}
    }

    match inputs.selection.quality() {
        InspectionQuality::NoValid => comments.push(NO_VALID_ITVS),
        InspectionQuality::SingleOdometer => comments.push(SINGLE_ODOMETER_ITV),
        InspectionQuality::SingleValid => comments.push(SINGLE_VALID_ITV),
        InspectionQuality::NoOdometer => comments.push(ITVS_WITHOUT_ODOMETER),
        InspectionQuality::Sufficient => {}
    }

    comments.into_vec()
}

fn deregistration_comments(history: &[Deregistration], comments: &mut Comments) {
    let cutoff = cutoff_date();
    let mut recent: Vec<&Deregistration> = history.iter().filter(|d| d.start >= cutoff).collect();
    recent.sort_by_key(|d| d.start);

    for baja in recent {
        let end = baja
            .end
            .map(format_date)
            .unwrap_or_else(|| "present".to_string());
        comments.push(format!(
            "Vehicle deregistered from {} to {}",
            format_date(baja.start),
            end
        ));
    }
}

/// Ownership and renting changes since the cutoff.
fn change_comments(facts: &VehicleFacts, comments: &mut Comments) {
    let cutoff = cutoff_date();

    if let Some(latest) = facts
        .owner_history
        .iter()
        .filter(|t| t.start >= cutoff)
        .max_by_key(|t| t.start)
    {
        comments.push(format!("Ownership change on {}", format_date(latest.start)));
    }

    if !facts.is_renting {
        return;
    }
    let Some(lease) = most_recent(&facts.lessee_history) else {
        return;
    };
    if lease.start >= cutoff {
        comments.push(format!("Renting started on {}", format_date(lease.start)));
    }
    match lease.end {
        Some(end) if end >= cutoff => {
            comments.push(format!("Renting ended on {}", format_date(end)))
        }
        Some(_) => {}
        None => comments.push(RENTING_ACTIVE),
    }
}

fn most_recent(history: &[Tenure]) -> Option<&Tenure> {
    history.iter().max_by_key(|t| t.start)
}
