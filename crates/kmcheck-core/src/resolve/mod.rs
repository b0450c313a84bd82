pub mod comments;
pub mod eligibility;
pub mod metrics;
pub mod outcome;
pub mod selector;

pub use eligibility::{ClientFilter, Eligibility};
pub use outcome::{OutputRecord, NOT_AVAILABLE};
pub use selector::{InspectionQuality, Selection};

use crate::model::VehicleFacts;
use comments::CommentInputs;

/// Per-run settings threaded into the engine.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Authorized client; `None` processes every vehicle without
    /// ownership/leasing checks.
    pub client_filter: Option<String>,
    /// Also note ownership and renting changes since the cutoff date.
    pub report_changes: bool,
}

impl ResolveOptions {
    pub fn with_client(client: impl Into<String>) -> Self {
        ResolveOptions {
            client_filter: Some(client.into()),
            ..Default::default()
        }
    }
}

/// Resolve one report's facts into its output record.
///
/// Every business condition ends up as an absent field or a comment; this
/// never fails.
pub fn resolve_record(facts: &VehicleFacts, options: &ResolveOptions) -> OutputRecord {
    let selection = selector::select(&facts.inspection_history);
    let outcome = metrics::compute(selection.penultimate.as_ref(), selection.last.as_ref());

    let filter = options.client_filter.as_deref().and_then(ClientFilter::new);
    let eligibility = eligibility::check(facts, filter.as_ref());

    let comments = comments::build(&CommentInputs {
        facts,
        eligibility,
        selection: &selection,
        metric_defect: outcome.defect,
        report_changes: options.report_changes,
    });

    OutputRecord {
        plate: facts.plate.clone(),
        penultimate_date: selection.penultimate.as_ref().map(|e| e.date),
        penultimate_km: selection.penultimate.as_ref().and_then(|e| e.odometer_km),
        last_date: selection.last.as_ref().map(|e| e.date),
        last_km: selection.last.as_ref().and_then(|e| e.odometer_km),
        days_between: outcome.metrics.days_between,
        km_between_itvs: outcome.metrics.km_between_itvs,
        km_per_year: outcome.metrics.km_per_year,
        km_international: NOT_AVAILABLE.to_string(),
        km_national: NOT_AVAILABLE.to_string(),
        comments,
    }
}
