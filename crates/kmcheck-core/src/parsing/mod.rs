pub mod header;
pub mod normalize;
pub mod sections;
pub mod values;

use crate::error::KmError;
use crate::extraction::PageContent;
use crate::model::VehicleFacts;
use header::parse_header;
use sections::{Section, split_sections};
use serde::{Deserialize, Serialize};

/// A table row that looked like data but could not be parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedLine {
    pub section: Section,
    pub line: String,
    pub reason: String,
}

/// Facts parsed from one report, plus the rows that had to be dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFacts {
    pub facts: VehicleFacts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

/// Parse extracted page content into the facts of one vehicle report.
///
/// Fails only when the report has no text or no license plate; unreadable
/// rows are skipped and recorded.
pub fn parse_facts(pages: &[PageContent]) -> Result<ParsedFacts, KmError> {
    let all_lines: Vec<&str> = pages
        .iter()
        .flat_map(|p| p.lines.iter().map(|s| s.as_str()))
        .collect();

    if all_lines.iter().all(|l| l.trim().is_empty()) {
        return Err(KmError::ParseError("no text content found in PDF".into()));
    }

    let header = parse_header(&all_lines);
    let plate = header.plate.ok_or(KmError::MissingPlate)?;

    let mut facts = VehicleFacts {
        plate,
        current_owner: header.current_owner.unwrap_or_default(),
        is_renting: header.is_renting,
        report_date: header.report_date,
        ..Default::default()
    };
    let mut skipped_lines = Vec::new();

    for (section, body) in split_sections(&all_lines) {
        for line in body.into_iter().filter(|l| sections::is_row(l)) {
            let parsed = match section {
                Section::Lessees => {
                    sections::parse_tenure_row(line).map(|t| facts.lessee_history.push(t))
                }
                Section::Owners => {
                    sections::parse_tenure_row(line).map(|t| facts.owner_history.push(t))
                }
                Section::Inspections => sections::parse_inspection_row(line)
                    .map(|e| facts.inspection_history.push(e)),
                Section::Deregistrations => sections::parse_deregistration_row(line)
                    .map(|b| facts.deregistration_history.push(b)),
            };

            if let Err(e) = parsed {
                tracing::warn!(plate = %facts.plate, %section, line = line.trim(), "skipped line: {e}");
                skipped_lines.push(SkippedLine {
                    section,
                    line: line.trim().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    facts.refresh_current_lessee();

    tracing::debug!(
        plate = %facts.plate,
        owners = facts.owner_history.len(),
        lessees = facts.lessee_history.len(),
        inspections = facts.inspection_history.len(),
        deregistrations = facts.deregistration_history.len(),
        skipped = skipped_lines.len(),
        "report parsed"
    );

    Ok(ParsedFacts {
        facts,
        skipped_lines,
    })
}
