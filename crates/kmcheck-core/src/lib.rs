pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod resolve;

pub use resolve::{OutputRecord, ResolveOptions, resolve_record};

use error::KmError;
use extraction::PdfExtractor;
use parsing::{ParsedFacts, SkippedLine};
use serde::Serialize;

/// Result of processing one PDF report.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedReport {
    pub record: OutputRecord,
    /// Table rows dropped while reading the report.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

/// Extract and parse a vehicle report without resolving it.
pub fn parse_pdf(pdf_bytes: &[u8], extractor: &dyn PdfExtractor) -> Result<ParsedFacts, KmError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    tracing::debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "extracted report text"
    );
    parsing::parse_facts(&pages)
}

/// Main API entry point: turn a PDF report into its output record.
///
/// Only extraction and identification failures are errors. Everything the
/// report lacks shows up as absent fields or comments on the record.
pub fn process_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    options: &ResolveOptions,
) -> Result<ProcessedReport, KmError> {
    let parsed = parse_pdf(pdf_bytes, extractor)?;
    let record = resolve_record(&parsed.facts, options);
    Ok(ProcessedReport {
        record,
        skipped_lines: parsed.skipped_lines,
    })
}
