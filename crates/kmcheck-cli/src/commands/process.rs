use chrono::NaiveDate;
use kmcheck_core::error::KmError;
use kmcheck_core::extraction::pdftotext::PdftotextExtractor;
use kmcheck_core::extraction::PdfExtractor;
use kmcheck_core::model::VehicleFacts;
use kmcheck_core::{resolve_record, OutputRecord, ResolveOptions};
use std::path::{Path, PathBuf};

use crate::output;

pub struct ProcessArgs {
    pub inputs: Vec<PathBuf>,
    pub client: Option<String>,
    pub as_of: Option<String>,
    pub report_changes: bool,
    pub output_format: String,
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Pdf,
    Json,
}

fn input_kind(path: &Path) -> Option<InputKind> {
    let ext = path.extension()?.to_str()?;
    if ext.eq_ignore_ascii_case("pdf") {
        Some(InputKind::Pdf)
    } else if ext.eq_ignore_ascii_case("json") {
        Some(InputKind::Json)
    } else {
        None
    }
}

pub fn run(args: ProcessArgs) -> Result<(), KmError> {
    let as_of = args.as_of.as_deref().map(parse_as_of).transpose()?;
    let options = ResolveOptions {
        client_filter: args.client,
        report_changes: args.report_changes,
    };

    let paths = collect_inputs(&args.inputs)?;
    if needs_pdftotext(&paths) && !PdftotextExtractor::is_available() {
        return Err(KmError::PdftotextNotFound);
    }
    let extractor = PdftotextExtractor::new();

    let mut records: Vec<OutputRecord> = Vec::new();
    let mut failed = 0usize;

    for path in &paths {
        match load_facts(path, &extractor) {
            Ok(batch) => {
                for mut facts in batch {
                    facts.fill_report_date(as_of);
                    records.push(resolve_record(&facts, &options));
                }
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "failed to process report: {e}");
                failed += 1;
            }
        }
    }

    tracing::info!(
        inputs = paths.len(),
        records = records.len(),
        failed,
        "batch finished"
    );

    if records.is_empty() && failed > 0 {
        return Err(KmError::Extraction(format!(
            "none of the {failed} report(s) could be processed"
        )));
    }

    match args.output_format.as_str() {
        "json" => output::json::print(&records)?,
        "csv" => output::csv::print(&records)?,
        _ => println!("{}", output::table::RecordsTable(&records)),
    }

    if let Some(path) = args.output_file {
        let file = std::fs::File::create(&path)?;
        output::csv::write(&records, file)?;
        eprintln!("{} record(s) written to {}", records.len(), path.display());
    }

    Ok(())
}

/// Expand directories (non-recursive, sorted) and keep explicit files as given.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, KmError> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && input_kind(p).is_some())
                .collect();
            found.sort();
            tracing::debug!(dir = %input.display(), files = found.len(), "scanned directory");
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

/// Only facts JSON can be read without pdftotext.
fn needs_pdftotext(paths: &[PathBuf]) -> bool {
    paths.iter().any(|p| input_kind(p) != Some(InputKind::Json))
}

fn load_facts(path: &Path, extractor: &dyn PdfExtractor) -> Result<Vec<VehicleFacts>, KmError> {
    let bytes = std::fs::read(path)?;
    match input_kind(path) {
        Some(InputKind::Json) => facts_from_json(&bytes),
        // Anything else is handed to the PDF extractor
        Some(InputKind::Pdf) | None => {
            let parsed = kmcheck_core::parse_pdf(&bytes, extractor)?;
            if !parsed.skipped_lines.is_empty() {
                tracing::warn!(
                    path = %path.display(),
                    skipped = parsed.skipped_lines.len(),
                    "some report lines could not be read"
                );
            }
            Ok(vec![parsed.facts])
        }
    }
}

/// Accepts a facts object, an array of them, or the output of `kmcheck parse -O`.
fn facts_from_json(bytes: &[u8]) -> Result<Vec<VehicleFacts>, KmError> {
    fn unwrap_parsed(value: serde_json::Value) -> serde_json::Value {
        match value {
            serde_json::Value::Object(mut map) if map.contains_key("facts") => {
                map.remove("facts").unwrap_or_default()
            }
            other => other,
        }
    }

    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(unwrap_parsed(item)).map_err(KmError::from))
            .collect(),
        single => Ok(vec![serde_json::from_value(unwrap_parsed(single))?]),
    }
}

fn parse_as_of(s: &str) -> Result<NaiveDate, KmError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| {
            KmError::Config(format!(
                "invalid --as-of date '{s}'. Use DD/MM/YYYY or YYYY-MM-DD"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_as_of_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_as_of("01/03/2024").unwrap(), expected);
        assert_eq!(parse_as_of("2024-03-01").unwrap(), expected);
        assert!(matches!(parse_as_of("March 1"), Err(KmError::Config(_))));
    }

    #[test]
    fn test_input_kind() {
        assert_eq!(input_kind(Path::new("a/report.PDF")), Some(InputKind::Pdf));
        assert_eq!(input_kind(Path::new("facts.json")), Some(InputKind::Json));
        assert_eq!(input_kind(Path::new("notes.txt")), None);
        assert_eq!(input_kind(Path::new("README")), None);
    }

    #[test]
    fn test_needs_pdftotext() {
        let json_only = vec![PathBuf::from("a.json"), PathBuf::from("b.JSON")];
        assert!(!needs_pdftotext(&json_only));
        assert!(!needs_pdftotext(&[]));

        let mixed = vec![PathBuf::from("a.json"), PathBuf::from("scan.pdf")];
        assert!(needs_pdftotext(&mixed));
    }

    #[test]
    fn test_facts_from_json_single_and_array() {
        let one = br#"{"plate": "1234ABC", "inspection_history": [
            {"date": "2022-01-01", "result": "FAVORABLE", "odometer_km": 10000}
        ]}"#;
        let facts = facts_from_json(one).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].plate, "1234ABC");
        assert_eq!(facts[0].inspection_history.len(), 1);

        let many = br#"[{"plate": "1234ABC"}, {"plate": "5678DEF", "is_renting": true}]"#;
        let facts = facts_from_json(many).unwrap();
        assert_eq!(facts.len(), 2);
        assert!(facts[1].is_renting);
    }

    #[test]
    fn test_facts_from_parse_output() {
        let parsed = br#"{"facts": {"plate": "9952HPL"}, "skipped_lines": []}"#;
        let facts = facts_from_json(parsed).unwrap();
        assert_eq!(facts[0].plate, "9952HPL");
    }

    #[test]
    fn test_facts_from_json_requires_plate() {
        assert!(matches!(
            facts_from_json(br#"{"current_owner": "X"}"#),
            Err(KmError::Json(_))
        ));
    }
}
