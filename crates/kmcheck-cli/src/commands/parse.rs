use kmcheck_core::error::KmError;
use kmcheck_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), KmError> {
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = PdftotextExtractor::new();
    let parsed = kmcheck_core::parse_pdf(&pdf_bytes, &extractor)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&parsed)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} ({} inspection(s)), written to {}",
                parsed.facts.plate,
                parsed.facts.inspection_history.len(),
                path.display()
            );
        }
        None => match output_format {
            "json" => output::json::print(&parsed)?,
            _ => println!("{}", output::table::FactsTable(&parsed)),
        },
    }

    if !parsed.skipped_lines.is_empty() {
        eprintln!(
            "  {} line(s) skipped during parsing",
            parsed.skipped_lines.len()
        );
        for skipped in &parsed.skipped_lines {
            eprintln!("  [{}] {}: {}", skipped.section, skipped.line, skipped.reason);
        }
    }

    Ok(())
}
