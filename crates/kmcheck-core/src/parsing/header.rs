use super::normalize::{find_folded, normalize_ws};
use super::values::parse_date;
use chrono::NaiveDate;

/// Identification and party-of-record fields from the top of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportHeader {
    pub plate: Option<String>,
    pub current_owner: Option<String>,
    pub is_renting: bool,
    pub report_date: Option<NaiveDate>,
}

const REPORT_DATE_LABELS: &[&str] = &[
    "fecha de emisión:",
    "fecha de expedición:",
    "fecha del informe:",
    "fecha informe:",
];

/// Extract report header information from text lines.
pub fn parse_header(lines: &[&str]) -> ReportHeader {
    let mut header = ReportHeader::default();
    let mut renting_seen = false;

    for line in lines {
        if header.plate.is_none() {
            if let Some(value) = extract_after_label(line, "matrícula:") {
                header.plate = parse_plate(&value);
            }
        }

        // The first Filiación belongs to the TITULAR block
        if header.current_owner.is_none() {
            if let Some(value) = extract_after_label(line, "filiación:") {
                let owner = match find_folded(&value, "cotitulares") {
                    Some((start, _)) => value[..start].trim().to_string(),
                    None => value,
                };
                if !owner.is_empty() {
                    header.current_owner = Some(normalize_ws(&owner));
                }
            }
        }

        if !renting_seen {
            if let Some(value) = extract_after_label(line, "renting:") {
                let first = value.split_whitespace().next().unwrap_or("").to_lowercase();
                header.is_renting = matches!(first.as_str(), "sí" | "si" | "s");
                renting_seen = true;
            }
        }

        if header.report_date.is_none() {
            header.report_date = REPORT_DATE_LABELS.iter().find_map(|label| {
                let value = extract_after_label(line, label)?;
                let token = value.split_whitespace().next()?;
                parse_date(token).ok().flatten()
            });
        }
    }

    header
}

/// Normalize a plate like "1234 ABC" to "1234ABC".
fn parse_plate(value: &str) -> Option<String> {
    let mut tokens = value.split_whitespace();
    let first = tokens.next()?;
    let mut plate = first.to_string();
    if let Some(second) = tokens.next() {
        if first.chars().all(|c| c.is_ascii_digit())
            && second.len() == 3
            && second.chars().all(|c| c.is_ascii_alphabetic())
        {
            plate.push_str(second);
        }
    }

    let plate = plate.to_uppercase();
    let valid = (4..=10).contains(&plate.len()) && plate.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(plate)
}

/// Extract a value appearing after a label (case- and accent-insensitive).
/// Truncates at the next large whitespace gap (3+ spaces) to avoid capturing
/// trailing fields from pdftotext -layout output.
fn extract_after_label(line: &str, label: &str) -> Option<String> {
    let (_, end) = find_folded(line, label)?;
    let after = &line[end..];
    let trimmed = after.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    if trimmed.is_empty() {
        return None;
    }
    let value = match trimmed.find("   ") {
        Some(gap_pos) => trimmed[..gap_pos].trim(),
        None => trimmed.trim(),
    };
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_basic() {
        let lines = [
            "Matrícula: 1234 ABC        Bastidor: VF1AB000123456789",
            "Renting: Sí                Marca: RENAULT",
            "Filiación: TRANSPORTES NORTE SL   Cotitulares: ---",
            "Fecha de emisión: 15/03/2024",
        ];
        let h = parse_header(&lines);
        assert_eq!(h.plate.as_deref(), Some("1234ABC"));
        assert_eq!(h.current_owner.as_deref(), Some("TRANSPORTES NORTE SL"));
        assert!(h.is_renting);
        assert_eq!(h.report_date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_owner_cut_at_cotitulares() {
        let lines = ["Filiación: GARCIA LOPEZ JUAN Cotitulares: NO"];
        let h = parse_header(&lines);
        assert_eq!(h.current_owner.as_deref(), Some("GARCIA LOPEZ JUAN"));
    }

    #[test]
    fn test_unaccented_labels() {
        let lines = ["MATRICULA: 9952HPL", "RENTING: NO", "FILIACION: EMPRESA SA"];
        let h = parse_header(&lines);
        assert_eq!(h.plate.as_deref(), Some("9952HPL"));
        assert!(!h.is_renting);
        assert_eq!(h.current_owner.as_deref(), Some("EMPRESA SA"));
    }

    #[test]
    fn test_invalid_plate_rejected() {
        let lines = ["Matrícula: ---"];
        assert!(parse_header(&lines).plate.is_none());
    }
}
