use super::normalize::{fold, normalize_ws};
use super::values::{is_placeholder, looks_like_date, looks_like_km, parse_date, parse_km};
use crate::error::KmError;
use crate::model::{Deregistration, InspectionEvent, InspectionResult, Tenure};
use serde::{Deserialize, Serialize};
use std::fmt;

/// History tables of a vehicle report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Lessees,
    Owners,
    Inspections,
    Deregistrations,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Lessees => write!(f, "ARRENDATARIO"),
            Section::Owners => write!(f, "HISTORIAL DE TITULARES"),
            Section::Inspections => write!(f, "HISTORIAL DE INSPECCIONES TÉCNICAS"),
            Section::Deregistrations => write!(f, "HISTORIAL DE BAJAS"),
        }
    }
}

impl Section {
    /// Detect a section heading (folded line prefix).
    fn from_heading(folded: &str) -> Option<Section> {
        if folded.starts_with("ARRENDATARIO") {
            Some(Section::Lessees)
        } else if folded.starts_with("HISTORIAL DE TITULARES") {
            Some(Section::Owners)
        } else if folded.starts_with("HISTORIAL DE INSPECCIONES") {
            Some(Section::Inspections)
        } else if folded.starts_with("HISTORIAL DE BAJAS") {
            Some(Section::Deregistrations)
        } else {
            None
        }
    }
}

/// Headings that close whatever section is open.
fn is_section_end(folded: &str) -> bool {
    ["CARGAS", "DATOS", "HISTORIAL", "INFORMACION", "EL PRESENTE DOCUMENTO"]
        .iter()
        .any(|kw| folded.starts_with(kw))
}

/// Group report lines by the history section they belong to.
///
/// Lines outside any known section are dropped.
pub fn split_sections<'a>(lines: &[&'a str]) -> Vec<(Section, Vec<&'a str>)> {
    let mut sections: Vec<(Section, Vec<&'a str>)> = Vec::new();
    let mut current: Option<(Section, Vec<&'a str>)> = None;

    for &line in lines {
        let folded = fold(line.trim());
        if let Some(section) = Section::from_heading(&folded) {
            if let Some(done) = current.take() {
                sections.push(done);
            }
            current = Some((section, Vec::new()));
            continue;
        }
        if is_section_end(&folded) {
            if let Some(done) = current.take() {
                sections.push(done);
            }
            continue;
        }
        if let Some((_, ref mut body)) = current {
            body.push(line);
        }
    }

    if let Some(done) = current {
        sections.push(done);
    }

    sections
}

/// True if the line starts with a DD/MM/YYYY token, i.e. is a table row.
pub fn is_row(line: &str) -> bool {
    line.split_whitespace().next().is_some_and(looks_like_date)
}

/// Parse an owner/lessee row: `start (end|---) NAME`.
pub fn parse_tenure_row(line: &str) -> Result<Tenure, KmError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let start = required_date(&tokens, 0)?;
    let (end, rest) = optional_end(&tokens)?;
    let name = normalize_ws(&rest.join(" "));
    if name.is_empty() {
        return Err(KmError::ParseError("tenure row without a name".into()));
    }
    Ok(Tenure { name, start, end })
}

/// Parse a deregistration row: `start (end|---) KIND REASON`.
pub fn parse_deregistration_row(line: &str) -> Result<Deregistration, KmError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let start = required_date(&tokens, 0)?;
    let (end, rest) = optional_end(&tokens)?;
    let kind = rest.first().map(|s| s.to_string());
    let reason = (rest.len() > 1).then(|| rest[1..].join(" "));
    Ok(Deregistration {
        start,
        end,
        kind,
        reason,
    })
}

/// Parse an inspection row: `date expiry STATION RESULT [qualifiers] KM`.
///
/// The odometer is optional; an unreadable odometer is left absent.
pub fn parse_inspection_row(line: &str) -> Result<InspectionEvent, KmError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let date = required_date(&tokens, 0)?;
    // Expiry date is informational only
    let (_, rest) = optional_end(&tokens)?;

    let result_pos = rest.iter().position(|t| {
        let r = InspectionResult::from_str_loose(t);
        r != InspectionResult::Other
    });

    let (station, result, after) = match result_pos {
        Some(pos) => (
            &rest[..pos],
            InspectionResult::from_str_loose(rest[pos]),
            &rest[pos + 1..],
        ),
        None => (
            &rest[..rest.len().min(1)],
            InspectionResult::Other,
            &rest[rest.len().min(1)..],
        ),
    };

    let odometer_km = after
        .iter()
        .find(|t| looks_like_km(t))
        .map(|t| parse_km(t))
        .transpose()
        .unwrap_or_else(|e| {
            tracing::warn!(line, error = %e, "unreadable odometer, treating as absent");
            None
        })
        .flatten();

    let station = (!station.is_empty()).then(|| station.join(" "));

    Ok(InspectionEvent {
        date,
        result,
        odometer_km,
        station,
    })
}

fn required_date(tokens: &[&str], idx: usize) -> Result<chrono::NaiveDate, KmError> {
    let token = tokens
        .get(idx)
        .ok_or_else(|| KmError::ParseError("missing date".into()))?;
    parse_date(token)?.ok_or_else(|| KmError::ParseError(format!("missing date '{}'", token)))
}

/// Second column: an end date, a `---` placeholder, or absent.
/// Returns the end date and the remaining tokens.
fn optional_end<'t, 'a>(
    tokens: &'t [&'a str],
) -> Result<(Option<chrono::NaiveDate>, &'t [&'a str]), KmError> {
    match tokens.get(1) {
        Some(t) if looks_like_date(t) || is_placeholder(t) => Ok((parse_date(t)?, &tokens[2..])),
        Some(_) => Ok((None, &tokens[1..])),
        None => Ok((None, &tokens[tokens.len()..])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_split_sections() {
        let lines = vec![
            "Matrícula: 1234ABC",
            "ARRENDATARIO",
            "Fecha Inicio   Fecha fin   Filiación",
            "09/08/2022   25/10/2026   TRANSPORTE INMEDIATO SL",
            "CARGAS",
            "Ninguna",
            "HISTORIAL DE TITULARES",
            "01/01/2018   ---   EMPRESA SA",
            "HISTORIAL DE INSPECCIONES TÉCNICAS",
            "10/01/2020  10/01/2021  4601  FAVORABLE  45.000",
            "El presente documento no tiene validez",
        ];
        let sections = split_sections(&lines);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].0, Section::Lessees);
        assert_eq!(sections[0].1.len(), 2);
        assert_eq!(sections[1].0, Section::Owners);
        assert_eq!(sections[2].0, Section::Inspections);
        assert_eq!(sections[2].1, vec!["10/01/2020  10/01/2021  4601  FAVORABLE  45.000"]);
    }

    #[test]
    fn test_is_row() {
        assert!(is_row("  09/08/2022   25/10/2026   X"));
        assert!(!is_row("Fecha Inicio   Fecha fin"));
        assert!(!is_row("01.02 LEVE Neumáticos"));
        assert!(!is_row(""));
    }

    #[test]
    fn test_parse_tenure_row() {
        let t = parse_tenure_row("09/08/2022   25/10/2026   PAMPLONA T I  TRANSPORTE INMEDIATO SL").unwrap();
        assert_eq!(t.start, d(2022, 8, 9));
        assert_eq!(t.end, Some(d(2026, 10, 25)));
        assert_eq!(t.name, "PAMPLONA T I TRANSPORTE INMEDIATO SL");
    }

    #[test]
    fn test_parse_open_tenure_row() {
        let t = parse_tenure_row("01/01/2018   ---   EMPRESA SA").unwrap();
        assert_eq!(t.end, None);
        assert_eq!(t.name, "EMPRESA SA");
    }

    #[test]
    fn test_tenure_without_name_rejected() {
        assert!(parse_tenure_row("01/01/2018   ---").is_err());
        assert!(parse_tenure_row("31/02/2018   ---  X").is_err());
    }

    #[test]
    fn test_parse_deregistration_row() {
        let b = parse_deregistration_row("15/03/2023  20/06/2023  TEMPORAL  A petición del titular").unwrap();
        assert_eq!(b.start, d(2023, 3, 15));
        assert_eq!(b.end, Some(d(2023, 6, 20)));
        assert_eq!(b.kind.as_deref(), Some("TEMPORAL"));
        assert_eq!(b.reason.as_deref(), Some("A petición del titular"));
    }

    #[test]
    fn test_parse_inspection_row() {
        let e = parse_inspection_row("10/01/2020  10/01/2021  4601  FAVORABLE  45.000").unwrap();
        assert_eq!(e.date, d(2020, 1, 10));
        assert_eq!(e.result, InspectionResult::Favorable);
        assert_eq!(e.odometer_km, Some(45000));
        assert_eq!(e.station.as_deref(), Some("4601"));
    }

    #[test]
    fn test_parse_inspection_row_with_qualifier() {
        let e = parse_inspection_row("05/02/2022  05/02/2023  IT-28  FAVORABLE CON DEFECTOS  123.456").unwrap();
        assert_eq!(e.result, InspectionResult::Favorable);
        assert_eq!(e.odometer_km, Some(123456));
    }

    #[test]
    fn test_parse_failed_inspection_without_km() {
        let e = parse_inspection_row("05/02/2022  05/03/2022  4601  DESFAVORABLE  ---").unwrap();
        assert_eq!(e.result, InspectionResult::Desfavorable);
        assert_eq!(e.odometer_km, None);

        let n = parse_inspection_row("05/02/2022  05/03/2022  4601  NEGATIVA").unwrap();
        assert_eq!(n.result, InspectionResult::Negative);
    }

    #[test]
    fn test_parse_unknown_result() {
        let e = parse_inspection_row("05/02/2022  ---  4601  ANULADA  0").unwrap();
        assert_eq!(e.result, InspectionResult::Other);
        assert_eq!(e.odometer_km, None);
        assert_eq!(e.station.as_deref(), Some("4601"));
    }
}
