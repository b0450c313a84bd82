use crate::error::KmError;
use chrono::NaiveDate;

/// Placeholder the authority prints for an empty cell.
pub fn is_placeholder(s: &str) -> bool {
    matches!(s.trim(), "" | "-" | "--" | "---")
}

/// True if the token has the DD/MM/YYYY shape (not necessarily a valid date).
pub fn looks_like_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[2] == b'/'
        && b[5] == b'/'
        && b
            .iter()
            .enumerate()
            .all(|(i, c)| i == 2 || i == 5 || c.is_ascii_digit())
}

/// Parse a DD/MM/YYYY date.
///
/// - "09/08/2022" -> Some(2022-08-09)
/// - "---" -> None (open-ended / not applicable)
/// - "31/02/2022" -> error
pub fn parse_date(s: &str) -> Result<Option<NaiveDate>, KmError> {
    let s = s.trim();
    if is_placeholder(s) {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .map(Some)
        .map_err(|e| KmError::ParseError(format!("invalid date '{}': {}", s, e)))
}

/// True if the token could be an odometer value ("123.456", "98765").
pub fn looks_like_km(s: &str) -> bool {
    let s = s.trim();
    s.starts_with(|c: char| c.is_ascii_digit()) && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Parse an odometer reading, using `.` as thousands separator.
///
/// A zero reading means the station did not record one and is absent.
pub fn parse_km(s: &str) -> Result<Option<u64>, KmError> {
    let s = s.trim();
    if is_placeholder(s) {
        return Ok(None);
    }
    let digits: String = s.chars().filter(|c| *c != '.' && *c != ' ').collect();
    let km: u64 = digits
        .parse()
        .map_err(|e| KmError::ParseError(format!("invalid odometer '{}': {}", s, e)))?;
    Ok((km > 0).then_some(km))
}
