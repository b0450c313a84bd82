use kmcheck_core::error::KmError;
use kmcheck_core::model::format_date;
use kmcheck_core::OutputRecord;
use std::io::Write;

pub const HEADERS: [&str; 11] = [
    "License plate",
    "Penultimate date",
    "Penultimate reading (km)",
    "Last date",
    "Last reading (km)",
    "Days between",
    "km ITVs",
    "km 1 year",
    "km int",
    "km nac",
    "Comments",
];

/// One CSV row; absent values become empty cells.
pub fn record_row(record: &OutputRecord) -> Vec<String> {
    fn cell<T: ToString>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    vec![
        record.plate.clone(),
        cell(record.penultimate_date.map(format_date)),
        cell(record.penultimate_km),
        cell(record.last_date.map(format_date)),
        cell(record.last_km),
        cell(record.days_between),
        cell(record.km_between_itvs),
        cell(record.km_per_year),
        record.km_international.clone(),
        record.km_national.clone(),
        record.comments.join("; "),
    ]
}

pub fn write<W: Write>(records: &[OutputRecord], writer: W) -> Result<(), KmError> {
    let mut wtr = ::csv::Writer::from_writer(writer);
    wtr.write_record(HEADERS).map_err(std::io::Error::from)?;
    for record in records {
        wtr.write_record(record_row(record))
            .map_err(std::io::Error::from)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print(records: &[OutputRecord]) -> Result<(), KmError> {
    write(records, std::io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> OutputRecord {
        OutputRecord {
            plate: "2860LZG".into(),
            penultimate_date: NaiveDate::from_ymd_opt(2022, 1, 1),
            penultimate_km: Some(10000),
            last_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            last_km: Some(22500),
            days_between: Some(365),
            km_between_itvs: Some(12500),
            km_per_year: Some(12500),
            km_international: "N/A".into(),
            km_national: "N/A".into(),
            comments: vec![],
        }
    }

    #[test]
    fn test_record_row() {
        let row = record_row(&sample());
        assert_eq!(row.len(), HEADERS.len());
        assert_eq!(row[1], "01/01/2022");
        assert_eq!(row[7], "12500");
        assert_eq!(row[10], "");
    }

    #[test]
    fn test_missing_values_are_blank() {
        let record = OutputRecord {
            penultimate_date: None,
            penultimate_km: None,
            last_km: None,
            days_between: None,
            km_between_itvs: None,
            km_per_year: None,
            comments: vec!["A".into(), "B".into()],
            ..sample()
        };
        let row = record_row(&record);
        assert_eq!(row[1], "");
        assert_eq!(row[3], "01/01/2023");
        assert_eq!(row[4], "");
        assert_eq!(row[10], "A; B");
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        write(&[sample()], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert!(lines
            .next()
            .unwrap()
            .starts_with("License plate,Penultimate date,"));
        assert_eq!(
            lines.next().unwrap(),
            "2860LZG,01/01/2022,10000,01/01/2023,22500,365,12500,12500,N/A,N/A,"
        );
        assert!(lines.next().is_none());
    }
}
