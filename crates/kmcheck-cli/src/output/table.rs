use kmcheck_core::model::{format_date, Tenure};
use kmcheck_core::parsing::ParsedFacts;
use kmcheck_core::OutputRecord;
use std::fmt;

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

/// Human-readable listing of parsed report facts.
pub struct FactsTable<'a>(pub &'a ParsedFacts);

impl fmt::Display for FactsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let facts = &self.0.facts;

        writeln!(f, "Plate:         {}", facts.plate)?;
        writeln!(f, "Owner:         {}", facts.current_owner)?;
        writeln!(
            f,
            "Renting:       {}",
            if facts.is_renting { "yes" } else { "no" }
        )?;
        if let Some(lessee) = &facts.current_lessee {
            writeln!(f, "Lessee:        {lessee}")?;
        }
        writeln!(
            f,
            "Report date:   {}",
            or_dash(facts.report_date.map(format_date))
        )?;

        write_tenures(f, "Owners", &facts.owner_history)?;
        write_tenures(f, "Lessees", &facts.lessee_history)?;

        write!(f, "\nInspections ({}):", facts.inspection_history.len())?;
        for itv in &facts.inspection_history {
            write!(
                f,
                "\n  {}  {:<12}  {:>10}  {}",
                format_date(itv.date),
                itv.result.to_string(),
                or_dash(itv.odometer_km),
                itv.station.as_deref().unwrap_or("")
            )?;
        }

        if !facts.deregistration_history.is_empty() {
            write!(
                f,
                "\n\nDeregistrations ({}):",
                facts.deregistration_history.len()
            )?;
            for baja in &facts.deregistration_history {
                write!(
                    f,
                    "\n  {} - {}  {} {}",
                    format_date(baja.start),
                    or_dash(baja.end.map(format_date)),
                    baja.kind.as_deref().unwrap_or(""),
                    baja.reason.as_deref().unwrap_or("")
                )?;
            }
        }

        Ok(())
    }
}

fn write_tenures(f: &mut fmt::Formatter<'_>, title: &str, history: &[Tenure]) -> fmt::Result {
    if history.is_empty() {
        return Ok(());
    }
    writeln!(f, "\n{title} ({}):", history.len())?;
    for t in history {
        writeln!(
            f,
            "  {} - {}  {}",
            format_date(t.start),
            or_dash(t.end.map(format_date)),
            t.name
        )?;
    }
    Ok(())
}

/// One block per record, comments listed underneath.
pub struct RecordsTable<'a>(pub &'a [OutputRecord]);

impl fmt::Display for RecordsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "\n\n")?;
            }
            writeln!(f, "=== {} ===", r.plate)?;
            writeln!(
                f,
                "  Penultimate ITV:  {}  {} km",
                or_dash(r.penultimate_date.map(format_date)),
                or_dash(r.penultimate_km)
            )?;
            writeln!(
                f,
                "  Last ITV:         {}  {} km",
                or_dash(r.last_date.map(format_date)),
                or_dash(r.last_km)
            )?;
            writeln!(
                f,
                "  Days between: {}   km ITVs: {}   km 1 year: {}",
                or_dash(r.days_between),
                or_dash(r.km_between_itvs),
                or_dash(r.km_per_year)
            )?;
            write!(
                f,
                "  km int: {}   km nac: {}",
                r.km_international, r.km_national
            )?;
            for c in &r.comments {
                write!(f, "\n  * {c}")?;
            }
        }
        Ok(())
    }
}
