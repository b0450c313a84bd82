use crate::model::{Tenure, VehicleFacts};
use chrono::NaiveDate;

/// Minimum tenure, in months, for a past owner/lessee to qualify.
pub const MIN_TENURE_MONTHS: u32 = 14;

/// Why a vehicle is (or is not) eligible to generate CAEs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// No client filter supplied; checks skipped.
    Unchecked,
    CurrentOwner,
    CurrentLessee,
    PastLessee,
    PastOwner,
    Ineligible,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        !matches!(self, Eligibility::Ineligible)
    }
}

/// An authorized client name, compared loosely against report parties.
#[derive(Debug, Clone)]
pub struct ClientFilter {
    normalized: String,
    compact: String,
}

impl ClientFilter {
    /// Returns `None` for a blank filter.
    pub fn new(client: &str) -> Option<ClientFilter> {
        let normalized = normalize_party(client);
        if normalized.is_empty() {
            return None;
        }
        let compact = normalized.replace(' ', "");
        Some(ClientFilter {
            normalized,
            compact,
        })
    }

    /// Loose match: either name contains the other, with or without
    /// spaces (layout extraction sometimes splits words: "IN MEDIATO").
    pub fn matches(&self, party: &str) -> bool {
        let party = normalize_party(party);
        if party.is_empty() {
            return false;
        }
        if party.contains(&self.normalized) || self.normalized.contains(&party) {
            return true;
        }
        let compact = party.replace(' ', "");
        compact.contains(&self.compact) || self.compact.contains(&compact)
    }
}

fn normalize_party(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Evaluate ownership/leasing eligibility for the given client.
pub fn check(facts: &VehicleFacts, filter: Option<&ClientFilter>) -> Eligibility {
    let Some(filter) = filter else {
        return Eligibility::Unchecked;
    };

    let result = if filter.matches(&facts.current_owner) {
        Eligibility::CurrentOwner
    } else if facts.is_renting {
        if facts
            .current_lessee
            .as_deref()
            .is_some_and(|lessee| filter.matches(lessee))
        {
            Eligibility::CurrentLessee
        } else if has_long_tenure(&facts.lessee_history, filter, facts.report_date) {
            Eligibility::PastLessee
        } else {
            Eligibility::Ineligible
        }
    } else if has_long_tenure(&facts.owner_history, filter, facts.report_date) {
        Eligibility::PastOwner
    } else {
        Eligibility::Ineligible
    };

    tracing::debug!(plate = %facts.plate, eligibility = ?result, "eligibility checked");
    result
}

fn has_long_tenure(history: &[Tenure], filter: &ClientFilter, as_of: Option<NaiveDate>) -> bool {
    history
        .iter()
        .any(|t| filter.matches(&t.name) && t.exceeds_months(MIN_TENURE_MONTHS, as_of))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tenure(name: &str, start: &str, end: Option<&str>) -> Tenure {
        Tenure {
            name: name.into(),
            start: d(start),
            end: end.map(d),
        }
    }

    fn facts(owner: &str) -> VehicleFacts {
        VehicleFacts {
            plate: "1234ABC".into(),
            current_owner: owner.into(),
            ..Default::default()
        }
    }

    fn filter(s: &str) -> ClientFilter {
        ClientFilter::new(s).unwrap()
    }

    #[test]
    fn test_blank_filter_is_none() {
        assert!(ClientFilter::new("   ").is_none());
    }

    #[test]
    fn test_loose_matching() {
        let f = filter("Transporte Inmediato SL");
        assert!(f.matches("PAMPLONA T I TRANSPORTE INMEDIATO SL"));
        assert!(f.matches("TRANSPORTE  IN MEDIATO SL"));
        assert!(f.matches("inmediato"));
        assert!(!f.matches("LOGISTICA NORTE SA"));
        assert!(!f.matches(""));
    }

    #[test]
    fn test_no_filter_skips_checks() {
        assert_eq!(check(&facts("ANYONE"), None), Eligibility::Unchecked);
    }

    #[test]
    fn test_current_owner_eligible() {
        assert_eq!(
            check(&facts("EMPRESA SL"), Some(&filter("EMPRESA SL"))),
            Eligibility::CurrentOwner
        );
    }

    #[test]
    fn test_past_owner_over_fourteen_months() {
        let mut f = facts("X");
        f.owner_history = vec![tenure("Y", "2020-01-01", Some("2021-06-01"))];
        assert_eq!(check(&f, Some(&filter("Y"))), Eligibility::PastOwner);
    }

    #[test]
    fn test_past_owner_too_short() {
        let mut f = facts("X");
        f.owner_history = vec![tenure("Y", "2020-01-01", Some("2020-12-01"))];
        assert_eq!(check(&f, Some(&filter("Y"))), Eligibility::Ineligible);
    }

    #[test]
    fn test_current_lessee_eligible() {
        let mut f = facts("BANCO RENTING SA");
        f.is_renting = true;
        f.current_lessee = Some("CLIENTE SL".into());
        assert_eq!(
            check(&f, Some(&filter("CLIENTE SL"))),
            Eligibility::CurrentLessee
        );
    }

    #[test]
    fn test_renting_ignores_owner_history() {
        let mut f = facts("BANCO RENTING SA");
        f.is_renting = true;
        f.owner_history = vec![tenure("CLIENTE SL", "2015-01-01", Some("2019-01-01"))];
        assert_eq!(
            check(&f, Some(&filter("CLIENTE SL"))),
            Eligibility::Ineligible
        );
    }

    #[test]
    fn test_past_lessee_closed_tenure() {
        let mut f = facts("BANCO RENTING SA");
        f.is_renting = true;
        f.current_lessee = Some("TRANSPORTE INMEDIATO SL".into());
        f.lessee_history = vec![
            tenure("TRANSPORTE INMEDIATO SL", "2022-08-09", Some("2026-10-25")),
            tenure("LOGISTICA NORTE SA", "2019-01-01", Some("2022-08-08")),
        ];
        assert_eq!(
            check(&f, Some(&filter("LOGISTICA NORTE SA"))),
            Eligibility::PastLessee
        );
    }

    #[test]
    fn test_past_lessee_open_tenure_uses_report_date() {
        let mut f = facts("BANCO RENTING SA");
        f.is_renting = true;
        f.lessee_history = vec![tenure("CLIENTE SL", "2022-01-01", None)];
        assert_eq!(
            check(&f, Some(&filter("CLIENTE SL"))),
            Eligibility::Ineligible
        );

        f.report_date = Some(d("2024-01-01"));
        assert_eq!(
            check(&f, Some(&filter("CLIENTE SL"))),
            Eligibility::PastLessee
        );
    }
}
