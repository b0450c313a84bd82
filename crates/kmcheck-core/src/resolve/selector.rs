use crate::model::InspectionEvent;

/// How much usable inspection data survived filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionQuality {
    /// No inspection survived (empty history or all failed).
    NoValid,
    /// Exactly one surviving inspection carries an odometer reading.
    SingleOdometer,
    /// Exactly one surviving inspection, without a reading.
    SingleValid,
    /// Two or more surviving inspections, none with a reading.
    NoOdometer,
    /// At least two readings to compare.
    Sufficient,
}

/// The inspections chosen for reporting, plus what the selector discarded.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub penultimate: Option<InspectionEvent>,
    pub last: Option<InspectionEvent>,
    /// Inspections that survived the failure and rollback filters.
    pub eligible_count: usize,
    /// Eligible inspections carrying an odometer reading.
    pub with_odometer_count: usize,
    pub discarded_failed: usize,
    /// Readings lower than the preceding surviving reading.
    pub discarded_rollbacks: Vec<InspectionEvent>,
    pub discarded_duplicates: usize,
}

impl Selection {
    pub fn quality(&self) -> InspectionQuality {
        match (self.eligible_count, self.with_odometer_count) {
            (0, _) => InspectionQuality::NoValid,
            (_, 1) => InspectionQuality::SingleOdometer,
            (1, _) => InspectionQuality::SingleValid,
            (_, 0) => InspectionQuality::NoOdometer,
            _ => InspectionQuality::Sufficient,
        }
    }

    /// Both selected events carry a reading, so mileage can be compared.
    pub fn has_mileage_pair(&self) -> bool {
        matches!(
            (&self.penultimate, &self.last),
            (Some(p), Some(l)) if p.odometer_km.is_some() && l.odometer_km.is_some()
        )
    }
}

/// Choose the penultimate and last reportable inspections.
pub fn select(history: &[InspectionEvent]) -> Selection {
    let mut sorted: Vec<&InspectionEvent> = history.iter().collect();
    // Stable: same-date events keep their report order
    sorted.sort_by_key(|e| e.date);

    let mut selection = Selection::default();
    let mut survivors: Vec<&InspectionEvent> = Vec::new();
    let mut last_reading: Option<(&InspectionEvent, u64)> = None;

    for event in sorted {
        if event.result.is_failed() {
            selection.discarded_failed += 1;
            continue;
        }

        if let (Some(km), Some((prev, prev_km))) = (event.odometer_km, last_reading) {
            if km < prev_km {
                tracing::warn!(
                    date = %event.date,
                    km,
                    previous_km = prev_km,
                    "discarding decreasing odometer reading"
                );
                selection.discarded_rollbacks.push(event.clone());
                continue;
            }
            if km == prev_km && event.date == prev.date {
                selection.discarded_duplicates += 1;
                continue;
            }
        }

        if let Some(km) = event.odometer_km {
            last_reading = Some((event, km));
        }
        survivors.push(event);
    }

    let with_km: Vec<&InspectionEvent> = survivors
        .iter()
        .copied()
        .filter(|e| e.odometer_km.is_some())
        .collect();

    selection.eligible_count = survivors.len();
    selection.with_odometer_count = with_km.len();

    // Prefer events with readings; fall back to dates-only reporting
    let basis = if with_km.is_empty() { &survivors } else { &with_km };
    let mut tail = basis.iter().rev();
    selection.last = tail.next().map(|e| (*e).clone());
    if with_km.len() != 1 {
        selection.penultimate = tail.next().map(|e| (*e).clone());
    }

    tracing::debug!(
        eligible = selection.eligible_count,
        with_odometer = selection.with_odometer_count,
        failed = selection.discarded_failed,
        rollbacks = selection.discarded_rollbacks.len(),
        "inspection selection done"
    );

    selection
}
