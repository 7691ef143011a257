use chrono::{NaiveDateTime, TimeDelta};

use crate::config::SlaThresholds;
use crate::model::{ShipmentRecord, SlaOutcome, SlaStatus, TrackingSheet};
use crate::schema::{Milestone, SheetColumns};

/// Whole days from `from` to `to`, rounded toward negative infinity.
pub fn elapsed_days(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let delta = to - from;
    let days = delta.num_days();
    if delta < TimeDelta::days(days) {
        days - 1
    } else {
        days
    }
}

/// Days between courier collection and proof of delivery, when both exist.
pub fn sla_days(record: &ShipmentRecord, cols: &SheetColumns) -> Option<i64> {
    let collected = record.milestone(cols, Milestone::CollectedByCourier)?;
    let pod = record.pod_date(cols)?;
    Some(elapsed_days(collected, pod))
}

/// Map elapsed days to a status. Negative values follow the same thresholds.
pub fn classify(days: Option<i64>, thresholds: &SlaThresholds) -> SlaStatus {
    match days {
        None => SlaStatus::Pending,
        Some(d) if d <= thresholds.green_max_days => SlaStatus::Green,
        Some(d) if d <= thresholds.yellow_max_days => SlaStatus::Yellow,
        Some(_) => SlaStatus::Red,
    }
}

/// Store SLA days and status on every record of a cleaned sheet.
pub fn classify_records(sheet: &mut TrackingSheet, thresholds: &SlaThresholds) {
    let cols = sheet.columns;
    for record in sheet.records.iter_mut() {
        let days = sla_days(record, &cols);
        record.sla = Some(SlaOutcome {
            days,
            status: classify(days, thresholds),
        });
    }
}
