//! Gap filling for missing milestone timestamps.

use chrono::NaiveDateTime;

use crate::ledger::{ProvenanceEntry, ProvenanceLog};
use crate::model::{Cell, ShipmentRecord, TrackingSheet};
use crate::schema::{Milestone, SheetColumns};

/// Fill `target` on every record where it is absent, estimating it from the
/// surrounding milestones. Returns the number of cells filled.
///
/// The neighbours are `prev` and `next`. When one of them is itself absent the
/// search continues outward along the milestone sequence to the nearest
/// present value, and the estimate is placed proportionally to the step
/// distance. With both direct neighbours present this is exactly the
/// midpoint `prev + (next - prev) / 2`.
///
/// Nothing is filled when either side has no present milestone or when the
/// neighbours are not strictly increasing.
pub fn fill_between(
    sheet: &mut TrackingSheet,
    prev: Milestone,
    target: Milestone,
    next: Milestone,
    sink: &mut ProvenanceLog,
) -> usize {
    debug_assert!(prev < target && target < next, "milestones out of order");

    let cols = sheet.columns;
    let target_col = cols.milestone(target);
    let mut filled = 0;

    for record in sheet.records.iter_mut() {
        if record.milestone(&cols, target).is_some() {
            continue;
        }
        let Some(value) = estimate(record, &cols, prev, target, next) else {
            continue;
        };

        record.set_cell(target_col, Cell::DateTime(value));
        sink.record(ProvenanceEntry {
            connote: record.connote(&cols),
            milestone: target,
            column: target.label().to_string(),
            value,
            sheet: sheet.name.clone(),
            source: sheet.source.clone(),
            row_index: record.position,
        });
        filled += 1;
    }

    if filled > 0 {
        log::debug!("sheet '{}': filled {filled} '{}' values", sheet.name, target.label());
    }
    filled
}

fn estimate(
    record: &ShipmentRecord,
    cols: &SheetColumns,
    prev: Milestone,
    target: Milestone,
    next: Milestone,
) -> Option<NaiveDateTime> {
    let (p_idx, before) = Milestone::ALL[..=prev.index()]
        .iter()
        .rev()
        .find_map(|m| record.milestone(cols, *m).map(|ts| (m.index(), ts)))?;
    let (n_idx, after) = Milestone::ALL[next.index()..]
        .iter()
        .find_map(|m| record.milestone(cols, *m).map(|ts| (m.index(), ts)))?;

    if before >= after {
        return None;
    }

    let steps = (n_idx - p_idx) as i32;
    let offset = (target.index() - p_idx) as i32;
    before.checked_add_signed((after - before) * offset / steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dt, sheet_with};

    use Milestone::*;

    #[test]
    fn fills_exact_midpoint() {
        let mut sheet = sheet_with(&[(
            "C1",
            "2024-01-01",
            [Some("2024-01-01 00:00"), None, Some("2024-01-02 06:00"), None, None],
            None,
            Some("Ann"),
        )]);
        let mut log = ProvenanceLog::new();

        let n = fill_between(&mut sheet, ReleasedFromCustoms, ReceivedFromAgent, CollectedByCourier, &mut log);

        assert_eq!(n, 1);
        let cols = sheet.columns;
        assert_eq!(
            sheet.records[0].milestone(&cols, ReceivedFromAgent),
            Some(dt("2024-01-01 15:00"))
        );
        assert_eq!(log.len(), 1);
        let e = &log.entries()[0];
        assert_eq!(e.connote, "C1");
        assert_eq!(e.column, "Date Received from Customs Agent");
        assert_eq!(e.value, dt("2024-01-01 15:00"));
        assert_eq!(e.sheet, "Sheet1");
        assert_eq!(e.source, "report.xls");
        assert_eq!(e.row_index, 0);
    }

    #[test]
    fn odd_second_spans_keep_subsecond_precision() {
        let mut sheet = sheet_with(&[(
            "C1",
            "2024-01-01",
            [Some("2024-01-01 00:00:00"), None, Some("2024-01-01 00:00:01"), None, None],
            None,
            None,
        )]);
        let mut log = ProvenanceLog::new();
        fill_between(&mut sheet, ReleasedFromCustoms, ReceivedFromAgent, CollectedByCourier, &mut log);

        let expected = dt("2024-01-01 00:00") + chrono::TimeDelta::milliseconds(500);
        assert_eq!(log.entries()[0].value, expected);
    }

    #[test]
    fn unordered_neighbours_are_left_alone() {
        let mut sheet = sheet_with(&[
            // equal
            ("C1", "2024-01-01", [Some("2024-01-02 00:00"), None, Some("2024-01-02 00:00"), None, None], None, None),
            // reversed
            ("C2", "2024-01-01", [Some("2024-01-03 00:00"), None, Some("2024-01-02 00:00"), None, None], None, None),
        ]);
        let mut log = ProvenanceLog::new();
        let n = fill_between(&mut sheet, ReleasedFromCustoms, ReceivedFromAgent, CollectedByCourier, &mut log);

        assert_eq!(n, 0);
        assert!(log.is_empty());
        let cols = sheet.columns;
        assert!(sheet.records.iter().all(|r| r.milestone(&cols, ReceivedFromAgent).is_none()));
    }

    #[test]
    fn missing_side_is_left_alone() {
        let mut sheet = sheet_with(&[
            ("C1", "2024-01-01", [None, None, Some("2024-01-02 00:00"), None, None], None, None),
            ("C2", "2024-01-01", [Some("2024-01-01 00:00"), None, None, None, None], None, None),
            ("C3", "2024-01-01", [Some("not a date"), None, Some("2024-01-02 00:00"), None, None], None, None),
        ]);
        let mut log = ProvenanceLog::new();
        let n = fill_between(&mut sheet, ReleasedFromCustoms, ReceivedFromAgent, CollectedByCourier, &mut log);

        assert_eq!(n, 0);
        assert!(log.is_empty());
    }

    #[test]
    fn present_target_is_never_overwritten() {
        let mut sheet = sheet_with(&[(
            "C1",
            "2024-01-01",
            [Some("2024-01-01 00:00"), Some("2024-01-01 01:00"), Some("2024-01-03 00:00"), None, None],
            None,
            None,
        )]);
        let mut log = ProvenanceLog::new();
        let n = fill_between(&mut sheet, ReleasedFromCustoms, ReceivedFromAgent, CollectedByCourier, &mut log);
        assert_eq!(n, 0);
        let cols = sheet.columns;
        assert_eq!(
            sheet.records[0].milestone(&cols, ReceivedFromAgent),
            Some(dt("2024-01-01 01:00"))
        );
    }

    #[test]
    fn unparseable_target_counts_as_absent() {
        let mut sheet = sheet_with(&[(
            "C1",
            "2024-01-01",
            [Some("2024-01-01 00:00"), Some("TBC"), Some("2024-01-03 00:00"), None, None],
            None,
            None,
        )]);
        let mut log = ProvenanceLog::new();
        let n = fill_between(&mut sheet, ReleasedFromCustoms, ReceivedFromAgent, CollectedByCourier, &mut log);
        assert_eq!(n, 1);
        assert_eq!(log.entries()[0].value, dt("2024-01-02 00:00"));
    }

    #[test]
    fn wider_gap_is_split_evenly() {
        let mut sheet = sheet_with(&[(
            "C1",
            "2024-01-01",
            [Some("2024-01-01 00:00"), None, None, Some("2024-01-05 00:00"), None],
            None,
            None,
        )]);
        let mut log = ProvenanceLog::new();
        fill_between(&mut sheet, ReleasedFromCustoms, ReceivedFromAgent, CollectedByCourier, &mut log);
        assert_eq!(log.entries()[0].value, dt("2024-01-02 08:00"));
    }

    #[test]
    fn row_index_is_source_position() {
        let mut sheet = sheet_with(&[
            ("C1", "2024-01-01", [None, None, None, None, None], None, None),
            ("C2", "2024-01-01", [Some("2024-01-01 00:00"), None, Some("2024-01-03 00:00"), None, None], None, None),
        ]);
        sheet.records.remove(0);
        let mut log = ProvenanceLog::new();
        fill_between(&mut sheet, ReleasedFromCustoms, ReceivedFromAgent, CollectedByCourier, &mut log);
        assert_eq!(log.entries()[0].row_index, 1);
    }
}
