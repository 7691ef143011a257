//! Per-sheet cleaning: duplicate removal, blank-row removal and the three
//! chained interpolation passes.

use std::collections::HashSet;

use crate::interpolate::fill_between;
use crate::ledger::{AuditEntry, ProvenanceLog};
use crate::model::TrackingSheet;
use crate::schema::{Milestone, CONNOTE, EVENT_SPAN};

/// (previous, target, next) for each interpolation pass, in run order.
/// Later passes see values filled by earlier ones.
pub const INTERPOLATION_PASSES: [(Milestone, Milestone, Milestone); 3] = [
    (
        Milestone::ReleasedFromCustoms,
        Milestone::ReceivedFromAgent,
        Milestone::CollectedByCourier,
    ),
    (
        Milestone::ReceivedFromAgent,
        Milestone::CollectedByCourier,
        Milestone::ArrivedAtHub,
    ),
    (
        Milestone::CollectedByCourier,
        Milestone::ArrivedAtHub,
        Milestone::FirstOutForDelivery,
    ),
];

/// Clean one sheet. Every step appends exactly one audit entry.
pub fn clean(
    mut sheet: TrackingSheet,
    provenance: &mut ProvenanceLog,
) -> (TrackingSheet, Vec<AuditEntry>) {
    let mut audit = Vec::with_capacity(2 + INTERPOLATION_PASSES.len());

    audit.push(remove_duplicates(&mut sheet));
    audit.push(drop_blank_event_rows(&mut sheet));

    for (prev, target, next) in INTERPOLATION_PASSES {
        let rows = sheet.records.len();
        let filled = fill_between(&mut sheet, prev, target, next, provenance);
        audit.push(entry(
            &sheet,
            target.label(),
            filled,
            format!("Filled missing {}", target.code()),
            rows,
        ));
    }

    (sheet, audit)
}

/// Keep the first record per connote, preserving order.
///
/// Blank connotes share one key, so only the first blank-id row survives.
pub fn remove_duplicates(sheet: &mut TrackingSheet) -> AuditEntry {
    let before = sheet.records.len();
    let cols = sheet.columns;
    let mut seen = HashSet::new();
    sheet.records.retain(|r| seen.insert(r.connote(&cols)));
    let removed = before - sheet.records.len();

    if removed > 0 {
        log::info!("sheet '{}': removed {removed} duplicate connote(s)", sheet.name);
    }
    entry(sheet, CONNOTE, removed, "Removed Duplicates".into(), before)
}

/// Drop records with no usable timestamp in any of the five milestones.
pub fn drop_blank_event_rows(sheet: &mut TrackingSheet) -> AuditEntry {
    let before = sheet.records.len();
    let cols = sheet.columns;
    sheet.records.retain(|r| !r.has_no_events(&cols));
    let removed = before - sheet.records.len();

    if removed > 0 {
        log::info!("sheet '{}': dropped {removed} row(s) without tracking events", sheet.name);
    }
    entry(sheet, EVENT_SPAN, removed, "Removed blank event rows".into(), before)
}

fn entry(
    sheet: &TrackingSheet,
    column: &str,
    updated_count: usize,
    action: String,
    rows_before: usize,
) -> AuditEntry {
    AuditEntry {
        column: column.to_string(),
        updated_count,
        action,
        sheet: sheet.name.clone(),
        source: sheet.source.clone(),
        rows_before,
        rows_after: sheet.records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dt, sheet_with};

    #[test]
    fn duplicates_keep_first_in_order() {
        let mut sheet = sheet_with(&[
            ("A", "2024-01-01", [Some("2024-01-01 00:00"), None, None, None, None], None, Some("first")),
            ("B", "2024-01-01", [Some("2024-01-01 00:00"), None, None, None, None], None, None),
            ("A", "2024-01-01", [Some("2024-01-01 00:00"), None, None, None, None], None, Some("second")),
            ("C", "2024-01-01", [Some("2024-01-01 00:00"), None, None, None, None], None, None),
        ]);
        let e = remove_duplicates(&mut sheet);

        let cols = sheet.columns;
        let ids: Vec<String> = sheet.records.iter().map(|r| r.connote(&cols)).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(sheet.records[0].driver(&cols).as_deref(), Some("first"));
        assert_eq!(e.updated_count, 1);
        assert_eq!(e.column, "Connote #");
        assert_eq!(e.action, "Removed Duplicates");
        assert_eq!((e.rows_before, e.rows_after), (4, 3));
    }

    #[test]
    fn blank_connotes_collapse() {
        let mut sheet = sheet_with(&[
            ("", "2024-01-01", [Some("2024-01-01 00:00"), None, None, None, None], None, None),
            ("", "2024-01-01", [Some("2024-01-02 00:00"), None, None, None, None], None, None),
        ]);
        let e = remove_duplicates(&mut sheet);
        assert_eq!(e.updated_count, 1);
        assert_eq!(sheet.records[0].position, 0);
    }

    #[test]
    fn blank_event_rows_dropped() {
        let mut sheet = sheet_with(&[
            ("A", "2024-01-01", [None, None, None, None, None], Some("2024-01-09 00:00"), None),
            ("B", "2024-01-01", [None, None, None, Some("2024-01-03 00:00"), None], None, None),
            ("C", "2024-01-01", [Some("n/a"), Some(""), None, None, None], None, None),
        ]);
        let e = drop_blank_event_rows(&mut sheet);
        let cols = sheet.columns;
        let ids: Vec<String> = sheet.records.iter().map(|r| r.connote(&cols)).collect();
        assert_eq!(ids, vec!["B"]);
        assert_eq!(e.column, "AA to AE");
        assert_eq!(e.action, "Removed blank event rows");
        assert_eq!(e.updated_count, 2);
    }

    #[test]
    fn clean_emits_five_entries_in_order() {
        let sheet = sheet_with(&[(
            "A",
            "2024-01-01",
            [Some("2024-01-01 00:00"), None, Some("2024-01-03 00:00"), None, Some("2024-01-05 00:00")],
            None,
            None,
        )]);
        let mut log = ProvenanceLog::new();
        let (cleaned, audit) = clean(sheet, &mut log);

        let actions: Vec<&str> = audit.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            vec![
                "Removed Duplicates",
                "Removed blank event rows",
                "Filled missing AB",
                "Filled missing AC",
                "Filled missing AD",
            ]
        );
        let counts: Vec<usize> = audit.iter().map(|e| e.updated_count).collect();
        assert_eq!(counts, vec![0, 0, 1, 0, 1]);
        assert_eq!(audit[2].column, "Date Received from Customs Agent");
        assert_eq!(audit[4].column, "Arrived Hub Date");

        let cols = cleaned.columns;
        let r = &cleaned.records[0];
        assert_eq!(r.milestone(&cols, Milestone::ReceivedFromAgent), Some(dt("2024-01-02 00:00")));
        assert_eq!(r.milestone(&cols, Milestone::ArrivedAtHub), Some(dt("2024-01-04 00:00")));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn chained_passes_fill_interior_gap() {
        let sheet = sheet_with(&[(
            "A",
            "2024-01-01",
            [Some("2024-01-01"), None, None, Some("2024-01-05"), None],
            None,
            None,
        )]);
        let mut log = ProvenanceLog::new();
        let (cleaned, _) = clean(sheet, &mut log);

        let cols = cleaned.columns;
        let r = &cleaned.records[0];
        assert_eq!(r.milestone(&cols, Milestone::ReceivedFromAgent), Some(dt("2024-01-02 08:00")));
        assert_eq!(r.milestone(&cols, Milestone::CollectedByCourier), Some(dt("2024-01-03 16:00")));
        assert_eq!(r.milestone(&cols, Milestone::FirstOutForDelivery), None);

        let filled: Vec<Milestone> = log.entries().iter().map(|e| e.milestone).collect();
        assert_eq!(filled, vec![Milestone::ReceivedFromAgent, Milestone::CollectedByCourier]);
    }
}
