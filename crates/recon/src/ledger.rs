//! Run ledgers: the audit log of cleaning actions and the provenance log of
//! interpolated values.
//!
//! Both are plain append-only values owned by the caller and threaded through
//! each sheet. Per-sheet ledgers can be merged into a run-wide one by a single
//! owner once every sheet is done.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::schema::Milestone;

/// One aggregate cleaning action on one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    #[serde(rename = "Column")]
    pub column: String,
    #[serde(rename = "Updated Count")]
    pub updated_count: usize,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Sheet")]
    pub sheet: String,
    #[serde(rename = "Source File")]
    pub source: String,
    #[serde(rename = "Rows Before")]
    pub rows_before: usize,
    #[serde(rename = "Rows After")]
    pub rows_after: usize,
}

/// One interpolated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvenanceEntry {
    #[serde(rename = "Connote #")]
    pub connote: String,
    #[serde(skip)]
    pub milestone: Milestone,
    #[serde(rename = "Updated Column")]
    pub column: String,
    #[serde(rename = "Value")]
    pub value: NaiveDateTime,
    #[serde(rename = "Sheet")]
    pub sheet: String,
    #[serde(rename = "Source File")]
    pub source: String,
    /// Original data-row position of the record in its source sheet.
    #[serde(rename = "Row Index")]
    pub row_index: usize,
}

#[derive(Debug, Default, Clone)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = AuditEntry>) {
        self.entries.extend(entries);
    }

    pub fn merge(&mut self, other: AuditLog) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default, Clone)]
pub struct ProvenanceLog {
    entries: Vec<ProvenanceEntry>,
}

impl ProvenanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: ProvenanceEntry) {
        self.entries.push(entry);
    }

    pub fn merge(&mut self, other: ProvenanceLog) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[ProvenanceEntry] {
        &self.entries
    }

    /// Entries produced for one (sheet, source document) pair.
    pub fn for_sheet<'a>(
        &'a self,
        sheet: &'a str,
        source: &'a str,
    ) -> impl Iterator<Item = &'a ProvenanceEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.sheet == sheet && e.source == source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dt;

    fn entry(sheet: &str, source: &str, row: usize) -> ProvenanceEntry {
        ProvenanceEntry {
            connote: format!("C{row}"),
            milestone: Milestone::ReceivedFromAgent,
            column: Milestone::ReceivedFromAgent.label().into(),
            value: dt("2024-01-02 08:00"),
            sheet: sheet.into(),
            source: source.into(),
            row_index: row,
        }
    }

    #[test]
    fn for_sheet_matches_sheet_and_source() {
        let mut log = ProvenanceLog::new();
        log.record(entry("S1", "a.xls", 0));
        log.record(entry("S1", "b.xls", 1));
        log.record(entry("S2", "a.xls", 2));
        log.record(entry("S1", "a.xls", 3));

        let rows: Vec<usize> = log.for_sheet("S1", "a.xls").map(|e| e.row_index).collect();
        assert_eq!(rows, vec![0, 3]);
    }

    #[test]
    fn merge_preserves_order() {
        let mut run = ProvenanceLog::new();
        run.record(entry("S1", "a.xls", 0));
        let mut sheet = ProvenanceLog::new();
        sheet.record(entry("S2", "a.xls", 5));
        sheet.record(entry("S2", "a.xls", 6));
        run.merge(sheet);

        let rows: Vec<usize> = run.entries().iter().map(|e| e.row_index).collect();
        assert_eq!(rows, vec![0, 5, 6]);
    }

    #[test]
    fn audit_merge_appends_sheet_entries() {
        let action = |sheet: &str| AuditEntry {
            column: "Connote #".into(),
            updated_count: 1,
            action: "Removed Duplicates".into(),
            sheet: sheet.into(),
            source: "a.xls".into(),
            rows_before: 3,
            rows_after: 2,
        };
        let mut run = AuditLog::new();
        run.extend([action("S1")]);
        let mut sheet = AuditLog::new();
        sheet.extend([action("S2"), action("S2")]);
        run.merge(sheet);

        let sheets: Vec<&str> = run.entries().iter().map(|e| e.sheet.as_str()).collect();
        assert_eq!(sheets, vec!["S1", "S2", "S2"]);
    }

    #[test]
    fn provenance_serializes_with_report_headers() {
        let json = serde_json::to_value(entry("S1", "a.xls", 4)).unwrap();
        assert_eq!(json["Connote #"], "C4");
        assert_eq!(json["Updated Column"], "Date Received from Customs Agent");
        assert_eq!(json["Row Index"], 4);
        assert!(json.get("milestone").is_none());
    }
}
