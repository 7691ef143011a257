use serde::Serialize;

use crate::aggregate::summarize;
use crate::classify::classify_records;
use crate::config::SlaThresholds;
use crate::error::ReconError;
use crate::ledger::{AuditLog, ProvenanceLog};
use crate::model::{ContractorSummary, ManifestRange, TrackingSheet};
use crate::reconcile::clean;

/// A cleaned, classified and summarized sheet, ready to be written.
#[derive(Debug, Clone)]
pub struct ProcessedSheet {
    pub sheet: TrackingSheet,
    pub range: ManifestRange,
    pub summary: Vec<ContractorSummary>,
    pub stats: SheetStats,
}

/// Row accounting for one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetStats {
    pub rows_read: usize,
    pub duplicates_removed: usize,
    pub blank_rows_removed: usize,
    pub values_filled: usize,
    pub rows_written: usize,
}

/// Run one sheet through clean → classify → aggregate.
///
/// The manifest range is taken from the sheet as read, before any rows are
/// removed. Audit entries and provenance go to the caller's ledgers; a sheet
/// that fails leaves both ledgers untouched.
pub fn process_sheet(
    sheet: TrackingSheet,
    thresholds: &SlaThresholds,
    audit: &mut AuditLog,
    provenance: &mut ProvenanceLog,
) -> Result<ProcessedSheet, ReconError> {
    let range = sheet.manifest_range().ok_or_else(|| ReconError::NoManifestDates {
        sheet: sheet.name.clone(),
    })?;
    let rows_read = sheet.records.len();

    let mut fills = ProvenanceLog::new();
    let (mut sheet, entries) = clean(sheet, &mut fills);
    classify_records(&mut sheet, thresholds);
    let summary = summarize(&sheet.records, &sheet.columns);

    let stats = SheetStats {
        rows_read,
        duplicates_removed: entries.first().map_or(0, |e| e.updated_count),
        blank_rows_removed: entries.get(1).map_or(0, |e| e.updated_count),
        values_filled: fills.len(),
        rows_written: sheet.records.len(),
    };

    log::info!(
        "sheet '{}' ({}): {} rows read, {} kept, {} values filled, {} contractor(s)",
        sheet.name,
        sheet.source,
        stats.rows_read,
        stats.rows_written,
        stats.values_filled,
        summary.len()
    );

    audit.extend(entries);
    provenance.merge(fills);

    Ok(ProcessedSheet {
        sheet,
        range,
        summary,
        stats,
    })
}
