// XLSX report writers
//
// Per sheet: the cleaned dataset (with interpolated cells highlighted) and
// the contractor summary, under a folder named after the manifest range.
// Per run: the audit log and the update (provenance) log at the output root.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook, Worksheet, XlsxError};
use tracksla_recon::schema::{SLA_DAYS, SLA_STATUS};
use tracksla_recon::timestamp::to_excel_serial;
use tracksla_recon::{AuditLog, Cell, ProcessedSheet, ProvenanceLog};

pub const AUDIT_LOG_FILE: &str = "Tracking_Audit_Log.xlsx";
pub const UPDATE_LOG_FILE: &str = "Tracking_Update_Log.xlsx";

const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

const SUMMARY_HEADERS: [&str; 9] = [
    "OFD Driver Name",
    "Delivered",
    "Delivered_SLA",
    "Delivered_Exceeded",
    "Pending",
    "Total",
    "%Delivered SLA",
    "%Pending",
    "%Delivered",
];

const AUDIT_HEADERS: [&str; 7] = [
    "Column",
    "Updated Count",
    "Action",
    "Sheet",
    "Source File",
    "Rows Before",
    "Rows After",
];

const UPDATE_HEADERS: [&str; 6] = [
    "Connote #",
    "Updated Column",
    "Value",
    "Sheet",
    "Source File",
    "Row Index",
];

/// Files written for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetOutputs {
    pub folder: PathBuf,
    pub dataset: PathBuf,
    pub summary: PathBuf,
    pub highlighted: usize,
}

struct Formats {
    header: Format,
    date: Format,
    highlight: Format,
    highlight_date: Format,
}

impl Formats {
    fn new(highlight_rgb: u32) -> Self {
        let fill = Color::RGB(highlight_rgb);
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format(DATE_TIME_FORMAT),
            highlight: Format::new().set_background_color(fill),
            highlight_date: Format::new()
                .set_num_format(DATE_TIME_FORMAT)
                .set_background_color(fill),
        }
    }
}

/// Writes every report file under one output root.
pub struct ReportWriter {
    root: PathBuf,
    formats: Formats,
}

impl ReportWriter {
    pub fn new(root: impl Into<PathBuf>, highlight_rgb: u32) -> Self {
        Self {
            root: root.into(),
            formats: Formats::new(highlight_rgb),
        }
    }

    /// Write the dataset and contractor summary of one processed sheet.
    ///
    /// Cells listed in `provenance` for this sheet and source document are
    /// written with the highlight fill. The file is produced in a single
    /// pass, so rerunning on the same input gives the same highlighting.
    pub fn write_sheet(
        &self,
        processed: &ProcessedSheet,
        provenance: &ProvenanceLog,
    ) -> Result<SheetOutputs, String> {
        let folder = self.root.join(processed.range.folder_name());
        fs::create_dir_all(&folder)
            .map_err(|e| format!("Failed to create '{}': {}", folder.display(), e))?;

        let name = &processed.sheet.name;
        let dataset = folder.join(format!("{}_Processed.xlsx", name));
        let summary = folder.join(format!("{}_Contractor_Summary.xlsx", name));

        let highlighted = self
            .write_dataset(processed, provenance, &dataset)
            .map_err(|e| format!("Failed to write '{}': {}", dataset.display(), e))?;
        self.write_summary(processed, &summary)
            .map_err(|e| format!("Failed to write '{}': {}", summary.display(), e))?;

        log::info!(
            "wrote '{}' ({} rows, {} highlighted) and '{}'",
            dataset.display(),
            processed.sheet.records.len(),
            highlighted,
            summary.display()
        );

        Ok(SheetOutputs {
            folder,
            dataset,
            summary,
            highlighted,
        })
    }

    /// Write the run-wide audit and update logs. Called once per run.
    pub fn write_logs(
        &self,
        audit: &AuditLog,
        provenance: &ProvenanceLog,
    ) -> Result<(PathBuf, PathBuf), String> {
        fs::create_dir_all(&self.root)
            .map_err(|e| format!("Failed to create '{}': {}", self.root.display(), e))?;

        let audit_path = self.root.join(AUDIT_LOG_FILE);
        self.write_audit_log(audit, &audit_path)
            .map_err(|e| format!("Failed to write '{}': {}", audit_path.display(), e))?;

        let update_path = self.root.join(UPDATE_LOG_FILE);
        self.write_update_log(provenance, &update_path)
            .map_err(|e| format!("Failed to write '{}': {}", update_path.display(), e))?;

        log::info!(
            "wrote run logs: {} audit entries, {} updates",
            audit.len(),
            provenance.len()
        );
        Ok((audit_path, update_path))
    }

    // -----------------------------------------------------------------------
    // Dataset
    // -----------------------------------------------------------------------

    fn write_dataset(
        &self,
        processed: &ProcessedSheet,
        provenance: &ProvenanceLog,
        path: &Path,
    ) -> Result<usize, XlsxError> {
        let sheet = &processed.sheet;
        let layout = DatasetLayout::new(&sheet.headers);

        // written row of each surviving record, keyed by original position
        let written: HashMap<usize, usize> = sheet
            .records
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.position, idx))
            .collect();
        let highlights: HashSet<(usize, usize)> = provenance
            .for_sheet(&sheet.name, &sheet.source)
            .filter_map(|entry| {
                let idx = written.get(&entry.row_index)?;
                Some((*idx, sheet.columns.milestone(entry.milestone)))
            })
            .collect();

        let mut book = XlsxWorkbook::new();
        let ws = book.add_worksheet();
        write_header_row(ws, &layout.headers, &self.formats.header)?;

        for (idx, record) in sheet.records.iter().enumerate() {
            let row = to_row(idx + 1)?;
            for col in 0..layout.headers.len() {
                let c = to_col(col)?;
                if col == layout.sla_days {
                    if let Some(days) = record.sla.and_then(|o| o.days) {
                        ws.write_number(row, c, days as f64)?;
                    }
                } else if col == layout.sla_status {
                    ws.write_string(row, c, record.sla_status().to_string())?;
                } else {
                    let highlight = highlights.contains(&(idx, col));
                    self.write_cell(ws, row, c, record.cell(col), highlight)?;
                }
            }
        }

        book.save(path)?;
        Ok(highlights.len())
    }

    fn write_cell(
        &self,
        ws: &mut Worksheet,
        row: u32,
        col: u16,
        cell: &Cell,
        highlight: bool,
    ) -> Result<(), XlsxError> {
        let plain = if highlight {
            Some(&self.formats.highlight)
        } else {
            None
        };

        match (cell, plain) {
            (Cell::Empty, None) => {}
            (Cell::Empty, Some(f)) => {
                ws.write_blank(row, col, f)?;
            }
            (Cell::Text(s), None) => {
                ws.write_string(row, col, s)?;
            }
            (Cell::Text(s), Some(f)) => {
                ws.write_string_with_format(row, col, s, f)?;
            }
            (Cell::Number(n), None) => {
                ws.write_number(row, col, *n)?;
            }
            (Cell::Number(n), Some(f)) => {
                ws.write_number_with_format(row, col, *n, f)?;
            }
            (Cell::Bool(b), None) => {
                ws.write_boolean(row, col, *b)?;
            }
            (Cell::Bool(b), Some(f)) => {
                ws.write_boolean_with_format(row, col, *b, f)?;
            }
            (Cell::DateTime(dt), _) => {
                let format = if highlight {
                    &self.formats.highlight_date
                } else {
                    &self.formats.date
                };
                ws.write_number_with_format(row, col, to_excel_serial(*dt), format)?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Summary and run logs
    // -----------------------------------------------------------------------

    fn write_summary(&self, processed: &ProcessedSheet, path: &Path) -> Result<(), XlsxError> {
        let mut book = XlsxWorkbook::new();
        let ws = book.add_worksheet();
        write_header_row(ws, &SUMMARY_HEADERS, &self.formats.header)?;

        for (idx, s) in processed.summary.iter().enumerate() {
            let row = to_row(idx + 1)?;
            ws.write_string(row, 0, &s.driver)?;
            let counts = [s.delivered, s.delivered_sla, s.delivered_exceeded, s.pending, s.total];
            for (i, n) in counts.iter().enumerate() {
                ws.write_number(row, 1 + i as u16, *n as f64)?;
            }
            ws.write_number(row, 6, s.pct_delivered_sla)?;
            ws.write_number(row, 7, s.pct_pending)?;
            ws.write_number(row, 8, s.pct_delivered)?;
        }

        ws.autofit();
        book.save(path)
    }

    fn write_audit_log(&self, audit: &AuditLog, path: &Path) -> Result<(), XlsxError> {
        let mut book = XlsxWorkbook::new();
        let ws = book.add_worksheet();
        write_header_row(ws, &AUDIT_HEADERS, &self.formats.header)?;

        for (idx, e) in audit.entries().iter().enumerate() {
            let row = to_row(idx + 1)?;
            ws.write_string(row, 0, &e.column)?;
            ws.write_number(row, 1, e.updated_count as f64)?;
            ws.write_string(row, 2, &e.action)?;
            ws.write_string(row, 3, &e.sheet)?;
            ws.write_string(row, 4, &e.source)?;
            ws.write_number(row, 5, e.rows_before as f64)?;
            ws.write_number(row, 6, e.rows_after as f64)?;
        }

        ws.autofit();
        book.save(path)
    }

    fn write_update_log(&self, provenance: &ProvenanceLog, path: &Path) -> Result<(), XlsxError> {
        let mut book = XlsxWorkbook::new();
        let ws = book.add_worksheet();
        write_header_row(ws, &UPDATE_HEADERS, &self.formats.header)?;

        for (idx, e) in provenance.entries().iter().enumerate() {
            let row = to_row(idx + 1)?;
            ws.write_string(row, 0, &e.connote)?;
            ws.write_string(row, 1, &e.column)?;
            ws.write_number_with_format(row, 2, to_excel_serial(e.value), &self.formats.date)?;
            ws.write_string(row, 3, &e.sheet)?;
            ws.write_string(row, 4, &e.source)?;
            ws.write_number(row, 5, e.row_index as f64)?;
        }

        ws.autofit();
        book.save(path)
    }
}

/// Output column order: every source column in place, then `SLA Days` and
/// `SLA Status` unless the source already had columns with those names.
struct DatasetLayout {
    headers: Vec<String>,
    sla_days: usize,
    sla_status: usize,
}

impl DatasetLayout {
    fn new(source_headers: &[String]) -> Self {
        let mut headers = source_headers.to_vec();
        let mut place = |label: &str| {
            match headers.iter().position(|h| h.trim() == label) {
                Some(i) => i,
                None => {
                    headers.push(label.to_string());
                    headers.len() - 1
                }
            }
        };
        let sla_days = place(SLA_DAYS);
        let sla_status = place(SLA_STATUS);

        Self {
            headers,
            sla_days,
            sla_status,
        }
    }
}

fn write_header_row<S: AsRef<str>>(
    ws: &mut Worksheet,
    headers: &[S],
    bold: &Format,
) -> Result<(), XlsxError> {
    for (col, h) in headers.iter().enumerate() {
        ws.write_string_with_format(0, to_col(col)?, h.as_ref(), bold)?;
    }
    Ok(())
}

fn to_row(idx: usize) -> Result<u32, XlsxError> {
    u32::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

fn to_col(idx: usize) -> Result<u16, XlsxError> {
    u16::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}
