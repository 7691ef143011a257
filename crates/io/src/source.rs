// Source document reading: legacy workbook first, HTML table as fallback

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use tracksla_recon::timestamp::{from_excel_serial, parse_text};
use tracksla_recon::{Cell, ReconError, TrackingSheet};

use crate::html;

/// Header row plus data rows of one sheet, as read.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    /// Split the first row off as the header. Fully blank data rows are
    /// dropped; they carry nothing to reconcile.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut rows = rows.into_iter();
        let headers = rows
            .next()
            .map(|h| h.iter().map(Cell::display_text).collect())
            .unwrap_or_default();
        let rows = rows
            .filter(|r| !r.iter().all(Cell::is_blank))
            .collect();

        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Resolve the schema columns; fails when a required column is missing.
    pub fn into_tracking(self, source: &str) -> Result<TrackingSheet, ReconError> {
        TrackingSheet::new(self.name, source, self.headers, self.rows)
    }
}

/// Which reader produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    HtmlTable,
}

/// A sheet that could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetFailure {
    pub sheet: String,
    pub reason: String,
}

/// One opened source document. Sheets that failed to read are kept as
/// failures so the caller can report them and carry on with the rest.
#[derive(Debug)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub file_name: String,
    pub format: SourceFormat,
    pub sheets: Vec<Result<RawSheet, SheetFailure>>,
}

/// Open a report document.
///
/// The workbook reader is tried first. If it cannot open the file, the
/// document is read as an HTML table instead, yielding a single sheet named
/// after the file stem. Fails only when both readers fail.
pub fn read_document(path: &Path) -> Result<SourceDocument, String> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let workbook_err = match read_workbook(path) {
        Ok(sheets) => {
            return Ok(SourceDocument {
                path: path.to_path_buf(),
                file_name,
                format: SourceFormat::Workbook,
                sheets,
            })
        }
        Err(e) => e,
    };

    log::warn!("{}: {}; falling back to HTML table parser", file_name, workbook_err);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());
    let sheet = html::import(path, &stem).map_err(|html_err| {
        format!(
            "Failed to open '{}': {}; HTML fallback: {}",
            path.display(),
            workbook_err,
            html_err
        )
    })?;

    Ok(SourceDocument {
        path: path.to_path_buf(),
        file_name,
        format: SourceFormat::HtmlTable,
        sheets: vec![Ok(sheet)],
    })
}

/// Read every sheet of a workbook (xls, xlsx, xlsb, ods).
///
/// Errors opening the file are returned; errors reading one sheet are
/// recorded against that sheet.
pub fn read_workbook(path: &Path) -> Result<Vec<Result<RawSheet, SheetFailure>>, String> {
    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err("Excel file contains no sheets".to_string());
    }

    let sheets = sheet_names
        .into_iter()
        .map(|name| match workbook.worksheet_range(&name) {
            Ok(range) => {
                let rows = range
                    .rows()
                    .map(|row| row.iter().map(data_to_cell).collect())
                    .collect();
                Ok(RawSheet::from_rows(name, rows))
            }
            Err(e) => Err(SheetFailure {
                reason: format!("Failed to read sheet '{}': {}", name, e),
                sheet: name,
            }),
        })
        .collect();

    Ok(sheets)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => {
            // 1900 date system assumed; calamine does not expose the 1904 flag
            let serial = dt.as_f64();
            from_excel_serial(serial)
                .map(Cell::DateTime)
                .unwrap_or(Cell::Number(serial))
        }
        Data::DateTimeIso(s) => parse_text(s)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_splits_header_and_drops_blank_rows() {
        let sheet = RawSheet::from_rows(
            "S",
            vec![
                vec![Cell::Text("Connote #".into()), Cell::Number(7.0)],
                vec![Cell::Text("A".into()), Cell::Empty],
                vec![Cell::Empty, Cell::Text("  ".into())],
                vec![Cell::Empty, Cell::Number(1.5)],
            ],
        );
        assert_eq!(sheet.headers, vec!["Connote #", "7"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1][1], Cell::Number(1.5));
    }

    #[test]
    fn test_from_rows_empty() {
        let sheet = RawSheet::from_rows("S", Vec::new());
        assert!(sheet.headers.is_empty());
        assert!(sheet.rows.is_empty());
        let err = sheet.into_tracking("x.xls").unwrap_err();
        assert!(err.is_missing_manifest());
    }

    #[test]
    fn test_data_to_cell() {
        assert_eq!(data_to_cell(&Data::Int(42)), Cell::Number(42.0));
        assert_eq!(data_to_cell(&Data::String("x".into())), Cell::Text("x".into()));
        assert_eq!(data_to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(
            data_to_cell(&Data::DateTimeIso("2024-01-02T08:00:00".into())),
            Cell::DateTime(parse_text("2024-01-02 08:00:00").unwrap())
        );
        assert_eq!(
            data_to_cell(&Data::DateTimeIso("not a date".into())),
            Cell::Text("not a date".into())
        );
    }

    #[test]
    fn test_read_document_falls_back_to_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skynet_jan.xls");
        std::fs::write(
            &path,
            "<table><tr><th>Connote #</th><th>Manifest Date</th></tr>\
             <tr><td>SKY1</td><td>2024-01-01</td></tr></table>",
        )
        .unwrap();

        let doc = read_document(&path).unwrap();
        assert_eq!(doc.format, SourceFormat::HtmlTable);
        assert_eq!(doc.file_name, "skynet_jan.xls");
        assert_eq!(doc.sheets.len(), 1);
        let sheet = doc.sheets[0].as_ref().unwrap();
        assert_eq!(sheet.name, "skynet_jan");
        assert_eq!(sheet.rows.len(), 1);
    }

    #[test]
    fn test_read_document_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.xls");
        std::fs::write(&path, b"\x00\x01\x02 neither workbook nor html").unwrap();

        let err = read_document(&path).unwrap_err();
        assert!(err.contains("Failed to open"));
        assert!(err.contains("HTML fallback"));
    }

    #[test]
    fn test_read_workbook_written_by_xlsxwriter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        let mut book = rust_xlsxwriter::Workbook::new();
        let ws = book.add_worksheet().set_name("Jan").unwrap();
        ws.write_string(0, 0, "Connote #").unwrap();
        ws.write_string(0, 1, "Manifest Date").unwrap();
        ws.write_string(1, 0, "SKY1").unwrap();
        ws.write_number(1, 1, 45292.5).unwrap();
        book.add_worksheet().set_name("Empty").unwrap();
        book.save(&path).unwrap();

        let doc = read_document(&path).unwrap();
        assert_eq!(doc.format, SourceFormat::Workbook);
        assert_eq!(doc.sheets.len(), 2);

        let jan = doc.sheets[0].as_ref().unwrap();
        assert_eq!(jan.name, "Jan");
        assert_eq!(jan.headers, vec!["Connote #", "Manifest Date"]);
        assert_eq!(jan.rows[0][1].timestamp(), parse_text("2024-01-01 12:00"));

        let empty = doc.sheets[1].as_ref().unwrap();
        assert!(empty.headers.is_empty());
    }
}
