use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::ReconError;
use crate::schema::{Milestone, SheetColumns};
use crate::timestamp;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// One source value, backend-neutral.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Read the cell as a timestamp. Anything unparseable is absent.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            Self::Number(n) => timestamp::from_excel_serial(*n),
            Self::Text(s) => timestamp::parse_text(s),
            Self::Empty | Self::Bool(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text form used for identity keys (connote, driver).
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                // Integers without decimals: connotes often arrive as numbers
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Self::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

// ---------------------------------------------------------------------------
// Shipment records
// ---------------------------------------------------------------------------

/// SLA outcome bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlaStatus {
    Pending,
    Green,
    Yellow,
    Red,
}

impl std::fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Green => write!(f, "Green"),
            Self::Yellow => write!(f, "Yellow"),
            Self::Red => write!(f, "Red"),
        }
    }
}

/// Derived fields, stored once after cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlaOutcome {
    pub days: Option<i64>,
    pub status: SlaStatus,
}

/// One shipment row.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentRecord {
    /// 0-based data-row index in the source sheet (header excluded).
    pub position: usize,
    /// Every source cell, in source column order.
    pub cells: Vec<Cell>,
    pub sla: Option<SlaOutcome>,
}

impl ShipmentRecord {
    pub fn new(position: usize, cells: Vec<Cell>) -> Self {
        Self {
            position,
            cells,
            sla: None,
        }
    }

    /// Cell at `col`, or empty when the row is shorter than the header.
    pub fn cell(&self, col: usize) -> &Cell {
        self.cells.get(col).unwrap_or(&EMPTY_CELL)
    }

    pub fn set_cell(&mut self, col: usize, value: Cell) {
        if col >= self.cells.len() {
            self.cells.resize(col + 1, Cell::Empty);
        }
        self.cells[col] = value;
    }

    pub fn connote(&self, cols: &SheetColumns) -> String {
        self.cell(cols.connote).display_text()
    }

    pub fn manifest_date(&self, cols: &SheetColumns) -> Option<NaiveDateTime> {
        self.cell(cols.manifest).timestamp()
    }

    pub fn milestone(&self, cols: &SheetColumns, m: Milestone) -> Option<NaiveDateTime> {
        self.cell(cols.milestone(m)).timestamp()
    }

    pub fn pod_date(&self, cols: &SheetColumns) -> Option<NaiveDateTime> {
        self.cell(cols.pod).timestamp()
    }

    /// Driver identity as written in the sheet; blank cells have none.
    pub fn driver(&self, cols: &SheetColumns) -> Option<String> {
        let cell = self.cell(cols.driver);
        if cell.is_blank() {
            None
        } else {
            Some(cell.display_text())
        }
    }

    /// True when none of the five milestones carries a usable timestamp.
    pub fn has_no_events(&self, cols: &SheetColumns) -> bool {
        Milestone::ALL.iter().all(|m| self.milestone(cols, *m).is_none())
    }

    pub fn sla_status(&self) -> SlaStatus {
        self.sla.map(|o| o.status).unwrap_or(SlaStatus::Pending)
    }
}

// ---------------------------------------------------------------------------
// Sheets
// ---------------------------------------------------------------------------

/// One worksheet of one source document.
#[derive(Debug, Clone)]
pub struct TrackingSheet {
    pub name: String,
    /// File name of the originating document.
    pub source: String,
    pub headers: Vec<String>,
    pub columns: SheetColumns,
    pub records: Vec<ShipmentRecord>,
}

impl TrackingSheet {
    /// Build a sheet from a header row and data rows.
    ///
    /// Fails with `MissingColumn` when the header lacks a schema column.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<Self, ReconError> {
        let name = name.into();
        let columns = SheetColumns::resolve(&name, &headers)?;
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(position, cells)| ShipmentRecord::new(position, cells))
            .collect();

        Ok(Self {
            name,
            source: source.into(),
            headers,
            columns,
            records,
        })
    }

    /// Earliest and latest parseable manifest dates.
    pub fn manifest_range(&self) -> Option<ManifestRange> {
        let mut dates = self
            .records
            .iter()
            .filter_map(|r| r.manifest_date(&self.columns))
            .map(|dt| dt.date());
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(ManifestRange { start, end })
    }
}

/// Inclusive manifest-date span of one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ManifestRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ManifestRange {
    /// Output folder name, e.g. `2024-01-01_to_2024-01-31`.
    pub fn folder_name(&self) -> String {
        format!(
            "{}_to_{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

// ---------------------------------------------------------------------------
// Contractor summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractorSummary {
    #[serde(rename = "OFD Driver Name")]
    pub driver: String,
    #[serde(rename = "Delivered")]
    pub delivered: usize,
    #[serde(rename = "Delivered_SLA")]
    pub delivered_sla: usize,
    #[serde(rename = "Delivered_Exceeded")]
    pub delivered_exceeded: usize,
    #[serde(rename = "Pending")]
    pub pending: usize,
    #[serde(rename = "Total")]
    pub total: usize,
    #[serde(rename = "%Delivered SLA")]
    pub pct_delivered_sla: f64,
    #[serde(rename = "%Pending")]
    pub pct_pending: f64,
    #[serde(rename = "%Delivered")]
    pub pct_delivered: f64,
}
