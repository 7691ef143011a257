//! Sheet builders shared by the unit tests.

use chrono::NaiveDateTime;

use crate::model::{Cell, TrackingSheet};
use crate::schema::{Milestone, CONNOTE, DRIVER, MANIFEST_DATE, POD_DATE};

/// (connote, manifest, [AA..AE], POD, driver)
pub type Row<'a> = (&'a str, &'a str, [Option<&'a str>; 5], Option<&'a str>, Option<&'a str>);

pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

pub fn headers() -> Vec<String> {
    let mut h = vec![CONNOTE.to_string(), MANIFEST_DATE.to_string()];
    h.extend(Milestone::ALL.iter().map(|m| m.label().to_string()));
    h.push(POD_DATE.to_string());
    h.push(DRIVER.to_string());
    h
}

fn text(v: Option<&str>) -> Cell {
    v.map(|s| Cell::Text(s.to_string())).unwrap_or(Cell::Empty)
}

pub fn sheet_with(rows: &[Row<'_>]) -> TrackingSheet {
    let rows = rows
        .iter()
        .map(|(connote, manifest, events, pod, driver)| {
            let mut cells = vec![Cell::Text(connote.to_string()), Cell::Text(manifest.to_string())];
            cells.extend(events.iter().map(|e| text(*e)));
            cells.push(text(*pod));
            cells.push(text(*driver));
            cells
        })
        .collect();
    TrackingSheet::new("Sheet1", "report.xls", headers(), rows).unwrap()
}
