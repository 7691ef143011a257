//! `tracksla-recon`: shipment milestone reconciliation and SLA engine.
//!
//! Pure engine crate: receives parsed sheets, returns cleaned and classified
//! sheets plus contractor summaries. No CLI or IO dependencies.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod interpolate;
pub mod ledger;
pub mod model;
pub mod reconcile;
pub mod schema;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{SlaThresholds, TrackConfig};
pub use engine::{process_sheet, ProcessedSheet, SheetStats};
pub use error::ReconError;
pub use ledger::{AuditEntry, AuditLog, ProvenanceEntry, ProvenanceLog};
pub use model::{Cell, ContractorSummary, ManifestRange, ShipmentRecord, SlaStatus, TrackingSheet};
pub use schema::Milestone;
