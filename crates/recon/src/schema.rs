//! Column vocabulary for tracking sheets.
//!
//! The source exports label their columns in plain English; the two-letter
//! codes are the spreadsheet column letters the operations team refers to
//! (AA = customs release ... AF = proof of delivery).

use serde::Serialize;

use crate::error::ReconError;

pub const CONNOTE: &str = "Connote #";
pub const MANIFEST_DATE: &str = "Manifest Date";
pub const POD_DATE: &str = "POD Date";
pub const DRIVER: &str = "OFD Driver Name";

pub const SLA_DAYS: &str = "SLA Days";
pub const SLA_STATUS: &str = "SLA Status";

/// Audit column label for the blank-row step (spans every milestone).
pub const EVENT_SPAN: &str = "AA to AE";

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// The five tracked lifecycle events, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    ReleasedFromCustoms,
    ReceivedFromAgent,
    CollectedByCourier,
    ArrivedAtHub,
    FirstOutForDelivery,
}

impl Milestone {
    pub const ALL: [Milestone; 5] = [
        Milestone::ReleasedFromCustoms,
        Milestone::ReceivedFromAgent,
        Milestone::CollectedByCourier,
        Milestone::ArrivedAtHub,
        Milestone::FirstOutForDelivery,
    ];

    /// Position in the chronological sequence.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Source column label.
    pub fn label(self) -> &'static str {
        match self {
            Self::ReleasedFromCustoms => "Date Released From Customs",
            Self::ReceivedFromAgent => "Date Received from Customs Agent",
            Self::CollectedByCourier => "Date Collected by Courier Provider",
            Self::ArrivedAtHub => "Arrived Hub Date",
            Self::FirstOutForDelivery => "First OFD Date",
        }
    }

    /// Source column letter.
    pub fn code(self) -> &'static str {
        match self {
            Self::ReleasedFromCustoms => "AA",
            Self::ReceivedFromAgent => "AB",
            Self::CollectedByCourier => "AC",
            Self::ArrivedAtHub => "AD",
            Self::FirstOutForDelivery => "AE",
        }
    }
}

impl std::fmt::Display for Milestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Positions of the schema columns within one sheet's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetColumns {
    pub connote: usize,
    pub manifest: usize,
    pub milestones: [usize; 5],
    pub pod: usize,
    pub driver: usize,
}

impl SheetColumns {
    /// Locate every schema column in `headers`.
    ///
    /// The manifest date is checked first: a sheet without it is a different
    /// report layout altogether and callers skip it on that basis.
    pub fn resolve(sheet: &str, headers: &[String]) -> Result<Self, ReconError> {
        let idx = |name: &str| -> Result<usize, ReconError> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ReconError::MissingColumn {
                    sheet: sheet.into(),
                    column: name.into(),
                })
        };

        let manifest = idx(MANIFEST_DATE)?;
        let connote = idx(CONNOTE)?;
        let mut milestones = [0usize; 5];
        for m in Milestone::ALL {
            milestones[m.index()] = idx(m.label())?;
        }
        let pod = idx(POD_DATE)?;
        let driver = idx(DRIVER)?;

        Ok(Self {
            connote,
            manifest,
            milestones,
            pod,
            driver,
        })
    }

    pub fn milestone(&self, m: Milestone) -> usize {
        self.milestones[m.index()]
    }
}
