use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold ordering, bad colour, etc.).
    ConfigValidation(String),
    /// A schema column is not present in the sheet's header row.
    MissingColumn { sheet: String, column: String },
    /// No manifest date in the sheet parses, so there is no output range.
    NoManifestDates { sheet: String },
}

impl ReconError {
    /// True when the sheet lacks the manifest-date column, i.e. it is not a
    /// tracking report at all.
    pub fn is_missing_manifest(&self) -> bool {
        matches!(self, Self::MissingColumn { column, .. } if column == crate::schema::MANIFEST_DATE)
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { sheet, column } => {
                write!(f, "sheet '{sheet}': missing column '{column}'")
            }
            Self::NoManifestDates { sheet } => {
                write!(f, "sheet '{sheet}': no parseable '{}' values", crate::schema::MANIFEST_DATE)
            }
        }
    }
}

impl std::error::Error for ReconError {}
