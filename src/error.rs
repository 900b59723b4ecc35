//! Error types for a packing run.

use thiserror::Error;

/// Result type alias for packing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is terminal for the run; no partial layout is produced.
#[derive(Debug, Error)]
pub enum Error {
    /// A panel request has a non-positive width, height or quantity.
    #[error("invalid panel '{id}': {reason}")]
    InvalidPanelSpec { id: String, reason: String },

    /// The sheet configuration itself is unusable.
    #[error("invalid sheet: {reason}")]
    InvalidSheetSpec { reason: String },

    /// A panel is larger than the sheet in at least one axis.
    #[error(
        "panel '{id}' ({width}x{height}) does not fit in sheet {sheet_width}x{sheet_height}"
    )]
    PanelExceedsSheet {
        id: String,
        width: f64,
        height: f64,
        sheet_width: f64,
        sheet_height: f64,
    },

    /// Placing the next panel would need more sheets than allowed.
    #[error("sheet limit of {max_sheets} reached: {placed} panels placed, {remaining} remaining")]
    SheetCeilingExceeded {
        max_sheets: usize,
        placed: usize,
        remaining: usize,
    },

    #[error("csv input: {0}")]
    Csv(#[from] csv::Error),

    #[error("json input: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidPanelSpec { .. } => "InvalidPanelSpec",
            Error::InvalidSheetSpec { .. } => "InvalidSheetSpec",
            Error::PanelExceedsSheet { .. } => "PanelExceedsSheet",
            Error::SheetCeilingExceeded { .. } => "SheetCeilingExceeded",
            Error::Csv(_) => "Csv",
            Error::Json(_) => "Json",
            Error::Io(_) => "Io",
        }
    }

    pub(crate) fn invalid_panel(id: &str, reason: impl Into<String>) -> Self {
        Error::InvalidPanelSpec {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
