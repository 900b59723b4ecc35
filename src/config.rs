use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::is_positive_length;

pub const DEFAULT_SHEET_WIDTH: f64 = 2440.0;
pub const DEFAULT_SHEET_HEIGHT: f64 = 1220.0;
pub const DEFAULT_MAX_SHEETS: usize = 100;

/// Stock sheet and run limits shared by every sheet in a run. Lengths in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackingConfig {
    #[serde(default = "default_sheet_width")]
    pub sheet_width: f64,
    #[serde(default = "default_sheet_height")]
    pub sheet_height: f64,
    #[serde(default = "default_max_sheets")]
    pub max_sheets: usize,
    /// Saw blade width left between a panel and the free space next to it.
    #[serde(default)]
    pub kerf: f64,
}

fn default_sheet_width() -> f64 {
    DEFAULT_SHEET_WIDTH
}

fn default_sheet_height() -> f64 {
    DEFAULT_SHEET_HEIGHT
}

fn default_max_sheets() -> usize {
    DEFAULT_MAX_SHEETS
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            sheet_width: DEFAULT_SHEET_WIDTH,
            sheet_height: DEFAULT_SHEET_HEIGHT,
            max_sheets: DEFAULT_MAX_SHEETS,
            kerf: 0.0,
        }
    }
}

impl PackingConfig {
    pub fn new(sheet_width: f64, sheet_height: f64, max_sheets: usize) -> Self {
        Self {
            sheet_width,
            sheet_height,
            max_sheets,
            kerf: 0.0,
        }
    }

    pub fn with_kerf(self, kerf: f64) -> Self {
        Self { kerf, ..self }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_positive_length(self.sheet_width) || !is_positive_length(self.sheet_height) {
            return Err(Error::InvalidSheetSpec {
                reason: format!(
                    "sheet dimensions must be positive, got {}x{}",
                    self.sheet_width, self.sheet_height
                ),
            });
        }
        if self.max_sheets == 0 {
            return Err(Error::InvalidSheetSpec {
                reason: "max_sheets must be at least 1".to_string(),
            });
        }
        let shorter_side = self.sheet_width.min(self.sheet_height);
        if !(self.kerf >= 0.0 && self.kerf < shorter_side) {
            return Err(Error::InvalidSheetSpec {
                reason: format!(
                    "kerf must be at least 0 and below the shorter sheet side {shorter_side}, got {}",
                    self.kerf
                ),
            });
        }
        Ok(())
    }
}
