//! Material utilization figures derived from a finished layout.

use serde::Serialize;

use crate::types::Sheet;

/// Areas are in square millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Utilization {
    pub sheets_used: usize,
    /// Sum of placed panel areas.
    pub used_area: f64,
    /// `sheets_used` times the area of one sheet.
    pub total_area: f64,
    pub waste_area: f64,
    /// `waste_area / total_area`, or 0 when no sheet is used.
    pub waste_ratio: f64,
}

impl Utilization {
    pub fn utilization_ratio(&self) -> f64 {
        if self.total_area == 0.0 {
            0.0
        } else {
            1.0 - self.waste_ratio
        }
    }
}

pub fn account(sheet_width: f64, sheet_height: f64, sheets: &[Sheet]) -> Utilization {
    let sheet_area = sheet_width * sheet_height;
    let sheets_used = sheets.len();
    let used_area: f64 = sheets.iter().map(Sheet::used_area).sum();
    let total_area = sheet_area * sheets_used as f64;
    // Rounding in the sum may push a perfect fill a hair past the sheet area
    let waste_area = (total_area - used_area).max(0.0);
    let waste_ratio = if sheets_used == 0 {
        0.0
    } else {
        waste_area / total_area
    };

    Utilization {
        sheets_used,
        used_area,
        total_area,
        waste_area,
        waste_ratio,
    }
}
