use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::metrics::Utilization;

/// Axis-aligned rectangle in sheet coordinates (millimetres), origin at the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Exclusive right edge.
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Whether a `w` x `h` piece fits inside this rect without rotation.
    pub fn admits(&self, w: f64, h: f64) -> bool {
        w <= self.w && h <= self.h
    }

    /// Whether `other` lies entirely inside this rect.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Positive-area intersection test; touching edges do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The four corners, counter-clockwise from the origin in y-down coordinates.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.right(), self.y),
            (self.right(), self.bottom()),
            (self.x, self.bottom()),
        ]
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} @ ({}, {})", self.w, self.h, self.x, self.y)
    }
}

/// One line of the cut list: `quantity` identical panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRequest {
    pub id: String,
    pub width: f64,
    pub height: f64,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
}

impl PanelRequest {
    pub fn new(id: impl Into<String>, width: f64, height: f64, quantity: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            quantity,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_positive_length(self.width) {
            return Err(Error::invalid_panel(
                &self.id,
                format!("width must be positive, got {}", self.width),
            ));
        }
        if !is_positive_length(self.height) {
            return Err(Error::invalid_panel(
                &self.id,
                format!("height must be positive, got {}", self.height),
            ));
        }
        if self.quantity == 0 {
            return Err(Error::invalid_panel(&self.id, "quantity must be at least 1"));
        }
        Ok(())
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Expands the request into `quantity` instances, in order.
    pub fn expand(&self, request_index: usize) -> Result<Vec<PanelInstance>> {
        self.validate()?;
        Ok((0..self.quantity)
            .map(|_| PanelInstance {
                source_id: self.id.clone(),
                request_index,
                width: self.width,
                height: self.height,
            })
            .collect())
    }
}

/// Finite and strictly greater than zero.
pub(crate) fn is_positive_length(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// A single physical cut, alive only while a run is in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelInstance {
    pub source_id: String,
    pub request_index: usize,
    pub width: f64,
    pub height: f64,
}

impl PanelInstance {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub panel_id: String,
    pub sheet_index: usize,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub placements: Vec<Placement>,
}

impl Sheet {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn used_area(&self) -> f64 {
        self.placements.iter().map(|p| p.rect.area()).sum()
    }

    pub fn waste_area(&self) -> f64 {
        (self.area() - self.used_area()).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackingResult {
    pub sheet_width: f64,
    pub sheet_height: f64,
    pub sheets: Vec<Sheet>,
    pub utilization: Utilization,
}

impl PackingResult {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.sheets.iter().flat_map(|s| &s.placements)
    }

    pub fn total_waste_percent(&self) -> f64 {
        self.utilization.waste_ratio * 100.0
    }
}

/// Accepts `4` as well as `4.0`; rejects negatives and fractions.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    u32_from_f64(value).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a non-negative integer, got {value}"))
    })
}

pub(crate) fn u32_from_f64(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}
