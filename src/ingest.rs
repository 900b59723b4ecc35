//! Cut-list ingestion: tabular rows with `PanelID`, `Width_mm`, `Height_mm` and
//! `Quantity` columns, from CSV or from a JSON array of row objects.

use std::io::Read;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{PanelRequest, is_positive_length, u32_from_f64};

/// One untyped row as it appears in a spreadsheet export.
#[derive(Debug, Clone, Deserialize)]
pub struct PanelRow {
    #[serde(rename = "PanelID")]
    pub panel_id: String,
    #[serde(rename = "Width_mm")]
    pub width_mm: f64,
    #[serde(rename = "Height_mm")]
    pub height_mm: f64,
    #[serde(rename = "Quantity")]
    pub quantity: f64,
}

impl TryFrom<PanelRow> for PanelRequest {
    type Error = Error;

    fn try_from(row: PanelRow) -> Result<Self> {
        let id = row.panel_id.trim().to_string();
        if id.is_empty() {
            return Err(Error::invalid_panel(&id, "PanelID must not be empty"));
        }
        let width = positive_length(&id, "Width_mm", row.width_mm)?;
        let height = positive_length(&id, "Height_mm", row.height_mm)?;
        let quantity = match u32_from_f64(row.quantity) {
            Some(q) if q > 0 => q,
            _ => {
                return Err(Error::invalid_panel(
                    &id,
                    format!("Quantity must be a positive whole number, got {}", row.quantity),
                ));
            }
        };

        let request = PanelRequest {
            id,
            width,
            height,
            quantity,
        };
        request.validate()?;
        Ok(request)
    }
}

fn positive_length(id: &str, column: &str, value: f64) -> Result<f64> {
    if is_positive_length(value) {
        Ok(value)
    } else {
        Err(Error::invalid_panel(
            id,
            format!("{column} must be positive, got {value}"),
        ))
    }
}

/// Reads a CSV cut list with a header row. Extra columns are ignored.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<PanelRequest>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut requests = Vec::new();
    for row in rdr.deserialize::<PanelRow>() {
        requests.push(PanelRequest::try_from(row?)?);
    }
    tracing::debug!(rows = requests.len(), "read csv cut list");
    Ok(requests)
}

/// Parses a JSON array of row objects using the same column names as the CSV form.
pub fn parse_json(input: &str) -> Result<Vec<PanelRequest>> {
    let rows: Vec<PanelRow> = serde_json::from_str(input)?;
    rows.into_iter().map(PanelRequest::try_from).collect()
}
