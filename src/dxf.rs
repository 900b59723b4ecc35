//! Minimal ASCII DXF writer for a single sheet's layout.
//!
//! Each placement becomes a closed `LWPOLYLINE` on layer `PANELS`, wound
//! counter-clockwise from its origin, plus a `TEXT` entity on layer `LABELS`
//! carrying the panel id. The sheet outline goes on layer `SHEET`.

use crate::types::{Placement, Rect};

pub const TEXT_HEIGHT: f64 = 30.0;
pub const LABEL_OFFSET: f64 = 10.0;

pub fn sheet_to_dxf(sheet_width: f64, sheet_height: f64, placements: &[Placement]) -> String {
    let mut out = String::new();
    group(&mut out, 0, "SECTION");
    group(&mut out, 2, "HEADER");
    group(&mut out, 9, "$ACADVER");
    group(&mut out, 1, "AC1015");
    group(&mut out, 9, "$INSUNITS");
    // millimetres
    group(&mut out, 70, "4");
    group(&mut out, 0, "ENDSEC");

    group(&mut out, 0, "SECTION");
    group(&mut out, 2, "ENTITIES");
    polyline(&mut out, "SHEET", &Rect::new(0.0, 0.0, sheet_width, sheet_height));
    for p in placements {
        polyline(&mut out, "PANELS", &p.rect);
        text(
            &mut out,
            "LABELS",
            p.rect.x + LABEL_OFFSET,
            p.rect.y + LABEL_OFFSET,
            &p.panel_id,
        );
    }
    group(&mut out, 0, "ENDSEC");
    group(&mut out, 0, "EOF");
    out
}

fn group(out: &mut String, code: u16, value: &str) {
    out.push_str(&format!("{code:>3}\n{value}\n"));
}

/// Whole millimetres print as `600.0`; fractional ones keep every digit.
fn coord(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

fn polyline(out: &mut String, layer: &str, rect: &Rect) {
    group(out, 0, "LWPOLYLINE");
    group(out, 100, "AcDbEntity");
    group(out, 8, layer);
    group(out, 100, "AcDbPolyline");
    group(out, 90, "4");
    // closed
    group(out, 70, "1");
    for (x, y) in rect.corners() {
        group(out, 10, &coord(x));
        group(out, 20, &coord(y));
    }
}

fn text(out: &mut String, layer: &str, x: f64, y: f64, label: &str) {
    group(out, 0, "TEXT");
    group(out, 100, "AcDbEntity");
    group(out, 8, layer);
    group(out, 100, "AcDbText");
    group(out, 10, &coord(x));
    group(out, 20, &coord(y));
    group(out, 30, "0.0");
    group(out, 40, &format!("{TEXT_HEIGHT:.1}"));
    group(out, 1, &label.replace(['\r', '\n'], " "));
}
