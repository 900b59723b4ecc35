//! Sheet cut-list optimizer: packs rectangular panel requests onto fixed-size
//! stock sheets without rotation, using best-area fit with guillotine splits.
//!
//! ```ignore
//! use panel_cutlist::{pack, PackingConfig, PanelRequest};
//!
//! let requests = vec![
//!     PanelRequest::new("P1", 600.0, 400.0, 4),
//!     PanelRequest::new("P3", 1200.0, 600.5, 1),
//! ];
//! let result = pack(PackingConfig::new(2440.0, 1220.0, 100), requests)?;
//! println!("{} sheets, {:.1}% waste", result.sheet_count(), result.total_waste_percent());
//! ```

pub mod config;
pub mod dxf;
pub mod error;
pub mod guillotine;
pub mod ingest;
pub mod metrics;
pub mod render;
pub mod solver;
pub mod types;

pub use config::PackingConfig;
pub use error::{Error, Result};
pub use metrics::Utilization;
pub use solver::{Solver, pack};
pub use types::{PackingResult, PanelRequest, Placement, Rect, Sheet};
