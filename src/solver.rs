use crate::config::PackingConfig;
use crate::error::{Error, Result};
use crate::guillotine::GuillotineSheet;
use crate::metrics;
use crate::types::{PackingResult, PanelInstance, PanelRequest, Sheet};

/// Best-area-fit, first-fit-across-sheets packer with guillotine splits.
///
/// A run is a pure function of the config and the requests: the same input always
/// yields the same sheets, placements and placement order.
pub struct Solver {
    config: PackingConfig,
    requests: Vec<PanelRequest>,
}

impl Solver {
    pub fn new(config: PackingConfig, requests: Vec<PanelRequest>) -> Self {
        Self { config, requests }
    }

    pub fn solve(&self) -> Result<PackingResult> {
        self.config.validate()?;
        for req in &self.requests {
            req.validate()?;
        }
        self.check_fits_sheet()?;

        let pieces = self.expand_requests()?;
        let total = pieces.len();
        let mut sheets: Vec<GuillotineSheet> = Vec::new();

        for (placed, piece) in pieces.iter().enumerate() {
            let fit = sheets.iter().enumerate().find_map(|(si, sheet)| {
                sheet
                    .find_candidate(piece.width, piece.height)
                    .map(|region| (si, region))
            });

            match fit {
                Some((si, region)) => {
                    sheets[si].place(region, piece);
                }
                None => {
                    if sheets.len() >= self.config.max_sheets {
                        tracing::warn!(
                            max_sheets = self.config.max_sheets,
                            placed,
                            remaining = total - placed,
                            panel = %piece.source_id,
                            "sheet limit reached"
                        );
                        return Err(Error::SheetCeilingExceeded {
                            max_sheets: self.config.max_sheets,
                            placed,
                            remaining: total - placed,
                        });
                    }
                    let mut sheet = self.open_sheet(sheets.len());
                    let region = sheet.bounds();
                    sheet.place(region, piece);
                    sheets.push(sheet);
                }
            }
        }

        let result = self.bins_to_result(sheets);
        tracing::info!(
            panels = total,
            sheets = result.utilization.sheets_used,
            waste_area = result.utilization.waste_area,
            waste_ratio = result.utilization.waste_ratio,
            "packing finished"
        );
        Ok(result)
    }

    /// Rejects any request that cannot fit an empty sheet, before a sheet is opened.
    fn check_fits_sheet(&self) -> Result<()> {
        let (sheet_width, sheet_height) = (self.config.sheet_width, self.config.sheet_height);
        match self
            .requests
            .iter()
            .find(|r| r.width > sheet_width || r.height > sheet_height)
        {
            Some(r) => Err(Error::PanelExceedsSheet {
                id: r.id.clone(),
                width: r.width,
                height: r.height,
                sheet_width,
                sheet_height,
            }),
            None => Ok(()),
        }
    }

    /// Expanded instances, largest area first, then tallest, then input order.
    fn expand_requests(&self) -> Result<Vec<PanelInstance>> {
        let mut pieces = Vec::new();
        for (i, req) in self.requests.iter().enumerate() {
            pieces.extend(req.expand(i)?);
        }
        // Stable, so copies of one request keep their relative order
        pieces.sort_by(|a, b| {
            b.area()
                .total_cmp(&a.area())
                .then(b.height.total_cmp(&a.height))
                .then(a.request_index.cmp(&b.request_index))
        });
        Ok(pieces)
    }

    fn open_sheet(&self, index: usize) -> GuillotineSheet {
        tracing::debug!(
            sheet = index,
            width = self.config.sheet_width,
            height = self.config.sheet_height,
            "opening sheet"
        );
        GuillotineSheet::new(
            index,
            self.config.sheet_width,
            self.config.sheet_height,
            self.config.kerf,
        )
    }

    fn bins_to_result(&self, bins: Vec<GuillotineSheet>) -> PackingResult {
        let sheets: Vec<Sheet> = bins
            .into_iter()
            .map(|bin| {
                tracing::debug!(
                    sheet = bin.index(),
                    panels = bin.placements.len(),
                    free_regions = bin.free_region_count(),
                    "sheet closed"
                );
                Sheet {
                    index: bin.index(),
                    width: self.config.sheet_width,
                    height: self.config.sheet_height,
                    placements: bin.placements,
                }
            })
            .collect();

        let utilization =
            metrics::account(self.config.sheet_width, self.config.sheet_height, &sheets);
        PackingResult {
            sheet_width: self.config.sheet_width,
            sheet_height: self.config.sheet_height,
            sheets,
            utilization,
        }
    }
}

/// Convenience wrapper for a one-off run.
pub fn pack(config: PackingConfig, requests: Vec<PanelRequest>) -> Result<PackingResult> {
    Solver::new(config, requests).solve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Placement;

    /// Validates a complete solution:
    /// 1. Every placement fits within the sheet dimensions
    /// 2. No two placements on the same sheet overlap
    /// 3. The total number of placed panels matches expectations
    /// 4. Sheet indices are dense and no sheet is empty
    fn assert_solution_valid(sol: &PackingResult, expected_panels: usize) {
        let total_placed: usize = sol.sheets.iter().map(|s| s.placements.len()).sum();
        assert_eq!(
            total_placed, expected_panels,
            "expected {} panels placed, got {}",
            expected_panels, total_placed
        );

        for (si, sheet) in sol.sheets.iter().enumerate() {
            assert_eq!(sheet.index, si);
            assert!(!sheet.placements.is_empty(), "sheet {si} is empty");
            for (pi, p) in sheet.placements.iter().enumerate() {
                assert_eq!(p.sheet_index, si);
                assert!(
                    p.rect.right() <= sol.sheet_width,
                    "sheet {si}, panel {pi} ({}) exceeds sheet width {}",
                    p.rect,
                    sol.sheet_width
                );
                assert!(
                    p.rect.bottom() <= sol.sheet_height,
                    "sheet {si}, panel {pi} ({}) exceeds sheet height {}",
                    p.rect,
                    sol.sheet_height
                );
            }
            assert_no_overlaps(si, &sheet.placements);
        }

        let u = &sol.utilization;
        assert_eq!(u.sheets_used, sol.sheets.len());
        assert!(u.used_area <= u.total_area);
        if u.sheets_used > 0 {
            assert!(u.waste_ratio >= 0.0 && u.waste_ratio < 1.0);
        }
    }

    fn assert_no_overlaps(sheet_idx: usize, placements: &[Placement]) {
        for i in 0..placements.len() {
            for j in (i + 1)..placements.len() {
                let a = &placements[i];
                let b = &placements[j];
                assert!(
                    !a.rect.overlaps(&b.rect),
                    "sheet {sheet_idx}: panel {i} ({} {}) overlaps panel {j} ({} {})",
                    a.panel_id,
                    a.rect,
                    b.panel_id,
                    b.rect
                );
            }
        }
    }

    fn requested_area(requests: &[PanelRequest]) -> f64 {
        requests.iter().map(|r| r.area() * r.quantity as f64).sum()
    }

    fn standard() -> PackingConfig {
        PackingConfig::new(2440.0, 1220.0, 100)
    }

    #[test]
    fn test_cutlist_example() {
        let requests = vec![
            PanelRequest::new("P1", 600.0, 400.0, 4),
            PanelRequest::new("P2", 800.0, 300.0, 2),
            PanelRequest::new("P3", 1200.0, 600.0, 1),
        ];
        let sol = pack(standard(), requests.clone()).unwrap();
        assert_solution_valid(&sol, 7);
        assert_eq!(sol.utilization.used_area, requested_area(&requests));
        assert!(sol.sheet_count() <= 2);
        // Largest panel goes first, into the corner of the first sheet
        assert_eq!(sol.sheets[0].placements[0].panel_id, "P3");
        assert_eq!(sol.sheets[0].placements[0].rect.x, 0.0);
        assert_eq!(sol.sheets[0].placements[0].rect.y, 0.0);
    }

    #[test]
    fn test_panel_exceeds_sheet() {
        let err = pack(standard(), vec![PanelRequest::new("Big", 3000.0, 3000.0, 1)]).unwrap_err();
        match err {
            Error::PanelExceedsSheet { id, .. } => assert_eq!(id, "Big"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_no_swapped_fit() {
        // Would fit rotated, but rotation is never attempted
        let err = pack(standard(), vec![PanelRequest::new("Tall", 1000.0, 2000.0, 1)]).unwrap_err();
        assert!(matches!(err, Error::PanelExceedsSheet { .. }));
    }

    #[test]
    fn test_exact_fill_has_zero_waste() {
        let sol = pack(standard(), vec![PanelRequest::new("Q", 610.0, 1220.0, 4)]).unwrap();
        assert_solution_valid(&sol, 4);
        assert_eq!(sol.sheet_count(), 1);
        assert_eq!(sol.utilization.waste_area, 0.0);
        assert_eq!(sol.utilization.waste_ratio, 0.0);
        let xs: Vec<f64> = sol.placements().map(|p| p.rect.x).collect();
        assert_eq!(xs, vec![0.0, 610.0, 1220.0, 1830.0]);
    }

    #[test]
    fn test_sheet_ceiling_exceeded() {
        let err = pack(
            PackingConfig::new(2440.0, 1220.0, 1),
            vec![PanelRequest::new("Full", 2440.0, 1220.0, 2)],
        )
        .unwrap_err();
        match err {
            Error::SheetCeilingExceeded {
                max_sheets,
                placed,
                remaining,
            } => {
                assert_eq!(max_sheets, 1);
                assert_eq!(placed, 1);
                assert_eq!(remaining, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_zero_quantity_is_invalid() {
        let err = pack(
            standard(),
            vec![
                PanelRequest::new("ok", 100.0, 100.0, 3),
                PanelRequest::new("none", 100.0, 100.0, 0),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidPanelSpec { ref id, .. } if id == "none"));
    }

    #[test]
    fn test_invalid_panel_reported_before_oversize() {
        let err = pack(
            standard(),
            vec![
                PanelRequest::new("Big", 3000.0, 100.0, 1),
                PanelRequest::new("flat", 100.0, 0.0, 1),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidPanelSpec { .. }));
    }

    #[test]
    fn test_invalid_sheet() {
        let err = pack(PackingConfig::new(2440.0, 1220.0, 0), vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidSheetSpec { .. }));
    }

    #[test]
    fn test_no_requests() {
        let sol = pack(standard(), vec![]).unwrap();
        assert_solution_valid(&sol, 0);
        assert_eq!(sol.utilization.waste_ratio, 0.0);
    }

    #[test]
    fn test_first_fit_returns_to_earlier_sheet() {
        let requests = vec![
            PanelRequest::new("A", 60.0, 60.0, 2),
            PanelRequest::new("B", 40.0, 40.0, 1),
        ];
        let sol = pack(PackingConfig::new(100.0, 100.0, 10), requests).unwrap();
        assert_solution_valid(&sol, 3);
        assert_eq!(sol.sheet_count(), 2);
        let ids: Vec<&str> = sol.sheets[0]
            .placements
            .iter()
            .map(|p| p.panel_id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(sol.sheets[0].placements[1].rect.x, 60.0);
    }

    #[test]
    fn test_order_area_then_height_then_input() {
        let requests = vec![
            PanelRequest::new("wide", 20.0, 5.0, 1),
            PanelRequest::new("square", 10.0, 10.0, 1),
            PanelRequest::new("tall", 5.0, 20.0, 1),
            PanelRequest::new("square2", 10.0, 10.0, 1),
        ];
        let sol = pack(PackingConfig::new(100.0, 100.0, 1), requests).unwrap();
        let ids: Vec<&str> = sol.placements().map(|p| p.panel_id.as_str()).collect();
        assert_eq!(ids, vec!["tall", "square", "square2", "wide"]);
    }

    #[test]
    fn test_deterministic() {
        let requests = vec![
            PanelRequest::new("A", 700.0, 500.0, 6),
            PanelRequest::new("B", 350.0, 250.0, 5),
            PanelRequest::new("C", 1000.0, 400.0, 3),
            PanelRequest::new("D", 450.0, 450.0, 4),
        ];
        let first = pack(standard(), requests.clone()).unwrap();
        let second = pack(standard(), requests).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_kerf_reduces_capacity() {
        let requests = vec![PanelRequest::new("half", 50.0, 100.0, 2)];
        let no_kerf = pack(PackingConfig::new(100.0, 100.0, 10), requests.clone()).unwrap();
        assert_solution_valid(&no_kerf, 2);
        assert_eq!(no_kerf.sheet_count(), 1);

        // 50 + 5 + 50 = 105 > 100, needs 2 sheets
        let kerf = pack(PackingConfig::new(100.0, 100.0, 10).with_kerf(5.0), requests).unwrap();
        assert_solution_valid(&kerf, 2);
        assert_eq!(kerf.sheet_count(), 2);
    }

    /// 30 panels, 6 different sizes, standard plywood sheet 2440x1220.
    #[test]
    fn test_complex_mixed_sizes() {
        let requests = vec![
            PanelRequest::new("a", 800.0, 600.0, 5),
            PanelRequest::new("b", 400.0, 300.0, 8),
            PanelRequest::new("c", 600.0, 400.0, 4),
            PanelRequest::new("d", 1200.0, 600.0, 3),
            PanelRequest::new("e", 300.0, 200.0, 6),
            PanelRequest::new("f", 500.0, 500.0, 4),
        ];
        let sol = pack(standard(), requests.clone()).unwrap();
        assert_solution_valid(&sol, 30);
        assert_eq!(sol.utilization.used_area, requested_area(&requests));

        // Lower bound: total panel area / sheet area
        let min_sheets = (sol.utilization.used_area / (2440.0 * 1220.0)).ceil() as usize;
        assert!(sol.sheet_count() >= min_sheets);
    }

    /// 40 panels, 8 different sizes, with a 3mm kerf.
    #[test]
    fn test_complex_with_kerf() {
        let requests = vec![
            PanelRequest::new("a", 1200.0, 600.0, 4),
            PanelRequest::new("b", 800.0, 400.0, 6),
            PanelRequest::new("c", 600.0, 300.0, 5),
            PanelRequest::new("d", 400.0, 400.0, 3),
            PanelRequest::new("e", 500.0, 250.0, 7),
            PanelRequest::new("f", 300.0, 200.0, 5),
            PanelRequest::new("g", 700.0, 350.0, 6),
            PanelRequest::new("h", 250.0, 150.0, 4),
        ];
        let sol = pack(standard().with_kerf(3.0), requests.clone()).unwrap();
        assert_solution_valid(&sol, 40);
        assert_eq!(sol.utilization.used_area, requested_area(&requests));
    }

    /// 32 panels on a small sheet, forcing many sheets.
    #[test]
    fn test_small_sheet_many_sheets() {
        let requests = vec![
            PanelRequest::new("a", 200.0, 150.0, 8),
            PanelRequest::new("b", 300.0, 200.0, 6),
            PanelRequest::new("c", 150.0, 100.0, 7),
            PanelRequest::new("d", 250.0, 180.0, 5),
            PanelRequest::new("e", 400.0, 300.0, 6),
        ];
        let sol = pack(PackingConfig::new(500.0, 400.0, 100), requests).unwrap();
        assert_solution_valid(&sol, 32);
        // A 400x300 leaves no room for another on a 500x400 sheet
        assert!(sol.sheet_count() >= 6);
    }

    #[test]
    fn test_ceiling_respected_at_the_boundary() {
        let requests = vec![PanelRequest::new("a", 400.0, 300.0, 6)];
        let sol = pack(PackingConfig::new(500.0, 400.0, 6), requests.clone()).unwrap();
        assert_eq!(sol.sheet_count(), 6);

        let err = pack(PackingConfig::new(500.0, 400.0, 5), requests).unwrap_err();
        assert!(matches!(
            err,
            Error::SheetCeilingExceeded {
                placed: 5,
                remaining: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_kerf_at_or_beyond_sheet_side_is_rejected() {
        let requests = vec![PanelRequest::new("A", 50.0, 50.0, 2)];
        for kerf in [100.0, f64::MAX, f64::INFINITY] {
            let err = pack(
                PackingConfig::new(100.0, 100.0, 10).with_kerf(kerf),
                requests.clone(),
            )
            .unwrap_err();
            assert!(matches!(err, Error::InvalidSheetSpec { .. }), "kerf {kerf}");
        }

        // Just under the side is legal; every piece after the first needs its own sheet
        let sol = pack(
            PackingConfig::new(100.0, 100.0, 10).with_kerf(99.0),
            requests,
        )
        .unwrap();
        assert_solution_valid(&sol, 2);
        assert_eq!(sol.sheet_count(), 2);
    }

    #[test]
    fn test_fractional_millimetres() {
        let requests = vec![
            PanelRequest::new("P1", 600.5, 400.0, 4),
            PanelRequest::new("P2", 1219.75, 610.25, 2),
            PanelRequest::new("P3", 33.3, 12.7, 20),
        ];
        let sol = pack(standard().with_kerf(3.2), requests.clone()).unwrap();
        assert_solution_valid(&sol, 26);
        assert!((sol.utilization.used_area - requested_area(&requests)).abs() < 1e-6);
        assert_eq!(sol.sheets[0].placements[0].panel_id, "P2");
        assert_eq!(sol.sheets[0].placements[0].rect.w, 1219.75);
    }
}
