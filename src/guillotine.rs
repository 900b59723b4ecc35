use std::cmp::Ordering;

use crate::types::{PanelInstance, Placement, Rect};

/// Free region kept by its edges, so a residual's far edge is copied from its
/// parent instead of being recomputed from a width.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Region {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Region {
    fn from_rect(r: &Rect) -> Self {
        Self {
            x0: r.x,
            y0: r.y,
            x1: r.right(),
            y1: r.bottom(),
        }
    }

    fn to_rect(self) -> Rect {
        Rect::new(self.x0, self.y0, self.x1 - self.x0, self.y1 - self.y0)
    }

    /// Same arithmetic as `Rect::right`/`Rect::bottom` on the placed piece.
    fn admits(&self, w: f64, h: f64) -> bool {
        self.x0 + w <= self.x1 && self.y0 + h <= self.y1
    }

    fn area(&self) -> f64 {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }

    fn contains(&self, other: &Region) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }

    fn has_area(&self) -> bool {
        self.x0 < self.x1 && self.y0 < self.y1
    }
}

/// Free-space bookkeeping for one open sheet.
///
/// Free regions are pairwise disjoint: every split produces two non-overlapping
/// residuals that never reach back over the placed piece.
#[derive(Debug, Clone)]
pub struct GuillotineSheet {
    index: usize,
    bounds: Rect,
    kerf: f64,
    free: Vec<Region>,
    pub placements: Vec<Placement>,
}

impl GuillotineSheet {
    pub fn new(index: usize, width: f64, height: f64, kerf: f64) -> Self {
        let bounds = Rect::new(0.0, 0.0, width, height);
        Self {
            index,
            bounds,
            kerf,
            free: vec![Region::from_rect(&bounds)],
            placements: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn free_rects(&self) -> Vec<Rect> {
        self.free.iter().copied().map(Region::to_rect).collect()
    }

    pub fn free_region_count(&self) -> usize {
        self.free.len()
    }

    pub fn used_area(&self) -> f64 {
        self.placements.iter().map(|p| p.rect.area()).sum()
    }

    pub fn free_area(&self) -> f64 {
        self.free.iter().map(Region::area).sum()
    }

    /// Best-area fit over all free regions that admit a `w` x `h` piece.
    ///
    /// Ties on leftover area go to the smallest `(y, x)` origin, so the answer does
    /// not depend on the order regions were inserted in.
    pub fn find_candidate(&self, w: f64, h: f64) -> Option<Rect> {
        self.free
            .iter()
            .filter(|r| r.admits(w, h))
            .min_by(|a, b| Self::rank(a, b, w * h))
            .copied()
            .map(Region::to_rect)
    }

    fn rank(a: &Region, b: &Region, piece_area: f64) -> Ordering {
        (a.area() - piece_area)
            .total_cmp(&(b.area() - piece_area))
            .then(a.y0.total_cmp(&b.y0))
            .then(a.x0.total_cmp(&b.x0))
    }

    /// Places `instance` at the origin of `region`, which must come from
    /// [`find_candidate`](Self::find_candidate).
    pub fn place(&mut self, region: Rect, instance: &PanelInstance) -> Placement {
        let rect = Rect::new(region.x, region.y, instance.width, instance.height);
        let placement = Placement {
            panel_id: instance.source_id.clone(),
            sheet_index: self.index,
            rect,
        };
        self.consume(region, rect);
        self.placements.push(placement.clone());
        placement
    }

    /// Removes `region` from the free set, adds the guillotine residuals left
    /// around `placed`, and drops residuals already covered by another region.
    pub fn consume(&mut self, region: Rect, placed: Rect) {
        debug_assert_eq!((region.x, region.y), (placed.x, placed.y));

        // Free regions are disjoint, so the origin identifies one.
        let Some(pos) = self
            .free
            .iter()
            .position(|r| r.x0 == region.x && r.y0 == region.y)
        else {
            tracing::warn!(sheet = self.index, %region, "consume called with unknown region");
            return;
        };
        let parent = self.free.swap_remove(pos);

        let added = self.split(parent, placed);
        self.prune_contained(&added);
    }

    fn split(&mut self, parent: Region, placed: Rect) -> Vec<Region> {
        let right = Region {
            x0: placed.right() + self.kerf,
            y0: parent.y0,
            x1: parent.x1,
            y1: placed.bottom(),
        };
        let below = Region {
            x0: parent.x0,
            y0: placed.bottom() + self.kerf,
            x1: parent.x1,
            y1: parent.y1,
        };

        // Zero-size (or kerf-swallowed) residuals are dropped
        let added: Vec<Region> = [right, below].into_iter().filter(Region::has_area).collect();
        self.free.extend_from_slice(&added);
        added
    }

    fn prune_contained(&mut self, added: &[Region]) {
        for new in added {
            let Some(pos) = self.free.iter().position(|r| r == new) else {
                continue;
            };
            let swallowed = self
                .free
                .iter()
                .enumerate()
                .any(|(i, other)| i != pos && other.contains(new));
            if swallowed {
                self.free.swap_remove(pos);
            }
        }
    }
}
