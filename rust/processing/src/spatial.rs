// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial hash over feature extents for candidate lookup.
//!
//! The XY plane is divided into square cells of side `cell_size`. Every item
//! is registered in all cells its extent covers; a search visits the cells of
//! the query extent and checks the item extents exactly.

use cutlite_core::Envelope;
use rustc_hash::{FxHashMap, FxHashSet};

/// Maximum number of cells a single extent is registered in
const MAX_CELLS_PER_ITEM: i64 = 4096;

#[derive(Debug)]
pub struct SpatialHashSearcher {
    cell_size: f64,
    grid: FxHashMap<(i64, i64), Vec<usize>>,
    /// Items too large for the grid, checked on every search
    oversized: Vec<usize>,
    extents: Vec<Envelope>,
}

impl SpatialHashSearcher {
    /// Index `items` by the extent `extent_of` returns for them. Search
    /// results are positions in `items`.
    pub fn new<T>(items: &[T], extent_of: impl Fn(&T) -> Envelope) -> Self {
        let extents: Vec<Envelope> = items.iter().map(extent_of).collect();
        let cell_size = Self::estimate_cell_size(&extents);
        let mut searcher = Self {
            cell_size,
            grid: FxHashMap::default(),
            oversized: Vec::new(),
            extents: Vec::new(),
        };
        for (index, extent) in extents.iter().enumerate() {
            searcher.insert(index, extent);
        }
        searcher.extents = extents;
        searcher
    }

    /// Average extent size of the items; never below a small positive value
    fn estimate_cell_size(extents: &[Envelope]) -> f64 {
        let (sum, count) = extents
            .iter()
            .filter(|e| !e.is_empty())
            .fold((0.0, 0usize), |(sum, count), e| {
                (sum + e.width().max(e.height()), count + 1)
            });
        if count == 0 || sum <= 0.0 {
            return 1.0;
        }
        (sum / count as f64).max(1e-6)
    }

    fn insert(&mut self, index: usize, extent: &Envelope) {
        if extent.is_empty() {
            return;
        }
        let (x0, y0) = self.cell_coords(extent.xmin, extent.ymin);
        let (x1, y1) = self.cell_coords(extent.xmax, extent.ymax);
        if (x1 - x0 + 1).saturating_mul(y1 - y0 + 1) > MAX_CELLS_PER_ITEM {
            self.oversized.push(index);
            return;
        }
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.grid.entry((cx, cy)).or_default().push(index);
            }
        }
    }

    /// Items whose extent intersects `extent` expanded by `tolerance`, in
    /// ascending order.
    pub fn search(&self, extent: &Envelope, tolerance: f64) -> Vec<usize> {
        if extent.is_empty() {
            return Vec::new();
        }
        let query = extent.expanded(tolerance);
        let (x0, y0) = self.cell_coords(query.xmin, query.ymin);
        let (x1, y1) = self.cell_coords(query.xmax, query.ymax);

        let mut found: FxHashSet<usize> = FxHashSet::default();
        let cells = (x1 - x0 + 1).saturating_mul(y1 - y0 + 1);
        if cells > self.grid.len() as i64 {
            // Fewer occupied cells than query cells
            for indices in self.grid.values() {
                found.extend(indices.iter().copied());
            }
        } else {
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    if let Some(indices) = self.grid.get(&(cx, cy)) {
                        found.extend(indices.iter().copied());
                    }
                }
            }
        }
        found.extend(self.oversized.iter().copied());

        let mut result: Vec<usize> = found
            .into_iter()
            .filter(|&i| self.extents[i].intersects(extent, tolerance))
            .collect();
        result.sort_unstable();
        result
    }

    pub fn len(&self) -> usize {
        self.extents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    fn cell_coords(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_of_squares(n: usize) -> Vec<Envelope> {
        (0..n)
            .map(|i| {
                let (x, y) = ((i % 10) as f64 * 10.0, (i / 10) as f64 * 10.0);
                Envelope::new(x, y, x + 5.0, y + 5.0)
            })
            .collect()
    }

    #[test]
    fn test_search_matches_linear_scan() {
        let items = grid_of_squares(100);
        let searcher = SpatialHashSearcher::new(&items, |e| *e);
        let query = Envelope::new(12.0, 12.0, 33.0, 27.0);

        let expected: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, e)| e.intersects(&query, 0.5))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(searcher.search(&query, 0.5), expected);
        assert_eq!(expected.len(), 6);
    }

    #[test]
    fn test_tolerance_reaches_neighbours() {
        let items = vec![Envelope::new(0.0, 0.0, 5.0, 5.0)];
        let searcher = SpatialHashSearcher::new(&items, |e| *e);
        let query = Envelope::new(5.5, 0.0, 6.0, 1.0);

        assert!(searcher.search(&query, 0.1).is_empty());
        assert_eq!(searcher.search(&query, 1.0), vec![0]);
    }

    #[test]
    fn test_large_items_are_found() {
        let mut items = grid_of_squares(4);
        items.push(Envelope::new(-1e6, -1e6, 1e6, 1e6));
        let searcher = SpatialHashSearcher::new(&items, |e| *e);

        let result = searcher.search(&Envelope::new(500.0, 500.0, 501.0, 501.0), 0.0);
        assert_eq!(result, vec![4]);
    }
}
