use tracing::trace;

use crate::error::{Error, Result};

/// Offsets of the eight cells surrounding a cell.
#[rustfmt::skip]
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    ( 0, -1),          ( 0, 1),
    ( 1, -1), ( 1, 0), ( 1, 1),
];

/// Toroidal field of cells. Rows and columns wrap independently, so every
/// integer coordinate names a cell and every cell has exactly eight neighbors.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<Vec<bool>>,
    // staging buffer for the next generation, same shape as `data`
    next: Vec<Vec<bool>>,
}

impl Grid {

    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions { rows, cols });
        }
        Ok(Grid {
            rows,
            cols,
            data: vec![vec![false; cols]; rows],
            next: vec![vec![false; cols]; rows],
        })
    }

    /// Builds a grid from a row-major matrix. All rows must have the same,
    /// non-zero length.
    #[cfg(test)]
    pub(crate) fn from_rows(data: Vec<Vec<bool>>) -> Result<Self> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 || !data.iter().all(|r| r.len() == cols) {
            return Err(Error::InvalidDimensions { rows, cols });
        }
        Ok(Grid {
            rows,
            cols,
            next: vec![vec![false; cols]; rows],
            data,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn data(&self) -> &[Vec<bool>] {
        &self.data
    }

    #[inline]
    fn wrap(&self, row: isize, col: isize) -> (usize, usize) {
        (
            row.rem_euclid(self.rows as isize) as usize,
            col.rem_euclid(self.cols as isize) as usize,
        )
    }

    #[inline]
    pub fn get(&self, row: isize, col: isize) -> bool {
        let (i, j) = self.wrap(row, col);
        self.data[i][j]
    }

    #[inline]
    pub fn set(&mut self, row: isize, col: isize, alive: bool) {
        let (i, j) = self.wrap(row, col);
        self.data[i][j] = alive;
    }

    /// Flips a cell and returns its new state.
    pub fn toggle(&mut self, row: isize, col: isize) -> bool {
        let (i, j) = self.wrap(row, col);
        self.data[i][j] = !self.data[i][j];
        self.data[i][j]
    }

    /// States of the eight surrounding cells. The coordinate is wrapped before
    /// the offsets are applied, so it never overflows at the `isize` extremes.
    pub fn neighbors(&self, row: isize, col: isize) -> [bool; 8] {
        let (i, j) = self.wrap(row, col);
        NEIGHBOR_OFFSETS.map(|(di, dj)| {
            let r = (i + self.rows).wrapping_add_signed(di) % self.rows;
            let c = (j + self.cols).wrapping_add_signed(dj) % self.cols;
            self.data[r][c]
        })
    }

    pub fn live_neighbors(&self, row: isize, col: isize) -> usize {
        self.neighbors(row, col).iter().filter(|&&n| n).count()
    }

    pub fn population(&self) -> usize {
        self.data.iter().flatten().filter(|&&c| c).count()
    }

    pub fn clear(&mut self) {
        for r in &mut self.data {
            r.fill(false);
        }
    }

    /// Replaces every cell at once. `data` must have the grid's exact shape.
    pub(crate) fn replace(&mut self, data: Vec<Vec<bool>>) {
        debug_assert!(data.len() == self.rows && data.iter().all(|r| r.len() == self.cols));
        self.data = data;
    }

    /// Advances one generation. Every cell is evaluated against the current
    /// generation into the staging buffer, then the buffers are swapped.
    pub fn step(&mut self) {
        for i in 0..self.rows {
            for j in 0..self.cols {
                let n = self.live_neighbors(i as isize, j as isize);
                self.next[i][j] = next_state(self.data[i][j], n);
            }
        }
        std::mem::swap(&mut self.data, &mut self.next);
        trace!(population = self.population(), "generation advanced");
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Grid {}

/// Conway's B3/S23 rule.
#[inline]
pub fn next_state(alive: bool, live_neighbors: usize) -> bool {
    matches!((alive, live_neighbors), (true, 2) | (true, 3) | (false, 3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid_with(rows: usize, cols: usize, live: &[(isize, isize)]) -> Grid {
        let mut g = Grid::new(rows, cols).unwrap();
        for &(r, c) in live {
            g.set(r, c, true);
        }
        g
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert!(matches!(Grid::new(0, 5), Err(Error::InvalidDimensions { rows: 0, cols: 5 })));
        assert!(matches!(Grid::new(5, 0), Err(Error::InvalidDimensions { .. })));
        assert!(Grid::from_rows(vec![]).is_err());
        assert!(Grid::from_rows(vec![vec![true, false], vec![true]]).is_err());
    }

    #[test]
    fn new_grid_is_dead() {
        let g = Grid::new(4, 7).unwrap();
        assert_eq!(g.population(), 0);
        assert_eq!((g.rows(), g.cols()), (4, 7));
    }

    #[test]
    fn coordinates_wrap_both_ways() {
        let mut g = Grid::new(5, 7).unwrap();
        g.set(-1, -1, true);
        assert!(g.get(4, 6));
        for r in -12..12 {
            for c in -15..15 {
                assert_eq!(g.get(r, c), g.get(r + 5, c + 7), "({r}, {c})");
                assert_eq!(g.get(r, c), g.get(r - 10, c - 21), "({r}, {c})");
            }
        }
        g.set(12, 15, true);
        assert!(g.get(2, 1));
    }

    #[test]
    fn corner_has_eight_wrapped_neighbors() {
        let g = grid_with(4, 4, &[(3, 3), (0, 3), (3, 0), (1, 1)]);
        assert_eq!(g.neighbors(0, 0).len(), 8);
        assert_eq!(g.live_neighbors(0, 0), 4);
    }

    #[test]
    fn rule_table() {
        for n in 0..=8 {
            assert_eq!(next_state(true, n), n == 2 || n == 3, "live with {n}");
            assert_eq!(next_state(false, n), n == 3, "dead with {n}");
        }
    }

    #[test]
    fn lonely_cell_dies() {
        let mut g = grid_with(6, 6, &[(2, 2)]);
        g.step();
        assert_eq!(g.population(), 0);
    }

    #[test]
    fn block_is_still_life() {
        let mut g = grid_with(6, 6, &[(2, 2), (2, 3), (3, 2), (3, 3)]);
        let before = g.data().to_vec();
        for _ in 0..10 {
            g.step();
            assert_eq!(g.data(), &before[..]);
        }
    }

    #[test]
    fn block_across_the_seam_is_still_life() {
        let mut g = grid_with(5, 5, &[(4, 4), (4, 0), (0, 4), (0, 0)]);
        g.step();
        assert_eq!(g.population(), 4);
        assert!(g.get(0, 0) && g.get(-1, -1));
    }

    #[test]
    fn step_is_synchronous() {
        // A blinker flips between horizontal and vertical. Updated in place,
        // row by row, the left end would see the freshly born top cell and survive.
        let mut g = grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        g.step();
        let live: Vec<_> = (0..5)
            .flat_map(|r| (0..5).map(move |c| (r, c)))
            .filter(|&(r, c)| g.get(r, c))
            .collect();
        assert_eq!(live, vec![(1, 2), (2, 2), (3, 2)]);
        g.step();
        assert!(g.get(2, 1) && g.get(2, 2) && g.get(2, 3));
        assert_eq!(g.population(), 3);
    }

    #[test]
    fn clear_kills_everything() {
        let mut g = grid_with(3, 3, &[(0, 0), (1, 2), (2, 1)]);
        g.clear();
        assert!((0..3).all(|r| (0..3).all(|c| !g.get(r, c))));
    }

    #[test]
    fn toggle_flips() {
        let mut g = Grid::new(3, 3).unwrap();
        assert!(g.toggle(-1, 4));
        assert!(g.get(2, 1));
        assert!(!g.toggle(2, 1));
    }

    #[test]
    fn neighbors_at_coordinate_extremes() {
        let g = grid_with(3, 3, &[(0, 0), (1, 2), (2, 1), (2, 2)]);
        for &(r, c) in &[
            (isize::MAX, isize::MIN),
            (isize::MIN, isize::MAX),
            (isize::MAX, isize::MAX),
            (isize::MIN, isize::MIN),
        ] {
            let (wr, wc) = (r.rem_euclid(3), c.rem_euclid(3));
            assert_eq!(g.neighbors(r, c), g.neighbors(wr, wc), "({r}, {c})");
            assert_eq!(g.live_neighbors(r, c), g.live_neighbors(wr, wc), "({r}, {c})");
        }
    }

    fn grid_strategy() -> impl Strategy<Value = Grid> {
        (1usize..8, 1usize..8).prop_flat_map(|(rows, cols)| {
            proptest::collection::vec(proptest::collection::vec(any::<bool>(), cols), rows)
                .prop_map(|data| Grid::from_rows(data).unwrap())
        })
    }

    proptest! {
        #[test]
        fn wrap_holds_for_any_coordinate(g in grid_strategy(), r in any::<isize>(), c in any::<isize>()) {
            let (rows, cols) = (g.rows() as isize, g.cols() as isize);
            let (wr, wc) = (r.rem_euclid(rows), c.rem_euclid(cols));
            prop_assert_eq!(g.get(r, c), g.get(wr, wc));
            if let (Some(r2), Some(c2)) = (r.checked_add(rows), c.checked_add(cols)) {
                prop_assert_eq!(g.get(r, c), g.get(r2, c2));
            }

            // reference lookup done in i128 so nothing can overflow
            let expected = NEIGHBOR_OFFSETS.map(|(di, dj)| {
                let i = (r as i128 + di as i128).rem_euclid(rows as i128) as usize;
                let j = (c as i128 + dj as i128).rem_euclid(cols as i128) as usize;
                g.data()[i][j]
            });
            prop_assert_eq!(g.neighbors(r, c), expected);
        }

        #[test]
        fn set_through_any_coordinate_hits_the_wrapped_cell(
            rows in 1usize..8,
            cols in 1usize..8,
            r in any::<isize>(),
            c in any::<isize>(),
        ) {
            let mut g = Grid::new(rows, cols).unwrap();
            g.set(r, c, true);
            prop_assert_eq!(g.population(), 1);
            prop_assert!(g.get(r.rem_euclid(rows as isize), c.rem_euclid(cols as isize)));
        }
    }
}
