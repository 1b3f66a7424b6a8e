use crate::proc::Grid;

pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(isize, isize)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "gosper",
        cells: &[
            (5, 1), (5, 2), (6, 1), (6, 2),
            (5, 11), (6, 11), (7, 11), (4, 12), (8, 12), (3, 13), (9, 13),
            (3, 14), (9, 14), (6, 15), (4, 16), (8, 16), (5, 17), (6, 17),
            (7, 17), (6, 18), (3, 21), (4, 21), (5, 21), (3, 22), (4, 22),
            (5, 22), (2, 23), (6, 23), (1, 25), (2, 25), (6, 25), (7, 25),
            (3, 35), (4, 35), (3, 36), (4, 36),
        ],
    },
    Pattern {
        name: "glider",
        cells: &[(1, 2), (2, 3), (3, 1), (3, 2), (3, 3)],
    },
    Pattern {
        name: "blinker",
        cells: &[(2, 1), (2, 2), (2, 3)],
    },
    Pattern {
        name: "block",
        cells: &[(1, 1), (1, 2), (2, 1), (2, 2)],
    },
    Pattern {
        name: "empty",
        cells: &[],
    },
];

pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Clears `grid` and sets the pattern's cells. Cells wrap like any other
/// coordinate, so a pattern larger than the grid folds onto itself.
pub fn apply(grid: &mut Grid, pattern: &Pattern) {
    grid.clear();
    for &(row, col) in pattern.cells {
        grid.set(row, col, true);
    }
}
