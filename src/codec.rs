//! Plain text grid encoding: one line per row, `'1'` for a live cell and
//! `'0'` for a dead one. Rows are separated by `\n`; a single trailing newline
//! after the last row is tolerated on input and never written on output.

use std::{fs, path::Path};

use crate::{
    error::{Error, Malformed, Result},
    proc::Grid,
};

const ALIVE: char = '1';
const DEAD: char = '0';

/// Parses `text` into a `rows` x `cols` matrix. Nothing is returned unless the
/// whole text has exactly that shape.
pub fn parse(text: &str, rows: usize, cols: usize) -> Result<Vec<Vec<bool>>> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    let mut data = Vec::with_capacity(rows);

    for (i, line) in body.split('\n').enumerate() {
        if i == rows {
            let found = body.split('\n').count();
            return Err(Error::malformed(i + 1, Malformed::RowCount { expected: rows, found }));
        }
        let row = parse_row(line, cols).map_err(|kind| Error::malformed(i + 1, kind))?;
        data.push(row);
    }

    if data.len() < rows {
        let found = data.len();
        return Err(Error::malformed(found + 1, Malformed::RowCount { expected: rows, found }));
    }
    Ok(data)
}

fn parse_row(line: &str, cols: usize) -> std::result::Result<Vec<bool>, Malformed> {
    let mut row = Vec::with_capacity(cols);
    for (j, ch) in line.chars().enumerate() {
        let b = match ch {
            DEAD => false,
            ALIVE => true,
            _ => return Err(Malformed::InvalidChar { ch, col: j + 1 }),
        };
        row.push(b);
    }
    if row.len() != cols {
        return Err(Malformed::RowLength { expected: cols, found: row.len() });
    }
    Ok(row)
}

pub fn encode(grid: &Grid) -> String {
    let mut s = String::with_capacity(grid.rows() * (grid.cols() + 1));
    for (i, r) in grid.data().iter().enumerate() {
        if i > 0 {
            s.push('\n');
        }
        s.extend(r.iter().map(|&c| if c { ALIVE } else { DEAD }));
    }
    s
}

pub fn read_file(path: impl AsRef<Path>, rows: usize, cols: usize) -> Result<Vec<Vec<bool>>> {
    let text = fs::read_to_string(path)?;
    parse(&text, rows, cols)
}

/// Writes `grid` to `path`, replacing whatever was there.
pub fn write_file(path: impl AsRef<Path>, grid: &Grid) -> Result<()> {
    fs::write(path, encode(grid))?;
    Ok(())
}
