//! Grid value type: the structural validator and exact comparator.
//!
//! Every extraction strategy funnels its candidates through [`Grid::parse`],
//! so the acceptance rules live in exactly one place: a grid is a non-empty
//! rectangular array of integer cells in `0..=9`. Jagged rows, empty rows,
//! floats, strings, nulls, and out-of-range values are all rejected here and
//! nowhere else.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A rectangular ARC-style puzzle grid. Immutable after construction.
///
/// Equality is exact-match: same dimensions, every cell equal. There is no
/// partial pixel credit anywhere in this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Grid {
    cells: Vec<Vec<u8>>,
}

impl Grid {
    /// Build a grid from owned rows, enforcing the structural invariant.
    ///
    /// Returns `None` for empty grids, empty rows, jagged rows, or cells
    /// outside `0..=9`.
    pub fn from_rows(cells: Vec<Vec<u8>>) -> Option<Self> {
        let width = cells.first().map(|r| r.len())?;
        if width == 0 {
            return None;
        }
        for row in &cells {
            if row.len() != width || row.iter().any(|&c| c > 9) {
                return None;
            }
        }
        Some(Self { cells })
    }

    /// Parse a JSON value as a grid.
    ///
    /// Accepts only an array of equal-length arrays of integer literals
    /// `0..=9`. Floats (`1.0`), numeric strings (`"1"`), and nulls are not
    /// cells.
    pub fn parse(value: &Value) -> Option<Self> {
        let rows = value.as_array()?;
        let mut cells: Vec<Vec<u8>> = Vec::with_capacity(rows.len());
        for row in rows {
            let row = row.as_array()?;
            let mut out: Vec<u8> = Vec::with_capacity(row.len());
            for cell in row {
                // `as_u64` is None for floats and non-numbers, which is the point.
                let n = cell.as_u64()?;
                if n > 9 {
                    return None;
                }
                out.push(n as u8);
            }
            cells.push(out);
        }
        Self::from_rows(cells)
    }

    /// Number of rows. Always at least 1.
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Number of columns. Always at least 1, identical for every row.
    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    /// Read-only view of the cell data.
    pub fn as_cells(&self) -> &[Vec<u8>] {
        &self.cells
    }
}

/// Structural predicate used by every extraction strategy before a candidate
/// is accepted.
pub fn is_valid_grid(value: &Value) -> bool {
    Grid::parse(value).is_some()
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let cells = Vec::<Vec<u8>>::deserialize(deserializer)?;
        Grid::from_rows(cells)
            .ok_or_else(|| serde::de::Error::custom("not a rectangular grid of cells 0-9"))
    }
}

impl fmt::Display for Grid {
    /// Bracketed single-line rendering, e.g. `[[1,2],[3,4]]`. Used in log
    /// lines and test failure messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "[")?;
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", cell)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
