//! Grid state and coordinates
//!
//! The slice axis wraps around the ring; the layer axis does not.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::palette::ColorId;

/// A cell coordinate. Orders by slice, then layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub slice: usize,
    pub layer: usize,
}

impl Position {
    #[inline]
    pub const fn new(slice: usize, layer: usize) -> Self {
        Self { slice, layer }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.slice, self.layer)
    }
}

/// Where a ball entering a slice from the outside comes to rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Settles on top of the column's outermost block
    Cell(Position),
    /// Outermost cell already taken: the column is full
    Blocked,
    /// Column is empty: the ball reaches the core
    Core,
}

/// Colors of every cell, `n_slice × n_layer`, fixed size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct Grid {
    n_slice: usize,
    n_layer: usize,
    /// Slice-major storage: `cells[slice * n_layer + layer]`
    cells: Vec<ColorId>,
}

/// Unchecked serialized form of a [`Grid`]
#[derive(Deserialize)]
struct GridData {
    n_slice: usize,
    n_layer: usize,
    cells: Vec<ColorId>,
}

impl TryFrom<GridData> for Grid {
    type Error = GridError;

    fn try_from(data: GridData) -> Result<Self, Self::Error> {
        if data.cells.len() != data.n_slice * data.n_layer {
            return Err(GridError::CellCount {
                n_slice: data.n_slice,
                n_layer: data.n_layer,
                cells: data.cells.len(),
            });
        }
        Ok(Self {
            n_slice: data.n_slice,
            n_layer: data.n_layer,
            cells: data.cells,
        })
    }
}

impl Grid {
    /// Create an all-empty grid
    pub fn new(n_slice: usize, n_layer: usize) -> Self {
        Self {
            n_slice,
            n_layer,
            cells: vec![ColorId::EMPTY; n_slice * n_layer],
        }
    }

    /// Build a grid from per-slice columns (layer 0 first)
    ///
    /// Missing layers are empty; extra layers are ignored.
    pub fn from_columns(n_layer: usize, columns: &[&[u8]]) -> Self {
        let mut grid = Self::new(columns.len(), n_layer);
        for (slice, column) in columns.iter().enumerate() {
            for (layer, &color) in column.iter().take(n_layer).enumerate() {
                grid.set(Position::new(slice, layer), ColorId(color));
            }
        }
        grid
    }

    #[inline]
    pub fn n_slice(&self) -> usize {
        self.n_slice
    }

    #[inline]
    pub fn n_layer(&self) -> usize {
        self.n_layer
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.slice < self.n_slice && pos.layer < self.n_layer
    }

    /// Fail fast on out-of-range coordinates
    pub fn check(&self, pos: Position) -> Result<(), GridError> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(GridError::OutOfRange {
                slice: pos.slice,
                layer: pos.layer,
                n_slice: self.n_slice,
                n_layer: self.n_layer,
            })
        }
    }

    pub fn check_slice(&self, slice: usize) -> Result<(), GridError> {
        if slice < self.n_slice {
            Ok(())
        } else {
            Err(GridError::SliceOutOfRange {
                slice,
                n_slice: self.n_slice,
            })
        }
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        debug_assert!(self.contains(pos), "{} outside grid", pos);
        pos.slice * self.n_layer + pos.layer
    }

    /// Color at `pos`; panics when out of range
    #[inline]
    pub fn color(&self, pos: Position) -> ColorId {
        self.cells[self.index(pos)]
    }

    pub fn get(&self, pos: Position) -> Option<ColorId> {
        self.contains(pos).then(|| self.color(pos))
    }

    #[inline]
    pub fn set(&mut self, pos: Position, color: ColorId) {
        let idx = self.index(pos);
        self.cells[idx] = color;
    }

    #[inline]
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.color(pos).is_empty()
    }

    /// Slice index moved by `offset` around the ring
    #[inline]
    pub fn wrap_slice(&self, slice: usize, offset: isize) -> usize {
        let n = self.n_slice as isize;
        (slice as isize + offset).rem_euclid(n) as usize
    }

    #[inline]
    pub fn left_of(&self, pos: Position) -> Position {
        Position::new(self.wrap_slice(pos.slice, -1), pos.layer)
    }

    #[inline]
    pub fn right_of(&self, pos: Position) -> Position {
        Position::new(self.wrap_slice(pos.slice, 1), pos.layer)
    }

    /// Next layer outward, if any
    #[inline]
    pub fn above(&self, pos: Position) -> Option<Position> {
        (pos.layer + 1 < self.n_layer).then(|| Position::new(pos.slice, pos.layer + 1))
    }

    /// Next layer inward, if any
    #[inline]
    pub fn below(&self, pos: Position) -> Option<Position> {
        (pos.layer > 0).then(|| Position::new(pos.slice, pos.layer - 1))
    }

    /// Colors of one slice, innermost first
    pub fn column(&self, slice: usize) -> &[ColorId] {
        let start = slice * self.n_layer;
        &self.cells[start..start + self.n_layer]
    }

    /// Every position, slice ascending then layer ascending
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.n_slice)
            .flat_map(move |slice| (0..self.n_layer).map(move |layer| Position::new(slice, layer)))
    }

    /// Number of non-empty cells
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Where a ball entering `slice` from outside comes to rest
    pub fn landing(&self, slice: usize) -> Result<Landing, GridError> {
        self.check_slice(slice)?;
        let column = self.column(slice);
        if column.last().is_some_and(|c| !c.is_empty()) {
            return Ok(Landing::Blocked);
        }
        Ok(match column.iter().rposition(|c| !c.is_empty()) {
            Some(top) => Landing::Cell(Position::new(slice, top + 1)),
            None => Landing::Core,
        })
    }

    /// True when no empty cell sits under a non-empty one in any column
    pub fn is_compacted(&self) -> bool {
        (0..self.n_slice).all(|slice| {
            self.column(slice)
                .windows(2)
                .all(|pair| !(pair[0].is_empty() && !pair[1].is_empty()))
        })
    }

    /// Positions whose color differs from `earlier`
    ///
    /// Both grids must have the same dimensions.
    pub fn diff(&self, earlier: &Grid) -> BTreeSet<Position> {
        debug_assert_eq!(
            (self.n_slice, self.n_layer),
            (earlier.n_slice, earlier.n_layer)
        );
        self.positions()
            .filter(|&pos| self.color(pos) != earlier.color(pos))
            .collect()
    }
}

/// Outermost layer on the first line, one character per slice
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for layer in (0..self.n_layer).rev() {
            for slice in 0..self.n_slice {
                let color = self.color(Position::new(slice, layer));
                if color.is_empty() {
                    f.write_str(".")?;
                } else if color.0 < 10 {
                    write!(f, "{}", color.0)?;
                } else {
                    f.write_str("#")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_slice() {
        let grid = Grid::new(6, 3);
        assert_eq!(grid.wrap_slice(0, -1), 5);
        assert_eq!(grid.wrap_slice(5, 1), 0);
        assert_eq!(grid.wrap_slice(2, 13), 3);
        assert_eq!(grid.left_of(Position::new(0, 2)), Position::new(5, 2));
        assert_eq!(grid.right_of(Position::new(5, 1)), Position::new(0, 1));
    }

    #[test]
    fn test_vertical_neighbors_do_not_wrap() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.below(Position::new(1, 0)), None);
        assert_eq!(grid.above(Position::new(1, 2)), None);
        assert_eq!(grid.above(Position::new(1, 1)), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_check_rejects_out_of_range() {
        let grid = Grid::new(6, 3);
        assert!(grid.check(Position::new(5, 2)).is_ok());
        assert_eq!(
            grid.check(Position::new(6, 0)),
            Err(GridError::OutOfRange {
                slice: 6,
                layer: 0,
                n_slice: 6,
                n_layer: 3
            })
        );
        assert!(grid.check(Position::new(0, 3)).is_err());
        assert_eq!(grid.get(Position::new(0, 3)), None);
    }

    #[test]
    fn test_landing() {
        let grid = Grid::from_columns(3, &[&[1, 2, 3], &[1], &[]]);
        assert_eq!(grid.landing(0), Ok(Landing::Blocked));
        assert_eq!(grid.landing(1), Ok(Landing::Cell(Position::new(1, 1))));
        assert_eq!(grid.landing(2), Ok(Landing::Core));
        assert!(matches!(
            grid.landing(3),
            Err(GridError::SliceOutOfRange { slice: 3, .. })
        ));
    }

    #[test]
    fn test_is_compacted() {
        let grid = Grid::from_columns(3, &[&[1, 2], &[], &[3]]);
        assert!(grid.is_compacted());
        let gap = Grid::from_columns(3, &[&[1, 0, 2]]);
        assert!(!gap.is_compacted());
    }

    #[test]
    fn test_diff() {
        let before = Grid::from_columns(2, &[&[1, 2], &[3]]);
        let mut after = before.clone();
        after.set(Position::new(1, 1), ColorId(4));
        after.set(Position::new(0, 0), ColorId(1));
        let changed: Vec<_> = after.diff(&before).into_iter().collect();
        assert_eq!(changed, vec![Position::new(1, 1)]);
    }

    #[test]
    fn test_snapshot_cell_count_checked() {
        let grid = Grid::from_columns(2, &[&[1, 2], &[3], &[]]);
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(serde_json::from_str::<Grid>(&json).unwrap(), grid);

        let err = serde_json::from_str::<Grid>(r#"{"n_slice":6,"n_layer":3,"cells":[1,1]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("has 2 cells"), "{}", err);
    }

    #[test]
    fn test_display() {
        let grid = Grid::from_columns(2, &[&[1, 2], &[3], &[]]);
        assert_eq!(grid.to_string(), "2..\n13.\n");
    }
}
