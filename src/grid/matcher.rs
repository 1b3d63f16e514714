//! Match detection, removal, gravity and cascades
//!
//! A search starts from a freshly placed (or freshly fallen) block and walks
//! three directions: right and left around the ring, and down the column.
//! Nothing can sit above a new block, so the search never starts upward.
//!
//! Every ring cell found by a horizontal walk spawns a vertical walk (up and
//! down), and every column cell found by the downward walk spawns a
//! horizontal walk, so matches can be L or T shaped. The walks do not track
//! visited cells: a cell reachable by two walks is counted twice. The count
//! decides whether the run is cleared; the removal itself works on distinct
//! cells.
//!
//! Rings of fewer than three slices are rejected by level validation: there
//! the left and right walks reach the same neighbor, so any adjacent pair
//! counts as three.

use std::collections::{BTreeSet, VecDeque};

use super::state::{Grid, Position};
use crate::consts::MIN_MATCH;
use crate::error::GridError;
use crate::palette::ColorId;

/// Outcome of one search from an origin cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub origin: Position,
    pub color: ColorId,
    /// Cells in discovery order, origin first. May repeat a cell.
    pub hits: Vec<Position>,
}

impl Match {
    fn new(origin: Position, color: ColorId) -> Self {
        Self {
            origin,
            color,
            hits: vec![origin],
        }
    }

    /// Match counter (origin included, repeats included)
    #[inline]
    pub fn size(&self) -> usize {
        self.hits.len()
    }

    /// Whether this run gets cleared
    pub fn is_clear(&self) -> bool {
        !self.color.is_empty() && self.size() >= MIN_MATCH
    }

    /// Distinct matched cells
    pub fn cells(&self) -> BTreeSet<Position> {
        self.hits.iter().copied().collect()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.hits.contains(&pos)
    }
}

/// Cells a renderer must refresh after one `resolve`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Positions whose color differs from the state on entry
    pub positions: BTreeSet<Position>,
    /// Distinct cells cleared over all matches
    pub cleared: usize,
    /// Matches cleared after the first one
    pub cascades: u32,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions.iter().copied()
    }
}

/// Matching, removal and cascade resolution on a `Grid`
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine;

impl MatchEngine {
    pub fn new() -> Self {
        Self
    }

    /// Resolve every match triggered by the block at `origin`
    ///
    /// The caller has already written the new color at `origin`. Clears the
    /// first match (if any), lets the columns fall, then re-checks every
    /// block that moved until no new match appears.
    pub fn resolve(&self, grid: &mut Grid, origin: Position) -> Result<ChangeSet, GridError> {
        grid.check(origin)?;
        let before = grid.clone();

        let first = self.find(grid, origin);
        log::debug!(
            "Search from {} (color {}): size {}",
            origin,
            first.color,
            first.size()
        );
        if !first.is_clear() {
            return Ok(ChangeSet {
                positions: grid.diff(&before),
                ..Default::default()
            });
        }

        let mut cleared = first.cells().len();
        let mut cascades = 0u32;
        let mut pile: VecDeque<BTreeSet<Position>> = VecDeque::new();
        let moved = self.clear(grid, &first);
        if !moved.is_empty() {
            pile.push_back(moved);
        }

        while let Some(moved) = pile.pop_front() {
            let mut blacklist: BTreeSet<Position> = BTreeSet::new();
            for pos in moved {
                if blacklist.contains(&pos) || grid.is_empty_at(pos) {
                    continue;
                }
                let found = self.find(grid, pos);
                if !found.is_clear() {
                    continue;
                }
                cascades += 1;
                cleared += found.cells().len();
                log::debug!(
                    "Cascade {} from {} (color {}): size {}",
                    cascades,
                    pos,
                    found.color,
                    found.size()
                );
                // Blacklist the whole match, not just `pos`. Refilled cells
                // are in the next moved set and get searched there instead.
                blacklist.extend(found.cells());
                let next = self.clear(grid, &found);
                if !next.is_empty() {
                    pile.push_back(next);
                }
            }
        }

        debug_assert!(grid.is_compacted() || !before.is_compacted());
        let positions = grid.diff(&before);
        log::debug!(
            "Resolved {}: {} cleared, {} cascades, {} cells changed",
            origin,
            cleared,
            cascades,
            positions.len()
        );
        Ok(ChangeSet {
            positions,
            cleared,
            cascades,
        })
    }

    /// Directional search from `origin` using its current color
    pub fn find(&self, grid: &Grid, origin: Position) -> Match {
        let color = grid.color(origin);
        let mut found = Match::new(origin, color);
        if color.is_empty() {
            return found;
        }
        self.walk_ring(grid, origin, color, 1, &mut found.hits);
        self.walk_ring(grid, origin, color, -1, &mut found.hits);
        self.walk_down(grid, origin, color, &mut found.hits);
        found
    }

    /// Step around the ring from `origin` while the color holds, exploring
    /// each hit's column both ways
    fn walk_ring(
        &self,
        grid: &Grid,
        origin: Position,
        color: ColorId,
        step: isize,
        hits: &mut Vec<Position>,
    ) {
        let mut pos = origin;
        for _ in 1..grid.n_slice() {
            pos = Position::new(grid.wrap_slice(pos.slice, step), origin.layer);
            if grid.color(pos) != color {
                break;
            }
            log::trace!("ring hit {}", pos);
            hits.push(pos);

            for layer in pos.layer + 1..grid.n_layer() {
                let up = Position::new(pos.slice, layer);
                if grid.color(up) != color {
                    break;
                }
                hits.push(up);
            }
            for layer in (0..pos.layer).rev() {
                let down = Position::new(pos.slice, layer);
                if grid.color(down) != color {
                    break;
                }
                hits.push(down);
            }
        }
    }

    /// Step down the origin's column while the color holds, exploring each
    /// hit's ring both ways
    fn walk_down(&self, grid: &Grid, origin: Position, color: ColorId, hits: &mut Vec<Position>) {
        for layer in (0..origin.layer).rev() {
            let pos = Position::new(origin.slice, layer);
            if grid.color(pos) != color {
                break;
            }
            log::trace!("column hit {}", pos);
            hits.push(pos);

            for step in [-1, 1] {
                let mut side = pos;
                for _ in 1..grid.n_slice() {
                    side = Position::new(grid.wrap_slice(side.slice, step), layer);
                    if grid.color(side) != color {
                        break;
                    }
                    hits.push(side);
                }
            }
        }
    }

    /// Empty the matched cells and let each column fall inward
    ///
    /// Cells go highest-first within a column (slice ascending, layer
    /// descending). Returns the positions that received a falling block and
    /// still hold one.
    pub fn clear(&self, grid: &mut Grid, found: &Match) -> BTreeSet<Position> {
        let mut cells: Vec<Position> = found.cells().into_iter().collect();
        cells.sort_by(|a, b| a.slice.cmp(&b.slice).then(b.layer.cmp(&a.layer)));

        let top = grid.n_layer() - 1;
        let mut moved = BTreeSet::new();
        for pos in cells {
            grid.set(pos, ColorId::EMPTY);
            match grid.above(pos) {
                Some(up) if !grid.is_empty_at(up) => {}
                _ => continue,
            }
            for layer in pos.layer..top {
                let to = Position::new(pos.slice, layer);
                let from = Position::new(pos.slice, layer + 1);
                let color = grid.color(from);
                if !color.is_empty() {
                    moved.insert(to);
                }
                grid.set(to, color);
                grid.set(from, ColorId::EMPTY);
            }
        }
        moved.retain(|&pos| !grid.is_empty_at(pos));
        moved
    }
}
