//! Polar layout of the ring grid
//!
//! Maps grid coordinates to annulus cells for the renderer, and points or
//! angles back to grid coordinates for the collision system.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::{Grid, Position};
use crate::{cartesian_to_polar, normalize_angle, polar_to_cartesian};

/// Screen-space band covered by one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellArc {
    pub position: Position,
    /// Edge facing the core
    pub inner_radius: f32,
    /// Edge facing the rim
    pub outer_radius: f32,
    /// Counter-clockwise start angle, normalized to [-π, π)
    pub theta_start: f32,
    /// Angle covered, always one slice span
    pub span: f32,
}

impl CellArc {
    #[inline]
    pub fn mid_radius(&self) -> f32 {
        (self.inner_radius + self.outer_radius) / 2.0
    }

    /// True when `theta` lies within the cell's wedge (any winding)
    pub fn contains_angle(&self, theta: f32) -> bool {
        (theta - self.theta_start).rem_euclid(TAU) <= self.span
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        let (r, theta) = cartesian_to_polar(point);
        r >= self.inner_radius && r <= self.outer_radius && self.contains_angle(theta)
    }

    /// Where a block sprite for this cell is anchored
    pub fn center(&self) -> Vec2 {
        polar_to_cartesian(self.mid_radius(), self.theta_start + self.span / 2.0)
    }

    /// Closed outline for drawing or building a collider
    ///
    /// `steps` points along the outer edge counter-clockwise, then `steps`
    /// along the inner edge back.
    pub fn outline(&self, steps: usize) -> Vec<Vec2> {
        let steps = steps.max(2);
        let theta_at = |i: usize| self.theta_start + self.span * i as f32 / (steps - 1) as f32;
        let outer = (0..steps).map(|i| polar_to_cartesian(self.outer_radius, theta_at(i)));
        let inner = (0..steps)
            .rev()
            .map(|i| polar_to_cartesian(self.inner_radius, theta_at(i)));
        outer.chain(inner).collect()
    }
}

/// Dimensions of the drawn ring
///
/// Layers split `core_radius..outer_radius` evenly, layer 0 against the core.
/// Slice 0 starts at `start_angle` and slices advance counter-clockwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingLayout {
    core_radius: f32,
    outer_radius: f32,
    n_slice: usize,
    n_layer: usize,
    start_angle: f32,
}

impl RingLayout {
    pub fn new(
        core_radius: f32,
        outer_radius: f32,
        n_slice: usize,
        n_layer: usize,
    ) -> Result<Self, ConfigError> {
        if n_slice == 0 || n_layer == 0 {
            return Err(ConfigError::EmptyDimensions { n_slice, n_layer });
        }
        // Negated form also rejects NaN
        if !(core_radius >= 0.0 && core_radius < outer_radius) {
            return Err(ConfigError::InvalidRadii {
                core: core_radius,
                outer: outer_radius,
            });
        }
        Ok(Self {
            core_radius,
            outer_radius,
            n_slice,
            n_layer,
            start_angle: FRAC_PI_2,
        })
    }

    /// Layout matching the dimensions of `grid`
    pub fn for_grid(grid: &Grid, core_radius: f32, outer_radius: f32) -> Result<Self, ConfigError> {
        Self::new(core_radius, outer_radius, grid.n_slice(), grid.n_layer())
    }

    /// Rotate the ring so slice 0 starts at `angle`
    pub fn with_start_angle(mut self, angle: f32) -> Self {
        self.start_angle = normalize_angle(angle);
        self
    }

    pub fn core_radius(&self) -> f32 {
        self.core_radius
    }

    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    /// Angle covered by one slice
    #[inline]
    pub fn slice_span(&self) -> f32 {
        TAU / self.n_slice as f32
    }

    /// Radial size of one layer
    #[inline]
    pub fn layer_thickness(&self) -> f32 {
        (self.outer_radius - self.core_radius) / self.n_layer as f32
    }

    pub fn cell_arc(&self, pos: Position) -> CellArc {
        let thickness = self.layer_thickness();
        let inner_radius = self.core_radius + pos.layer as f32 * thickness;
        CellArc {
            position: pos,
            inner_radius,
            outer_radius: inner_radius + thickness,
            theta_start: normalize_angle(self.start_angle + pos.slice as f32 * self.slice_span()),
            span: self.slice_span(),
        }
    }

    /// Arcs of every non-empty cell, for a full redraw
    pub fn filled_arcs<'a>(&'a self, grid: &'a Grid) -> impl Iterator<Item = CellArc> + 'a {
        grid.positions()
            .filter(|&pos| !grid.is_empty_at(pos))
            .map(|pos| self.cell_arc(pos))
    }

    /// Slice under an angle (any angle, wraps)
    pub fn slice_at_angle(&self, theta: f32) -> usize {
        let offset = (theta - self.start_angle).rem_euclid(TAU);
        ((offset / self.slice_span()) as usize).min(self.n_slice - 1)
    }

    /// Layer under a radius, `None` inside the core or beyond the rim
    pub fn layer_at_radius(&self, r: f32) -> Option<usize> {
        if r < self.core_radius || r >= self.outer_radius {
            return None;
        }
        let layer = ((r - self.core_radius) / self.layer_thickness()) as usize;
        Some(layer.min(self.n_layer - 1))
    }

    /// Grid cell under a point, relative to the ring center
    pub fn locate(&self, point: Vec2) -> Option<Position> {
        let (r, theta) = cartesian_to_polar(point);
        let layer = self.layer_at_radius(r)?;
        Some(Position::new(self.slice_at_angle(theta), layer))
    }
}
