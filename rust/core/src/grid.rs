// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid cell to world coordinate mapping.
//!
//! Cells are 1-based and inclusive: a rectangle covering cells
//! `[x_min..=x_max] × [y_min..=y_max]` occupies the world box from
//! `cell_to_world(x_min, y_min)` to `cell_to_world(x_max + 1, y_max + 1)`.

use nalgebra::Point3;

use crate::plan::RectDef;

/// Maps integer grid cells onto the world X-Z plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapper {
    /// World size of one cell edge.
    pub cell_size: f64,
}

impl GridMapper {
    /// Mapper with square cells of `cell_size` world units.
    pub fn new(cell_size: f64) -> Self {
        Self { cell_size }
    }

    /// Convert a grid cell to its world corner: `((x - 0.5)·cs, 0, (y - 0.5)·cs)`.
    #[inline]
    pub fn cell_to_world(&self, x: i32, y: i32) -> Point3<f64> {
        Point3::new(
            (x as f64 - 0.5) * self.cell_size,
            0.0,
            (y as f64 - 0.5) * self.cell_size,
        )
    }

    /// World box occupied by an inclusive rectangle of cells.
    pub fn rect_bounds(&self, rect: &RectDef) -> WorldRect {
        WorldRect::from_corners(
            self.cell_to_world(rect.x_min, rect.y_min),
            self.cell_to_world(rect.x_max + 1, rect.y_max + 1),
        )
    }

    /// World box of the whole map, cells `1..=width` × `1..=height`.
    pub fn boundary(&self, grid_width: i32, grid_height: i32) -> WorldRect {
        WorldRect::from_corners(
            self.cell_to_world(1, 1),
            self.cell_to_world(grid_width + 1, grid_height + 1),
        )
    }
}

/// Axis-aligned box in the world X-Z plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl WorldRect {
    /// Rectangle from already ordered bounds.
    pub fn new(min_x: f64, min_z: f64, max_x: f64, max_z: f64) -> Self {
        Self {
            min_x,
            min_z,
            max_x,
            max_z,
        }
    }

    /// Build from two world corners, ignoring Y.
    pub fn from_corners(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self::new(min.x, min.z, max.x, max.z)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    #[inline]
    pub fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) * 0.5
    }

    #[inline]
    pub fn center_z(&self) -> f64 {
        (self.min_z + self.max_z) * 0.5
    }

    /// Inclusive containment test on the X-Z plane.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.z >= self.min_z
            && point.z <= self.max_z
    }
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Inverse of [`lerp`]: where `value` falls between `a` and `b`, clamped to `[0, 1]`.
///
/// A degenerate span (`a == b`) yields 0.
#[inline]
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cell_to_world() {
        let grid = GridMapper::new(2.0);
        let p = grid.cell_to_world(1, 1);
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(p.z, 1.0);

        let p = grid.cell_to_world(3, 0);
        assert_relative_eq!(p.x, 5.0);
        assert_relative_eq!(p.z, -1.0);
    }

    #[test]
    fn test_rect_bounds_adds_one_to_max() {
        let grid = GridMapper::new(2.3);
        let rect = RectDef::new(1, 3, 1, 4);
        let bounds = grid.rect_bounds(&rect);

        assert_relative_eq!(bounds.min_x, 0.5 * 2.3);
        assert_relative_eq!(bounds.max_x, 3.5 * 2.3);
        assert_relative_eq!(bounds.width(), 3.0 * 2.3, epsilon = 1e-12);
        assert_relative_eq!(bounds.depth(), 4.0 * 2.3, epsilon = 1e-12);
    }

    #[test]
    fn test_cells_fall_inside_their_rect() {
        let grid = GridMapper::new(2.3);
        for (x_min, x_max, y_min, y_max) in [(1, 1, 1, 1), (2, 5, 3, 4), (7, 9, 1, 15)] {
            let rect = RectDef::new(x_min, x_max, y_min, y_max);
            let bounds = grid.rect_bounds(&rect);
            for x in x_min..=x_max {
                for y in y_min..=y_max {
                    assert!(
                        bounds.contains(&grid.cell_to_world(x, y)),
                        "cell ({}, {}) outside {:?}",
                        x,
                        y,
                        bounds
                    );
                }
            }
        }
    }

    #[test]
    fn test_boundary() {
        let grid = GridMapper::new(1.0);
        let b = grid.boundary(15, 10);
        assert_relative_eq!(b.min_x, 0.5);
        assert_relative_eq!(b.max_x, 15.5);
        assert_relative_eq!(b.min_z, 0.5);
        assert_relative_eq!(b.max_z, 10.5);
    }

    #[test]
    fn test_lerp_and_inverse() {
        assert_relative_eq!(lerp(2.0, 6.0, 0.25), 3.0);
        assert_relative_eq!(lerp(2.0, 6.0, 1.5), 6.0);
        assert_relative_eq!(inverse_lerp(2.0, 6.0, 3.0), 0.25);
        assert_relative_eq!(inverse_lerp(2.0, 6.0, -1.0), 0.0);
        assert_relative_eq!(inverse_lerp(4.0, 4.0, 4.0), 0.0);
    }
}
