// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placed instances and reconstructed wall segments.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// What a placed instance represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InstanceKind {
    Wall,
    Door,
    Floor,
}

impl InstanceKind {
    /// Display name, also the default instance name.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceKind::Wall => "Wall",
            InstanceKind::Door => "Door",
            InstanceKind::Floor => "Floor",
        }
    }
}

/// A materialized box: world position, yaw and local scale.
///
/// `scale.x` is the extent along local X, `scale.y` the height and
/// `scale.z` the extent along local Z. The position is the box centre.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedInstance {
    pub name: String,
    /// Hierarchy path, e.g. `"Room 105/Wall"`.
    pub path: String,
    pub kind: InstanceKind,
    pub position: Point3<f64>,
    /// Rotation about the vertical axis, degrees.
    pub yaw_degrees: f64,
    pub scale: Vector3<f64>,
}

impl PlacedInstance {
    pub fn new(
        kind: InstanceKind,
        path: impl Into<String>,
        position: Point3<f64>,
        yaw_degrees: f64,
        scale: Vector3<f64>,
    ) -> Self {
        Self {
            name: kind.as_str().to_string(),
            path: path.into(),
            kind,
            position,
            yaw_degrees,
            scale,
        }
    }

    /// Length of the longer horizontal extent.
    pub fn footprint_length(&self) -> f64 {
        self.scale.x.abs().max(self.scale.z.abs())
    }
}

/// Axis a wall run follows in world space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    /// Runs along X; its line coordinate is a Z value.
    Horizontal,
    /// Runs along Z; its line coordinate is an X value.
    Vertical,
}

/// A 1D wall interval on a fixed line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WallSegment {
    pub orientation: Orientation,
    /// Z for horizontal runs, X for vertical runs.
    pub line: f64,
    /// X for horizontal runs, Z for vertical runs.
    pub start: f64,
    pub end: f64,
}

impl WallSegment {
    /// Build a segment, ordering the endpoints.
    pub fn new(orientation: Orientation, line: f64, a: f64, b: f64) -> Self {
        Self {
            orientation,
            line,
            start: a.min(b),
            end: a.max(b),
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) * 0.5
    }

    /// Materialize as a wall box centred on the segment, `height` tall.
    pub fn to_instance(&self, thickness: f64, height: f64) -> PlacedInstance {
        let (position, scale) = match self.orientation {
            Orientation::Horizontal => (
                Point3::new(self.midpoint(), height * 0.5, self.line),
                Vector3::new(self.length(), height, thickness),
            ),
            Orientation::Vertical => (
                Point3::new(self.line, height * 0.5, self.midpoint()),
                Vector3::new(thickness, height, self.length()),
            ),
        };
        PlacedInstance::new(InstanceKind::Wall, "Wall", position, 0.0, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_orders_endpoints() {
        let seg = WallSegment::new(Orientation::Horizontal, 1.0, 4.0, -2.0);
        assert_relative_eq!(seg.start, -2.0);
        assert_relative_eq!(seg.end, 4.0);
        assert_relative_eq!(seg.length(), 6.0);
        assert_relative_eq!(seg.midpoint(), 1.0);
    }

    #[test]
    fn test_vertical_segment_to_instance() {
        let seg = WallSegment::new(Orientation::Vertical, 3.0, 0.0, 5.0);
        let wall = seg.to_instance(0.15, 2.8);

        assert_eq!(wall.kind, InstanceKind::Wall);
        assert_relative_eq!(wall.position.x, 3.0);
        assert_relative_eq!(wall.position.y, 1.4);
        assert_relative_eq!(wall.position.z, 2.5);
        assert_relative_eq!(wall.scale.x, 0.15);
        assert_relative_eq!(wall.scale.z, 5.0);
        assert_relative_eq!(wall.footprint_length(), 5.0);
    }
}
