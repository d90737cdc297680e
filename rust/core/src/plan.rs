// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan definitions: rooms made of grid rectangles, with doors on
//! rectangle edges.
//!
//! Plans are data, not code. They load from JSON:
//!
//! ```json
//! {
//!   "gridWidth": 15,
//!   "gridHeight": 15,
//!   "rooms": [
//!     {
//!       "name": "Office (103)",
//!       "rects": [{ "xMin": 3, "xMax": 4, "yMin": 5, "yMax": 6 }],
//!       "doors": [{ "side": "West", "rectIndex": 0, "t": 0.5 }]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const HOSPITAL_PLAN: &str = include_str!("../data/hospital.json");

/// Edge of a rectangle. North is +Z, East is +X.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    South,
    East,
    West,
}

impl Side {
    /// Sides in wall build order.
    pub const ALL: [Side; 4] = [Side::South, Side::North, Side::West, Side::East];

    /// North and South edges run along X.
    #[inline]
    pub fn runs_along_x(self) -> bool {
        matches!(self, Side::North | Side::South)
    }
}

/// Inclusive grid-cell bounds of one rectangle of a room footprint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RectDef {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl RectDef {
    /// Rectangle over inclusive 1-based cell ranges.
    pub fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// True when both ranges are non-empty.
    pub fn is_valid(&self) -> bool {
        self.x_min <= self.x_max && self.y_min <= self.y_max
    }
}

/// A door on one edge of one of the owning room's rectangles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoorSpec {
    pub side: Side,
    pub rect_index: usize,
    /// Normalized position along the edge (0 = min corner, 1 = max corner).
    pub t: f64,
}

impl DoorSpec {
    /// Door on `side` of rectangle `rect_index`, `t` along the edge.
    pub fn new(side: Side, rect_index: usize, t: f64) -> Self {
        Self {
            side,
            rect_index,
            t,
        }
    }

    /// `t` clamped to `[0, 1]`; NaN maps to the edge midpoint.
    #[inline]
    pub fn clamped_t(&self) -> f64 {
        if self.t.is_nan() {
            0.5
        } else {
            self.t.clamp(0.0, 1.0)
        }
    }
}

/// A named room with a (possibly composite) rectangular footprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub name: String,
    #[serde(default)]
    pub rects: Vec<RectDef>,
    #[serde(default)]
    pub doors: Vec<DoorSpec>,
}

impl Room {
    /// Room with no rectangles or doors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rects: Vec::new(),
            doors: Vec::new(),
        }
    }

    /// Add a rectangle to the footprint.
    pub fn with_rect(mut self, rect: RectDef) -> Self {
        self.rects.push(rect);
        self
    }

    /// Add a door.
    pub fn with_door(mut self, door: DoorSpec) -> Self {
        self.doors.push(door);
        self
    }

    /// Doors for one rectangle edge, as clamped offsets in declaration order.
    pub fn door_offsets(&self, rect_index: usize, side: Side) -> Vec<f64> {
        self.doors
            .iter()
            .filter(|d| d.rect_index == rect_index && d.side == side)
            .map(DoorSpec::clamped_t)
            .collect()
    }
}

/// A complete grid floor plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    /// Number of cell columns; cells run `1..=grid_width`.
    pub grid_width: i32,
    /// Number of cell rows; cells run `1..=grid_height`.
    pub grid_height: i32,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl FloorPlan {
    /// Empty plan on a `grid_width` by `grid_height` grid.
    pub fn new(grid_width: i32, grid_height: i32) -> Self {
        Self {
            grid_width,
            grid_height,
            rooms: Vec::new(),
        }
    }

    /// Parse and validate a plan from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let plan: FloorPlan = serde_json::from_str(text)?;
        plan.validate()?;
        tracing::debug!(
            width = plan.grid_width,
            height = plan.grid_height,
            rooms = plan.rooms.len(),
            doors = plan.door_count(),
            "Loaded floor plan"
        );
        Ok(plan)
    }

    /// Read a plan file in full, then parse it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The bundled 15×15 hospital plan.
    pub fn hospital() -> Result<Self> {
        Self::from_json(HOSPITAL_PLAN)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check grid dimensions and rectangle bounds.
    ///
    /// Door `rect_index` values are deliberately not checked here; the
    /// builder skips and counts dangling doors instead.
    pub fn validate(&self) -> Result<()> {
        if self.grid_width <= 0 || self.grid_height <= 0 {
            return Err(Error::InvalidPlan(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        for room in &self.rooms {
            for (i, rect) in room.rects.iter().enumerate() {
                if !rect.is_valid() {
                    return Err(Error::InvalidPlan(format!(
                        "room '{}' rect {} has inverted bounds {:?}",
                        room.name, i, rect
                    )));
                }
            }
        }
        Ok(())
    }

    /// Doors across all rooms, dangling ones included.
    pub fn door_count(&self) -> usize {
        self.rooms.iter().map(|r| r.doors.len()).sum()
    }
}
