// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Floorgrid Core
//!
//! Data model shared by the wall synthesis and wall reconstruction pipelines:
//!
//! - [`grid`]: integer grid cells to world coordinates
//! - [`plan`]: rooms, rectangles and doors authored on the grid
//! - [`instance`]: placed wall/door/floor instances (position, yaw, scale)
//! - [`record`]: the portable layout record exchanged between the two pipelines
//! - [`config`]: explicit tolerances and dimensions for both pipelines
//!
//! Coordinates follow a Y-up convention: the floor plan lies in the X-Z plane
//! and only yaw (rotation about Y) is meaningful.

pub mod config;
pub mod error;
pub mod grid;
pub mod instance;
pub mod plan;
pub mod record;

pub use config::{BuildConfig, FloorgridConfig, OrientationMethod, ReconstructConfig};
pub use error::{Error, Result};
pub use grid::{inverse_lerp, lerp, GridMapper, WorldRect};
pub use instance::{InstanceKind, Orientation, PlacedInstance, WallSegment};
pub use plan::{DoorSpec, FloorPlan, RectDef, Room, Side};
pub use record::{InstanceGroup, LayoutRecord, PlacedInstanceRecord, WALLS_GROUP};
