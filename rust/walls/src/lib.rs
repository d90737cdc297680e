// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Floorgrid Walls
//!
//! Wall geometry for grid floor plans, in both directions.
//!
//! ## Forward: plan to walls
//!
//! ```text
//! FloorPlan ─▶ LayoutBuilder ─▶ wall runs per edge ─▶ GeneratedLayout ─▶ export ─▶ LayoutRecord
//! ```
//!
//! ## Reverse: record to merged walls
//!
//! ```text
//! LayoutRecord ─▶ classify ─▶ snap ─▶ bucket ─▶ merge ─▶ Reconstruction
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use floorgrid_core::{BuildConfig, FloorPlan, ReconstructConfig};
//! use floorgrid_walls::{export_layout, reconstruct_record, ExportOptions, LayoutBuilder};
//!
//! let plan = FloorPlan::hospital()?;
//! let layout = LayoutBuilder::new(&plan, &BuildConfig::default()).build();
//! let record = export_layout(&layout, &ExportOptions::default());
//!
//! let merged = reconstruct_record(&record, &ReconstructConfig::default())?;
//! println!("{} walls -> {} segments", layout.walls().count(), merged.segments.len());
//! # Ok::<(), floorgrid_core::Error>(())
//! ```

pub mod export;
pub mod mesh;
pub mod reconstruct;
pub mod room_builder;
pub mod scene;
pub mod wall_run;

pub use export::{export_layout, export_walls, ExportOptions, DOORS_GROUP, FLOOR_GROUP};
pub use mesh::Mesh;
pub use reconstruct::{
    classify, merge_segments, rebuild_individual, reconstruct, reconstruct_record, snap,
    Classification, Reconstruction, ReconstructStats, ReconstructionStatus,
};
pub use room_builder::{
    side_pose, BoundaryDoors, BuildStats, GeneratedLayout, LayoutBuilder, RoomWalls,
    OUTER_BOUNDARY,
};
pub use scene::{materialize, MeshScene, Scene};
pub use wall_run::{build_wall_run, edge_length, RunSegment, WallRunParams};
