// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capture generated or reconstructed instances into a [`LayoutRecord`].

use chrono::{DateTime, Utc};
use floorgrid_core::{InstanceGroup, LayoutRecord, PlacedInstance, WALLS_GROUP};

use crate::room_builder::GeneratedLayout;

/// Group holding door instances.
pub const DOORS_GROUP: &str = "Doors";
/// Group holding the floor slab.
pub const FLOOR_GROUP: &str = "Floor";

/// Record header values.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub scene_name: String,
    pub grid_size: f64,
    pub wall_thickness: f64,
    /// Export time; `None` stamps the current UTC time.
    pub exported_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scene_name: "Floorgrid".to_string(),
            grid_size: 0.5,
            wall_thickness: 0.2,
            exported_at: None,
            notes: None,
        }
    }
}

impl ExportOptions {
    fn header(&self) -> LayoutRecord {
        let mut record = LayoutRecord::new(
            self.scene_name.clone(),
            self.exported_at.unwrap_or_else(Utc::now),
        );
        record.grid_size = self.grid_size;
        record.wall_thickness_default = self.wall_thickness;
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
        record
    }
}

/// Walls, doors and floor of a generated layout as one record.
///
/// Room walls and boundary walls share the `Walls` group; their `path`
/// keeps the room or `OuterBoundary` they belong to.
pub fn export_layout(layout: &GeneratedLayout, options: &ExportOptions) -> LayoutRecord {
    let mut record = options.header();
    record.push_group(InstanceGroup::new(WALLS_GROUP).with_instances(layout.walls()));
    record.push_group(InstanceGroup::new(DOORS_GROUP).with_instances(layout.doors()));
    record.push_group(
        InstanceGroup::new(FLOOR_GROUP).with_instances(std::iter::once(&layout.floor)),
    );
    record
}

/// A record holding only a walls group.
pub fn export_walls(walls: &[PlacedInstance], options: &ExportOptions) -> LayoutRecord {
    let mut record = options.header();
    record.push_group(InstanceGroup::new(WALLS_GROUP).with_instances(walls));
    record
}
