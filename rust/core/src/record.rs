// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layout record: the portable, human-diffable JSON format that carries
//! placed instances from the synthesis pipeline to the reconstruction
//! pipeline.
//!
//! Consumers look groups up by name (case-insensitive) and ignore unknown
//! groups and fields. Only the [`WALLS_GROUP`] is read back as walls.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::instance::{InstanceKind, PlacedInstance};

/// Name of the group consumed by wall reconstruction.
pub const WALLS_GROUP: &str = "Walls";

pub const DEFAULT_NOTES: &str =
    "Positions are world-space; rotationY only is captured for 2D layout.";

/// One placed instance as stored in a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacedInstanceRecord {
    pub name: String,
    pub path: String,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    /// Yaw in degrees.
    pub ry: f64,
    pub sx: f64,
    pub sy: f64,
    pub sz: f64,
    /// Source template name, empty when unknown.
    pub prefab_hint: String,
    pub tag: String,
    pub layer: i32,
}

impl PlacedInstanceRecord {
    /// World position as a point.
    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.px, self.py, self.pz)
    }

    /// Scale as a vector.
    pub fn scale(&self) -> Vector3<f64> {
        Vector3::new(self.sx, self.sy, self.sz)
    }

    /// Rebuild an instance of the given kind from this record.
    pub fn to_instance(&self, kind: InstanceKind) -> PlacedInstance {
        PlacedInstance {
            name: self.name.clone(),
            path: self.path.clone(),
            kind,
            position: self.position(),
            yaw_degrees: self.ry,
            scale: self.scale(),
        }
    }
}

impl From<&PlacedInstance> for PlacedInstanceRecord {
    fn from(instance: &PlacedInstance) -> Self {
        Self {
            name: instance.name.clone(),
            path: instance.path.clone(),
            px: instance.position.x,
            py: instance.position.y,
            pz: instance.position.z,
            ry: instance.yaw_degrees,
            sx: instance.scale.x,
            sy: instance.scale.y,
            sz: instance.scale.z,
            prefab_hint: String::new(),
            tag: "Untagged".to_string(),
            layer: 0,
        }
    }
}

/// Named list of instances, e.g. `"Walls"` or `"Doors"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct InstanceGroup {
    pub group_name: String,
    pub items: Vec<PlacedInstanceRecord>,
}

impl InstanceGroup {
    /// Empty group.
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            items: Vec::new(),
        }
    }

    pub fn with_instances<'a>(
        mut self,
        instances: impl IntoIterator<Item = &'a PlacedInstance>,
    ) -> Self {
        self.items
            .extend(instances.into_iter().map(PlacedInstanceRecord::from));
        self
    }
}

/// Top-level layout record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutRecord {
    pub scene_name: String,
    /// ISO-8601 export time.
    pub exported_at: String,
    pub grid_size: f64,
    pub wall_thickness_default: f64,
    pub groups: Vec<InstanceGroup>,
    pub notes: String,
}

impl Default for LayoutRecord {
    fn default() -> Self {
        Self {
            scene_name: String::new(),
            exported_at: String::new(),
            grid_size: 0.5,
            wall_thickness_default: 0.2,
            groups: Vec::new(),
            notes: DEFAULT_NOTES.to_string(),
        }
    }
}

impl LayoutRecord {
    /// Start a record stamped with `exported_at`.
    pub fn new(scene_name: impl Into<String>, exported_at: DateTime<Utc>) -> Self {
        Self {
            scene_name: scene_name.into(),
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            ..Default::default()
        }
    }

    /// Parse a record from JSON text.
    ///
    /// A record without any group is rejected: there is nothing a consumer
    /// could act on, and it usually means the text is not a layout record.
    pub fn from_json(text: &str) -> Result<Self> {
        let record: LayoutRecord = serde_json::from_str(text)?;
        if record.groups.is_empty() {
            return Err(Error::InvalidRecord("record has no groups".to_string()));
        }
        tracing::debug!(
            scene = %record.scene_name,
            groups = record.groups.len(),
            walls = record.wall_records().count(),
            "Parsed layout record"
        );
        Ok(record)
    }

    /// Read the whole file, then parse it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Case-insensitive group lookup. The first match wins.
    pub fn group(&self, name: &str) -> Option<&InstanceGroup> {
        self.groups
            .iter()
            .find(|g| g.group_name.eq_ignore_ascii_case(name))
    }

    /// Items of every group named `name`, in record order.
    pub fn records_in<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a PlacedInstanceRecord> + 'a {
        self.groups
            .iter()
            .filter(move |g| g.group_name.eq_ignore_ascii_case(name))
            .flat_map(|g| g.items.iter())
    }

    /// Items of all walls groups chained together.
    pub fn wall_records(&self) -> impl Iterator<Item = &PlacedInstanceRecord> + '_ {
        self.records_in(WALLS_GROUP)
    }

    /// Append a group; names need not be unique.
    pub fn push_group(&mut self, group: InstanceGroup) {
        self.groups.push(group);
    }

    /// The record's own grid size when positive, otherwise `fallback`.
    pub fn effective_grid_size(&self, fallback: f64) -> f64 {
        if self.grid_size > 0.0 {
            self.grid_size
        } else {
            fallback
        }
    }

    /// Parsed export timestamp, if it is valid RFC 3339.
    pub fn exported_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.exported_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"{
        "sceneName": "Hospital",
        "exportedAt": "2025-03-14T09:26:53.5897932Z",
        "gridSize": 0.5,
        "wallThicknessDefault": 0.2,
        "groups": [
            {
                "groupName": "walls",
                "items": [
                    { "name": "Wall", "path": "Room 105/Wall", "px": 1.0, "py": 1.4, "pz": 2.0,
                      "ry": 0.0, "sx": 3.0, "sy": 2.8, "sz": 0.15,
                      "prefabHint": "", "tag": "Untagged", "layer": 0, "colour": "grey" }
                ]
            },
            { "groupName": "Lights", "items": [] }
        ],
        "notes": "",
        "author": "someone"
    }"#;

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let record = LayoutRecord::from_json(SAMPLE).unwrap();
        assert_eq!(record.scene_name, "Hospital");
        assert_eq!(record.groups.len(), 2);
        let walls: Vec<_> = record.wall_records().collect();
        assert_eq!(walls.len(), 1);
        assert_relative_eq!(walls[0].sx, 3.0);
    }

    #[test]
    fn test_wall_records_chain_every_walls_group() {
        let mut record = LayoutRecord::from_json(SAMPLE).unwrap();
        record.push_group(InstanceGroup {
            group_name: "WALLS".to_string(),
            items: vec![PlacedInstanceRecord {
                name: "Wall".to_string(),
                sx: 0.15,
                sz: 5.0,
                ..Default::default()
            }],
        });

        let walls: Vec<_> = record.wall_records().collect();
        assert_eq!(walls.len(), 2);
        assert_relative_eq!(walls[0].sx, 3.0);
        assert_relative_eq!(walls[1].sz, 5.0);
        assert_eq!(record.records_in("lights").count(), 0);
    }

    #[test]
    fn test_group_lookup_is_case_insensitive() {
        let record = LayoutRecord::from_json(SAMPLE).unwrap();
        assert!(record.group("WALLS").is_some());
        assert!(record.group("lights").is_some());
        assert!(record.group("Doors").is_none());
    }

    #[test]
    fn test_missing_groups_rejected() {
        let err = LayoutRecord::from_json(r#"{ "sceneName": "x" }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
    }

    #[test]
    fn test_unparsable_record_rejected() {
        let err = LayoutRecord::from_json("not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_effective_grid_size() {
        let mut record = LayoutRecord::default();
        record.grid_size = 0.25;
        assert_relative_eq!(record.effective_grid_size(0.5), 0.25);
        record.grid_size = 0.0;
        assert_relative_eq!(record.effective_grid_size(0.5), 0.5);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let record = LayoutRecord::new("Scene", at);
        assert_eq!(record.exported_at, "2025-01-02T03:04:05.000Z");
        assert_eq!(record.exported_at_utc(), Some(at));

        let parsed = LayoutRecord::from_json(SAMPLE).unwrap();
        assert!(parsed.exported_at_utc().is_some());
    }

    #[test]
    fn test_record_from_instance() {
        let wall = PlacedInstance::new(
            InstanceKind::Wall,
            "OuterBoundary/Wall",
            Point3::new(1.0, 1.4, -2.0),
            90.0,
            Vector3::new(0.15, 2.8, 4.0),
        );
        let rec = PlacedInstanceRecord::from(&wall);
        assert_eq!(rec.name, "Wall");
        assert_eq!(rec.path, "OuterBoundary/Wall");
        assert_relative_eq!(rec.pz, -2.0);
        assert_relative_eq!(rec.ry, 90.0);
        assert_eq!(rec.to_instance(InstanceKind::Wall), wall);
    }
}
