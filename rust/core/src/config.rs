// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimensions and tolerances for both pipelines.
//!
//! Every threshold is passed explicitly; nothing in the algorithms reads a
//! hidden constant. A JSON config file may set any subset of fields:
//!
//! ```json
//! { "build": { "cellSize": 2.0 }, "reconstruct": { "mergeTolerance": 0.1 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for wall synthesis from a floor plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    /// World size of one grid cell. Default: 2.3
    pub cell_size: f64,
    /// Default: 0.15
    pub wall_thickness: f64,
    /// Default: 2.8
    pub wall_height: f64,
    /// Width of the gap cut for each door. Default: 1.2
    pub door_width: f64,
    /// Default: 2.3
    pub door_height: f64,
    /// Default: 0.1
    pub floor_thickness: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            cell_size: 2.3,
            wall_thickness: 0.15,
            wall_height: 2.8,
            door_width: 1.2,
            door_height: 2.3,
            floor_thickness: 0.1,
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive("cellSize", self.cell_size)?;
        require_positive("wallThickness", self.wall_thickness)?;
        require_positive("wallHeight", self.wall_height)?;
        require_non_negative("doorWidth", self.door_width)?;
        require_non_negative("doorHeight", self.door_height)?;
        require_non_negative("floorThickness", self.floor_thickness)
    }
}

/// How reconstruction decides whether a placed wall runs along X or Z.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrientationMethod {
    /// Long local axis from scale, rotated into world space by yaw.
    #[default]
    Auto,
    /// Yaw alone: 0/180 is horizontal, 90/270 vertical.
    Rotation,
    /// Scale alone: the longer of X and Z extents; yaw ignored.
    Scale,
}

impl std::str::FromStr for OrientationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "rotation" | "yaw" => Ok(Self::Rotation),
            "scale" => Ok(Self::Scale),
            other => Err(Error::InvalidConfig(format!(
                "unknown orientation method '{}'",
                other
            ))),
        }
    }
}

/// Configuration for wall reconstruction from a layout record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconstructConfig {
    /// Snap and bucketing granularity, overridden by a positive record
    /// grid size. Default: 0.5
    pub grid_size: f64,
    /// Default: 0.15
    pub wall_thickness: f64,
    /// Default: 2.8
    pub wall_height: f64,
    /// Largest gap between collinear intervals that still merges. Default: 0.05
    pub merge_tolerance: f64,
    /// Shorter segments are dropped after snapping and after merging. Default: 0.3
    pub min_segment_length: f64,
    /// Default: true
    pub snap_to_grid: bool,
    /// Records with both horizontal extents below this are markers. Default: 0.2
    pub min_marker_size: f64,
    /// Yaw deviation from a multiple of 90 degrees must stay below this.
    /// Default: 5.0
    pub angle_tolerance_deg: f64,
    pub orientation: OrientationMethod,
    /// Only accept records whose name contains "wall". Default: false
    pub require_wall_name: bool,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            grid_size: 0.5,
            wall_thickness: 0.15,
            wall_height: 2.8,
            merge_tolerance: 0.05,
            min_segment_length: 0.3,
            snap_to_grid: true,
            min_marker_size: 0.2,
            angle_tolerance_deg: 5.0,
            orientation: OrientationMethod::Auto,
            require_wall_name: false,
        }
    }
}

impl ReconstructConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive("gridSize", self.grid_size)?;
        require_positive("wallThickness", self.wall_thickness)?;
        require_positive("wallHeight", self.wall_height)?;
        require_non_negative("mergeTolerance", self.merge_tolerance)?;
        require_positive("minSegmentLength", self.min_segment_length)?;
        require_non_negative("minMarkerSize", self.min_marker_size)?;
        if !(0.0..45.0).contains(&self.angle_tolerance_deg) {
            return Err(Error::InvalidConfig(format!(
                "angleToleranceDeg must be in [0, 45), got {}",
                self.angle_tolerance_deg
            )));
        }
        Ok(())
    }

    /// Copy of this config using `grid_size` for snapping and bucketing.
    pub fn with_grid_size(&self, grid_size: f64) -> Self {
        Self {
            grid_size,
            ..self.clone()
        }
    }
}

/// Combined configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FloorgridConfig {
    pub build: BuildConfig,
    pub reconstruct: ReconstructConfig,
}

impl FloorgridConfig {
    /// Parse and validate; missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: FloorgridConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.build.validate()?;
        self.reconstruct.validate()
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be > 0, got {}",
            name, value
        )))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be >= 0, got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(BuildConfig::default().validate().is_ok());
        assert!(ReconstructConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_config_file() {
        let config = FloorgridConfig::from_json(
            r#"{ "build": { "cellSize": 2.0 }, "reconstruct": { "mergeTolerance": 0.1, "orientation": "scale" } }"#,
        )
        .unwrap();

        assert_eq!(config.build.cell_size, 2.0);
        assert_eq!(config.build.door_width, 1.2);
        assert_eq!(config.reconstruct.merge_tolerance, 0.1);
        assert_eq!(config.reconstruct.orientation, OrientationMethod::Scale);
        assert!(config.reconstruct.snap_to_grid);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = ReconstructConfig {
            grid_size: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = ReconstructConfig {
            merge_tolerance: -0.01,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BuildConfig {
            cell_size: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_orientation_from_str() {
        assert_eq!("AUTO".parse::<OrientationMethod>().unwrap(), OrientationMethod::Auto);
        assert_eq!("yaw".parse::<OrientationMethod>().unwrap(), OrientationMethod::Rotation);
        assert!("diagonal".parse::<OrientationMethod>().is_err());
    }
}
