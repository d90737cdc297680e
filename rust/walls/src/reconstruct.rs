// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall reconstruction from placed wall transforms.
//!
//! Four stages turn an unordered list of wall records into a minimal set of
//! collinear runs:
//!
//! 1. **Classify**: drop markers, decide horizontal/vertical, and turn each
//!    record into a 1D interval on a fixed line.
//! 2. **Snap**: optionally round line and endpoints to the grid, then drop
//!    intervals shorter than the minimum segment length.
//! 3. **Bucket**: group by orientation and line rounded to the grid.
//! 4. **Merge**: sweep each bucket in start order, absorbing intervals that
//!    overlap or come within the merge tolerance.
//!
//! After merging, two segments in the same bucket never overlap and are
//! separated by more than the merge tolerance.

use floorgrid_core::{
    InstanceKind, LayoutRecord, Orientation, OrientationMethod, PlacedInstance,
    PlacedInstanceRecord, ReconstructConfig, Result, WallSegment,
};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Whether reconstruction produced anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReconstructionStatus {
    /// No record survived classification and snapping.
    NoWallSegments,
    Merged,
}

/// Per-stage counts for one reconstruction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructStats {
    pub instances_seen: usize,
    pub markers_skipped: usize,
    pub unnamed_skipped: usize,
    /// Yaw too far from any multiple of 90 degrees.
    pub unclassifiable: usize,
    /// Shorter than the minimum segment length after snapping.
    pub too_short: usize,
    pub raw_segments: usize,
    pub merged_segments: usize,
}

/// Result of [`reconstruct`].
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub status: ReconstructionStatus,
    /// Merged segments ordered by orientation, line, then start.
    pub segments: Vec<WallSegment>,
    pub stats: ReconstructStats,
    /// Grid used for snapping and bucketing.
    pub grid_size: f64,
}

impl Reconstruction {
    /// True when no merged segment came out.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Wall boxes for every merged segment.
    pub fn to_instances(&self, config: &ReconstructConfig) -> Vec<PlacedInstance> {
        self.segments
            .iter()
            .map(|s| s.to_instance(config.wall_thickness, config.wall_height))
            .collect()
    }
}

/// Outcome of classifying one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    Wall(WallSegment),
    /// Both horizontal extents below the marker threshold.
    Marker,
    /// Name does not mention "wall" while names are required.
    Unnamed,
    /// Yaw is not within tolerance of an axis-aligned angle.
    Unclassifiable,
}

/// Stage A for a single record.
pub fn classify(record: &PlacedInstanceRecord, config: &ReconstructConfig) -> Classification {
    let sx = record.sx.abs();
    let sz = record.sz.abs();

    if sx < config.min_marker_size && sz < config.min_marker_size {
        return Classification::Marker;
    }
    if config.require_wall_name && !record.name.to_ascii_lowercase().contains("wall") {
        return Classification::Unnamed;
    }

    let quarter = yaw_quarter(record.ry, config.angle_tolerance_deg);
    let (orientation, length) = match config.orientation {
        OrientationMethod::Scale => scale_orientation(sx, sz),
        OrientationMethod::Rotation => match quarter {
            Some(0 | 2) => (Orientation::Horizontal, sx),
            Some(_) => (Orientation::Vertical, sz),
            None => return Classification::Unclassifiable,
        },
        OrientationMethod::Auto => {
            let Some(q) = quarter else {
                return Classification::Unclassifiable;
            };
            let (local, length) = scale_orientation(sx, sz);
            // Quarter turns swap the local axes in world space
            let world = match (local, q % 2 == 1) {
                (o, false) => o,
                (Orientation::Horizontal, true) => Orientation::Vertical,
                (Orientation::Vertical, true) => Orientation::Horizontal,
            };
            (world, length)
        }
    };

    let (line, center) = match orientation {
        Orientation::Horizontal => (record.pz, record.px),
        Orientation::Vertical => (record.px, record.pz),
    };
    let half = length * 0.5;
    Classification::Wall(WallSegment::new(
        orientation,
        line,
        center - half,
        center + half,
    ))
}

fn scale_orientation(sx: f64, sz: f64) -> (Orientation, f64) {
    if sx >= sz {
        (Orientation::Horizontal, sx)
    } else {
        (Orientation::Vertical, sz)
    }
}

/// Nearest quarter turn (0..4) of a yaw in degrees, if strictly within
/// `tolerance`. An exact quarter turn always passes.
fn yaw_quarter(yaw_degrees: f64, tolerance: f64) -> Option<u8> {
    if !yaw_degrees.is_finite() {
        return None;
    }
    let yaw = yaw_degrees.rem_euclid(360.0);
    let nearest = (yaw / 90.0).round();
    let deviation = (yaw - nearest * 90.0).abs();
    if deviation > 0.0 && deviation >= tolerance {
        return None;
    }
    Some((nearest as i64).rem_euclid(4) as u8)
}

/// Round `value` to the nearest multiple of `grid`, ties to even.
#[inline]
pub fn snap(value: f64, grid: f64) -> f64 {
    (value / grid).round_ties_even() * grid
}

fn snap_segment(seg: &WallSegment, grid: f64) -> WallSegment {
    WallSegment::new(
        seg.orientation,
        snap(seg.line, grid),
        snap(seg.start, grid),
        snap(seg.end, grid),
    )
}

/// Stages C and D: bucket segments by line and merge each bucket.
///
/// The output line of every segment is its bucket's grid line, so merging
/// an already merged set returns it unchanged.
pub fn merge_segments(segments: &[WallSegment], config: &ReconstructConfig) -> Vec<WallSegment> {
    let grid = config.grid_size;
    let mut buckets: FxHashMap<(Orientation, i64), Vec<(f64, f64)>> = FxHashMap::default();
    for seg in segments {
        let key = (seg.orientation, (seg.line / grid).round_ties_even() as i64);
        buckets.entry(key).or_default().push((seg.start, seg.end));
    }

    let mut keys: Vec<_> = buckets.keys().copied().collect();
    keys.sort_unstable();

    let mut merged = Vec::new();
    for key in keys {
        let Some(intervals) = buckets.get_mut(&key) else {
            continue;
        };
        let line = key.1 as f64 * grid;
        let before = merged.len();

        merge_bucket(
            intervals,
            config.merge_tolerance,
            config.min_segment_length,
            |start, end| merged.push(WallSegment::new(key.0, line, start, end)),
        );

        debug!(
            orientation = ?key.0,
            line,
            intervals = intervals.len(),
            merged = merged.len() - before,
            "Merged bucket"
        );
    }

    merged
}

fn merge_bucket(
    intervals: &mut [(f64, f64)],
    tolerance: f64,
    min_length: f64,
    mut emit: impl FnMut(f64, f64),
) {
    if intervals.is_empty() {
        return;
    }

    // Stable sort on start only; equal starts land in the same run anyway
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (mut cur_start, mut cur_end) = intervals[0];
    for &(start, end) in &intervals[1..] {
        if start <= cur_end + tolerance {
            cur_end = cur_end.max(end);
        } else {
            if cur_end - cur_start >= min_length {
                emit(cur_start, cur_end);
            }
            cur_start = start;
            cur_end = end;
        }
    }
    if cur_end - cur_start >= min_length {
        emit(cur_start, cur_end);
    }
}

/// Reconstruct merged walls from wall records.
///
/// `config.grid_size` is used as is; see [`reconstruct_record`] for the
/// record grid override. An invalid configuration is rejected before any
/// record is read.
pub fn reconstruct<'a>(
    records: impl IntoIterator<Item = &'a PlacedInstanceRecord>,
    config: &ReconstructConfig,
) -> Result<Reconstruction> {
    config.validate()?;

    let mut stats = ReconstructStats::default();
    let mut raw = Vec::new();
    for record in records {
        stats.instances_seen += 1;
        let seg = match classify(record, config) {
            Classification::Wall(seg) => seg,
            Classification::Marker => {
                stats.markers_skipped += 1;
                continue;
            }
            Classification::Unnamed => {
                stats.unnamed_skipped += 1;
                continue;
            }
            Classification::Unclassifiable => {
                stats.unclassifiable += 1;
                continue;
            }
        };

        let seg = if config.snap_to_grid {
            snap_segment(&seg, config.grid_size)
        } else {
            seg
        };
        if seg.length() < config.min_segment_length {
            stats.too_short += 1;
            continue;
        }
        raw.push(seg);
    }
    stats.raw_segments = raw.len();

    if stats.unclassifiable > 0 {
        warn!(
            count = stats.unclassifiable,
            tolerance = config.angle_tolerance_deg,
            "Discarded wall records with off-axis yaw"
        );
    }

    if raw.is_empty() {
        warn!(
            instances = stats.instances_seen,
            markers = stats.markers_skipped,
            "No wall segments found"
        );
        return Ok(Reconstruction {
            status: ReconstructionStatus::NoWallSegments,
            segments: Vec::new(),
            stats,
            grid_size: config.grid_size,
        });
    }

    let segments = merge_segments(&raw, config);
    stats.merged_segments = segments.len();

    info!(
        instances = stats.instances_seen,
        raw = stats.raw_segments,
        merged = stats.merged_segments,
        "Reconstructed walls"
    );

    Ok(Reconstruction {
        status: ReconstructionStatus::Merged,
        segments,
        stats,
        grid_size: config.grid_size,
    })
}

/// Reconstruct from the record's walls group.
///
/// The record's grid size overrides `config.grid_size` when positive, so
/// validation sees the grid that is actually used.
pub fn reconstruct_record(
    record: &LayoutRecord,
    config: &ReconstructConfig,
) -> Result<Reconstruction> {
    let config = config.with_grid_size(record.effective_grid_size(config.grid_size));
    reconstruct(record.wall_records(), &config)
}

/// Rebuild one wall per usable record without merging.
///
/// Orientation comes from scale alone. With snapping enabled the endpoints
/// are snapped, the length is at least one grid step, and the centre is
/// snapped as well.
pub fn rebuild_individual<'a>(
    records: impl IntoIterator<Item = &'a PlacedInstanceRecord>,
    config: &ReconstructConfig,
) -> Vec<PlacedInstance> {
    let grid = config.grid_size;
    let mut walls = Vec::new();

    for record in records {
        let sx = record.sx.abs();
        let sz = record.sz.abs();
        if sx.max(sz) < config.min_marker_size {
            continue;
        }

        let (orientation, mut length) = scale_orientation(sx, sz);
        let mut cx = record.px;
        let mut cz = record.pz;

        if config.snap_to_grid && grid > 0.0 {
            let center = match orientation {
                Orientation::Horizontal => &mut cx,
                Orientation::Vertical => &mut cz,
            };
            let start = snap(*center - length * 0.5, grid);
            let end = snap(*center + length * 0.5, grid);
            length = grid.max((end - start).abs());
            *center = (start + end) * 0.5;

            cx = snap(cx, grid);
            cz = snap(cz, grid);
        }

        let scale = match orientation {
            Orientation::Horizontal => {
                Vector3::new(length, config.wall_height, config.wall_thickness)
            }
            Orientation::Vertical => {
                Vector3::new(config.wall_thickness, config.wall_height, length)
            }
        };
        walls.push(PlacedInstance::new(
            InstanceKind::Wall,
            "Wall",
            Point3::new(cx, config.wall_height * 0.5, cz),
            0.0,
            scale,
        ));
    }

    info!(walls = walls.len(), "Rebuilt walls individually");
    walls
}
