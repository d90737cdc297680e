// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall runs: the solid pieces left on one rectangle edge after cutting a
//! door-width gap at every door.
//!
//! Offsets are measured from the edge midpoint, so a run over an edge of
//! length `L` lives in `[-L/2, L/2]`.

use floorgrid_core::{lerp, Side, WorldRect};

/// Door and wall dimensions used while cutting gaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallRunParams {
    /// Opening width cut for each door.
    pub door_width: f64,
    /// Wall box depth; also bounds the gap on short edges.
    pub wall_thickness: f64,
}

/// One solid piece of a wall run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSegment {
    /// Centre of the piece, relative to the edge midpoint.
    pub offset: f64,
    pub length: f64,
}

impl RunSegment {
    #[inline]
    pub fn start(&self) -> f64 {
        self.offset - self.length * 0.5
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.offset + self.length * 0.5
    }
}

/// Length of the edge of `bounds` on `side`.
#[inline]
pub fn edge_length(side: Side, bounds: &WorldRect) -> f64 {
    if side.runs_along_x() {
        bounds.width()
    } else {
        bounds.depth()
    }
}

/// Build the run for one edge.
///
/// Doors are normalized offsets along the edge (clamped to `[0, 1]`).
/// Overlapping door gaps are not merged: the cursor jumps to the end of each
/// gap in order, and any piece not longer than half the wall thickness is
/// dropped, which also suppresses zero or negative pieces between clashing
/// doors.
pub fn build_wall_run(
    side: Side,
    bounds: &WorldRect,
    doors: &[f64],
    params: &WallRunParams,
) -> Vec<RunSegment> {
    let length = edge_length(side, bounds);

    if doors.is_empty() {
        return vec![RunSegment {
            offset: 0.0,
            length,
        }];
    }

    let half = length * 0.5;
    let min_piece = params.wall_thickness * 0.5;
    let mut segments = Vec::with_capacity(doors.len() + 1);
    let mut cursor = -half;

    for (a, b) in door_gaps(length, doors, params) {
        let piece = a - cursor;
        if piece > min_piece {
            segments.push(RunSegment {
                offset: cursor + piece * 0.5,
                length: piece,
            });
        }
        cursor = b;
    }

    let tail = half - cursor;
    if tail > min_piece {
        segments.push(RunSegment {
            offset: cursor + tail * 0.5,
            length: tail,
        });
    }

    segments
}

/// Door gaps `[a, b]` along an edge of `length`, in ascending door order.
///
/// Each gap is `min(door_width, length - wall_thickness)` wide, centred on
/// its door and clamped to the edge.
pub(crate) fn door_gaps(length: f64, doors: &[f64], params: &WallRunParams) -> Vec<(f64, f64)> {
    let half = length * 0.5;
    let half_gap = (params.door_width.min(length - params.wall_thickness) * 0.5).max(0.0);

    let mut sorted: Vec<f64> = doors
        .iter()
        .map(|t| if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) })
        .collect();
    sorted.sort_by(f64::total_cmp);

    sorted
        .into_iter()
        .map(|t| {
            let center = lerp(-half, half, t);
            ((center - half_gap).max(-half), (center + half_gap).min(half))
        })
        .collect()
}
