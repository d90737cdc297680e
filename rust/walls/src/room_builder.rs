// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room and outer boundary wall synthesis.
//!
//! [`LayoutBuilder::build`] is pure: it returns a description of every
//! instance (floor, room walls, doors, outer boundary) and touches no scene.
//! Use [`crate::scene::materialize`] to apply the result.
//!
//! Boundary doors use a two-level projection: a room door whose rectangle
//! edge lies on the map's outer extent is placed in world space on the room
//! edge, then re-expressed as an offset along the boundary edge, so the
//! perimeter wall gets an opening aligned with the room's own door.

use floorgrid_core::{
    inverse_lerp, lerp, BuildConfig, FloorPlan, GridMapper, InstanceKind, PlacedInstance, Room,
    Side, WorldRect,
};
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::wall_run::{build_wall_run, RunSegment, WallRunParams};

/// Hierarchy name of the perimeter walls.
pub const OUTER_BOUNDARY: &str = "OuterBoundary";

/// Walls and doors generated for one room.
#[derive(Debug, Clone)]
pub struct RoomWalls {
    pub name: String,
    pub walls: Vec<PlacedInstance>,
    pub doors: Vec<PlacedInstance>,
}

/// Normalized door offsets along each side of the outer boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryDoors {
    pub south: Vec<f64>,
    pub north: Vec<f64>,
    pub west: Vec<f64>,
    pub east: Vec<f64>,
}

impl BoundaryDoors {
    /// Offsets projected onto one boundary side.
    pub fn side(&self, side: Side) -> &[f64] {
        match side {
            Side::South => &self.south,
            Side::North => &self.north,
            Side::West => &self.west,
            Side::East => &self.east,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut Vec<f64> {
        match side {
            Side::South => &mut self.south,
            Side::North => &mut self.north,
            Side::West => &mut self.west,
            Side::East => &mut self.east,
        }
    }

    /// Total boundary doors across all sides.
    pub fn len(&self) -> usize {
        self.south.len() + self.north.len() + self.west.len() + self.east.len()
    }

    /// True when no door reaches the boundary.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counts reported after a build.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildStats {
    pub rooms_processed: usize,
    pub rooms_skipped: usize,
    pub room_walls: usize,
    pub boundary_walls: usize,
    pub doors_placed: usize,
    pub boundary_doors: usize,
    /// Doors whose `rect_index` names no rectangle of their room.
    pub doors_skipped: usize,
}

/// Output of a forward build.
#[derive(Debug, Clone)]
pub struct GeneratedLayout {
    pub floor: PlacedInstance,
    pub rooms: Vec<RoomWalls>,
    pub boundary: Vec<PlacedInstance>,
    pub stats: BuildStats,
}

impl GeneratedLayout {
    /// Room walls followed by boundary walls.
    pub fn walls(&self) -> impl Iterator<Item = &PlacedInstance> {
        self.rooms
            .iter()
            .flat_map(|r| r.walls.iter())
            .chain(self.boundary.iter())
    }

    /// Door instances of every room.
    pub fn doors(&self) -> impl Iterator<Item = &PlacedInstance> {
        self.rooms.iter().flat_map(|r| r.doors.iter())
    }

    /// Every instance: floor, walls, then doors.
    pub fn instances(&self) -> impl Iterator<Item = &PlacedInstance> {
        std::iter::once(&self.floor)
            .chain(self.walls())
            .chain(self.doors())
    }
}

/// Synthesizes wall instances for a floor plan.
pub struct LayoutBuilder<'a> {
    plan: &'a FloorPlan,
    config: &'a BuildConfig,
    grid: GridMapper,
}

impl<'a> LayoutBuilder<'a> {
    /// Builder for `plan` with grid cells of `config.cell_size`.
    pub fn new(plan: &'a FloorPlan, config: &'a BuildConfig) -> Self {
        Self {
            plan,
            config,
            grid: GridMapper::new(config.cell_size),
        }
    }

    fn run_params(&self) -> WallRunParams {
        WallRunParams {
            door_width: self.config.door_width,
            wall_thickness: self.config.wall_thickness,
        }
    }

    /// Build floor, rooms and outer boundary.
    pub fn build(&self) -> GeneratedLayout {
        let mut stats = BuildStats::default();

        let floor = self.build_floor();

        let mut rooms = Vec::with_capacity(self.plan.rooms.len());
        for room in &self.plan.rooms {
            if room.rects.is_empty() {
                debug!(room = %room.name, "Skipping room without rectangles");
                stats.rooms_skipped += 1;
                continue;
            }

            let dangling = room
                .doors
                .iter()
                .filter(|d| d.rect_index >= room.rects.len())
                .count();
            if dangling > 0 {
                warn!(
                    room = %room.name,
                    dangling,
                    rects = room.rects.len(),
                    "Doors reference missing rectangles and were skipped"
                );
                stats.doors_skipped += dangling;
            }

            let built = self.build_room(room);
            stats.rooms_processed += 1;
            stats.room_walls += built.walls.len();
            stats.doors_placed += built.doors.len();
            rooms.push(built);
        }

        let boundary_doors = self.boundary_door_offsets();
        stats.boundary_doors = boundary_doors.len();
        let boundary = self.build_outer_boundary(&boundary_doors);
        stats.boundary_walls = boundary.len();

        info!(
            rooms = stats.rooms_processed,
            skipped_rooms = stats.rooms_skipped,
            walls = stats.room_walls,
            doors = stats.doors_placed,
            boundary_walls = stats.boundary_walls,
            boundary_doors = stats.boundary_doors,
            "Built floor plan layout"
        );

        GeneratedLayout {
            floor,
            rooms,
            boundary,
            stats,
        }
    }

    /// Walls and door instances for one room.
    pub fn build_room(&self, room: &Room) -> RoomWalls {
        let params = self.run_params();
        let wall_path = format!("{}/Wall", room.name);
        let door_path = format!("{}/Door", room.name);
        let mut walls = Vec::new();
        let mut doors = Vec::new();

        for (i, rect) in room.rects.iter().enumerate() {
            let bounds = self.grid.rect_bounds(rect);

            for side in Side::ALL {
                let offsets = room.door_offsets(i, side);
                for seg in build_wall_run(side, &bounds, &offsets, &params) {
                    walls.push(self.place_wall(&wall_path, side, &bounds, &seg));
                }
            }

            for door in room.doors.iter().filter(|d| d.rect_index == i) {
                doors.push(self.place_door(&door_path, side_pose(&bounds, door.side, door.clamped_t())));
            }
        }

        debug!(room = %room.name, walls = walls.len(), doors = doors.len(), "Built room");

        RoomWalls {
            name: room.name.clone(),
            walls,
            doors,
        }
    }

    /// Room doors that open through the map's outer extent, projected onto
    /// the boundary edges.
    pub fn boundary_door_offsets(&self) -> BoundaryDoors {
        let outer = self.grid.boundary(self.plan.grid_width, self.plan.grid_height);
        let mut doors = BoundaryDoors::default();

        for room in &self.plan.rooms {
            for (i, rect) in room.rects.iter().enumerate() {
                let bounds = self.grid.rect_bounds(rect);

                for door in room.doors.iter().filter(|d| d.rect_index == i) {
                    let on_boundary = match door.side {
                        Side::South => rect.y_min == 1,
                        Side::North => rect.y_max == self.plan.grid_height,
                        Side::West => rect.x_min == 1,
                        Side::East => rect.x_max == self.plan.grid_width,
                    };
                    if !on_boundary {
                        continue;
                    }

                    let (p, _) = side_pose(&bounds, door.side, door.clamped_t());
                    let t = if door.side.runs_along_x() {
                        inverse_lerp(outer.min_x, outer.max_x, p.x)
                    } else {
                        inverse_lerp(outer.min_z, outer.max_z, p.z)
                    };
                    doors.side_mut(door.side).push(t);
                }
            }
        }

        doors
    }

    /// Perimeter walls with openings at the projected boundary doors.
    pub fn build_outer_boundary(&self, doors: &BoundaryDoors) -> Vec<PlacedInstance> {
        let outer = self.grid.boundary(self.plan.grid_width, self.plan.grid_height);
        let params = self.run_params();
        let path = format!("{}/Wall", OUTER_BOUNDARY);

        Side::ALL
            .into_iter()
            .flat_map(|side| {
                build_wall_run(side, &outer, doors.side(side), &params)
                    .into_iter()
                    .map(move |seg| (side, seg))
            })
            .map(|(side, seg)| self.place_wall(&path, side, &outer, &seg))
            .collect()
    }

    /// Floor slab covering the whole grid, top face at y = 0.
    pub fn build_floor(&self) -> PlacedInstance {
        let cs = self.config.cell_size;
        let ft = self.config.floor_thickness;
        let w = self.plan.grid_width as f64 * cs;
        let h = self.plan.grid_height as f64 * cs;

        PlacedInstance::new(
            InstanceKind::Floor,
            "Floor",
            Point3::new(w * 0.5 + cs * 0.5, -ft * 0.5, h * 0.5 + cs * 0.5),
            0.0,
            Vector3::new(w, ft, h),
        )
    }

    fn place_wall(
        &self,
        path: &str,
        side: Side,
        bounds: &WorldRect,
        seg: &RunSegment,
    ) -> PlacedInstance {
        let height = self.config.wall_height;
        let thickness = self.config.wall_thickness;

        let (position, scale) = match side {
            Side::South | Side::North => {
                let z = if side == Side::South {
                    bounds.min_z
                } else {
                    bounds.max_z
                };
                (
                    Point3::new(bounds.center_x() + seg.offset, height * 0.5, z),
                    Vector3::new(seg.length, height, thickness),
                )
            }
            Side::West | Side::East => {
                let x = if side == Side::West {
                    bounds.min_x
                } else {
                    bounds.max_x
                };
                (
                    Point3::new(x, height * 0.5, bounds.center_z() + seg.offset),
                    Vector3::new(thickness, height, seg.length),
                )
            }
        };

        PlacedInstance::new(InstanceKind::Wall, path, position, 0.0, scale)
    }

    fn place_door(&self, path: &str, (ground, yaw): (Point3<f64>, f64)) -> PlacedInstance {
        let height = self.config.door_height;
        PlacedInstance::new(
            InstanceKind::Door,
            path,
            Point3::new(ground.x, height * 0.5, ground.z),
            yaw,
            Vector3::new(self.config.door_width, height, self.config.wall_thickness),
        )
    }
}

/// Ground position and yaw (degrees) of a door at `t` along one edge.
///
/// Doors face into the rectangle: South 0°, North 180°, West 90°, East 270°.
pub fn side_pose(bounds: &WorldRect, side: Side, t: f64) -> (Point3<f64>, f64) {
    match side {
        Side::South => (
            Point3::new(lerp(bounds.min_x, bounds.max_x, t), 0.0, bounds.min_z),
            0.0,
        ),
        Side::North => (
            Point3::new(lerp(bounds.min_x, bounds.max_x, t), 0.0, bounds.max_z),
            180.0,
        ),
        Side::West => (
            Point3::new(bounds.min_x, 0.0, lerp(bounds.min_z, bounds.max_z, t)),
            90.0,
        ),
        Side::East => (
            Point3::new(bounds.max_x, 0.0, lerp(bounds.min_z, bounds.max_z, t)),
            270.0,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use floorgrid_core::{DoorSpec, RectDef};

    fn config() -> BuildConfig {
        BuildConfig {
            cell_size: 1.0,
            ..Default::default()
        }
    }

    fn single_room_plan(rect: RectDef, doors: &[DoorSpec]) -> FloorPlan {
        let mut room = Room::new("Ward").with_rect(rect);
        room.doors.extend_from_slice(doors);
        let mut plan = FloorPlan::new(10, 10);
        plan.rooms.push(room);
        plan
    }

    #[test]
    fn test_closed_room_has_four_walls() {
        let plan = single_room_plan(RectDef::new(2, 4, 3, 4), &[]);
        let config = config();
        let layout = LayoutBuilder::new(&plan, &config).build();

        assert_eq!(layout.rooms.len(), 1);
        let walls = &layout.rooms[0].walls;
        assert_eq!(walls.len(), 4);

        // South wall: along X on z = min
        let south = &walls[0];
        assert_relative_eq!(south.position.x, 3.0);
        assert_relative_eq!(south.position.z, 2.5);
        assert_relative_eq!(south.position.y, config.wall_height * 0.5);
        assert_relative_eq!(south.scale.x, 3.0);
        assert_relative_eq!(south.scale.z, config.wall_thickness);

        // East wall: along Z on x = max
        let east = &walls[3];
        assert_relative_eq!(east.position.x, 4.5);
        assert_relative_eq!(east.position.z, 3.5);
        assert_relative_eq!(east.scale.x, config.wall_thickness);
        assert_relative_eq!(east.scale.z, 2.0);
        assert_eq!(east.path, "Ward/Wall");
    }

    #[test]
    fn test_door_cuts_only_its_side() {
        let plan = single_room_plan(
            RectDef::new(2, 6, 2, 4),
            &[DoorSpec::new(Side::North, 0, 0.5)],
        );
        let config = config();
        let layout = LayoutBuilder::new(&plan, &config).build();
        let room = &layout.rooms[0];

        assert_eq!(room.walls.len(), 5);
        assert_eq!(room.doors.len(), 1);

        let door = &room.doors[0];
        assert_relative_eq!(door.position.x, 4.0);
        assert_relative_eq!(door.position.z, 4.5);
        assert_relative_eq!(door.yaw_degrees, 180.0);
        assert_relative_eq!(door.scale.x, config.door_width);
    }

    #[test]
    fn test_multi_rect_room_door_on_second_rect() {
        let mut plan = FloorPlan::new(6, 4);
        plan.rooms.push(
            Room::new("L")
                .with_rect(RectDef::new(1, 2, 1, 2))
                .with_rect(RectDef::new(3, 4, 1, 1))
                .with_door(DoorSpec::new(Side::South, 1, 0.5)),
        );
        let config = config();
        let builder = LayoutBuilder::new(&plan, &config);
        let layout = builder.build();
        let room = &layout.rooms[0];

        // Four walls per rect, plus the split south edge of the second
        assert_eq!(room.walls.len(), 9);
        assert_eq!(room.doors.len(), 1);
        assert_eq!(layout.stats.doors_placed, 1);

        let door = &room.doors[0];
        assert_relative_eq!(door.position.x, 3.5);
        assert_relative_eq!(door.position.z, 0.5);
        assert_relative_eq!(door.yaw_degrees, 0.0);

        // Boundary spans x in [0.5, 6.5]
        let doors = builder.boundary_door_offsets();
        assert_eq!(doors.south.len(), 1);
        assert_relative_eq!(doors.south[0], 0.5);
        assert!(doors.north.is_empty() && doors.west.is_empty() && doors.east.is_empty());
        assert_eq!(layout.stats.boundary_doors, 1);
    }

    #[test]
    fn test_dangling_door_is_counted_not_fatal() {
        let plan = single_room_plan(
            RectDef::new(2, 3, 2, 3),
            &[DoorSpec::new(Side::East, 4, 0.5)],
        );
        let config = config();
        let layout = LayoutBuilder::new(&plan, &config).build();

        assert_eq!(layout.stats.doors_skipped, 1);
        assert_eq!(layout.stats.doors_placed, 0);
        assert_eq!(layout.rooms[0].walls.len(), 4);
    }

    #[test]
    fn test_room_without_rects_skipped() {
        let mut plan = FloorPlan::new(5, 5);
        plan.rooms.push(Room::new("Ghost"));
        let config = config();
        let layout = LayoutBuilder::new(&plan, &config).build();

        assert!(layout.rooms.is_empty());
        assert_eq!(layout.stats.rooms_skipped, 1);
        assert_eq!(layout.boundary.len(), 4);
    }

    #[test]
    fn test_boundary_door_projection() {
        let plan = single_room_plan(
            RectDef::new(3, 5, 1, 2),
            &[DoorSpec::new(Side::South, 0, 0.5)],
        );
        let config = config();
        let builder = LayoutBuilder::new(&plan, &config);
        let doors = builder.boundary_door_offsets();

        assert_eq!(doors.south.len(), 1);
        assert!(doors.north.is_empty() && doors.west.is_empty() && doors.east.is_empty());

        // Door at world x = 4.0, boundary spans x in [0.5, 10.5]
        let grid = GridMapper::new(config.cell_size);
        let outer = grid.boundary(10, 10);
        let (pose, _) = side_pose(&grid.rect_bounds(&plan.rooms[0].rects[0]), Side::South, 0.5);
        assert_relative_eq!(pose.x, 4.0);
        assert_relative_eq!(doors.south[0], inverse_lerp(outer.min_x, outer.max_x, pose.x));
        assert_relative_eq!(doors.south[0], 0.35, epsilon = 1e-12);
    }

    #[test]
    fn test_interior_doors_do_not_reach_boundary() {
        let plan = single_room_plan(
            RectDef::new(3, 5, 2, 3),
            &[
                DoorSpec::new(Side::South, 0, 0.5),
                DoorSpec::new(Side::East, 0, 0.5),
            ],
        );
        let config = config();
        let builder = LayoutBuilder::new(&plan, &config);
        assert!(builder.boundary_door_offsets().is_empty());
    }

    #[test]
    fn test_boundary_opening_aligns_with_room_door() {
        let plan = single_room_plan(
            RectDef::new(1, 3, 1, 2),
            &[DoorSpec::new(Side::South, 0, 0.5)],
        );
        let config = config();
        let layout = LayoutBuilder::new(&plan, &config).build();

        // South boundary is split in two around x = 2.0
        let south: Vec<_> = layout
            .boundary
            .iter()
            .filter(|w| w.scale.x > w.scale.z && (w.position.z - 0.5).abs() < 1e-9)
            .collect();
        assert_eq!(south.len(), 2);

        let left_end = south[0].position.x + south[0].scale.x * 0.5;
        let right_start = south[1].position.x - south[1].scale.x * 0.5;
        assert_relative_eq!((left_end + right_start) * 0.5, 2.0, epsilon = 1e-9);
        assert_relative_eq!(right_start - left_end, config.door_width, epsilon = 1e-9);
        assert_eq!(layout.stats.boundary_doors, 1);
        assert_eq!(layout.stats.boundary_walls, 5);
    }

    #[test]
    fn test_floor_slab() {
        let plan = FloorPlan::new(15, 15);
        let config = BuildConfig::default();
        let floor = LayoutBuilder::new(&plan, &config).build_floor();

        assert_eq!(floor.kind, InstanceKind::Floor);
        assert_relative_eq!(floor.scale.x, 15.0 * 2.3, epsilon = 1e-9);
        assert_relative_eq!(floor.position.x, 8.0 * 2.3, epsilon = 1e-9);
        assert_relative_eq!(floor.position.y, -0.05);
    }

    #[test]
    fn test_hospital_build_counts() {
        let plan = FloorPlan::hospital().unwrap();
        let config = BuildConfig::default();
        let layout = LayoutBuilder::new(&plan, &config).build();

        assert_eq!(layout.stats.rooms_processed, 22);
        assert_eq!(layout.stats.doors_placed, plan.door_count());
        assert_eq!(layout.stats.doors_skipped, 0);
        // Only the main lobby's front door opens through the perimeter
        assert_eq!(layout.stats.boundary_doors, 1);
        assert_eq!(layout.walls().count(), layout.stats.room_walls + layout.stats.boundary_walls);
        assert_eq!(
            layout.instances().count(),
            1 + layout.walls().count() + layout.doors().count()
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let plan = FloorPlan::hospital().unwrap();
        let config = BuildConfig::default();
        let builder = LayoutBuilder::new(&plan, &config);
        let a: Vec<_> = builder.build().instances().cloned().collect();
        let b: Vec<_> = builder.build().instances().cloned().collect();
        assert_eq!(a, b);
    }
}
