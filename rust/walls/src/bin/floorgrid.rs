// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! floorgrid: build wall layouts from grid floor plans and reconstruct
//! merged walls from layout records.
//!
//! Usage:
//!   floorgrid build [--plan plan.json] [--record-out layout.json] [--obj walls.obj]
//!   floorgrid reconstruct layout.json [--merge-tolerance 0.05] [--obj merged.obj]
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use floorgrid_core::{
    FloorPlan, FloorgridConfig, LayoutRecord, OrientationMethod, PlacedInstance,
};
use floorgrid_walls::{
    export_layout, export_walls, materialize, rebuild_individual, reconstruct_record,
    ExportOptions, LayoutBuilder, MeshScene, ReconstructionStatus,
};

/// Grid floor plan wall builder
#[derive(Parser, Debug)]
#[command(name = "floorgrid")]
#[command(author, version, about = "Grid floor plan walls: build and reconstruct", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build walls, doors and floor from a floor plan
    Build {
        /// Floor plan JSON (defaults to the bundled hospital plan)
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the layout record here
        #[arg(long)]
        record_out: Option<PathBuf>,

        /// Write a Wavefront OBJ of the layout here
        #[arg(long)]
        obj: Option<PathBuf>,

        #[arg(long, default_value = "Floorgrid")]
        scene_name: String,

        #[arg(long)]
        cell_size: Option<f64>,

        #[arg(long)]
        wall_thickness: Option<f64>,

        #[arg(long)]
        wall_height: Option<f64>,

        #[arg(long)]
        door_width: Option<f64>,
    },

    /// Reconstruct merged walls from a layout record
    Reconstruct {
        /// Layout record JSON
        record: PathBuf,

        /// Configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Fallback grid size when the record carries none
        #[arg(long)]
        grid_size: Option<f64>,

        #[arg(long)]
        merge_tolerance: Option<f64>,

        #[arg(long)]
        min_segment_length: Option<f64>,

        /// Disable grid snapping
        #[arg(long)]
        no_snap: bool,

        /// auto, rotation or scale
        #[arg(long)]
        orientation: Option<OrientationMethod>,

        /// One wall per record, without merging
        #[arg(long)]
        simple: bool,

        /// Write the reconstructed walls as a layout record here
        #[arg(long)]
        record_out: Option<PathBuf>,

        /// Write a Wavefront OBJ of the reconstructed walls here
        #[arg(long)]
        obj: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Build {
            plan,
            config,
            record_out,
            obj,
            scene_name,
            cell_size,
            wall_thickness,
            wall_height,
            door_width,
        } => {
            let mut config = load_config(config.as_deref())?;
            let build = &mut config.build;
            if let Some(v) = cell_size {
                build.cell_size = v;
            }
            if let Some(v) = wall_thickness {
                build.wall_thickness = v;
            }
            if let Some(v) = wall_height {
                build.wall_height = v;
            }
            if let Some(v) = door_width {
                build.door_width = v;
            }
            config.build.validate().context("Invalid build configuration")?;

            let plan = match plan {
                Some(path) => FloorPlan::from_file(&path)
                    .with_context(|| format!("Failed to load floor plan {}", path.display()))?,
                None => FloorPlan::hospital().context("Failed to load bundled plan")?,
            };

            let layout = LayoutBuilder::new(&plan, &config.build).build();
            let stats = &layout.stats;
            println!(
                "Rooms: {} processed, {} skipped",
                stats.rooms_processed, stats.rooms_skipped
            );
            println!(
                "Walls: {} room, {} boundary",
                stats.room_walls, stats.boundary_walls
            );
            println!(
                "Doors: {} placed, {} on boundary, {} skipped",
                stats.doors_placed, stats.boundary_doors, stats.doors_skipped
            );

            if let Some(path) = record_out {
                let options = ExportOptions {
                    scene_name,
                    wall_thickness: config.build.wall_thickness,
                    ..Default::default()
                };
                let record = export_layout(&layout, &options);
                write_record(&record, &path)?;
            }

            if let Some(path) = obj {
                write_obj(layout.instances(), &path)?;
            }
        }

        Command::Reconstruct {
            record,
            config,
            grid_size,
            merge_tolerance,
            min_segment_length,
            no_snap,
            orientation,
            simple,
            record_out,
            obj,
        } => {
            let mut config = load_config(config.as_deref())?;
            let rc = &mut config.reconstruct;
            if let Some(v) = grid_size {
                rc.grid_size = v;
            }
            if let Some(v) = merge_tolerance {
                rc.merge_tolerance = v;
            }
            if let Some(v) = min_segment_length {
                rc.min_segment_length = v;
            }
            if let Some(v) = orientation {
                rc.orientation = v;
            }
            if no_snap {
                rc.snap_to_grid = false;
            }

            let layout = LayoutRecord::from_file(&record)
                .with_context(|| format!("Failed to read layout record {}", record.display()))?;
            println!(
                "Record '{}': {} wall records",
                layout.scene_name,
                layout.wall_records().count()
            );

            // The record's grid wins over --grid-size, so validate what is used
            let rc = config
                .reconstruct
                .with_grid_size(layout.effective_grid_size(config.reconstruct.grid_size));
            rc.validate().context("Invalid reconstruct configuration")?;

            let walls = if simple {
                let walls = rebuild_individual(layout.wall_records(), &rc);
                println!("Rebuilt {} walls", walls.len());
                walls
            } else {
                let result = reconstruct_record(&layout, &rc)?;
                let stats = &result.stats;
                println!(
                    "Raw segments: {} ({} markers, {} off-axis, {} too short)",
                    stats.raw_segments, stats.markers_skipped, stats.unclassifiable, stats.too_short
                );
                println!("Merged segments: {}", stats.merged_segments);
                if result.status == ReconstructionStatus::NoWallSegments {
                    println!("0 segments produced");
                }
                result.to_instances(&rc)
            };

            if let Some(path) = record_out {
                let options = ExportOptions {
                    scene_name: layout.scene_name.clone(),
                    grid_size: rc.grid_size,
                    wall_thickness: rc.wall_thickness,
                    ..Default::default()
                };
                write_record(&export_walls(&walls, &options), &path)?;
            }

            if let Some(path) = obj {
                write_obj(&walls, &path)?;
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<FloorgridConfig> {
    match path {
        Some(path) => FloorgridConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(FloorgridConfig::default()),
    }
}

fn write_record(record: &LayoutRecord, path: &Path) -> Result<()> {
    let json = record.to_json()?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote record: {}", path.display());
    Ok(())
}

fn write_obj<'a>(
    instances: impl IntoIterator<Item = &'a PlacedInstance>,
    path: &Path,
) -> Result<()> {
    let mut scene = MeshScene::new();
    let count = materialize(&mut scene, instances);

    let file = fs::File::create(path)
        .with_context(|| format!("Cannot create output file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    scene
        .write_obj(&mut out)
        .and_then(|_| out.flush())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote OBJ: {} ({} objects)", path.display(), count);
    Ok(())
}
