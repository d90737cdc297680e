// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Applying generated instances to a destination scene.
//!
//! Both pipelines assume they build into an empty destination, so
//! [`materialize`] always clears the scene before spawning.

use std::io::{self, Write};

use floorgrid_core::{InstanceKind, PlacedInstance};
use tracing::debug;

use crate::mesh::Mesh;

/// A destination for placed instances.
pub trait Scene {
    /// Discard everything a previous run spawned.
    fn clear(&mut self);

    fn spawn(&mut self, instance: &PlacedInstance);
}

/// Clear `scene`, then spawn every instance. Returns the spawn count.
pub fn materialize<'a, S, I>(scene: &mut S, instances: I) -> usize
where
    S: Scene + ?Sized,
    I: IntoIterator<Item = &'a PlacedInstance>,
{
    scene.clear();
    let mut count = 0;
    for instance in instances {
        scene.spawn(instance);
        count += 1;
    }
    debug!(count, "Materialized instances");
    count
}

/// One box mesh per spawned instance.
#[derive(Debug, Default)]
pub struct MeshScene {
    objects: Vec<SceneObject>,
}

#[derive(Debug)]
struct SceneObject {
    name: String,
    kind: InstanceKind,
    mesh: Mesh,
}

impl MeshScene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of materialized objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when nothing has been materialized.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of objects of one kind.
    pub fn count(&self, kind: InstanceKind) -> usize {
        self.objects.iter().filter(|o| o.kind == kind).count()
    }

    /// All objects combined into a single mesh.
    pub fn combined_mesh(&self) -> Mesh {
        let mut combined = Mesh::new();
        for object in &self.objects {
            combined.merge(&object.mesh);
        }
        combined
    }

    /// Write the scene as Wavefront OBJ, one object per instance.
    ///
    /// Coordinates are already Y-up and are written unchanged.
    pub fn write_obj<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "# floorgrid scene: {} objects", self.objects.len())?;
        writeln!(out, "# Coordinate system: Y-up")?;

        // OBJ indices are 1-based and global across objects
        let mut vertex_offset: u32 = 1;
        for (i, object) in self.objects.iter().enumerate() {
            writeln!(out)?;
            writeln!(out, "o {}_{}", object_name(&object.name), i)?;

            for p in object.mesh.positions.chunks_exact(3) {
                writeln!(out, "v {:.6} {:.6} {:.6}", p[0], p[1], p[2])?;
            }
            for n in object.mesh.normals.chunks_exact(3) {
                writeln!(out, "vn {:.6} {:.6} {:.6}", n[0], n[1], n[2])?;
            }
            for tri in object.mesh.indices.chunks_exact(3) {
                let (a, b, c) = (
                    tri[0] + vertex_offset,
                    tri[1] + vertex_offset,
                    tri[2] + vertex_offset,
                );
                writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
            }

            vertex_offset += object.mesh.vertex_count() as u32;
        }

        Ok(())
    }
}

impl Scene for MeshScene {
    fn clear(&mut self) {
        self.objects.clear();
    }

    fn spawn(&mut self, instance: &PlacedInstance) {
        self.objects.push(SceneObject {
            name: instance.path.clone(),
            kind: instance.kind,
            mesh: Mesh::from_instance(instance),
        });
    }
}

fn object_name(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
