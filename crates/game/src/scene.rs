//! Static scene content: ceiling light layout, the starting light rig and the environment mesh.

use engine_core::{Intensity, LightRig, LIGHT_COUNT};
use glam::Vec3;
use renderer::MeshData;
use std::path::Path;

/// Height of the ceiling point lights.
pub const LIGHT_HEIGHT: f32 = 1.25;
const FIRST_LIGHT: Vec3 = Vec3::new(-8.6, LIGHT_HEIGHT, 7.93);
const LIGHT_SPACING_X: f32 = 3.42;
const ROW_SPACING: f32 = -4.54;
/// Row spacing after the long third row.
const WIDE_ROW_SPACING: f32 = -5.67;
const LONG_ROW: usize = 2;
const LIGHTS_PER_ROW: usize = 6;
const ROWS: usize = 4;

/// Lights start below black so the room is dark until the warm-up switches them on.
pub const LIGHT_OFF: Intensity = Intensity::new(-0.1, 0.0, 0.0);
pub const AMBIENT_START: Intensity = Intensity::new(0.35, 0.25, 1.0);

// Procedural room bounds.
const FLOOR_Y: f32 = -0.75;
const CEILING_Y: f32 = 1.35;
const SLAB: f32 = 0.25;
const ROOM_MIN: Vec3 = Vec3::new(-14.0, FLOOR_Y, -10.0);
const ROOM_MAX: Vec3 = Vec3::new(14.0, CEILING_Y, 14.0);

/// Positions of the ceiling lights: four rows running in -z, the third row one light longer
/// and shifted one slot towards -x.
pub fn ceiling_light_layout() -> Vec<Vec3> {
    let mut positions = Vec::with_capacity(LIGHT_COUNT);
    let mut z = FIRST_LIGHT.z;
    for row in 0..ROWS {
        let (count, start_x) = if row == LONG_ROW {
            (LIGHTS_PER_ROW + 1, FIRST_LIGHT.x - LIGHT_SPACING_X)
        } else {
            (LIGHTS_PER_ROW, FIRST_LIGHT.x)
        };
        positions.extend(
            (0..count).map(|i| Vec3::new(start_x + i as f32 * LIGHT_SPACING_X, LIGHT_HEIGHT, z)),
        );
        z += if row == LONG_ROW {
            WIDE_ROW_SPACING
        } else {
            ROW_SPACING
        };
    }
    positions
}

/// Light rig at startup: every light off, global ambient at its baseline.
pub fn initial_light_rig() -> LightRig {
    LightRig::new(&ceiling_light_layout(), AMBIENT_START, LIGHT_OFF)
}

/// Floor, ceiling, outer walls and a few partitions.
pub fn procedural_room() -> MeshData {
    let mut room = MeshData::new();
    // Floor and ceiling slabs.
    room.push_cuboid(
        Vec3::new(ROOM_MIN.x, FLOOR_Y - SLAB, ROOM_MIN.z),
        Vec3::new(ROOM_MAX.x, FLOOR_Y, ROOM_MAX.z),
    );
    room.push_cuboid(
        Vec3::new(ROOM_MIN.x, CEILING_Y, ROOM_MIN.z),
        Vec3::new(ROOM_MAX.x, CEILING_Y + SLAB, ROOM_MAX.z),
    );
    // Outer walls.
    let walls = [
        (
            Vec3::new(ROOM_MIN.x - SLAB, FLOOR_Y, ROOM_MIN.z),
            Vec3::new(ROOM_MIN.x, CEILING_Y, ROOM_MAX.z),
        ),
        (
            Vec3::new(ROOM_MAX.x, FLOOR_Y, ROOM_MIN.z),
            Vec3::new(ROOM_MAX.x + SLAB, CEILING_Y, ROOM_MAX.z),
        ),
        (
            Vec3::new(ROOM_MIN.x, FLOOR_Y, ROOM_MIN.z - SLAB),
            Vec3::new(ROOM_MAX.x, CEILING_Y, ROOM_MIN.z),
        ),
        (
            Vec3::new(ROOM_MIN.x, FLOOR_Y, ROOM_MAX.z),
            Vec3::new(ROOM_MAX.x, CEILING_Y, ROOM_MAX.z + SLAB),
        ),
    ];
    // Partitions.
    let partitions = [
        (Vec3::new(-4.0, FLOOR_Y, 0.8), Vec3::new(2.0, CEILING_Y, 1.0)),
        (Vec3::new(5.0, FLOOR_Y, -5.0), Vec3::new(5.2, CEILING_Y, 1.0)),
        (Vec3::new(-10.2, FLOOR_Y, -4.0), Vec3::new(-10.0, CEILING_Y, 4.0)),
        (Vec3::new(1.0, FLOOR_Y, 9.5), Vec3::new(7.0, CEILING_Y, 9.7)),
    ];
    for (min, max) in walls.into_iter().chain(partitions) {
        room.push_cuboid(min, max);
    }
    room
}

/// Environment geometry from a glTF file, or the procedural room when the file is
/// missing or unusable.
pub fn load_environment(path: Option<&Path>) -> MeshData {
    let Some(path) = path else {
        log::info!("No environment asset configured, using procedural room");
        return procedural_room();
    };
    match MeshData::from_gltf(path) {
        Ok(mesh) => {
            log::info!(
                "Loaded environment {} ({} triangles)",
                path.display(),
                mesh.triangle_count()
            );
            mesh
        }
        Err(e) => {
            log::warn!("Environment {}: {}; using procedural room", path.display(), e);
            procedural_room()
        }
    }
}
