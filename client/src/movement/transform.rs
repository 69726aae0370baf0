//! Mapping tile space into the 3D scene.
//!
//! Tile `x` runs along world +X and tile `y` (South) along world +Z; heights stack on
//! +Y. Step offsets are isometric screen pixels, where one tile East is `(+22, +22)`
//! and one tile South is `(-22, +22)`, so they are unprojected back onto tile axes.

use bevy::prelude::*;
use nalgebra as na;
use shared::{Facing, Position, constants::TILE_PIXELS_HALF};

/// World units per tile.
pub const TILE_SIZE: f32 = 1.0;

/// World units per height unit. A 16-unit person stands 1.6 tiles tall.
pub const HEIGHT_SCALE: f32 = 0.1;

/// Convert an isometric pixel offset into fractional tile deltas `(dx, dy)`.
fn unproject(offset: &na::Vector3<f32>) -> (f32, f32) {
    let u = offset.x / TILE_PIXELS_HALF;
    let v = offset.y / TILE_PIXELS_HALF;
    ((u + v) * 0.5, (v - u) * 0.5)
}

pub fn tile_to_world(position: Position, offset: na::Vector3<f32>) -> Vec3 {
    let (dx, dy) = unproject(&offset);
    Vec3::new(
        (position.x as f32 + dx) * TILE_SIZE,
        (position.z as f32 + offset.z) * HEIGHT_SCALE,
        (position.y as f32 + dy) * TILE_SIZE,
    )
}

/// Yaw that points a model's -Z forward along `facing`.
pub fn facing_rotation(facing: Facing) -> Quat {
    let (dx, dy) = facing.offset();
    Quat::from_rotation_y((-dx as f32).atan2(-dy as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn full_pixel_offsets_land_on_the_neighbor_tile() {
        let origin = Position::new(10, 10, 0);
        for facing in Facing::ALL {
            let (dx, dy) = facing.offset();
            let (px, py) = ((dx - dy) as f32 * 22.0, (dx + dy) as f32 * 22.0);
            let world = tile_to_world(origin, na::Vector3::new(px, py, 0.0));
            assert!(
                approx(world, Vec3::new(10.0 + dx as f32, 0.0, 10.0 + dy as f32)),
                "{facing:?}: {world:?}"
            );
        }
    }

    #[test]
    fn heights_scale_onto_y() {
        let world = tile_to_world(Position::new(0, 0, 20), na::Vector3::new(0.0, 0.0, -5.0));
        assert!(approx(world, Vec3::new(0.0, 1.5, 0.0)));
    }

    #[test]
    fn facing_north_looks_down_negative_z() {
        let forward = facing_rotation(Facing::North) * Vec3::NEG_Z;
        assert!(approx(forward, Vec3::NEG_Z));
        let forward = facing_rotation(Facing::East) * Vec3::NEG_Z;
        assert!(approx(forward, Vec3::X));
        let forward = facing_rotation(Facing::South) * Vec3::NEG_Z;
        assert!(approx(forward, Vec3::Z));
    }
}
