use bevy::prelude::*;
use nalgebra as na;
use shared::{LandTile, MapError, Position, TileColumn, TileFlag, TileGrid, TileObject, TileSource};

use crate::movement::{HEIGHT_SCALE, tile_to_world};

const MAP_SIZE: u16 = 48;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, (load_world, spawn_scenery).chain());
}

/// The tile index every walker resolves against, client and loopback server alike.
#[derive(Resource, Deref)]
pub struct WorldMap(pub TileGrid);

impl TileSource for WorldMap {
    fn tile(&self, x: u16, y: u16) -> Option<&TileColumn> {
        self.0.tile(x, y)
    }
}

fn load_world(mut commands: Commands) -> Result {
    let grid = demo_map()?;
    info!("world loaded: {}x{} tiles", grid.width(), grid.height());
    commands.insert_resource(WorldMap(grid));
    Ok(())
}

/// A small test ground: a walled house with a door, a staircase onto a platform,
/// a pond, and two pillars that close a diagonal.
fn demo_map() -> Result<TileGrid, MapError> {
    let mut grid = TileGrid::flat(MAP_SIZE, MAP_SIZE, 0)?;
    let wall = TileObject::fixed(0, 20, &[TileFlag::Impassable]);

    // House, door on the south side.
    for x in 8..=16 {
        for y in [8, 14] {
            if (x, y) != (12, 14) {
                grid.push_object(x, y, wall)?;
            }
        }
    }
    for y in 9..14 {
        grid.push_object(8, y, wall)?;
        grid.push_object(16, y, wall)?;
    }
    grid.push_object(
        12,
        14,
        TileObject::item(0, 20, &[TileFlag::Door, TileFlag::Impassable]),
    )?;

    // Stairs climbing east onto a raised platform.
    for (i, x) in (24..28).enumerate() {
        let z = 2 * i as i32;
        grid.push_object(x, 10, TileObject::fixed(z, 2, &[TileFlag::Surface]))?;
    }
    for x in 28..=31 {
        for y in 8..=12 {
            grid.push_object(x, y, TileObject::fixed(0, 8, &[TileFlag::Surface]))?;
        }
    }

    for x in 30..=33 {
        for y in 36..=40 {
            grid.set_land(x, y, LandTile::impassable(0))?;
        }
    }

    grid.push_object(18, 32, wall)?;
    grid.push_object(19, 33, wall)?;

    Ok(grid)
}

fn spawn_scenery(
    mut commands: Commands,
    map: Res<WorldMap>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let size = f32::from(MAP_SIZE);
    let centre = (size - 1.0) / 2.0;
    commands.spawn((
        Name::new("Ground"),
        Transform::from_xyz(centre, 0.0, centre),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(size, size).build())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgb(0.2, 0.3, 0.25),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        })),
    ));

    let tile = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    let water = materials.add(Color::srgb_u8(40, 90, 160));
    let stone = materials.add(Color::srgb_u8(124, 124, 132));
    let wood = materials.add(Color::srgb_u8(120, 80, 40));
    let floor = materials.add(Color::srgb_u8(200, 170, 120));

    for ((x, y), column) in map.iter() {
        let base = tile_to_world(Position::new(x, y, 0), na::Vector3::zeros());
        if column.land.impassable {
            commands.spawn((
                Mesh3d(tile.clone()),
                MeshMaterial3d(water.clone()),
                Transform::from_translation(base + Vec3::Y * 0.01)
                    .with_scale(Vec3::new(1.0, 0.02, 1.0)),
            ));
        }
        for object in &column.objects {
            let material = if object.is_door() {
                &wood
            } else if object.flags.contains(TileFlag::Impassable) {
                &stone
            } else {
                &floor
            };
            let bottom = HEIGHT_SCALE * object.z as f32;
            let height = HEIGHT_SCALE * object.height as f32;
            commands.spawn((
                Mesh3d(tile.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(base + Vec3::Y * (bottom + height / 2.0))
                    .with_scale(Vec3::new(1.0, height, 1.0)),
            ));
        }
    }

    // light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(centre, 30.0, centre + 10.0)
            .looking_at(Vec3::new(centre, 0.0, centre), Vec3::Y),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Facing, Mover, TileCollisionResolver};

    #[test]
    fn house_is_closed_except_for_the_door() {
        let map = WorldMap(demo_map().unwrap());
        let resolver = TileCollisionResolver::new(&map);
        let inside = Position::new(12, 13, 0);

        assert_eq!(resolver.check_movement(Mover::new(inside), Facing::South), None);
        assert_eq!(
            resolver.check_movement(Mover::ghost(inside), Facing::South),
            Some(0)
        );
        assert_eq!(
            resolver.check_movement(Mover::new(Position::new(9, 13, 0)), Facing::West),
            None
        );
    }

    #[test]
    fn stairs_lead_onto_the_platform() {
        let map = WorldMap(demo_map().unwrap());
        let resolver = TileCollisionResolver::new(&map);
        let mut at = Position::new(23, 10, 0);
        for _ in 0..5 {
            at = resolver
                .get_next_tile(Mover::new(at), Facing::East)
                .unwrap()
                .position;
        }
        assert_eq!(at, Position::new(28, 10, 8));
    }

    #[test]
    fn pillars_close_the_diagonal() {
        let map = WorldMap(demo_map().unwrap());
        let resolver = TileCollisionResolver::new(&map);
        let mover = Mover::new(Position::new(18, 33, 0));
        assert_eq!(resolver.check_movement(mover, Facing::NorthEast), None);
    }
}
