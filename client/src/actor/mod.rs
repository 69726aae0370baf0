mod replication;

use bevy::{platform::collections::HashMap, prelude::*};
use shared::Moveable;

use crate::movement::{Mobile, MovementSet, facing_rotation, tile_to_world};

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(ActorEntityMapping::default());
    app.add_systems(
        Update,
        replication::on_mobile_update.in_set(MovementSet::Receive),
    );
}

/// Ties the server's mobile id to the local bevy entity.
#[derive(Resource, Default)]
pub struct ActorEntityMapping(pub HashMap<u32, Entity>);

/// A mobile whose movement is decided by the server.
#[derive(Component, Debug)]
pub struct RemoteActor {
    pub id: u32,
}

const BODY_RADIUS: f32 = 0.35;
const BODY_HALF_LENGTH: f32 = 0.45;

/// Spawn a walking body at the mobile's current tile, with eyes on its forward side
/// so the facing reads at a glance.
pub fn spawn_body(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    base_color: Color,
    moveable: Moveable,
) -> Entity {
    let translation = tile_to_world(moveable.position(), moveable.steps.offset());
    let rotation = facing_rotation(moveable.direction().facing);

    let mut entity_commands = commands.spawn((
        Mesh3d(meshes.add(Mesh::from(Capsule3d {
            radius: BODY_RADIUS,
            half_length: BODY_HALF_LENGTH,
        }))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color,
            ..default()
        })),
        Transform {
            translation,
            rotation,
            scale: Vec3::ONE,
        },
        Mobile(moveable),
    ));

    entity_commands.with_children(|parent| {
        let eye_mesh = meshes.add(Mesh::from(Sphere { radius: 0.1 }));
        let eye_mat = materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 1.0, 1.0),
            ..default()
        });

        let x = 0.15;
        let y = BODY_RADIUS + BODY_HALF_LENGTH + 0.1;
        let z = -BODY_RADIUS;

        parent.spawn((
            Name::new("LeftEye"),
            Mesh3d(eye_mesh.clone()),
            MeshMaterial3d(eye_mat.clone()),
            Transform::from_translation(Vec3::new(-x, y, z)),
        ));
        parent.spawn((
            Name::new("RightEye"),
            Mesh3d(eye_mesh),
            MeshMaterial3d(eye_mat),
            Transform::from_translation(Vec3::new(x, y, z)),
        ));
    });

    entity_commands.id()
}
