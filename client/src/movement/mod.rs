mod transform;

use bevy::prelude::*;
use shared::{Moveable, StandardMovementSpeed};

pub use transform::{HEIGHT_SCALE, facing_rotation, tile_to_world};

/// Frame phases for everything that walks. Inbound server traffic is applied first so
/// prediction builds on corrected state, and rendering reads the freshly advanced queues.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementSet {
    Receive,
    Predict,
    Advance,
    Render,
}

/// Movement state of a walking entity, local or remote.
#[derive(Component, Deref, DerefMut, Debug)]
pub struct Mobile(pub Moveable);

/// Speed table shared by prediction, playback and the loopback server.
#[derive(Resource, Default, Deref)]
pub struct MovementSpeeds(pub StandardMovementSpeed);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<MovementSpeeds>();
    app.configure_sets(
        Update,
        (
            MovementSet::Receive,
            MovementSet::Predict,
            MovementSet::Advance,
            MovementSet::Render,
        )
            .chain(),
    );
    app.add_systems(Update, advance.in_set(MovementSet::Advance));
    app.add_systems(Update, project.in_set(MovementSet::Render));
}

fn advance(time: Res<Time>, speeds: Res<MovementSpeeds>, mut mobiles: Query<&mut Mobile>) {
    let dt = time.delta();
    for mut mobile in &mut mobiles {
        let committed = mobile.advance(dt, &speeds.0);
        for step in committed {
            trace!(
                "committed ({}, {}, {}) facing {:?}",
                step.position.x, step.position.y, step.position.z, step.direction.facing
            );
        }
    }
}

/// Drive the render transform from committed position plus the step offset.
///
/// The offset already interpolates within a step, so translation is set directly.
/// Rotation is smoothed since turns commit instantly.
fn project(time: Res<Time>, mut query: Query<(&mut Transform, &Mobile)>) {
    let dt = time.delta_secs();
    query.par_iter_mut().for_each(|(mut transform, mobile)| {
        transform.translation = tile_to_world(mobile.position(), mobile.steps.offset());
        transform.rotation = transform.rotation.slerp(
            facing_rotation(mobile.direction().facing),
            1.0 - (-24.0 * dt).exp(),
        );
    });
}
