use bevy::prelude::*;
use shared::Moveable;

use super::{ActorEntityMapping, RemoteActor, spawn_body};
use crate::{movement::Mobile, net::MobileUpdate};

/// Queue authoritative steps for known mobiles and spawn the ones seen for the first
/// time.
pub(super) fn on_mobile_update(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut updates: MessageReader<MobileUpdate>,
    mut mapping: ResMut<ActorEntityMapping>,
    mut mobiles: Query<&mut Mobile, With<RemoteActor>>,
) {
    // Mobiles first seen this frame; later updates for them queue up before spawning.
    let mut fresh: Vec<(u32, Moveable)> = Vec::new();

    for update in updates.read() {
        if let Some(mut mobile) = mapping
            .0
            .get(&update.id)
            .and_then(|entity| mobiles.get_mut(*entity).ok())
        {
            mobile.kind = update.kind;
            mobile.intake_remote_step(update.position, update.direction);
        } else if let Some((_, moveable)) = fresh.iter_mut().find(|(id, _)| *id == update.id) {
            moveable.kind = update.kind;
            moveable.intake_remote_step(update.position, update.direction);
        } else {
            debug!(
                "mobile {} appears at ({}, {}, {})",
                update.id, update.position.x, update.position.y, update.position.z
            );
            fresh.push((
                update.id,
                Moveable::remote(update.position, update.direction, update.kind),
            ));
        }
    }

    for (id, moveable) in fresh {
        let entity = spawn_body(
            &mut commands,
            &mut meshes,
            &mut materials,
            Color::linear_rgb(0.9, 0.2, 0.2),
            moveable,
        );
        commands.entity(entity).insert(RemoteActor { id });
        if let Some(stale) = mapping.0.insert(id, entity) {
            commands.entity(stale).despawn();
        }
    }
}
