use bevy::prelude::*;
use shared::{Direction, Facing, MoverKind, Moveable, Position, PredictorSettings};

use crate::{
    actor::spawn_body,
    movement::MovementSet,
    net::NetSettings,
};

mod input;
mod replication;

/// Where the local player enters the world.
pub const PLAYER_SPAWN: Position = Position::new(12, 20, 0);

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_local_player);

    app.add_systems(
        Update,
        (
            replication::apply_walk_verdicts.in_set(MovementSet::Receive),
            (input::walk_from_input, input::expire_lost_walks)
                .chain()
                .in_set(MovementSet::Predict),
        ),
    );
}

#[derive(Component)]
pub struct LocalPlayer;

fn spawn_local_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    net: Res<NetSettings>,
) {
    let settings = PredictorSettings {
        ack_timeout: net.ack_timeout,
        ..default()
    };
    let moveable = Moveable::local(
        PLAYER_SPAWN,
        Direction::walking(Facing::South),
        MoverKind::OnFoot,
        settings,
    );
    let entity = spawn_body(
        &mut commands,
        &mut meshes,
        &mut materials,
        Color::linear_rgb(0.2, 0.9, 0.8),
        moveable,
    );
    commands
        .entity(entity)
        .insert((Name::new("LocalPlayer"), LocalPlayer));
}
