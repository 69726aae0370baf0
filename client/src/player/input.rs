use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;
use shared::WalkContext;

use super::LocalPlayer;
use crate::{
    input::{InputAction, walk_intent},
    movement::{Mobile, MovementSpeeds},
    net::{MessageSink, OutboundWalk},
    world::WorldMap,
};

/// Predict a walk every frame the movement input is held. The predictor's own guard
/// decides when the next request may actually go out.
pub(super) fn walk_from_input(
    actions: Res<ActionState<InputAction>>,
    time: Res<Time>,
    map: Res<WorldMap>,
    speeds: Res<MovementSpeeds>,
    mut player: Single<&mut Mobile, With<LocalPlayer>>,
    mut outbound: MessageWriter<OutboundWalk>,
) {
    let Some(request) = walk_intent(&actions) else {
        return;
    };
    let ctx = WalkContext {
        map: &*map,
        speed: &speeds.0,
        now: time.elapsed(),
    };
    player.request_walk(request, &ctx, &mut MessageSink(&mut outbound));
}

/// Give up on requests the server never answered.
pub(super) fn expire_lost_walks(
    time: Res<Time>,
    mut player: Single<&mut Mobile, With<LocalPlayer>>,
    mut outbound: MessageWriter<OutboundWalk>,
) {
    if player.poll_timeout(time.elapsed(), &mut MessageSink(&mut outbound)) {
        warn!("walk acknowledgments timed out, requested a resync");
    }
}
