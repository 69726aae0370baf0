use bevy::prelude::*;

use super::LocalPlayer;
use crate::{movement::Mobile, net::InboundWalk};

/// Apply the server's answers to our predicted walks.
pub(super) fn apply_walk_verdicts(
    mut verdicts: MessageReader<InboundWalk>,
    mut player: Single<&mut Mobile, With<LocalPlayer>>,
) {
    for verdict in verdicts.read() {
        match *verdict {
            InboundWalk::Confirm(confirm) => {
                player.confirm_walk(confirm.sequence);
            }
            InboundWalk::Deny(deny) => {
                if player.deny_walk(deny.sequence, deny.position, deny.direction) {
                    info!(
                        "walk #{} denied, corrected to ({}, {}, {})",
                        deny.sequence, deny.position.x, deny.position.y, deny.position.z
                    );
                }
            }
            InboundWalk::Resync {
                position,
                direction,
            } => {
                debug!(
                    "resynced to ({}, {}, {})",
                    position.x, position.y, position.z
                );
                player.force_position(position, direction);
            }
        }
    }
}
