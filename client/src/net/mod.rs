//! Walk traffic between the client and a stand-in server.
//!
//! The movement engine talks to the network only through [`shared::WalkSink`] and the
//! inbound messages below. The transport behind them is a loopback server
//! ([`loopback`]) that re-validates every walk with the same collision rules after a
//! configurable latency, which is enough to exercise prediction and rollback.

mod loopback;
mod settings;

use bevy::prelude::*;
use shared::{
    Direction, MoverKind, Outbound, Position, WalkConfirm, WalkDeny, WalkRequest, WalkSink,
};

pub use settings::NetSettings;

/// Client-to-server walk traffic, written by the predictor.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundWalk(pub Outbound);

/// Server verdicts for the local player.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundWalk {
    Confirm(WalkConfirm),
    Deny(WalkDeny),
    /// Full position update answering a resync request.
    Resync {
        position: Position,
        direction: Direction,
    },
}

/// Authoritative state of a remote mobile.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobileUpdate {
    pub id: u32,
    pub position: Position,
    pub direction: Direction,
    pub kind: MoverKind,
}

/// Adapts a message writer to the engine's outbound collaborator.
pub struct MessageSink<'a, 'w>(pub &'a mut MessageWriter<'w, OutboundWalk>);

impl WalkSink for MessageSink<'_, '_> {
    fn send_walk_request(&mut self, request: WalkRequest) {
        self.0.write(OutboundWalk(Outbound::Walk(request)));
    }

    fn send_resync(&mut self) {
        self.0.write(OutboundWalk(Outbound::Resync));
    }
}

pub(super) fn plugin(app: &mut App) {
    let settings = NetSettings::from_cli_env();
    info!(
        "loopback transport: {:?} one-way latency, {:?} ack timeout",
        settings.latency, settings.ack_timeout
    );
    app.insert_resource(settings);

    app.add_message::<OutboundWalk>();
    app.add_message::<InboundWalk>();
    app.add_message::<MobileUpdate>();

    app.add_plugins(loopback::plugin);
}
