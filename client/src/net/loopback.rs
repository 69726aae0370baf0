//! In-process stand-in for the game server.
//!
//! Packets are serialized to their wire bytes and held back for the configured
//! latency in each direction. The server keeps its own copy of the player's position,
//! validates each walk in arrival order, and answers with a confirm or a deny carrying
//! its state. A few server-driven mobiles patrol fixed routes so remote playback has
//! something to show.

use std::{collections::VecDeque, time::Duration};

use bevy::prelude::*;
use shared::{
    Direction, Facing, Mover, MoverKind, MovementSpeed, Outbound, Position, SEQUENCE_NONE,
    TURN_DELAY, TileCollisionResolver, WalkConfirm, WalkDeny, WalkRequest, WireError,
    next_sequence,
};

use super::{InboundWalk, MobileUpdate, NetSettings, OutboundWalk};
use crate::{
    movement::MovementSpeeds,
    player::PLAYER_SPAWN,
    world::WorldMap,
};

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(LoopbackServer::new(
        PLAYER_SPAWN,
        Direction::walking(Facing::South),
        patrols(),
    ));
    app.add_systems(PreUpdate, deliver);
    app.add_systems(PostUpdate, (receive, serve).chain());
}

enum ServerBound {
    Walk([u8; 2]),
    Resync,
}

enum ClientBound {
    Confirm([u8; 1]),
    Deny([u8; 7]),
    Resync {
        position: Position,
        direction: Direction,
    },
    Mobile(MobileUpdate),
}

struct InFlight<T> {
    arrives_at: Duration,
    packet: T,
}

/// Server copy of a walking entity.
struct ServerMobile {
    position: Position,
    direction: Direction,
}

impl ServerMobile {
    /// Apply a walk the way the server does: same facing moves (if the resolver
    /// allows), another facing turns. Returns `false` when the move is blocked.
    fn walk(&mut self, resolver: &TileCollisionResolver<'_, WorldMap>, request: Direction) -> bool {
        if !request.same_facing(self.direction) {
            self.direction = request;
            return true;
        }
        let Some(z) = resolver.check_movement(Mover::new(self.position), request.facing) else {
            return false;
        };
        let Some((x, y)) = self.position.neighbor(request.facing) else {
            return false;
        };
        self.position = Position::new(x, y, z);
        self.direction = request;
        true
    }
}

/// A server-driven mobile walking a closed route of `(facing, tiles)` legs.
struct Patrol {
    id: u32,
    kind: MoverKind,
    body: ServerMobile,
    route: &'static [(Facing, u8)],
    leg: usize,
    walked: u8,
    next_move_at: Duration,
}

fn patrols() -> Vec<Patrol> {
    const SQUARE: &[(Facing, u8)] = &[
        (Facing::East, 6),
        (Facing::South, 6),
        (Facing::West, 6),
        (Facing::North, 6),
    ];
    const DIAMOND: &[(Facing, u8)] = &[
        (Facing::NorthEast, 4),
        (Facing::SouthEast, 4),
        (Facing::SouthWest, 4),
        (Facing::NorthWest, 4),
    ];
    [
        (1, MoverKind::OnFoot, Position::new(20, 20, 0), SQUARE),
        (2, MoverKind::Mounted, Position::new(36, 30, 0), DIAMOND),
    ]
    .into_iter()
    .map(|(id, kind, position, route)| Patrol {
        id,
        kind,
        body: ServerMobile {
            position,
            direction: Direction::walking(route[0].0),
        },
        route,
        leg: 0,
        walked: 0,
        next_move_at: Duration::ZERO,
    })
    .collect()
}

#[derive(Resource)]
pub struct LoopbackServer {
    player: ServerMobile,
    last_sequence: u8,
    patrols: Vec<Patrol>,
    introduced: bool,
    to_server: VecDeque<InFlight<ServerBound>>,
    to_client: VecDeque<InFlight<ClientBound>>,
}

impl LoopbackServer {
    fn new(spawn: Position, direction: Direction, patrols: Vec<Patrol>) -> Self {
        Self {
            player: ServerMobile {
                position: spawn,
                direction,
            },
            last_sequence: SEQUENCE_NONE,
            patrols,
            introduced: false,
            to_server: VecDeque::new(),
            to_client: VecDeque::new(),
        }
    }

    fn reply(&mut self, arrives_at: Duration, packet: ClientBound) {
        self.to_client.push_back(InFlight { arrives_at, packet });
    }

    fn handle_walk(
        &mut self,
        resolver: &TileCollisionResolver<'_, WorldMap>,
        bytes: [u8; 2],
    ) -> Result<ClientBound, WireError> {
        let request = WalkRequest::from_bytes(&bytes)?;

        let in_order = request.sequence == next_sequence(self.last_sequence);
        if in_order && self.player.walk(resolver, request.direction) {
            self.last_sequence = request.sequence;
            return Ok(ClientBound::Confirm(
                WalkConfirm {
                    sequence: request.sequence,
                }
                .to_bytes(),
            ));
        }

        if in_order {
            debug!("server: walk #{} blocked", request.sequence);
        } else {
            debug!(
                "server: walk #{} out of order (expected #{})",
                request.sequence,
                next_sequence(self.last_sequence)
            );
        }
        // The client drops its sequence on denial; start over.
        self.last_sequence = SEQUENCE_NONE;
        Ok(ClientBound::Deny(
            WalkDeny {
                sequence: request.sequence,
                position: self.player.position,
                direction: self.player.direction,
            }
            .to_bytes(),
        ))
    }

    fn tick_patrols(
        &mut self,
        resolver: &TileCollisionResolver<'_, WorldMap>,
        speeds: &MovementSpeeds,
        now: Duration,
        reply_at: Duration,
    ) {
        let mut updates = Vec::new();
        for patrol in self.patrols.iter_mut().filter(|p| now >= p.next_move_at) {
            let (facing, length) = patrol.route[patrol.leg];
            let request = Direction::walking(facing);
            let turning = !request.same_facing(patrol.body.direction);

            if !patrol.body.walk(resolver, request) {
                // Skip a blocked leg rather than stall.
                patrol.leg = (patrol.leg + 1) % patrol.route.len();
                patrol.walked = 0;
                patrol.next_move_at = now + TURN_DELAY;
                continue;
            }

            patrol.next_move_at = now
                + if turning {
                    TURN_DELAY
                } else {
                    patrol.walked += 1;
                    speeds.time_to_complete_movement(patrol.kind, false)
                };
            if patrol.walked >= length {
                patrol.leg = (patrol.leg + 1) % patrol.route.len();
                patrol.walked = 0;
            }

            updates.push(MobileUpdate {
                id: patrol.id,
                position: patrol.body.position,
                direction: patrol.body.direction,
                kind: patrol.kind,
            });
        }
        for update in updates {
            self.reply(reply_at, ClientBound::Mobile(update));
        }
    }

    fn introduce(&mut self, reply_at: Duration) {
        let intros: Vec<_> = self
            .patrols
            .iter()
            .map(|p| MobileUpdate {
                id: p.id,
                position: p.body.position,
                direction: p.body.direction,
                kind: p.kind,
            })
            .collect();
        for intro in intros {
            self.reply(reply_at, ClientBound::Mobile(intro));
        }
        self.introduced = true;
    }
}

/// Put outbound client packets on the wire.
fn receive(
    time: Res<Time>,
    settings: Res<NetSettings>,
    mut server: ResMut<LoopbackServer>,
    mut outbound: MessageReader<OutboundWalk>,
) {
    let arrives_at = time.elapsed() + settings.latency;
    for OutboundWalk(packet) in outbound.read() {
        let packet = match packet {
            Outbound::Walk(request) => ServerBound::Walk(request.to_bytes()),
            Outbound::Resync => ServerBound::Resync,
        };
        server.to_server.push_back(InFlight { arrives_at, packet });
    }
}

/// Process everything that has reached the server and move the patrols.
fn serve(
    time: Res<Time>,
    settings: Res<NetSettings>,
    map: Res<WorldMap>,
    speeds: Res<MovementSpeeds>,
    mut server: ResMut<LoopbackServer>,
) {
    let now = time.elapsed();
    let reply_at = now + settings.latency;
    let resolver = TileCollisionResolver::new(&*map);

    if !server.introduced {
        server.introduce(reply_at);
    }

    while server
        .to_server
        .front()
        .is_some_and(|p| p.arrives_at <= now)
    {
        let Some(InFlight { packet, .. }) = server.to_server.pop_front() else {
            break;
        };
        let reply = match packet {
            ServerBound::Walk(bytes) => match server.handle_walk(&resolver, bytes) {
                Ok(reply) => reply,
                Err(err) => {
                    error!("server: dropping malformed walk request: {err}");
                    continue;
                }
            },
            ServerBound::Resync => {
                server.last_sequence = SEQUENCE_NONE;
                ClientBound::Resync {
                    position: server.player.position,
                    direction: server.player.direction,
                }
            }
        };
        server.reply(reply_at, reply);
    }

    server.tick_patrols(&resolver, &speeds, now, reply_at);
}

/// Hand packets that have reached the client to the movement systems.
fn deliver(
    time: Res<Time>,
    mut server: ResMut<LoopbackServer>,
    mut walks: MessageWriter<InboundWalk>,
    mut mobiles: MessageWriter<MobileUpdate>,
) {
    let now = time.elapsed();
    while server
        .to_client
        .front()
        .is_some_and(|p| p.arrives_at <= now)
    {
        let Some(InFlight { packet, .. }) = server.to_client.pop_front() else {
            break;
        };
        let decoded = match packet {
            ClientBound::Confirm(bytes) => WalkConfirm::from_bytes(&bytes).map(InboundWalk::Confirm),
            ClientBound::Deny(bytes) => WalkDeny::from_bytes(&bytes).map(InboundWalk::Deny),
            ClientBound::Resync {
                position,
                direction,
            } => Ok(InboundWalk::Resync {
                position,
                direction,
            }),
            ClientBound::Mobile(update) => {
                mobiles.write(update);
                continue;
            }
        };
        match decoded {
            Ok(message) => {
                walks.write(message);
            }
            Err(err) => error!("client: dropping malformed walk reply: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{TileFlag, TileGrid, TileObject};

    fn server_on(grid: &TileGrid) -> (LoopbackServer, WorldMap) {
        (
            LoopbackServer::new(
                Position::new(5, 5, 0),
                Direction::walking(Facing::East),
                Vec::new(),
            ),
            WorldMap(grid.clone()),
        )
    }

    fn walk(sequence: u8, facing: Facing) -> [u8; 2] {
        WalkRequest {
            direction: Direction::walking(facing),
            sequence,
        }
        .to_bytes()
    }

    #[test]
    fn in_order_walks_are_confirmed_and_applied() {
        let grid = TileGrid::new(10, 10).unwrap();
        let (mut server, map) = server_on(&grid);
        let resolver = TileCollisionResolver::new(&map);

        let reply = server.handle_walk(&resolver, walk(1, Facing::East)).unwrap();
        assert!(matches!(reply, ClientBound::Confirm([1])));
        assert_eq!(server.player.position, Position::new(6, 5, 0));

        let reply = server.handle_walk(&resolver, walk(2, Facing::South)).unwrap();
        assert!(matches!(reply, ClientBound::Confirm([2])));
        assert_eq!(server.player.position, Position::new(6, 5, 0));
        assert_eq!(server.player.direction.facing, Facing::South);
    }

    #[test]
    fn blocked_walk_is_denied_with_server_state() {
        let mut grid = TileGrid::new(10, 10).unwrap();
        grid.push_object(6, 5, TileObject::fixed(0, 30, &[TileFlag::Impassable]))
            .unwrap();
        let (mut server, map) = server_on(&grid);
        let resolver = TileCollisionResolver::new(&map);

        let ClientBound::Deny(bytes) = server.handle_walk(&resolver, walk(1, Facing::East)).unwrap()
        else {
            panic!("expected a deny");
        };
        let deny = WalkDeny::from_bytes(&bytes).unwrap();
        assert_eq!(deny.sequence, 1);
        assert_eq!(deny.position, Position::new(5, 5, 0));
        assert_eq!(server.last_sequence, SEQUENCE_NONE);
    }

    #[test]
    fn out_of_order_walks_are_denied_and_restart_the_sequence() {
        let grid = TileGrid::new(10, 10).unwrap();
        let (mut server, map) = server_on(&grid);
        let resolver = TileCollisionResolver::new(&map);

        assert!(matches!(
            server.handle_walk(&resolver, walk(3, Facing::East)).unwrap(),
            ClientBound::Deny(_)
        ));
        assert_eq!(server.player.position, Position::new(5, 5, 0));
        assert!(matches!(
            server.handle_walk(&resolver, walk(1, Facing::East)).unwrap(),
            ClientBound::Confirm([1])
        ));
    }
}
