/*!
Walk traffic between the movement engine and the network collaborator.

The engine never touches a socket. Outbound requests go through [`WalkSink`];
inbound acknowledgments arrive as [`WalkConfirm`] / [`WalkDeny`] values that the
transport has already marshaled onto the update tick.

Byte layouts (multi-byte integers big-endian):
- walk request: `[direction, sequence]`
- walk confirm: `[sequence]`
- walk deny:    `[sequence, x_hi, x_lo, y_hi, y_lo, direction, z]`
*/

use thiserror::Error;

use crate::{direction::Direction, position::Position};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("{kind} message needs {expected} bytes, got {got}")]
    Length {
        kind: &'static str,
        expected: usize,
        got: usize,
    },
}

fn exact<const N: usize>(kind: &'static str, bytes: &[u8]) -> Result<[u8; N], WireError> {
    bytes.try_into().map_err(|_| WireError::Length {
        kind,
        expected: N,
        got: bytes.len(),
    })
}

/// A speculative walk sent to the server.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WalkRequest {
    pub direction: Direction,
    pub sequence: u8,
}

impl WalkRequest {
    pub fn to_bytes(&self) -> [u8; 2] {
        [self.direction.to_wire(), self.sequence]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let [direction, sequence] = exact::<2>("walk request", bytes)?;
        Ok(Self {
            direction: Direction::from_wire(direction),
            sequence,
        })
    }
}

/// The server accepted the request with this sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WalkConfirm {
    pub sequence: u8,
}

impl WalkConfirm {
    pub fn to_bytes(&self) -> [u8; 1] {
        [self.sequence]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let [sequence] = exact::<1>("walk confirm", bytes)?;
        Ok(Self { sequence })
    }
}

/// The server refused the request with this sequence and reports where the entity
/// really is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WalkDeny {
    pub sequence: u8,
    pub position: Position,
    pub direction: Direction,
}

impl WalkDeny {
    pub fn to_bytes(&self) -> [u8; 7] {
        let [x_hi, x_lo] = self.position.x.to_be_bytes();
        let [y_hi, y_lo] = self.position.y.to_be_bytes();
        [
            self.sequence,
            x_hi,
            x_lo,
            y_hi,
            y_lo,
            self.direction.to_wire(),
            self.position.z as u8,
        ]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let [sequence, x_hi, x_lo, y_hi, y_lo, direction, z] = exact::<7>("walk deny", bytes)?;
        Ok(Self {
            sequence,
            position: Position::new(
                u16::from_be_bytes([x_hi, x_lo]),
                u16::from_be_bytes([y_hi, y_lo]),
                z as i8,
            ),
            direction: Direction::from_wire(direction),
        })
    }
}

/// Outbound side of the network collaborator.
pub trait WalkSink {
    fn send_walk_request(&mut self, request: WalkRequest);

    /// Ask the server for a full position resync.
    fn send_resync(&mut self);
}

/// Recorded outbound traffic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    Walk(WalkRequest),
    Resync,
}

impl WalkSink for Vec<Outbound> {
    fn send_walk_request(&mut self, request: WalkRequest) {
        self.push(Outbound::Walk(request));
    }

    fn send_resync(&mut self) {
        self.push(Outbound::Resync);
    }
}
