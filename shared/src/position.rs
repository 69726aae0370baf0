use crate::direction::Facing;

/// A tile coordinate plus height.
///
/// Map coordinates are non-negative (`u16`, as on the wire); the height is a signed
/// byte. Equality compares all three fields.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: u16,
    pub y: u16,
    pub z: i8,
}

impl Position {
    pub const fn new(x: u16, y: u16, z: i8) -> Self {
        Self { x, y, z }
    }

    /// Same tile, different height.
    pub fn with_z(self, z: i8) -> Self {
        Self { z, ..self }
    }

    /// Whether two positions share a tile, ignoring height.
    #[inline]
    pub fn same_tile(self, other: Position) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// The neighboring tile coordinate in `facing`, or `None` past the map edge.
    pub fn neighbor(self, facing: Facing) -> Option<(u16, u16)> {
        let (dx, dy) = facing.offset();
        let x = u16::try_from(self.x as i32 + dx).ok()?;
        let y = u16::try_from(self.y as i32 + dy).ok()?;
        Some((x, y))
    }

    /// Facing of the step from `self` to `other`, or `None` when on the same tile.
    pub fn facing_to(self, other: Position) -> Option<Facing> {
        Facing::between(
            self.x as i32,
            self.y as i32,
            other.x as i32,
            other.y as i32,
        )
    }
}
