//! Compass facings and the running bit.
//!
//! # Model
//! - Eight facings, numbered clockwise from North. The numeric values are the protocol
//!   values; do not reorder.
//! - Odd facings are diagonals.
//! - The running bit is independent of the facing. Comparisons between directions should
//!   compare [`Direction::facing`] so a running step and a walking step toward the same
//!   tile are treated as the same heading.
//!
//! # Wire
//! One byte: bits 0..=2 hold the facing, bit 7 is set when running. Bits 3..=6 are
//! ignored on read and written as zero.

/// Running flag in the packed direction byte.
pub const RUNNING_BIT: u8 = 0x80;

/// Mask selecting the facing bits of a packed direction byte.
pub const FACING_MASK: u8 = 0x07;

/// One of the eight compass facings.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    #[default]
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Facing {
    pub const ALL: [Facing; 8] = [
        Facing::North,
        Facing::NorthEast,
        Facing::East,
        Facing::SouthEast,
        Facing::South,
        Facing::SouthWest,
        Facing::West,
        Facing::NorthWest,
    ];

    /// Facing from the low three bits of `value`.
    pub fn from_bits(value: u8) -> Self {
        Self::ALL[(value & FACING_MASK) as usize]
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        self.bits() & 1 == 1
    }

    /// Rotate clockwise by `steps` eighths of a turn (negative rotates counter-clockwise).
    pub fn rotate(self, steps: i8) -> Self {
        Self::from_bits((self.bits() as i8).wrapping_add(steps) as u8)
    }

    /// Unit tile offset `(dx, dy)`; +y is South.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::NorthEast => (1, -1),
            Facing::East => (1, 0),
            Facing::SouthEast => (1, 1),
            Facing::South => (0, 1),
            Facing::SouthWest => (-1, 1),
            Facing::West => (-1, 0),
            Facing::NorthWest => (-1, -1),
        }
    }

    /// The two orthogonal facings on either side of a diagonal, counter-clockwise first.
    ///
    /// Returns `None` for orthogonal facings, which have no corner to cut.
    pub fn flanks(self) -> Option<(Facing, Facing)> {
        self.is_diagonal()
            .then(|| (self.rotate(-1), self.rotate(1)))
    }

    /// Facing of the tile delta from `(x0, y0)` to `(x1, y1)`, or `None` if they coincide.
    ///
    /// Only the sign of each axis matters, so a multi-tile delta reports the heading the
    /// first step would take.
    pub fn between(x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Self> {
        let dx = (x1 - x0).signum();
        let dy = (y1 - y0).signum();
        Self::ALL
            .into_iter()
            .find(|facing| facing.offset() == (dx, dy))
    }
}

/// A facing plus the running bit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Direction {
    pub facing: Facing,
    pub running: bool,
}

impl Direction {
    pub const fn walking(facing: Facing) -> Self {
        Self {
            facing,
            running: false,
        }
    }

    pub const fn new(facing: Facing, running: bool) -> Self {
        Self { facing, running }
    }

    /// Same facing, running bit replaced.
    pub fn with_running(self, running: bool) -> Self {
        Self { running, ..self }
    }

    /// Whether two directions share a facing, ignoring the running bit.
    #[inline]
    pub fn same_facing(self, other: Direction) -> bool {
        self.facing == other.facing
    }

    /// Pack into the protocol byte.
    pub fn to_wire(self) -> u8 {
        let run = if self.running { RUNNING_BIT } else { 0 };
        self.facing.bits() | run
    }

    /// Unpack from the protocol byte. Reserved bits are ignored.
    pub fn from_wire(value: u8) -> Self {
        Self {
            facing: Facing::from_bits(value),
            running: value & RUNNING_BIT != 0,
        }
    }
}

impl From<Facing> for Direction {
    fn from(facing: Facing) -> Self {
        Direction::walking(facing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonals_are_the_odd_facings() {
        let diagonals: Vec<_> = Facing::ALL.into_iter().filter(|f| f.is_diagonal()).collect();
        assert_eq!(
            diagonals,
            vec![
                Facing::NorthEast,
                Facing::SouthEast,
                Facing::SouthWest,
                Facing::NorthWest
            ]
        );
    }

    #[test]
    fn rotate_wraps_both_ways() {
        assert_eq!(Facing::North.rotate(-1), Facing::NorthWest);
        assert_eq!(Facing::NorthWest.rotate(1), Facing::North);
        assert_eq!(Facing::East.rotate(4), Facing::West);
        assert_eq!(Facing::SouthEast.rotate(-9), Facing::East);
    }

    #[test]
    fn flanks_of_a_diagonal_are_its_orthogonal_neighbors() {
        assert_eq!(
            Facing::NorthEast.flanks(),
            Some((Facing::North, Facing::East))
        );
        assert_eq!(
            Facing::NorthWest.flanks(),
            Some((Facing::West, Facing::North))
        );
        assert_eq!(Facing::South.flanks(), None);
    }

    #[test]
    fn flank_offsets_sum_to_the_diagonal_offset() {
        for facing in Facing::ALL.into_iter().filter(|f| f.is_diagonal()) {
            let (left, right) = facing.flanks().unwrap();
            let (lx, ly) = left.offset();
            let (rx, ry) = right.offset();
            assert_eq!((lx + rx, ly + ry), facing.offset(), "{facing:?}");
        }
    }

    #[test]
    fn between_recovers_each_offset() {
        for facing in Facing::ALL {
            let (dx, dy) = facing.offset();
            assert_eq!(Facing::between(10, 10, 10 + dx, 10 + dy), Some(facing));
        }
        assert_eq!(Facing::between(3, 3, 3, 3), None);
        assert_eq!(Facing::between(0, 0, 5, -2), Some(Facing::NorthEast));
    }

    #[test]
    fn wire_byte_packs_facing_and_running_bit() {
        let dir = Direction::new(Facing::West, true);
        assert_eq!(dir.to_wire(), 0x86);
        assert_eq!(Direction::from_wire(0x86), dir);
        assert_eq!(Direction::from_wire(0x02), Direction::walking(Facing::East));
        // Reserved bits are dropped.
        assert_eq!(Direction::from_wire(0x7B), Direction::walking(Facing::SouthEast));
    }

    #[test]
    fn same_facing_ignores_running() {
        let walk = Direction::walking(Facing::South);
        assert!(walk.same_facing(walk.with_running(true)));
        assert_ne!(walk, walk.with_running(true));
    }
}
