/*!
Tile column data consumed by the collision resolver.

A world coordinate `(x, y)` holds one land descriptor (the terrain heightfield
sample) and an unordered collection of placed objects. Objects are either static
(fixed map decoration) or dynamic (server-driven items); both carry a Z, a height
and a set of [`TileFlag`]s.

This module contains no algorithms beyond per-object height math. The spatial
index itself is external; [`TileSource`] is the seam the resolver reads through
and [`crate::map::TileGrid`] is the in-memory implementation.
*/

use crate::{define_flag_bits, flags::FlagSet};

define_flag_bits!(TileFlag, u8, {
    Impassable,
    Surface,
    Bridge,
    Wet,
    Door,
});

/// Flag set stored per tile object.
pub type TileFlags = FlagSet<u8>;

/// Flags that make an object take part in collision at all.
pub const BLOCKING_OR_SURFACE: [TileFlag; 2] = [TileFlag::Impassable, TileFlag::Surface];

/// The three land heights sampled at a coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LandHeights {
    pub low: i32,
    pub center: i32,
    pub top: i32,
}

impl LandHeights {
    /// A flat land sample at `z`.
    pub const fn flat(z: i32) -> Self {
        Self {
            low: z,
            center: z,
            top: z,
        }
    }
}

/// Land (terrain) descriptor for a coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LandTile {
    pub heights: LandHeights,
    /// Terrain nobody may stand on (water, rock).
    pub impassable: bool,
    /// Land that is not considered at all (void / no-draw land).
    pub ignored: bool,
}

impl LandTile {
    pub const fn flat(z: i32) -> Self {
        Self {
            heights: LandHeights::flat(z),
            impassable: false,
            ignored: false,
        }
    }

    pub const fn impassable(z: i32) -> Self {
        Self {
            heights: LandHeights::flat(z),
            impassable: true,
            ignored: false,
        }
    }

    /// Whether an entity could stand on this land at all.
    #[inline]
    pub fn walkable(&self) -> bool {
        !self.ignored && !self.impassable
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// Fixed map decoration.
    Static,
    /// Movable or server-driven item.
    Dynamic,
}

/// A placed object occupying a tile column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileObject {
    pub z: i32,
    pub height: i32,
    pub flags: TileFlags,
    pub kind: ObjectKind,
}

impl TileObject {
    pub fn new(kind: ObjectKind, z: i32, height: i32, flags: &[TileFlag]) -> Self {
        Self {
            z,
            height,
            flags: TileFlags::of(flags),
            kind,
        }
    }

    pub fn fixed(z: i32, height: i32, flags: &[TileFlag]) -> Self {
        Self::new(ObjectKind::Static, z, height, flags)
    }

    pub fn item(z: i32, height: i32, flags: &[TileFlag]) -> Self {
        Self::new(ObjectKind::Dynamic, z, height, flags)
    }

    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.flags.contains(TileFlag::Bridge)
    }

    #[inline]
    pub fn is_door(&self) -> bool {
        self.flags.contains(TileFlag::Door)
    }

    /// A door item that dead or incorporeal movers pass through. Doors baked into the
    /// map as statics still block them.
    #[inline]
    pub fn is_passable_door(&self) -> bool {
        self.kind == ObjectKind::Dynamic && self.is_door()
    }

    /// Takes part in collision (impassable, surface, or both).
    #[inline]
    pub fn blocks_or_supports(&self) -> bool {
        self.flags.contains_any(&BLOCKING_OR_SURFACE)
    }

    /// Something an entity may stand on top of: a surface that is not also impassable.
    #[inline]
    pub fn is_standable(&self) -> bool {
        self.flags.contains(TileFlag::Surface) && !self.flags.contains(TileFlag::Impassable)
    }

    /// Where feet rest when standing on this object. Bridges (stairs, ramps) count
    /// half their height.
    #[inline]
    pub fn standing_z(&self) -> i32 {
        if self.is_bridge() {
            self.z + self.height / 2
        } else {
            self.z + self.height
        }
    }

    /// The top a mover must be able to step onto. Bridges are climbed from their base.
    #[inline]
    pub fn climb_top(&self) -> i32 {
        if self.is_bridge() {
            self.z
        } else {
            self.z + self.height
        }
    }

    /// Full physical top of the object.
    #[inline]
    pub fn top(&self) -> i32 {
        self.z + self.height
    }

    /// Whether this object's vertical span `[z, standing_z)` overlaps `[bottom, top)`.
    #[inline]
    pub fn overlaps(&self, bottom: i32, top: i32) -> bool {
        self.standing_z() > bottom && top > self.z
    }
}

/// Everything at one `(x, y)` coordinate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileColumn {
    pub land: LandTile,
    pub objects: Vec<TileObject>,
}

impl TileColumn {
    pub fn new(land: LandTile) -> Self {
        Self {
            land,
            objects: Vec::new(),
        }
    }

    /// Objects that take part in collision.
    pub fn collidable(&self) -> impl Iterator<Item = &TileObject> {
        self.objects.iter().filter(|o| o.blocks_or_supports())
    }
}

/// Read access to the spatial tile index.
///
/// The resolver only ever reads through this trait. Implementations must not be
/// mutated while a resolution is in progress; on the client this holds because index
/// updates and movement run on the same tick.
pub trait TileSource {
    /// The column at `(x, y)`, or `None` outside the indexed area.
    fn tile(&self, x: u16, y: u16) -> Option<&TileColumn>;

    /// Land heights at `(x, y)`.
    fn average_z(&self, x: u16, y: u16) -> Option<LandHeights> {
        self.tile(x, y).map(|column| column.land.heights)
    }
}
