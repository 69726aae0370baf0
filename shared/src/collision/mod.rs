/*!
Tile collision root module.

Decides whether a mover may step from its tile onto a neighbor, and at what
height it lands. Everything here is a pure function of the tile index; nothing
is cached between calls.

- settings: vertical constants (person height, step height)
- start_z:  the surface the mover currently stands on
- check:    landing height and headroom in a destination column

The resolver borrows the columns it needs for a call into a small stack record,
so a resolution allocates nothing.
*/

pub mod check;
pub mod settings;
pub mod start_z;

pub use check::{has_headroom, landing_z};
pub use start_z::{StartHeights, start_heights};

use crate::{
    direction::Facing,
    position::Position,
    quantize::{dequantize_z, quantize_z},
    tile::{LandHeights, TileColumn, TileSource},
};

/// Who is moving, as far as collision cares.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mover {
    pub position: Position,
    /// Dead or incorporeal movers pass through doors.
    pub ignore_doors: bool,
}

impl Mover {
    pub const fn new(position: Position) -> Self {
        Self {
            position,
            ignore_doors: false,
        }
    }

    /// A mover that passes through doors.
    pub const fn ghost(position: Position) -> Self {
        Self {
            position,
            ignore_doors: true,
        }
    }
}

/// Result of [`TileCollisionResolver::get_next_tile`]: the facing actually used and
/// the tile it leads to, with the landing height filled in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NextTile {
    pub facing: Facing,
    pub position: Position,
}

/// A column together with the land heights the index reports for it.
#[derive(Copy, Clone)]
struct Site<'a> {
    column: &'a TileColumn,
    land: LandHeights,
}

/// The sites touched by one step: start, forward, and for diagonals both flanks.
struct Columns<'a> {
    start: Site<'a>,
    forward: Site<'a>,
    flanks: Option<[Option<Site<'a>>; 2]>,
}

/// Geometric walk feasibility over a tile index.
///
/// A thin borrowed view: build one per tick with [`TileCollisionResolver::new`] and
/// query as often as needed.
pub struct TileCollisionResolver<'a, S: TileSource + ?Sized> {
    map: &'a S,
}

impl<'a, S: TileSource + ?Sized> TileCollisionResolver<'a, S> {
    pub fn new(map: &'a S) -> Self {
        Self { map }
    }

    fn site(&self, x: u16, y: u16) -> Option<Site<'a>> {
        Some(Site {
            column: self.map.tile(x, y)?,
            land: self.map.average_z(x, y)?,
        })
    }

    fn site_at(&self, origin: Position, facing: Facing) -> Option<Site<'a>> {
        let (x, y) = origin.neighbor(facing)?;
        self.site(x, y)
    }

    fn gather(&self, origin: Position, facing: Facing) -> Option<Columns<'a>> {
        let start = self.site(origin.x, origin.y)?;
        let forward = self.site_at(origin, facing)?;
        let flanks = facing
            .flanks()
            .map(|(left, right)| [self.site_at(origin, left), self.site_at(origin, right)]);
        Some(Columns {
            start,
            forward,
            flanks,
        })
    }

    /// Whether `mover` may step one tile in `facing`, and the height it lands at.
    ///
    /// Returns `None` when the forward tile is missing or has no acceptable surface,
    /// or when a diagonal step would cut a corner with both flanks blocked.
    pub fn check_movement(&self, mover: Mover, facing: Facing) -> Option<i8> {
        let columns = self.gather(mover.position, facing)?;
        let mover_z = dequantize_z(mover.position.z);
        let start = start_heights(columns.start.column, columns.start.land, mover_z);
        let land_on = |site: Site<'_>| {
            landing_z(site.column, site.land, start, mover_z, mover.ignore_doors)
        };

        let landing = land_on(columns.forward)?;

        if let Some(flanks) = columns.flanks {
            let any_flank_open = flanks
                .into_iter()
                .flatten()
                .any(|site| land_on(site).is_some());
            if !any_flank_open {
                log::trace!(
                    "diagonal {facing:?} from ({}, {}) blocked by both flanks",
                    mover.position.x,
                    mover.position.y
                );
                return None;
            }
        }

        Some(quantize_z(landing))
    }

    /// Resolve the tile a step in `facing` leads to, falling back to the neighboring
    /// facings when the requested one is blocked: first one eighth counter-clockwise,
    /// then one eighth clockwise of the request.
    pub fn get_next_tile(&self, mover: Mover, facing: Facing) -> Option<NextTile> {
        [facing, facing.rotate(-1), facing.rotate(1)]
            .into_iter()
            .find_map(|candidate| {
                let z = self.check_movement(mover, candidate)?;
                let (x, y) = mover.position.neighbor(candidate)?;
                Some(NextTile {
                    facing: candidate,
                    position: Position::new(x, y, z),
                })
            })
    }
}
