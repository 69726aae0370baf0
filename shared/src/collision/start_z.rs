use crate::tile::{LandHeights, TileColumn, TileFlag};

/// Where a mover stands before stepping.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StartHeights {
    /// Base Z of the surface currently stood on (land low, or the object's own Z).
    pub z: i32,
    /// Tallest top among the surfaces considered, raised to the mover's Z if the mover
    /// is above all of them. Step reach is measured from here.
    pub top: i32,
}

/// Find the surface a mover at height `mover_z` is standing on in `column`, whose
/// land samples `land` as reported by the tile index.
///
/// Candidates are the land (unless ignored or impassable) and every Surface-flagged
/// object. A candidate qualifies when its standing height is at or below the mover and
/// not below the best candidate found so far. With no qualifying surface the mover is
/// treated as standing on its own Z.
pub fn start_heights(column: &TileColumn, heights: LandHeights, mover_z: i32) -> StartHeights {
    let land = &column.land;

    let mut found = false;
    let mut low = 0;
    let mut center = 0;
    let mut top = 0;

    if land.walkable() && mover_z >= heights.center {
        low = heights.low;
        center = heights.center;
        top = heights.top;
        found = true;
    }

    for object in column
        .objects
        .iter()
        .filter(|o| o.flags.contains(TileFlag::Surface))
    {
        let standing = object.standing_z();
        if (!found || standing >= center) && mover_z >= standing {
            low = object.z;
            center = standing;
            if !found || object.top() > top {
                top = object.top();
            }
            found = true;
        }
    }

    if !found {
        StartHeights {
            z: mover_z,
            top: mover_z,
        }
    } else {
        StartHeights {
            z: low,
            top: top.max(mover_z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{LandTile, TileObject};

    #[test]
    fn flat_land_under_the_mover() {
        let column = TileColumn::new(LandTile::flat(5));
        assert_eq!(start_heights(&column, column.land.heights, 5), StartHeights { z: 5, top: 5 });
    }

    #[test]
    fn sloped_land_reports_low_and_top() {
        let column = TileColumn::new(LandTile {
            heights: LandHeights {
                low: 2,
                center: 4,
                top: 8,
            },
            impassable: false,
            ignored: false,
        });
        assert_eq!(start_heights(&column, column.land.heights, 4), StartHeights { z: 2, top: 8 });
    }

    #[test]
    fn standing_on_a_table_uses_the_table() {
        let mut column = TileColumn::new(LandTile::flat(0));
        column
            .objects
            .push(TileObject::fixed(0, 6, &[TileFlag::Surface]));
        assert_eq!(start_heights(&column, column.land.heights, 6), StartHeights { z: 0, top: 6 });
    }

    #[test]
    fn surfaces_above_the_mover_are_ignored() {
        let mut column = TileColumn::new(LandTile::flat(0));
        column
            .objects
            .push(TileObject::fixed(20, 2, &[TileFlag::Surface]));
        assert_eq!(start_heights(&column, column.land.heights, 0), StartHeights { z: 0, top: 0 });
    }

    #[test]
    fn nothing_underfoot_falls_back_to_the_mover() {
        let column = TileColumn::new(LandTile::impassable(0));
        assert_eq!(start_heights(&column, column.land.heights, 7), StartHeights { z: 7, top: 7 });
    }

    #[test]
    fn land_heights_come_from_the_caller() {
        // The index may report a slope the column's own descriptor does not carry.
        let column = TileColumn::new(LandTile::flat(0));
        let sampled = LandHeights {
            low: -2,
            center: 0,
            top: 4,
        };
        assert_eq!(
            start_heights(&column, sampled, 0),
            StartHeights { z: -2, top: 4 }
        );
    }

    #[test]
    fn mover_above_every_top_raises_top() {
        let column = TileColumn::new(LandTile::flat(0));
        assert_eq!(start_heights(&column, column.land.heights, 3), StartHeights { z: 0, top: 3 });
    }
}
