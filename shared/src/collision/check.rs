use super::{
    settings::{STEP_HEIGHT, body_top, step_reach},
    start_z::StartHeights,
};
use crate::tile::{LandHeights, TileColumn};

/// Headroom test: a body with feet at `our_z` and head at `our_top` fits in `column`
/// if no blocking or surface object overlaps that span.
///
/// Door items are skipped when `ignore_doors` is set (dead or incorporeal movers).
pub fn has_headroom(column: &TileColumn, our_z: i32, our_top: i32, ignore_doors: bool) -> bool {
    column
        .collidable()
        .filter(|o| !(ignore_doors && o.is_passable_door()))
        .all(|o| !o.overlaps(our_z, our_top))
}

/// Whether `candidate` should replace `current` as the landing height for a mover at
/// `mover_z`: strictly closer wins; on a tie the lower height wins.
#[inline]
fn prefer(candidate: i32, current: i32, mover_z: i32) -> bool {
    let cmp = (candidate - mover_z).abs() - (current - mover_z).abs();
    cmp < 0 || (cmp == 0 && candidate <= current)
}

/// Find the landing height in a destination `column`, whose land samples `heights`,
/// for a mover at `mover_z` whose start surface is `start`.
///
/// Standing candidates are the walkable surface objects in the column and the land
/// itself. A candidate must be reachable within [`STEP_HEIGHT`] of the start top, must
/// not be buried under the land, and must leave a full [`super::settings::PERSON_HEIGHT`]
/// of headroom. Among acceptable candidates the one closest to `mover_z` wins.
pub fn landing_z(
    column: &TileColumn,
    heights: LandHeights,
    start: StartHeights,
    mover_z: i32,
    ignore_doors: bool,
) -> Option<i32> {
    let land = &column.land;
    let consider_land = !land.ignored;

    let reach = step_reach(start.top);
    let check_top = body_top(start.z);

    let mut best: Option<i32> = None;

    for object in column.objects.iter().filter(|o| o.is_standable()) {
        let our_z = object.standing_z();

        if let Some(current) = best {
            if !prefer(our_z, current, mover_z) {
                continue;
            }
        }

        if reach < object.climb_top() {
            continue;
        }

        let test_top = check_top.max(body_top(our_z));

        // A surface sunk into sloped land is not reachable from above.
        let land_check = object.z + object.height.min(STEP_HEIGHT);
        if consider_land
            && land_check < heights.center
            && heights.center > our_z
            && test_top > heights.low
        {
            continue;
        }

        if has_headroom(column, our_z, test_top, ignore_doors) {
            best = Some(our_z);
        }
    }

    if consider_land && !land.impassable && reach >= heights.low {
        let our_z = heights.center;
        let test_top = check_top.max(body_top(our_z));
        let should_check = best.is_none_or(|current| prefer(our_z, current, mover_z));

        if should_check && has_headroom(column, our_z, test_top, ignore_doors) {
            best = Some(our_z);
        }
    }

    best
}
