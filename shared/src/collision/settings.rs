/*!
Tile collision heights and tolerances.

These constants centralize the vertical parameters used by the tile collision
resolver. Keeping them together makes tuning easier and keeps client prediction
in lockstep with the server's own walk validation.

Notes
- Heights are in world Z units (one signed byte on the wire).
- A column object's "standing height" is `z + height`, or `z + height / 2` for
  bridges (stairs, ramps).
*/

/// Height of a standing person. A candidate surface must have this much clearance
/// above it (no blocking geometry overlapping the body span).
pub const PERSON_HEIGHT: i32 = 16;

/// Maximum upward Z difference a single step may climb.
pub const STEP_HEIGHT: i32 = 2;

/// Lowest representable height; used when a column has nothing to stand on.
pub const MIN_Z: i32 = i8::MIN as i32;

/// Highest representable height.
pub const MAX_Z: i32 = i8::MAX as i32;

/// Helper: the top of a body standing with feet at `z`.
#[inline]
pub const fn body_top(z: i32) -> i32 {
    z + PERSON_HEIGHT
}

/// Helper: the highest object top reachable from `start_top` in a single step.
#[inline]
pub const fn step_reach(start_top: i32) -> i32 {
    start_top + STEP_HEIGHT
}
