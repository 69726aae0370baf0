use std::time::Duration;

/// Maximum number of entries held by a [`StepQueue`](crate::StepQueue) and by the
/// local player's pending walk-request queue.
pub const MAX_STEP_COUNT: usize = 5;

/// Delay before another walk request may be issued after a turn-in-place.
pub const TURN_DELAY: Duration = Duration::from_millis(100);

/// Time to cross one tile walking on foot.
pub const STEP_DELAY_WALK: Duration = Duration::from_millis(400);

/// Time to cross one tile running on foot.
pub const STEP_DELAY_RUN: Duration = Duration::from_millis(200);

/// Time to cross one tile walking while mounted (or flying).
pub const STEP_DELAY_MOUNT_WALK: Duration = Duration::from_millis(200);

/// Time to cross one tile running while mounted (or flying).
pub const STEP_DELAY_MOUNT_RUN: Duration = Duration::from_millis(100);

/// Slack subtracted from the travel time before a step is committed.
///
/// Committing slightly early hides network jitter between consecutive steps. Mounted
/// movement is fast enough that almost no slack is tolerated.
pub const COMMIT_SLACK_ON_FOOT: Duration = Duration::from_millis(15);
pub const COMMIT_SLACK_MOUNTED: Duration = Duration::from_millis(1);

/// Duration of one animation frame. Interpolation offsets advance with this granularity,
/// and an idle offset decays back to zero over one frame.
pub const CHARACTER_ANIMATION_DELAY: Duration = Duration::from_millis(80);

/// Screen-space travel (pixels) for one tile along a screen diagonal.
pub const TILE_PIXELS_HALF: f32 = 22.0;

/// Screen-space travel (pixels) for one tile along a screen axis.
pub const TILE_PIXELS_FULL: f32 = 44.0;

/// How long a walk request may stay unacknowledged before the predictor gives up on it,
/// drops every pending request and asks the server for a resync.
pub const WALK_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Sequence value reserved for "no request pending".
pub const SEQUENCE_NONE: u8 = 0;
