pub mod collision;
pub mod constants;
pub mod direction;
pub mod flags;
pub mod map;
pub mod moveable;
pub mod net;
pub mod position;
pub mod predictor;
pub mod quantize;
pub mod reconcile;
pub mod speed;
pub mod step_queue;
pub mod tile;

pub use collision::{Mover, NextTile, TileCollisionResolver};
pub use constants::{
    CHARACTER_ANIMATION_DELAY, MAX_STEP_COUNT, SEQUENCE_NONE, TURN_DELAY, WALK_ACK_TIMEOUT,
};
pub use direction::{Direction, Facing};
pub use map::{MapError, TileGrid};
pub use moveable::{Control, Moveable};
pub use net::{Outbound, WalkConfirm, WalkDeny, WalkRequest, WalkSink, WireError};
pub use position::Position;
pub use predictor::{
    PendingWalk, PredictorSettings, WalkContext, WalkPredictor, WalkRejection, next_sequence,
};
pub use reconcile::intake_remote_step;
pub use speed::{MovementSpeed, MoverKind, StandardMovementSpeed};
pub use step_queue::{Step, StepQueue};
pub use tile::{LandHeights, LandTile, ObjectKind, TileColumn, TileFlag, TileObject, TileSource};
