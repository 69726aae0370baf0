//! Per-entity playback of already-decided motion.
//!
//! # Model
//! - The queue owns the entity's committed [`Position`] and [`Direction`]. They change
//!   only when the front step is committed, or when the whole queue is overwritten by
//!   [`StepQueue::force_position`].
//! - A step on the same tile as the committed position is a turn and commits on the
//!   next advance. A step onto a neighboring tile is a translation and commits once
//!   its travel time (less a small slack) has elapsed.
//! - While a translation is in flight, [`StepQueue::offset`] holds the screen-space
//!   displacement toward the target tile (pixels in x/y, height units in z). It is
//!   purely visual.
//!
//! The queue never holds more than [`MAX_STEP_COUNT`] entries.

use std::{collections::VecDeque, time::Duration};

use nalgebra as na;

use crate::{
    constants::{
        CHARACTER_ANIMATION_DELAY, MAX_STEP_COUNT, SEQUENCE_NONE, TILE_PIXELS_FULL,
        TILE_PIXELS_HALF,
    },
    direction::{Direction, Facing},
    position::Position,
    speed::{MovementSpeed, MoverKind},
};

/// One resolved step: where the entity ends up and which way it faces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub position: Position,
    pub direction: Direction,
    /// Walk-request sequence for predicted steps; [`SEQUENCE_NONE`] otherwise.
    pub sequence: u8,
}

impl Step {
    pub const fn new(position: Position, direction: Direction) -> Self {
        Self {
            position,
            direction,
            sequence: SEQUENCE_NONE,
        }
    }

    pub const fn with_sequence(self, sequence: u8) -> Self {
        Self { sequence, ..self }
    }

    #[inline]
    pub fn running(&self) -> bool {
        self.direction.running
    }
}

#[derive(Clone, Debug)]
pub struct StepQueue {
    position: Position,
    direction: Direction,
    steps: VecDeque<Step>,
    offset: na::Vector3<f32>,
    step_elapsed: Duration,
}

impl Default for StepQueue {
    fn default() -> Self {
        Self::new(Position::default(), Direction::default())
    }
}

impl StepQueue {
    pub fn new(position: Position, direction: Direction) -> Self {
        Self {
            position,
            direction,
            steps: VecDeque::with_capacity(MAX_STEP_COUNT),
            offset: na::Vector3::zeros(),
            step_elapsed: Duration::ZERO,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Visual displacement from the committed position.
    pub fn offset(&self) -> na::Vector3<f32> {
        self.offset
    }

    pub fn is_moving(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn front(&self) -> Option<&Step> {
        self.steps.front()
    }

    pub fn back(&self) -> Option<&Step> {
        self.steps.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Where the entity will be once every queued step has played: the tail of the
    /// queue, or the committed state when nothing is queued.
    pub fn end_position(&self) -> (Position, Direction) {
        self.steps
            .back()
            .map_or((self.position, self.direction), |step| {
                (step.position, step.direction)
            })
    }

    /// Queue motion toward `target`, ending up facing `direction`.
    ///
    /// Motion is decomposed so every queued entry is either a pure turn or a pure
    /// translation: a turn toward the target tile when the heading changes, the move
    /// itself, then a closing turn when the requested facing differs from the travel
    /// facing. Returns `false` without queuing anything if the decomposition does not
    /// fit. A target equal to the current end is accepted as a no-op.
    pub fn enqueue_step(&mut self, target: Position, direction: Direction) -> bool {
        let (end_position, end_direction) = self.end_position();

        if target == end_position && direction.same_facing(end_direction) {
            return true;
        }

        let mut plan: [Option<Step>; 3] = [None; 3];
        match end_position.facing_to(target) {
            Some(travel) => {
                let heading = Direction::new(travel, direction.running);
                if travel != end_direction.facing {
                    plan[0] = Some(Step::new(end_position, heading));
                }
                plan[1] = Some(Step::new(target, heading));
                if travel != direction.facing {
                    plan[2] = Some(Step::new(target, direction));
                }
            }
            None => plan[1] = Some(Step::new(target, direction)),
        }

        let needed = plan.iter().flatten().count();
        if self.steps.len() + needed > MAX_STEP_COUNT {
            return false;
        }

        self.push_all(plan.into_iter().flatten());
        true
    }

    /// Queue an already-resolved step as-is. Used by the walk predictor, whose steps
    /// are single turns or single translations by construction.
    pub fn push_step(&mut self, step: Step) -> bool {
        if self.steps.len() >= MAX_STEP_COUNT {
            return false;
        }
        self.push_all(std::iter::once(step));
        true
    }

    fn push_all(&mut self, steps: impl Iterator<Item = Step>) {
        if self.steps.is_empty() {
            self.step_elapsed = Duration::ZERO;
        }
        self.steps.extend(steps);
    }

    /// Advance playback by `dt` and return the steps committed this call, in order.
    pub fn advance<S: MovementSpeed + ?Sized>(
        &mut self,
        dt: Duration,
        speed: &S,
        kind: MoverKind,
    ) -> Vec<Step> {
        let mut committed = Vec::new();

        if self.steps.is_empty() {
            self.decay_offset(dt);
            return committed;
        }

        self.step_elapsed += dt;

        while let Some(&step) = self.steps.front() {
            if step.position.same_tile(self.position) {
                self.commit_front(step);
                committed.push(step);
                continue;
            }

            let commit_after = speed.commit_after(kind, step.running());
            let adjacent = self.position.neighbor(step.direction.facing)
                == Some((step.position.x, step.position.y));

            // A step that is not exactly one tile along its own facing snaps.
            if !adjacent || self.step_elapsed >= commit_after {
                self.commit_front(step);
                committed.push(step);
            } else {
                self.offset = travel_offset(
                    step.direction.facing,
                    i32::from(step.position.z) - i32::from(self.position.z),
                    self.step_elapsed,
                    commit_after,
                );
            }
            break;
        }

        committed
    }

    fn commit_front(&mut self, step: Step) {
        self.position = step.position;
        self.direction = step.direction;
        self.offset = na::Vector3::zeros();
        self.step_elapsed = Duration::ZERO;
        self.steps.pop_front();
    }

    /// Ease a leftover offset back to zero over one animation frame.
    fn decay_offset(&mut self, dt: Duration) {
        if self.offset == na::Vector3::zeros() {
            return;
        }
        let t = (dt.as_secs_f32() / CHARACTER_ANIMATION_DELAY.as_secs_f32()).min(1.0);
        let max_delta = TILE_PIXELS_FULL * t;
        self.offset = self.offset.map(|v| {
            if v.abs() <= max_delta {
                0.0
            } else {
                v - v.signum() * max_delta
            }
        });
    }

    /// Drop every queued step and any visual offset. Position is kept.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.offset = na::Vector3::zeros();
        self.step_elapsed = Duration::ZERO;
    }

    /// Overwrite the committed state (teleport, server correction).
    pub fn force_position(&mut self, position: Position, direction: Direction) {
        self.clear();
        self.position = position;
        self.direction = direction;
    }
}

/// Screen-space displacement after `elapsed` of a step in `facing` lasting
/// `duration`, with a height difference of `dz`.
///
/// Orthogonal screen axes advance 44 px per tile; the others 22 px on each axis.
/// Each axis is clamped to one tile. The height component is in height units and
/// never overshoots `dz`.
pub fn travel_offset(
    facing: Facing,
    dz: i32,
    elapsed: Duration,
    duration: Duration,
) -> na::Vector3<f32> {
    let frame_secs = CHARACTER_ANIMATION_DELAY.as_secs_f32();
    let frames_per_tile = duration.as_secs_f32() / frame_secs;
    if frames_per_tile <= 0.0 {
        return na::Vector3::zeros();
    }
    let frame = elapsed.as_secs_f32() / frame_secs;

    let half = TILE_PIXELS_HALF / frames_per_tile * frame;
    let full = TILE_PIXELS_FULL / frames_per_tile * frame;

    let (x, y, check_x, check_y) = match facing {
        Facing::North => (half, -half, TILE_PIXELS_HALF, TILE_PIXELS_HALF),
        Facing::NorthEast => (full, 0.0, TILE_PIXELS_FULL, TILE_PIXELS_HALF),
        Facing::East => (half, half, TILE_PIXELS_HALF, TILE_PIXELS_HALF),
        Facing::SouthEast => (0.0, full, TILE_PIXELS_HALF, TILE_PIXELS_FULL),
        Facing::South => (-half, half, TILE_PIXELS_HALF, TILE_PIXELS_HALF),
        Facing::SouthWest => (-full, 0.0, TILE_PIXELS_FULL, TILE_PIXELS_HALF),
        Facing::West => (-half, -half, TILE_PIXELS_HALF, TILE_PIXELS_HALF),
        Facing::NorthWest => (0.0, -full, TILE_PIXELS_HALF, TILE_PIXELS_FULL),
    };

    let dz = dz as f32;
    let z = (dz * frame / frames_per_tile).clamp(dz.min(0.0), dz.max(0.0));

    na::Vector3::new(x.clamp(-check_x, check_x), y.clamp(-check_y, check_y), z)
}
