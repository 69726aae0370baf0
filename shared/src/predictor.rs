//! Client-side walk prediction for the locally controlled entity.
//!
//! # Model
//! - A walk request is decided locally, queued for playback immediately, and sent to
//!   the server tagged with a sequence number. It stays in the pending queue until the
//!   server confirms or denies it (see `reconcile`).
//! - Requests are rate-limited by a guard armed with the step's travel time (or the
//!   turn delay), so the client never walks faster than the server allows.
//! - Sequence numbers cycle `1..=255`; `0` means "none issued".
//! - A request left unacknowledged for longer than the ack timeout is treated as lost:
//!   the pending queue is dropped and a resync is requested.

use std::{collections::VecDeque, time::Duration};

use thiserror::Error;

use crate::{
    collision::{Mover, TileCollisionResolver},
    constants::{MAX_STEP_COUNT, SEQUENCE_NONE, TURN_DELAY, WALK_ACK_TIMEOUT},
    direction::Direction,
    net::{WalkRequest, WalkSink},
    position::Position,
    speed::{MovementSpeed, MoverKind},
    step_queue::{Step, StepQueue},
    tile::TileSource,
};

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum WalkRejection {
    #[error("too many walk requests awaiting acknowledgment")]
    QueueFull,
    #[error("previous walk request has not finished its delay")]
    RequestInFlight,
    #[error("no walkable tile in the requested direction")]
    Blocked,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PredictorSettings {
    /// Guard delay after a turn-in-place.
    pub turn_delay: Duration,
    /// How long a request may go unacknowledged before the pending queue is dropped.
    pub ack_timeout: Duration,
    /// Maximum unacknowledged requests.
    pub capacity: usize,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            turn_delay: TURN_DELAY,
            ack_timeout: WALK_ACK_TIMEOUT,
            capacity: MAX_STEP_COUNT,
        }
    }
}

/// The sequence number issued after `current`: cycles `1..=255`, never `0`.
pub fn next_sequence(current: u8) -> u8 {
    match current {
        SEQUENCE_NONE | u8::MAX => 1,
        s => s + 1,
    }
}

/// A request sent to the server and not yet answered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PendingWalk {
    pub step: Step,
    /// Predictor clock at send time.
    pub sent_at: Duration,
}

/// What a walk request is resolved against.
pub struct WalkContext<'a, M: TileSource + ?Sized, S: MovementSpeed + ?Sized> {
    pub map: &'a M,
    pub speed: &'a S,
    /// Monotonic clock, same timeline for every call.
    pub now: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct WalkPredictor {
    pub(crate) settings: PredictorSettings,
    pub(crate) pending: VecDeque<PendingWalk>,
    pub(crate) sequence: u8,
    pub(crate) next_request_at: Duration,
    ignore_doors: bool,
}

impl WalkPredictor {
    pub fn new(settings: PredictorSettings) -> Self {
        Self {
            settings,
            pending: VecDeque::with_capacity(settings.capacity),
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &PredictorSettings {
        &self.settings
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingWalk> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Last issued sequence number, or [`SEQUENCE_NONE`].
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Dead or incorporeal players pass through door items.
    pub fn set_ignore_doors(&mut self, ignore: bool) {
        self.ignore_doors = ignore;
    }

    pub fn ignores_doors(&self) -> bool {
        self.ignore_doors
    }

    fn next_sequence(&self) -> u8 {
        next_sequence(self.sequence)
    }

    /// The state the next request builds on: the newest pending request, else the end
    /// of visual playback (which is the committed state when nothing is queued).
    fn previous_end(&self, steps: &StepQueue) -> (Position, Direction) {
        self.pending
            .back()
            .map_or_else(|| steps.end_position(), |p| (p.step.position, p.step.direction))
    }

    /// Decide, queue and send one walk request.
    ///
    /// Requesting the current facing walks forward (or, when the resolver slides to a
    /// neighboring facing, turns toward it). Requesting any other facing turns in
    /// place.
    pub fn try_request_walk<M, S, W>(
        &mut self,
        steps: &mut StepQueue,
        kind: MoverKind,
        request: Direction,
        ctx: &WalkContext<'_, M, S>,
        sink: &mut W,
    ) -> Result<Step, WalkRejection>
    where
        M: TileSource + ?Sized,
        S: MovementSpeed + ?Sized,
        W: WalkSink + ?Sized,
    {
        if ctx.now < self.next_request_at {
            return Err(WalkRejection::RequestInFlight);
        }

        if self.pending.len() >= self.settings.capacity || steps.len() >= MAX_STEP_COUNT {
            return Err(WalkRejection::QueueFull);
        }

        let (position, direction) = self.previous_end(steps);

        let (step, delay) = if request.same_facing(direction) {
            let mover = Mover {
                position,
                ignore_doors: self.ignore_doors,
            };
            let next = TileCollisionResolver::new(ctx.map)
                .get_next_tile(mover, request.facing)
                .ok_or(WalkRejection::Blocked)?;

            if next.facing != request.facing {
                let turn = Direction::new(next.facing, request.running);
                (Step::new(position, turn), self.settings.turn_delay)
            } else {
                (
                    Step::new(next.position, request),
                    ctx.speed.time_to_complete_movement(kind, request.running),
                )
            }
        } else {
            (Step::new(position, request), self.settings.turn_delay)
        };

        self.sequence = self.next_sequence();
        let step = step.with_sequence(self.sequence);

        self.pending.push_back(PendingWalk {
            step,
            sent_at: ctx.now,
        });
        steps.push_step(step);
        sink.send_walk_request(WalkRequest {
            direction: step.direction,
            sequence: step.sequence,
        });
        self.next_request_at = ctx.now + delay;

        log::trace!(
            "walk #{} -> ({}, {}, {}) {:?}",
            step.sequence,
            step.position.x,
            step.position.y,
            step.position.z,
            step.direction
        );

        Ok(step)
    }

    /// [`Self::try_request_walk`] reduced to accepted / not accepted.
    pub fn request_walk<M, S, W>(
        &mut self,
        steps: &mut StepQueue,
        kind: MoverKind,
        request: Direction,
        ctx: &WalkContext<'_, M, S>,
        sink: &mut W,
    ) -> bool
    where
        M: TileSource + ?Sized,
        S: MovementSpeed + ?Sized,
        W: WalkSink + ?Sized,
    {
        match self.try_request_walk(steps, kind, request, ctx, sink) {
            Ok(_) => true,
            Err(rejection) => {
                log::trace!("walk {request:?} rejected: {rejection}");
                false
            }
        }
    }

    /// Drop everything if the oldest pending request has waited longer than the ack
    /// timeout. Returns whether a reset happened.
    pub fn poll_timeout<W: WalkSink + ?Sized>(&mut self, now: Duration, sink: &mut W) -> bool {
        let Some(oldest) = self.pending.front() else {
            return false;
        };
        if now.saturating_sub(oldest.sent_at) < self.settings.ack_timeout {
            return false;
        }

        log::warn!(
            "walk #{} unacknowledged for {:?}, dropping {} pending and requesting resync",
            oldest.step.sequence,
            now.saturating_sub(oldest.sent_at),
            self.pending.len()
        );
        self.reset_steps();
        sink.send_resync();
        true
    }
}
