//! Applying server verdicts to predicted movement.
//!
//! Confirmations retire the oldest pending request. A denial rolls back to the
//! server's position: every pending request and every queued step is discarded and
//! the entity snaps. Pending requests are not replayed against the corrected state.

use std::time::Duration;

use crate::{
    constants::SEQUENCE_NONE,
    direction::Direction,
    position::Position,
    predictor::WalkPredictor,
    step_queue::StepQueue,
};

impl WalkPredictor {
    /// Retire the front pending request if it carries `sequence`. Anything else is a
    /// stale or duplicate ack and is ignored.
    pub fn confirm_walk(&mut self, sequence: u8) -> bool {
        match self.pending.front() {
            Some(front) if front.step.sequence == sequence => {
                self.pending.pop_front();
                log::debug!("walk #{sequence} confirmed, {} pending", self.pending.len());
                true
            }
            _ => {
                log::trace!("ignoring ack for walk #{sequence}");
                false
            }
        }
    }

    /// Roll back to the server's `position` and `direction` if `sequence` is one of
    /// ours. Returns whether a rollback happened.
    pub fn deny_walk(
        &mut self,
        steps: &mut StepQueue,
        sequence: u8,
        position: Position,
        direction: Direction,
    ) -> bool {
        if !self.pending.iter().any(|p| p.step.sequence == sequence) {
            log::trace!("ignoring deny for unknown walk #{sequence}");
            return false;
        }

        log::debug!(
            "walk #{sequence} denied, snapping to ({}, {}, {}) after dropping {} pending",
            position.x,
            position.y,
            position.z,
            self.pending.len()
        );
        self.reset_steps();
        steps.force_position(position, direction);
        true
    }

    /// Forget every pending request, the sequence counter and the request guard.
    pub fn reset_steps(&mut self) {
        self.pending.clear();
        self.sequence = SEQUENCE_NONE;
        self.next_request_at = Duration::ZERO;
    }
}

/// Feed an authoritative step for an entity that is not predicted locally.
///
/// The step is queued for smooth playback; when the queue cannot take it the entity
/// snaps straight to the reported state. Returns whether the step was queued.
pub fn intake_remote_step(steps: &mut StepQueue, position: Position, direction: Direction) -> bool {
    if steps.enqueue_step(position, direction) {
        return true;
    }
    log::debug!(
        "step queue full, snapping remote mover to ({}, {}, {})",
        position.x,
        position.y,
        position.z
    );
    steps.force_position(position, direction);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        direction::Facing,
        map::TileGrid,
        net::Outbound,
        predictor::WalkContext,
        speed::{MoverKind, StandardMovementSpeed},
    };

    fn walked(n: u64) -> (WalkPredictor, StepQueue) {
        let grid = TileGrid::new(200, 200).unwrap();
        let mut predictor = WalkPredictor::default();
        let mut steps = StepQueue::new(Position::new(100, 100, 0), Direction::walking(Facing::East));
        let mut sink: Vec<Outbound> = Vec::new();
        for i in 0..n {
            let ctx = WalkContext {
                map: &grid,
                speed: &StandardMovementSpeed,
                now: Duration::from_millis(i * 400),
            };
            assert!(predictor.request_walk(
                &mut steps,
                MoverKind::OnFoot,
                Direction::walking(Facing::East),
                &ctx,
                &mut sink,
            ));
        }
        (predictor, steps)
    }

    #[test]
    fn confirm_pops_only_the_matching_front() {
        let (mut predictor, _) = walked(3);
        assert!(!predictor.confirm_walk(2));
        assert_eq!(predictor.pending_len(), 3);
        assert!(predictor.confirm_walk(1));
        assert!(predictor.confirm_walk(2));
        assert!(!predictor.confirm_walk(2));
        assert_eq!(predictor.pending_len(), 1);
    }

    #[test]
    fn confirm_leaves_visual_playback_alone() {
        let (mut predictor, steps) = walked(2);
        predictor.confirm_walk(1);
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn deny_discards_everything_and_snaps() {
        let (mut predictor, mut steps) = walked(3);
        let truth = Position::new(99, 100, 0);
        assert!(predictor.deny_walk(&mut steps, 2, truth, Direction::walking(Facing::West)));
        assert_eq!(predictor.pending_len(), 0);
        assert!(steps.is_empty());
        assert_eq!(steps.position(), truth);
        assert_eq!(steps.direction(), Direction::walking(Facing::West));
    }

    #[test]
    fn deny_for_an_unknown_sequence_is_ignored() {
        let (mut predictor, mut steps) = walked(2);
        assert!(!predictor.deny_walk(
            &mut steps,
            7,
            Position::new(0, 0, 0),
            Direction::walking(Facing::West)
        ));
        assert_eq!(predictor.pending_len(), 2);
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn remote_intake_snaps_when_the_queue_overflows() {
        let mut steps = StepQueue::new(Position::new(10, 10, 0), Direction::walking(Facing::East));
        for x in 11..16 {
            assert!(intake_remote_step(
                &mut steps,
                Position::new(x, 10, 0),
                Direction::walking(Facing::East)
            ));
        }
        let far = Position::new(40, 10, 0);
        assert!(!intake_remote_step(&mut steps, far, Direction::walking(Facing::East)));
        assert!(steps.is_empty());
        assert_eq!(steps.position(), far);
    }
}
