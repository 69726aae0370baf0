//! Property-based tests using proptest
//!
//! Invariants that must hold for any input sequence:
//! - Step queues never exceed their capacity
//! - Issued walk sequences increase by one modulo 256 and never hit 0
//! - Stale confirmations never change pending state

use std::time::Duration;

use proptest::prelude::*;
use shared::{
    Direction, Facing, MAX_STEP_COUNT, Moveable, MoverKind, Outbound, Position,
    PredictorSettings, SEQUENCE_NONE, StandardMovementSpeed, StepQueue, TileGrid, WalkContext,
};

fn facing() -> impl Strategy<Value = Facing> {
    (0u8..8).prop_map(Facing::from_bits)
}

fn target() -> impl Strategy<Value = (u16, u16, i8)> {
    (95u16..105, 95u16..105, -4i8..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_step_queue_never_exceeds_capacity(
        ops in prop::collection::vec((target(), facing(), any::<bool>(), 0u64..500), 1..60)
    ) {
        let mut queue = StepQueue::new(Position::new(100, 100, 0), Direction::walking(Facing::North));
        for ((x, y, z), facing, run, dt) in ops {
            queue.enqueue_step(Position::new(x, y, z), Direction::new(facing, run));
            prop_assert!(queue.len() <= MAX_STEP_COUNT);
            queue.advance(Duration::from_millis(dt), &StandardMovementSpeed, MoverKind::OnFoot);
            prop_assert!(queue.len() <= MAX_STEP_COUNT);
        }
    }

    #[test]
    fn prop_sequences_increase_and_skip_zero(
        walks in prop::collection::vec((facing(), any::<bool>()), 1..700)
    ) {
        let grid = TileGrid::new(512, 512).unwrap();
        let mut player = Moveable::local(
            Position::new(256, 256, 0),
            Direction::walking(Facing::North),
            MoverKind::OnFoot,
            PredictorSettings::default(),
        );
        let mut sink: Vec<Outbound> = Vec::new();
        let mut last = SEQUENCE_NONE;

        for (i, (facing, confirm)) in walks.into_iter().enumerate() {
            let ctx = WalkContext {
                map: &grid,
                speed: &StandardMovementSpeed,
                now: Duration::from_secs(i as u64),
            };
            if player.request_walk(Direction::walking(facing), &ctx, &mut sink) {
                let issued = player.predictor().unwrap().sequence();
                prop_assert_ne!(issued, SEQUENCE_NONE);
                let expected = if last == u8::MAX || last == SEQUENCE_NONE { 1 } else { last + 1 };
                prop_assert_eq!(issued, expected);
                last = issued;
                let predictor = player.predictor().unwrap();
                if confirm || predictor.pending_len() == MAX_STEP_COUNT {
                    let oldest = predictor.pending().next().unwrap().step.sequence;
                    prop_assert!(player.confirm_walk(oldest));
                }
            }
            // Keep playback drained so the visual queue never fills.
            let (position, direction) = player.steps.end_position();
            player.steps.force_position(position, direction);
        }
    }

    #[test]
    fn prop_mismatched_confirm_is_a_no_op(seq in 2u8..=255) {
        let grid = TileGrid::new(16, 16).unwrap();
        let mut player = Moveable::local(
            Position::new(8, 8, 0),
            Direction::walking(Facing::East),
            MoverKind::OnFoot,
            PredictorSettings::default(),
        );
        let mut sink: Vec<Outbound> = Vec::new();
        let ctx = WalkContext { map: &grid, speed: &StandardMovementSpeed, now: Duration::ZERO };
        prop_assert!(player.request_walk(Direction::walking(Facing::East), &ctx, &mut sink));

        prop_assert!(!player.confirm_walk(seq));
        prop_assert_eq!(player.predictor().unwrap().pending_len(), 1);
        prop_assert_eq!(player.steps.len(), 1);
    }
}
