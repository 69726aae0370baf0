use std::time::Duration;

use crate::{
    direction::Direction,
    net::WalkSink,
    position::Position,
    predictor::{PredictorSettings, WalkContext, WalkPredictor},
    reconcile::intake_remote_step,
    speed::{MovementSpeed, MoverKind},
    step_queue::{Step, StepQueue},
    tile::TileSource,
};

/// Who decides where a [`Moveable`] goes.
#[derive(Clone, Debug)]
pub enum Control {
    /// The server; steps arrive through [`Moveable::intake_remote_step`].
    Remote,
    /// The local player; steps are predicted and later reconciled.
    Local(WalkPredictor),
}

/// Movement state of any entity that walks: remote mobiles and the local player
/// share the step queue and differ only in [`Control`].
#[derive(Clone, Debug)]
pub struct Moveable {
    pub kind: MoverKind,
    pub steps: StepQueue,
    pub control: Control,
}

impl Moveable {
    pub fn remote(position: Position, direction: Direction, kind: MoverKind) -> Self {
        Self {
            kind,
            steps: StepQueue::new(position, direction),
            control: Control::Remote,
        }
    }

    pub fn local(
        position: Position,
        direction: Direction,
        kind: MoverKind,
        settings: PredictorSettings,
    ) -> Self {
        Self {
            kind,
            steps: StepQueue::new(position, direction),
            control: Control::Local(WalkPredictor::new(settings)),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.control, Control::Local(_))
    }

    pub fn predictor(&self) -> Option<&WalkPredictor> {
        match &self.control {
            Control::Local(predictor) => Some(predictor),
            Control::Remote => None,
        }
    }

    pub fn predictor_mut(&mut self) -> Option<&mut WalkPredictor> {
        match &mut self.control {
            Control::Local(predictor) => Some(predictor),
            Control::Remote => None,
        }
    }

    /// Let the locally predicted mover pass through door items, as the server does for
    /// dead or incorporeal players. Remote movers are never resolved locally.
    pub fn set_ignore_doors(&mut self, ignore: bool) {
        if let Some(predictor) = self.predictor_mut() {
            predictor.set_ignore_doors(ignore);
        }
    }

    pub fn position(&self) -> Position {
        self.steps.position()
    }

    pub fn direction(&self) -> Direction {
        self.steps.direction()
    }

    pub fn advance<S: MovementSpeed + ?Sized>(&mut self, dt: Duration, speed: &S) -> Vec<Step> {
        self.steps.advance(dt, speed, self.kind)
    }

    /// Predict a walk. Always `false` for remote entities.
    pub fn request_walk<M, S, W>(
        &mut self,
        request: Direction,
        ctx: &WalkContext<'_, M, S>,
        sink: &mut W,
    ) -> bool
    where
        M: TileSource + ?Sized,
        S: MovementSpeed + ?Sized,
        W: WalkSink + ?Sized,
    {
        match &mut self.control {
            Control::Local(predictor) => {
                predictor.request_walk(&mut self.steps, self.kind, request, ctx, sink)
            }
            Control::Remote => false,
        }
    }

    pub fn confirm_walk(&mut self, sequence: u8) -> bool {
        self.predictor_mut()
            .is_some_and(|predictor| predictor.confirm_walk(sequence))
    }

    pub fn deny_walk(&mut self, sequence: u8, position: Position, direction: Direction) -> bool {
        match &mut self.control {
            Control::Local(predictor) => {
                predictor.deny_walk(&mut self.steps, sequence, position, direction)
            }
            Control::Remote => false,
        }
    }

    pub fn reset_steps(&mut self) {
        if let Some(predictor) = self.predictor_mut() {
            predictor.reset_steps();
        }
    }

    pub fn poll_timeout<W: WalkSink + ?Sized>(
        &mut self,
        now: Duration,
        sink: &mut W,
    ) -> bool {
        self.predictor_mut()
            .is_some_and(|predictor| predictor.poll_timeout(now, sink))
    }

    /// Accept an authoritative step. Server state always wins: a step the queue cannot
    /// take becomes a snap.
    pub fn intake_remote_step(&mut self, position: Position, direction: Direction) -> bool {
        intake_remote_step(&mut self.steps, position, direction)
    }

    /// Teleport or full resync.
    pub fn force_position(&mut self, position: Position, direction: Direction) {
        self.reset_steps();
        self.steps.force_position(position, direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        direction::Facing,
        map::TileGrid,
        net::Outbound,
        speed::StandardMovementSpeed,
        tile::{TileFlag, TileObject},
    };

    #[test]
    fn remote_movers_ignore_prediction_calls() {
        let grid = TileGrid::new(8, 8).unwrap();
        let mut mobile = Moveable::remote(
            Position::new(4, 4, 0),
            Direction::walking(Facing::South),
            MoverKind::OnFoot,
        );
        let mut sink: Vec<Outbound> = Vec::new();
        let ctx = WalkContext {
            map: &grid,
            speed: &StandardMovementSpeed,
            now: Duration::ZERO,
        };

        assert!(!mobile.request_walk(Direction::walking(Facing::South), &ctx, &mut sink));
        assert!(!mobile.confirm_walk(1));
        assert!(!mobile.deny_walk(1, Position::default(), Direction::default()));
        assert!(sink.is_empty());
        assert!(mobile.steps.is_empty());
    }

    #[test]
    fn local_and_remote_play_back_the_same_way() {
        let grid = TileGrid::new(8, 8).unwrap();
        let start = Position::new(4, 4, 0);
        let facing = Direction::walking(Facing::South);
        let mut local = Moveable::local(start, facing, MoverKind::Mounted, PredictorSettings::default());
        let mut remote = Moveable::remote(start, facing, MoverKind::Mounted);
        let mut sink: Vec<Outbound> = Vec::new();
        let ctx = WalkContext {
            map: &grid,
            speed: &StandardMovementSpeed,
            now: Duration::ZERO,
        };

        assert!(local.request_walk(facing, &ctx, &mut sink));
        assert!(remote.intake_remote_step(Position::new(4, 5, 0), facing));

        let dt = Duration::from_millis(200);
        assert_eq!(local.advance(dt, &StandardMovementSpeed).len(), 1);
        assert_eq!(remote.advance(dt, &StandardMovementSpeed).len(), 1);
        assert_eq!(local.position(), remote.position());
    }

    #[test]
    fn dead_player_walks_through_a_door_item() {
        let mut grid = TileGrid::new(8, 8).unwrap();
        grid.push_object(4, 5, TileObject::item(0, 20, &[TileFlag::Door, TileFlag::Impassable]))
            .unwrap();
        for x in [3, 5] {
            grid.push_object(x, 5, TileObject::fixed(0, 30, &[TileFlag::Impassable]))
                .unwrap();
        }
        let south = Direction::walking(Facing::South);
        let mut mobile = Moveable::local(
            Position::new(4, 4, 0),
            south,
            MoverKind::OnFoot,
            PredictorSettings::default(),
        );
        let mut sink: Vec<Outbound> = Vec::new();
        let ctx = WalkContext {
            map: &grid,
            speed: &StandardMovementSpeed,
            now: Duration::ZERO,
        };

        assert!(!mobile.request_walk(south, &ctx, &mut sink));
        mobile.set_ignore_doors(true);
        assert_eq!(mobile.predictor().map(|p| p.ignores_doors()), Some(true));
        assert!(mobile.request_walk(south, &ctx, &mut sink));
        assert_eq!(mobile.steps.back().map(|s| s.position), Some(Position::new(4, 5, 0)));
    }

    #[test]
    fn force_position_resets_prediction() {
        let grid = TileGrid::new(8, 8).unwrap();
        let mut mobile = Moveable::local(
            Position::new(4, 4, 0),
            Direction::walking(Facing::South),
            MoverKind::OnFoot,
            PredictorSettings::default(),
        );
        let mut sink: Vec<Outbound> = Vec::new();
        let ctx = WalkContext {
            map: &grid,
            speed: &StandardMovementSpeed,
            now: Duration::ZERO,
        };
        mobile.request_walk(Direction::walking(Facing::South), &ctx, &mut sink);

        mobile.force_position(Position::new(1, 1, 0), Direction::walking(Facing::North));
        assert_eq!(mobile.predictor().map(|p| p.pending_len()), Some(0));
        assert!(mobile.steps.is_empty());
        assert_eq!(mobile.position(), Position::new(1, 1, 0));
    }
}
