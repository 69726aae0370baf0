use std::time::Duration;

use crate::constants::{
    COMMIT_SLACK_MOUNTED, COMMIT_SLACK_ON_FOOT, STEP_DELAY_MOUNT_RUN, STEP_DELAY_MOUNT_WALK,
    STEP_DELAY_RUN, STEP_DELAY_WALK,
};

/// How an entity travels. Flying shares the mounted timings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MoverKind {
    #[default]
    OnFoot,
    Mounted,
}

impl MoverKind {
    /// Travel time shaved off before a step is committed.
    pub fn commit_slack(self) -> Duration {
        match self {
            MoverKind::OnFoot => COMMIT_SLACK_ON_FOOT,
            MoverKind::Mounted => COMMIT_SLACK_MOUNTED,
        }
    }
}

/// Movement-speed table: time to cross one tile.
pub trait MovementSpeed {
    fn time_to_complete_movement(&self, kind: MoverKind, run: bool) -> Duration;

    /// Elapsed time after which a step of this kind is committed.
    fn commit_after(&self, kind: MoverKind, run: bool) -> Duration {
        self.time_to_complete_movement(kind, run)
            .saturating_sub(kind.commit_slack())
    }
}

/// The stock speed table.
#[derive(Copy, Clone, Debug, Default)]
pub struct StandardMovementSpeed;

impl MovementSpeed for StandardMovementSpeed {
    fn time_to_complete_movement(&self, kind: MoverKind, run: bool) -> Duration {
        match (kind, run) {
            (MoverKind::OnFoot, false) => STEP_DELAY_WALK,
            (MoverKind::OnFoot, true) => STEP_DELAY_RUN,
            (MoverKind::Mounted, false) => STEP_DELAY_MOUNT_WALK,
            (MoverKind::Mounted, true) => STEP_DELAY_MOUNT_RUN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mounted_is_twice_as_fast() {
        let speed = StandardMovementSpeed;
        for run in [false, true] {
            assert_eq!(
                speed.time_to_complete_movement(MoverKind::OnFoot, run),
                speed.time_to_complete_movement(MoverKind::Mounted, run) * 2
            );
        }
    }

    #[test]
    fn commit_happens_slightly_early() {
        let speed = StandardMovementSpeed;
        assert_eq!(
            speed.commit_after(MoverKind::OnFoot, false),
            Duration::from_millis(385)
        );
        assert_eq!(
            speed.commit_after(MoverKind::Mounted, true),
            Duration::from_millis(99)
        );
    }
}
