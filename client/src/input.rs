use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use shared::{Direction, Facing};

/// Stick travel below which the walk input counts as released.
const WALK_DEADZONE: f32 = 0.5;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    #[actionlike(DualAxis)]
    Move,
    Run,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert_dual_axis(InputAction::Move, VirtualDPad::wasd());
    input_map.insert_dual_axis(InputAction::Move, VirtualDPad::arrow_keys());
    input_map.insert_dual_axis(InputAction::Move, VirtualDPad::numpad());
    input_map.insert(InputAction::Run, KeyCode::ShiftLeft);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());
}

/// The walk the player is currently asking for, if any.
///
/// Up on the stick is north; the tile grid grows southward, so the vertical axis
/// flips.
pub fn walk_intent(actions: &ActionState<InputAction>) -> Option<Direction> {
    let facing = facing_from_axis(actions.axis_pair(&InputAction::Move))?;
    Some(Direction::new(facing, actions.pressed(&InputAction::Run)))
}

fn facing_from_axis(axis: Vec2) -> Option<Facing> {
    let snap = |v: f32| {
        if v.abs() < WALK_DEADZONE {
            0
        } else {
            v.signum() as i32
        }
    };
    Facing::between(0, 0, snap(axis.x), -snap(axis.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_is_north_and_corners_are_diagonals() {
        assert_eq!(facing_from_axis(Vec2::Y), Some(Facing::North));
        assert_eq!(facing_from_axis(-Vec2::Y), Some(Facing::South));
        assert_eq!(facing_from_axis(Vec2::X), Some(Facing::East));
        assert_eq!(facing_from_axis(Vec2::new(-1.0, 1.0)), Some(Facing::NorthWest));
        assert_eq!(facing_from_axis(Vec2::new(0.7, -0.7)), Some(Facing::SouthEast));
    }

    #[test]
    fn small_deflection_is_no_walk() {
        assert_eq!(facing_from_axis(Vec2::ZERO), None);
        assert_eq!(facing_from_axis(Vec2::new(0.2, -0.3)), None);
        assert_eq!(facing_from_axis(Vec2::new(0.2, 0.9)), Some(Facing::North));
    }
}
