use serde::{Deserialize, Serialize};

/// Horizontal movement directions. Forward is -Z, right is +X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    pub(crate) const fn index(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Back => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

/// A logical action a key can be bound to.
///
/// The kernel consumes actions, never raw key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Forward,
    Back,
    Left,
    Right,
    Jump,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Forward,
        Action::Back,
        Action::Left,
        Action::Right,
        Action::Jump,
    ];

    /// The movement direction for move actions, `None` for jump.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Action::Forward => Some(Direction::Forward),
            Action::Back => Some(Direction::Back),
            Action::Left => Some(Direction::Left),
            Action::Right => Some(Direction::Right),
            Action::Jump => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_actions_map_to_directions() {
        assert_eq!(Action::Forward.direction(), Some(Direction::Forward));
        assert_eq!(Action::Right.direction(), Some(Direction::Right));
        assert_eq!(Action::Jump.direction(), None);
    }

    #[test]
    fn direction_indices_are_distinct() {
        let mut seen = [false; 4];
        for d in Direction::ALL {
            assert!(!seen[d.index()]);
            seen[d.index()] = true;
        }
    }

    #[test]
    fn actions_use_snake_case_names() {
        let a: Action = serde_yaml::from_str("jump").unwrap();
        assert_eq!(a, Action::Jump);
        assert!(serde_yaml::from_str::<Action>("crouch").is_err());
    }
}
