use crate::action::Direction;

/// Which movement directions are currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    held: [bool; 4],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins.
    pub fn set_held(&mut self, direction: Direction, is_held: bool) {
        self.held[direction.index()] = is_held;
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.held[direction.index()]
    }

    pub fn release_all(&mut self) {
        self.held = [false; 4];
    }

    /// Held directions in `Direction::ALL` order.
    pub fn held(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.is_held(*d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_released() {
        let s = InputState::new();
        for d in Direction::ALL {
            assert!(!s.is_held(d));
        }
    }

    #[test]
    fn set_held_is_idempotent() {
        let mut s = InputState::new();
        s.set_held(Direction::Left, true);
        s.set_held(Direction::Left, true);
        assert!(s.is_held(Direction::Left));
        s.set_held(Direction::Left, false);
        assert!(!s.is_held(Direction::Left));
    }

    #[test]
    fn directions_are_independent() {
        let mut s = InputState::new();
        s.set_held(Direction::Forward, true);
        s.set_held(Direction::Back, true);
        assert!(s.is_held(Direction::Forward));
        assert!(s.is_held(Direction::Back));
        assert!(!s.is_held(Direction::Left));
        assert_eq!(
            s.held().collect::<Vec<_>>(),
            vec![Direction::Forward, Direction::Back]
        );
    }

    #[test]
    fn release_all_clears_everything() {
        let mut s = InputState::new();
        for d in Direction::ALL {
            s.set_held(d, true);
        }
        s.release_all();
        assert_eq!(s, InputState::new());
    }
}
