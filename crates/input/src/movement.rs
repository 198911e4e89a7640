/// A camera movement direction bound to one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    /// Raise the camera (`R`).
    Up,
    /// Lower the camera (`F`).
    Down,
    /// Orbit counter-clockwise (`A`).
    Left,
    /// Orbit clockwise (`D`).
    Right,
    /// Move toward the origin (`W`).
    Forward,
    /// Move away from the origin (`S`).
    Backward,
}

impl Movement {
    pub const ALL: [Movement; 6] = [
        Movement::Up,
        Movement::Down,
        Movement::Left,
        Movement::Right,
        Movement::Forward,
        Movement::Backward,
    ];

    /// Map a key character to its movement, case-insensitively.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'r' => Some(Movement::Up),
            'f' => Some(Movement::Down),
            'a' => Some(Movement::Left),
            'd' => Some(Movement::Right),
            'w' => Some(Movement::Forward),
            's' => Some(Movement::Backward),
            _ => None,
        }
    }

    pub fn key(self) -> char {
        match self {
            Movement::Up => 'R',
            Movement::Down => 'F',
            Movement::Left => 'A',
            Movement::Right => 'D',
            Movement::Forward => 'W',
            Movement::Backward => 'S',
        }
    }
}

/// Which movement keys are currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub backward: bool,
}

impl MovementFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, movement: Movement, held: bool) {
        let flag = match movement {
            Movement::Up => &mut self.up,
            Movement::Down => &mut self.down,
            Movement::Left => &mut self.left,
            Movement::Right => &mut self.right,
            Movement::Forward => &mut self.forward,
            Movement::Backward => &mut self.backward,
        };
        if *flag != held {
            tracing::trace!(?movement, held, "movement flag changed");
        }
        *flag = held;
    }

    pub fn is_held(&self, movement: Movement) -> bool {
        match movement {
            Movement::Up => self.up,
            Movement::Down => self.down,
            Movement::Left => self.left,
            Movement::Right => self.right,
            Movement::Forward => self.forward,
            Movement::Backward => self.backward,
        }
    }

    /// Apply a key event. Returns `true` if the key is a movement key.
    pub fn handle_key(&mut self, key: char, pressed: bool) -> bool {
        match Movement::from_key(key) {
            Some(movement) => {
                self.set(movement, pressed);
                true
            }
            None => false,
        }
    }

    pub fn any(&self) -> bool {
        Movement::ALL.iter().any(|m| self.is_held(*m))
    }

    /// Release every key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_map_covers_six_keys() {
        for m in Movement::ALL {
            assert_eq!(Movement::from_key(m.key()), Some(m));
        }
        assert_eq!(Movement::from_key('w'), Some(Movement::Forward));
        assert_eq!(Movement::from_key('q'), None);
    }

    #[test]
    fn press_and_release() {
        let mut flags = MovementFlags::new();
        assert!(flags.handle_key('r', true));
        assert!(flags.up);
        assert!(flags.any());
        assert!(flags.handle_key('r', false));
        assert!(!flags.up);
        assert!(!flags.any());
    }

    #[test]
    fn opposing_flags_coexist() {
        let mut flags = MovementFlags::new();
        flags.handle_key('a', true);
        flags.handle_key('d', true);
        assert!(flags.left && flags.right);
    }

    #[test]
    fn unbound_key_is_ignored() {
        let mut flags = MovementFlags::new();
        assert!(!flags.handle_key('x', true));
        assert_eq!(flags, MovementFlags::default());
    }

    #[test]
    fn clear_releases_everything() {
        let mut flags = MovementFlags::new();
        for m in Movement::ALL {
            flags.set(m, true);
        }
        flags.clear();
        assert!(!flags.any());
    }
}
