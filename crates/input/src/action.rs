/// Physical keys the demo listens to, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    X,
    B,
    F1,
    Space,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    Escape,
}

/// Camera-local movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Back,
}

/// A high-level action produced from raw input.
///
/// The camera and scene consume actions, never raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Held while the key is down.
    Move(Direction),
    /// Return the camera to its start position and rotation.
    ResetCamera,
    /// Leave the application.
    Exit,
    /// Switch to the next bloom preset.
    CycleBloomPreset,
    /// Show or hide the overlay panel.
    ToggleOverlay,
}

/// Default key to action mapping.
pub fn default_binding(key: Key) -> Action {
    match key {
        Key::Up | Key::Space => Action::Move(Direction::Up),
        Key::Down | Key::X => Action::Move(Direction::Down),
        Key::Left | Key::A => Action::Move(Direction::Left),
        Key::Right | Key::D => Action::Move(Direction::Right),
        Key::PageUp | Key::W => Action::Move(Direction::Forward),
        Key::PageDown | Key::S => Action::Move(Direction::Back),
        Key::Home => Action::ResetCamera,
        Key::Escape => Action::Exit,
        Key::B => Action::CycleBloomPreset,
        Key::F1 => Action::ToggleOverlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paired_keys_share_a_direction() {
        assert_eq!(default_binding(Key::W), default_binding(Key::PageUp));
        assert_eq!(default_binding(Key::Space), default_binding(Key::Up));
        assert_eq!(default_binding(Key::X), default_binding(Key::Down));
        assert_eq!(default_binding(Key::A), Action::Move(Direction::Left));
        assert_eq!(default_binding(Key::D), Action::Move(Direction::Right));
        assert_eq!(default_binding(Key::S), Action::Move(Direction::Back));
    }

    #[test]
    fn one_shot_actions() {
        assert_eq!(default_binding(Key::Home), Action::ResetCamera);
        assert_eq!(default_binding(Key::Escape), Action::Exit);
        assert_eq!(default_binding(Key::B), Action::CycleBloomPreset);
        assert_eq!(default_binding(Key::F1), Action::ToggleOverlay);
    }
}
