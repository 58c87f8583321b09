use roomfly_input::Key;
use winit::keyboard::KeyCode;

/// Map a physical winit key to the keys the demo binds.
pub fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyB => Key::B,
        KeyCode::F1 => Key::F1,
        KeyCode::Space => Key::Space,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    };
    Some(key)
}
