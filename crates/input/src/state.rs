use crate::action::{Action, Direction, Key, default_binding};
use glam::{Vec2, Vec3};
use std::collections::BTreeSet;

/// Whether pointer motion steers the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerMode {
    /// Cursor visible, motion ignored.
    #[default]
    Absolute,
    /// Cursor captured, motion rotates the camera.
    Relative,
}

/// Set of held movement directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveIntent {
    held: BTreeSet<Direction>,
}

impl MoveIntent {
    pub fn is_idle(&self) -> bool {
        self.held.is_empty()
    }

    /// Camera-local intent: each held direction adds ±1 on its axis.
    /// Left is `+X` to match the right-handed look-at view.
    pub fn vector(&self) -> Vec3 {
        let mut v = Vec3::ZERO;
        for direction in &self.held {
            match direction {
                Direction::Up => v.y += 1.0,
                Direction::Down => v.y -= 1.0,
                Direction::Left => v.x += 1.0,
                Direction::Right => v.x -= 1.0,
                Direction::Forward => v.z += 1.0,
                Direction::Back => v.z -= 1.0,
            }
        }
        v
    }
}

/// Per-frame input state: held keys, pointer mode, accumulated pointer
/// motion, and queued one-shot actions.
#[derive(Debug, Default)]
pub struct InputState {
    keys_held: BTreeSet<Key>,
    pointer_mode: PointerMode,
    pointer_delta: Vec2,
    pending: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer_mode
    }

    /// Record a key transition. One-shot actions are queued on press only.
    pub fn key(&mut self, key: Key, pressed: bool) {
        if !pressed {
            self.keys_held.remove(&key);
            return;
        }
        // Auto-repeat presses do not queue one-shot actions again.
        if !self.keys_held.insert(key) {
            return;
        }
        match default_binding(key) {
            Action::Move(_) => {}
            action => {
                tracing::debug!(?key, ?action, "queued action");
                self.pending.push(action);
            }
        }
    }

    /// Relative mode while the steering button is held.
    pub fn pointer_button(&mut self, pressed: bool) {
        self.pointer_mode = if pressed {
            PointerMode::Relative
        } else {
            PointerMode::Absolute
        };
        if !pressed {
            self.pointer_delta = Vec2::ZERO;
        }
    }

    /// Accumulate raw pointer motion. Ignored in absolute mode and for
    /// non-finite samples.
    pub fn pointer_motion(&mut self, dx: f32, dy: f32) {
        if self.pointer_mode != PointerMode::Relative {
            return;
        }
        if !(dx.is_finite() && dy.is_finite()) {
            tracing::warn!(dx, dy, "dropping non-finite pointer motion");
            return;
        }
        self.pointer_delta += Vec2::new(dx, dy);
    }

    /// Motion accumulated since the last call.
    pub fn take_pointer_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.pointer_delta)
    }

    pub fn move_intent(&self) -> MoveIntent {
        let held = self
            .keys_held
            .iter()
            .filter_map(|k| match default_binding(*k) {
                Action::Move(d) => Some(d),
                _ => None,
            })
            .collect();
        MoveIntent { held }
    }

    /// One-shot actions queued since the last call, in press order.
    pub fn drain_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.pending)
    }

    /// Forget everything held, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys_held.clear();
        self.pointer_mode = PointerMode::Absolute;
        self.pointer_delta = Vec2::ZERO;
    }
}
