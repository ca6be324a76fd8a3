use glam::Vec2;
use smallvec::SmallVec;

/// Direction keys that move the eye while held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionKey {
    Left,
    Right,
    Up,
    Down,
    Closer,
    Farther,
}

/// What a key press means to the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Move(DirectionKey),
    ResetView,
    StopTracking,
}

#[inline]
pub fn key_action_for(key: &str) -> Option<KeyAction> {
    match key {
        "ArrowLeft" => Some(KeyAction::Move(DirectionKey::Left)),
        "ArrowRight" => Some(KeyAction::Move(DirectionKey::Right)),
        "ArrowUp" => Some(KeyAction::Move(DirectionKey::Up)),
        "ArrowDown" => Some(KeyAction::Move(DirectionKey::Down)),
        "q" | "Q" => Some(KeyAction::Move(DirectionKey::Closer)),
        "e" | "E" => Some(KeyAction::Move(DirectionKey::Farther)),
        "r" | "R" => Some(KeyAction::ResetView),
        "Escape" => Some(KeyAction::StopTracking),
        _ => None,
    }
}

#[derive(Clone, Debug, Default)]
pub struct HeldKeys {
    keys: SmallVec<[DirectionKey; 6]>,
}

impl HeldKeys {
    pub fn press(&mut self, key: DirectionKey) {
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    pub fn release(&mut self, key: DirectionKey) {
        self.keys.retain(|k| *k != key);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_held(&self, key: DirectionKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DirectionKey> + '_ {
        self.keys.iter().copied()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PointerDrag {
    pub active: bool,
    pub last: Vec2,
}

/// Everything the orchestrator consumes at the start of a frame.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub pointer_delta: Vec2,
    pub wheel_delta: f32,
    pub held: HeldKeys,
    pub reset_requested: bool,
    pub stop_tracking_requested: bool,
}

/// Buffers browser input between frames.
///
/// Event handlers only record here; the viewer drains once per tick, so all
/// input is sampled before tracking and projection run.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    drag: PointerDrag,
    pending_pointer: Vec2,
    pending_wheel: f32,
    held: HeldKeys,
    reset_requested: bool,
    stop_tracking_requested: bool,
}

impl InputState {
    /// Begin a drag. Only the primary button (0) drags the view.
    pub fn pointer_down(&mut self, button: i16, x: f32, y: f32) {
        if button != 0 {
            return;
        }
        self.drag = PointerDrag {
            active: true,
            last: Vec2::new(x, y),
        };
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !self.drag.active {
            return;
        }
        let pos = Vec2::new(x, y);
        self.pending_pointer += pos - self.drag.last;
        self.drag.last = pos;
    }

    pub fn pointer_up(&mut self) {
        self.drag.active = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.active
    }

    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y.is_finite() {
            self.pending_wheel += delta_y;
        }
    }

    /// Record a key press. Returns true when the key is one the viewer uses.
    pub fn key_down(&mut self, key: &str) -> bool {
        match key_action_for(key) {
            Some(KeyAction::Move(dir)) => self.held.press(dir),
            Some(KeyAction::ResetView) => self.reset_requested = true,
            Some(KeyAction::StopTracking) => self.stop_tracking_requested = true,
            None => return false,
        }
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match key_action_for(key) {
            Some(KeyAction::Move(dir)) => {
                self.held.release(dir);
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Drop held keys and any drag, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
        self.drag.active = false;
    }

    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    pub fn drain(&mut self) -> FrameInput {
        FrameInput {
            pointer_delta: std::mem::take(&mut self.pending_pointer),
            wheel_delta: std::mem::take(&mut self.pending_wheel),
            held: self.held.clone(),
            reset_requested: std::mem::take(&mut self.reset_requested),
            stop_tracking_requested: std::mem::take(&mut self.stop_tracking_requested),
        }
    }
}
