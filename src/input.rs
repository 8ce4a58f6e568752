use glam::Vec2;

/// Per-tick input intents, filled by whoever polls the devices.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Input {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    /// edge-triggered, cleared by `consume`
    pub jump: bool,
    /// edge-triggered, cleared by `consume`
    pub dash: bool,
    /// accumulated mouse motion since the last tick
    pub look: Vec2,
}

impl Input {
    /// Reset the per-tick parts (requests and look delta), keep held keys.
    pub fn consume(&mut self) {
        self.jump = false;
        self.dash = false;
        self.look = Vec2::ZERO;
    }
}
