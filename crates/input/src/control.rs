use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::script::ScriptError;

/// One of the four directional controls the car responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Control {
    Forward,
    Back,
    Left,
    Right,
}

impl Control {
    pub const ALL: [Control; 4] = [
        Control::Forward,
        Control::Back,
        Control::Left,
        Control::Right,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Control::Forward => "forward",
            Control::Back => "back",
            Control::Left => "left",
            Control::Right => "right",
        }
    }
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Control {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "f" | "up" => Ok(Control::Forward),
            "back" | "b" | "down" => Ok(Control::Back),
            "left" | "l" => Ok(Control::Left),
            "right" | "r" => Ok(Control::Right),
            other => Err(ScriptError::UnknownControl(other.to_string())),
        }
    }
}

/// Set of currently held controls, as plain flags.
///
/// Written by key-event handlers, read once per tick. All flags default to
/// released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    /// No control held.
    pub const NONE: InputState = InputState {
        forward: false,
        back: false,
        left: false,
        right: false,
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper: the same state with `control` held.
    pub fn with(mut self, control: Control) -> Self {
        self.set(control, true);
        self
    }

    pub fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::Forward => self.forward = held,
            Control::Back => self.back = held,
            Control::Left => self.left = held,
            Control::Right => self.right = held,
        }
    }

    pub fn is_held(&self, control: Control) -> bool {
        match control {
            Control::Forward => self.forward,
            Control::Back => self.back,
            Control::Left => self.left,
            Control::Right => self.right,
        }
    }

    /// True when forward or back is held, i.e. the throttle is in use.
    pub fn throttle_held(&self) -> bool {
        self.forward || self.back
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Held controls in declaration order.
    pub fn held(&self) -> impl Iterator<Item = Control> + '_ {
        Control::ALL.into_iter().filter(|c| self.is_held(*c))
    }
}

impl FromIterator<Control> for InputState {
    fn from_iter<I: IntoIterator<Item = Control>>(iter: I) -> Self {
        let mut state = Self::default();
        for control in iter {
            state.set(control, true);
        }
        state
    }
}

impl std::fmt::Display for InputState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.held().map(Control::name).collect();
        f.write_str(&names.join("+"))
    }
}
