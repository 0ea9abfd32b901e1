//! Input collaborator: raw keys mapped to the driving controls.
//!
//! # Invariants
//! - The simulation consumes [`InputState`] flags, never raw key events.
//! - A control is held while any key bound to it is held.

pub mod bindings;
pub mod control;
pub mod script;

pub use bindings::KeyBindings;
pub use control::{Control, InputState};
pub use script::{InputScript, ScriptError};

pub fn crate_info() -> &'static str {
    "roadster-input v0.1.0"
}
