//! Shared types used by every roadster crate.

mod types;

pub use types::{Color, Transform};
