//! Rendering adapter: renderer-agnostic scene and frame interface.
//!
//! # Invariants
//! - Static geometry is described once, up front, by [`Scene`].
//! - Each frame only carries the car transform and the camera pose.
//! - Renderers never mutate simulation state.

mod renderer;
mod scene;

pub use renderer::{DebugTextRenderer, FrameView, Renderer};
pub use scene::{AmbientLight, BoxShape, DirectionalLight, Lens, PlaneShape, Scene};

pub fn crate_info() -> &'static str {
    "roadster-render v0.1.0"
}
