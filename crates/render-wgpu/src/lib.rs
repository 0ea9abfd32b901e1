//! wgpu render backend for roadster.
//!
//! Draws the ground plane and the car box with Lambert shading from one
//! directional light plus ambient. The view comes from the simulation's
//! chase camera pose; this crate only adds the projection.
//!
//! # Invariants
//! - Renderer never mutates simulation state.
//! - Static geometry is uploaded once; per frame only the car instance and
//!   the camera uniform change.

mod camera;
mod gpu;
mod shaders;

pub use camera::PerspectiveCamera;
pub use gpu::WgpuRenderer;
