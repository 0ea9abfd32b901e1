use roadster_common::Transform;
use roadster_kernel::{CameraPose, Simulation};

use crate::scene::Scene;

/// What changes from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub tick: u64,
    /// Car body transform.
    pub car: Transform,
    pub camera: CameraPose,
}

impl FrameView {
    pub fn from_simulation(sim: &Simulation) -> Self {
        Self {
            tick: sim.tick_count(),
            car: sim.car_transform(),
            camera: *sim.camera(),
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer receives the static scene and the current frame view, then
/// produces output. It has no way to write back into the simulation.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, scene: &Scene, frame: &FrameView) -> Self::Output;
}

/// Text renderer for headless runs and tests.
///
/// Produces a human-readable description of the frame.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, frame: &FrameView) -> String {
        let p = frame.car.position;
        let (yaw, _, _) = frame.car.rotation.to_euler(glam::EulerRot::YXZ);
        let eye = frame.camera.position;
        let target = frame.camera.look_at;

        let mut out = String::new();
        out.push_str(&format!("=== Frame (tick={}) ===\n", frame.tick));
        out.push_str(&format!(
            "Car: pos=({:.3}, {:.3}, {:.3}) yaw={:.3} color={}\n",
            p.x, p.y, p.z, yaw, scene.car.color
        ));
        out.push_str(&format!(
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0}\n",
            eye.x, eye.y, eye.z, target.x, target.y, target.z, scene.lens.fov_degrees
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadster_input::{Control, InputState};

    #[test]
    fn debug_renderer_initial_frame() {
        let sim = Simulation::default();
        let frame = FrameView::from_simulation(&sim);
        let out = DebugTextRenderer::new().render(&Scene::default(), &frame);

        assert!(out.contains("tick=0"));
        assert!(out.contains("pos=(0.000, 0.500, 0.000)"));
        assert!(out.contains("eye=(0.00, 10.00, 20.00)"));
        assert!(out.contains("fov=75"));
    }

    #[test]
    fn debug_renderer_tracks_the_car() {
        let mut sim = Simulation::default();
        sim.tick(&InputState::NONE.with(Control::Forward));
        let frame = FrameView::from_simulation(&sim);
        let out = DebugTextRenderer::new().render(&Scene::default(), &frame);

        assert!(out.contains("tick=1"));
        assert!(out.contains("pos=(0.000, 0.500, 0.010)"));
        assert!(out.contains("color=#ff0000"));
    }

    #[test]
    fn frame_view_copies_simulation() {
        let mut sim = Simulation::default();
        sim.run(&InputState::NONE.with(Control::Forward), 3);
        let view = FrameView::from_simulation(&sim);
        assert_eq!(view.tick, 3);
        assert_eq!(view.car.position, sim.vehicle().position);
        assert_eq!(view.camera, *sim.camera());
    }
}
