use glam::Vec3;
use roadster_common::Transform;
use roadster_input::InputState;
use serde::{Deserialize, Serialize};

use crate::params::VehicleParams;

/// Kinematic state of the car.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Signed speed along the heading, world units per tick.
    pub speed: f32,
    /// Rotation about +Y in radians. Zero faces +Z. Not wrapped.
    pub heading: f32,
    /// World position. `y` stays at the ride height.
    pub position: Vec3,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::at_rest(VehicleParams::default().ride_height)
    }
}

impl VehicleState {
    /// Stationary at the origin, facing +Z.
    pub fn at_rest(ride_height: f32) -> Self {
        Self {
            speed: 0.0,
            heading: 0.0,
            position: Vec3::new(0.0, ride_height, 0.0),
        }
    }

    pub fn is_stationary(&self) -> bool {
        self.speed == 0.0
    }

    /// Transform handed to the renderer for the car body.
    pub fn transform(&self) -> Transform {
        Transform::from_position_yaw(self.position, self.heading)
    }
}

/// Advance the car by one tick.
///
/// Order matters and is fixed: throttle, clamp, steering, friction,
/// integration. Steering reads the clamped speed before friction is applied,
/// so a car that coasts to a stop can still turn on its final tick.
pub fn step(input: &InputState, state: VehicleState, params: &VehicleParams) -> VehicleState {
    let mut next = state;

    if input.forward {
        next.speed += params.acceleration;
    }
    if input.back {
        next.speed -= params.acceleration;
    }

    // min/max rather than f32::clamp so unvalidated bounds cannot panic.
    let unclamped = next.speed;
    next.speed = next.speed.max(-params.max_speed).min(params.max_speed);
    if next.speed != unclamped && state.speed.abs() < params.max_speed {
        tracing::debug!(speed = next.speed, "speed limit reached");
    }

    if next.speed != 0.0 {
        if input.left {
            next.heading += params.turn_speed;
        }
        if input.right {
            next.heading -= params.turn_speed;
        }
    }

    if !input.throttle_held() {
        if next.speed > 0.0 {
            next.speed -= params.friction;
        }
        if next.speed < 0.0 {
            next.speed += params.friction;
        }
        // Snap instead of oscillating around zero.
        if next.speed.abs() < params.friction {
            next.speed = 0.0;
        }
    }

    next.position.x += next.heading.sin() * next.speed;
    next.position.z += next.heading.cos() * next.speed;

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadster_input::Control;

    const EPS: f32 = 1e-6;

    fn params() -> VehicleParams {
        VehicleParams::default()
    }

    fn held(controls: &[Control]) -> InputState {
        controls.iter().copied().collect()
    }

    fn moving(speed: f32) -> VehicleState {
        VehicleState {
            speed,
            ..VehicleState::default()
        }
    }

    #[test]
    fn forward_from_rest_accelerates_and_moves_along_z() {
        let s = step(&held(&[Control::Forward]), VehicleState::default(), &params());
        assert_eq!(s.speed, 0.01);
        assert_eq!(s.position.x, 0.0);
        assert!((s.position.z - 0.01).abs() < EPS);
        assert_eq!(s.position.y, 0.5);
    }

    #[test]
    fn speed_is_clamped_at_max() {
        let s = step(&held(&[Control::Forward]), moving(0.5), &params());
        assert_eq!(s.speed, 0.5);
    }

    #[test]
    fn reverse_is_clamped_at_negative_max() {
        let s = step(&held(&[Control::Back]), moving(-0.5), &params());
        assert_eq!(s.speed, -0.5);
    }

    #[test]
    fn small_residual_speed_snaps_to_zero() {
        let s = step(&InputState::NONE, moving(0.003), &params());
        assert_eq!(s.speed, 0.0);
        let s = step(&InputState::NONE, moving(-0.003), &params());
        assert_eq!(s.speed, 0.0);
    }

    #[test]
    fn friction_reduces_magnitude_by_one_decrement() {
        let s = step(&InputState::NONE, moving(0.2), &params());
        assert!((s.speed - 0.195).abs() < EPS);
        let s = step(&InputState::NONE, moving(-0.2), &params());
        assert!((s.speed + 0.195).abs() < EPS);
    }

    #[test]
    fn no_friction_while_throttle_held() {
        // Forward and back cancel out; friction must not apply.
        let s = step(&held(&[Control::Forward, Control::Back]), moving(0.2), &params());
        assert!((s.speed - 0.2).abs() < EPS);
    }

    #[test]
    fn steering_ignored_when_stationary() {
        let s = step(&held(&[Control::Left]), VehicleState::default(), &params());
        assert_eq!(s.heading, 0.0);
        let s = step(&held(&[Control::Right]), VehicleState::default(), &params());
        assert_eq!(s.heading, 0.0);
    }

    #[test]
    fn left_increases_heading_right_decreases() {
        let s = step(&held(&[Control::Forward, Control::Left]), moving(0.1), &params());
        assert!((s.heading - 0.03).abs() < EPS);
        let s = step(&held(&[Control::Forward, Control::Right]), moving(0.1), &params());
        assert!((s.heading + 0.03).abs() < EPS);
        let s = step(
            &held(&[Control::Forward, Control::Left, Control::Right]),
            moving(0.1),
            &params(),
        );
        assert_eq!(s.heading, 0.0);
    }

    #[test]
    fn steering_applies_on_the_tick_speed_reaches_zero() {
        // Steering sees the pre-friction speed.
        let s = step(&held(&[Control::Left]), moving(0.003), &params());
        assert_eq!(s.speed, 0.0);
        assert!((s.heading - 0.03).abs() < EPS);
    }

    #[test]
    fn position_delta_follows_heading() {
        for heading in [0.0_f32, 0.7, 1.5, -2.3, 10.0] {
            let start = VehicleState {
                speed: 0.3,
                heading,
                position: Vec3::new(4.0, 0.5, -2.0),
            };
            let s = step(&held(&[Control::Forward]), start, &params());
            let dx = heading.sin() * s.speed;
            let dz = heading.cos() * s.speed;
            assert!((s.position.x - (4.0 + dx)).abs() < EPS);
            assert!((s.position.z - (-2.0 + dz)).abs() < EPS);
            assert_eq!(s.position.y, 0.5);
        }
    }

    #[test]
    fn speed_never_exceeds_limit_under_any_input() {
        let p = params();
        let mut s = VehicleState::default();
        let inputs = [
            held(&[Control::Forward]),
            held(&[Control::Forward, Control::Left]),
            held(&[Control::Back]),
            InputState::NONE,
            held(&[Control::Back, Control::Right]),
        ];
        for i in 0..2000 {
            // Long runs of each input so the limit is actually reached.
            let input = inputs[(i / 150) % inputs.len()];
            s = step(&input, s, &p);
            assert!(s.speed.abs() <= p.max_speed);
        }
    }

    #[test]
    fn coasting_stops_exactly_within_bound() {
        let p = params();
        for s0 in [0.5_f32, -0.5, 0.123, -0.0371, 0.005, 0.0049] {
            let bound = (s0.abs() / p.friction).ceil() as u32;
            let mut s = moving(s0);
            let mut frames = 0;
            while s.speed != 0.0 {
                s = step(&InputState::NONE, s, &p);
                frames += 1;
                assert!(frames <= bound, "s0={s0} took more than {bound} frames");
            }
            assert_eq!(s.speed, 0.0);
        }
    }

    #[test]
    fn unvalidated_bounds_do_not_panic() {
        let p = VehicleParams {
            max_speed: -1.0,
            ..VehicleParams::default()
        };
        let s = step(&held(&[Control::Forward]), VehicleState::default(), &p);
        assert!(s.speed.is_finite());
    }

    #[test]
    fn transform_carries_heading() {
        let s = VehicleState {
            heading: std::f32::consts::FRAC_PI_2,
            ..VehicleState::default()
        };
        let t = s.transform();
        assert!((t.rotation * Vec3::Z - Vec3::X).length() < EPS);
        assert_eq!(t.position, s.position);
    }
}
