use roadster_common::Transform;
use roadster_input::InputState;

use crate::camera::{self, CameraPose};
use crate::params::{FollowParams, SimConfig, VehicleParams};
use crate::vehicle::{self, VehicleState};

/// Everything the frame loop owns: the car, the camera and the tuning that
/// drives them.
///
/// One [`Simulation::tick`] is one rendered frame at the default pacing: throttle,
/// steering and friction increments are per tick, not per second.
#[derive(Debug, Clone)]
pub struct Simulation {
    vehicle: VehicleState,
    camera: CameraPose,
    params: VehicleParams,
    follow: FollowParams,
    tick: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Simulation {
    /// Car at rest at the origin, camera at its starting pose.
    pub fn new(config: SimConfig) -> Self {
        Self {
            vehicle: VehicleState::at_rest(config.vehicle.ride_height),
            camera: CameraPose::default(),
            params: config.vehicle,
            follow: config.follow,
            tick: 0,
        }
    }

    /// Start from an explicit vehicle state, e.g. a car already moving.
    pub fn with_vehicle(config: SimConfig, vehicle: VehicleState) -> Self {
        Self {
            vehicle,
            ..Self::new(config)
        }
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    pub fn config(&self) -> SimConfig {
        SimConfig {
            vehicle: self.params,
            follow: self.follow,
        }
    }

    /// Number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Advance one tick: step the car, then pull the camera after it.
    pub fn tick(&mut self, input: &InputState) -> VehicleState {
        self.vehicle = vehicle::step(input, self.vehicle, &self.params);
        self.camera = camera::follow(self.camera, &self.vehicle, &self.follow);
        self.tick += 1;
        tracing::trace!(
            tick = self.tick,
            %input,
            speed = self.vehicle.speed,
            heading = self.vehicle.heading,
            "tick"
        );
        self.vehicle
    }

    /// Run `n` ticks holding the same input.
    pub fn run(&mut self, input: &InputState, n: u32) -> VehicleState {
        for _ in 0..n {
            self.tick(input);
        }
        self.vehicle
    }

    /// Transform of the car body for the renderer.
    pub fn car_transform(&self) -> Transform {
        self.vehicle.transform()
    }

    /// Deterministic FNV-1a hash over the tick count and every scalar of
    /// vehicle and camera state.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        let v = &self.vehicle;
        let c = &self.camera;
        for x in [
            v.speed,
            v.heading,
            v.position.x,
            v.position.y,
            v.position.z,
            c.position.x,
            c.position.y,
            c.position.z,
            c.look_at.x,
            c.look_at.y,
            c.look_at.z,
        ] {
            mix(&mut h, &x.to_le_bytes());
        }
        h
    }
}
