use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::params::FollowParams;
use crate::vehicle::VehicleState;

/// Where the camera sits and what it looks at. Recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraPose {
    /// Starting pose: above and behind the origin, looking at it.
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 20.0),
            look_at: Vec3::ZERO,
        }
    }
}

/// The point the camera is heading for: `distance` behind the car along its
/// heading and `height` above it.
pub fn desired_position(vehicle: &VehicleState, params: &FollowParams) -> Vec3 {
    let offset = Vec3::new(
        -vehicle.heading.sin() * params.distance,
        params.height,
        -vehicle.heading.cos() * params.distance,
    );
    vehicle.position + offset
}

/// Move the camera `smoothing` of the way toward its desired point and aim it
/// at the car.
///
/// The smoothing is per tick, so how quickly the camera settles depends on
/// the tick rate.
pub fn follow(pose: CameraPose, vehicle: &VehicleState, params: &FollowParams) -> CameraPose {
    let target = desired_position(vehicle, params);
    CameraPose {
        position: pose.position.lerp(target, params.smoothing),
        look_at: vehicle.position,
    }
}
