use glam::Vec3;
use roadster_common::Color;

/// Flat ground, centred on the origin at y = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneShape {
    pub width: f32,
    pub depth: f32,
    pub color: Color,
}

/// Axis-aligned box in its local frame, centred on its transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    pub size: Vec3,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Position the light shines from, toward the origin.
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector pointing from the scene toward the light.
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or(Vec3::Y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Perspective projection settings. Aspect ratio comes from the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

/// Static scene handed to a renderer once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Color,
    pub ground: PlaneShape,
    pub car: BoxShape,
    pub sun: DirectionalLight,
    pub ambient: AmbientLight,
    pub lens: Lens,
}

impl Default for Scene {
    /// Sky-blue backdrop, 500 x 500 green ground, red 2 x 1 x 4 car.
    fn default() -> Self {
        Self {
            background: Color(0x87ceeb),
            ground: PlaneShape {
                width: 500.0,
                depth: 500.0,
                color: Color(0x228b22),
            },
            car: BoxShape {
                size: Vec3::new(2.0, 1.0, 4.0),
                color: Color(0xff0000),
            },
            sun: DirectionalLight {
                position: Vec3::new(10.0, 20.0, 10.0),
                color: Color::WHITE,
                intensity: 1.0,
            },
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.4,
            },
            lens: Lens {
                fov_degrees: 75.0,
                near: 0.1,
                far: 1000.0,
            },
        }
    }
}

impl Scene {
    /// Half the car's height: the ride height that keeps its underside on the
    /// ground.
    pub fn car_ride_height(&self) -> f32 {
        self.car.size.y * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_layout() {
        let s = Scene::default();
        assert_eq!(s.background, Color(0x87ceeb));
        assert_eq!(s.ground.width, 500.0);
        assert_eq!(s.car.size, Vec3::new(2.0, 1.0, 4.0));
        assert_eq!(s.lens.fov_degrees, 75.0);
    }

    #[test]
    fn car_sits_on_the_ground() {
        assert_eq!(Scene::default().car_ride_height(), 0.5);
    }

    #[test]
    fn light_direction_is_normalized() {
        let d = Scene::default().sun.direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!(d.y > 0.0);
    }
}
