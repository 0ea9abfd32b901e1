use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Transform placed at `position`, rotated `yaw` radians about +Y.
    pub fn from_position_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw),
            scale: Vec3::ONE,
        }
    }
}

/// An sRGB colour with 8-bit channels, written as a `0xRRGGBB` hex literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);

    pub fn r(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub fn g(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub fn b(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Channels in `[0, 1]`, still sRGB encoded.
    pub fn to_srgb_f32(self) -> [f32; 3] {
        [
            self.r() as f32 / 255.0,
            self.g() as f32 / 255.0,
            self.b() as f32 / 255.0,
        ]
    }

    /// Channels decoded to linear light, for writing into an sRGB render target.
    pub fn to_linear_f32(self) -> [f32; 3] {
        self.to_srgb_f32().map(srgb_to_linear)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn yaw_zero_faces_positive_z() {
        let t = Transform::from_position_yaw(Vec3::ZERO, 0.0);
        let fwd = t.rotation * Vec3::Z;
        assert!((fwd - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn positive_yaw_turns_forward_toward_positive_x() {
        let t = Transform::from_position_yaw(Vec3::ZERO, std::f32::consts::FRAC_PI_2);
        let fwd = t.rotation * Vec3::Z;
        assert!((fwd - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn color_channels() {
        let c = Color(0x87ceeb);
        assert_eq!((c.r(), c.g(), c.b()), (0x87, 0xce, 0xeb));
        assert_eq!(c.to_string(), "#87ceeb");
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert_eq!(Color(0x000000).to_linear_f32(), [0.0, 0.0, 0.0]);
        let white = Color::WHITE.to_linear_f32();
        for c in white {
            assert!((c - 1.0).abs() < 1e-6);
        }
        let red = Color(0xff0000).to_linear_f32();
        assert!(red[0] > 0.99 && red[1] == 0.0 && red[2] == 0.0);
    }
}
