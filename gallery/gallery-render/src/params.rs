//! Fixed scene and viewport parameters for preview rendering.

use nalgebra::Isometry3;

/// The canonical dark background color, RGBA.
pub const BACKGROUND: [u8; 4] = [40, 40, 40, 255];

/// Scene and viewport configuration for one preview render.
///
/// The defaults are the canonical preview recipe; the pipeline never
/// overrides them, but tests render at smaller resolutions.
#[derive(Debug, Clone)]
pub struct RenderParams {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Clear color, RGBA.
    pub background: [u8; 4],
    /// Ambient light intensity applied to each channel.
    pub ambient: f64,
    /// Directional light intensity.
    pub light_intensity: f64,
    /// Pose of the directional light.
    ///
    /// Only the orientation affects shading (the light is directional
    /// and shines along the pose's -Z axis); the translation (2, 2, 5)
    /// is part of the recipe and kept for fidelity.
    pub light_pose: Isometry3<f64>,
    /// Vertical field of view in degrees.
    pub yfov_deg: f64,
    /// Near clipping plane distance.
    pub znear: f64,
    /// Far clipping plane distance.
    pub zfar: f64,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            background: BACKGROUND,
            ambient: 0.3,
            light_intensity: 3.0,
            light_pose: Isometry3::translation(2.0, 2.0, 5.0),
            yfov_deg: 60.0,
            znear: 0.01,
            zfar: 100.0,
        }
    }
}

impl RenderParams {
    /// Parameters for a small test render.
    #[must_use]
    pub fn for_tests(size: u32) -> Self {
        Self {
            width: size,
            height: size,
            ..Self::default()
        }
    }
}
