//! The two canonical preview camera poses.
//!
//! Both poses are pure constants, independent of mesh content: the mesh
//! has already been normalized into a canonical frame centered at the
//! origin, so the same two cameras frame every mesh the same way.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use std::f64::consts::FRAC_PI_2;

/// Camera-to-world pose for the top view.
///
/// The camera sits at (0, 0, 5) with no rotation, looking along -Z
/// toward the origin.
///
/// # Example
///
/// ```
/// use gallery_render::camera::top_view;
/// use nalgebra::Point3;
///
/// // The world origin is 5 units in front of the camera
/// let view = top_view().inverse();
/// let origin_in_camera = view * Point3::origin();
/// assert!((origin_in_camera.z - (-5.0)).abs() < 1e-12);
/// ```
#[must_use]
pub fn top_view() -> Isometry3<f64> {
    Isometry3::translation(0.0, 0.0, 5.0)
}

/// Camera-to-world pose for the front view.
///
/// The camera is translated to (0, -5, 0) and rotated +90° about the X
/// axis, so it looks along +Y toward the origin. The rotation is applied
/// second (pose = translation · rotation); the order matters.
#[must_use]
pub fn front_view() -> Isometry3<f64> {
    let translation = Translation3::new(0.0, -5.0, 0.0);
    let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
    Isometry3::from_parts(translation, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn poses_are_deterministic() {
        // Bit-for-bit reproducible across invocations
        assert_eq!(top_view().to_homogeneous(), top_view().to_homogeneous());
        assert_eq!(
            front_view().to_homogeneous(),
            front_view().to_homogeneous()
        );
    }

    #[test]
    fn top_view_faces_origin() {
        let origin_in_camera = top_view().inverse() * Point3::origin();
        // Camera looks along -Z: origin must be at negative camera z
        assert_relative_eq!(origin_in_camera.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(origin_in_camera.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(origin_in_camera.z, -5.0, epsilon = 1e-12);
    }

    #[test]
    fn front_view_faces_origin() {
        let origin_in_camera = front_view().inverse() * Point3::origin();
        // The +90° X rotation turns the +Y offset into -Z depth
        assert_relative_eq!(origin_in_camera.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(origin_in_camera.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(origin_in_camera.z, -5.0, epsilon = 1e-9);
    }

    #[test]
    fn front_view_composes_translation_then_rotation() {
        let pose = front_view();
        // Translation component is unaffected by the rotation (T · R)
        assert_relative_eq!(pose.translation.vector.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(pose.translation.vector.y, -5.0, epsilon = 1e-12);
        assert_relative_eq!(pose.translation.vector.z, 0.0, epsilon = 1e-12);
    }
}
