//! PNG output and the white-pixel background fixup.

use std::path::Path;

use gallery_types::IndexedMesh;
use image::{Rgba, RgbaImage};
use nalgebra::Isometry3;
use tracing::debug;

use crate::error::RenderResult;
use crate::params::RenderParams;
use crate::raster::render;

/// Replace every exactly-white, fully-opaque pixel with the given
/// background color.
///
/// Pure white pixels are rendering artifacts (antialiasing fringes or
/// alpha-blend remnants against a white default) that stand out against
/// the dark preview background. The pass is deterministic and
/// idempotent: once no pure-white pixels remain, re-running it changes
/// nothing.
pub fn enforce_background(image: &mut RgbaImage, background: [u8; 4]) {
    let replacement = Rgba([background[0], background[1], background[2], 255]);
    for pixel in image.pixels_mut() {
        if pixel.0 == [255, 255, 255, 255] {
            *pixel = replacement;
        }
    }
}

/// Render a mesh from one camera pose and write the PNG to `path`.
///
/// After the raw render is written, the file is re-opened and run
/// through [`enforce_background`], matching the two-pass recipe. On
/// failure nothing is (durably) written; the caller logs a warning for
/// the affected view and continues.
///
/// # Errors
///
/// Returns an error if the mesh has no geometry or the file cannot be
/// encoded, written, or re-read.
pub fn render_to_file<P: AsRef<Path>>(
    mesh: &IndexedMesh,
    camera_pose: &Isometry3<f64>,
    params: &RenderParams,
    path: P,
) -> RenderResult<()> {
    let path = path.as_ref();

    let image = render(mesh, camera_pose, params)?;
    image.save(path)?;

    // Second pass over the written file
    let mut written = image::open(path)?.to_rgba8();
    enforce_background(&mut written, params.background);
    written.save(path)?;

    debug!(path = %path.display(), "wrote preview image");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::camera::top_view;
    use crate::params::BACKGROUND;
    use gallery_types::{unit_cube, Vector3, VertexColor};

    fn image_with_white_pixels() -> RgbaImage {
        let mut image = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        image.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        image.put_pixel(7, 7, Rgba([255, 255, 255, 255]));
        // Nearly-white and translucent-white pixels must survive
        image.put_pixel(3, 3, Rgba([255, 255, 254, 255]));
        image.put_pixel(4, 4, Rgba([255, 255, 255, 128]));
        image
    }

    #[test]
    fn fixup_replaces_only_opaque_pure_white() {
        let mut image = image_with_white_pixels();
        enforce_background(&mut image, BACKGROUND);

        assert_eq!(image.get_pixel(0, 0).0, [40, 40, 40, 255]);
        assert_eq!(image.get_pixel(7, 7).0, [40, 40, 40, 255]);
        assert_eq!(image.get_pixel(3, 3).0, [255, 255, 254, 255]);
        assert_eq!(image.get_pixel(4, 4).0, [255, 255, 255, 128]);
        assert_eq!(image.get_pixel(5, 5).0, [10, 20, 30, 255]);
    }

    #[test]
    fn fixup_is_idempotent() {
        let mut once = image_with_white_pixels();
        enforce_background(&mut once, BACKGROUND);

        let mut twice = once.clone();
        enforce_background(&mut twice, BACKGROUND);

        assert_eq!(once.as_raw(), twice.as_raw());
    }

    #[test]
    fn render_to_file_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview_top_view.png");

        let mut cube = unit_cube();
        cube.translate(Vector3::new(-0.5, -0.5, -0.5));
        cube.scale(2.5);
        cube.set_uniform_color(VertexColor::new(200, 150, 100));

        render_to_file(&cube, &top_view(), &RenderParams::for_tests(32), &path).unwrap();

        let written = image::open(&path).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (32, 32));
        // No pure white survives the fixup
        assert!(written.pixels().all(|p| p.0 != [255, 255, 255, 255]));
    }
}
