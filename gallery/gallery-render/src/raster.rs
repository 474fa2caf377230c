//! Software rasterizer for preview images.
//!
//! A deliberately small forward rasterizer: perspective projection,
//! z-buffered edge-function triangle fill, flat (per-face) Lambertian
//! shading with one ambient term and one directional light. Meshes are
//! rendered double-sided; the face normal is flipped toward the viewer
//! before shading so inverted geometry still lights up.

use gallery_types::{IndexedMesh, MeshTopology, VertexColor};
use image::{Rgba, RgbaImage};
use nalgebra::{Isometry3, Perspective3, Point3, Vector3};

use crate::error::{RenderError, RenderResult};
use crate::params::RenderParams;

/// A triangle projected to screen space, ready for filling.
struct ScreenTriangle {
    /// Screen-space positions (x, y in pixels, z in NDC depth).
    points: [Vector3<f64>; 3],
    /// Shaded fill color.
    color: Rgba<u8>,
}

/// Render a mesh from the given camera pose into an RGBA image.
///
/// # Arguments
///
/// * `mesh` - The mesh to render (normalized and tinted by the caller)
/// * `camera_pose` - Camera-to-world pose
/// * `params` - Scene and viewport parameters
///
/// # Errors
///
/// Returns [`RenderError::NoGeometry`] if the mesh has no vertices or
/// faces.
pub fn render(
    mesh: &IndexedMesh,
    camera_pose: &Isometry3<f64>,
    params: &RenderParams,
) -> RenderResult<RgbaImage> {
    if mesh.is_empty() {
        return Err(RenderError::NoGeometry);
    }

    let mut image = RgbaImage::from_pixel(
        params.width,
        params.height,
        Rgba(params.background),
    );
    let mut depth = vec![f64::INFINITY; (params.width * params.height) as usize];

    let view = camera_pose.inverse();
    let projection = Perspective3::new(
        f64::from(params.width) / f64::from(params.height),
        params.yfov_deg.to_radians(),
        params.znear,
        params.zfar,
    );

    // A directional light shines along its pose's -Z axis.
    let light_dir = params.light_pose.rotation * -Vector3::z();
    let camera_position = Point3::from(camera_pose.translation.vector);

    for (face, tri) in mesh.faces.iter().zip(mesh.triangles()) {
        let Some(screen) = project_triangle(
            mesh, face, &tri, &view, &projection, params, &light_dir, &camera_position,
        ) else {
            continue;
        };

        fill_triangle(&mut image, &mut depth, params, &screen);
    }

    Ok(image)
}

/// Project and shade one triangle; `None` when it cannot contribute
/// (behind the near plane, degenerate, or numerically invalid).
#[allow(clippy::too_many_arguments)]
fn project_triangle(
    mesh: &IndexedMesh,
    face: &[u32; 3],
    tri: &gallery_types::Triangle,
    view: &Isometry3<f64>,
    projection: &Perspective3<f64>,
    params: &RenderParams,
    light_dir: &Vector3<f64>,
    camera_position: &Point3<f64>,
) -> Option<ScreenTriangle> {
    let world = [tri.v0, tri.v1, tri.v2];

    let mut points = [Vector3::zeros(); 3];
    for (point, vertex) in points.iter_mut().zip(&world) {
        let in_camera = view * vertex;

        // The camera looks along -Z; skip triangles that reach the near
        // plane rather than clipping them (normalized meshes sit well
        // inside the frustum).
        if in_camera.z >= -params.znear {
            return None;
        }

        let ndc = projection.project_point(&in_camera);
        if !ndc.x.is_finite() || !ndc.y.is_finite() || !ndc.z.is_finite() {
            return None;
        }

        *point = Vector3::new(
            (ndc.x + 1.0) * 0.5 * f64::from(params.width),
            (1.0 - ndc.y) * 0.5 * f64::from(params.height),
            ndc.z,
        );
    }

    let mut normal = tri.normal()?;

    // Double-sided: flip the normal toward the viewer.
    let to_camera = camera_position - tri.centroid();
    if normal.dot(&to_camera) < 0.0 {
        normal = -normal;
    }

    let color = shade(mesh, face, &normal, light_dir, params);

    Some(ScreenTriangle { points, color })
}

/// Flat Lambertian shading for one face.
///
/// The diffuse term carries the 1/π BRDF normalization, which keeps the
/// tinted mesh below pure white even at full exposure.
fn shade(
    mesh: &IndexedMesh,
    face: &[u32; 3],
    normal: &Vector3<f64>,
    light_dir: &Vector3<f64>,
    params: &RenderParams,
) -> Rgba<u8> {
    let tint = mesh
        .vertex(face[0] as usize)
        .and_then(gallery_types::Vertex::color)
        .unwrap_or(VertexColor::WHITE);
    let (r, g, b) = tint.to_float();

    let diffuse = normal.dot(&-light_dir).max(0.0);
    let shade = params.ambient + params.light_intensity * diffuse / std::f64::consts::PI;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // Clamped to [0, 1] before quantization
    let quantize = |channel: f32| -> u8 {
        let lit = f64::from(channel) * shade;
        (lit.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([quantize(r), quantize(g), quantize(b), tint.a])
}

/// Z-buffered edge-function fill.
fn fill_triangle(
    image: &mut RgbaImage,
    depth: &mut [f64],
    params: &RenderParams,
    screen: &ScreenTriangle,
) {
    let [a, b, c] = &screen.points;

    // Signed twice-area; near-zero means a degenerate sliver.
    let area = edge(a, b, c);
    if area.abs() < 1e-12 {
        return;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (min_x, max_x, min_y, max_y) = {
        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
        let max_x = (a.x.max(b.x).max(c.x).ceil() as i64)
            .clamp(0, i64::from(params.width) - 1) as u32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
        let max_y = (a.y.max(b.y).max(c.y).ceil() as i64)
            .clamp(0, i64::from(params.height) - 1) as u32;
        (min_x, max_x, min_y, max_y)
    };

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Vector3::new(f64::from(x) + 0.5, f64::from(y) + 0.5, 0.0);

            // Barycentric weights; dividing by the signed area makes the
            // test winding-independent.
            let w0 = edge(b, c, &p) / area;
            let w1 = edge(c, a, &p) / area;
            let w2 = edge(a, b, &p) / area;

            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let z = w0 * a.z + w1 * b.z + w2 * c.z;
            let index = (y * params.width + x) as usize;

            if z < depth[index] {
                depth[index] = z;
                image.put_pixel(x, y, screen.color);
            }
        }
    }
}

/// 2D edge function on the screen-space XY plane.
#[inline]
fn edge(a: &Vector3<f64>, b: &Vector3<f64>, p: &Vector3<f64>) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
