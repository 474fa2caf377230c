//! Single-mesh processing: the work one child process performs.

use gallery_normalize::{apply_preview_tint, canonicalize, repair_winding};
use gallery_render::{camera, render_to_file, RenderParams};
use gallery_types::MeshTopology;
use tracing::{info, warn};

use crate::enumerate::RenderTask;
use crate::error::TaskError;

/// Load, normalize, and render one mesh into its two preview images.
///
/// The pipeline per mesh:
///
/// 1. Load the STL/OBJ file.
/// 2. Reject empty geometry.
/// 3. Canonicalize size and position, repair winding, apply the tint.
/// 4. Render each view whose output file does not exist yet.
///
/// Returns the outcome line for the task. A view that fails to render
/// logs a warning and does not fail the task; load and empty-geometry
/// failures do.
///
/// # Errors
///
/// Returns [`TaskError::Load`] when the file cannot be read or parsed,
/// and [`TaskError::EmptyMesh`] when it contains no geometry.
pub fn process_mesh(task: &RenderTask) -> Result<String, TaskError> {
    let mut mesh = gallery_io::load_mesh(&task.input).map_err(|source| TaskError::Load {
        path: task.input.clone(),
        source,
    })?;

    if mesh.is_empty() {
        return Err(TaskError::EmptyMesh {
            path: task.input.clone(),
        });
    }

    info!(
        path = %task.input.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "processing mesh"
    );

    canonicalize(&mut mesh);
    repair_winding(&mut mesh);
    apply_preview_tint(&mut mesh);

    let params = RenderParams::default();
    let views = [
        ("top", camera::top_view(), &task.top_output),
        ("front", camera::front_view(), &task.front_output),
    ];

    for (name, pose, output) in views {
        if output.exists() {
            println!("Skipping (exists): {}", output.display());
            continue;
        }
        match render_to_file(&mesh, &pose, &params, output) {
            Ok(()) => println!("Rendered {name} view => {}", output.display()),
            Err(err) => warn!(path = %output.display(), %err, "failed to render view"),
        }
    }

    Ok(format!("Processed {}", task.input.display()))
}
