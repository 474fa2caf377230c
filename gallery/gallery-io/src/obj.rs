//! OBJ (Wavefront) file format support.
//!
//! ASCII only. Reads `v` and `f` statements; everything else (normals,
//! texture coordinates, groups, materials) is ignored. Face entries may
//! use the `v`, `v/vt`, `v//vn`, or `v/vt/vn` forms; only the position
//! index is kept. Indices are 1-based, and negative indices count back
//! from the most recently read vertex. Faces with more than three
//! vertices are fan-triangulated.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use gallery_types::{IndexedMesh, Vertex};

use crate::error::{IoError, IoResult};

/// Load a mesh from an OBJ file.
///
/// # Arguments
///
/// * `path` - Path to the OBJ file
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - A vertex or face statement is malformed
/// - A face references a vertex that does not exist
///
/// # Example
///
/// ```no_run
/// use gallery_io::load_obj;
///
/// let mesh = load_obj("model.obj").unwrap();
/// println!("Loaded {} faces", mesh.faces.len());
/// ```
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;

    load_obj_reader(BufReader::new(file))
}

/// Load an OBJ mesh from any buffered reader.
fn load_obj_reader<R: BufRead>(reader: R) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let coords = parse_position(&mut parts)?;
                mesh.vertices.push(Vertex::from_coords(
                    coords[0], coords[1], coords[2],
                ));
            }
            "f" => {
                let indices = parse_face_indices(parts, mesh.vertices.len())?;
                // Fan triangulation for polygons
                for i in 1..indices.len().saturating_sub(1) {
                    mesh.faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
            _ => {
                // vn, vt, g, o, s, usemtl, mtllib, ... are not needed for previews
            }
        }
    }

    Ok(mesh)
}

/// Parse the three coordinates of a `v` statement.
fn parse_position<'a>(parts: &mut impl Iterator<Item = &'a str>) -> IoResult<[f64; 3]> {
    let mut coords = [0.0f64; 3];
    for coord in &mut coords {
        let token = parts
            .next()
            .ok_or_else(|| IoError::invalid_content("vertex statement with fewer than 3 coordinates"))?;
        *coord = token.parse()?;
    }
    Ok(coords)
}

/// Parse the vertex indices of an `f` statement into zero-based indices.
#[allow(clippy::cast_possible_wrap)]
// Wrap: vertex counts beyond i64 are unreachable (u32 index space)
fn parse_face_indices<'a>(
    parts: impl Iterator<Item = &'a str>,
    vertex_count: usize,
) -> IoResult<Vec<u32>> {
    let mut indices = Vec::with_capacity(3);

    for entry in parts {
        // Keep only the position index of "v", "v/vt", "v//vn", "v/vt/vn"
        let position_token = entry.split('/').next().unwrap_or(entry);
        let raw: i64 = position_token.parse()?;

        let resolved: i64 = if raw < 0 {
            // Negative indices are relative to the last vertex read so far
            vertex_count as i64 + raw
        } else {
            raw - 1
        };

        if resolved < 0 || resolved >= vertex_count as i64 {
            return Err(IoError::IndexOutOfRange {
                index: raw,
                vertex_count,
            });
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        // Range-checked above; mesh indices are u32 by design
        indices.push(resolved as u32);
    }

    if indices.len() < 3 {
        return Err(IoError::invalid_content(
            "face statement with fewer than 3 vertices",
        ));
    }

    Ok(indices)
}
