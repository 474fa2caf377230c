//! STL (Stereolithography) file format support.
//!
//! Supports both ASCII and binary STL formats.
//!
//! # Format Detection
//!
//! The loader automatically detects whether a file is ASCII or binary:
//! - ASCII files start with "solid" (after optional whitespace)
//! - Binary files have an 80-byte header followed by face count
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored, often contains file info)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector (often not accurate)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (usually 0)
//! end
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use gallery_types::{IndexedMesh, MeshTopology, Vector3, Vertex};
use hashbrown::HashMap;

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Cap on buffer preallocation from the header's face count. The count
/// is untrusted input; anything beyond the cap grows as triangles are
/// actually read.
const MAX_PREALLOC_FACES: usize = 1 << 20;

/// Load a mesh from an STL file.
///
/// Automatically detects ASCII vs binary format.
///
/// # Arguments
///
/// * `path` - Path to the STL file
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file content is not valid STL
///
/// # Example
///
/// ```no_run
/// use gallery_io::load_stl;
///
/// let mesh = load_stl("model.stl").unwrap();
/// println!("Loaded {} faces", mesh.faces.len());
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
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

    let mut reader = BufReader::new(file);

    // Read enough to determine format
    let mut header = [0u8; HEADER_SIZE + 4];
    let bytes_read = reader.read(&mut header)?;

    if bytes_read < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }

    // Check if ASCII (starts with "solid")
    let header_str = String::from_utf8_lossy(&header[..bytes_read.min(HEADER_SIZE)]);
    let trimmed = header_str.trim_start();

    let mut mesh = if trimmed.starts_with("solid") && !is_binary_stl_header(&header[..bytes_read]) {
        // ASCII format - need to re-read from start
        drop(reader);
        let file = File::open(path)?;
        load_stl_ascii(BufReader::new(file))?
    } else {
        // Binary format - continue reading
        load_stl_binary_from_header(&header[..bytes_read], reader)?
    };

    // STL repeats each vertex per triangle; merge coincident ones so
    // shared edges exist for downstream winding analysis.
    weld_vertices(&mut mesh);
    Ok(mesh)
}

/// Check if the header suggests binary STL despite starting with "solid".
///
/// Some binary STLs happen to have "solid" in the header. We check by
/// looking for null bytes, which never appear in an ASCII header.
fn is_binary_stl_header(header: &[u8]) -> bool {
    if header.len() < HEADER_SIZE + 4 {
        return false;
    }

    header[..HEADER_SIZE].contains(&0)
}

/// Load a binary STL given the already-read header.
fn load_stl_binary_from_header<R: Read>(header: &[u8], mut reader: R) -> IoResult<IndexedMesh> {
    if header.len() < HEADER_SIZE + 4 {
        return Err(IoError::InvalidHeader {
            expected: HEADER_SIZE + 4,
            got: header.len(),
        });
    }

    // Face count is stored after the 80-byte header
    let face_count = u32::from_le_bytes([
        header[HEADER_SIZE],
        header[HEADER_SIZE + 1],
        header[HEADER_SIZE + 2],
        header[HEADER_SIZE + 3],
    ]);

    let capacity = (face_count as usize).min(MAX_PREALLOC_FACES);
    let mut mesh = IndexedMesh::with_capacity(capacity * 3, capacity);

    // Read triangles
    let mut triangle_buf = [0u8; TRIANGLE_SIZE];
    for i in 0..face_count {
        if let Err(err) = reader.read_exact(&mut triangle_buf) {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                return Err(IoError::InvalidFaceCount {
                    expected: face_count,
                    got: i,
                });
            }
            return Err(IoError::Io(err));
        }

        // Skip normal (12 bytes), read 3 vertices (36 bytes total)
        let v0 = read_vertex(&triangle_buf[12..24]);
        let v1 = read_vertex(&triangle_buf[24..36]);
        let v2 = read_vertex(&triangle_buf[36..48]);

        #[allow(clippy::cast_possible_truncation)]
        // Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
        let base_idx = mesh.vertices.len() as u32;
        mesh.vertices.push(v0);
        mesh.vertices.push(v1);
        mesh.vertices.push(v2);
        mesh.faces.push([base_idx, base_idx + 1, base_idx + 2]);
    }

    Ok(mesh)
}

/// Read a vertex from 12 bytes (3 f32s).
fn read_vertex(buf: &[u8]) -> Vertex {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Vertex::from_coords(f64::from(x), f64::from(y), f64::from(z))
}

/// Merge bitwise-identical vertex positions and remap faces.
///
/// STL stores every triangle with its own three vertices, so a freshly
/// parsed mesh never shares an edge between faces. Welding restores the
/// real adjacency, which winding-consistency analysis depends on.
fn weld_vertices(mesh: &mut IndexedMesh) {
    let mut index_of: HashMap<[u64; 3], u32> = HashMap::with_capacity(mesh.vertices.len());
    let mut remap = Vec::with_capacity(mesh.vertices.len());
    let mut welded: Vec<Vertex> = Vec::new();

    for vertex in &mesh.vertices {
        let key = [
            vertex.position.x.to_bits(),
            vertex.position.y.to_bits(),
            vertex.position.z.to_bits(),
        ];
        #[allow(clippy::cast_possible_truncation)]
        // Welding only shrinks the index space below the loaded count
        let next = welded.len() as u32;
        let index = *index_of.entry(key).or_insert_with(|| {
            welded.push(vertex.clone());
            next
        });
        remap.push(index);
    }

    for face in &mut mesh.faces {
        for index in face {
            *index = remap[*index as usize];
        }
    }
    mesh.vertices = welded;
}

/// Load an ASCII STL file.
fn load_stl_ascii<R: BufRead>(reader: R) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut in_facet = false;
    let mut in_loop = false;
    let mut vertices_in_face: Vec<Vertex> = Vec::with_capacity(3);

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0].to_lowercase().as_str() {
            "facet" => {
                in_facet = true;
                // Normal follows but we ignore it (recompute if needed)
            }
            "outer" => {
                if parts.len() >= 2 && parts[1].eq_ignore_ascii_case("loop") {
                    in_loop = true;
                    vertices_in_face.clear();
                }
            }
            "vertex" => {
                if in_loop && parts.len() >= 4 {
                    let x: f64 = parts[1].parse()?;
                    let y: f64 = parts[2].parse()?;
                    let z: f64 = parts[3].parse()?;
                    vertices_in_face.push(Vertex::from_coords(x, y, z));
                }
            }
            "endloop" => {
                in_loop = false;
            }
            "endfacet" => {
                if in_facet && vertices_in_face.len() == 3 {
                    #[allow(clippy::cast_possible_truncation)]
                    // Truncation: mesh indices are u32, meshes with >4B vertices unsupported
                    let base_idx = mesh.vertices.len() as u32;
                    mesh.vertices.append(&mut vertices_in_face);
                    mesh.faces.push([base_idx, base_idx + 1, base_idx + 2]);
                }
                in_facet = false;
            }
            "endsolid" => {
                break;
            }
            _ => {
                // Ignore unknown lines
            }
        }
    }

    Ok(mesh)
}

/// Save a mesh to a binary STL file.
///
/// Face normals are recomputed from the winding; degenerate faces get a
/// zero normal.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use gallery_io::save_stl;
/// use gallery_types::unit_cube;
///
/// save_stl(&unit_cube(), "cube.stl").unwrap();
/// ```
pub fn save_stl<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    // 80-byte header
    let mut header = [0u8; HEADER_SIZE];
    let tag = b"MeshGallery binary STL";
    header[..tag.len()].copy_from_slice(tag);
    writer.write_all(&header)?;

    #[allow(clippy::cast_possible_truncation)]
    // Truncation: meshes with >4B faces are unsupported by the format
    let face_count = mesh.faces.len() as u32;
    writer.write_all(&face_count.to_le_bytes())?;

    for tri in mesh.triangles() {
        let normal = tri.normal().unwrap_or_else(Vector3::zeros);

        write_vec3(&mut writer, normal.x, normal.y, normal.z)?;
        write_vec3(&mut writer, tri.v0.x, tri.v0.y, tri.v0.z)?;
        write_vec3(&mut writer, tri.v1.x, tri.v1.y, tri.v1.z)?;
        write_vec3(&mut writer, tri.v2.x, tri.v2.y, tri.v2.z)?;

        // Attribute byte count
        writer.write_all(&0u16.to_le_bytes())?;
    }

    writer.flush()?;
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: STL stores f32; precision loss is inherent to the format
fn write_vec3<W: Write>(writer: &mut W, x: f64, y: f64, z: f64) -> IoResult<()> {
    writer.write_all(&(x as f32).to_le_bytes())?;
    writer.write_all(&(y as f32).to_le_bytes())?;
    writer.write_all(&(z as f32).to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ASCII_TRIANGLE: &str = "\
solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test
";

    #[test]
    fn ascii_stl_parses_single_facet() {
        let mesh = load_stl_ascii(Cursor::new(ASCII_TRIANGLE)).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert!((mesh.vertices[1].position.x - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ascii_stl_ignores_incomplete_facet() {
        let input = "solid t\n  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n    endloop\n  endfacet\nendsolid t\n";
        let mesh = load_stl_ascii(Cursor::new(input)).unwrap();
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn binary_stl_zero_faces() {
        let mut data = vec![0u8; HEADER_SIZE + 4];
        data[HEADER_SIZE..].copy_from_slice(&0u32.to_le_bytes());
        let mesh = load_stl_binary_from_header(&data, Cursor::new(&[] as &[u8])).unwrap();
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn binary_stl_truncated_triangle_errors() {
        let mut data = vec![0u8; HEADER_SIZE + 4];
        data[HEADER_SIZE..].copy_from_slice(&1u32.to_le_bytes());
        let result = load_stl_binary_from_header(&data, Cursor::new(&[0u8; 10] as &[u8]));
        assert!(matches!(
            result,
            Err(IoError::InvalidFaceCount {
                expected: 1,
                got: 0
            })
        ));
    }

    #[test]
    fn weld_merges_duplicate_positions() {
        let mut mesh = IndexedMesh::new();
        for _ in 0..2 {
            mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
            mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
            mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        }
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([5, 4, 3]); // same triangle, reversed winding

        weld_vertices(&mut mesh);

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces[0], [0, 1, 2]);
        assert_eq!(mesh.faces[1], [2, 1, 0]);
    }

    #[test]
    fn binary_stl_header_face_count_is_not_trusted() {
        // A corrupt header claiming u32::MAX faces must fail at the
        // first missing triangle, not on allocation.
        let mut data = vec![0u8; HEADER_SIZE + 4];
        data[HEADER_SIZE..].copy_from_slice(&u32::MAX.to_le_bytes());
        let result = load_stl_binary_from_header(&data, Cursor::new(&[] as &[u8]));
        assert!(matches!(
            result,
            Err(IoError::InvalidFaceCount {
                expected: u32::MAX,
                got: 0
            })
        ));
    }

    #[test]
    fn binary_header_detection() {
        // Header that starts with "solid" but contains nulls -> binary
        let mut header = vec![0u8; HEADER_SIZE + 4];
        header[..5].copy_from_slice(b"solid");
        assert!(is_binary_stl_header(&header));

        // Pure ASCII prefix without nulls -> not binary
        let ascii = vec![b' '; HEADER_SIZE + 4];
        assert!(!is_binary_stl_header(&ascii));
    }
}
