//! Benchmarks for canonical normalization.
//!
//! Run with: cargo bench -p gallery-normalize

#![allow(missing_docs, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gallery_normalize::{canonicalize, compute_vertex_normals};
use gallery_types::{IndexedMesh, Vertex};

/// Create a tessellated sphere-ish mesh with roughly `n` vertices.
fn create_blob(n: usize) -> IndexedMesh {
    let mut mesh = IndexedMesh::new();
    let rings = (n as f64).sqrt() as usize;

    for i in 0..rings {
        for j in 0..rings {
            let theta = (i as f64) / (rings as f64) * std::f64::consts::PI;
            let phi = (j as f64) / (rings as f64) * std::f64::consts::TAU;
            mesh.vertices.push(Vertex::from_coords(
                theta.sin() * phi.cos() * 500.0,
                theta.sin() * phi.sin() * 500.0,
                theta.cos() * 500.0,
            ));
        }
    }

    for i in 0..rings - 1 {
        for j in 0..rings - 1 {
            let a = (i * rings + j) as u32;
            let b = a + 1;
            let c = a + rings as u32;
            let d = c + 1;
            mesh.faces.push([a, b, c]);
            mesh.faces.push([b, d, c]);
        }
    }

    mesh
}

fn bench_canonicalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonicalize");

    for size in [1_000, 10_000, 100_000] {
        let mesh = create_blob(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &mesh, |b, mesh| {
            b.iter(|| {
                let mut m = mesh.clone();
                canonicalize(black_box(&mut m));
                m
            });
        });
    }

    group.finish();
}

fn bench_vertex_normals(c: &mut Criterion) {
    let mesh = create_blob(10_000);
    c.bench_function("compute_vertex_normals_10k", |b| {
        b.iter(|| {
            let mut m = mesh.clone();
            compute_vertex_normals(black_box(&mut m));
            m
        });
    });
}

criterion_group!(benches, bench_canonicalize, bench_vertex_normals);
criterion_main!(benches);
