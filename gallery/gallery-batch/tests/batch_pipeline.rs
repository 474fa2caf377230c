//! End-to-end batch tests: enumeration, per-mesh processing, resume
//! behavior, and the worker pool against stub commands.

#![allow(clippy::unwrap_used)]

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use gallery_batch::enumerate::{enumerate_tasks, RenderTask};
use gallery_batch::error::TaskError;
use gallery_batch::scheduler::WorkerPool;
use gallery_batch::worker::process_mesh;
use gallery_io::save_stl;
use gallery_types::unit_cube;

/// Write a valid binary STL cube and an OBJ with no geometry.
fn fixture_tree(dir: &Path) -> (PathBuf, PathBuf) {
    let cube_path = dir.join("a.stl");
    save_stl(&unit_cube(), &cube_path).unwrap();

    let empty_path = dir.join("b.obj");
    fs::write(&empty_path, "# no geometry\n").unwrap();

    (cube_path, empty_path)
}

#[test]
fn enumeration_finds_meshes_in_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    fixture_tree(dir.path());
    fs::create_dir(dir.path().join("nested")).unwrap();
    save_stl(&unit_cube(), dir.path().join("nested").join("c.stl")).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let tasks = enumerate_tasks(dir.path());
    let inputs: Vec<_> = tasks
        .iter()
        .map(|t| t.input.file_name().unwrap().to_str().unwrap().to_owned())
        .collect();
    assert_eq!(inputs, ["a.stl", "b.obj", "c.stl"]);
}

#[test]
fn reloaded_stl_keeps_winding_defects_detectable() {
    let dir = tempfile::tempdir().unwrap();

    // One locally flipped face must still be visible as a conflict
    // after the save/load roundtrip.
    let flipped_path = dir.path().join("flipped.stl");
    let mut flipped = unit_cube();
    flipped.faces[0].swap(1, 2);
    save_stl(&flipped, &flipped_path).unwrap();

    let loaded = gallery_io::load_mesh(&flipped_path).unwrap();
    assert!(!gallery_normalize::is_winding_consistent(&loaded));

    // An inside-out mesh with a local conflict gets flipped back by
    // the repair step.
    let inverted_path = dir.path().join("inverted.stl");
    let mut inverted = unit_cube();
    inverted.flip_normals();
    inverted.faces[0].swap(1, 2);
    save_stl(&inverted, &inverted_path).unwrap();

    let mut loaded_inverted = gallery_io::load_mesh(&inverted_path).unwrap();
    assert!(loaded_inverted.signed_volume() < 0.0);
    gallery_normalize::repair_winding(&mut loaded_inverted);
    assert!(loaded_inverted.signed_volume() > 0.0);
}

#[test]
fn valid_mesh_produces_both_previews() {
    let dir = tempfile::tempdir().unwrap();
    let (cube_path, _) = fixture_tree(dir.path());

    let task = RenderTask::for_mesh(&cube_path).unwrap();
    let outcome = process_mesh(&task).unwrap();
    assert!(outcome.contains("a.stl"));

    assert!(task.top_output.exists());
    assert!(task.front_output.exists());

    let top = image::open(&task.top_output).unwrap().to_rgba8();
    assert_eq!(top.dimensions(), (800, 800));
}

#[test]
fn empty_mesh_fails_the_task_without_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let (_, empty_path) = fixture_tree(dir.path());

    let task = RenderTask::for_mesh(&empty_path).unwrap();
    let err = process_mesh(&task).unwrap_err();
    assert!(matches!(err, TaskError::EmptyMesh { .. }));
    assert!(!task.top_output.exists());
    assert!(!task.front_output.exists());
}

#[test]
fn unreadable_file_fails_the_task() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.stl");

    let task = RenderTask::for_mesh(&missing).unwrap();
    let err = process_mesh(&task).unwrap_err();
    assert!(matches!(err, TaskError::Load { .. }));
}

#[test]
fn completed_meshes_are_skipped_on_the_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let (cube_path, _) = fixture_tree(dir.path());

    let task = RenderTask::for_mesh(&cube_path).unwrap();
    process_mesh(&task).unwrap();

    // The cube is done; only the empty OBJ (which produced nothing)
    // remains in the queue.
    let tasks = enumerate_tasks(dir.path());
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].input.file_name().unwrap(), "b.obj");
}

#[test]
fn missing_view_is_regenerated_without_touching_the_other() {
    let dir = tempfile::tempdir().unwrap();
    let (cube_path, _) = fixture_tree(dir.path());

    let task = RenderTask::for_mesh(&cube_path).unwrap();
    process_mesh(&task).unwrap();

    fs::remove_file(&task.top_output).unwrap();
    let front_before = fs::metadata(&task.front_output).unwrap().modified().unwrap();

    // One image missing: the file is enumerated again.
    let tasks = enumerate_tasks(dir.path());
    assert!(tasks.iter().any(|t| t.input == cube_path));

    process_mesh(&task).unwrap();
    assert!(task.top_output.exists());
    let front_after = fs::metadata(&task.front_output).unwrap().modified().unwrap();
    assert_eq!(front_before, front_after, "existing view must not be rewritten");
}

#[test]
fn pool_drains_queue_with_stub_workers() {
    let dir = tempfile::tempdir().unwrap();
    fixture_tree(dir.path());
    let tasks = enumerate_tasks(dir.path());
    assert_eq!(tasks.len(), 2);

    // Echo stands in for the worker binary; its output becomes the
    // recorded outcome line.
    let pool = WorkerPool::with_command(PathBuf::from("/bin/echo"), Vec::new(), 2);
    let summary = pool.run(&tasks, &AtomicBool::new(false));

    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);
    assert!(!summary.cancelled);

    assert_eq!(summary.outcomes.len(), 2);
    assert!(summary.outcomes.iter().any(|line| line.contains("a.stl")));
    assert!(summary.outcomes.iter().any(|line| line.contains("b.obj")));
}

#[test]
fn mixed_batch_reports_one_success_one_failure() {
    let dir = tempfile::tempdir().unwrap();
    fixture_tree(dir.path());
    let tasks = enumerate_tasks(dir.path());

    // Drive the real worker binary in single-mesh mode.
    let pool = WorkerPool::with_command(
        PathBuf::from(env!("CARGO_BIN_EXE_mesh-gallery")),
        vec![OsString::from("--render-one")],
        2,
    );
    let summary = pool.run(&tasks, &AtomicBool::new(false));

    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert!(!summary.cancelled);

    // The valid cube got both previews; the empty OBJ got none.
    assert!(dir.path().join("a_top_view.png").exists());
    assert!(dir.path().join("a_front_view.png").exists());
    assert!(!dir.path().join("b_top_view.png").exists());
    assert!(!dir.path().join("b_front_view.png").exists());

    assert!(summary.outcomes.iter().any(|line| line.contains("empty mesh")));
}

#[test]
fn pool_survives_workers_that_outwrite_the_pipe_buffer() {
    let dir = tempfile::tempdir().unwrap();
    fixture_tree(dir.path());
    let tasks = enumerate_tasks(dir.path());

    // Far more output than a pipe buffers; the pool must keep reading
    // while the child runs instead of waiting for it to exit.
    let pool = WorkerPool::with_command(
        PathBuf::from("/bin/sh"),
        vec![OsString::from("-c"), OsString::from("seq 1 50000; echo done")],
        2,
    );
    let summary = pool.run(&tasks, &AtomicBool::new(false));

    assert_eq!(summary.completed, 2);
    assert_eq!(summary.succeeded, 2);
    assert!(summary.outcomes.iter().all(|line| line == "done"));
}

#[test]
fn pool_counts_worker_failures() {
    let dir = tempfile::tempdir().unwrap();
    fixture_tree(dir.path());
    let tasks = enumerate_tasks(dir.path());

    let pool = WorkerPool::with_command(PathBuf::from("/bin/false"), Vec::new(), 1);
    let summary = pool.run(&tasks, &AtomicBool::new(false));

    assert_eq!(summary.completed, 2);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 2);
    // A silent failing worker still yields a synthesized outcome line
    assert!(summary
        .outcomes
        .iter()
        .all(|line| line.starts_with("Error processing")));
}

#[test]
fn pool_counts_spawn_failures() {
    let dir = tempfile::tempdir().unwrap();
    fixture_tree(dir.path());
    let tasks = enumerate_tasks(dir.path());

    let pool = WorkerPool::with_command(
        PathBuf::from("/nonexistent/worker-binary"),
        Vec::new(),
        2,
    );
    let summary = pool.run(&tasks, &AtomicBool::new(false));

    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 2);
}

#[test]
fn cli_requires_root_directory() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_mesh-gallery"))
        .output()
        .unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "expected usage text, got: {stderr}");
}

#[test]
fn cli_rejects_nonexistent_root() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_mesh-gallery"))
        .arg("/definitely/not/a/directory")
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn cancelled_pool_dispatches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fixture_tree(dir.path());
    let tasks = enumerate_tasks(dir.path());

    let cancel = AtomicBool::new(true);
    let pool = WorkerPool::with_command(
        PathBuf::from("/bin/true"),
        vec![OsString::from("ignored")],
        4,
    );
    let summary = pool.run(&tasks, &cancel);

    assert!(summary.cancelled);
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.succeeded, 0);
    assert!(summary.outcomes.is_empty());
}
