//! Batch preview generator for STL/OBJ meshes.
//!
//! Walks a directory tree, and for every mesh file without both preview
//! images renders a standardized top view and front view PNG next to
//! the input. Work is spread across single-task worker processes;
//! Ctrl-C stops dispatching, kills running workers, and exits non-zero.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gallery_batch::enumerate::{enumerate_tasks, RenderTask};
use gallery_batch::error::BatchError;
use gallery_batch::scheduler::{parse_worker_count, WorkerPool};
use gallery_batch::worker::process_mesh;

#[derive(Parser, Debug)]
#[command(
    name = "mesh-gallery",
    version,
    about = "Generate standardized top and front preview images for STL/OBJ meshes"
)]
struct Args {
    /// Directory tree to scan for mesh files
    #[arg(required_unless_present = "render_one")]
    root: Option<PathBuf>,

    /// Number of worker processes (falls back to 4 when malformed)
    worker_count: Option<String>,

    /// Process a single mesh file and exit (used by worker processes)
    #[arg(long, hide = true, value_name = "MESH")]
    render_one: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Some(path) = args.render_one.as_deref() {
        return render_one(path);
    }

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Worker-process entry point: process one mesh and exit.
fn render_one(path: &Path) -> ExitCode {
    let Some(task) = RenderTask::for_mesh(path) else {
        println!("Error processing {}: not a supported mesh file", path.display());
        return ExitCode::FAILURE;
    };

    match process_mesh(&task) {
        Ok(outcome) => {
            println!("{outcome}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("Error processing {}: {err}", path.display());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    // clap enforces the root argument unless --render-one was given
    let Some(root) = args.root.as_deref() else {
        return Err(BatchError::MissingRoot.into());
    };
    if !root.is_dir() {
        return Err(BatchError::NotADirectory {
            path: root.to_path_buf(),
        }
        .into());
    }

    let tasks = enumerate_tasks(root);
    if tasks.is_empty() {
        println!("No STL/OBJ files need processing.");
        return Ok(ExitCode::SUCCESS);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            cancel.store(true, Ordering::SeqCst);
        })
        .context("failed to install Ctrl-C handler")?;
    }

    let worker_count = parse_worker_count(args.worker_count.as_deref());
    println!(
        "Processing {} file(s) with {} worker(s)...",
        tasks.len(),
        worker_count
    );

    let pool = WorkerPool::new(worker_count).map_err(BatchError::WorkerExecutable)?;
    let summary = pool.run(&tasks, &cancel);

    if summary.cancelled {
        println!("Processing interrupted; shutting down workers.");
        return Ok(ExitCode::FAILURE);
    }

    println!(
        "Processing complete. {} succeeded, {} failed.",
        summary.succeeded, summary.failed
    );
    Ok(ExitCode::SUCCESS)
}
