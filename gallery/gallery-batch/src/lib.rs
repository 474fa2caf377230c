//! Batch orchestration for MeshGallery.
//!
//! This crate ties the pipeline together: it walks a directory tree for
//! STL/OBJ files ([`enumerate`]), processes one mesh end to end in a
//! child process ([`worker`]), and schedules those children across a
//! bounded pool with cooperative cancellation ([`scheduler`]).
//!
//! The `mesh-gallery` binary is a thin CLI over these modules.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod enumerate;
pub mod error;
pub mod scheduler;
pub mod worker;

pub use enumerate::{enumerate_tasks, RenderTask};
pub use error::{BatchError, TaskError};
pub use scheduler::{parse_worker_count, BatchSummary, WorkerPool, DEFAULT_WORKER_COUNT};
pub use worker::process_mesh;
