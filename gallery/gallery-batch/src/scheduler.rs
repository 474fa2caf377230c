//! Parallel scheduling of mesh tasks across worker processes.
//!
//! Each task runs in its own child process (the binary re-invoked with a
//! hidden per-mesh flag), so a crash while parsing or rendering one
//! pathological file cannot take down the batch. The pool keeps at most
//! `worker_count` children alive, reaps them as they finish, and checks
//! a shared cancellation flag before every dispatch. Workers report
//! through their stdout; the pool republishes those lines in completion
//! order and records the final outcome line of each task.

use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};

use crate::enumerate::RenderTask;

/// Worker count used when the CLI argument is missing or malformed.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// How often the pool polls running children for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Interpret the optional worker-count argument.
///
/// A missing, malformed, or zero value silently falls back to
/// [`DEFAULT_WORKER_COUNT`]; an unparseable count is not worth aborting
/// a long batch over.
#[must_use]
pub fn parse_worker_count(arg: Option<&str>) -> usize {
    arg.and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|&count| count > 0)
        .unwrap_or(DEFAULT_WORKER_COUNT)
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Tasks in the work set.
    pub total: usize,
    /// Tasks that finished (either way) before the run ended.
    pub completed: usize,
    /// Workers that exited successfully.
    pub succeeded: usize,
    /// Workers that exited with a failure status or could not spawn.
    pub failed: usize,
    /// True when the run stopped early on the cancellation flag.
    pub cancelled: bool,
    /// Final outcome line of each completed task, in completion order.
    pub outcomes: Vec<String>,
}

/// A bounded pool of single-task worker processes.
pub struct WorkerPool {
    program: PathBuf,
    leading_args: Vec<OsString>,
    worker_count: usize,
}

/// A dispatched child together with the thread draining its stdout.
///
/// The reader thread runs for the child's whole lifetime so a chatty
/// worker never blocks on a full pipe waiting for the pool to get
/// around to reading.
struct ActiveWorker {
    child: Child,
    path: PathBuf,
    reader: JoinHandle<String>,
}

impl ActiveWorker {
    fn spawn(mut child: Child, path: PathBuf) -> Self {
        let stdout = child.stdout.take();
        let reader = std::thread::spawn(move || {
            let mut output = String::new();
            if let Some(mut stdout) = stdout {
                if let Err(err) = stdout.read_to_string(&mut output) {
                    warn!(%err, "failed to read worker output");
                }
            }
            output
        });
        Self { child, path, reader }
    }
}

impl WorkerPool {
    /// Pool that re-invokes the current executable in single-mesh mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the path of the running executable cannot
    /// be determined.
    pub fn new(worker_count: usize) -> std::io::Result<Self> {
        Ok(Self::with_command(
            std::env::current_exe()?,
            vec![OsString::from("--render-one")],
            worker_count,
        ))
    }

    /// Pool that runs an arbitrary command per task.
    ///
    /// The task's input path is appended after `leading_args`. Tests use
    /// this to substitute a stub command for the real binary.
    #[must_use]
    pub fn with_command(
        program: PathBuf,
        leading_args: Vec<OsString>,
        worker_count: usize,
    ) -> Self {
        Self {
            program,
            leading_args,
            worker_count: worker_count.max(1),
        }
    }

    /// Drain the task queue through the pool.
    ///
    /// Per-mesh progress lines are republished as each worker finishes,
    /// followed by one `Completed k/n` line; the worker's final stdout
    /// line is recorded as the task outcome.
    ///
    /// When `cancel` becomes true, no further tasks are dispatched, all
    /// running children are killed and reaped, and the summary comes
    /// back with `cancelled` set.
    pub fn run(&self, tasks: &[RenderTask], cancel: &AtomicBool) -> BatchSummary {
        let mut summary = BatchSummary {
            total: tasks.len(),
            ..BatchSummary::default()
        };
        let mut pending = tasks.iter();
        let mut active: Vec<ActiveWorker> = Vec::new();

        loop {
            if cancel.load(Ordering::SeqCst) {
                Self::kill_all(&mut active);
                summary.cancelled = true;
                return summary;
            }

            // Dispatch until the pool is full or the queue is empty.
            while active.len() < self.worker_count && !cancel.load(Ordering::SeqCst) {
                let Some(task) = pending.next() else { break };

                let spawned = Command::new(&self.program)
                    .args(&self.leading_args)
                    .arg(&task.input)
                    .stdout(Stdio::piped())
                    .spawn();
                match spawned {
                    Ok(child) => {
                        debug!(path = %task.input.display(), pid = child.id(), "dispatched worker");
                        active.push(ActiveWorker::spawn(child, task.input.clone()));
                    }
                    Err(err) => {
                        warn!(path = %task.input.display(), %err, "failed to spawn worker");
                        summary.failed += 1;
                        record_completion(
                            &mut summary,
                            format!("Error processing {}: {err}", task.input.display()),
                        );
                    }
                }
            }

            if active.is_empty() && pending.as_slice().is_empty() {
                return summary;
            }

            // Reap finished children in completion order.
            let mut index = 0;
            while index < active.len() {
                match active[index].child.try_wait() {
                    Ok(Some(status)) => {
                        let worker = active.swap_remove(index);
                        let path = worker.path;
                        let output = worker.reader.join().unwrap_or_default();
                        for line in output.lines() {
                            println!("{line}");
                        }

                        let outcome = output
                            .lines()
                            .rev()
                            .find(|line| !line.trim().is_empty())
                            .map(str::to_owned);
                        if status.success() {
                            summary.succeeded += 1;
                            record_completion(
                                &mut summary,
                                outcome.unwrap_or_else(|| {
                                    format!("Processed {}", path.display())
                                }),
                            );
                        } else {
                            summary.failed += 1;
                            warn!(path = %path.display(), %status, "worker failed");
                            record_completion(
                                &mut summary,
                                outcome.unwrap_or_else(|| {
                                    format!(
                                        "Error processing {}: worker exited with {status}",
                                        path.display()
                                    )
                                }),
                            );
                        }
                    }
                    Ok(None) => index += 1,
                    Err(err) => {
                        let worker = active.swap_remove(index);
                        summary.failed += 1;
                        warn!(path = %worker.path.display(), %err, "lost track of worker");
                        record_completion(
                            &mut summary,
                            format!("Error processing {}: {err}", worker.path.display()),
                        );
                        let _ = worker.reader.join();
                    }
                }
            }

            if !active.is_empty() {
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }

    fn kill_all(active: &mut Vec<ActiveWorker>) {
        for mut worker in active.drain(..) {
            if let Err(err) = worker.child.kill() {
                warn!(path = %worker.path.display(), %err, "failed to kill worker");
            }
            // Reap so no zombies outlive the batch; killing closes the
            // pipe, which also ends the reader thread.
            let _ = worker.child.wait();
            let _ = worker.reader.join();
        }
    }
}

/// Record one finished task and print the progress line.
fn record_completion(summary: &mut BatchSummary, outcome: String) {
    summary.completed += 1;
    summary.outcomes.push(outcome);
    println!("Completed {}/{}", summary.completed, summary.total);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_parses_valid_values() {
        assert_eq!(parse_worker_count(Some("8")), 8);
        assert_eq!(parse_worker_count(Some(" 2 ")), 2);
    }

    #[test]
    fn worker_count_defaults_when_missing_or_malformed() {
        assert_eq!(parse_worker_count(None), DEFAULT_WORKER_COUNT);
        assert_eq!(parse_worker_count(Some("four")), DEFAULT_WORKER_COUNT);
        assert_eq!(parse_worker_count(Some("")), DEFAULT_WORKER_COUNT);
        assert_eq!(parse_worker_count(Some("-3")), DEFAULT_WORKER_COUNT);
        assert_eq!(parse_worker_count(Some("0")), DEFAULT_WORKER_COUNT);
    }

    #[test]
    fn pool_never_runs_with_zero_workers() {
        let pool = WorkerPool::with_command(PathBuf::from("/bin/true"), Vec::new(), 0);
        assert_eq!(pool.worker_count, 1);
    }
}
