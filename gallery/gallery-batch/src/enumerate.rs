//! Work enumeration: walk a directory tree and collect mesh files that
//! still need preview images.

use std::path::{Path, PathBuf};

use gallery_io::MeshFormat;
use hashbrown::HashSet;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One unit of work: a mesh file and its two derived output paths.
///
/// Output paths are siblings of the input, named
/// `<basename>_top_view.png` and `<basename>_front_view.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTask {
    /// The STL or OBJ file to process.
    pub input: PathBuf,
    /// Destination for the top-view preview.
    pub top_output: PathBuf,
    /// Destination for the front-view preview.
    pub front_output: PathBuf,
}

impl RenderTask {
    /// Build a task for one mesh file, deriving both output paths.
    ///
    /// Returns `None` when the path is not a recognized mesh format or
    /// its file stem cannot be represented as UTF-8.
    ///
    /// # Example
    ///
    /// ```
    /// use gallery_batch::enumerate::RenderTask;
    /// use std::path::Path;
    ///
    /// let task = RenderTask::for_mesh(Path::new("parts/bracket.stl")).unwrap();
    /// assert_eq!(task.top_output, Path::new("parts/bracket_top_view.png"));
    /// assert_eq!(task.front_output, Path::new("parts/bracket_front_view.png"));
    /// ```
    #[must_use]
    pub fn for_mesh(input: &Path) -> Option<Self> {
        MeshFormat::from_path(input)?;
        let stem = input.file_stem()?.to_str()?;
        let parent = input.parent().unwrap_or_else(|| Path::new(""));

        Some(Self {
            input: input.to_path_buf(),
            top_output: parent.join(format!("{stem}_top_view.png")),
            front_output: parent.join(format!("{stem}_front_view.png")),
        })
    }

    /// True when both preview images already exist on disk.
    #[must_use]
    pub fn outputs_exist(&self) -> bool {
        self.top_output.exists() && self.front_output.exists()
    }

    /// Console line announcing that this task's outputs already exist.
    #[must_use]
    pub fn skip_notice(&self) -> String {
        format!(
            "Skipping (images exist): {} & {}",
            self.top_output.display(),
            self.front_output.display()
        )
    }
}

/// Recursively collect mesh files under `root` that need processing.
///
/// The walk is depth-first in lexicographic order, so repeated runs over
/// the same tree enumerate tasks in the same order. Files whose two
/// preview images both already exist are skipped up front; a file with
/// only one image present is still enumerated so the missing view can be
/// filled in.
pub fn enumerate_tasks(root: &Path) -> Vec<RenderTask> {
    let mut tasks = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(task) = RenderTask::for_mesh(entry.path()) else {
            continue;
        };
        if !seen.insert(task.input.clone()) {
            continue;
        }

        if task.outputs_exist() {
            println!("{}", task.skip_notice());
            continue;
        }
        tasks.push(task);
    }

    debug!(count = tasks.len(), root = %root.display(), "enumerated tasks");
    tasks
}
