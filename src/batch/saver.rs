//! Output collaborators: file saving, directory prompting and folder reveal.

use crate::imaging::OutputFormat;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Result of one save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Failed(String),
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}

/// Writes one encoded image next to its siblings in the output directory.
#[cfg_attr(test, mockall::automock)]
pub trait FileSaver {
    /// Save `data` for the source file `original_name` into `directory`.
    ///
    /// The saver picks the final file name, normally with
    /// [`output_file_name`].
    fn save(&self, data: &[u8], directory: &Path, original_name: &str, format: OutputFormat) -> SaveOutcome;
}

/// Asks the user for an output directory; `None` means cancelled.
pub trait DirectoryPrompt {
    fn choose_directory(&self) -> Option<PathBuf>;
}

/// Prompt that never yields a directory, for non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl DirectoryPrompt for NoPrompt {
    fn choose_directory(&self) -> Option<PathBuf> {
        None
    }
}

/// `<stem>-watermarked.<format>` for a source file name.
pub fn output_file_name(original_name: &str, format: OutputFormat) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| original_name.to_string());
    format!("{}-watermarked.{}", stem, format.as_str())
}

/// Saves straight to the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskSaver;

impl FileSaver for DiskSaver {
    fn save(&self, data: &[u8], directory: &Path, original_name: &str, format: OutputFormat) -> SaveOutcome {
        let path = directory.join(output_file_name(original_name, format));
        match std::fs::write(&path, data) {
            Ok(()) => SaveOutcome::Saved(path),
            Err(e) => SaveOutcome::Failed(format!("{}: {}", path.display(), e)),
        }
    }
}

/// Ask the desktop shell to open `dir`. Failures are logged only.
pub fn reveal_folder(dir: &Path) {
    let program = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    match Command::new(program).arg(dir).spawn() {
        Ok(_) => tracing::debug!(dir = %dir.display(), program, "Revealing output folder"),
        Err(e) => tracing::warn!(dir = %dir.display(), program, error = %e, "Could not open output folder"),
    }
}
