//! Batch export.
//!
//! Every image in the list is decoded, composed with the current settings,
//! resized, encoded and handed to a [`FileSaver`], strictly in list order.
//! A failure on one image is logged and recorded in the [`BatchReport`];
//! the run always continues with the next image.

pub mod saver;

pub use saver::{
    output_file_name, reveal_folder, DirectoryPrompt, DiskSaver, FileSaver, NoPrompt, SaveOutcome,
};

use crate::imaging::decode_file;
use crate::state::AppState;
use crate::watermark::{render_composite, GlyphSource, RenderOptions};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a batch before any image is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("No images to export")]
    NoImages,

    /// The output directory was unset and the prompt was cancelled
    #[error("No output directory selected")]
    NoOutputDirectory,
}

/// Progress after one image, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub done: usize,
    pub total: usize,
    pub image: String,
}

impl BatchProgress {
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        (self.done * 100 / self.total) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    pub image: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub saved: Vec<PathBuf>,
    /// Images whose source could not be decoded
    pub skipped: Vec<ExportFailure>,
    /// Images that failed to render or save
    pub failed: Vec<ExportFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.saved.len() + self.skipped.len() + self.failed.len()
    }
}

pub struct BatchExporter<'a> {
    saver: &'a dyn FileSaver,
    prompt: &'a dyn DirectoryPrompt,
    options: RenderOptions,
}

impl<'a> BatchExporter<'a> {
    pub fn new(saver: &'a dyn FileSaver) -> Self {
        Self {
            saver,
            prompt: &NoPrompt,
            options: RenderOptions::default(),
        }
    }

    /// Prompt used when `AppState::output_dir` is unset.
    pub fn with_prompt(mut self, prompt: &'a dyn DirectoryPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Export every image in `state`, reporting progress after each one.
    ///
    /// If no output directory is set the prompt is asked for one and the
    /// choice is kept in `state`; a cancelled prompt returns
    /// [`ExportError::NoOutputDirectory`] with nothing written.
    pub fn run(
        &self,
        state: &mut AppState,
        glyphs: &dyn GlyphSource,
        mut on_progress: impl FnMut(&BatchProgress),
    ) -> Result<BatchReport, ExportError> {
        if state.images.is_empty() {
            return Err(ExportError::NoImages);
        }
        let output_dir = match &state.output_dir {
            Some(dir) => dir.clone(),
            None => {
                let dir = self.prompt.choose_directory().ok_or(ExportError::NoOutputDirectory)?;
                state.output_dir = Some(dir.clone());
                dir
            }
        };

        let state = &*state;
        let resources = state.resources(glyphs);
        let options = self.options.with_active_layer(state.active_layer);
        let format = state.settings.output.format;
        let total = state.images.len();
        let mut report = BatchReport::default();

        tracing::info!(total, dir = %output_dir.display(), format = %format, "Batch export started");

        for (index, entry) in state.images.iter().enumerate() {
            match decode_file(&entry.path) {
                Err(e) => {
                    tracing::warn!(image = %entry.name, index, error = %e, "Skipping image that failed to decode");
                    report.skipped.push(ExportFailure {
                        image: entry.name.clone(),
                        reason: e.to_string(),
                    });
                }
                Ok(source) => match render_composite(&source, &state.settings, &resources, &options) {
                    Err(e) => {
                        tracing::warn!(image = %entry.name, index, error = %e, "Render failed");
                        report.failed.push(ExportFailure {
                            image: entry.name.clone(),
                            reason: e.to_string(),
                        });
                    }
                    Ok(encoded) => {
                        match self.saver.save(&encoded.data, &output_dir, &entry.name, format) {
                            SaveOutcome::Saved(path) => report.saved.push(path),
                            SaveOutcome::Failed(reason) => {
                                tracing::warn!(image = %entry.name, index, error = %reason, "Save failed");
                                report.failed.push(ExportFailure {
                                    image: entry.name.clone(),
                                    reason,
                                });
                            }
                        }
                    }
                },
            }

            let progress = BatchProgress {
                done: index + 1,
                total,
                image: entry.name.clone(),
            };
            tracing::info!(image = %entry.name, done = progress.done, total, "Export progress");
            on_progress(&progress);
        }

        tracing::info!(
            saved = report.saved.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Batch export finished"
        );
        Ok(report)
    }
}
