//! Script replay.
//!
//! A script is a JSON array of editor commands. The runner applies them in
//! order to a fresh editor and writes an export whenever the script asks
//! for one.

use std::path::{Path, PathBuf};

use poster_core::{Command, CommandOutcome, Editor};
use poster_renderer::{ExportConfig, PosterExporter, RenderError, SourceResolver};
use thiserror::Error;

use crate::PosterConfig;

/// Errors that stop a script run.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The script is not a JSON array of commands.
    #[error("invalid command script: {0}")]
    Script(#[from] serde_json::Error),
    /// Rendering or writing an export failed.
    #[error("export failed: {0}")]
    Export(#[from] RenderError),
}

/// What a script run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Commands applied.
    pub commands: usize,
    /// Commands that were rejected (undecodable image, duplicate ID).
    pub rejected: usize,
    /// Files written by exports, in order.
    pub exports: Vec<PathBuf>,
    /// Final document revision.
    pub revision: u64,
}

/// Parse a command script.
///
/// # Errors
///
/// Returns an error if the text is not a JSON array of commands.
pub fn parse_script(text: &str) -> Result<Vec<Command>, SessionError> {
    Ok(serde_json::from_str(text)?)
}

/// Replays command scripts against a fresh editor.
#[derive(Debug)]
pub struct ScriptRunner {
    config: PosterConfig,
    resolver: SourceResolver,
    exporter: PosterExporter,
}

impl ScriptRunner {
    /// Create a runner. Relative image paths resolve against the assets
    /// directory, or the script's directory when none is configured.
    #[must_use]
    pub fn new(config: PosterConfig) -> Self {
        let assets_dir = config.assets_dir.clone().or_else(|| {
            config
                .script
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
        });
        let resolver = assets_dir
            .clone()
            .map_or_else(SourceResolver::new, SourceResolver::with_base_dir);
        let exporter = PosterExporter::new(ExportConfig {
            resources_dir: assets_dir,
            ..config.export.clone()
        });
        Self {
            config,
            resolver,
            exporter,
        }
    }

    /// Read the configured script and run it.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be read or parsed, or an
    /// export cannot be written.
    pub fn run(&self) -> Result<RunSummary, SessionError> {
        let path = &self.config.script;
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;
        let commands = parse_script(&text)?;
        tracing::info!(script = %path.display(), commands = commands.len(), "Loaded script");
        self.run_commands(commands)
    }

    /// Apply `commands` to a fresh editor.
    ///
    /// # Errors
    ///
    /// Returns an error if an export cannot be rendered or written.
    pub fn run_commands(&self, commands: Vec<Command>) -> Result<RunSummary, SessionError> {
        std::fs::create_dir_all(&self.config.out_dir).map_err(|source| SessionError::Io {
            path: self.config.out_dir.clone(),
            source,
        })?;

        let mut editor = Editor::new(self.config.canvas_size);
        let mut summary = RunSummary::default();

        for (index, command) in commands.into_iter().enumerate() {
            let op = command.name();
            summary.commands += 1;
            match editor.apply(command, &self.resolver) {
                Ok(CommandOutcome::ExportRequested) => {
                    summary.exports.push(self.export(&editor)?);
                }
                Ok(outcome) => tracing::debug!(index, op, ?outcome, "Applied command"),
                Err(e) => {
                    tracing::warn!(index, op, "Command rejected: {e}");
                    summary.rejected += 1;
                }
            }
        }

        if self.config.export_on_finish {
            summary.exports.push(self.export(&editor)?);
        }

        if let Some(path) = &self.config.snapshot_path {
            let json = serde_json::to_string_pretty(&editor.snapshot())?;
            std::fs::write(path, json).map_err(|source| SessionError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), "Wrote document snapshot");
        }

        summary.revision = editor.document().revision();
        Ok(summary)
    }

    fn export(&self, editor: &Editor) -> Result<PathBuf, SessionError> {
        let artifact = self.exporter.export(&editor.snapshot())?;
        let path = artifact.save_in(&self.config.out_dir)?;
        tracing::info!(path = %path.display(), "Saved export");
        Ok(path)
    }
}
