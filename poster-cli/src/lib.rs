//! # Poster CLI
//!
//! Command-line host for the poster editor. It replays a JSON script of
//! editor commands and writes a PNG or JPEG every time the script asks for
//! an export.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p poster-cli -- --script poster.json --out-dir exports
//! ```
//!
//! ## Script format
//!
//! ```json
//! [
//!   {"op": "addShape", "shapeType": "star"},
//!   {"op": "addText", "text": "Summer Sale"},
//!   {"op": "export"}
//! ]
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `PosterConfig` - Canvas size, output location, and export settings
//! - `ScriptRunner` - Applies commands to a `poster_core::Editor` and saves exports

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod session;

pub use session::{parse_script, RunSummary, ScriptRunner, SessionError};

use std::path::PathBuf;

use clap::Parser;
use poster_core::CanvasSize;
use poster_renderer::{parse_hex_color, ExportConfig, ExportFormat};

/// Command-line arguments for the poster CLI.
#[derive(Debug, Clone, Parser)]
#[command(name = "poster")]
#[command(about = "Replay poster editor command scripts and export the result")]
#[command(version)]
pub struct CliArgs {
    /// JSON file containing an array of editor commands
    #[arg(long, env = "POSTER_SCRIPT")]
    pub script: PathBuf,

    /// Directory exports are written to
    #[arg(long, env = "POSTER_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Directory relative image paths are resolved against (defaults to the
    /// script's directory)
    #[arg(long, env = "POSTER_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Canvas width
    #[arg(long, env = "POSTER_WIDTH", default_value = "800")]
    pub width: f32,

    /// Canvas height
    #[arg(long, env = "POSTER_HEIGHT", default_value = "600")]
    pub height: f32,

    /// Export format (png or jpeg)
    #[arg(long, env = "POSTER_FORMAT", default_value = "png")]
    pub format: ExportFormat,

    /// Output pixels per canvas unit
    #[arg(long, env = "POSTER_PIXEL_RATIO", default_value = "1")]
    pub pixel_ratio: f32,

    /// Background color as #rrggbb
    #[arg(long, env = "POSTER_BACKGROUND", default_value = "#ffffff", value_parser = parse_background)]
    pub background: [u8; 4],

    /// JPEG quality 1-100
    #[arg(long, env = "POSTER_JPEG_QUALITY", default_value = "85", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: u8,

    /// Export once more after the last command
    #[arg(long)]
    pub export_on_finish: bool,

    /// Write the final document snapshot as JSON to this file
    #[arg(long, env = "POSTER_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,
}

fn parse_background(input: &str) -> Result<[u8; 4], String> {
    parse_hex_color(input).map_err(|e| e.to_string())
}

/// Configuration for one script run.
#[derive(Debug, Clone)]
pub struct PosterConfig {
    /// Script to replay.
    pub script: PathBuf,
    /// Directory exports are written to.
    pub out_dir: PathBuf,
    /// Canvas dimensions of the document.
    pub canvas_size: CanvasSize,
    /// Base directory for relative image paths.
    pub assets_dir: Option<PathBuf>,
    /// Export settings.
    pub export: ExportConfig,
    /// Export after the last command.
    pub export_on_finish: bool,
    /// Where to write the final snapshot, if anywhere.
    pub snapshot_path: Option<PathBuf>,
}

impl From<CliArgs> for PosterConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            script: args.script,
            out_dir: args.out_dir,
            canvas_size: CanvasSize::new(args.width, args.height),
            assets_dir: args.assets_dir,
            export: ExportConfig {
                format: args.format,
                background: args.background,
                jpeg_quality: args.jpeg_quality,
                pixel_ratio: args.pixel_ratio,
                ..ExportConfig::default()
            },
            export_on_finish: args.export_on_finish,
            snapshot_path: args.snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["poster", "--script", "poster.json"]).expect("args");
        let config = PosterConfig::from(args);
        assert_eq!(config.script, PathBuf::from("poster.json"));
        assert!((config.canvas_size.width - 800.0).abs() < f32::EPSILON);
        assert!((config.canvas_size.height - 600.0).abs() < f32::EPSILON);
        assert_eq!(config.export.format, ExportFormat::Png);
        assert_eq!(config.export.background, [255, 255, 255, 255]);
        assert!(!config.export_on_finish);
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "poster",
            "--script",
            "s.json",
            "--format",
            "jpeg",
            "--background",
            "#102030",
            "--pixel-ratio",
            "2",
            "--width",
            "1080",
            "--export-on-finish",
        ])
        .expect("args");
        let config = PosterConfig::from(args);
        assert_eq!(config.export.format, ExportFormat::Jpeg);
        assert_eq!(config.export.background, [16, 32, 48, 255]);
        assert!((config.export.pixel_ratio - 2.0).abs() < f32::EPSILON);
        assert!((config.canvas_size.width - 1080.0).abs() < f32::EPSILON);
        assert!(config.export_on_finish);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(CliArgs::try_parse_from(["poster", "--script", "s", "--format", "gif"]).is_err());
        assert!(
            CliArgs::try_parse_from(["poster", "--script", "s", "--background", "red"]).is_err()
        );
        assert!(
            CliArgs::try_parse_from(["poster", "--script", "s", "--jpeg-quality", "0"]).is_err()
        );
    }
}
