//! # Poster CLI
//!
//! Replays an editor command script and writes the requested exports.

use anyhow::Context;
use clap::Parser;
use poster_cli::{CliArgs, PosterConfig, ScriptRunner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,poster_core=debug,poster_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    // Use JSON format when RUST_LOG_FORMAT=json
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = PosterConfig::from(args);

    tracing::info!(
        "Canvas {}x{}, exporting {:?} to {}",
        config.canvas_size.width,
        config.canvas_size.height,
        config.export.format,
        config.out_dir.display()
    );

    let script = config.script.clone();
    let summary = ScriptRunner::new(config)
        .run()
        .with_context(|| format!("failed to run script {}", script.display()))?;

    for path in &summary.exports {
        println!("{}", path.display());
    }
    tracing::info!(
        commands = summary.commands,
        rejected = summary.rejected,
        exports = summary.exports.len(),
        revision = summary.revision,
        "Script finished"
    );
    Ok(())
}
