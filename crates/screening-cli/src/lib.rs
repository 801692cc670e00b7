//! Dry-Eye Screening CLI
//!
//! Runs one screening pipeline over a directory of decoded eye-video
//! frames and prints a JSON report.

pub mod frames;
pub mod report;
pub mod settings;

use std::path::PathBuf;

use anyhow::Context;
use blink_screening::ScreeningPipeline;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use report::ScreeningReport;
use settings::ConfigArgs;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "blink-screen", version, about = "Dry-eye risk screening from eye video frames")]
pub struct Cli {
    /// Directory of decoded frames (png/jpg/bmp), read in file-name order
    pub frames: PathBuf,

    /// Frame rate of the source video; 1 or less means unknown (30 assumed)
    #[arg(long, default_value_t = 0.0)]
    pub source_fps: f64,

    /// Patient or session identifier stored with the report
    #[arg(long)]
    pub patient_id: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Initialize logging to stderr
pub fn init_logging(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if let Err(e) = installed {
        eprintln!("warning: logging not initialized: {e}");
    }
}

/// Screen one frame directory
pub async fn run(cli: &Cli) -> anyhow::Result<ScreeningReport> {
    let config = settings::load(&cli.config)?;
    let paths = frames::list_frames(&cli.frames)?;
    info!(
        "Screening {} frames from {}",
        paths.len(),
        cli.frames.display()
    );

    let mut pipeline = ScreeningPipeline::new(config.clone(), cli.source_fps)?;
    let (mut rx, decoder) = frames::spawn_decoder(paths);

    let mut frames_decoded = 0u64;
    while let Some(frame) = rx.recv().await {
        let frame = frame?;
        frames_decoded += 1;
        pipeline.process_frame(&frame)?;
        if pipeline.is_saturated() {
            info!("Analysis window full after {} frames", frames_decoded);
            break;
        }
    }
    drop(rx);
    decoder.await.context("frame decoder task failed")?;

    let frames_analyzed = pipeline.samples_kept();
    let result = pipeline.finish()?;

    let mut report = ScreeningReport::new(result, config);
    report.patient_id = cli.patient_id.clone();
    report.source = cli.frames.display().to_string();
    report.source_fps = cli.source_fps;
    report.frames_decoded = frames_decoded;
    report.frames_analyzed = frames_analyzed;
    Ok(report)
}
