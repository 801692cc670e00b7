//! Layered screening configuration
//!
//! Priority (lowest to highest):
//! 1. Built-in preset (`default`, `strict`, `lenient`)
//! 2. TOML file given with `--config`
//! 3. Environment variables prefixed `BLINK_SCREEN_` (e.g. `BLINK_SCREEN_TARGET_FPS=10`)
//! 4. Explicit command-line flags

use std::path::PathBuf;

use anyhow::Context;
use blink_screening::ScreeningConfig;
use clap::{Args, ValueEnum};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use tracing::{debug, info};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "BLINK_SCREEN";

/// Built-in threshold presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    #[default]
    Default,
    Strict,
    Lenient,
}

impl Preset {
    pub fn config(self) -> ScreeningConfig {
        match self {
            Preset::Default => ScreeningConfig::default(),
            Preset::Strict => ScreeningConfig::strict(),
            Preset::Lenient => ScreeningConfig::lenient(),
        }
    }
}

/// Configuration flags
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Threshold preset used as the base layer
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    pub preset: Preset,

    /// TOML file overriding the preset
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Analyze at most this many seconds of video
    #[arg(long)]
    pub max_seconds: Option<f64>,

    /// Analysis frame rate
    #[arg(long)]
    pub target_fps: Option<f64>,

    /// Centered ROI size as a fraction of the frame
    #[arg(long)]
    pub roi_scale: Option<f64>,

    /// Moving average window (frames)
    #[arg(long)]
    pub smooth_window: Option<usize>,

    /// Canny hysteresis low threshold
    #[arg(long)]
    pub canny_low: Option<f32>,

    /// Canny hysteresis high threshold
    #[arg(long)]
    pub canny_high: Option<f32>,

    /// Fraction of baseline below which the eye is closing
    #[arg(long)]
    pub threshold_factor: Option<f64>,

    /// Shortest closure counted as a blink (milliseconds)
    #[arg(long)]
    pub min_blink_ms: Option<u64>,

    /// Longest closure counted as a blink (milliseconds)
    #[arg(long)]
    pub max_blink_ms: Option<u64>,

    /// Minimum gap between blinks (milliseconds)
    #[arg(long)]
    pub refractory_ms: Option<u64>,

    /// Blink rate below this is flagged (per minute)
    #[arg(long)]
    pub min_bpm: Option<f64>,

    /// Inter-blink interval above this is flagged (seconds)
    #[arg(long)]
    pub max_ibi: Option<f64>,
}

/// Resolve the effective configuration from every layer
pub fn load(args: &ConfigArgs) -> anyhow::Result<ScreeningConfig> {
    let mut builder = base(args.preset)?;

    if let Some(path) = &args.config {
        info!("Loading config file: {}", path.display());
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

    resolve(apply_overrides(builder, args)?)
}

fn base(preset: Preset) -> anyhow::Result<ConfigBuilder<DefaultState>> {
    let defaults = Config::try_from(&preset.config()).context("serializing preset")?;
    Ok(Config::builder().add_source(defaults))
}

fn apply_overrides(
    builder: ConfigBuilder<DefaultState>,
    args: &ConfigArgs,
) -> anyhow::Result<ConfigBuilder<DefaultState>> {
    Ok(builder
        .set_override_option("max_analysis_seconds", args.max_seconds)?
        .set_override_option("target_fps", args.target_fps)?
        .set_override_option("roi_scale", args.roi_scale)?
        .set_override_option("smooth_window", args.smooth_window.map(|v| v as i64))?
        .set_override_option("canny_low", args.canny_low.map(f64::from))?
        .set_override_option("canny_high", args.canny_high.map(f64::from))?
        .set_override_option("threshold_factor", args.threshold_factor)?
        .set_override_option("min_blink_ms", args.min_blink_ms.map(|v| v as i64))?
        .set_override_option("max_blink_ms", args.max_blink_ms.map(|v| v as i64))?
        .set_override_option("refractory_ms", args.refractory_ms.map(|v| v as i64))?
        .set_override_option("min_blinks_per_minute", args.min_bpm)?
        .set_override_option("max_allowed_ibi_seconds", args.max_ibi)?)
}

fn resolve(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<ScreeningConfig> {
    let config: ScreeningConfig = builder
        .build()
        .context("building configuration")?
        .try_deserialize()
        .context("invalid screening configuration")?;

    config.validate()?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}
