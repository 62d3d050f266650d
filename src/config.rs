use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "phase-viz", version, about = "Phase identification data visualiser")]
pub struct Args {
    /// Directory holding one subdirectory per transformer.
    #[arg(env = "PHASE_VIZ_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON file with viewer settings.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Viewer settings
// ---------------------------------------------------------------------------

/// Settings that seed a session. Nothing is written back.
///
/// ```json
/// { "data_dir": "/srv/phase", "window_width": 1400, "line_width": 2.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub data_dir: Option<PathBuf>,
    pub window_width: f32,
    pub window_height: f32,
    pub line_width: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            window_width: 1200.0,
            window_height: 800.0,
            line_width: 1.5,
        }
    }
}

impl ViewerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config file (if any) overlaid with the command line.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(dir) = &args.data_dir {
            config.data_dir = Some(dir.clone());
        }
        Ok(config)
    }
}
