//! Launch arguments and the engine configuration file.
//!
//! [`LaunchArguments`] are the raw process arguments, bound in the kernel as
//! a constant before any configuration runs. [`LaunchOptions`] parses the
//! ones the runtime itself understands:
//!
//! | argument             | effect                                         |
//! |----------------------|------------------------------------------------|
//! | `--debug-startup`    | trace-level logging for the startup sequence   |
//! | `--config <path>`    | read [`EngineConfig`] from a JSON file         |
//! | `-- <args>...`       | passed through untouched for the game          |
//!
//! Any other argument fails startup with the usage message.
//!
//! [`EngineConfig`] is plain JSON. Every field is optional; missing fields
//! take their defaults:
//!
//! ```json
//! {
//!   "title": "Spinning Plane",
//!   "viewport": { "x": 0, "y": 0, "width": 1280, "height": 720 },
//!   "clear_color": { "r": 0.1, "g": 0.1, "b": 0.12, "a": 1.0 },
//!   "sort_mode": "BackToFront",
//!   "fov_y_degrees": 60.0,
//!   "frame_limit": 600,
//!   "fixed_timestep": 0.016666668
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::{Color, SortMode, Viewport};

/// Process arguments, without the program name.
///
/// Kept raw so a game can bind and read them too. The runtime's own view of
/// them is [`LaunchOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArguments {
    args: Vec<String>,
}

/// The arguments the runtime understands. Anything after `--` is left for
/// the game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(name = "arbor", no_binary_name = true)]
pub struct LaunchOptions {
    /// Read the engine config from this JSON file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Trace every step of the startup sequence.
    #[arg(long)]
    pub debug_startup: bool,

    #[arg(last = true)]
    pub passthrough: Vec<String>,
}

impl LaunchArguments {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments of the running process.
    pub fn from_env() -> Self {
        Self::new(std::env::args().skip(1))
    }

    pub fn raw(&self) -> &[String] {
        &self.args
    }

    pub fn options(&self) -> Result<LaunchOptions, ConfigError> {
        Ok(LaunchOptions::try_parse_from(&self.args)?)
    }

    /// `false` when the arguments do not parse; startup reports those.
    pub fn debug_startup(&self) -> bool {
        self.options().is_ok_and(|options| options.debug_startup)
    }

    pub fn config_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        Ok(self.options()?.config)
    }
}

/// Engine settings shared by the game loop and the built-in passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub title: String,
    pub viewport: Viewport,
    pub clear_color: Color,
    /// Sort mode of the built-in 2D pass.
    pub sort_mode: SortMode,
    /// Vertical field of view of the built-in 3D pass.
    pub fov_y_degrees: f32,
    /// Stop after this many frames. Runs until asked to exit when `None`.
    pub frame_limit: Option<u64>,
    /// Seconds per frame. Uses the wall clock when `None`.
    pub fixed_timestep: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "arbor".to_string(),
            viewport: Viewport::default(),
            clear_color: Color::CORNFLOWER_BLUE,
            sort_mode: SortMode::default(),
            fov_y_degrees: 60.0,
            frame_limit: None,
            fixed_timestep: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The file named by `--config`, or the defaults.
    pub fn resolve(args: &LaunchArguments) -> Result<Self, ConfigError> {
        match args.config_path()? {
            Some(path) => {
                log::info!("loading engine config from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }

    pub fn fixed_delta(&self) -> Option<Duration> {
        self.fixed_timestep
            .filter(|secs| *secs > 0.0)
            .map(Duration::from_secs_f32)
    }
}
