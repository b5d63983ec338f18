//! Run configuration read from the environment.

use std::env;
use std::str::FromStr;

use crate::{Error, Result};

/// Environment variable holding the number of frames to simulate.
pub const FRAMES_VAR: &str = "SCENEGRAPH_FRAMES";
/// Environment variable holding a fixed frame step in seconds.
pub const FIXED_DT_VAR: &str = "SCENEGRAPH_FIXED_DT";

/// Settings for a headless simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Number of frames to step before exiting.
    pub frames: u64,
    /// Fixed step in seconds. `None` means use wall-clock time.
    pub fixed_dt: Option<f32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 120,
            fixed_dt: Some(1.0 / 60.0),
        }
    }
}

impl RunConfig {
    /// Build a config from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// `SCENEGRAPH_FIXED_DT=0` selects wall-clock timing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(FRAMES_VAR) {
            config.frames = parse(FRAMES_VAR, &raw)?;
        }

        if let Some(raw) = lookup(FIXED_DT_VAR) {
            let dt: f32 = parse(FIXED_DT_VAR, &raw)?;
            if !dt.is_finite() || dt < 0.0 {
                return Err(Error::Config(format!(
                    "{FIXED_DT_VAR} must be a non-negative number, got {dt}"
                )));
            }
            config.fixed_dt = (dt > 0.0).then_some(dt);
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid value for {key}: '{raw}'")))
}
