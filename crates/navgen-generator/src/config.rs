//! Raw input record for the navigation generator.
//!
//! [`NavigationConfig`] holds options exactly as a caller (command line,
//! JSON file, preset) delivered them: already typed, not yet cross-checked.
//! [`GridParameters::validate`](crate::GridParameters::validate) turns it
//! into a consistent parameter set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, GeneratorResult};

/// Options of the navigation benchmark generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Feedback matrix entries `a11 a12 a21 a22`.
    #[serde(default)]
    pub matrix: Vec<f64>,
    /// Mode name prefix.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Per-cell target velocity selector: `0`-`8`, `A` (goal) or `B` (forbidden).
    #[serde(default)]
    pub i_list: Vec<String>,
    /// Grid width in cells.
    #[serde(default = "default_width")]
    pub width: i64,
    /// Initial x position.
    #[serde(default)]
    pub startx: f64,
    /// Initial y position.
    #[serde(default)]
    pub starty: f64,
    /// Velocity disturbance bound; `[-noise, noise]` is added to both accelerations.
    #[serde(default)]
    pub noise: f64,
    /// Analysis time horizon handed to downstream exporters.
    #[serde(default)]
    pub time_horizon: Option<f64>,
}

fn default_prefix() -> String {
    "mode_".to_string()
}

fn default_width() -> i64 {
    1
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            matrix: Vec::new(),
            prefix: default_prefix(),
            i_list: Vec::new(),
            width: default_width(),
            startx: 0.0,
            starty: 0.0,
            noise: 0.0,
            time_horizon: None,
        }
    }
}

impl NavigationConfig {
    /// Create a config with the required options set.
    pub fn new(matrix: [f64; 4], i_list: &[&str], width: i64) -> Self {
        Self {
            matrix: matrix.to_vec(),
            i_list: i_list.iter().map(|s| s.to_string()).collect(),
            width,
            ..Default::default()
        }
    }

    /// Set the start position.
    pub fn with_start(mut self, x: f64, y: f64) -> Self {
        self.startx = x;
        self.starty = y;
        self
    }

    /// Set the disturbance bound.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Set the mode name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the analysis time horizon.
    pub fn with_time_horizon(mut self, time: f64) -> Self {
        self.time_horizon = Some(time);
        self
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> GeneratorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> GeneratorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Benchmark instances from Fehnker & Ivancic, "Benchmarks for Hybrid
/// Systems Verification" (HSCC 2004).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// 3x3 grid of figure 1b.
    Fig1b,
    /// 5x5 grid of figure 2a.
    Fig2a,
    /// 5x5 grid of figure 2b.
    Fig2b,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Fig1b, Preset::Fig2a, Preset::Fig2b];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Fig1b => "fig1b",
            Preset::Fig2a => "fig2a",
            Preset::Fig2b => "fig2b",
        }
    }

    /// Build the preset's configuration.
    pub fn config(&self) -> NavigationConfig {
        match self {
            Preset::Fig1b => NavigationConfig::new(
                [-1.2, 0.1, 0.1, -1.2],
                &["2", "2", "A", "4", "3", "4", "B", "2", "4"],
                3,
            )
            .with_start(0.5, 1.5)
            .with_noise(0.1)
            .with_time_horizon(5.0),
            Preset::Fig2a => NavigationConfig::new(
                [-0.8, -0.2, -0.1, -0.8],
                &[
                    "2", "A", "0", "0", "0", "2", "4", "6", "6", "6", "2", "4", "B", "3", "4", "2",
                    "4", "7", "7", "4", "2", "4", "6", "6", "6",
                ],
                5,
            )
            .with_start(3.5, 3.5)
            .with_noise(0.1)
            .with_time_horizon(10.0),
            Preset::Fig2b => NavigationConfig::new(
                [-1.2, 0.1, 0.2, -1.2],
                &[
                    "3", "0", "0", "6", "6", "3", "0", "0", "B", "4", "4", "2", "1", "1", "4", "4",
                    "A", "1", "1", "4", "4", "6", "6", "6", "4",
                ],
                5,
            )
            .with_start(3.5, 3.5)
            .with_noise(0.1)
            .with_time_horizon(20.0),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Preset {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                GeneratorError::invalid(format!(
                    "unknown preset '{}' (expected one of: fig1b, fig2a, fig2b)",
                    s
                ))
            })
    }
}
