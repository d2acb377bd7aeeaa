//! Validated generator parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::NavigationConfig;
use crate::error::{GeneratorError, GeneratorResult};

/// Target velocity choice for one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocitySelector {
    /// Compass heading `n` in `0..=8`; the target velocity is
    /// `(sin(n*pi/4), cos(n*pi/4))`.
    Heading(u8),
    /// Goal region (`A`): static, not forbidden.
    Goal,
    /// Forbidden region (`B`): static and unsafe.
    Forbidden,
}

impl VelocitySelector {
    /// Largest heading index.
    pub const MAX_HEADING: u8 = 8;
    /// Numeric code of the goal sentinel.
    pub const GOAL_CODE: u8 = 9;
    /// Numeric code of the forbidden sentinel.
    pub const FORBIDDEN_CODE: u8 = 10;

    /// Parse one `i_list` token.
    ///
    /// Surrounding whitespace is ignored. `A`/`a` and `B`/`b` are the
    /// sentinels; anything else must be an integer in `0..=8`.
    pub fn parse_token(token: &str) -> GeneratorResult<Self> {
        match token.trim() {
            "A" | "a" => return Ok(VelocitySelector::Goal),
            "B" | "b" => return Ok(VelocitySelector::Forbidden),
            _ => {}
        }

        let value: i64 = token
            .trim()
            .parse()
            .map_err(|source| GeneratorError::ParseError {
                token: token.to_string(),
                source,
            })?;

        if !(0..=i64::from(Self::MAX_HEADING)).contains(&value) {
            return Err(GeneratorError::invalid(format!(
                "i_list argument was invalid: '{}' (expected 0-8, A or B)",
                value
            )));
        }

        Ok(VelocitySelector::Heading(value as u8))
    }

    /// Numeric code: the heading itself, 9 for goal, 10 for forbidden.
    pub fn code(&self) -> u8 {
        match self {
            VelocitySelector::Heading(n) => *n,
            VelocitySelector::Goal => Self::GOAL_CODE,
            VelocitySelector::Forbidden => Self::FORBIDDEN_CODE,
        }
    }

    /// Heading index, or `None` for the static sentinels.
    pub fn heading(&self) -> Option<u8> {
        match self {
            VelocitySelector::Heading(n) => Some(*n),
            _ => None,
        }
    }

    /// True for cells whose dynamics are identically zero.
    pub fn is_static(&self) -> bool {
        self.heading().is_none()
    }

    pub fn is_forbidden(&self) -> bool {
        *self == VelocitySelector::Forbidden
    }
}

impl fmt::Display for VelocitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VelocitySelector::Heading(n) => write!(f, "{}", n),
            VelocitySelector::Goal => write!(f, "A"),
            VelocitySelector::Forbidden => write!(f, "B"),
        }
    }
}

/// The 2x2 gain matrix of the velocity feedback law `v' = A (v - v_d)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMatrix(pub [[f64; 2]; 2]);

impl FeedbackMatrix {
    /// Build from row-major entries `a11 a12 a21 a22`.
    pub fn from_entries(entries: &[f64]) -> GeneratorResult<Self> {
        let [a11, a12, a21, a22] = entries else {
            return Err(GeneratorError::invalid(format!(
                "Matrix A should have exactly four elements, got {}.",
                entries.len()
            )));
        };
        if entries.iter().any(|v| !v.is_finite()) {
            return Err(GeneratorError::invalid("Matrix A entries must be finite."));
        }
        Ok(Self([[*a11, *a12], [*a21, *a22]]))
    }

    /// Entry at zero-based `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[row][col]
    }

    /// One row of the matrix.
    pub fn row(&self, row: usize) -> [f64; 2] {
        self.0[row]
    }
}

/// Fully validated, immutable parameters of one navigation instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridParameters {
    matrix: FeedbackMatrix,
    prefix: String,
    selectors: Vec<VelocitySelector>,
    width: usize,
    height: usize,
    start: (f64, f64),
    noise: f64,
    start_cell: (usize, usize),
    start_mode_name: String,
    time_horizon: Option<f64>,
}

impl GridParameters {
    /// Validate a raw config, failing on the first violation.
    ///
    /// Checks run in order: noise, matrix, `i_list` tokens, width,
    /// divisibility of the token count by the width, non-empty grid, start
    /// position. The start cell is the floor of the start position clamped
    /// into the grid.
    pub fn validate(config: &NavigationConfig) -> GeneratorResult<Self> {
        if !config.noise.is_finite() || config.noise < 0.0 {
            return Err(GeneratorError::invalid(format!(
                "Noise should be nonnegative, got {}.",
                config.noise
            )));
        }

        let matrix = FeedbackMatrix::from_entries(&config.matrix)?;

        let selectors = config
            .i_list
            .iter()
            .map(|token| VelocitySelector::parse_token(token))
            .collect::<GeneratorResult<Vec<_>>>()?;

        if config.width <= 0 {
            return Err(GeneratorError::invalid(format!(
                "Width should be positive, got {}.",
                config.width
            )));
        }
        let width = usize::try_from(config.width)
            .map_err(|_| GeneratorError::invalid("Width does not fit in memory."))?;

        if selectors.len() % width != 0 {
            return Err(GeneratorError::invalid(format!(
                "Width({}) should evenly divide number of elements in i_list ({}).",
                width,
                selectors.len()
            )));
        }
        let height = selectors.len() / width;

        if height == 0 {
            return Err(GeneratorError::invalid("i_list should name at least one cell."));
        }

        if let Some(t) = config.time_horizon {
            if !t.is_finite() || t < 0.0 {
                return Err(GeneratorError::invalid(format!(
                    "Time horizon should be nonnegative, got {}.",
                    t
                )));
            }
        }

        if !config.startx.is_finite() || !config.starty.is_finite() {
            return Err(GeneratorError::invalid(format!(
                "Start position ({}, {}) should be finite.",
                config.startx, config.starty
            )));
        }

        let start_cell = (
            clamp_cell(config.startx, width),
            clamp_cell(config.starty, height),
        );
        let start_mode_name = cell_name(&config.prefix, start_cell.0, start_cell.1);

        Ok(Self {
            matrix,
            prefix: config.prefix.clone(),
            selectors,
            width,
            height,
            start: (config.startx, config.starty),
            noise: config.noise,
            start_cell,
            start_mode_name,
            time_horizon: config.time_horizon,
        })
    }

    pub fn matrix(&self) -> &FeedbackMatrix {
        &self.matrix
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Selectors in row-major order, index `x + y * width`.
    pub fn selectors(&self) -> &[VelocitySelector] {
        &self.selectors
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells (and modes).
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Unclamped initial position.
    pub fn start(&self) -> (f64, f64) {
        self.start
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }

    pub fn time_horizon(&self) -> Option<f64> {
        self.time_horizon
    }

    /// Grid cell containing the (clamped) start position.
    pub fn start_cell(&self) -> (usize, usize) {
        self.start_cell
    }

    pub fn start_mode_name(&self) -> &str {
        &self.start_mode_name
    }

    /// Selector of cell `(x, y)`.
    pub fn selector_at(&self, x: usize, y: usize) -> Option<VelocitySelector> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.selectors.get(x + y * self.width).copied()
    }

    /// Mode name of cell `(x, y)`.
    pub fn mode_name(&self, x: usize, y: usize) -> String {
        cell_name(&self.prefix, x, y)
    }
}

fn cell_name(prefix: &str, x: usize, y: usize) -> String {
    format!("{}{}_{}", prefix, x, y)
}

fn clamp_cell(position: f64, cells: usize) -> usize {
    let cell = position.floor();
    if cell < 0.0 {
        0
    } else if cell >= cells as f64 {
        cells - 1
    } else {
        cell as usize
    }
}
