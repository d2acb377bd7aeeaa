//! Parametric generator for the Navigation hybrid automaton benchmark.
//!
//! An object moves on a grid of unit cells. Each cell either names a compass
//! heading the object's velocity is steered toward, or is a static goal (`A`)
//! or forbidden (`B`) region. The generator turns a small parameter set into
//! a full [`Configuration`](navgen_core::Configuration):
//!
//! ```text
//! NavigationConfig ──validate──▶ GridParameters
//!        │
//!        ├─ build_modes        one mode per cell: flows + invariant
//!        ├─ build_transitions  left/right/down/up jumps on cell boundaries
//!        └─ assemble           variables, init, forbidden, plot settings
//! ```
//!
//! Inside a heading cell `n` the dynamics are
//!
//! ```text
//! x'    = xvel
//! y'    = yvel
//! xvel' = a11 (xvel - sin(n pi/4)) + a12 (yvel - cos(n pi/4))  [+ [-k, k]]
//! yvel' = a21 (xvel - sin(n pi/4)) + a22 (yvel - cos(n pi/4))  [+ [-k, k]]
//! ```
//!
//! ## Example
//!
//! ```
//! use navgen_generator::{generate_navigation, NavigationConfig};
//!
//! let config = NavigationConfig::new([-1.0, 0.0, 0.0, -1.0], &["0", "1", "2", "3"], 2);
//! let model = generate_navigation(&config).unwrap();
//! assert_eq!(model.root.mode_count(), 4);
//! assert!(model.init.contains_key("mode_0_0"));
//! ```

mod config;
pub mod dynamics;
mod error;
mod generator;
pub mod grid;
pub mod invariant;
mod params;

pub use config::{NavigationConfig, Preset};
pub use error::{GeneratorError, GeneratorResult};
pub use generator::{available_generators, generate_navigation, ModelGenerator, NavigationGenerator};
pub use grid::{Direction, ModeGrid};
pub use params::{FeedbackMatrix, GridParameters, VelocitySelector};
