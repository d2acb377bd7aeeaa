//! Hybrid automaton model shared across the navgen workspace.
//!
//! A [`Configuration`] owns one [`BaseComponent`] (variables, modes and
//! guarded transitions) plus the initial and forbidden state sets and
//! tool-independent [`Settings`]. Guards, invariants and flows are symbolic
//! [`Expression`] trees; flows may carry an [`Interval`] of additive
//! uncertainty.
//!
//! ```text
//! Configuration
//! ├── root: BaseComponent
//! │   ├── variables: [x, y, ...]
//! │   ├── modes:       AutomatonMode { name, invariant, flow_dynamics }
//! │   └── transitions: AutomatonTransition { from, to, guard }
//! ├── init:      mode -> condition
//! ├── forbidden: mode -> condition
//! └── settings
//! ```
//!
//! Formula text is turned into expressions through the [`ExpressionParser`]
//! trait; [`InfixParser`] is the stock implementation.

mod component;
mod configuration;
mod error;
mod expression;
pub mod formula;
mod interval;
mod mode;

pub use component::{AutomatonTransition, BaseComponent, ModeId};
pub use configuration::{Configuration, Settings, SpaceExConfigValues};
pub use error::{FormulaError, FormulaResult, ModelError, ModelResult};
pub use expression::{Expression, Operator, Value};
pub use formula::{ExpressionParser, InfixParser};
pub use interval::Interval;
pub use mode::{AutomatonMode, ExpressionInterval};
