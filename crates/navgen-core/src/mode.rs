//! Discrete modes and their continuous dynamics.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expression::Expression;
use crate::interval::Interval;

/// A derivative right-hand side with optional additive uncertainty.
///
/// `x' = expression + u` with `u` ranging over `interval` when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionInterval {
    pub expression: Expression,
    #[serde(default)]
    pub interval: Option<Interval>,
}

impl ExpressionInterval {
    /// A deterministic derivative.
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            interval: None,
        }
    }

    /// A derivative with bounded nondeterminism.
    pub fn with_interval(expression: Expression, interval: Option<Interval>) -> Self {
        Self {
            expression,
            interval,
        }
    }

    /// Check if the derivative is the literal zero with no uncertainty.
    pub fn is_zero(&self) -> bool {
        self.interval.is_none() && self.expression == Expression::Constant(0.0)
    }
}

impl fmt::Display for ExpressionInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.interval {
            Some(i) => write!(f, "{} + {}", self.expression, i),
            None => write!(f, "{}", self.expression),
        }
    }
}

/// A discrete state of a hybrid automaton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomatonMode {
    /// Unique name within the owning component.
    pub name: String,
    /// Condition that must hold while control stays in this mode.
    pub invariant: Expression,
    /// Derivative of each continuous variable, keyed by variable name.
    pub flow_dynamics: BTreeMap<String, ExpressionInterval>,
}

impl AutomatonMode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            invariant: Expression::TRUE,
            flow_dynamics: BTreeMap::new(),
        }
    }

    /// Get the flow for a variable.
    pub fn flow(&self, variable: &str) -> Option<&ExpressionInterval> {
        self.flow_dynamics.get(variable)
    }

    /// True when every derivative is exactly zero.
    pub fn is_static(&self) -> bool {
        !self.flow_dynamics.is_empty() && self.flow_dynamics.values().all(|f| f.is_zero())
    }
}
