//! Symbolic expression trees used for guards, invariants and flows.
//!
//! Expressions are plain owned trees. Arithmetic and boolean nodes share one
//! type so that a guard like `x >= 2` and a derivative like
//! `-1.2 * (xvel - 0.5)` can be stored, compared and printed uniformly.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Operators that may appear in an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// Unary minus.
    Negative,
    Equal,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl Operator {
    /// Infix symbol used when printing.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract | Operator::Negative => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Equal => "==",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
            Operator::Equal
            | Operator::Less
            | Operator::LessEqual
            | Operator::Greater
            | Operator::GreaterEqual => 3,
            Operator::Add | Operator::Subtract => 4,
            Operator::Multiply | Operator::Divide => 5,
            Operator::Negative => 6,
        }
    }

    /// True for the relational operators.
    pub fn is_comparison(&self) -> bool {
        self.precedence() == 3
    }

    /// True for operators producing a boolean.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Operator::And | Operator::Or) || self.is_comparison()
    }
}

/// A node in a symbolic expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Real-valued literal.
    Constant(f64),
    /// Boolean literal.
    Bool(bool),
    /// Reference to a continuous variable.
    Variable(String),
    /// Unary operation (only [`Operator::Negative`]).
    Unary {
        op: Operator,
        operand: Box<Expression>,
    },
    /// Binary operation.
    Binary {
        op: Operator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

/// Result of evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Real(f64),
    Bool(bool),
}

impl Value {
    /// Numeric value, if this is a real.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Bool(_) => None,
        }
    }

    /// Truth value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Real(_) => None,
        }
    }
}

impl Expression {
    /// The always-true condition.
    pub const TRUE: Expression = Expression::Bool(true);

    /// The always-false condition.
    pub const FALSE: Expression = Expression::Bool(false);

    /// Create a numeric constant.
    pub fn constant(value: f64) -> Self {
        Expression::Constant(value)
    }

    /// Create a variable reference.
    pub fn var(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    /// Create a binary operation.
    pub fn binary(op: Operator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create a unary negation.
    pub fn negate(operand: Expression) -> Self {
        Expression::Unary {
            op: Operator::Negative,
            operand: Box::new(operand),
        }
    }

    /// Compare a variable against a constant, e.g. `x <= 3`.
    pub fn compare(variable: impl Into<String>, op: Operator, value: f64) -> Self {
        Self::binary(op, Self::var(variable), Self::constant(value))
    }

    /// Conjunction that drops literal `true` operands.
    pub fn and(left: Expression, right: Expression) -> Self {
        if left == Self::TRUE {
            right
        } else if right == Self::TRUE {
            left
        } else {
            Self::binary(Operator::And, left, right)
        }
    }

    /// Fold a sequence of conditions into one conjunction.
    pub fn and_all(parts: impl IntoIterator<Item = Expression>) -> Self {
        parts.into_iter().fold(Self::TRUE, Self::and)
    }

    /// Check whether this expression produces a boolean.
    pub fn is_boolean(&self) -> bool {
        match self {
            Expression::Bool(_) => true,
            Expression::Binary { op, .. } => op.is_boolean(),
            _ => false,
        }
    }

    /// Flatten a chain of `&&` into its operands.
    ///
    /// `true` has no conjuncts.
    pub fn conjuncts(&self) -> Vec<&Expression> {
        let mut out = Vec::new();
        self.collect_conjuncts(&mut out);
        out
    }

    fn collect_conjuncts<'a>(&'a self, out: &mut Vec<&'a Expression>) {
        match self {
            Expression::Bool(true) => {}
            Expression::Binary {
                op: Operator::And,
                left,
                right,
            } => {
                left.collect_conjuncts(out);
                right.collect_conjuncts(out);
            }
            other => out.push(other),
        }
    }

    /// Names of all variables referenced in this expression.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Expression::Variable(name) => {
                out.insert(name.as_str());
            }
            Expression::Unary { operand, .. } => operand.collect_variables(out),
            Expression::Binary { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expression::Constant(_) | Expression::Bool(_) => {}
        }
    }

    /// Evaluate against a variable assignment.
    pub fn evaluate(&self, env: &HashMap<String, f64>) -> ModelResult<Value> {
        match self {
            Expression::Constant(v) => Ok(Value::Real(*v)),
            Expression::Bool(b) => Ok(Value::Bool(*b)),
            Expression::Variable(name) => env
                .get(name)
                .copied()
                .map(Value::Real)
                .ok_or_else(|| ModelError::Evaluation {
                    message: format!("variable '{}' is unbound", name),
                }),
            Expression::Unary { op, operand } => {
                if *op != Operator::Negative {
                    return Err(ModelError::Evaluation {
                        message: format!("'{}' is not a unary operator", op.symbol()),
                    });
                }
                let v = real(operand.evaluate(env)?, *op)?;
                Ok(Value::Real(-v))
            }
            Expression::Binary { op, left, right } => {
                let l = left.evaluate(env)?;
                let r = right.evaluate(env)?;
                match op {
                    Operator::And | Operator::Or => {
                        let (l, r) = (boolean(l, *op)?, boolean(r, *op)?);
                        Ok(Value::Bool(if *op == Operator::And {
                            l && r
                        } else {
                            l || r
                        }))
                    }
                    _ => {
                        let (l, r) = (real(l, *op)?, real(r, *op)?);
                        match op {
                            Operator::Add => Ok(Value::Real(l + r)),
                            Operator::Subtract => Ok(Value::Real(l - r)),
                            Operator::Multiply => Ok(Value::Real(l * r)),
                            Operator::Divide => Ok(Value::Real(l / r)),
                            Operator::Equal => Ok(Value::Bool(l == r)),
                            Operator::Less => Ok(Value::Bool(l < r)),
                            Operator::LessEqual => Ok(Value::Bool(l <= r)),
                            Operator::Greater => Ok(Value::Bool(l > r)),
                            Operator::GreaterEqual => Ok(Value::Bool(l >= r)),
                            Operator::Negative | Operator::And | Operator::Or => {
                                Err(ModelError::Evaluation {
                                    message: format!(
                                        "'{}' is not a binary arithmetic operator",
                                        op.symbol()
                                    ),
                                })
                            }
                        }
                    }
                }
            }
        }
    }

    fn binding(&self) -> u8 {
        match self {
            Expression::Constant(v) if *v < 0.0 => Operator::Negative.precedence(),
            Expression::Unary { op, .. } | Expression::Binary { op, .. } => op.precedence(),
            _ => u8::MAX,
        }
    }
}

fn real(value: Value, op: Operator) -> ModelResult<f64> {
    value.as_real().ok_or_else(|| ModelError::Evaluation {
        message: format!("operator '{}' expects a number", op.symbol()),
    })
}

fn boolean(value: Value, op: Operator) -> ModelResult<bool> {
    value.as_bool().ok_or_else(|| ModelError::Evaluation {
        message: format!("operator '{}' expects a condition", op.symbol()),
    })
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(v) => write!(f, "{}", v),
            Expression::Bool(b) => write!(f, "{}", b),
            Expression::Variable(name) => write!(f, "{}", name),
            Expression::Unary { op, operand } => {
                // `-1` would read back as a literal, so negated constants keep parens.
                let literal = matches!(**operand, Expression::Constant(_));
                if operand.binding() == u8::MAX && !literal {
                    write!(f, "{}{}", op.symbol(), operand)
                } else {
                    write!(f, "{}({})", op.symbol(), operand)
                }
            }
            Expression::Binary { op, left, right } => {
                let prec = op.precedence();
                // Comparisons do not associate, so both sides need parens at equal strength.
                if left.binding() < prec || (op.is_comparison() && left.binding() == prec) {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, " {} ", op.symbol())?;
                if right.binding() <= prec {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_and_drops_true() {
        let guard = Expression::compare("x", Operator::LessEqual, 1.0);
        assert_eq!(Expression::and(Expression::TRUE, guard.clone()), guard);
        assert_eq!(Expression::and(guard.clone(), Expression::TRUE), guard);
        assert_eq!(Expression::and_all(Vec::new()), Expression::TRUE);
    }

    #[test]
    fn test_conjuncts_flatten() {
        let e = Expression::and_all(vec![
            Expression::compare("x", Operator::GreaterEqual, 1.0),
            Expression::compare("x", Operator::LessEqual, 2.0),
            Expression::compare("y", Operator::GreaterEqual, 0.0),
        ]);
        assert_eq!(e.conjuncts().len(), 3);
        assert!(Expression::TRUE.conjuncts().is_empty());
    }

    #[test]
    fn test_evaluate_arithmetic_and_conditions() {
        let e = Expression::binary(
            Operator::Multiply,
            Expression::constant(-2.0),
            Expression::binary(
                Operator::Subtract,
                Expression::var("xvel"),
                Expression::constant(0.5),
            ),
        );
        let v = e.evaluate(&env(&[("xvel", 1.5)])).unwrap();
        assert_eq!(v, Value::Real(-2.0));

        let cond = Expression::compare("x", Operator::GreaterEqual, 1.0);
        assert_eq!(
            cond.evaluate(&env(&[("x", 1.0)])).unwrap(),
            Value::Bool(true)
        );
        assert!(cond.evaluate(&env(&[])).is_err());
    }

    #[test]
    fn test_display_parenthesizes() {
        let e = Expression::binary(
            Operator::Multiply,
            Expression::constant(-1.5),
            Expression::binary(Operator::Subtract, Expression::var("xvel"), Expression::constant(0.25)),
        );
        assert_eq!(e.to_string(), "-1.5 * (xvel - 0.25)");

        let nested = Expression::binary(
            Operator::Subtract,
            Expression::var("a"),
            Expression::binary(Operator::Subtract, Expression::var("b"), Expression::var("c")),
        );
        assert_eq!(nested.to_string(), "a - (b - c)");
    }

    #[test]
    fn test_display_negated_literal() {
        assert_eq!(Expression::negate(Expression::constant(1.0)).to_string(), "-(1)");
        assert_eq!(Expression::negate(Expression::constant(-1.0)).to_string(), "-(-1)");
        assert_eq!(Expression::negate(Expression::var("x")).to_string(), "-x");
    }

    #[test]
    fn test_evaluate_rejects_misplaced_operators() {
        let unary_plus = Expression::Unary {
            op: Operator::Add,
            operand: Box::new(Expression::constant(1.0)),
        };
        assert!(matches!(
            unary_plus.evaluate(&env(&[])),
            Err(ModelError::Evaluation { .. })
        ));

        let json = r#"{"binary":{"op":"negative","left":{"constant":1.0},"right":{"constant":2.0}}}"#;
        let binary_neg: Expression = serde_json::from_str(json).unwrap();
        assert!(matches!(
            binary_neg.evaluate(&env(&[])),
            Err(ModelError::Evaluation { .. })
        ));
    }

    #[test]
    fn test_variables() {
        let e = Expression::and(
            Expression::compare("x", Operator::LessEqual, 1.0),
            Expression::compare("yvel", Operator::GreaterEqual, -1.0),
        );
        let vars: Vec<&str> = e.variables().into_iter().collect();
        assert_eq!(vars, vec!["x", "yvel"]);
    }
}
