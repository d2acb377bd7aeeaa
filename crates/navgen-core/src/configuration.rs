//! A complete model: automaton, initial states, forbidden states and settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::component::BaseComponent;
use crate::error::{ModelError, ModelResult};
use crate::expression::Expression;

/// Values consumed by a SpaceEx exporter. Carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceExConfigValues {
    #[serde(default)]
    pub output_vars: Vec<String>,
    #[serde(default = "default_time_horizon")]
    pub time_horizon: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_sampling_time")]
    pub sampling_time: f64,
    #[serde(default)]
    pub system_id: Option<String>,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    #[serde(default = "default_scenario")]
    pub scenario: String,
    #[serde(default = "default_directions")]
    pub directions: String,
    /// Maps zero-duration jump sets when set.
    #[serde(default)]
    pub time_triggered: bool,
}

fn default_time_horizon() -> f64 {
    10.0
}

fn default_max_iterations() -> u32 {
    10
}

fn default_sampling_time() -> f64 {
    0.1
}

fn default_output_format() -> String {
    "GEN".to_string()
}

fn default_scenario() -> String {
    "stc".to_string()
}

fn default_directions() -> String {
    "oct".to_string()
}

impl Default for SpaceExConfigValues {
    fn default() -> Self {
        Self {
            output_vars: Vec::new(),
            time_horizon: default_time_horizon(),
            max_iterations: default_max_iterations(),
            sampling_time: default_sampling_time(),
            system_id: None,
            output_format: default_output_format(),
            scenario: default_scenario(),
            directions: default_directions(),
            time_triggered: false,
        }
    }
}

/// Tool-independent settings attached to a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Variables on the horizontal and vertical plot axes.
    pub plot_variable_names: [String; 2],
    #[serde(default)]
    pub spaceex: SpaceExConfigValues,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plot_variable_names: [String::new(), String::new()],
            spaceex: SpaceExConfigValues::default(),
        }
    }
}

/// A hybrid automaton together with its initial and forbidden sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub root: BaseComponent,
    /// Initial states, mode name -> condition.
    pub init: BTreeMap<String, Expression>,
    /// Unsafe states, mode name -> condition.
    #[serde(default)]
    pub forbidden: BTreeMap<String, Expression>,
    #[serde(default)]
    pub settings: Settings,
}

impl Configuration {
    /// Wrap an automaton with empty init/forbidden maps and default settings.
    pub fn new(root: BaseComponent) -> Self {
        Self {
            root,
            init: BTreeMap::new(),
            forbidden: BTreeMap::new(),
            settings: Settings::default(),
        }
    }

    /// Check whether a mode is in the forbidden set.
    pub fn is_forbidden(&self, mode: &str) -> bool {
        self.forbidden.contains_key(mode)
    }

    /// Check the model for internal consistency.
    ///
    /// Fails on the first problem found: missing initial states, init or
    /// forbidden entries naming unknown modes, undeclared plot variables,
    /// flows missing for (or defined on) undeclared variables, or any
    /// expression referencing an undeclared variable.
    pub fn validate(&self) -> ModelResult<()> {
        let ha = &self.root;

        if self.init.is_empty() {
            return Err(ModelError::NoInitialStates);
        }

        for (kind, map) in [("init", &self.init), ("forbidden", &self.forbidden)] {
            for (mode, expr) in map {
                if ha.mode_id(mode).is_none() {
                    return Err(ModelError::UnknownMode { name: mode.clone() });
                }
                self.check_declared(expr, &format!("{} of {}", kind, mode))?;
            }
        }

        for var in &self.settings.plot_variable_names {
            if !ha.has_variable(var) {
                return Err(ModelError::UndeclaredVariable {
                    variable: var.clone(),
                    context: "plot settings".to_string(),
                });
            }
        }

        for (_, mode) in ha.modes() {
            for var in &ha.variables {
                if !mode.flow_dynamics.contains_key(var) {
                    return Err(ModelError::MissingFlow {
                        mode: mode.name.clone(),
                        variable: var.clone(),
                    });
                }
            }
            for (var, flow) in &mode.flow_dynamics {
                if !ha.has_variable(var) {
                    return Err(ModelError::UndeclaredVariable {
                        variable: var.clone(),
                        context: format!("flow of {}", mode.name),
                    });
                }
                self.check_declared(&flow.expression, &format!("flow {}' of {}", var, mode.name))?;
            }
            self.check_declared(&mode.invariant, &format!("invariant of {}", mode.name))?;
        }

        for t in ha.transitions() {
            let name = |id| {
                ha.mode(id)
                    .map(|m| m.name.clone())
                    .ok_or(ModelError::ModeOutOfRange { id })
            };
            let context = format!("guard {} -> {}", name(t.from)?, name(t.to)?);
            self.check_declared(&t.guard, &context)?;
        }

        Ok(())
    }

    fn check_declared(&self, expr: &Expression, context: &str) -> ModelResult<()> {
        match expr.variables().into_iter().find(|v| !self.root.has_variable(v)) {
            Some(variable) => Err(ModelError::UndeclaredVariable {
                variable: variable.to_string(),
                context: context.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Operator;
    use crate::mode::ExpressionInterval;

    fn valid_config() -> Configuration {
        let mut ha = BaseComponent::new();
        ha.declare_variable("x");
        let a = ha.create_mode("a").unwrap();
        let mode = ha.mode_mut(a).unwrap();
        mode.flow_dynamics
            .insert("x".to_string(), ExpressionInterval::new(Expression::constant(1.0)));
        mode.invariant = Expression::compare("x", Operator::LessEqual, 5.0);

        let mut c = Configuration::new(ha);
        c.init.insert("a".to_string(), Expression::compare("x", Operator::Equal, 0.0));
        c.settings.plot_variable_names = ["x".to_string(), "x".to_string()];
        c
    }

    #[test]
    fn test_valid_configuration() {
        assert_eq!(valid_config().validate(), Ok(()));
    }

    #[test]
    fn test_requires_initial_states() {
        let mut c = valid_config();
        c.init.clear();
        assert_eq!(c.validate(), Err(ModelError::NoInitialStates));
    }

    #[test]
    fn test_rejects_unknown_forbidden_mode() {
        let mut c = valid_config();
        c.forbidden.insert("ghost".to_string(), Expression::TRUE);
        assert!(matches!(c.validate(), Err(ModelError::UnknownMode { .. })));
    }

    #[test]
    fn test_rejects_undeclared_variable() {
        let mut c = valid_config();
        c.settings.plot_variable_names[1] = "y".to_string();
        assert!(matches!(
            c.validate(),
            Err(ModelError::UndeclaredVariable { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_flow() {
        let mut c = valid_config();
        c.root.declare_variable("y");
        c.settings.plot_variable_names[1] = "y".to_string();
        assert!(matches!(c.validate(), Err(ModelError::MissingFlow { .. })));
    }

    #[test]
    fn test_spaceex_defaults_from_empty_json() {
        let values: SpaceExConfigValues = serde_json::from_str("{}").unwrap();
        assert_eq!(values, SpaceExConfigValues::default());
        assert_eq!(values.output_format, "GEN");
        assert_eq!(values.directions, "oct");
    }
}
