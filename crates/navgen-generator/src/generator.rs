//! The navigation benchmark generator.
//!
//! Generation runs strictly forward: the raw [`NavigationConfig`] is
//! validated into [`GridParameters`], the mode grid is built, then the
//! neighbor transitions, and finally the initial set, forbidden set and
//! plot settings are attached. Validation finishes before any mode exists,
//! so a failed run never leaves a partial automaton behind.

use std::collections::BTreeMap;

use navgen_core::{BaseComponent, Configuration, ExpressionParser, InfixParser};
use tracing::{debug, debug_span};

use crate::config::NavigationConfig;
use crate::dynamics::{STATE_VARIABLES, X, XVEL, Y, YVEL};
use crate::error::GeneratorResult;
use crate::grid::{build_modes, build_transitions};
use crate::params::GridParameters;

const NAV_FLAG: &str = "nav";
const NAV_NAME: &str = "Navigation [Fehnker06]";

/// A named producer of hybrid automaton models.
pub trait ModelGenerator {
    /// Short flag used to select the generator, e.g. `nav`.
    fn command_line_flag(&self) -> &'static str;

    /// Human readable name.
    fn name(&self) -> &'static str;

    /// Build the model.
    fn generate(&self) -> GeneratorResult<Configuration>;
}

/// Flags and names of every generator in this crate.
pub fn available_generators() -> Vec<(&'static str, &'static str)> {
    vec![(NAV_FLAG, NAV_NAME)]
}

/// Generates the NAV benchmark from "Benchmarks for Hybrid Systems
/// Verification", Fehnker et al., HSCC 2004.
#[derive(Debug, Clone)]
pub struct NavigationGenerator<P = InfixParser> {
    config: NavigationConfig,
    parser: P,
}

impl NavigationGenerator {
    pub const FLAG: &'static str = NAV_FLAG;
    pub const NAME: &'static str = NAV_NAME;

    /// Create a generator using the stock infix parser.
    pub fn new(config: NavigationConfig) -> Self {
        Self::with_parser(config, InfixParser)
    }
}

impl<P: ExpressionParser> NavigationGenerator<P> {
    /// Create a generator with a custom expression parser.
    pub fn with_parser(config: NavigationConfig, parser: P) -> Self {
        Self { config, parser }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Assemble the model from already validated parameters.
    pub fn assemble(&self, params: &GridParameters) -> GeneratorResult<Configuration> {
        let mut ha = BaseComponent::new();
        for var in STATE_VARIABLES {
            ha.declare_variable(var);
        }

        let mut forbidden = BTreeMap::new();
        let grid = build_modes(params, &mut ha, &mut forbidden, &self.parser)?;
        let transitions = build_transitions(&grid, &mut ha)?;

        let (sx, sy) = params.start();
        let init = self.parser.parse_condition(&format!(
            "{x} == {sx} && {y} == {sy} && -1 <= {xv} <= 1 && -1 <= {yv} <= 1",
            x = X,
            y = Y,
            xv = XVEL,
            yv = YVEL,
        ))?;

        let mut config = Configuration::new(ha);
        config.init.insert(params.start_mode_name().to_string(), init);
        config.forbidden = forbidden;
        config.settings.plot_variable_names = [X.to_string(), Y.to_string()];
        if let Some(time) = params.time_horizon() {
            config.settings.spaceex.time_horizon = time;
        }

        config.validate()?;

        debug!(
            modes = config.root.mode_count(),
            transitions,
            forbidden = config.forbidden.len(),
            start = params.start_mode_name(),
            "assembled navigation automaton"
        );

        Ok(config)
    }
}

impl<P: ExpressionParser> ModelGenerator for NavigationGenerator<P> {
    fn command_line_flag(&self) -> &'static str {
        NAV_FLAG
    }

    fn name(&self) -> &'static str {
        NAV_NAME
    }

    fn generate(&self) -> GeneratorResult<Configuration> {
        let span = debug_span!("generate", generator = NAV_FLAG);
        let _enter = span.enter();

        let params = GridParameters::validate(&self.config)?;
        debug!(
            width = params.width(),
            height = params.height(),
            noise = params.noise(),
            "validated parameters"
        );

        self.assemble(&params)
    }
}

/// Generate a navigation instance with the stock parser.
pub fn generate_navigation(config: &NavigationConfig) -> GeneratorResult<Configuration> {
    NavigationGenerator::new(config.clone()).generate()
}
