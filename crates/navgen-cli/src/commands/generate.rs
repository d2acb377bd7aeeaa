//! Generate command implementation.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use navgen_core::Configuration;
use navgen_generator::{ModelGenerator, NavigationConfig, NavigationGenerator};
use tracing::info;

use super::OutputFormat;
use crate::config::resolve_nav;
use crate::NavArgs;

/// Build a navigation instance and emit it in the requested format.
pub fn execute_nav(args: &NavArgs, format: OutputFormat) -> Result<()> {
    let config = resolve_nav(args)?;
    let generator = NavigationGenerator::new(config.clone());

    info!(
        generator = generator.command_line_flag(),
        cells = config.i_list.len(),
        width = config.width,
        "Generating model"
    );

    let model = generator
        .generate()
        .with_context(|| format!("Failed to generate {}", generator.name()))?;

    let content = match format {
        OutputFormat::Summary => render_summary(generator.name(), &config, &model)?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(&model).context("Failed to serialize model")?
        }
    };

    match &args.output {
        Some(path) => write_output(path, &content),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output to: {}", path.display()))?;

    println!("Output written to: {}", path.display());
    Ok(())
}

/// Human readable overview followed by one block per mode.
fn render_summary(
    name: &str,
    config: &NavigationConfig,
    model: &Configuration,
) -> Result<String> {
    let ha = &model.root;
    let width = usize::try_from(config.width).context("Width out of range")?;
    let height = config.i_list.len() / width;

    let start = model
        .init
        .keys()
        .next()
        .context("Model has no initial mode")?;
    let start_id = ha
        .mode_id(start)
        .with_context(|| format!("Initial mode {} not found", start))?;
    let reachable = ha.reachable_from(start_id)?.len();

    let forbidden = if model.forbidden.is_empty() {
        "none".to_string()
    } else {
        model.forbidden.keys().cloned().collect::<Vec<_>>().join(", ")
    };

    let mut out = String::new();
    writeln!(out, "{}", name)?;
    writeln!(out, "Grid: {} x {}", width, height)?;
    writeln!(out, "Variables: {}", ha.variables.join(", "))?;
    writeln!(out, "Modes: {}", ha.mode_count())?;
    writeln!(out, "Transitions: {}", ha.transition_count())?;
    writeln!(out, "Forbidden: {}", forbidden)?;
    writeln!(out, "Start: {}", start)?;
    writeln!(out, "Reachable: {} of {} modes", reachable, ha.mode_count())?;

    for (id, mode) in ha.modes() {
        writeln!(out)?;
        writeln!(out, "{}", mode.name)?;
        writeln!(out, "  inv: {}", mode.invariant)?;
        for var in &ha.variables {
            if let Some(flow) = mode.flow(var) {
                writeln!(out, "  {}' = {}", var, flow)?;
            }
        }
        let targets: Vec<&str> = ha
            .outgoing(id)
            .filter_map(|t| ha.mode(t.to))
            .map(|m| m.name.as_str())
            .collect();
        write!(out, "  jumps: {}", targets.join(", "))?;
    }

    Ok(out)
}
