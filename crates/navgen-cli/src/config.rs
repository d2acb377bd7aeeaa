//! Generator option resolution.
//!
//! Options are layered with increasing precedence: built-in defaults, the
//! `--preset`, the `--config` JSON file, and finally individual flags.

use std::path::Path;

use anyhow::{Context, Result};
use navgen_generator::{NavigationConfig, Preset};
use serde_json::Value;
use tracing::debug;

use crate::NavArgs;

/// Resolve the navigation options from all sources.
pub fn resolve_nav(args: &NavArgs) -> Result<NavigationConfig> {
    let mut config = match &args.preset {
        Some(name) => {
            let preset: Preset = name.parse()?;
            debug!(preset = %preset, "starting from preset");
            preset.config()
        }
        None => NavigationConfig::default(),
    };

    if let Some(path) = &args.config {
        config = overlay_file(config, path)?;
    }

    apply_flags(&mut config, args);
    Ok(config)
}

/// Overlay the keys present in a JSON config file onto `base`.
///
/// Keys absent from the file keep their value from `base`, so a file may
/// set just the matrix on top of a preset.
fn overlay_file(base: NavigationConfig, path: &Path) -> Result<NavigationConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let file: Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    let Value::Object(fields) = file else {
        anyhow::bail!("Config file {} must contain a JSON object", path.display());
    };

    let mut merged = serde_json::to_value(&base).context("Failed to serialize base config")?;
    if let Value::Object(target) = &mut merged {
        for (key, value) in fields {
            debug!(key = %key, "config file override");
            target.insert(key, value);
        }
    }

    serde_json::from_value(merged)
        .with_context(|| format!("Invalid generator options in {}", path.display()))
}

fn apply_flags(config: &mut NavigationConfig, args: &NavArgs) {
    if let Some(matrix) = &args.matrix {
        config.matrix = matrix.clone();
    }
    if let Some(i_list) = &args.i_list {
        config.i_list = i_list.clone();
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(x) = args.startx {
        config.startx = x;
    }
    if let Some(y) = args.starty {
        config.starty = y;
    }
    if let Some(noise) = args.noise {
        config.noise = noise;
    }
    if let Some(prefix) = &args.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(time) = args.time_horizon {
        config.time_horizon = Some(time);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        let config = resolve_nav(&NavArgs::default()).unwrap();
        assert_eq!(config, NavigationConfig::default());
    }

    #[test]
    fn test_flags_override_preset() {
        let args = NavArgs {
            preset: Some("fig1b".to_string()),
            noise: Some(0.0),
            startx: Some(2.5),
            ..Default::default()
        };
        let config = resolve_nav(&args).unwrap();
        assert_eq!(config.noise, 0.0);
        assert_eq!(config.startx, 2.5);
        assert_eq!(config.starty, 1.5);
        assert_eq!(config.width, 3);
    }

    #[test]
    fn test_file_overrides_preset_and_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"width": 9, "noise": 0.5}}"#).unwrap();

        let args = NavArgs {
            preset: Some("fig2a".to_string()),
            config: Some(file.path().to_path_buf()),
            width: Some(5),
            ..Default::default()
        };
        let config = resolve_nav(&args).unwrap();
        assert_eq!(config.width, 5);
        assert_eq!(config.noise, 0.5);
        assert_eq!(config.i_list.len(), 25);
    }

    #[test]
    fn test_file_must_be_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();

        let args = NavArgs {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert!(resolve_nav(&args).is_err());
    }

    #[test]
    fn test_unknown_preset() {
        let args = NavArgs {
            preset: Some("fig9".to_string()),
            ..Default::default()
        };
        let err = resolve_nav(&args).unwrap_err();
        assert!(err.to_string().contains("unknown preset"));
    }
}
