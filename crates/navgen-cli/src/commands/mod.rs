//! CLI command implementations.

pub mod generate;
pub mod presets;

/// Output format for generated models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" | "text" => Ok(Self::Summary),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unknown format: {}. Use 'summary' or 'json'", s),
        }
    }
}
