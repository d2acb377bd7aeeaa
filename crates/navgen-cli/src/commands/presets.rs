//! Listing commands for presets and generators.

use anyhow::Result;
use navgen_generator::{available_generators, Preset};

/// Print the built-in benchmark presets.
pub fn execute() -> Result<()> {
    println!("Presets:");
    for preset in Preset::ALL {
        let config = preset.config();
        let width = config.width.max(1) as usize;
        println!(
            "  {:<6} {} x {} grid, start ({}, {}), noise {}",
            preset.name(),
            width,
            config.i_list.len() / width,
            config.startx,
            config.starty,
            config.noise
        );
    }
    Ok(())
}

/// Print the flag and name of each registered generator.
pub fn list_generators() -> Result<()> {
    println!("Generators:");
    for (flag, name) in available_generators() {
        println!("  {:<6} {}", flag, name);
    }
    Ok(())
}
