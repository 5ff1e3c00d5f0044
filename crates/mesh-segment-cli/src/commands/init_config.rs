//! mesh-segment init-config command - write the reference sweep configuration.

use std::path::Path;

use anyhow::{Context, Result};
use mesh_segment::SweepConfig;

use crate::{Cli, output};

pub fn run(path: &Path, cli: &Cli) -> Result<()> {
    SweepConfig::reference()
        .save_toml(path)
        .with_context(|| format!("Failed to write config to {:?}", path))?;

    output::success(
        &format!("Reference configuration written to {}", path.display()),
        cli.format,
        cli.quiet,
    );
    Ok(())
}
