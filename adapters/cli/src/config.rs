//! Tuning overrides loaded from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use castle_defence_core::Tuning;

/// Loads the tuning table, applying overrides from `path` when one is given.
pub(crate) fn load_tuning(path: Option<&Path>, seed: Option<u64>) -> Result<Tuning> {
    let mut tuning = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read tuning file at {}", path.display()))?;
            parse_tuning(&contents)
                .with_context(|| format!("invalid tuning file {}", path.display()))?
        }
        None => Tuning::default(),
    };

    if let Some(seed) = seed {
        tuning.seed = seed;
    }
    tuning.validate().context("tuning failed validation")?;
    Ok(tuning)
}

fn parse_tuning(contents: &str) -> Result<Tuning> {
    toml::from_str(contents).context("failed to parse tuning toml contents")
}
