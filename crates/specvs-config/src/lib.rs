//! Registry configuration for specvs.
//!
//! A registry file is TOML: an optional `[engine]` table and one
//! `[[attribute]]` table per comparable spec. A registry for electric
//! scooters ships built in.

use anyhow::Context;
use specvs_domain::Registry;
use specvs_error::SpecvsError;
use specvs_types::{EngineSettings, RegistryFile};
use std::path::Path;
use tracing::info;

/// The built-in electric scooter registry, as shipped.
pub const BUILTIN_SCOOTER_TOML: &str = include_str!("../assets/scooter.toml");

pub fn parse_registry_str(text: &str) -> Result<RegistryFile, SpecvsError> {
    Ok(toml::from_str(text)?)
}

pub fn builtin_registry_file() -> Result<RegistryFile, SpecvsError> {
    parse_registry_str(BUILTIN_SCOOTER_TOML)
}

pub fn load_registry_file(path: &Path) -> anyhow::Result<RegistryFile> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SpecvsError::io(path, e))
        .with_context(|| format!("read registry {}", path.display()))?;
    let file = parse_registry_str(&text)
        .with_context(|| format!("parse registry {}", path.display()))?;
    info!(path = %path.display(), attributes = file.attributes.len(), "loaded registry");
    Ok(file)
}

/// Engine settings that can be overridden from the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub max_advantages_per_product: Option<usize>,
    pub percentage_threshold: Option<f64>,
}

pub fn apply_overrides(settings: &mut EngineSettings, overrides: &Overrides) {
    if let Some(max) = overrides.max_advantages_per_product {
        settings.max_advantages_per_product = max;
    }
    if let Some(pct) = overrides.percentage_threshold {
        settings.percentage_threshold = pct;
    }
}

/// Load (or take the built-in) registry file, apply overrides and validate.
pub fn load_registry(path: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Registry> {
    let mut file = match path {
        Some(p) => load_registry_file(p)?,
        None => builtin_registry_file().context("parse built-in scooter registry")?,
    };
    apply_overrides(&mut file.engine, overrides);

    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in scooter registry".to_string());
    Registry::from_file(file).with_context(|| format!("invalid registry ({source})"))
}
