//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::schema::GateConfig;
use super::validation::{validate_config, ValidationError};
use crate::acl::{HostAcl, Members, MutableAcl};
use crate::codec;
use crate::error::CodecError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("host file {path}: {source}")]
    HostFile { path: String, source: CodecError },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// A relative `host_file` is resolved against the config file's directory
/// and its members are merged into `policy.hosts`.
pub fn load_config(path: &Path) -> Result<GateConfig, LoadError> {
    let content = fs::read_to_string(path)?;
    let mut config: GateConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(LoadError::Validation)?;

    if let Some(host_file) = &config.policy.host_file {
        let resolved = match path.parent() {
            Some(dir) if host_file.is_relative() => dir.join(host_file),
            _ => host_file.clone(),
        };
        let extra: HostAcl = codec::load_file(&resolved).map_err(|source| LoadError::HostFile {
            path: resolved.display().to_string(),
            source,
        })?;
        for addr in extra.snapshot() {
            config.policy.hosts.add(addr);
        }
        config.policy.host_file = Some(resolved);
    }

    tracing::info!(
        path = %path.display(),
        mode = ?config.policy.mode,
        hosts = config.policy.hosts.len(),
        networks = config.policy.networks.len(),
        "Policy loaded"
    );
    Ok(config)
}
