//! Environment variable and home directory expansion for config values.

use std::path::PathBuf;

use crate::ConfigError;

fn lookup_error(field: &str, err: &shellexpand::LookupError<std::env::VarError>) -> ConfigError {
    ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", err.var_name),
    }
}

/// Expand a leading `~` plus environment variable references in a path.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<PathBuf, ConfigError> {
    shellexpand::full(value)
        .map(|expanded| PathBuf::from(expanded.into_owned()))
        .map_err(|e| lookup_error(field, &e))
}
