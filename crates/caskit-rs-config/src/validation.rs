//! Configuration validation

use crate::{ClientConfig, ConfigError, Result, keys};

/// Validate a resolved configuration.
///
/// The `protocol` value is left to the consumer that maps it onto a
/// protocol variant.
pub fn validate_config(config: &ClientConfig) -> Result<()> {
    validate_target(config)?;

    if let Some(ref name) = config.service_parameter_name {
        validate_parameter_names(keys::SERVICE_PARAMETER_NAME.name(), name)?;
    }

    if let Some(ref name) = config.artifact_parameter_name {
        validate_parameter_name(keys::ARTIFACT_PARAMETER_NAME.name(), name)?;
    }

    Ok(())
}

fn validate_target(config: &ClientConfig) -> Result<()> {
    let has_server_name = config
        .server_name
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());
    let has_service = config
        .service
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());

    if !has_server_name && !has_service {
        return Err(ConfigError::ValidationError(format!(
            "one of '{}' and '{}' must not be empty",
            keys::SERVER_NAME.name(),
            keys::SERVICE.name()
        )));
    }

    if has_server_name && has_service {
        tracing::debug!(
            "Both {} and {} are set; {} takes precedence",
            keys::SERVER_NAME.name(),
            keys::SERVICE.name(),
            keys::SERVICE.name()
        );
    }

    Ok(())
}

/// Comma separated list; every element must be a valid name
fn validate_parameter_names(field: &str, names: &str) -> Result<()> {
    for name in names.split(',') {
        validate_parameter_name(field, name)?;
    }
    Ok(())
}

fn validate_parameter_name(field: &str, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{field} cannot contain an empty parameter name"
        )));
    }

    if name.contains(['&', '=', '?', '#']) || name.contains(char::is_whitespace) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: name.to_string(),
        });
    }

    Ok(())
}
