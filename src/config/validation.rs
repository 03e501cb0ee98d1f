//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (0 < interval <= one day)
//! - Reject empty names and paths that would only fail later at runtime
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SidecarConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::path::Path;

use crate::config::schema::SidecarConfig;

/// Upper bound on the poll interval, in seconds.
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("reconcile.interval_secs must be greater than zero")]
    ZeroInterval,

    #[error("reconcile.interval_secs must be at most 86400 (one day), got {0}")]
    IntervalTooLong(u64),

    #[error("api_server must be an http(s) URL, got {0:?}")]
    InvalidApiServer(String),
}

pub fn validate_config(config: &SidecarConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let names = [
        ("discovery.pool", config.discovery.pool.as_str()),
        ("discovery.namespace", config.discovery.namespace.as_str()),
        ("discovery.port_name", config.discovery.port_name.as_str()),
    ];
    for (field, value) in names {
        if value.trim().is_empty() {
            errors.push(ValidationError::Empty(field));
        }
    }

    let paths: [(&'static str, &Path); 3] = [
        ("template.path", config.template.path.as_path()),
        ("proxy.binary", config.proxy.binary.as_path()),
        ("proxy.config_path", config.proxy.config_path.as_path()),
    ];
    for (field, path) in paths {
        if path.as_os_str().is_empty() {
            errors.push(ValidationError::Empty(field));
        }
    }

    match config.reconcile.interval_secs {
        0 => errors.push(ValidationError::ZeroInterval),
        secs if secs > MAX_INTERVAL_SECS => errors.push(ValidationError::IntervalTooLong(secs)),
        _ => {}
    }

    if config.discovery.kubeconfig.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
        errors.push(ValidationError::Empty("discovery.kubeconfig"));
    }

    if let Some(api_server) = &config.discovery.api_server {
        match url::Url::parse(api_server) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => errors.push(ValidationError::InvalidApiServer(api_server.clone())),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&SidecarConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = SidecarConfig::default();
        config.discovery.pool = String::new();
        config.reconcile.interval_secs = 0;
        config.proxy.binary = "".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Empty("discovery.pool")));
        assert!(errors.contains(&ValidationError::Empty("proxy.binary")));
        assert!(errors.contains(&ValidationError::ZeroInterval));
    }

    #[test]
    fn test_interval_is_bounded() {
        let mut config = SidecarConfig::default();
        config.reconcile.interval_secs = MAX_INTERVAL_SECS;
        assert!(validate_config(&config).is_ok());

        config.reconcile.interval_secs = u64::MAX;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::IntervalTooLong(u64::MAX)])
        );
    }

    #[test]
    fn test_api_server_must_be_http() {
        let mut config = SidecarConfig::default();
        config.discovery.api_server = Some("localhost:8001".into());
        assert!(validate_config(&config).is_err());

        config.discovery.api_server = Some("http://localhost:8001".into());
        assert!(validate_config(&config).is_ok());
    }
}
