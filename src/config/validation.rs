//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check application hostnames and route declarations
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ApplicationConfig, RouterConfig};

/// A single semantic problem in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid address for {field}: '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("application_path must not be empty")]
    EmptyApplicationPath,

    #[error("at least one hostname is required")]
    NoHostnames,

    #[error("hostname #{0} is empty")]
    EmptyHostname(usize),

    #[error("route for handler '{0}' has an empty handler name or no patterns")]
    IncompleteRoute(String),

    #[error("handler '{handler}' has an empty pattern")]
    EmptyPattern { handler: String },
}

/// Validate the router configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.application_path.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyApplicationPath);
    }
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.reload.enabled && config.reload.poll_interval_secs == 0 {
        errors.push(ValidationError::ZeroValue("reload.poll_interval_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate one application's configuration.
pub fn validate_application(config: &ApplicationConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.hostnames.is_empty() {
        errors.push(ValidationError::NoHostnames);
    }
    for (i, hostname) in config.hostnames.iter().enumerate() {
        if hostname.trim().is_empty() {
            errors.push(ValidationError::EmptyHostname(i));
        }
    }

    for route in &config.routes {
        if route.handler.trim().is_empty() || route.patterns.is_empty() {
            errors.push(ValidationError::IncompleteRoute(route.handler.clone()));
        }
        if route.patterns.iter().any(|p| p.trim_matches('/').trim().is_empty()) {
            errors.push(ValidationError::EmptyPattern {
                handler: route.handler.clone(),
            });
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
    use crate::config::schema::RouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RouterConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ValidationError::ZeroValue("timeouts.request_secs")));
    }

    #[test]
    fn test_application_requires_hostnames() {
        let config = ApplicationConfig::default();
        assert_eq!(
            validate_application(&config).unwrap_err(),
            vec![ValidationError::NoHostnames]
        );
    }

    #[test]
    fn test_application_routes() {
        let config = ApplicationConfig {
            hostnames: vec!["example.com".into(), " ".into()],
            routes: vec![
                RouteConfig {
                    handler: "shop::index".into(),
                    patterns: vec![],
                },
                RouteConfig {
                    handler: "shop::product".into(),
                    patterns: vec!["/".into()],
                },
            ],
            ..Default::default()
        };

        let errors = validate_application(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyHostname(1),
                ValidationError::IncompleteRoute("shop::index".into()),
                ValidationError::EmptyPattern {
                    handler: "shop::product".into()
                },
            ]
        );
    }
}
