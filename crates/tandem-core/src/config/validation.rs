//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, TandemError};
use crate::monorepo::Latch;

use super::types::PluginConfig;

/// Validate configuration, returning every problem found
pub fn validate_config(config: &PluginConfig) -> Vec<TandemError> {
    debug!("validating configuration");
    let mut errors = Vec::new();

    validate_non_blank(&mut errors, "tarballDir", config.tarball_dir.as_deref());
    validate_non_blank(&mut errors, "pkgRoot", config.pkg_root.as_deref());
    validate_latch(&mut errors, config);
    validate_ignore_changes(&mut errors, config);

    if errors.is_empty() {
        debug!("configuration validation passed");
    } else {
        debug!(errors = errors.len(), "configuration validation failed");
    }
    errors
}

fn invalid(field: &str, message: impl Into<String>) -> TandemError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
    .into()
}

fn validate_non_blank(errors: &mut Vec<TandemError>, field: &str, value: Option<&str>) {
    if value.is_some_and(|v| v.trim().is_empty()) {
        errors.push(invalid(field, "must be a non-empty string"));
    }
}

fn validate_latch(errors: &mut Vec<TandemError>, config: &PluginConfig) {
    if config.latch.parse::<Latch>().is_err() {
        errors.push(invalid(
            "latch",
            format!(
                "must be one of: major, minor, patch, prerelease, none (got '{}')",
                config.latch
            ),
        ));
    }
}

fn validate_ignore_changes(errors: &mut Vec<TandemError>, config: &PluginConfig) {
    for (i, pattern) in config.ignore_changes.iter().enumerate() {
        if let Err(e) = globset::Glob::new(pattern) {
            errors.push(invalid(&format!("ignoreChanges[{}]", i), e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&PluginConfig::default()).is_empty());
    }

    #[test]
    fn test_collects_every_error() {
        let config = PluginConfig {
            tarball_dir: Some("  ".to_string()),
            pkg_root: Some(String::new()),
            latch: "weekly".to_string(),
            ignore_changes: vec!["a/[".to_string(), "*.md".to_string()],
            ..Default::default()
        };

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 4);
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(messages[0].contains("tarballDir"));
        assert!(messages[1].contains("pkgRoot"));
        assert!(messages[2].contains("latch"));
        assert!(messages[3].contains("ignoreChanges[0]"));
    }

    #[test]
    fn test_valid_pkg_root() {
        let config = PluginConfig {
            pkg_root: Some("dist".to_string()),
            ..Default::default()
        };
        assert!(validate_config(&config).is_empty());
    }
}
