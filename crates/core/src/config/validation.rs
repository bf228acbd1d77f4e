//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_ttl_secs` is 0
    /// - `cache_max_entries` is 0 or `cache_evict_count` is outside 1..=`cache_max_entries`
    /// - `navigation_timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `selector_timeout_ms` is 0 or not below the navigation timeout
    /// - `user_agent` is empty, a viewport dimension is 0, or `max_bytes` is 0
    /// - `batch_concurrency` is outside 1..=16
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }

        if self.cache_max_entries == 0 {
            return Err(invalid("cache_max_entries", "must be greater than 0"));
        }
        if self.cache_evict_count == 0 || self.cache_evict_count > self.cache_max_entries {
            return Err(invalid("cache_evict_count", "must be between 1 and cache_max_entries"));
        }

        if self.navigation_timeout_ms < 100 {
            return Err(invalid("navigation_timeout_ms", "must be at least 100ms"));
        }
        if self.navigation_timeout_ms > 300_000 {
            return Err(invalid("navigation_timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.selector_timeout_ms == 0 {
            return Err(invalid("selector_timeout_ms", "must be greater than 0"));
        }
        if self.selector_timeout_ms >= self.navigation_timeout_ms {
            return Err(invalid("selector_timeout_ms", "must be below navigation_timeout_ms"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(invalid("viewport", "dimensions must be greater than 0"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }

        if self.batch_concurrency == 0 || self.batch_concurrency > 16 {
            return Err(invalid("batch_concurrency", "must be between 1 and 16"));
        }

        if self.slow_settle_delay_ms < self.settle_delay_ms {
            tracing::warn!(
                settle_delay_ms = self.settle_delay_ms,
                slow_settle_delay_ms = self.slow_settle_delay_ms,
                "slow_settle_delay_ms is shorter than settle_delay_ms"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), ConfigError>) -> Option<String> {
        match result {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_ttl() {
        let config = AppConfig { cache_ttl_secs: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("cache_ttl_secs"));
    }

    #[test]
    fn test_validate_evict_count_exceeds_capacity() {
        let config = AppConfig { cache_max_entries: 50, cache_evict_count: 51, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("cache_evict_count"));
    }

    #[test]
    fn test_validate_zero_evict_count() {
        let config = AppConfig { cache_evict_count: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("cache_evict_count"));
    }

    #[test]
    fn test_validate_navigation_timeout_bounds() {
        let config = AppConfig { navigation_timeout_ms: 50, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("navigation_timeout_ms"));

        let config = AppConfig { navigation_timeout_ms: 301_000, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("navigation_timeout_ms"));
    }

    #[test]
    fn test_validate_selector_timeout() {
        let config = AppConfig { selector_timeout_ms: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("selector_timeout_ms"));

        let config = AppConfig { selector_timeout_ms: 15_000, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("selector_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("user_agent"));
    }

    #[test]
    fn test_validate_zero_viewport() {
        let config = AppConfig { viewport_height: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("viewport"));
    }

    #[test]
    fn test_validate_batch_concurrency() {
        let config = AppConfig { batch_concurrency: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("batch_concurrency"));

        let config = AppConfig { batch_concurrency: 17, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("batch_concurrency"));

        let config = AppConfig { batch_concurrency: 16, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            cache_ttl_secs: 1,
            cache_max_entries: 1,
            cache_evict_count: 1,
            navigation_timeout_ms: 100,
            selector_timeout_ms: 99,
            max_bytes: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
