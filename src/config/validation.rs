use crate::config::types::{
    Config, FetchConfig, ListingConfig, OutputConfig, PacingConfig, SourcesConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_pacing_config(&config.pacing)?;
    validate_sources_config(&config.sources)?;
    validate_listing_config(&config.listing)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the header profile and timeouts
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 120, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and timeout_secs ({}), got {}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates pacing
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    // More than a minute between pages is almost certainly a unit mistake
    if config.min_interval_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "min_interval_ms must be <= 60000ms, got {}ms",
            config.min_interval_ms
        )));
    }

    Ok(())
}

/// Validates the base origins
fn validate_sources_config(config: &SourcesConfig) -> Result<(), ConfigError> {
    validate_base_url("allforyoung_base", &config.allforyoung_base)?;
    validate_base_url("wevity_base", &config.wevity_base)?;
    Ok(())
}

fn validate_base_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must have a host, got '{}'",
            name, value
        )));
    }

    Ok(())
}

/// Validates listing bounds
fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    if config.max_pages_cap < 1 || config.max_pages_cap > 100 {
        return Err(ConfigError::Validation(format!(
            "max_pages_cap must be between 1 and 100, got {}",
            config.max_pages_cap
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("base", "https://www.wevity.com").is_ok());
        assert!(validate_base_url("base", "http://127.0.0.1:8080").is_ok());

        assert!(validate_base_url("base", "").is_err());
        assert!(validate_base_url("base", "ftp://example.com").is_err());
        assert!(validate_base_url("base", "www.wevity.com").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.fetch.timeout_secs = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_connect_timeout_longer_than_total_rejected() {
        let mut config = Config::default();
        config.fetch.timeout_secs = 5;
        config.fetch.connect_timeout_secs = 10;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_page_cap_bounds() {
        let mut config = Config::default();
        config.listing.max_pages_cap = 0;
        assert!(validate(&config).is_err());

        config.listing.max_pages_cap = 101;
        assert!(validate(&config).is_err());

        config.listing.max_pages_cap = 100;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_interval_allowed() {
        let mut config = Config::default();
        config.pacing.min_interval_ms = 0;
        assert!(validate(&config).is_ok());
    }
}
