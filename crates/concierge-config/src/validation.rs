// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks serde attributes cannot express. Collects every failure
//! rather than stopping at the first.

use crate::diagnostic::ConfigError;
use crate::model::ConciergeConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &ConciergeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.app.name.trim().is_empty() {
        errors.push(ConfigError::invalid("app.name must not be empty"));
    }

    let level = config.app.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::invalid(format!(
            "app.log_level `{}` is not one of {}",
            config.app.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid("storage.database_path must not be empty"));
    }

    if config.realtime.channel_capacity == 0 {
        errors.push(ConfigError::invalid(
            "realtime.channel_capacity must be at least 1",
        ));
    }

    if config.realtime.max_subscribers == 0 {
        errors.push(ConfigError::invalid(
            "realtime.max_subscribers must be at least 1",
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::invalid("gateway.host must not be empty"));
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::invalid(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if let Some(token) = &config.gateway.proxy_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::invalid(
            "gateway.proxy_token must not be blank when set",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
