// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Concierge service.
//!
//! TOML files layered over compiled defaults with `CONCIERGE_*` environment
//! overrides, strict key checking, and miette diagnostics on failure.
//!
//! ```no_run
//! use concierge_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AppConfig, ConciergeConfig, GatewayConfig, RealtimeConfig, StorageConfig, WorkflowConfig,
};

/// Load from the standard hierarchy and validate.
pub fn load_and_validate() -> Result<ConciergeConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = collect_toml_sources();
            tracing::debug!(files = sources.len(), "configuration failed to extract");
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load one explicit file (plus env overrides) and validate.
pub fn load_and_validate_path(path: &Path) -> Result<ConciergeConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(absolute(path), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load an inline TOML string and validate. No files or env are consulted.
pub fn load_and_validate_str(toml_content: &str) -> Result<ConciergeConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn absolute(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![Path::new(loader::LOCAL_CONFIG).to_path_buf()];
    if let Some(user) = loader::user_config_path() {
        candidates.push(user);
    }
    candidates.push(Path::new(loader::SYSTEM_CONFIG).to_path_buf());

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (absolute(&path), content))
        })
        .collect()
}
