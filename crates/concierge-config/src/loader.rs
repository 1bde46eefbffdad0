// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based loader merging defaults, TOML files and `CONCIERGE_*` env vars.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ConciergeConfig;

pub const LOCAL_CONFIG: &str = "concierge.toml";
pub const SYSTEM_CONFIG: &str = "/etc/concierge/concierge.toml";

/// Per-user config file under the XDG config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("concierge").join(LOCAL_CONFIG))
}

/// Load configuration from the standard hierarchy.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/concierge/concierge.toml`
/// 3. `~/.config/concierge/concierge.toml`
/// 4. `./concierge.toml`
/// 5. `CONCIERGE_*` environment variables
pub fn load_config() -> Result<ConciergeConfig, figment::Error> {
    build_figment().extract()
}

/// Load from an inline TOML string over the defaults, no files or env.
pub fn load_config_from_str(toml_content: &str) -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load from one explicit file, then env overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Env vars map section-first: `CONCIERGE_STORAGE_DATABASE_PATH` becomes
/// `storage.database_path`. Only the first underscore after a known section
/// name is turned into a dot, so field names keep their underscores.
fn env_provider() -> Env {
    Env::prefixed("CONCIERGE_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        for section in ConciergeConfig::SECTIONS {
            if let Some(rest) = key_str.strip_prefix(&format!("{section}_")) {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.into()
    })
}
