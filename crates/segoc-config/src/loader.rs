// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order (later overrides earlier): compiled defaults,
//! `/etc/segoc/segoc.toml`, `~/.config/segoc/segoc.toml`, `./segoc.toml`,
//! then `SEGOC_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SegocConfig;

/// Top-level sections, used to map `SEGOC_<SECTION>_<KEY>` onto `section.key`.
const SECTIONS: &[&str] = &["agent", "demo", "storage", "pacing", "export", "dashboard"];

pub const SYSTEM_CONFIG_PATH: &str = "/etc/segoc/segoc.toml";
pub const LOCAL_CONFIG_PATH: &str = "segoc.toml";

/// Path of the per-user config file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("segoc").join("segoc.toml"))
}

/// Load configuration from the XDG hierarchy with env var overrides.
pub fn load_config() -> Result<SegocConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<SegocConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SegocConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SegocConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SegocConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SegocConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

fn env_provider() -> Env {
    Env::prefixed("SEGOC_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name onto a dotted key.
///
/// Only the section separator becomes a dot: `storage_database_path`
/// maps to `storage.database_path`, never `storage.database.path`.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
