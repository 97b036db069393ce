// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Every rule runs; all failures are returned together.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{SegocConfig, StorageBackend};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &SegocConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` must be one of: {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.demo.worker_name_prefix.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "demo.worker_name_prefix must not be empty".to_string(),
        });
    }

    let menus = [
        ("demo.sites", &config.demo.sites),
        ("demo.sectors", &config.demo.sectors),
        ("demo.activities", &config.demo.activities),
        ("demo.progress", &config.demo.progress),
        ("demo.expenses", &config.demo.expenses),
    ];
    for (key, options) in menus {
        validate_menu(key, options, &mut errors);
    }

    if config.storage.backend == StorageBackend::Sqlite
        && config.storage.database_path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty for the sqlite backend"
                .to_string(),
        });
    }

    if config.pacing.receipt_tick_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "pacing.receipt_tick_ms must be greater than 0".to_string(),
        });
    }

    if config.export.file_prefix.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "export.file_prefix must not be empty".to_string(),
        });
    }

    if config.dashboard.notification_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "dashboard.notification_limit must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A menu needs at least one non-blank, unique label.
fn validate_menu(key: &str, options: &[String], errors: &mut Vec<ConfigError>) {
    if options.is_empty() {
        errors.push(ConfigError::Validation {
            message: format!("{key} must list at least one option"),
        });
        return;
    }

    let mut seen = HashSet::new();
    for (i, option) in options.iter().enumerate() {
        if option.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{key}[{i}] must not be empty"),
            });
        } else if !seen.insert(option.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate option `{option}` in {key}"),
            });
        }
    }
}
