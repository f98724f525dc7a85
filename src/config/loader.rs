//! Layered configuration
//!
//! Sources, highest precedence first:
//! 1. Conventional variables set by container platforms (`PORT`, `DATABASE_URL`, ...)
//! 2. `GRID__SECTION__KEY` variables
//! 3. One TOML file
//! 4. Serde defaults on [`AppConfig`]

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use std::path::PathBuf;

/// Searched in order when no file is given; the first hit is used
const SEARCH_PATHS: &[&str] = &[
    "grid.toml",
    ".grid.toml",
    "~/.config/grid/config.toml",
    "/etc/grid/config.toml",
];

/// Conventional variables and the keys they override.
/// Earlier entries win when two map to the same key.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("DATABASE_URL", "database.url"),
    ("JWT_SECRET", "auth.jwt_secret"),
    ("APP_ENV", "app.env"),
    ("NODE_ENV", "app.env"),
    ("APP_VERSION", "app.version"),
];

const DATABASE_SCHEMES: &[&str] = &["postgres://", "postgresql://", "sqlite:"];

/// Parse a TOML document on its own, without env layering or the secret
/// check. Used by tests.
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder().add_source(File::from_str(toml_str, FileFormat::Toml));
    let app_config = build(builder)?;
    check_values(&app_config)?;
    Ok(app_config)
}

/// Load the service configuration.
///
/// `config_path` must exist when given; otherwise the search paths are
/// tried and a missing file is fine.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(file) = config_file(config_path)? {
        builder = builder.add_source(File::new(&file.to_string_lossy(), FileFormat::Toml));
    }

    // GRID__SERVER__PORT -> server.port
    builder = builder.add_source(
        Environment::with_prefix("GRID")
            .separator("__")
            .try_parsing(true),
    );
    builder = apply_env_overrides(builder)?;

    let app_config = build(builder)?;
    validate_config(&app_config)?;
    Ok(app_config)
}

fn config_file(explicit: Option<&str>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);
        return if path.is_file() {
            Ok(Some(path))
        } else {
            Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path.display()
            )))
        };
    }

    Ok(SEARCH_PATHS
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.is_file()))
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    builder
        .build()
        .and_then(Config::try_deserialize)
        .map_err(|e| ConfigError::Load(e.to_string()))
}

fn apply_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut applied: Vec<&str> = Vec::new();

    for &(var, key) in ENV_OVERRIDES {
        if applied.contains(&key) {
            continue;
        }
        if let Ok(value) = std::env::var(var)
            && !value.is_empty()
        {
            builder = builder
                .set_override(key, value)
                .map_err(|e| ConfigError::Load(e.to_string()))?;
            applied.push(key);
        }
    }

    Ok(builder)
}

/// Value checks that hold with or without a signing secret
fn check_values(config: &AppConfig) -> Result<(), ConfigError> {
    let url = &config.database.url;
    if url.is_empty() {
        return Err(ConfigError::Missing {
            field: "database.url".to_string(),
        });
    }
    if !DATABASE_SCHEMES.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::Invalid {
            message: format!(
                "database.url must start with one of {}, got: {url}",
                DATABASE_SCHEMES.join(", ")
            ),
        });
    }

    let invalid = |message: &str| {
        Err(ConfigError::Invalid {
            message: message.to_string(),
        })
    };
    if config.server.port == 0 {
        return invalid("server.port must be greater than 0");
    }
    if config.auth.token_ttl_secs == 0 {
        return invalid("auth.token_ttl_secs must be greater than 0");
    }

    Ok(())
}

/// Full validation for a runnable service
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    check_values(config)?;

    match &config.auth.jwt_secret {
        Some(secret) if !secret.is_blank() => Ok(()),
        _ => Err(ConfigError::Missing {
            field: "auth.jwt_secret (set JWT_SECRET environment variable)".to_string(),
        }),
    }
}
