//! Configuration loading.
//!
//! Sources, later ones winning:
//! 1. built-in defaults (`AppConfig::default()`, via serde defaults)
//! 2. the TOML file, when it exists
//! 3. plain deployment variables: `PORT`, `DB_HOST`, `DB_PORT`, `DB_USER`,
//!    `DB_PASSWORD`, `DB_NAME`
//! 4. `HITOS_`-prefixed variables, `__` separating sections
//!    (`HITOS_SERVER__BIND=0.0.0.0:8080`)

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use hitos_core::config::AppConfig;
use serde_json::{Map, Value, json};
use std::path::Path;

/// Prefix of structured environment overrides.
pub const ENV_PREFIX: &str = "HITOS_";

/// Load and validate the application configuration.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let config: AppConfig = figment(path)?
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;
    Ok(config)
}

/// Build the layered figment without extracting it.
pub fn figment(path: &Path) -> Result<Figment> {
    let mut figment = Figment::new();

    if path.exists() {
        tracing::info!(config_path = %path.display(), "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!(config_path = %path.display(), "No config file found");
    }

    if let Some(overrides) = plain_env_overrides(|name| std::env::var(name).ok())? {
        tracing::info!("Applying DB_*/PORT environment variables");
        figment = figment.merge(Serialized::defaults(overrides));
    }

    Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&["config"])))
}

/// Translate the plain deployment variables into config keys.
///
/// `DB_HOST` switches the store to PostgreSQL; the other `DB_*` variables
/// fill in its connection fields.
fn plain_env_overrides(var: impl Fn(&str) -> Option<String>) -> Result<Option<Value>> {
    let mut root = Map::new();

    if let Some(port) = var("PORT") {
        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("PORT must be a port number, got {port:?}"))?;
        root.insert("server".to_string(), json!({ "bind": format!("0.0.0.0:{port}") }));
    }

    if let Some(host) = var("DB_HOST") {
        let mut postgres = Map::new();
        postgres.insert("type".to_string(), json!("postgres"));
        postgres.insert("host".to_string(), json!(host));
        if let Some(port) = var("DB_PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .with_context(|| format!("DB_PORT must be a port number, got {port:?}"))?;
            postgres.insert("port".to_string(), json!(port));
        }
        for (env_name, key) in [
            ("DB_USER", "username"),
            ("DB_PASSWORD", "password"),
            ("DB_NAME", "database"),
        ] {
            if let Some(value) = var(env_name) {
                postgres.insert(key.to_string(), json!(value));
            }
        }
        root.insert("metadata".to_string(), Value::Object(postgres));
    } else if ["DB_PORT", "DB_USER", "DB_PASSWORD", "DB_NAME"]
        .iter()
        .any(|name| var(name).is_some())
    {
        bail!("DB_PORT, DB_USER, DB_PASSWORD and DB_NAME require DB_HOST");
    }

    Ok((!root.is_empty()).then_some(Value::Object(root)))
}
