//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PRODUCTDESK_PRODUCTS_USE_FAKE`: Use the in-memory catalog (true/false)
//! - `PRODUCTDESK_PRODUCTS_BASE_ADDRESS`: Products API base address
//! - `PRODUCTDESK_PRODUCTS_TIMEOUT`: Per-request timeout in seconds
//! - `PRODUCTDESK_PRODUCTS_NO_PROXY`: Bypass the system proxy (true/false)
//! - `PRODUCTDESK_AUTH_DOMAIN`: Identity-provider domain
//! - `PRODUCTDESK_AUTH_CLIENT_ID`: Client id
//! - `PRODUCTDESK_AUTH_CLIENT_SECRET`: Client secret
//! - `PRODUCTDESK_AUTH_AUDIENCE`: API audience
//! - `PRODUCTDESK_AUTH_TOKEN_URL`: Token endpoint override
//!
//! When `PRODUCTDESK_PRODUCTS_USE_FAKE` is truthy, none of the others are
//! required.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./productdesk.json` or `./productdesk.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use productdesk_domain::{
    AuthConfig, Config, ProductDeskError, ProductsConfig, ResilienceConfig, Result,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file. The
/// result is validated either way.
///
/// # Errors
/// Returns `ProductDeskError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load from an explicit file when given, otherwise use [`load`].
///
/// # Errors
/// Same as [`load`] and [`load_from_file`].
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            let config = load_from_file(Some(path))?;
            config.validate()?;
            Ok(config)
        }
        None => load(),
    }
}

/// Load configuration from environment variables
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `ProductDeskError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let use_fake = env_bool("PRODUCTDESK_PRODUCTS_USE_FAKE", false);
    let no_proxy = env_bool("PRODUCTDESK_PRODUCTS_NO_PROXY", false);

    let timeout_seconds = match std::env::var("PRODUCTDESK_PRODUCTS_TIMEOUT").ok() {
        Some(raw) => raw.parse::<u64>().map_err(|e| {
            ProductDeskError::Config(format!("Invalid products timeout: {}", e))
        })?,
        None => ProductsConfig::default().timeout_seconds,
    };

    if use_fake {
        return Ok(Config {
            products: ProductsConfig {
                base_address: std::env::var("PRODUCTDESK_PRODUCTS_BASE_ADDRESS")
                    .unwrap_or_default(),
                use_fake,
                timeout_seconds,
                no_proxy,
            },
            ..Config::default()
        });
    }

    Ok(Config {
        auth: AuthConfig {
            domain: env_var("PRODUCTDESK_AUTH_DOMAIN")?,
            client_id: env_var("PRODUCTDESK_AUTH_CLIENT_ID")?,
            client_secret: env_var("PRODUCTDESK_AUTH_CLIENT_SECRET")?,
            audience: env_var("PRODUCTDESK_AUTH_AUDIENCE")?,
            token_url: std::env::var("PRODUCTDESK_AUTH_TOKEN_URL").ok(),
        },
        products: ProductsConfig {
            base_address: env_var("PRODUCTDESK_PRODUCTS_BASE_ADDRESS")?,
            use_fake,
            timeout_seconds,
            no_proxy,
        },
        resilience: ResilienceConfig::default(),
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `ProductDeskError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ProductDeskError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ProductDeskError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ProductDeskError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `ProductDeskError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ProductDeskError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ProductDeskError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ProductDeskError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./productdesk.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("productdesk.json"),
        dir.join("productdesk.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `ProductDeskError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        ProductDeskError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
