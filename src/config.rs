use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::format::Formatter;
use crate::store::BusinessRules;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_STORAGE_BACKEND: &str = "file";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_CURRENCY_SYMBOL: &str = "฿";
const DEFAULT_MIN_DEPOSIT: u32 = 100;
const DEFAULT_LOAN_MULTIPLIER: u32 = 5;
const DEFAULT_MAX_LOAN_INSTALLMENTS: u32 = 60;

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Storage backend: "file" (one JSON document per key) or "memory"
    #[serde(default = "default_storage_backend")]
    #[validate(custom = "validate_storage_backend")]
    pub storage_backend: String,

    /// Directory holding persisted collections for the file backend
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Per-value byte quota, emulating browser storage limits
    #[serde(default)]
    pub storage_quota_bytes: Option<usize>,

    /// Currency symbol used by the formatter
    #[serde(default = "default_currency_symbol")]
    #[validate(length(min = 1, max = 8))]
    pub currency_symbol: String,

    /// Render years in the Buddhist era (Gregorian + 543)
    #[serde(default = "default_true_bool")]
    pub buddhist_era: bool,

    /// Smallest deposit accepted by the welfare fund
    #[serde(default = "default_min_deposit")]
    pub min_deposit: Decimal,

    /// Loan ceiling as a multiple of the member's savings balance
    #[serde(default = "default_loan_multiplier")]
    pub loan_multiplier: Decimal,

    /// Maximum number of monthly installments for a loan
    #[serde(default = "default_max_loan_installments")]
    #[validate(range(min = 1, max = 360))]
    pub max_loan_installments: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            storage_backend: default_storage_backend(),
            data_dir: default_data_dir(),
            storage_quota_bytes: None,
            currency_symbol: default_currency_symbol(),
            buddhist_era: true,
            min_deposit: default_min_deposit(),
            loan_multiplier: default_loan_multiplier(),
            max_loan_installments: DEFAULT_MAX_LOAN_INSTALLMENTS,
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn uses_memory_storage(&self) -> bool {
        self.storage_backend == "memory"
    }

    pub fn business_rules(&self) -> BusinessRules {
        BusinessRules {
            min_deposit: self.min_deposit,
            loan_multiplier: self.loan_multiplier,
            max_loan_installments: self.max_loan_installments,
        }
    }

    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.currency_symbol.clone(), self.buddhist_era)
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.min_deposit.is_sign_negative() {
            let mut err = ValidationError::new("min_deposit_negative");
            err.message = Some("min_deposit must not be negative".into());
            errors.add("min_deposit", err);
        }

        if self.loan_multiplier <= Decimal::ZERO {
            let mut err = ValidationError::new("loan_multiplier_not_positive");
            err.message = Some("loan_multiplier must be greater than zero".into());
            errors.add("loan_multiplier", err);
        }

        if self.storage_quota_bytes == Some(0) {
            let mut err = ValidationError::new("storage_quota_zero");
            err.message = Some("storage_quota_bytes must be omitted or positive".into());
            errors.add("storage_quota_bytes", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default value functions
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_storage_backend() -> String {
    DEFAULT_STORAGE_BACKEND.to_string()
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

fn default_true_bool() -> bool {
    true
}

fn default_min_deposit() -> Decimal {
    Decimal::from(DEFAULT_MIN_DEPOSIT)
}

fn default_loan_multiplier() -> Decimal {
    Decimal::from(DEFAULT_LOAN_MULTIPLIER)
}

fn default_max_loan_installments() -> u32 {
    DEFAULT_MAX_LOAN_INSTALLMENTS
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => {
            let mut err = ValidationError::new("invalid_log_level");
            err.message = Some("log_level must be one of trace, debug, info, warn, error".into());
            Err(err)
        }
    }
}

fn validate_storage_backend(value: &str) -> Result<(), ValidationError> {
    match value {
        "file" | "memory" => Ok(()),
        _ => {
            let mut err = ValidationError::new("invalid_storage_backend");
            err.message = Some("storage_backend must be 'file' or 'memory'".into());
            Err(err)
        }
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over `level`
/// when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("backoffice_engine={},backoffice_cli={}", level, level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_writer(std::io::stderr)
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Loads configuration in layers:
/// 1. Built-in defaults
/// 2. Default config file (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    load_config_from(Path::new(CONFIG_DIR), &run_env)
}

/// Same as [`load_config`] with an explicit config directory and profile.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, AppConfigError> {
    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let default_file = config_dir.join("default");
    let env_file = config_dir.join(run_env);
    let default_file = default_file.to_string_lossy();
    let env_file = env_file.to_string_lossy();

    let config = Config::builder()
        .set_default("environment", run_env)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("storage_backend", DEFAULT_STORAGE_BACKEND)?
        .set_default("data_dir", DEFAULT_DATA_DIR)?
        .add_source(File::with_name(&default_file).required(false))
        .add_source(File::with_name(&env_file).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration constraint validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
