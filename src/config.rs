use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
pub const DEFAULT_PACE_WARNING_THRESHOLD: f64 = 0.8;
pub const DEFAULT_PACE_CRITICAL_THRESHOLD: f64 = 0.5;
const DEFAULT_INVOICE_CRITICAL_OVERDUE_DAYS: i64 = 30;
const DEFAULT_STALLED_DELIVERY_DAYS: i64 = 7;
const DEFAULT_DASHBOARD_CACHE_TTL_SECS: u64 = 30;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;
const DEFAULT_WEBHOOK_MAX_RETRIES: u32 = 3;

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Per-request timeout applied to the HTTP stack (seconds)
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default = "default_false_bool")]
    pub cors_allow_any_origin: bool,

    /// CORS: allow credentials
    #[serde(default)]
    pub cors_allow_credentials: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Static API key gating mutating endpoints. Unset leaves the write
    /// surface open (development / trusted-network deployments).
    #[serde(default)]
    #[validate(length(min = 16, message = "API key must be at least 16 characters"))]
    pub api_key: Option<String>,

    /// Webhook endpoint for outbound alert/lifecycle notifications
    #[serde(default)]
    #[validate(url(message = "Webhook URL must be a valid URL"))]
    pub webhook_url: Option<String>,

    /// Secret for signing outbound webhook payloads
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Timeout for webhook delivery attempts (seconds)
    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,

    /// Maximum webhook delivery attempts
    #[serde(default = "default_webhook_max_retries")]
    pub webhook_max_retries: u32,

    /// Pace ratio below which a campaign is behind (warning)
    #[serde(default = "default_pace_warning_threshold")]
    #[validate(custom = "validate_threshold")]
    pub pace_warning_threshold: f64,

    /// Pace ratio below which a campaign is critical
    #[serde(default = "default_pace_critical_threshold")]
    #[validate(custom = "validate_threshold")]
    pub pace_critical_threshold: f64,

    /// Days past due before an overdue invoice escalates to critical
    #[serde(default = "default_invoice_critical_overdue_days")]
    pub invoice_critical_overdue_days: i64,

    /// Days without recorded delivery before an active campaign counts as stalled
    #[serde(default = "default_stalled_delivery_days")]
    pub stalled_delivery_days: i64,

    /// Dashboard snapshot cache TTL in seconds (0 disables caching)
    #[serde(default = "default_dashboard_cache_ttl_secs")]
    pub dashboard_cache_ttl_secs: u64,

    /// Event channel capacity for async event processing
    #[serde(default = "default_event_channel_capacity")]
    #[validate(custom = "validate_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Default page size for paginated API responses
    #[serde(default = "default_api_page_size")]
    pub api_default_page_size: u32,

    /// Maximum page size allowed for paginated API responses
    #[serde(default = "default_api_max_page_size")]
    pub api_max_page_size: u32,

    /// Default currency code for invoices
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Serve Swagger UI at /docs
    #[serde(default = "default_true_bool")]
    pub enable_swagger_ui: bool,
}

impl AppConfig {
    /// Gets database URL reference
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Creates a new configuration with defaults for everything optional
    pub fn new(
        database_url: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            host: host.into(),
            port,
            environment: environment.into(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            request_timeout_secs: default_request_timeout_secs(),
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            cors_allow_credentials: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            api_key: None,
            webhook_url: None,
            webhook_secret: None,
            webhook_timeout_secs: default_webhook_timeout_secs(),
            webhook_max_retries: default_webhook_max_retries(),
            pace_warning_threshold: default_pace_warning_threshold(),
            pace_critical_threshold: default_pace_critical_threshold(),
            invoice_critical_overdue_days: default_invoice_critical_overdue_days(),
            stalled_delivery_days: default_stalled_delivery_days(),
            dashboard_cache_ttl_secs: default_dashboard_cache_ttl_secs(),
            event_channel_capacity: default_event_channel_capacity(),
            api_default_page_size: default_api_page_size(),
            api_max_page_size: default_api_max_page_size(),
            default_currency: default_currency(),
            enable_swagger_ui: default_true_bool(),
        }
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Returns true if explicit CORS origins are configured
    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_ref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Dashboard cache TTL; `None` when caching is disabled
    pub fn dashboard_cache_ttl(&self) -> Option<std::time::Duration> {
        if self.dashboard_cache_ttl_secs == 0 {
            None
        } else {
            Some(std::time::Duration::from_secs(
                self.dashboard_cache_ttl_secs,
            ))
        }
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                "Set APP__CORS_ALLOWED_ORIGINS for non-development environments or explicitly opt-in via APP__CORS_ALLOW_ANY_ORIGIN=true".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if self.pace_critical_threshold >= self.pace_warning_threshold {
            let mut err = ValidationError::new("pace_thresholds");
            err.message =
                Some("pace_critical_threshold must be below pace_warning_threshold".into());
            errors.add("pace_critical_threshold", err);
        }

        if self.webhook_url.is_some() {
            let secret_ok = self
                .webhook_secret
                .as_ref()
                .map(|s| s.trim().len() >= 16)
                .unwrap_or(false);
            if !secret_ok {
                let mut err = ValidationError::new("webhook_secret_required");
                err.message = Some(
                    "APP__WEBHOOK_SECRET (at least 16 characters) is required when a webhook URL is configured".into(),
                );
                errors.add("webhook_secret", err);
            }
            // validator's url check already ran; parse again for scheme sanity
            if let Some(raw) = &self.webhook_url {
                match url::Url::parse(raw) {
                    Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
                    _ => {
                        let mut err = ValidationError::new("webhook_url_scheme");
                        err.message = Some("Webhook URL must use http or https".into());
                        errors.add("webhook_url", err);
                    }
                }
            }
        }

        if self.invoice_critical_overdue_days < 1 {
            let mut err = ValidationError::new("invoice_critical_overdue_days");
            err.message = Some("invoice_critical_overdue_days must be at least 1".into());
            errors.add("invoice_critical_overdue_days", err);
        }

        if self.stalled_delivery_days < 1 {
            let mut err = ValidationError::new("stalled_delivery_days");
            err.message = Some("stalled_delivery_days must be at least 1".into());
            errors.add("stalled_delivery_days", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
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
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_db_max_connections() -> u32 {
    16
}
fn default_db_min_connections() -> u32 {
    2
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_false_bool() -> bool {
    false
}
fn default_true_bool() -> bool {
    true
}

fn default_webhook_timeout_secs() -> u64 {
    DEFAULT_WEBHOOK_TIMEOUT_SECS
}

fn default_webhook_max_retries() -> u32 {
    DEFAULT_WEBHOOK_MAX_RETRIES
}

fn default_pace_warning_threshold() -> f64 {
    DEFAULT_PACE_WARNING_THRESHOLD
}

fn default_pace_critical_threshold() -> f64 {
    DEFAULT_PACE_CRITICAL_THRESHOLD
}

fn default_invoice_critical_overdue_days() -> i64 {
    DEFAULT_INVOICE_CRITICAL_OVERDUE_DAYS
}

fn default_stalled_delivery_days() -> i64 {
    DEFAULT_STALLED_DELIVERY_DAYS
}

fn default_dashboard_cache_ttl_secs() -> u64 {
    DEFAULT_DASHBOARD_CACHE_TTL_SECS
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_api_page_size() -> u32 {
    20
}

fn default_api_max_page_size() -> u32 {
    100
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_threshold(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        let mut err = ValidationError::new("pace_threshold");
        err.message = Some("Pace thresholds must be finite values in (0.0, 1.0]".into());
        return Err(err);
    }
    Ok(())
}

fn validate_event_channel_capacity(capacity: usize) -> Result<(), ValidationError> {
    if capacity == 0 {
        let mut err = ValidationError::new("event_channel_capacity");
        err.message = Some("event_channel_capacity must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("influence_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Docker config (config/docker.toml) if DOCKER env var is set
/// 4. Environment variables (APP_*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let mut builder = Config::builder()
        .set_default("database_url", "sqlite://influence.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false));

    if env::var("DOCKER").is_ok() {
        info!("Docker environment detected");
        builder =
            builder.add_source(File::with_name(&format!("{}/docker", CONFIG_DIR)).required(false));
    }

    let config = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration security validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
