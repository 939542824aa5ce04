//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables are read without a prefix, so the
//! provider keys keep their conventional names (`STRIPE_SECRET_KEY`,
//! `NOWPAYMENTS_API_KEY`, ...).
//!
//! # Example
//!
//! ```no_run
//! use payments_core::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod logging;
mod payment;

pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use payment::PaymentConfig;

/// Root configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Provider credentials and behavior
    pub payment: PaymentConfig,

    /// Tracing subscriber settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables, lowercasing their names
    /// 3. Parses numeric and boolean values
    /// 4. Deserializes each section from the same flat key space
    ///
    /// # Environment Variable Format
    ///
    /// - `STRIPE_SECRET_KEY=sk_test_...` -> `payment.stripe_secret_key`
    /// - `NOWPAYMENTS_CURRENCY_CACHE_SECS=600` -> `payment.nowpayments_currency_cache_secs`
    /// - `LOG_FORMAT=json` -> `logging.log_format`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(environment.try_parsing(true))
            .build()?;

        Ok(Self {
            payment: settings.clone().try_deserialize()?,
            logging: settings.try_deserialize()?,
        })
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.payment.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
