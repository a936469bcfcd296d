//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub storage_root: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    pub gmail_username: String,
    pub gmail_app_password: String,
    pub email_from_name: String,
    pub feedback_form_url: String,
    pub face_api_url: String,
    pub geocoding_api_url: String,
    pub geocoding_api_key: String,
    pub campus_subnet: String,
    pub campus_subnet_prefix: u8,
    pub allow_all_locations: bool,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// This method is used internally to populate the singleton. It panics
    /// if required variables are missing or improperly formatted.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "presensi".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH").expect("DATABASE_PATH is required"),
            storage_root: env::var("STORAGE_ROOT").expect("STORAGE_ROOT is required"),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()
                .unwrap(),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET is required"),
            jwt_duration_minutes: env::var("JWT_DURATION_MINUTES")
                .unwrap_or("60".into())
                .parse()
                .unwrap(),
            gmail_username: env::var("GMAIL_USERNAME").unwrap_or_default(),
            gmail_app_password: env::var("GMAIL_APP_PASSWORD").unwrap_or_default(),
            email_from_name: env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Presensi".into()),
            feedback_form_url: env::var("FEEDBACK_FORM_URL").unwrap_or_default(),
            face_api_url: env::var("FACE_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5000".into()),
            geocoding_api_url: env::var("GEOCODING_API_URL")
                .unwrap_or_else(|_| "https://api.opencagedata.com/geocode/v1/json".into()),
            geocoding_api_key: env::var("GEOCODING_API_KEY").unwrap_or_default(),
            campus_subnet: env::var("CAMPUS_SUBNET").unwrap_or_else(|_| "111.95.16.0".into()),
            campus_subnet_prefix: env::var("CAMPUS_SUBNET_PREFIX")
                .unwrap_or_else(|_| "24".into())
                .parse()
                .unwrap(),
            allow_all_locations: env::var("ALLOW_ALL_LOCATIONS").unwrap_or_else(|_| "false".into())
                == "true",
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap();
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    /// Override `env` value.
    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_storage_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.storage_root = value.into());
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_jwt_duration_minutes(value: impl Into<u64>) {
        AppConfig::set_field(|cfg| cfg.jwt_duration_minutes = value.into());
    }

    pub fn set_face_api_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.face_api_url = value.into());
    }

    pub fn set_geocoding_api_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.geocoding_api_url = value.into());
    }

    pub fn set_campus_subnet(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.campus_subnet = value.into());
    }

    pub fn set_campus_subnet_prefix(value: u8) {
        AppConfig::set_field(|cfg| cfg.campus_subnet_prefix = value);
    }

    pub fn set_allow_all_locations(value: bool) {
        AppConfig::set_field(|cfg| cfg.allow_all_locations = value);
    }
}

// --- Free-function accessors, for `config::foo()` call sites ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn storage_root() -> String {
    AppConfig::global().storage_root.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn jwt_secret() -> String {
    AppConfig::global().jwt_secret.clone()
}

pub fn jwt_duration_minutes() -> u64 {
    AppConfig::global().jwt_duration_minutes
}

pub fn gmail_username() -> String {
    AppConfig::global().gmail_username.clone()
}

pub fn gmail_app_password() -> String {
    AppConfig::global().gmail_app_password.clone()
}

pub fn email_from_name() -> String {
    AppConfig::global().email_from_name.clone()
}

pub fn feedback_form_url() -> String {
    AppConfig::global().feedback_form_url.clone()
}

pub fn face_api_url() -> String {
    AppConfig::global().face_api_url.clone()
}

pub fn geocoding_api_url() -> String {
    AppConfig::global().geocoding_api_url.clone()
}

pub fn geocoding_api_key() -> String {
    AppConfig::global().geocoding_api_key.clone()
}

pub fn campus_subnet() -> String {
    AppConfig::global().campus_subnet.clone()
}

pub fn campus_subnet_prefix() -> u8 {
    AppConfig::global().campus_subnet_prefix
}

pub fn allow_all_locations() -> bool {
    AppConfig::global().allow_all_locations
}
