//! Reads the configuration file and creates a [Config] object. Manages default values and errors
use std::fs;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
/// Represents the base application settings
struct ConfigTomlApp {
    version: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
/// Represents the HTTP listener settings
struct ConfigTomlHttp {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Serialize, Deserialize, Debug)]
/// Represents the database settings
struct ConfigTomlDatabase {
    username: Option<String>,
    password: Option<String>,
    context: Option<String>,
    url: Option<String>,
    database_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
/// Represents the scan-control (brain) settings
struct ConfigTomlBrain {
    url: Option<String>,
    timeout_in_secs: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
/// Represents the task broker settings
struct ConfigTomlTasks {
    url: Option<String>,
    timeout_in_secs: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
/// Represents the file management settings
struct ConfigTomlFileManagement {
    base_save_path: Option<String>,
    file_size_limit_in_mb: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
/// Represents the full config settings
struct ConfigToml {
    application: Option<ConfigTomlApp>,
    http: Option<ConfigTomlHttp>,
    database: Option<ConfigTomlDatabase>,
    brain: Option<ConfigTomlBrain>,
    tasks: Option<ConfigTomlTasks>,
    file_management: Option<ConfigTomlFileManagement>,
}

#[derive(Debug, Clone)]
/// Represents the full configuration
pub struct Config {
    pub version: String,
    pub http_host: String,
    pub http_port: u16,
    pub db_url: String,
    pub db_username: String,
    pub db_password: String,
    pub db_context: String,
    pub db_database_name: String,
    pub brain_url: String,
    pub brain_timeout_in_secs: u64,
    pub tasks_url: String,
    pub tasks_timeout_in_secs: u64,
    pub base_save_path: String,
    pub file_size_limit_in_mb: u64,
}

/// Creates a config with [Config::new] and the default file name 'application.toml'.
pub fn get_config() -> Config {
    Config::new("application.toml")
}

/// Returns `value` or, when the field is missing, logs it and falls back to `default`.
fn field_or<T>(value: Option<T>, table: &str, field: &str, default: T) -> T {
    value.unwrap_or_else(|| {
        warn!(
            "Configuration setup: Missing field {} in table {}.",
            field, table
        );
        default
    })
}

/// Logs a missing table so every field of it falls back to its default.
fn missing_table<T>(table: Option<T>, name: &str) -> Option<T> {
    if table.is_none() {
        warn!("Configuration setup: Missing {} data.", name);
    }
    table
}

impl Config {
    /// Searches for a file in the base path of the application and tries
    /// to parse it to a valid [Config].
    ///
    /// If the file or specific values are missing or invalid, they will be replaced with default
    /// values.
    /// * `location` - Name of the file that is searched for
    pub fn new(location: &str) -> Self {
        let content = fs::read_to_string(location).unwrap_or_default();

        let config_toml: ConfigToml = toml::from_str(&content).unwrap_or_else(|_| {
            warn!(
                "Configuration setup: Failed to create ConfigToml Object out of config file '{}'. \
                Check if the file exists in the given directory and is formatted correctly!",
                location
            );
            ConfigToml::default()
        });

        let app = missing_table(config_toml.application, "application");
        let version = field_or(
            app.and_then(|app| app.version),
            "application",
            "version",
            "unknown".to_owned(),
        );

        let (host, port) = match missing_table(config_toml.http, "http") {
            Some(http) => (http.host, http.port),
            None => (None, None),
        };
        let http_host = field_or(host, "http", "host", "127.0.0.1".to_owned());
        let http_port = field_or(port, "http", "port", 8080);

        let (db_username, db_password, db_context, db_url, db_database_name) =
            match missing_table(config_toml.database, "database") {
                Some(database) => (
                    database.username,
                    database.password,
                    database.context,
                    database.url,
                    database.database_name,
                ),
                None => (None, None, None, None, None),
            };
        let unknown = || "unknown".to_owned();

        let (brain_url, brain_timeout) = match missing_table(config_toml.brain, "brain") {
            Some(brain) => (brain.url, brain.timeout_in_secs),
            None => (None, None),
        };

        let (tasks_url, tasks_timeout) = match missing_table(config_toml.tasks, "tasks") {
            Some(tasks) => (tasks.url, tasks.timeout_in_secs),
            None => (None, None),
        };

        let (base_save_path, file_size_limit_in_mb) =
            match missing_table(config_toml.file_management, "file_management") {
                Some(file_management) => (
                    file_management.base_save_path,
                    file_management.file_size_limit_in_mb,
                ),
                None => (None, None),
            };

        Config {
            version,
            http_host,
            http_port,
            db_username: field_or(db_username, "database", "username", unknown()),
            db_password: field_or(db_password, "database", "password", unknown()),
            db_context: field_or(db_context, "database", "context", unknown()),
            db_url: field_or(db_url, "database", "url", unknown()),
            db_database_name: field_or(db_database_name, "database", "database_name", unknown()),
            brain_url: field_or(brain_url, "brain", "url", "invalid_url".to_owned()),
            brain_timeout_in_secs: field_or(brain_timeout, "brain", "timeout_in_secs", 10),
            tasks_url: field_or(tasks_url, "tasks", "url", "invalid_url".to_owned()),
            tasks_timeout_in_secs: field_or(tasks_timeout, "tasks", "timeout_in_secs", 10),
            base_save_path: field_or(
                base_save_path,
                "file_management",
                "base_save_path",
                "invalid".to_owned(),
            ),
            file_size_limit_in_mb: field_or(
                file_size_limit_in_mb,
                "file_management",
                "file_size_limit_in_mb",
                100,
            ),
        }
    }

    /// Upper bound for every synchronous call to the scan-control interface.
    pub fn brain_timeout(&self) -> Duration {
        Duration::from_secs(self.brain_timeout_in_secs)
    }

    /// Upper bound for a single task broker request.
    pub fn tasks_timeout(&self) -> Duration {
        Duration::from_secs(self.tasks_timeout_in_secs)
    }

    /// Largest accepted upload, in bytes.
    pub fn file_size_limit_in_bytes(&self) -> usize {
        (self.file_size_limit_in_mb as usize).saturating_mul(1024 * 1024)
    }
}
