use std::{fs, io::ErrorKind};
use serde::Deserialize;
use thiserror::Error;

const SETTINGS_FILENAME: &str = "settings.json";
const SETTINGS_FILE_VAR: &str = "TODO_SETTINGS_FILE";

pub const DATABASE_URI_VAR: &str = "DATABASE_URI";
pub const DATABASE_NAME_VAR: &str = "DATABASE_NAME";
pub const ERROR_REPORTING_DSN_VAR: &str = "ERROR_REPORTING_DSN";
pub const TCP_SOCKET_BINDING_VAR: &str = "TCP_SOCKET_BINDING";
pub const TCP_SOCKET_PORT_VAR: &str = "TCP_SOCKET_PORT";

/// Everything the server reads at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tcp_socket_binding: String,
    pub tcp_socket_port: u16,
    pub static_dir: String,
    /// Path of the redb database file.
    pub database_uri: String,
    /// Name of the task collection inside the database.
    pub database_name: String,
    pub error_reporting_dsn: Option<String>,
}

/// The optional settings file. Anything it leaves out falls back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    tcp_socket_binding: Option<String>,
    tcp_socket_port: Option<u16>,
    static_dir: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl Settings {
    /// Reads the settings file (if any) and the process environment.
    pub fn load() -> Result<Settings, ConfigError> {
        let path = std::env::var(SETTINGS_FILE_VAR).unwrap_or_else(|_| SETTINGS_FILENAME.to_string());
        let content = match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(%path, "no settings file, using defaults");
                None
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Settings::from_sources(content.as_deref(), |name| std::env::var(name).ok())
    }

    /// Builds settings from file content and an environment lookup.
    /// Environment values win over the file.
    pub fn from_sources<F>(file: Option<&str>, env: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: SettingsFile = match file {
            Some(content) => serde_json::from_str(content)?,
            None => SettingsFile::default(),
        };
        let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let tcp_socket_port = match non_empty(TCP_SOCKET_PORT_VAR) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: TCP_SOCKET_PORT_VAR,
                value,
            })?,
            None => file.tcp_socket_port.unwrap_or(3000),
        };

        Ok(Settings {
            tcp_socket_binding: non_empty(TCP_SOCKET_BINDING_VAR)
                .or(file.tcp_socket_binding)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            tcp_socket_port,
            static_dir: file.static_dir.unwrap_or_else(|| "static".to_string()),
            database_uri: non_empty(DATABASE_URI_VAR).ok_or(ConfigError::Missing(DATABASE_URI_VAR))?,
            database_name: non_empty(DATABASE_NAME_VAR).ok_or(ConfigError::Missing(DATABASE_NAME_VAR))?,
            error_reporting_dsn: non_empty(ERROR_REPORTING_DSN_VAR),
        })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.tcp_socket_binding, self.tcp_socket_port)
    }
}
