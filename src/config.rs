//! Application configuration loaded from a YAML file.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! http:
//!   default_content_type: application/json
//!   charset: utf-8
//! log:
//!   name: trellis
//!   level: info
//! ```
//!
//! Every section and field is optional; missing values fall back to the
//! defaults above.

use serde::Deserialize;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Content type assumed for request bodies without a `Content-Type`
    /// header, and written for JSON responses.
    pub default_content_type: String,
    pub charset: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            default_content_type: "application/json".to_string(),
            charset: "utf-8".to_string(),
        }
    }
}

impl HttpConfig {
    /// The full response `Content-Type` value, charset included.
    #[must_use]
    pub fn response_content_type(&self) -> String {
        format!("{}; charset={}", self.default_content_type, self.charset)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub name: String,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            name: "trellis".to_string(),
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults when the file is absent
    /// or invalid.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "config not loaded, using defaults"
                );
                Self::default()
            }
        }
    }
}

/// Initialize the global tracing subscriber from the log configuration.
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(log: &LogConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log.level.clone()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(
            config.http.response_content_type(),
            "application/json; charset=utf-8"
        );
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "server:\n  port: 9090").expect("write");
        let config = AppConfig::load(file.path()).expect("load");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.http.default_content_type, "application/json");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = AppConfig::load_or_default("/does/not/exist.yaml");
        assert_eq!(config.server.port, 8080);
    }
}
