use crate::utils::error::{FleetError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_socket_addr,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: "./data/fleet.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_page: i64,
    pub default_limit: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api".to_string(),
        }
    }
}

impl FleetConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FleetError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FleetError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FLEET_BIND})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FleetError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::parse(&self.logging.format).unwrap_or_default()
    }

    /// Splits `store.data_file` into the storage root and the snapshot file name.
    pub fn snapshot_location(&self) -> (PathBuf, String) {
        let path = Path::new(&self.store.data_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| "fleet.json".to_string());
        (dir, file)
    }
}

impl Validate for FleetConfig {
    fn validate(&self) -> Result<()> {
        validate_socket_addr("server.bind", &self.server.bind)?;
        validate_positive_number(
            "server.request_timeout_secs",
            self.server.request_timeout_secs,
            1,
        )?;
        validate_path("store.data_file", &self.store.data_file)?;

        for (field, value) in [
            ("pagination.default_page", self.pagination.default_page),
            ("pagination.default_limit", self.pagination.default_limit),
        ] {
            if value < 1 {
                return Err(FleetError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "Value must be at least 1".to_string(),
                });
            }
        }

        validate_non_empty_string("logging.format", &self.logging.format)?;
        if LogFormat::parse(&self.logging.format).is_none() {
            return Err(FleetError::InvalidConfigValueError {
                field: "logging.format".to_string(),
                value: self.logging.format.clone(),
                reason: "Supported formats: compact, json".to_string(),
            });
        }

        validate_url("client.base_url", &self.client.base_url)
    }
}
