//! Configuration types for media-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};

/// External tool configuration (yt-dlp binary and pass-through options)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub yt_dlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Cookies file passed to yt-dlp via `--cookies` (managed outside this crate)
    #[serde(default)]
    pub cookies_file: Option<PathBuf>,

    /// Extra arguments appended to every download invocation
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: None,
            search_path: true,
            cookies_file: None,
            extra_args: Vec::new(),
        }
    }
}

/// Batch queue behavior (temp storage, filenames, expiry)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Directory for per-invocation temporary files (default: `<os temp>/media-dl`)
    ///
    /// Owned by one queue: leftover `media-dl-*` files are removed at startup.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Maximum length in characters of a derived display filename stem (default: 200)
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    /// Idle expiry for tasks in seconds. None keeps tasks until they are deleted (default).
    #[serde(default, with = "optional_duration_serde")]
    pub task_ttl: Option<Duration>,

    /// How often the reaper sweeps for idle tasks when `task_ttl` is set (default: 60 seconds)
    #[serde(default = "default_reaper_interval", with = "duration_serde")]
    pub reaper_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            max_title_length: default_max_title_length(),
            task_ttl: None,
            reaper_interval: default_reaper_interval(),
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6789)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for [`MediaQueue`](crate::MediaQueue)
///
/// Every field has a default, so an empty TOML file is a valid configuration:
///
/// ```toml
/// [tools]
/// yt_dlp_path = "/usr/local/bin/yt-dlp"
///
/// [queue]
/// temp_dir = "/var/tmp/media-dl"
/// task_ttl = 3600
///
/// [server.api]
/// bind_address = "0.0.0.0:6789"
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// External tool paths and options
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Queue storage and expiry
    #[serde(default)]
    pub queue: QueueConfig,

    /// API and external server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the queue cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.queue.max_title_length == 0 {
            return Err(Error::Config {
                message: "max_title_length must be greater than zero".into(),
                key: Some("queue.max_title_length".into()),
            });
        }
        if self
            .queue
            .task_ttl
            .is_some_and(|ttl| ttl > MAX_TASK_TTL)
        {
            return Err(Error::Config {
                message: format!(
                    "task_ttl must not exceed {} seconds",
                    MAX_TASK_TTL.as_secs()
                ),
                key: Some("queue.task_ttl".into()),
            });
        }
        if self.queue.reaper_interval.is_zero() {
            return Err(Error::Config {
                message: "reaper_interval must be greater than zero".into(),
                key: Some("queue.reaper_interval".into()),
            });
        }
        Ok(())
    }

    /// Temporary directory
    pub fn temp_dir(&self) -> &PathBuf {
        &self.queue.temp_dir
    }
}

/// Longest accepted idle expiry (one year)
const MAX_TASK_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// Default value functions
fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("media-dl")
}

fn default_max_title_length() -> usize {
    200
}

fn default_reaper_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6789))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
