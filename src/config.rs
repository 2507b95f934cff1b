use serde::Deserialize;

/// Status pages polled when the config file has no `[sources]` table.
pub const DEFAULT_STATUS_PAGES: &[&str] = &[
    "https://confluence.status.atlassian.com/",
    "https://jira-software.status.atlassian.com/",
    "https://status.circleci.com/",
    "https://status.duo.com/",
    "https://status.fury.co/",
    "https://status.npmjs.org/",
    "https://status.python.org/",
    "https://status.splashtop.com/",
    "https://www.githubstatus.com/",
    "https://lucidsoftware.statuspage.io/",
    "https://status.hashicorp.com/",
    "https://status.figma.com/",
    "https://status.openai.com/",
];

const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub publishing: PublishingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".into(),
        }
    }
}

/// How a completed cycle is applied to the previous snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Drop everything and keep only this cycle's successful responses.
    #[default]
    Replace,
    /// Upsert this cycle's responses; failed sources keep their last known value.
    Merge,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub mode: RefreshMode,
    /// Per-request timeout; no timeout when omitted.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_interval_secs() -> u64 {
    15 * 60
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            mode: RefreshMode::default(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Base URLs; `/api/v2/status.json` is appended to each.
    #[serde(default = "default_status_pages")]
    pub status_pages: Vec<String>,
}

fn default_status_pages() -> Vec<String> {
    DEFAULT_STATUS_PAGES.iter().map(|s| s.to_string()).collect()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            status_pages: default_status_pages(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of snapshots kept in the broadcast channel for /ws/statuses (slow clients may lag).
    pub broadcast_capacity: usize,
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
        }
    }
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`). A missing default file falls back to built-in defaults;
    /// a missing file named explicitly through `CONFIG_FILE` is an error.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => {
                let s = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("reading {}: {}", path, e))?;
                Self::load_from_str(&s)
            }
            Err(_) => match std::fs::read_to_string(DEFAULT_CONFIG_FILE) {
                Ok(s) => Self::load_from_str(&s),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::info!("{} not found, using defaults", DEFAULT_CONFIG_FILE);
                    let config = Self::default();
                    config.validate()?;
                    Ok(config)
                }
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.refresh.interval_secs > 0,
            "refresh.interval_secs must be > 0, got {}",
            self.refresh.interval_secs
        );
        if let Some(t) = self.refresh.request_timeout_secs {
            anyhow::ensure!(t > 0, "refresh.request_timeout_secs must be > 0, got {}", t);
        }
        anyhow::ensure!(
            !self.sources.status_pages.is_empty(),
            "sources.status_pages must be non-empty"
        );
        for url in &self.sources.status_pages {
            anyhow::ensure!(
                url.starts_with("http://") || url.starts_with("https://"),
                "sources.status_pages entries must be http(s) URLs, got {:?}",
                url
            );
        }
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        Ok(())
    }
}
