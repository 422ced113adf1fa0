use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub fetch_debounce_ms: u64,
    pub library_view: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    pub path: String,
    pub log_capacity: usize,
    pub max_reconnect_attempts: u32,
    pub reconnect_base_ms: u64,
    pub reconnect_max_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub settings_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub push: PushConfig,
    pub progress: ProgressConfig,
    pub storage: StorageConfig,
}

const DEFAULTS: &str = include_str!("../config/default.toml");

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        match ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        // Mirror defaults from config/default.toml
        Self {
            path: "/sse".to_string(),
            log_capacity: 100,
            max_reconnect_attempts: 5,
            reconnect_base_ms: 1000,
            reconnect_max_ms: 30_000,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ClientConfig {
    pub fn fetch_debounce(&self) -> Duration {
        Duration::from_millis(self.fetch_debounce_ms)
    }
}

impl PushConfig {
    /// Backoff before reconnect attempt `attempt` (1-based): base doubled per attempt, capped.
    pub fn reconnect_delay(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let ms = self.reconnect_base_ms.saturating_mul(1u64 << shift).min(self.reconnect_max_ms);
        Duration::from_millis(ms)
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        // Optional local file: vidnest.toml (in CWD)
        .add_source(::config::File::with_name("vidnest").required(false));

    if let Ok(custom_path) = std::env::var("VIDNEST_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("VIDNEST").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub(crate) fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    let base = cfg.server.base_url.trim();
    if base.is_empty() {
        return Err(anyhow::anyhow!("server.base_url must not be empty"));
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(anyhow::anyhow!("server.base_url must be an http(s) URL: {}", base));
    }
    if cfg.server.request_timeout_secs == 0 {
        return Err(anyhow::anyhow!("server.request_timeout_secs must be > 0"));
    }

    if !cfg.push.path.starts_with('/') {
        return Err(anyhow::anyhow!("push.path must start with '/': {}", cfg.push.path));
    }
    if cfg.push.log_capacity == 0 {
        return Err(anyhow::anyhow!("push.log_capacity must be > 0"));
    }
    if cfg.push.reconnect_base_ms > cfg.push.reconnect_max_ms {
        return Err(anyhow::anyhow!("push.reconnect_base_ms must be <= push.reconnect_max_ms"));
    }
    if cfg.push.max_reconnect_attempts > 0 && cfg.push.reconnect_base_ms == 0 {
        tracing::warn!("push.reconnect_base_ms is 0 - reconnects will not back off");
    }

    if cfg.progress.capacity == 0 {
        return Err(anyhow::anyhow!("progress.capacity must be > 0"));
    }

    if cfg.storage.settings_key.trim().is_empty() {
        return Err(anyhow::anyhow!("storage.settings_key must not be empty"));
    }

    Ok(())
}
