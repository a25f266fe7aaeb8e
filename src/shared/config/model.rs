use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub http_addr: String,
    /// Keep connections open across requests. Off by default to avoid
    /// FD exhaustion under upload-heavy load.
    #[serde(default)]
    pub keep_alive: bool,
}

#[derive(Debug, Deserialize)]
pub struct UploadConfig {
    /// Hard ceiling on an uploaded payload, in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

fn default_max_bytes() -> u64 {
    100 * 1024 * 1024
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    /// Install and load the httpfs extension at startup. Disable for
    /// air-gapped deployments where the install step cannot reach the
    /// extension repository.
    #[serde(default)]
    pub install_httpfs: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("PARQUERY_CONFIG").unwrap_or_else(|_| "config".to_string());

    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(&config_path))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
