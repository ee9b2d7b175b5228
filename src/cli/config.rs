use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::FileTokenStore;

/// Persistent CLI settings stored in `cli.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    pub api_url: Option<String>,
    pub last_ping: Option<DateTime<Utc>>,
    pub last_status: Option<ServerStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
}

impl CliConfig {
    /// Stored URL if one was set, otherwise the environment's default
    pub fn resolved_api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| crate::config::config().api.base_url.clone())
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.last_status = Some(status);
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("FINPAL_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("finpal").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn token_store() -> anyhow::Result<FileTokenStore> {
    Ok(FileTokenStore::in_dir(&get_config_dir()?))
}

pub fn load_cli_config() -> anyhow::Result<CliConfig> {
    let cli_file = get_config_dir()?.join("cli.json");

    if !cli_file.exists() {
        return Ok(CliConfig::default());
    }

    let content = fs::read_to_string(cli_file)?;
    let config: CliConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_cli_config(config: &CliConfig) -> anyhow::Result<()> {
    let cli_file = get_config_dir()?.join("cli.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(cli_file, content)?;
    Ok(())
}

pub async fn ping_server(api_url: &str) -> ServerStatus {
    let client = reqwest::Client::new();
    let url = format!("{}/health", api_url.trim_end_matches('/'));

    match client.get(&url).timeout(std::time::Duration::from_secs(5)).send().await {
        Ok(response) if response.status().is_success() => ServerStatus::Up,
        _ => ServerStatus::Down,
    }
}
