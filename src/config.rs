use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Listening
    pub recognizer: String,
    pub language: String,
    pub auto_restart: bool,
    pub max_restart_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,

    // LLM (Groq)
    pub groq_enabled: bool,
    pub groq_url: String,
    pub groq_model: String,
    pub groq_api_key: String,
    pub groq_temperature: f32,
    pub groq_max_tokens: u32,

    // Knowledge graph (Neo4j)
    pub neo4j_enabled: bool,
    pub neo4j_url: String,
    pub neo4j_username: String,
    pub neo4j_password: String,

    // Meta
    pub log_level: String,
    pub history_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recognizer: "text".to_string(),
            language: "en-US".to_string(),
            auto_restart: true,
            max_restart_attempts: 5,
            base_delay_ms: 250,
            max_delay_ms: 5000,

            groq_enabled: false,
            groq_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            groq_model: "mixtral-8x7b-32768".to_string(),
            groq_api_key: "".to_string(),
            groq_temperature: 0.7,
            groq_max_tokens: 1000,

            neo4j_enabled: false,
            neo4j_url: "http://localhost:7474/db/neo4j/tx".to_string(),
            neo4j_username: "neo4j".to_string(),
            neo4j_password: "".to_string(),

            log_level: "INFO".to_string(),
            history_size: 10,
        }
    }
}

impl Config {
    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let config_path = config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            match serde_json::from_str(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    // Graceful degradation: log warning and use defaults
                    tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                    // Backup corrupt file for debugging
                    let backup_path = config_path.with_extension("json.corrupt");
                    let _ = std::fs::rename(&config_path, &backup_path);
                    Ok(Self::default())
                }
            }
        } else {
            // First run: write the defaults so users have a file to edit
            let config = Self::default();
            if let Err(e) = config.save() {
                tracing::warn!("⚠️ Could not write default config: {}", e);
            }
            Ok(config)
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voicebrain")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.recognizer, "text");
        assert!(config.auto_restart);
        assert_eq!(config.max_restart_attempts, 5);
        assert_eq!(config.base_delay_ms, 250);
        assert!(!config.groq_enabled);
        assert!(!config.neo4j_enabled);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let restored: Config = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config.recognizer, restored.recognizer);
        assert_eq!(config.max_restart_attempts, restored.max_restart_attempts);
        assert_eq!(config.groq_url, restored.groq_url);
    }

    #[test]
    fn test_save_writes_readable_file() {
        let path = std::env::temp_dir().join(format!(
            "voicebrain-config-test-{}.json",
            std::process::id()
        ));
        let mut config = Config::default();
        config.max_restart_attempts = 7;
        config.save_to(&path).expect("Failed to save config");

        let content = std::fs::read_to_string(&path).expect("Failed to read config back");
        let restored: Config = serde_json::from_str(&content).expect("Failed to parse config");
        assert_eq!(restored.max_restart_attempts, 7);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_config_corrupt_json_handling() {
        // Config::load uses graceful degradation - this tests the parsing path
        let corrupt_json = "{ not valid json";
        let result: Result<Config, _> = serde_json::from_str(corrupt_json);
        assert!(result.is_err());
    }
}
