//! Application settings storage
//!
//! Stores configuration like API keys in a JSON file in the config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// Global settings instance
static SETTINGS: RwLock<Option<Settings>> = RwLock::new(None);

/// Path to config file (set during init)
static CONFIG_PATH: RwLock<Option<PathBuf>> = RwLock::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UsageStats {
    #[serde(default)]
    pub summarization_calls: u64,
    #[serde(default)]
    pub papers_fetched: u64,
    #[serde(default)]
    pub chunks_summarized: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub hf_api_key: Option<String>,
    #[serde(default)]
    pub semantic_scholar_api_key: Option<String>,
    /// Hosted summarization model id (default: "sshleifer/distilbart-cnn-12-6")
    #[serde(default = "default_summarization_model")]
    pub summarization_model: String,
    /// Words per summarization chunk (default: 100)
    #[serde(default = "default_chunk_size")]
    pub chunk_size_words: usize,
    /// Chunk failure policy: "abort" or "degrade" (default: "abort")
    #[serde(default = "default_failure_policy")]
    pub failure_policy: String,
    /// Directory for downloaded PDFs (None = don't keep them)
    #[serde(default)]
    pub download_dir: Option<String>,
    #[serde(default)]
    pub usage_stats: UsageStats,
}

fn default_summarization_model() -> String {
    "sshleifer/distilbart-cnn-12-6".to_string()
}

fn default_chunk_size() -> usize {
    100
}

fn default_failure_policy() -> String {
    "abort".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hf_api_key: None,
            semantic_scholar_api_key: None,
            summarization_model: default_summarization_model(),
            chunk_size_words: 100,
            failure_policy: "abort".to_string(),
            download_dir: None,
            usage_stats: UsageStats::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk or create default
    fn load(path: &PathBuf) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Settings::default(),
            }
        } else {
            Settings::default()
        }
    }

    /// Save settings to disk
    fn save(&self, path: &PathBuf) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, content).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }
}

/// Initialize settings with a config directory
pub fn init(config_dir: PathBuf) {
    let config_path = config_dir.join("settings.json");
    let settings = Settings::load(&config_path);

    *CONFIG_PATH.write().unwrap() = Some(config_path);
    *SETTINGS.write().unwrap() = Some(settings);
}

/// Initialize settings in the platform config directory
pub fn init_default() {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("paperlens");
    init(dir);
}

fn read_settings<T>(f: impl FnOnce(&Settings) -> T) -> Option<T> {
    let guard = SETTINGS.read().ok()?;
    guard.as_ref().map(f)
}

fn write_and_save(f: impl FnOnce(&mut Settings)) -> Result<(), String> {
    let mut settings_guard = SETTINGS
        .write()
        .map_err(|_| "Failed to acquire settings lock")?;

    let settings = settings_guard.get_or_insert_with(Settings::default);
    f(settings);

    // Save to disk
    let config_path = CONFIG_PATH
        .read()
        .map_err(|_| "Failed to acquire config path lock")?
        .clone()
        .ok_or("Settings not initialized")?;

    settings.save(&config_path)
}

/// Get the Hugging Face API token (checks env var first, then stored setting)
pub fn get_hf_api_key() -> Option<String> {
    // Environment variable takes precedence
    if let Ok(key) = std::env::var("HF_API_TOKEN") {
        if !key.is_empty() {
            return Some(key);
        }
    }

    read_settings(|s| s.hf_api_key.clone()).flatten()
}

/// Check if a Hugging Face API token is available
pub fn has_hf_api_key() -> bool {
    get_hf_api_key().map(|k| !k.is_empty()).unwrap_or(false)
}

/// Set and save the Hugging Face API token
pub fn set_hf_api_key(key: String) -> Result<(), String> {
    write_and_save(|s| {
        s.hf_api_key = if key.is_empty() { None } else { Some(key) };
    })?;

    println!("Hugging Face API token saved to settings");
    Ok(())
}

/// Get the Semantic Scholar API key (checks env var first, then stored setting)
pub fn get_semantic_scholar_api_key() -> Option<String> {
    if let Ok(key) = std::env::var("SEMANTIC_SCHOLAR_API_KEY") {
        if !key.is_empty() {
            return Some(key);
        }
    }

    read_settings(|s| s.semantic_scholar_api_key.clone()).flatten()
}

/// Set and save the Semantic Scholar API key
pub fn set_semantic_scholar_api_key(key: String) -> Result<(), String> {
    write_and_save(|s| {
        s.semantic_scholar_api_key = if key.is_empty() { None } else { Some(key) };
    })?;

    println!("Semantic Scholar API key saved to settings");
    Ok(())
}

/// Get the configured summarization model id
pub fn get_summarization_model() -> String {
    read_settings(|s| s.summarization_model.clone())
        .unwrap_or_else(default_summarization_model)
}

/// Get the configured chunk size in words
pub fn get_chunk_size_words() -> usize {
    read_settings(|s| s.chunk_size_words).unwrap_or_else(default_chunk_size)
}

/// Get the configured failure policy string ("abort" or "degrade")
pub fn get_failure_policy() -> String {
    read_settings(|s| s.failure_policy.clone()).unwrap_or_else(default_failure_policy)
}

/// Get the directory for saving downloaded PDFs, if configured
pub fn get_download_dir() -> Option<PathBuf> {
    read_settings(|s| s.download_dir.clone())
        .flatten()
        .map(PathBuf::from)
}

/// Record a completed summarization run in the usage stats
pub fn add_usage(summarization_calls: u64, chunks_summarized: u64) -> Result<(), String> {
    write_and_save(|s| {
        s.usage_stats.summarization_calls += summarization_calls;
        s.usage_stats.chunks_summarized += chunks_summarized;
    })
}

/// Record a fetched paper in the usage stats
pub fn add_paper_fetched() -> Result<(), String> {
    write_and_save(|s| {
        s.usage_stats.papers_fetched += 1;
    })
}
