use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::links::LinkCategory;
use crate::recency::{CustomWindow, RecencyMode};

/// Configuration for yt-prospector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API settings
    pub youtube: YouTubeConfig,

    /// Search and extraction settings
    pub search: SearchConfig,

    /// Local CSV output settings
    pub export: ExportConfig,

    /// Google Sheets settings (disabled unless configured)
    pub sheets: SheetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Data API v3 key
    pub api_key: String,

    /// Data API base URL
    pub api_base: String,

    /// Request timeout in seconds (search and description fetches)
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search terms, each processed as an independent query
    pub queries: Vec<String>,

    /// Link categories to collect: email | social | other | all
    pub categories: Vec<String>,

    /// Maximum results requested per query
    pub max_results: u32,

    /// Recency window for the publishedAfter filter
    pub published: RecencyMode,

    /// Custom look-back window, required when published = custom
    pub published_custom: Option<CustomWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Root directory for per-query run directories
    pub output_dir: PathBuf,

    /// Write videos.csv / links.csv per query
    pub write_csv: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Sheets values-API base URL
    pub api_base: String,

    /// Target spreadsheet id (empty = sheet export disabled)
    pub spreadsheet_id: String,

    /// Worksheet holding the links table
    pub worksheet: String,

    /// OAuth bearer token for the values API
    pub access_token: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Valid values on the category configuration surface
const CATEGORY_NAMES: [&str; 4] = ["email", "social", "other", "all"];

/// Bound from the original configuration surface
const MAX_RESULTS_LIMIT: u32 = 500;

impl SearchConfig {
    /// The concrete wanted-category set, with "all" expanded.
    ///
    /// Call after `validate()`; unknown names are rejected there.
    pub fn wanted(&self) -> BTreeSet<LinkCategory> {
        let mut wanted = BTreeSet::new();
        for name in &self.categories {
            if name == "all" {
                wanted.extend(LinkCategory::ALL);
            } else if let Some(category) = LinkCategory::parse(name) {
                wanted.insert(category);
            }
        }
        wanted
    }
}

impl SheetsConfig {
    /// Sheet export runs only when a target and a token are configured
    pub fn enabled(&self) -> bool {
        !self.spreadsheet_id.is_empty() && !self.access_token.is_empty()
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        // Try to load from various locations
        let config_paths = [
            "yt-prospector.toml",
            "config/yt-prospector.toml",
            "~/.config/yt-prospector/config.toml",
            "/etc/yt-prospector/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Load configuration from an explicit file path
    pub fn load_from(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config file {}: {}", path, e))?;
        let config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        tracing::info!("📄 Loaded configuration from: {}", path);
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var("YT_PROSPECTOR_API_KEY") {
            self.youtube.api_key = api_key;
        }

        if let Ok(output_dir) = std::env::var("YT_PROSPECTOR_OUTPUT_DIR") {
            self.export.output_dir = PathBuf::from(output_dir);
        }

        if let Ok(max_results) = std::env::var("YT_PROSPECTOR_MAX_RESULTS") {
            if let Ok(parsed) = max_results.parse() {
                self.search.max_results = parsed;
            }
        }

        if let Ok(spreadsheet_id) = std::env::var("YT_PROSPECTOR_SPREADSHEET_ID") {
            self.sheets.spreadsheet_id = spreadsheet_id;
        }

        if let Ok(token) = std::env::var("YT_PROSPECTOR_SHEETS_TOKEN") {
            self.sheets.access_token = token;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration at the boundary, before any external call
    pub fn validate(&self) -> Result<()> {
        if self.youtube.api_key.is_empty() {
            return Err(anyhow!(
                "YouTube API key is required (youtube.api_key or YT_PROSPECTOR_API_KEY)"
            ));
        }

        if self.search.queries.is_empty()
            || self.search.queries.iter().all(|q| q.trim().is_empty())
        {
            return Err(anyhow!("At least one search query is required"));
        }

        if self.search.categories.is_empty() {
            return Err(anyhow!("At least one link category is required"));
        }

        for name in &self.search.categories {
            if !CATEGORY_NAMES.contains(&name.as_str()) {
                return Err(anyhow!(
                    "Unknown link category '{}' (expected one of: {})",
                    name,
                    CATEGORY_NAMES.join(", ")
                ));
            }
        }

        if self.search.max_results == 0 || self.search.max_results > MAX_RESULTS_LIMIT {
            return Err(anyhow!(
                "max_results must be between 1 and {}",
                MAX_RESULTS_LIMIT
            ));
        }

        if self.search.published == RecencyMode::Custom
            && self.search.published_custom.is_none()
        {
            return Err(anyhow!(
                "published = 'custom' requires a (weeks, days, hours) window"
            ));
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "yt-prospector configuration:\n\
            - Queries: {}\n\
            - Categories: {}\n\
            - Max results per query: {}\n\
            - Published window: {}\n\
            - Output directory: {}\n\
            - CSV export: {}\n\
            - Sheet export: {}",
            self.search.queries.join(" | "),
            self.search.categories.join(", "),
            self.search.max_results,
            self.search.published,
            self.export.output_dir.display(),
            self.export.write_csv,
            if self.sheets.enabled() {
                self.sheets.worksheet.as_str()
            } else {
                "disabled"
            }
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            youtube: YouTubeConfig::default(),
            search: SearchConfig::default(),
            export: ExportConfig::default(),
            sheets: SheetsConfig::default(),
        }
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            categories: vec!["email".to_string()],
            max_results: 25,
            published: RecencyMode::LastWeek,
            published_custom: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("out"),
            write_csv: true,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
            spreadsheet_id: String::new(),
            worksheet: "YT-PARSER".to_string(),
            access_token: String::new(),
            timeout_seconds: 30,
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.youtube.api_key = api_key.into();
        self
    }

    pub fn with_queries(mut self, queries: Vec<String>) -> Self {
        self.config.search.queries = queries;
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.config.search.categories = categories;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.config.search.max_results = max_results;
        self
    }

    pub fn with_published(mut self, mode: RecencyMode) -> Self {
        self.config.search.published = mode;
        self
    }

    pub fn with_custom_window(mut self, window: CustomWindow) -> Self {
        self.config.search.published_custom = Some(window);
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.export.output_dir = dir;
        self
    }

    pub fn with_csv_export(mut self, enable: bool) -> Self {
        self.config.export.write_csv = enable;
        self
    }

    pub fn with_spreadsheet(
        mut self,
        spreadsheet_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        self.config.sheets.spreadsheet_id = spreadsheet_id.into();
        self.config.sheets.access_token = access_token.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
