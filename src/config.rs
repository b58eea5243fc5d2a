use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use uuid::Uuid;

/// Top-level settings for a publishing run
#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    /// Title, author and language of the site and the book
    #[serde(default)]
    pub general: GeneralConfig,
    /// Where recipes and documents are read from
    pub input_paths: InputPaths,
    /// Static website output
    #[serde(default)]
    pub website: WebsiteConfig,
    /// EPUB output
    pub epub: EpubConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub author: String,
    /// Language tag used for page markup and dates (e.g. "nl", "en")
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            author: String::new(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputPaths {
    /// Directory searched recursively for `*.json` recipes
    pub recipes: PathBuf,
    /// Directory searched recursively for `*.md` documents
    pub documents: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TemplatesConfig {
    /// Base page template with `{{title}}` and `{{content}}` placeholders
    pub base: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebsiteConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_site_output")]
    pub output: PathBuf,
    /// Static assets (css, images) copied verbatim into the output
    pub web_files: Option<PathBuf>,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            output: default_site_output(),
            web_files: None,
            templates: TemplatesConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EpubConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_epub_filename")]
    pub filename: PathBuf,
    /// Stable identifier of the book; e-readers use it to recognise new editions
    pub book_id: Uuid,
    /// Keep the staging directory after packaging, for inspecting the generated files
    #[serde(default)]
    pub keep_working_dir: bool,
}

// Default value functions
fn default_name() -> String {
    "Recepten".to_string()
}

fn default_language() -> String {
    "nl".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_site_output() -> PathBuf {
    PathBuf::from("site")
}

fn default_epub_filename() -> PathBuf {
    PathBuf::from("recipes.epub")
}

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl AppSettings {
    /// Load settings from `path` (or `config.toml`) and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_BOOK__ prefix
    /// 2. The TOML file
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_BOOK__EPUB__ENABLED
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        load_config(path)
    }
}

/// Load configuration from file and environment variables
///
/// An explicitly given file must exist; the default `config.toml` is optional.
pub fn load_config(path: Option<&str>) -> Result<AppSettings, ConfigError> {
    let file = match path {
        Some(path) => File::with_name(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        // Use double underscore for nested: RECIPE_BOOK__INPUT_PATHS__RECIPES
        .add_source(
            Environment::with_prefix("RECIPE_BOOK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
