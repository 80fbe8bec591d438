//! Configuration for youcademy.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GEMINI_API_KEY / API_KEY, YOUCADEMY_MODEL,
//!    YOUCADEMY_EXPORT_DIR)
//! 2. Config file (.youcademy/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .youcademy/config.yaml
//! - Paths in config file are relative to the project root (parent of .youcademy/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECONDS: u64 = 300;
const DEFAULT_LINE_WIDTH: usize = 90;
const DEFAULT_LINES_PER_PAGE: usize = 54;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
    #[serde(default)]
    pub speech: Option<CommandConfig>,
    #[serde(default)]
    pub clipboard: Option<CommandConfig>,
    #[serde(default)]
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    pub command: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub dir: Option<String>,
    pub line_width: Option<usize>,
    pub lines_per_page: Option<usize>,
}

/// Model client settings
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Document export settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub dir: PathBuf,
    pub line_width: usize,
    pub lines_per_page: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            line_width: DEFAULT_LINE_WIDTH,
            lines_per_page: DEFAULT_LINES_PER_PAGE,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub gemini: GeminiSettings,
    /// Text-to-speech command (program followed by arguments)
    pub speech_command: Vec<String>,
    /// Clipboard command (program followed by arguments)
    pub clipboard_command: Vec<String>,
    pub export: ExportSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Platform default for reading text aloud
fn default_speech_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["say".to_string()]
    } else {
        vec!["espeak".to_string()]
    }
}

/// Platform default for writing the clipboard
fn default_clipboard_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["pbcopy".to_string()]
    } else if cfg!(target_os = "windows") {
        vec!["clip".to_string()]
    } else {
        vec![
            "xclip".to_string(),
            "-selection".to_string(),
            "clipboard".to_string(),
        ]
    }
}

/// Split a configured command line on whitespace
fn split_command(command: &str) -> Option<Vec<String>> {
    let parts: Vec<String> = command.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".youcademy").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// First non-empty value among the named environment variables
fn env_value(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Merge a parsed config file (if any) with environment and defaults
fn resolve(file: Option<(ConfigFile, PathBuf)>) -> ResolvedConfig {
    let mut gemini = GeminiSettings::default();
    let mut export = ExportSettings::default();
    let mut speech_command = default_speech_command();
    let mut clipboard_command = default_clipboard_command();
    let mut config_file = None;

    if let Some((config, config_path)) = file {
        // Base directory is the parent of .youcademy/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        if let Some(g) = config.gemini {
            if let Some(model) = g.model {
                gemini.model = model;
            }
            if let Some(base_url) = g.base_url {
                gemini.base_url = base_url;
            }
            if let Some(timeout) = g.timeout_seconds {
                gemini.timeout_seconds = timeout;
            }
        }

        if let Some(cmd) = config.speech.and_then(|s| s.command).and_then(|c| split_command(&c)) {
            speech_command = cmd;
        }
        if let Some(cmd) = config.clipboard.and_then(|c| c.command).and_then(|c| split_command(&c)) {
            clipboard_command = cmd;
        }

        if let Some(e) = config.export {
            if let Some(dir) = e.dir {
                export.dir = resolve_path(&base_dir, &dir);
            }
            if let Some(width) = e.line_width.filter(|w| *w > 0) {
                export.line_width = width;
            }
            if let Some(lines) = e.lines_per_page.filter(|l| *l > 0) {
                export.lines_per_page = lines;
            }
        }

        config_file = Some(config_path);
    }

    // Environment overrides everything
    gemini.api_key = env_value(&["GEMINI_API_KEY", "API_KEY"]);
    if let Some(model) = env_value(&["YOUCADEMY_MODEL"]) {
        gemini.model = model;
    }
    if let Some(dir) = env_value(&["YOUCADEMY_EXPORT_DIR"]) {
        export.dir = PathBuf::from(dir);
    }

    ResolvedConfig {
        gemini,
        speech_command,
        clipboard_command,
        export,
        config_file,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let file = match find_config_file() {
        Some(path) => Some((load_config_file(&path)?, path)),
        None => None,
    };
    Ok(resolve(file))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
