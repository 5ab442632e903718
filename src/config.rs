//! Layered configuration.
//!
//! Sources, later ones winning:
//! - built-in defaults
//! - `.funcdex/settings.toml` (found by walking ancestors of the cwd)
//! - environment variables prefixed with `FUNCDEX_`, with `__`
//!   separating nested levels, e.g. `FUNCDEX_INDEXING__BATCH_SIZE=200`
//!   sets `indexing.batch_size`.

use std::collections::HashMap;
use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Root of the persisted vector collections
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Workspace root directory (where .funcdex is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    #[serde(default = "default_false")]
    pub debug: bool,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub providers: ProviderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Worker pool size for per-file extraction
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    /// Batch size for embedding and upsert calls
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Show a progress bar during long builds
    #[serde(default = "default_true")]
    pub progress: bool,

    /// Directory names excluded at any depth
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    /// `fastembed` or `hashed` (deterministic, offline)
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// fastembed model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Expected dimensionality; used for zero-vector fallbacks with the
    /// hashed provider
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_groq_model")]
    pub groq_model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub groq_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level filter (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `indexing = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_index_path() -> PathBuf {
    PathBuf::from(".funcdex/index")
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_batch_size() -> usize {
    500
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_ignore_dirs() -> Vec<String> {
    [
        ".git",
        ".hg",
        ".svn",
        "node_modules",
        "target",
        "build",
        "dist",
        "vendor",
        "__pycache__",
        ".venv",
        "venv",
        ".idea",
        ".vscode",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
fn default_embedding_provider() -> String {
    "fastembed".to_string()
}
fn default_embedding_model() -> String {
    "AllMiniLML6V2".to_string()
}
fn default_dimensions() -> usize {
    384
}
fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_groq_model() -> String {
    "llama-3.1-8b-instant".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index_path: default_index_path(),
            workspace_root: None,
            debug: false,
            indexing: IndexingConfig::default(),
            embedding: EmbeddingConfig::default(),
            providers: ProviderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            batch_size: default_batch_size(),
            progress: true,
            ignore_dirs: default_ignore_dirs(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            gemini_model: default_gemini_model(),
            groq_model: default_groq_model(),
            gemini_api_key: None,
            groq_api_key: None,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".funcdex/settings.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("FUNCDEX_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file (tests, tools).
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(Box::new)
    }

    /// Find the workspace config by walking ancestors for `.funcdex`.
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".funcdex");
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }
        None
    }

    /// The workspace root directory (where .funcdex is located).
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            if ancestor.join(".funcdex").is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }
        None
    }

    /// `index_path` resolved against the workspace root when relative.
    pub fn resolved_index_path(&self) -> PathBuf {
        if self.index_path.is_absolute() {
            return self.index_path.clone();
        }
        match &self.workspace_root {
            Some(root) => root.join(&self.index_path),
            None => self.index_path.clone(),
        }
    }

    /// Write the default configuration file. Refuses to overwrite an
    /// existing one unless `force` is set.
    pub fn init_config_file(force: bool) -> std::io::Result<PathBuf> {
        let path = PathBuf::from(".funcdex/settings.toml");
        if path.exists() && !force {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists (use --force to overwrite)", path.display()),
            ));
        }
        std::fs::create_dir_all(".funcdex")?;
        let toml_string = toml::to_string_pretty(&Settings::default())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(&path, toml_string)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.index_path, PathBuf::from(".funcdex/index"));
        assert_eq!(settings.indexing.batch_size, 500);
        assert!(settings.indexing.parallel_threads >= 1);
        assert_eq!(settings.embedding.dimensions, 384);
        assert!(settings.indexing.ignore_dirs.contains(&".git".to_string()));
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "[indexing]\nbatch_size = 42\n\n[embedding]\nprovider = \"hashed\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.indexing.batch_size, 42);
        assert_eq!(settings.embedding.provider, "hashed");
        // Untouched fields keep their defaults.
        assert_eq!(settings.embedding.dimensions, 384);
    }

    #[test]
    fn resolved_index_path_joins_workspace_root() {
        let mut settings = Settings::default();
        settings.workspace_root = Some(PathBuf::from("/repo"));
        assert_eq!(
            settings.resolved_index_path(),
            PathBuf::from("/repo/.funcdex/index")
        );
    }
}
