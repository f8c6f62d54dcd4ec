use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{ScanResult, SearchError};

/// Configuration for one scan invocation.
///
/// Constructed once, validated up front, and shared read-only across every
/// worker for the lifetime of the scan. Matching behavior can only change by
/// building a new config and recompiling the pattern.
///
/// # Configuration Locations
///
/// Values can be layered from YAML files, in order of precedence:
/// 1. Custom config file specified via `--config`
/// 2. Local `.codescan.yaml` in the current directory
/// 3. Global `$CONFIG_DIR/codescan/config.yaml`
///
/// CLI arguments take precedence over all file values; the merging behavior
/// is defined in [`SearchConfig::merge_with_cli`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// The pattern to search for (literal text unless `use_regex` is set)
    #[serde(default)]
    pub pattern: String,

    /// Root directory to start the scan from
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Whether matching is case sensitive
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,

    /// Whether a match must be a whole word (not adjacent to an
    /// alphanumeric or underscore character on either side)
    #[serde(default)]
    pub whole_word: bool,

    /// Whether the pattern is interpreted as a regular expression
    #[serde(default)]
    pub use_regex: bool,

    /// File extensions to include, without the leading dot (e.g. ["rs", "toml"]).
    /// None or empty means all extensions are searched.
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,

    /// Glob patterns excluding files and directories, matched against the
    /// full path relative to `root_path` (e.g. "*node_modules*")
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Maximum directory depth to scan; 0 limits the scan to files directly
    /// in the root. None means unlimited.
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Number of context lines captured before and after each match
    #[serde(default)]
    pub context_lines: usize,

    /// Number of threads to use for scanning.
    /// Defaults to the number of CPU cores.
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_case_sensitive() -> bool {
    true
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            root_path: default_root_path(),
            case_sensitive: true,
            whole_word: false,
            use_regex: false,
            file_extensions: None,
            exclude_patterns: Vec::new(),
            max_depth: None,
            context_lines: 0,
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> ScanResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file, falling back to the
    /// default locations for values it does not set
    pub fn load_from(config_path: Option<&Path>) -> ScanResult<Self> {
        let mut builder = ConfigBuilder::builder();

        // Lowest precedence first
        let config_files = [
            dirs::config_dir().map(|p| p.join("codescan/config.yaml")),
            Some(PathBuf::from(".codescan.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments into file-derived configuration.
    /// CLI values take precedence over config file values.
    pub fn merge_with_cli(mut self, cli: SearchConfig) -> Self {
        if !cli.pattern.is_empty() {
            self.pattern = cli.pattern;
        }
        if cli.root_path != default_root_path() {
            self.root_path = cli.root_path;
        }
        if !cli.case_sensitive {
            self.case_sensitive = false;
        }
        if cli.whole_word {
            self.whole_word = true;
        }
        if cli.use_regex {
            self.use_regex = true;
        }
        if cli.file_extensions.is_some() {
            self.file_extensions = cli.file_extensions;
        }
        if !cli.exclude_patterns.is_empty() {
            self.exclude_patterns = cli.exclude_patterns;
        }
        if cli.max_depth.is_some() {
            self.max_depth = cli.max_depth;
        }
        if cli.context_lines != 0 {
            self.context_lines = cli.context_lines;
        }
        // thread_count is deliberately not merged: the CLI-side value is
        // always populated with a machine-derived default, which must not
        // shadow a config-file setting. Callers apply an explicit
        // `--threads` override after merging.
        if cli.log_level != default_log_level() {
            self.log_level = cli.log_level;
        }
        self
    }

    /// Checks the parts of the configuration that must hold before any
    /// traversal work starts. Pattern compilation is validated separately
    /// by `PatternMatcher::new`.
    pub fn validate(&self) -> ScanResult<()> {
        if self.pattern.is_empty() {
            return Err(SearchError::config_error(
                "search pattern must not be empty",
            ));
        }
        if !self.root_path.exists() {
            return Err(SearchError::path_not_found(&self.root_path));
        }
        if !self.root_path.is_dir() {
            return Err(SearchError::not_a_directory(&self.root_path));
        }
        Ok(())
    }
}
