//! Configuration loading and file filtering.
//!
//! Configuration is read from a TOML file and covers three areas:
//! - `[organizer]`: default folder, report path, log file and probe limit
//! - `[categories]`: extra extension mappings that override the built-in table
//! - `[filters]`: which scanned files take part in organizing
//!
//! # Configuration File Format
//!
//! ```toml
//! [organizer]
//! folder = "./downloads"
//! report = "./reports/report.csv"
//! log_file = "organizer.log"
//! max_probes = 10000
//!
//! [categories]
//! Images = ["avif"]
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::file_category::{Category, FileMapper};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Default folder organized when neither the CLI nor the config names one.
pub const DEFAULT_FOLDER: &str = "./test_folder";
/// Default CSV report location.
pub const DEFAULT_REPORT: &str = "./reports/report.csv";
/// Default log file.
pub const DEFAULT_LOG_FILE: &str = "organizer.log";
/// Default upper bound on destination suffix probes.
pub const DEFAULT_MAX_PROBES: u32 = 10_000;

/// Name of the per-directory configuration file.
const LOCAL_CONFIG_NAME: &str = ".foldersortrc.toml";

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// Why it failed.
        reason: String,
    },
    /// A `[categories]` key names no known category.
    UnknownCategory(String),
    /// `max_probes` must be at least 1.
    InvalidProbeLimit,
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::UnknownCategory(name) => {
                let known: Vec<&str> = Category::ALL.iter().map(|c| c.dir_name()).collect();
                write!(
                    f,
                    "Unknown category '{}' in [categories] (expected one of: {})",
                    name,
                    known.join(", ")
                )
            }
            ConfigError::InvalidProbeLimit => write!(f, "max_probes must be at least 1"),
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub organizer: OrganizerSettings,

    /// Category name to extra extensions.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub filters: FilterRules,
}

/// `[organizer]` settings. Every field is optional so CLI flags can fill gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizerSettings {
    pub folder: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub max_probes: Option<u32>,
}

/// Filter rules applied to scanned files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether files starting with "." take part. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist; a match here overrides every exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for excluding files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g. "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions, with or without the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regexes matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files regardless of exclusions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    /// Find the configuration file to use, if any.
    ///
    /// Lookup order:
    /// 1. `config_path`, if provided (returned even if it does not exist)
    /// 2. `.foldersortrc.toml` in the current directory
    /// 3. `~/.config/foldersort/config.toml`
    pub fn locate(config_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(path.to_path_buf());
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_NAME);
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = PathBuf::from(std::env::var_os("HOME")?)
            .join(".config")
            .join("foldersort")
            .join("config.toml");
        home_config.exists().then_some(home_config)
    }

    /// Load configuration from the located file, or the built-in defaults
    /// when there is none. Returns the file that was read alongside.
    pub fn load(config_path: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match Self::locate(config_path) {
            Some(path) => Ok((Self::load_from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Probe limit, validated.
    pub fn max_probes(&self) -> Result<u32, ConfigError> {
        match self.organizer.max_probes {
            Some(0) => Err(ConfigError::InvalidProbeLimit),
            Some(n) => Ok(n),
            None => Ok(DEFAULT_MAX_PROBES),
        }
    }

    /// Build the extension table, with `[categories]` entries taking
    /// precedence over the built-in mappings.
    pub fn file_mapper(&self) -> Result<FileMapper, ConfigError> {
        let mut overrides = Vec::new();
        for (name, extensions) in &self.categories {
            let category: Category = name
                .parse()
                .map_err(|_| ConfigError::UnknownCategory(name.clone()))?;
            overrides.extend(extensions.iter().map(|ext| (ext.as_str(), category)));
        }
        Ok(FileMapper::with_overrides(overrides))
    }

    /// Compile the filter rules.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Filter rules with every pattern pre-compiled.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Filters that let every file through.
    pub fn allow_all() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }

    /// Decide whether a file takes part in organizing.
    ///
    /// Include patterns win outright; otherwise the hidden-file switch,
    /// exact names, extensions, globs and regexes are checked in turn.
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension()
            && self
                .exclude_extensions
                .contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self::allow_all()
    }
}
