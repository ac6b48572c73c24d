//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/navtoc/navtoc.toml`
//! 3. Local config: `<toc_dir>/.navtoc.toml` (directory of the TOC source)
//! 4. Environment variables: `NAVTOC_*` prefix

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::builder::DEFAULT_TITLE;
use crate::domain::language::{catalog_codes, DEFAULT_LANGUAGE};
use crate::domain::{CollapsePolicy, LanguageSet, TemplateContext};
use crate::util::path::expand_env_vars;

/// Raw settings for intermediate parsing (arrays are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub default_language: Option<String>,
    pub supported_languages: Option<Vec<String>>,
    pub toroot: Option<String>,
    pub title: Option<String>,
    pub collapse_policy: Option<CollapsePolicy>,
    pub preference_file: Option<PathBuf>,
    pub defines: Option<Vec<String>>,
    pub variables: Option<BTreeMap<String, String>>,
}

/// Unified configuration for navtoc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Language every TOC entry must carry a label for
    pub default_language: String,
    /// Allow-list for the display language
    pub supported_languages: Vec<String>,
    /// Site root substituted for `toroot` in TOC urls
    pub toroot: String,
    /// Label of the synthetic root node
    pub title: String,
    /// What collapsing a section does to deeper expansion state
    pub collapse_policy: CollapsePolicy,
    /// Where the preferred display language is stored
    pub preference_file: PathBuf,
    /// Flags treated as true by `<?cs if:NAME ?>`
    pub defines: Vec<String>,
    /// Extra `<?cs var:NAME ?>` values
    pub variables: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
            supported_languages: catalog_codes(),
            toroot: "/".to_string(),
            title: DEFAULT_TITLE.to_string(),
            collapse_policy: CollapsePolicy::default(),
            preference_file: default_preference_path(),
            defines: Vec::new(),
            variables: BTreeMap::new(),
        }
    }
}

/// Default preference location (`<XDG data dir>/navtoc/preference.toml`).
pub fn default_preference_path() -> PathBuf {
    ProjectDirs::from("", "", "navtoc")
        .map(|dirs| dirs.data_dir().join("preference.toml"))
        .unwrap_or_else(|| PathBuf::from("~/.local/share/navtoc/preference.toml"))
}

/// Get the XDG config directory for navtoc.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "navtoc").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("navtoc.toml"))
}

/// Get the path to the local config file next to a TOC source.
pub fn local_config_path(toc_dir: &Path) -> PathBuf {
    toc_dir.join(".navtoc.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Merge arrays with union semantics and negation support.
///
/// - Items from overlay are appended to base, keeping first-seen order
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are de-duplicated
///
/// # Examples
/// ```ignore
/// merge_array(&["en", "de"], &["ja"])        // → ["en", "de", "ja"]
/// merge_array(&["en", "de"], &["!de", "ko"]) // → ["en", "ko"]
/// ```
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for item in base {
        if seen.insert(item.clone()) {
            result.push(item.clone());
        }
    }

    for pattern in overlay {
        if let Some(negated) = pattern.strip_prefix('!') {
            result.retain(|item| item != negated);
            seen.remove(negated);
        } else if seen.insert(pattern.clone()) {
            result.push(pattern.clone());
        }
    }
    result
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.preference_file.to_string_lossy().as_ref());
        self.preference_file = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self (base) with union semantics for arrays.
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Arrays: union merge with negation support
    /// - Variables: overlay keys win, other base keys are kept
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut variables = self.variables.clone();
        if let Some(extra) = &overlay.variables {
            variables.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Self {
            supported_languages: overlay
                .supported_languages
                .as_ref()
                .map(|o| merge_array(&self.supported_languages, o))
                .unwrap_or_else(|| self.supported_languages.clone()),
            defines: overlay
                .defines
                .as_ref()
                .map(|o| merge_array(&self.defines, o))
                .unwrap_or_else(|| self.defines.clone()),
            variables,
            ..self.overlay_scalars(overlay)
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    ///
    /// Unlike `merge_with()` which uses union semantics, this method replaces
    /// arrays entirely if the global config specifies them.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            supported_languages: global
                .supported_languages
                .clone()
                .unwrap_or_else(|| self.supported_languages.clone()),
            defines: global.defines.clone().unwrap_or_else(|| self.defines.clone()),
            variables: global
                .variables
                .clone()
                .unwrap_or_else(|| self.variables.clone()),
            ..self.overlay_scalars(global)
        }
    }

    fn overlay_scalars(&self, raw: &RawSettings) -> Self {
        Self {
            default_language: raw
                .default_language
                .clone()
                .unwrap_or_else(|| self.default_language.clone()),
            supported_languages: self.supported_languages.clone(),
            toroot: raw.toroot.clone().unwrap_or_else(|| self.toroot.clone()),
            title: raw.title.clone().unwrap_or_else(|| self.title.clone()),
            collapse_policy: raw.collapse_policy.unwrap_or(self.collapse_policy),
            preference_file: raw
                .preference_file
                .clone()
                .unwrap_or_else(|| self.preference_file.clone()),
            defines: self.defines.clone(),
            variables: self.variables.clone(),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `toc_dir` - Optional directory of the TOC source for local config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/navtoc/navtoc.toml` (arrays REPLACE defaults)
    /// 3. Local config: `<toc_dir>/.navtoc.toml` (arrays UNION with global)
    /// 4. Environment variables: `NAVTOC_*` prefix (REPLACES - explicit override)
    pub fn load(toc_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), toc_dir)
    }

    /// Same as [`Settings::load`] with an explicit global config file.
    ///
    /// An explicitly given global file must exist; the XDG default is optional.
    pub fn load_with_global(global: &Path, toc_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::require_file(global)?;
        Self::load_from(Some(global), toc_dir)
    }

    /// Same as [`Settings::load_with_global`], reading `NAVTOC_*` overrides
    /// from `env` instead of the process environment.
    pub fn load_with_env(
        global: &Path,
        toc_dir: Option<&Path>,
        env: Map<String, String>,
    ) -> Result<Self, ApplicationError> {
        Self::require_file(global)?;
        Self::load_layers(Some(global), toc_dir, Some(env))
    }

    fn require_file(path: &Path) -> Result<(), ApplicationError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(ApplicationError::Config {
                message: format!("config file not found: {}", path.display()),
            })
        }
    }

    fn load_from(global: Option<&Path>, toc_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global, toc_dir, None)
    }

    fn load_layers(
        global: Option<&Path>,
        toc_dir: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config (REPLACES defaults)
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                let raw = load_raw_settings(global_path)?;
                current = current.apply_global(&raw);
            }
        }

        // 3. Local config (UNION with global)
        if let Some(dir) = toc_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (replaces - explicit override)
        current = Self::apply_env_overrides(current, env)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply NAVTOC_* environment variables as explicit overrides.
    ///
    /// Lists are comma separated: `NAVTOC_SUPPORTED_LANGUAGES=en,ja`.
    /// `env` replaces the process environment when given.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("NAVTOC")
                .prefix_separator("_")
                .separator("__")
                .source(env),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("default_language") {
            settings.default_language = val;
        }
        if let Ok(val) = config.get_string("supported_languages") {
            settings.supported_languages = split_list(&val);
        }
        if let Ok(val) = config.get_string("toroot") {
            settings.toroot = val;
        }
        if let Ok(val) = config.get_string("title") {
            settings.title = val;
        }
        if let Ok(val) = config.get_string("collapse_policy") {
            settings.collapse_policy = match val.to_ascii_lowercase().as_str() {
                "preserve" => CollapsePolicy::Preserve,
                "discard" => CollapsePolicy::Discard,
                other => {
                    return Err(ApplicationError::Config {
                        message: format!(
                            "NAVTOC_COLLAPSE_POLICY: expected preserve or discard, got {other}"
                        ),
                    })
                }
            };
        }
        if let Ok(val) = config.get_string("preference_file") {
            settings.preference_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("defines") {
            settings.defines = split_list(&val);
        }

        Ok(settings)
    }

    /// Allow-list of display languages, always containing the default.
    pub fn language_set(&self) -> LanguageSet {
        LanguageSet::new(&self.default_language, self.supported_languages.iter().cloned())
    }

    /// Values for template directives while loading a TOC.
    pub fn template_context(&self) -> TemplateContext {
        TemplateContext {
            toroot: self.toroot.clone(),
            variables: self.variables.clone(),
            defines: self.defines.clone(),
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# navtoc configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/navtoc/navtoc.toml  (defines your baseline)
#   Local:  <toc_dir>/.navtoc.toml        (per-site additions)
#   Env:    NAVTOC_* environment variables (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!item" in local config to REMOVE an inherited item:
#     supported_languages = ["pt-BR", "!ru"]  # adds pt-BR, removes ru

# Language every TOC entry must have a label for
# default_language = "en"

# Languages the display language may be set to
# supported_languages = ["en", "de", "es", "fr", "it", "ja", "ko", "ru", "zh", "zh-CN", "zh-TW"]

# Site root substituted for <?cs var:toroot ?> and {toroot}
# toroot = "/"

# Label of the tree root
# title = "Contents"

# Collapsing a section: "preserve" keeps deeper sections as they were, "discard" collapses them
# collapse_policy = "preserve"

# Where the preferred display language is stored
# preference_file = "~/.local/share/navtoc/preference.toml"

# Flags that are true in <?cs if:NAME ?>
# defines = ["beta"]

# Extra values for <?cs var:NAME ?>
# [variables]
# sdk_version = "4.4"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
