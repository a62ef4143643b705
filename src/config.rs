//! Table context configuration
//!
//! Built-in contexts ship in `tabnav.yaml` (embedded at compile time). Users
//! extend or override them in `~/.config/tabnav/config.yaml` with the same
//! layout.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::context::{Context, LineSelector};
use crate::table::{CaptureLevel, PatternError};

/// Default contexts embedded at compile time
const DEFAULT_CONFIG_YAML: &str = include_str!("../tabnav.yaml");

/// Placeholder replaced with the escaped delimiter in delimited contexts
pub const DELIMITER_PLACEHOLDER: &str = "{delimiter}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    UnknownContext(String),
    /// A pattern set with no cell patterns, or a context with no pattern sets
    NoPatterns(String),
    /// A delimited context resolved without a delimiter
    MissingDelimiter(String),
    InvalidDelimiter(String),
    Pattern {
        context: String,
        source: PatternError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::UnknownContext(name) => write!(f, "Unknown table context: {}", name),
            ConfigError::NoPatterns(name) => write!(f, "Context {} has no patterns", name),
            ConfigError::MissingDelimiter(name) => {
                write!(f, "Context {} needs a delimiter", name)
            }
            ConfigError::InvalidDelimiter(d) => {
                write!(f, "Invalid delimiter {:?}: must be one non-space character", d)
            }
            ConfigError::Pattern { context, source } => {
                write!(f, "Context {}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Pattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    OneOrMany::deserialize(deserializer).map(Vec::from)
}

fn optional_one_or_many<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<OneOrMany<T>>::deserialize(deserializer).map(|value| value.map(Vec::from))
}

/// One line pattern with the cell patterns applied to its `table` group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    /// A single pattern or a list, applied in sequence
    #[serde(deserialize_with = "one_or_many")]
    pub cell: Vec<String>,
}

impl PatternSet {
    fn uses_delimiter(&self) -> bool {
        self.line
            .iter()
            .chain(self.cell.iter())
            .any(|p| p.contains(DELIMITER_PLACEHOLDER))
    }

    fn with_delimiter(&self, escaped: &str) -> PatternSet {
        PatternSet {
            line: self
                .line
                .as_ref()
                .map(|p| p.replace(DELIMITER_PLACEHOLDER, escaped)),
            cell: self
                .cell
                .iter()
                .map(|p| p.replace(DELIMITER_PLACEHOLDER, escaped))
                .collect(),
        }
    }
}

/// One table context as written in YAML. Every field is optional so user
/// entries can override single fields of a built-in context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_level: Option<CaptureLevel>,
    /// Regex a row's line must match to be considered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Regex that excludes a row when it matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub except_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_delimiter: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub patterns: Option<Vec<PatternSet>>,
}

impl ContextConfig {
    /// Fields set in `other` win
    pub fn overlay(&self, other: &ContextConfig) -> ContextConfig {
        ContextConfig {
            capture_level: other.capture_level.or(self.capture_level),
            selector: other.selector.clone().or_else(|| self.selector.clone()),
            except_selector: other
                .except_selector
                .clone()
                .or_else(|| self.except_selector.clone()),
            default_delimiter: other
                .default_delimiter
                .clone()
                .or_else(|| self.default_delimiter.clone()),
            patterns: other.patterns.clone().or_else(|| self.patterns.clone()),
        }
    }
}

/// Table navigation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabNavConfig {
    /// Default capture level for every context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_level: Option<CaptureLevel>,
    #[serde(default)]
    pub contexts: BTreeMap<String, ContextConfig>,
    /// Layered over `contexts` key by key
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_contexts: BTreeMap<String, ContextConfig>,
}

impl Default for TabNavConfig {
    fn default() -> Self {
        match Self::from_yaml(DEFAULT_CONFIG_YAML) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse embedded contexts: {}, using none", e);
                Self::empty()
            }
        }
    }
}

impl TabNavConfig {
    /// A configuration without any contexts
    pub fn empty() -> Self {
        Self {
            capture_level: None,
            contexts: BTreeMap::new(),
            user_contexts: BTreeMap::new(),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Built-in contexts merged with the user config file, if there is one
    pub fn load() -> Self {
        let mut config = Self::default();

        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return config;
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return config;
        }

        match Self::load_file(&path) {
            Ok(user) => {
                tracing::info!("Loaded config from {}", path.display());
                config.merge(user);
            }
            Err(e) => {
                tracing::warn!("Failed to load config at {}: {}", path.display(), e);
            }
        }
        config
    }

    /// Layer `other` over this configuration
    pub fn merge(&mut self, other: TabNavConfig) {
        if other.capture_level.is_some() {
            self.capture_level = other.capture_level;
        }
        for (name, context) in other.contexts {
            let merged = match self.contexts.get(&name) {
                Some(existing) => existing.overlay(&context),
                None => context,
            };
            self.contexts.insert(name, merged);
        }
        for (name, context) in other.user_contexts {
            let merged = match self.user_contexts.get(&name) {
                Some(existing) => existing.overlay(&context),
                None => context,
            };
            self.user_contexts.insert(name, merged);
        }
    }

    pub fn capture_level(&self) -> CaptureLevel {
        self.capture_level.unwrap_or_default()
    }

    /// Names of all configured contexts
    pub fn context_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .contexts
            .keys()
            .chain(self.user_contexts.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// The context entry with its user overrides applied
    pub fn context_config(&self, name: &str) -> Option<ContextConfig> {
        match (self.contexts.get(name), self.user_contexts.get(name)) {
            (Some(base), Some(user)) => Some(base.overlay(user)),
            (Some(base), None) => Some(base.clone()),
            (None, Some(user)) => Some(user.clone()),
            (None, None) => None,
        }
    }

    /// Build the context `name`.
    ///
    /// The capture level is `capture_level` if given, else the context's own,
    /// else the global one. `delimiter` fills `{delimiter}` placeholders and
    /// falls back to the context's `default_delimiter`.
    pub fn resolve(
        &self,
        name: &str,
        capture_level: Option<CaptureLevel>,
        delimiter: Option<&str>,
    ) -> Result<Context, ConfigError> {
        let config = self
            .context_config(name)
            .ok_or_else(|| ConfigError::UnknownContext(name.to_string()))?;

        let level = capture_level
            .or(config.capture_level)
            .unwrap_or_else(|| self.capture_level());

        let mut patterns = config.patterns.clone().unwrap_or_default();
        if patterns.is_empty() || patterns.iter().any(|set| set.cell.is_empty()) {
            return Err(ConfigError::NoPatterns(name.to_string()));
        }

        if patterns.iter().any(PatternSet::uses_delimiter) {
            let delimiter = delimiter
                .or(config.default_delimiter.as_deref())
                .ok_or_else(|| ConfigError::MissingDelimiter(name.to_string()))?;
            let escaped = escape_delimiter(delimiter)?;
            patterns = patterns.iter().map(|set| set.with_delimiter(&escaped)).collect();
        }

        let pattern_error = |source| ConfigError::Pattern {
            context: name.to_string(),
            source,
        };

        let mut context = Context::new(name, &patterns, level).map_err(pattern_error)?;
        if let Some(selector) = &config.selector {
            let selector = LineSelector::new(selector).map_err(pattern_error)?;
            context = context.with_selector(Arc::new(selector));
        }
        if let Some(except) = &config.except_selector {
            let except = LineSelector::new(except).map_err(pattern_error)?;
            context = context.with_except_selector(Arc::new(except));
        }

        tracing::debug!(
            "Resolved context {} at capture level {} ({} pattern sets)",
            name,
            level,
            patterns.len()
        );
        Ok(context)
    }
}

/// Regex-escape a single-character delimiter
fn escape_delimiter(delimiter: &str) -> Result<String, ConfigError> {
    let mut chars = delimiter.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch != ' ' && ch != '\n' && ch != '\r' => {
            Ok(regex::escape(delimiter))
        }
        _ => Err(ConfigError::InvalidDelimiter(delimiter.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_resolve() {
        let config = TabNavConfig::default();
        assert_eq!(config.capture_level(), CaptureLevel::Content);
        assert_eq!(config.context_names(), vec!["csv", "markdown", "tsv"]);

        for name in config.context_names() {
            let context = config.resolve(name, None, None).unwrap();
            assert_eq!(context.capture_level(), CaptureLevel::Content);
            assert!(!context.parsers().is_empty());
        }
    }

    #[test]
    fn test_capture_level_precedence() {
        let mut config = TabNavConfig::default();
        config.capture_level = Some(CaptureLevel::Markup);
        assert_eq!(
            config.resolve("markdown", None, None).unwrap().capture_level(),
            CaptureLevel::Markup
        );

        config.user_contexts.insert(
            "markdown".to_string(),
            ContextConfig {
                capture_level: Some(CaptureLevel::Trimmed),
                ..Default::default()
            },
        );
        assert_eq!(
            config.resolve("markdown", None, None).unwrap().capture_level(),
            CaptureLevel::Trimmed
        );
        assert_eq!(
            config
                .resolve("markdown", Some(CaptureLevel::Cell), None)
                .unwrap()
                .capture_level(),
            CaptureLevel::Cell
        );
    }

    #[test]
    fn test_single_pattern_set_and_cell_string_accepted() {
        let yaml = r#"
contexts:
  pipes:
    patterns:
      cell: '(?P<cell>\|(?P<markup>(?P<content>[^|]*)))'
"#;
        let config = TabNavConfig::from_yaml(yaml).unwrap();
        let pipes = config.context_config("pipes").unwrap();
        let patterns = pipes.patterns.unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].line, None);
        assert_eq!(patterns[0].cell.len(), 1);
    }

    #[test]
    fn test_pattern_without_markup_group_is_rejected() {
        let yaml = r#"
contexts:
  broken:
    patterns:
      - cell: '(?P<content>[^,]*)'
"#;
        let config = TabNavConfig::from_yaml(yaml).unwrap();
        let err = config.resolve("broken", None, None).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Pattern {
                source: PatternError::MissingGroup { group: "markup", .. },
                ..
            }
        ));
    }

    #[test]
    fn test_delimiter_handling() {
        let config = TabNavConfig::default();
        assert!(config.resolve("csv", None, Some(";")).is_ok());
        assert!(config.resolve("csv", None, Some("|")).is_ok());
        assert_eq!(
            config.resolve("csv", None, Some(" ")).unwrap_err(),
            ConfigError::InvalidDelimiter(" ".to_string())
        );
        assert_eq!(
            config.resolve("csv", None, Some(",,")).unwrap_err(),
            ConfigError::InvalidDelimiter(",,".to_string())
        );
    }

    #[test]
    fn test_delimited_context_without_default_needs_delimiter() {
        let yaml = r#"
contexts:
  dsv:
    patterns:
      cell: '(?P<cell>(?P<markup>(?P<content>[^{delimiter}]*))(?:{delimiter}|$))'
"#;
        let config = TabNavConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.resolve("dsv", None, None).unwrap_err(),
            ConfigError::MissingDelimiter("dsv".to_string())
        );
        assert!(config.resolve("dsv", None, Some(":")).is_ok());
    }

    #[test]
    fn test_unknown_context() {
        let config = TabNavConfig::default();
        assert_eq!(
            config.resolve("latex", None, None).unwrap_err(),
            ConfigError::UnknownContext("latex".to_string())
        );
    }

    #[test]
    fn test_merge_overlays_fields() {
        let mut config = TabNavConfig::default();
        let user = TabNavConfig::from_yaml(
            r#"
capture_level: trimmed
contexts:
  csv:
    default_delimiter: ';'
"#,
        )
        .unwrap();
        config.merge(user);

        assert_eq!(config.capture_level(), CaptureLevel::Trimmed);
        let csv = config.context_config("csv").unwrap();
        assert_eq!(csv.default_delimiter.as_deref(), Some(";"));
        assert!(csv.patterns.is_some(), "patterns kept from the built-in context");
    }
}
