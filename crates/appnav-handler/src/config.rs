//! Handler configuration

use crate::error::ConfigError;
use appnav_state::redaction::DEFAULT_ANNOTATION_CACHE_CAPACITY;
use appnav_state::{ParamHandlingMode, ParameterFilter};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Navigation handler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Component id owning the stored app states
    pub owner: String,
    /// Policy for properties present in stored state and URL
    pub param_handling: ParamHandlingMode,
    /// Rewrite the hash before the store confirms a save
    pub immediate_hash_replace: bool,
    /// Parameter names treated as technical in addition to the built-ins
    pub extra_technical_parameters: Vec<String>,
    /// Also redact inner app state before saving it
    pub redact_inner_state: bool,
    /// Memoized (entity set, mode) classifications
    pub annotation_cache_capacity: u64,
}

impl NavigationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With owner component id
    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// With conflict policy
    #[inline]
    #[must_use]
    pub fn with_param_handling(mut self, mode: ParamHandlingMode) -> Self {
        self.param_handling = mode;
        self
    }

    /// With hash replacement timing
    #[inline]
    #[must_use]
    pub fn with_immediate_hash_replace(mut self, immediate: bool) -> Self {
        self.immediate_hash_replace = immediate;
        self
    }

    /// With extra technical parameter names
    #[must_use]
    pub fn with_extra_technical_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_technical_parameters = names.into_iter().map(Into::into).collect();
        self
    }

    /// With inner state redaction
    #[inline]
    #[must_use]
    pub fn with_redact_inner_state(mut self, redact: bool) -> Self {
        self.redact_inner_state = redact;
        self
    }

    /// Reserved-name filter for this configuration
    #[must_use]
    pub fn parameter_filter(&self) -> ParameterFilter {
        ParameterFilter::with_extra(self.extra_technical_parameters.iter().cloned())
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` if the text does not match the config shape.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, `ConfigError::Parse`
    /// if its content is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            owner: "appnav".to_string(),
            param_handling: ParamHandlingMode::SelVarWins,
            immediate_hash_replace: true,
            extra_technical_parameters: Vec::new(),
            redact_inner_state: false,
            annotation_cache_capacity: DEFAULT_ANNOTATION_CACHE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = NavigationConfig::from_toml_str(
            r#"
            owner = "sales.orders"
            param_handling = "URLParamWins"
            extra_technical_parameters = ["ZZ_DEBUG"]
            "#,
        )
        .unwrap();
        assert_eq!(config.owner, "sales.orders");
        assert_eq!(config.param_handling, ParamHandlingMode::UrlParamWins);
        assert!(config.immediate_hash_replace);
        assert!(config.parameter_filter().is_technical("ZZ_DEBUG"));
    }

    #[test]
    fn unknown_policy_rejected() {
        assert!(matches!(
            NavigationConfig::from_toml_str("param_handling = \"Whatever\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "immediate_hash_replace = false").unwrap();
        let config = NavigationConfig::from_file(file.path()).unwrap();
        assert!(!config.immediate_hash_replace);
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            NavigationConfig::from_file("/nonexistent/appnav.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
