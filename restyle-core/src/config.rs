//! Context configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings of a [`StyleContext`](crate::context::StyleContext)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Acquire sheets during render instead of at setup
    #[serde(default)]
    pub is_ssr: bool,

    /// Never compile anything; every instance resolves to the empty map
    #[serde(default)]
    pub disable_styles_generation: bool,

    /// Prepended to every generated class name
    #[serde(default)]
    pub class_name_prefix: String,

    /// Generate short `c{n}` class names
    #[serde(default)]
    pub minify: bool,
}

impl ContextConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn ssr() -> Self {
        ContextConfig {
            is_ssr: true,
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        ContextConfig {
            disable_styles_generation: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_fields_default() {
        let config = ContextConfig::from_yaml_str("is_ssr: true\n").unwrap();
        assert!(config.is_ssr);
        assert!(!config.disable_styles_generation);
        assert_eq!(config.class_name_prefix, "");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "class_name_prefix: app-\nminify: true").unwrap();

        let config = ContextConfig::from_file(file.path()).unwrap();
        assert_eq!(config.class_name_prefix, "app-");
        assert!(config.minify);
    }

    #[test]
    fn reports_parse_errors() {
        let err = ContextConfig::from_yaml_str("is_ssr: [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
