//! YAML style modules
//!
//! A style module describes a definition plus the instances to mount, for
//! extracting CSS without a host UI:
//!
//! ```yaml
//! name: card
//! styles:
//!   title:
//!     fontSize: 18
//!     "&:hover": { color: red }
//!   badge:
//!     color: $tone
//! instances:
//!   - { tone: green }
//! ```
//!
//! String values starting with `$` read the named field of the instance data.

use crate::definition::{Block, CssValue, StyleDefinition, Styles};
use crate::error::ModuleError;
use serde::Deserialize;
use serde_json::Value;
use serde_yaml::{Mapping, Value as YamlValue};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct RawModule {
    #[serde(default)]
    name: Option<String>,
    styles: Mapping,
    #[serde(default)]
    instances: Vec<Value>,
}

/// A parsed style module
#[derive(Debug)]
pub struct StyleModule {
    pub name: Option<String>,
    pub definition: Arc<StyleDefinition>,
    /// Data of each instance to mount; at least one
    pub instances: Vec<Value>,
}

impl StyleModule {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModuleError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ModuleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ModuleError> {
        let raw: RawModule = serde_yaml::from_str(contents)?;

        let mut styles = Styles::new();
        for (key, value) in &raw.styles {
            let key = yaml_key(key).ok_or_else(|| ModuleError::InvalidRule {
                key: format!("{key:?}"),
                message: "rule keys must be strings".into(),
            })?;
            let block = parse_block(&key, value)?;
            styles = styles.rule(key, block);
        }

        let instances = if raw.instances.is_empty() {
            vec![Value::Object(Default::default())]
        } else {
            raw.instances
        };

        Ok(StyleModule {
            name: raw.name,
            definition: StyleDefinition::new(styles),
            instances,
        })
    }
}

fn yaml_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn parse_block(rule: &str, value: &YamlValue) -> Result<Block, ModuleError> {
    let YamlValue::Mapping(map) = value else {
        return Err(ModuleError::InvalidRule {
            key: rule.to_string(),
            message: "expected a mapping of properties".into(),
        });
    };

    let mut block = Block::new();
    for (key, value) in map {
        let name = yaml_key(key).ok_or_else(|| ModuleError::InvalidRule {
            key: rule.to_string(),
            message: "property names must be strings".into(),
        })?;

        block = match value {
            YamlValue::Mapping(_) => block.nest(name.clone(), parse_block(rule, value)?),
            YamlValue::String(s) => match s.strip_prefix('$') {
                Some(field) => {
                    let field = field.to_string();
                    block.dynamic_prop(name, move |data: &Value| data_value(data, &field))
                }
                None => block.prop(name, s.as_str()),
            },
            YamlValue::Number(n) => match n.as_f64() {
                Some(n) => block.prop(name, n),
                None => {
                    return Err(ModuleError::InvalidRule {
                        key: rule.to_string(),
                        message: format!("property '{name}' is not a finite number"),
                    })
                }
            },
            _ => {
                return Err(ModuleError::InvalidRule {
                    key: rule.to_string(),
                    message: format!("property '{name}' must be a string, number or mapping"),
                })
            }
        };
    }
    Ok(block)
}

fn data_value(data: &Value, field: &str) -> Option<CssValue> {
    match data.get(field)? {
        Value::String(s) => Some(CssValue::Str(s.clone())),
        Value::Number(n) => n.as_f64().map(CssValue::Number),
        _ => None,
    }
}
