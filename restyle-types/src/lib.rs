//! Shared types for restyle
//!
//! This crate provides the identity tokens and value types used across the
//! restyle workspace. Everything keyed by "identity" (definitions, themes,
//! sheets, contexts) is keyed by one of the tokens below, never by the
//! structure of the value it identifies.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

macro_rules! identity_token {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Allocate a fresh, process-unique token
            pub fn next() -> Self {
                static NEXT: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
                Self(NEXT.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
            }

            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.0)
            }
        }
    };
}

identity_token!(
    /// Identity of a style definition (one per `StyleDefinition` value)
    DefinitionId,
    "definition"
);

identity_token!(
    /// Identity of a theme value
    ThemeId,
    "theme"
);

identity_token!(
    /// Identity of a compiled sheet
    SheetId,
    "sheet"
);

identity_token!(
    /// Identity of a styling context (registry + manager + cache)
    ContextId,
    "context"
);

/// Identifier of a rule inside one sheet
///
/// Rule ids are allocated by the owning sheet and are never reused within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub u64);

impl RuleId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RuleId {
    fn from(id: u64) -> Self {
        RuleId(id)
    }
}

impl From<RuleId> for u64 {
    fn from(id: RuleId) -> Self {
        id.0
    }
}

/// An opaque theme value with reference identity
///
/// Two themes built from equal JSON are still distinct themes: caches key on
/// [`ThemeId`], so callers that want sharing must reuse the same `Arc<Theme>`.
#[derive(Debug)]
pub struct Theme {
    id: ThemeId,
    value: Value,
}

impl Theme {
    pub fn new(value: Value) -> Arc<Self> {
        Arc::new(Theme {
            id: ThemeId::next(),
            value,
        })
    }

    pub fn id(&self) -> ThemeId {
        self.id
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Look up a top-level field of the theme value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    /// Look up a top-level string field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// True for the shared sentinel returned by [`no_theme`]
    pub fn is_no_theme(&self) -> bool {
        self.id == NO_THEME.id
    }
}

static NO_THEME: Lazy<Arc<Theme>> = Lazy::new(|| Theme::new(Value::Object(Default::default())));

/// The shared "no theme" sentinel
pub fn no_theme() -> Arc<Theme> {
    NO_THEME.clone()
}

/// Mapping from logical style key to the class names to apply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassNameMap(BTreeMap<String, String>);

impl ClassNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, class_name: impl Into<String>) {
        self.0.insert(key.into(), class_name.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ClassNameMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ClassNameMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

static EMPTY_CLASSES: Lazy<Arc<ClassNameMap>> = Lazy::new(|| Arc::new(ClassNameMap::new()));

/// The shared empty mapping returned whenever no sheet exists
///
/// Every call returns the same allocation, so callers may compare results
/// with `Arc::ptr_eq`.
pub fn empty_class_map() -> Arc<ClassNameMap> {
    EMPTY_CLASSES.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tokens_are_unique() {
        let a = DefinitionId::next();
        let b = DefinitionId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn equal_theme_values_are_distinct_themes() {
        let a = Theme::new(json!({"color": "red"}));
        let b = Theme::new(json!({"color": "red"}));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.get_str("color"), Some("red"));
    }

    #[test]
    fn no_theme_is_a_singleton() {
        let a = no_theme();
        let b = no_theme();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_no_theme());
        assert!(!Theme::new(json!({})).is_no_theme());
    }

    #[test]
    fn empty_class_map_is_shared() {
        assert!(Arc::ptr_eq(&empty_class_map(), &empty_class_map()));
        assert!(empty_class_map().is_empty());
    }

    #[test]
    fn class_map_serializes_as_object() {
        let map: ClassNameMap = [("button", "button-1")].into_iter().collect();
        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            json!({"button": "button-1"})
        );
    }
}
