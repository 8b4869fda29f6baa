//! Style definitions
//!
//! A definition is an ordered set of logical keys, each mapped to a
//! [`StyleEntry`]. Entries are either static blocks (which may still hold
//! individual function-valued properties) or whole-rule functions of the
//! instance data. Definitions are compared by identity only.

use restyle_types::{DefinitionId, Theme};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Computes a whole rule block from instance data
pub type DynamicBlockFn = Arc<dyn Fn(&Value) -> Block + Send + Sync>;

/// Computes one property value from instance data; `None` omits the property
pub type DynamicValueFn = Arc<dyn Fn(&Value) -> Option<CssValue> + Send + Sync>;

/// Builds the styles of a theme-dependent definition
pub type ThemedStylesFn = Arc<dyn Fn(&Theme) -> Styles + Send + Sync>;

/// A literal CSS value
#[derive(Debug, Clone, PartialEq)]
pub enum CssValue {
    Str(String),
    Number(f64),
}

impl From<&str> for CssValue {
    fn from(value: &str) -> Self {
        CssValue::Str(value.to_string())
    }
}

impl From<String> for CssValue {
    fn from(value: String) -> Self {
        CssValue::Str(value)
    }
}

impl From<f64> for CssValue {
    fn from(value: f64) -> Self {
        CssValue::Number(value)
    }
}

impl From<i32> for CssValue {
    fn from(value: i32) -> Self {
        CssValue::Number(f64::from(value))
    }
}

impl From<u32> for CssValue {
    fn from(value: u32) -> Self {
        CssValue::Number(f64::from(value))
    }
}

/// A property value inside a block
#[derive(Clone)]
pub enum PropValue {
    Static(CssValue),
    Dynamic(DynamicValueFn),
}

impl PropValue {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, PropValue::Dynamic(_))
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            PropValue::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

/// Declarations of one rule plus nested `&` blocks
#[derive(Debug, Clone, Default)]
pub struct Block {
    props: Vec<(String, PropValue)>,
    nested: Vec<(String, Block)>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a static property
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<CssValue>) -> Self {
        self.props.push((name.into(), PropValue::Static(value.into())));
        self
    }

    /// Add a property computed from instance data
    pub fn dynamic_prop<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Option<CssValue> + Send + Sync + 'static,
    {
        self.props.push((name.into(), PropValue::Dynamic(Arc::new(f))));
        self
    }

    /// Add a nested block; `&` in the selector stands for the parent selector
    pub fn nest(mut self, selector: impl Into<String>, block: Block) -> Self {
        self.nested.push((selector.into(), block));
        self
    }

    pub fn props(&self) -> &[(String, PropValue)] {
        &self.props
    }

    pub fn nested(&self) -> &[(String, Block)] {
        &self.nested
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.nested.iter().all(|(_, block)| block.is_empty())
    }

    /// True if any property here or in a nested block is function-valued
    pub fn has_dynamic(&self) -> bool {
        self.props.iter().any(|(_, value)| value.is_dynamic())
            || self.nested.iter().any(|(_, block)| block.has_dynamic())
    }

    /// The block with every function-valued property removed
    pub fn static_part(&self) -> Block {
        Block {
            props: self
                .props
                .iter()
                .filter(|(_, value)| !value.is_dynamic())
                .cloned()
                .collect(),
            nested: self
                .nested
                .iter()
                .map(|(selector, block)| (selector.clone(), block.static_part()))
                .filter(|(_, block)| !block.is_empty())
                .collect(),
        }
    }

    /// The function-valued properties only, or `None` if there are none
    pub fn dynamic_part(&self) -> Option<Block> {
        if !self.has_dynamic() {
            return None;
        }

        Some(Block {
            props: self
                .props
                .iter()
                .filter(|(_, value)| value.is_dynamic())
                .cloned()
                .collect(),
            nested: self
                .nested
                .iter()
                .filter_map(|(selector, block)| {
                    block.dynamic_part().map(|part| (selector.clone(), part))
                })
                .collect(),
        })
    }
}

/// The per-instance part of one logical key
#[derive(Clone)]
pub enum DynamicStyle {
    /// The whole rule is a function of instance data
    Rule(DynamicBlockFn),
    /// Only some properties of a static rule are functions of instance data
    Props(Block),
}

impl DynamicStyle {
    /// Produce the block to compile for the given data
    pub fn block(&self, data: &Value) -> Block {
        match self {
            DynamicStyle::Rule(f) => f(data),
            DynamicStyle::Props(block) => block.clone(),
        }
    }
}

impl fmt::Debug for DynamicStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicStyle::Rule(_) => f.write_str("Rule(<fn>)"),
            DynamicStyle::Props(block) => f.debug_tuple("Props").field(block).finish(),
        }
    }
}

/// One logical key of a definition
#[derive(Clone)]
pub enum StyleEntry {
    Static(Block),
    Dynamic(DynamicBlockFn),
}

impl StyleEntry {
    /// The part compiled once into the shared sheet
    pub fn static_part(&self) -> Block {
        match self {
            StyleEntry::Static(block) => block.static_part(),
            StyleEntry::Dynamic(_) => Block::new(),
        }
    }

    /// The part compiled per instance, if any
    pub fn dynamic_style(&self) -> Option<DynamicStyle> {
        match self {
            StyleEntry::Static(block) => block.dynamic_part().map(DynamicStyle::Props),
            StyleEntry::Dynamic(f) => Some(DynamicStyle::Rule(f.clone())),
        }
    }
}

impl fmt::Debug for StyleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleEntry::Static(block) => f.debug_tuple("Static").field(block).finish(),
            StyleEntry::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

/// Ordered mapping from logical key to entry
#[derive(Debug, Clone, Default)]
pub struct Styles {
    entries: Vec<(String, StyleEntry)>,
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule with a (mostly) static block
    pub fn rule(mut self, key: impl Into<String>, block: Block) -> Self {
        self.entries.push((key.into(), StyleEntry::Static(block)));
        self
    }

    /// Add a rule computed entirely from instance data
    pub fn dynamic<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Block + Send + Sync + 'static,
    {
        self.entries
            .push((key.into(), StyleEntry::Dynamic(Arc::new(f))));
        self
    }

    pub fn entries(&self) -> &[(String, StyleEntry)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_dynamic(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, entry)| entry.dynamic_style().is_some())
    }
}

enum StyleSource {
    Static(Styles),
    Themed(ThemedStylesFn),
}

/// A style definition with reference identity
pub struct StyleDefinition {
    id: DefinitionId,
    source: StyleSource,
}

impl StyleDefinition {
    /// A definition that does not depend on the theme
    pub fn new(styles: Styles) -> Arc<Self> {
        Arc::new(StyleDefinition {
            id: DefinitionId::next(),
            source: StyleSource::Static(styles),
        })
    }

    /// A definition computed from the resolved theme
    pub fn themed<F>(f: F) -> Arc<Self>
    where
        F: Fn(&Theme) -> Styles + Send + Sync + 'static,
    {
        Arc::new(StyleDefinition {
            id: DefinitionId::next(),
            source: StyleSource::Themed(Arc::new(f)),
        })
    }

    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn is_theme_dependent(&self) -> bool {
        matches!(self.source, StyleSource::Themed(_))
    }

    /// Materialize the styles for a theme
    pub fn styles_for(&self, theme: &Theme) -> Styles {
        match &self.source {
            StyleSource::Static(styles) => styles.clone(),
            StyleSource::Themed(f) => f(theme),
        }
    }
}

impl fmt::Debug for StyleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleDefinition")
            .field("id", &self.id)
            .field("theme_dependent", &self.is_theme_dependent())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restyle_types::no_theme;
    use serde_json::json;

    fn active_color(data: &Value) -> Option<CssValue> {
        let active = data.get("active").and_then(Value::as_bool).unwrap_or(false);
        Some(if active { "red" } else { "blue" }.into())
    }

    #[test]
    fn static_and_dynamic_parts_split() {
        let block = Block::new()
            .prop("margin", 0)
            .dynamic_prop("color", active_color)
            .nest("&:hover", Block::new().prop("fontSize", 60));

        assert!(block.has_dynamic());

        let fixed = block.static_part();
        assert_eq!(fixed.props().len(), 1);
        assert_eq!(fixed.nested().len(), 1);

        let dynamic = block.dynamic_part().unwrap();
        assert_eq!(dynamic.props().len(), 1);
        assert!(dynamic.nested().is_empty());
    }

    #[test]
    fn static_block_has_no_dynamic_part() {
        let block = Block::new().prop("color", "green");
        assert!(block.dynamic_part().is_none());
    }

    #[test]
    fn dynamic_entry_has_empty_static_part() {
        let styles = Styles::new().dynamic("item", |_| Block::new().prop("color", "red"));
        let (_, entry) = &styles.entries()[0];
        assert!(entry.static_part().is_empty());
        assert!(matches!(entry.dynamic_style(), Some(DynamicStyle::Rule(_))));
        assert!(styles.has_dynamic());
    }

    #[test]
    fn definitions_have_identity() {
        let a = StyleDefinition::new(Styles::new().rule("a", Block::new()));
        let b = StyleDefinition::new(Styles::new().rule("a", Block::new()));
        assert_ne!(a.id(), b.id());
        assert!(!a.is_theme_dependent());
    }

    #[test]
    fn themed_definition_reads_theme() {
        let def = StyleDefinition::themed(|theme| {
            let color = theme.get_str("primary").unwrap_or("green").to_string();
            Styles::new().rule("button", Block::new().prop("color", color))
        });
        assert!(def.is_theme_dependent());

        let styles = def.styles_for(&Theme::new(json!({"primary": "blue"})));
        assert_eq!(styles.keys().collect::<Vec<_>>(), vec!["button"]);
        assert_eq!(def.styles_for(&no_theme()).len(), 1);
    }
}
