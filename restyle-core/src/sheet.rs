//! Compiled sheets
//!
//! A [`Sheet`] holds the static rules compiled from one `(definition, theme)`
//! pair plus whatever dynamic rules mounted instances have appended. The
//! static part never changes after [`SheetBuilder::build`]; dynamic rules are
//! added, rewritten and removed through the crate-internal rule API used by
//! [`crate::dynamic`].

use crate::compiler::IdGenerator;
use crate::definition::DynamicStyle;
use parking_lot::RwLock;
use restyle_types::{ClassNameMap, DefinitionId, RuleId, SheetId, ThemeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A single rendered `property: value` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Declaration {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Compiled declarations of a rule and its nested blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBody {
    pub declarations: Vec<Declaration>,
    pub nested: Vec<NestedRule>,
}

/// A nested block; `&` in `selector` is replaced by the parent selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedRule {
    pub selector: String,
    pub body: RuleBody,
}

impl RuleBody {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.nested.is_empty()
    }

    /// Render this body under `selector`, parent block first
    pub fn write_css(&self, selector: &str, out: &mut Vec<String>) {
        if self.declarations.is_empty() {
            out.push(format!("{selector} {{}}"));
        } else {
            let mut block = format!("{selector} {{\n");
            for decl in &self.declarations {
                block.push_str(&format!("  {}: {};\n", decl.property, decl.value));
            }
            block.push('}');
            out.push(block);
        }

        for nested in &self.nested {
            let nested_selector = nested.selector.replace('&', selector);
            nested.body.write_css(&nested_selector, out);
        }
    }
}

/// A rule owned by a sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    /// Logical key (`button`) or dynamic rule key (`button-d0`)
    pub key: String,
    pub class_name: String,
    pub body: RuleBody,
}

impl Rule {
    pub fn selector(&self) -> String {
        format!(".{}", self.class_name)
    }

    pub fn to_css(&self) -> String {
        let mut blocks = Vec::new();
        self.body.write_css(&self.selector(), &mut blocks);
        blocks.join("\n")
    }
}

/// Construction-time options of a sheet
#[derive(Clone)]
pub struct SheetOptions {
    /// Ordering index inside the registry
    pub index: i64,
    /// Human-readable name, used as a class-name prefix
    pub name: Option<String>,
    pub generator: Arc<dyn IdGenerator>,
}

impl fmt::Debug for SheetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetOptions")
            .field("index", &self.index)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct SheetState {
    rules: Vec<Rule>,
    classes: HashMap<String, String>,
    next_rule_id: u64,
    next_dynamic: u64,
    attached: bool,
}

impl SheetState {
    fn push_rule(&mut self, key: String, class_name: String, body: RuleBody) -> RuleId {
        let id = RuleId(self.next_rule_id);
        self.next_rule_id += 1;
        self.classes.insert(key.clone(), class_name.clone());
        self.rules.push(Rule {
            id,
            key,
            class_name,
            body,
        });
        id
    }
}

/// Compiled artifact of `(definition, theme)`
pub struct Sheet {
    id: SheetId,
    definition: DefinitionId,
    theme: ThemeId,
    options: SheetOptions,
    static_keys: Vec<String>,
    dynamic_styles: Vec<(String, DynamicStyle)>,
    static_classes: Arc<ClassNameMap>,
    state: RwLock<SheetState>,
}

impl Sheet {
    pub fn builder(definition: DefinitionId, theme: ThemeId, options: SheetOptions) -> SheetBuilder {
        SheetBuilder {
            definition,
            theme,
            options,
            state: SheetState::default(),
            static_keys: Vec::new(),
            dynamic_styles: Vec::new(),
        }
    }

    pub fn id(&self) -> SheetId {
        self.id
    }

    pub fn definition(&self) -> DefinitionId {
        self.definition
    }

    pub fn theme(&self) -> ThemeId {
        self.theme
    }

    pub fn index(&self) -> i64 {
        self.options.index
    }

    pub fn name(&self) -> Option<&str> {
        self.options.name.as_deref()
    }

    /// Logical keys of the static rules, in definition order
    pub fn static_keys(&self) -> &[String] {
        &self.static_keys
    }

    /// The static class map; the same allocation for the sheet's lifetime
    pub fn static_classes(&self) -> Arc<ClassNameMap> {
        self.static_classes.clone()
    }

    pub fn dynamic_styles(&self) -> &[(String, DynamicStyle)] {
        &self.dynamic_styles
    }

    pub fn dynamic_style(&self, key: &str) -> Option<&DynamicStyle> {
        self.dynamic_styles
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, style)| style)
    }

    pub fn has_dynamic_styles(&self) -> bool {
        !self.dynamic_styles.is_empty()
    }

    pub fn is_attached(&self) -> bool {
        self.state.read().attached
    }

    pub(crate) fn set_attached(&self, attached: bool) {
        self.state.write().attached = attached;
    }

    /// Class name currently registered for a rule key
    pub fn class_for(&self, key: &str) -> Option<String> {
        self.state.read().classes.get(key).cloned()
    }

    pub fn rule_count(&self) -> usize {
        self.state.read().rules.len()
    }

    pub fn rule(&self, id: RuleId) -> Option<Rule> {
        self.state.read().rules.iter().find(|r| r.id == id).cloned()
    }

    pub fn rules(&self) -> Vec<Rule> {
        self.state.read().rules.clone()
    }

    pub fn generate_id(&self, rule_key: &str) -> String {
        self.options.generator.generate_id(rule_key, self.name())
    }

    /// Reserve the next dynamic rule key for a logical key
    pub(crate) fn next_dynamic_key(&self, key: &str) -> String {
        let mut state = self.state.write();
        let n = state.next_dynamic;
        state.next_dynamic += 1;
        format!("{key}-d{n}")
    }

    pub(crate) fn add_rule(&self, key: String, class_name: String, body: RuleBody) -> RuleId {
        self.state.write().push_rule(key, class_name, body)
    }

    /// Rewrite a rule's body; false if the rule no longer exists
    pub(crate) fn update_rule(&self, id: RuleId, body: RuleBody) -> bool {
        let mut state = self.state.write();
        match state.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.body = body;
                true
            }
            None => false,
        }
    }

    /// Delete a rule; false if it was already gone
    pub(crate) fn remove_rule(&self, id: RuleId) -> bool {
        let mut state = self.state.write();
        let Some(pos) = state.rules.iter().position(|r| r.id == id) else {
            return false;
        };
        let rule = state.rules.remove(pos);
        if state.classes.get(&rule.key) == Some(&rule.class_name) {
            state.classes.remove(&rule.key);
        }
        true
    }

    /// CSS text of every rule in order
    pub fn to_css(&self) -> String {
        let state = self.state.read();
        let mut blocks = Vec::new();
        for rule in &state.rules {
            rule.body.write_css(&rule.selector(), &mut blocks);
        }
        blocks.join("\n")
    }
}

impl fmt::Debug for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sheet")
            .field("id", &self.id)
            .field("index", &self.options.index)
            .field("definition", &self.definition)
            .field("theme", &self.theme)
            .field("rules", &self.rule_count())
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Assembles the static part of a [`Sheet`]
#[derive(Debug)]
pub struct SheetBuilder {
    definition: DefinitionId,
    theme: ThemeId,
    options: SheetOptions,
    state: SheetState,
    static_keys: Vec<String>,
    dynamic_styles: Vec<(String, DynamicStyle)>,
}

impl SheetBuilder {
    /// Add a static rule for a logical key
    pub fn static_rule(
        mut self,
        key: impl Into<String>,
        class_name: impl Into<String>,
        body: RuleBody,
    ) -> Self {
        let key = key.into();
        self.static_keys.push(key.clone());
        self.state.push_rule(key, class_name.into(), body);
        self
    }

    /// Register the per-instance part of a logical key
    pub fn dynamic_style(mut self, key: impl Into<String>, style: DynamicStyle) -> Self {
        self.dynamic_styles.push((key.into(), style));
        self
    }

    pub fn build(self) -> Sheet {
        let static_classes = self
            .static_keys
            .iter()
            .filter_map(|key| {
                self.state
                    .classes
                    .get(key)
                    .map(|class_name| (key.clone(), class_name.clone()))
            })
            .collect::<ClassNameMap>();

        Sheet {
            id: SheetId::next(),
            definition: self.definition,
            theme: self.theme,
            options: self.options,
            static_keys: self.static_keys,
            dynamic_styles: self.dynamic_styles,
            static_classes: Arc::new(static_classes),
            state: RwLock::new(self.state),
        }
    }
}
