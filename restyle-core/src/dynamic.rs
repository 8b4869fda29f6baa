//! Per-instance dynamic rules
//!
//! Instances of the same definition share one sheet, but each instance's
//! function-valued styles produce their own rules appended to that sheet.
//! The flow for one mount is:
//!
//! 1. [`reserve_class_names`] during render, so the class map can already
//!    name the rules before they exist;
//! 2. [`add_rules`] at acquisition, creating one rule per dynamic key;
//! 3. [`update_rules`] whenever the instance data changes, rewriting the
//!    bodies in place;
//! 4. [`remove_rules`] at release.
//!
//! Every step accepts a missing sheet or an empty set and does nothing.

use crate::compiler::compile_body;
use crate::sheet::Sheet;
use restyle_types::{RuleId, SheetId};
use serde_json::Value;
use tracing::debug;

/// Class name reserved for one dynamic key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicClassName {
    /// Dynamic rule key, `{key}-d{n}`
    pub key: String,
    /// Generated class name
    pub id: String,
}

/// Reserved names for every dynamic key of a sheet, for one instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicClassNames {
    names: Vec<(String, DynamicClassName)>,
}

impl DynamicClassNames {
    pub fn get(&self, key: &str) -> Option<&DynamicClassName> {
        self.names.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DynamicClassName)> {
        self.names.iter().map(|(k, n)| (k.as_str(), n))
    }
}

/// One rule created for an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicRule {
    pub logical_key: String,
    pub rule_id: RuleId,
    pub rule_key: String,
    pub class_name: String,
}

/// The rules one instance added to one sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicRuleSet {
    sheet: SheetId,
    rules: Vec<DynamicRule>,
}

impl DynamicRuleSet {
    pub fn sheet(&self) -> SheetId {
        self.sheet
    }

    pub fn rules(&self) -> &[DynamicRule] {
        &self.rules
    }

    pub fn get(&self, logical_key: &str) -> Option<&DynamicRule> {
        self.rules.iter().find(|r| r.logical_key == logical_key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Reserve rule keys and class names for a new instance of `sheet`
///
/// Returns `None` when there is no sheet or the sheet has no dynamic styles.
pub fn reserve_class_names(sheet: Option<&Sheet>) -> Option<DynamicClassNames> {
    let sheet = sheet?;
    if !sheet.has_dynamic_styles() {
        return None;
    }

    let names = sheet
        .dynamic_styles()
        .iter()
        .map(|(key, _)| {
            let rule_key = sheet.next_dynamic_key(key);
            let id = sheet.generate_id(&rule_key);
            (key.clone(), DynamicClassName { key: rule_key, id })
        })
        .collect();

    Some(DynamicClassNames { names })
}

/// Compile one rule per dynamic key of `sheet` from `data`
///
/// Names reserved in `reserved` are used when present; keys without a
/// reservation get fresh ones.
pub fn add_rules(
    sheet: Option<&Sheet>,
    data: &Value,
    reserved: Option<&DynamicClassNames>,
) -> Option<DynamicRuleSet> {
    let sheet = sheet?;
    if !sheet.has_dynamic_styles() {
        return None;
    }

    let rules = sheet
        .dynamic_styles()
        .iter()
        .map(|(key, style)| {
            let name = match reserved.and_then(|names| names.get(key)) {
                Some(name) => name.clone(),
                None => {
                    let rule_key = sheet.next_dynamic_key(key);
                    let id = sheet.generate_id(&rule_key);
                    DynamicClassName { key: rule_key, id }
                }
            };
            let body = compile_body(&style.block(data), Some(data));
            let rule_id = sheet.add_rule(name.key.clone(), name.id.clone(), body);
            DynamicRule {
                logical_key: key.clone(),
                rule_id,
                rule_key: name.key,
                class_name: name.id,
            }
        })
        .collect();

    Some(DynamicRuleSet {
        sheet: sheet.id(),
        rules,
    })
}

/// Recompute every rule of `rules` from new `data`, in place
///
/// Rule ids and class names are untouched. Rules that no longer exist are
/// skipped.
pub fn update_rules(data: &Value, sheet: Option<&Sheet>, rules: Option<&DynamicRuleSet>) {
    let (Some(sheet), Some(rules)) = (sheet, rules) else {
        return;
    };
    if rules.sheet != sheet.id() {
        debug!(sheet = %sheet.id(), owner = %rules.sheet, "ignoring update for rules of another sheet");
        return;
    }

    for rule in &rules.rules {
        let Some(style) = sheet.dynamic_style(&rule.logical_key) else {
            continue;
        };
        let body = compile_body(&style.block(data), Some(data));
        if !sheet.update_rule(rule.rule_id, body) {
            debug!(sheet = %sheet.id(), rule = %rule.rule_key, "ignoring update of removed rule");
        }
    }
}

/// Delete every rule of `rules` from `sheet`
pub fn remove_rules(sheet: Option<&Sheet>, rules: Option<DynamicRuleSet>) {
    let (Some(sheet), Some(rules)) = (sheet, rules) else {
        return;
    };
    if rules.sheet != sheet.id() {
        debug!(sheet = %sheet.id(), owner = %rules.sheet, "ignoring removal of rules of another sheet");
        return;
    }

    for rule in rules.rules {
        if !sheet.remove_rule(rule.rule_id) {
            debug!(sheet = %sheet.id(), rule = %rule.rule_key, "rule already removed");
        }
    }
}
