//! Style compilation
//!
//! The [`StyleCompiler`] trait is the seam between the lifecycle core and
//! whatever turns definitions into CSS. [`CssCompiler`] is the built-in
//! implementation: it validates the definition, renders property names in
//! kebab-case, appends `px` to unitful numbers, and splits every key into a
//! shared static rule plus an optional per-instance [`DynamicStyle`].

use crate::definition::{Block, CssValue, DynamicStyle, PropValue, StyleDefinition};
use crate::error::CompileError;
use crate::sheet::{Declaration, NestedRule, RuleBody, Sheet, SheetOptions};
use restyle_types::Theme;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Properties that take bare numbers
const UNITLESS: &[&str] = &[
    "opacity",
    "z-index",
    "line-height",
    "flex",
    "flex-grow",
    "flex-shrink",
    "font-weight",
    "order",
    "zoom",
];

/// Generates class names for rules
pub trait IdGenerator: Send + Sync {
    /// `rule_key` is the logical key or dynamic rule key; `sheet_name` is the
    /// optional name of the owning sheet
    fn generate_id(&self, rule_key: &str, sheet_name: Option<&str>) -> String;
}

/// Adapts a plain closure over the rule key
pub struct FnIdGenerator<F>(pub F);

impl<F> fmt::Debug for FnIdGenerator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnIdGenerator(..)")
    }
}

impl<F> IdGenerator for FnIdGenerator<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn generate_id(&self, rule_key: &str, _sheet_name: Option<&str>) -> String {
        (self.0)(rule_key)
    }
}

/// Counter-based generator used when a call-site supplies none
///
/// Produces `{prefix}{name}-{key}-{n}`, or `{prefix}c{n}` when minifying.
#[derive(Debug)]
pub struct DefaultIdGenerator {
    prefix: String,
    minify: bool,
    counter: AtomicU64,
}

impl DefaultIdGenerator {
    pub fn new(prefix: impl Into<String>, minify: bool) -> Self {
        DefaultIdGenerator {
            prefix: prefix.into(),
            minify,
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for DefaultIdGenerator {
    fn generate_id(&self, rule_key: &str, sheet_name: Option<&str>) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        if self.minify {
            return format!("{}c{}", self.prefix, n);
        }
        match sheet_name {
            Some(name) => format!("{}{}-{}-{}", self.prefix, name, rule_key, n),
            None => format!("{}{}-{}", self.prefix, rule_key, n),
        }
    }
}

/// Turns a definition and a theme into a sheet
pub trait StyleCompiler: Send + Sync + fmt::Debug {
    fn compile(
        &self,
        definition: &StyleDefinition,
        theme: &Theme,
        options: &SheetOptions,
    ) -> Result<Sheet, CompileError>;
}

/// The built-in compiler
#[derive(Debug, Default, Clone, Copy)]
pub struct CssCompiler;

impl StyleCompiler for CssCompiler {
    fn compile(
        &self,
        definition: &StyleDefinition,
        theme: &Theme,
        options: &SheetOptions,
    ) -> Result<Sheet, CompileError> {
        let styles = definition.styles_for(theme);
        let mut seen = HashSet::new();
        let mut builder = Sheet::builder(definition.id(), theme.id(), options.clone());

        for (key, entry) in styles.entries() {
            if key.is_empty() {
                return Err(CompileError::EmptyKey);
            }
            if !seen.insert(key.as_str()) {
                return Err(CompileError::DuplicateKey(key.clone()));
            }

            let fixed = entry.static_part();
            validate_block(key, &fixed)?;
            if let Some(dynamic) = entry.dynamic_style() {
                if let DynamicStyle::Props(block) = &dynamic {
                    validate_block(key, block)?;
                }
                builder = builder.dynamic_style(key.clone(), dynamic);
            }

            let class_name = options.generator.generate_id(key, options.name.as_deref());
            builder = builder.static_rule(key.clone(), class_name, compile_body(&fixed, None));
        }

        Ok(builder.build())
    }
}

fn validate_block(key: &str, block: &Block) -> Result<(), CompileError> {
    for (property, _) in block.props() {
        let invalid = property.is_empty()
            || property
                .chars()
                .any(|c| matches!(c, ':' | ';' | '{' | '}') || c.is_whitespace());
        if invalid {
            return Err(CompileError::InvalidProperty {
                key: key.to_string(),
                property: property.clone(),
            });
        }
    }
    for (selector, nested) in block.nested() {
        if !selector.contains('&') {
            return Err(CompileError::InvalidSelector {
                key: key.to_string(),
                selector: selector.clone(),
            });
        }
        validate_block(key, nested)?;
    }
    Ok(())
}

/// Compile a block into declarations
///
/// Function-valued properties are evaluated against `data`; with no data, or
/// when the function yields `None`, the property is dropped. Empty nested
/// blocks are dropped too.
pub fn compile_body(block: &Block, data: Option<&Value>) -> RuleBody {
    let declarations = block
        .props()
        .iter()
        .filter_map(|(name, value)| {
            let value = match value {
                PropValue::Static(value) => value.clone(),
                PropValue::Dynamic(f) => f(data?)?,
            };
            let property = property_name(name);
            let rendered = format_value(&property, &value);
            Some(Declaration::new(property, rendered))
        })
        .collect();

    let nested = block
        .nested()
        .iter()
        .map(|(selector, nested)| NestedRule {
            selector: selector.clone(),
            body: compile_body(nested, data),
        })
        .filter(|rule| !rule.body.is_empty())
        .collect();

    RuleBody {
        declarations,
        nested,
    }
}

/// `fontSize` -> `font-size`; names already hyphenated pass through
pub fn property_name(name: &str) -> String {
    if name.contains('-') {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Render a value, adding `px` to non-zero numbers of unitful properties
pub fn format_value(property: &str, value: &CssValue) -> String {
    match value {
        CssValue::Str(s) => s.clone(),
        CssValue::Number(n) => {
            let number = if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            };
            if *n == 0.0 || UNITLESS.contains(&property) {
                number
            } else {
                format!("{number}px")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Styles;
    use restyle_types::no_theme;
    use serde_json::json;
    use std::sync::Arc;

    fn options(generator: impl Fn(&str) -> String + Send + Sync + 'static) -> SheetOptions {
        SheetOptions {
            index: 0,
            name: None,
            generator: Arc::new(FnIdGenerator(generator)),
        }
    }

    #[test]
    fn compiles_static_definition() {
        let def = StyleDefinition::new(
            Styles::new().rule("button", Block::new().prop("color", "green")),
        );
        let sheet = CssCompiler
            .compile(&def, &no_theme(), &options(|_| "button".to_string()))
            .unwrap();

        assert_eq!(sheet.to_css(), ".button {\n  color: green;\n}");
        assert!(!sheet.has_dynamic_styles());
        assert_eq!(sheet.static_classes().get("button"), Some("button"));
    }

    #[test]
    fn dynamic_entries_leave_an_empty_static_rule() {
        let def = StyleDefinition::new(
            Styles::new().dynamic("item", |_| Block::new().prop("color", "red")),
        );
        let sheet = CssCompiler
            .compile(&def, &no_theme(), &options(|key| format!("{key}-id")))
            .unwrap();

        assert_eq!(sheet.to_css(), ".item-id {}");
        assert!(sheet.dynamic_style("item").is_some());
    }

    #[test]
    fn rejects_bad_definitions() {
        let def = StyleDefinition::new(
            Styles::new().rule("a", Block::new().prop("color: red", "x")),
        );
        let err = CssCompiler
            .compile(&def, &no_theme(), &options(|k| k.to_string()))
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidProperty { .. }));

        let def = StyleDefinition::new(
            Styles::new().rule("a", Block::new().nest(":hover", Block::new().prop("color", "red"))),
        );
        let err = CssCompiler
            .compile(&def, &no_theme(), &options(|k| k.to_string()))
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidSelector { .. }));

        let def = StyleDefinition::new(
            Styles::new().rule("a", Block::new()).rule("a", Block::new()),
        );
        let err = CssCompiler
            .compile(&def, &no_theme(), &options(|k| k.to_string()))
            .unwrap_err();
        assert_eq!(err, CompileError::DuplicateKey("a".into()));
    }

    #[test]
    fn body_evaluates_dynamic_props() {
        let block = Block::new()
            .prop("fontSize", 60)
            .dynamic_prop("color", |data: &Value| {
                data.get("color").and_then(Value::as_str).map(CssValue::from)
            });

        let body = compile_body(&block, Some(&json!({"color": "red"})));
        assert_eq!(
            body.declarations,
            vec![
                Declaration::new("font-size", "60px"),
                Declaration::new("color", "red"),
            ]
        );

        let body = compile_body(&block, None);
        assert_eq!(body.declarations.len(), 1);
    }

    #[test]
    fn values_are_normalized() {
        assert_eq!(property_name("zIndex"), "z-index");
        assert_eq!(property_name("WebkitTransition"), "-webkit-transition");
        assert_eq!(property_name("font-size"), "font-size");
        assert_eq!(format_value("z-index", &CssValue::Number(3.0)), "3");
        assert_eq!(format_value("width", &CssValue::Number(1.5)), "1.5px");
        assert_eq!(format_value("margin", &CssValue::Number(0.0)), "0");
    }

    #[test]
    fn closure_generator_debug() {
        let generator = FnIdGenerator(|key: &str| key.to_uppercase());
        assert_eq!(format!("{generator:?}"), "FnIdGenerator(..)");
        assert_eq!(generator.generate_id("a", Some("ignored")), "A");
    }

    #[test]
    fn default_generator_formats() {
        let ids = DefaultIdGenerator::new("", false);
        assert_eq!(ids.generate_id("button", None), "button-0");
        assert_eq!(ids.generate_id("button", Some("Nav")), "Nav-button-1");

        let min = DefaultIdGenerator::new("x-", true);
        assert_eq!(min.generate_id("button", Some("Nav")), "x-c0");
    }
}
