//! Lifecycle adapter
//!
//! A [`StyleHook`] is one call-site: a definition plus its options and its
//! ordering index. Each mounted component gets a [`StyleInstance`] from it,
//! which the host drives through the phases of its render cycle:
//!
//! - [`render`](StyleInstance::render) on every render, returning the class
//!   map. Pure apart from filling the sheet cache (and, in SSR mode,
//!   acquiring immediately).
//! - [`setup`](StyleInstance::setup) at the acquisition point: manage the
//!   sheet, then add the dynamic rules.
//! - [`update`](StyleInstance::update) at the update point: rewrite the
//!   dynamic rules if the data changed since they were last computed. A
//!   setup computes them, so the update right after the first acquisition
//!   is always a no-op.
//! - [`cleanup`](StyleInstance::cleanup) at the release point: remove the
//!   dynamic rules, then unmanage the sheet.
//!
//! [`commit`](StyleInstance::commit) runs setup and update in order and is
//! what a host without its own effect scheduling should call after render.
//!
//! The instance holds at most one acquisition. A setup while one is already
//! held for the same sheet is collapsed into it, and a cleanup with none
//! held does nothing, so a host that runs setup twice before a single
//! cleanup still nets to zero.

use crate::classes;
use crate::compiler::IdGenerator;
use crate::context::StyleContext;
use crate::definition::StyleDefinition;
use crate::dynamic::{self, DynamicClassNames, DynamicRuleSet};
use crate::index::next_sheet_index;
use crate::sheet::{Sheet, SheetOptions};
use crate::theme::{resolve_theme, ThemeProvider};
use restyle_types::{ClassNameMap, Theme};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Per-call-site options
#[derive(Clone, Default)]
pub struct StyleOptions {
    index: Option<i64>,
    name: Option<String>,
    generator: Option<Arc<dyn IdGenerator>>,
    theming: Option<Arc<dyn ThemeProvider>>,
}

impl StyleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit ordering index; allocated automatically otherwise
    pub fn index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }

    /// Human-readable name, used as a class-name prefix
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Generate class names with a closure over the rule key
    pub fn generate_id<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.generator(Arc::new(crate::compiler::FnIdGenerator(f)))
    }

    /// Read the ambient theme from this provider instead of the context
    pub fn theming(mut self, provider: Arc<dyn ThemeProvider>) -> Self {
        self.theming = Some(provider);
        self
    }
}

impl fmt::Debug for StyleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleOptions")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("theming", &self.theming)
            .finish_non_exhaustive()
    }
}

/// One style call-site
#[derive(Debug)]
pub struct StyleHook {
    definition: Arc<StyleDefinition>,
    index: i64,
    options: StyleOptions,
}

impl StyleHook {
    pub fn new(definition: Arc<StyleDefinition>, options: StyleOptions) -> Arc<Self> {
        let index = options.index.unwrap_or_else(next_sheet_index);
        Arc::new(StyleHook {
            definition,
            index,
            options,
        })
    }

    pub fn definition(&self) -> &Arc<StyleDefinition> {
        &self.definition
    }

    pub fn index(&self) -> i64 {
        self.index
    }

    /// Create a new instance bound to `context`
    pub fn mount(self: &Arc<Self>, context: &Arc<StyleContext>) -> StyleInstance {
        StyleInstance {
            hook: self.clone(),
            context: context.clone(),
            memo: None,
            data: Value::Null,
            data_changed: false,
            acquisition: None,
        }
    }

    fn sheet_options(&self, context: &StyleContext) -> SheetOptions {
        SheetOptions {
            index: self.index,
            name: self.options.name.clone(),
            generator: self
                .options
                .generator
                .clone()
                .unwrap_or_else(|| context.id_generator()),
        }
    }
}

/// Values derived during render, recomputed only when the theme changes
#[derive(Debug)]
struct RenderMemo {
    theme: Arc<Theme>,
    sheet: Option<Arc<Sheet>>,
    names: Option<Arc<DynamicClassNames>>,
    classes: Arc<ClassNameMap>,
}

/// What one setup took, undone by the matching cleanup
#[derive(Debug)]
struct Acquisition {
    sheet: Arc<Sheet>,
    theme: Arc<Theme>,
    rules: Option<DynamicRuleSet>,
}

/// One mounted consumer of a [`StyleHook`]
///
/// Dropping the instance runs [`cleanup`](Self::cleanup).
#[derive(Debug)]
pub struct StyleInstance {
    hook: Arc<StyleHook>,
    context: Arc<StyleContext>,
    memo: Option<RenderMemo>,
    data: Value,
    data_changed: bool,
    acquisition: Option<Acquisition>,
}

impl StyleInstance {
    /// Resolve the class map for this render
    ///
    /// Returns the same `Arc` as the previous render unless the resolved
    /// theme changed. Data changes never change the map: dynamic rules keep
    /// their class names and are rewritten at the update point instead.
    pub fn render(&mut self, data: &Value, theme: Option<&Arc<Theme>>) -> Arc<ClassNameMap> {
        if *data != self.data {
            self.data = data.clone();
            self.data_changed = true;
        }

        let theme = self.resolve_theme(theme);
        let reuse = self
            .memo
            .as_ref()
            .is_some_and(|memo| memo.theme.id() == theme.id());

        if !reuse {
            let hook = &self.hook;
            let sheet = self.context.sheet_for(
                &hook.definition,
                &theme,
                &hook.sheet_options(&self.context),
            );
            let names = dynamic::reserve_class_names(sheet.as_deref()).map(Arc::new);
            let classes = classes::resolve(sheet.as_deref(), names.as_deref());
            self.memo = Some(RenderMemo {
                theme,
                sheet,
                names,
                classes,
            });

            if self.context.is_ssr() {
                self.setup();
            }
        }

        match &self.memo {
            Some(memo) => memo.classes.clone(),
            None => restyle_types::empty_class_map(),
        }
    }

    /// Acquisition point: manage the sheet and add this instance's rules
    ///
    /// When the last render produced no sheet, any acquisition still held for
    /// an earlier one is released instead.
    pub fn setup(&mut self) {
        let Some(sheet) = self.memo.as_ref().and_then(|memo| memo.sheet.clone()) else {
            self.cleanup();
            return;
        };

        if let Some(held) = &self.acquisition {
            let same_theme = self
                .memo
                .as_ref()
                .is_some_and(|memo| memo.theme.id() == held.theme.id());
            if held.sheet.id() == sheet.id() && same_theme {
                self.context.metrics().record_collapsed_setup();
                debug!(sheet = %sheet.id(), "collapsing repeated setup");
                return;
            }
            self.cleanup();
        }

        let Some(memo) = &self.memo else {
            return;
        };
        let theme = memo.theme.clone();
        let names = memo.names.clone();

        self.context.manage_sheet(self.hook.index, &theme, &sheet);
        let rules = dynamic::add_rules(Some(&sheet), &self.data, names.as_deref());
        self.data_changed = false;
        self.acquisition = Some(Acquisition {
            sheet,
            theme,
            rules,
        });
    }

    /// Update point: rewrite dynamic rules if the data changed since they
    /// were last computed
    ///
    /// Without an acquisition there is nothing to rewrite; the pending data
    /// is picked up by the next setup.
    pub fn update(&mut self) {
        let Some(held) = &self.acquisition else {
            return;
        };
        if !self.data_changed {
            return;
        }
        dynamic::update_rules(&self.data, Some(&held.sheet), held.rules.as_ref());
        self.data_changed = false;
    }

    /// Release point: remove dynamic rules, then unmanage the sheet
    pub fn cleanup(&mut self) {
        let Some(held) = self.acquisition.take() else {
            return;
        };
        dynamic::remove_rules(Some(&held.sheet), held.rules);
        self.context
            .unmanage_sheet(self.hook.index, &held.theme, &held.sheet);
    }

    /// Setup followed by update
    pub fn commit(&mut self) {
        self.setup();
        self.update();
    }

    /// Cleanup and discard the instance
    pub fn unmount(mut self) {
        self.cleanup();
    }

    /// The sheet this instance currently renders against
    pub fn sheet(&self) -> Option<&Arc<Sheet>> {
        self.memo.as_ref().and_then(|memo| memo.sheet.as_ref())
    }

    /// The theme resolved at the last render
    pub fn theme(&self) -> Option<&Arc<Theme>> {
        self.memo.as_ref().map(|memo| &memo.theme)
    }

    /// The dynamic rules held by the current acquisition
    pub fn dynamic_rules(&self) -> Option<&DynamicRuleSet> {
        self.acquisition.as_ref().and_then(|held| held.rules.as_ref())
    }

    pub fn is_acquired(&self) -> bool {
        self.acquisition.is_some()
    }

    fn resolve_theme(&self, explicit: Option<&Arc<Theme>>) -> Arc<Theme> {
        let definition = &self.hook.definition;
        match &self.hook.options.theming {
            Some(provider) => resolve_theme(definition, explicit, provider.as_ref()),
            None => resolve_theme(definition, explicit, self.context.theme()),
        }
    }
}

impl Drop for StyleInstance {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextConfig;
    use crate::definition::{Block, Styles};
    use serde_json::json;

    fn item_hook() -> Arc<StyleHook> {
        let def = StyleDefinition::new(Styles::new().dynamic("item", |data: &Value| {
            Block::new().prop("color", data["color"].as_str().unwrap_or("black").to_string())
        }));
        StyleHook::new(def, StyleOptions::new().generate_id(|key| format!("{key}-id")))
    }

    #[test]
    fn render_is_side_effect_free_outside_ssr() {
        let ctx = StyleContext::new(ContextConfig::default());
        let mut inst = item_hook().mount(&ctx);

        let classes = inst.render(&json!({"color": "red"}), None);
        assert_eq!(classes.get("item"), Some("item-id item-d0-id"));
        assert!(ctx.registry().is_empty());
        assert!(!inst.is_acquired());

        inst.commit();
        assert_eq!(ctx.registry().len(), 1);
        assert_eq!(inst.dynamic_rules().map(|r| r.len()), Some(1));
    }

    #[test]
    fn repeated_setup_is_collapsed() {
        let ctx = StyleContext::new(ContextConfig::default());
        let mut inst = item_hook().mount(&ctx);
        inst.render(&json!({}), None);

        inst.setup();
        inst.setup();
        let sheet = inst.sheet().unwrap().clone();
        assert_eq!(ctx.ref_count(&sheet, inst.theme().unwrap()), 1);
        assert_eq!(sheet.rule_count(), 2);
        assert_eq!(ctx.metrics().snapshot().collapsed_setups, 1);

        inst.cleanup();
        inst.cleanup();
        assert!(ctx.registry().is_empty());
        assert_eq!(sheet.rule_count(), 1);
    }

    #[test]
    fn update_before_acquisition_is_a_noop() {
        let ctx = StyleContext::new(ContextConfig::default());
        let mut inst = item_hook().mount(&ctx);
        inst.render(&json!({"color": "red"}), None);
        inst.update();
        assert!(!inst.is_acquired());

        inst.commit();
        inst.render(&json!({"color": "blue"}), None);
        inst.commit();
        assert!(ctx.registry().to_css().contains("color: blue;"));
    }

    #[test]
    fn update_applies_without_commit() {
        let ctx = StyleContext::new(ContextConfig::default());
        let mut inst = item_hook().mount(&ctx);

        inst.render(&json!({"color": "red"}), None);
        inst.setup();
        inst.update();
        inst.render(&json!({"color": "blue"}), None);
        inst.update();

        let css = ctx.registry().to_css();
        assert!(css.contains(".item-d0-id {\n  color: blue;\n}"));
        assert!(!css.contains("color: red;"));
    }

    #[test]
    fn setup_without_sheet_releases_held_one() {
        let def = StyleDefinition::themed(|theme: &Theme| {
            let key = if theme.get("broken").is_some() { "" } else { "item" };
            Styles::new().rule(key, Block::new().prop("color", "red"))
        });
        let hook = StyleHook::new(def, StyleOptions::new());
        let ctx = StyleContext::new(ContextConfig::default());
        let mut inst = hook.mount(&ctx);

        inst.render(&json!({}), Some(&Theme::new(json!({}))));
        inst.commit();
        assert_eq!(ctx.registry().len(), 1);

        let classes = inst.render(&json!({}), Some(&Theme::new(json!({"broken": true}))));
        assert!(classes.is_empty());
        inst.commit();
        assert!(!inst.is_acquired());
        assert!(ctx.registry().is_empty());
        assert_eq!(ctx.registrations(), 0);
    }

    #[test]
    fn ssr_acquires_during_render() {
        let ctx = StyleContext::new(ContextConfig::ssr());
        let mut inst = item_hook().mount(&ctx);
        inst.render(&json!({"color": "red"}), None);
        assert_eq!(ctx.registry().len(), 1);
        assert!(ctx.registry().to_css().contains("color: red;"));

        inst.commit();
        assert_eq!(ctx.metrics().snapshot().collapsed_setups, 1);

        drop(inst);
        assert!(ctx.registry().is_empty());
    }

    #[test]
    fn drop_releases() {
        let ctx = StyleContext::new(ContextConfig::default());
        {
            let mut inst = item_hook().mount(&ctx);
            inst.render(&json!({}), None);
            inst.commit();
            assert_eq!(ctx.registrations(), 1);
        }
        assert_eq!(ctx.registrations(), 0);
        assert!(ctx.registry().is_empty());
    }
}
