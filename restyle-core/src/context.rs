//! The styling context
//!
//! A [`StyleContext`] bundles everything that is shared between instances:
//! the output [`Registry`], the [`SheetsManager`] deciding attachment, the
//! [`SheetCache`], the compiler, the default id generator and the ambient
//! theme slot. Instances bound to different contexts never share sheets.

use crate::cache::{SheetCache, SheetKey};
use crate::compiler::{CssCompiler, DefaultIdGenerator, IdGenerator, StyleCompiler};
use crate::config::ContextConfig;
use crate::definition::StyleDefinition;
use crate::manager::{Managed, SheetsManager, Unmanaged};
use crate::metrics::StyleMetrics;
use crate::registry::Registry;
use crate::sheet::{Sheet, SheetOptions};
use crate::theme::ThemeSlot;
use once_cell::sync::Lazy;
use restyle_types::{ContextId, Theme};
use std::sync::Arc;
use tracing::{debug, trace, warn};

static GLOBAL: Lazy<Arc<StyleContext>> = Lazy::new(|| StyleContext::new(ContextConfig::default()));

#[derive(Debug)]
pub struct StyleContext {
    id: ContextId,
    config: ContextConfig,
    registry: Arc<Registry>,
    manager: SheetsManager,
    cache: SheetCache,
    compiler: Arc<dyn StyleCompiler>,
    ids: Arc<DefaultIdGenerator>,
    theme: ThemeSlot,
    metrics: StyleMetrics,
}

impl StyleContext {
    /// Create a context using the built-in compiler
    pub fn new(config: ContextConfig) -> Arc<Self> {
        Self::with_compiler(config, Arc::new(CssCompiler))
    }

    pub fn with_compiler(config: ContextConfig, compiler: Arc<dyn StyleCompiler>) -> Arc<Self> {
        let registry = Arc::new(Registry::new());
        let ids = Arc::new(DefaultIdGenerator::new(
            config.class_name_prefix.clone(),
            config.minify,
        ));
        Arc::new(StyleContext {
            id: ContextId::next(),
            manager: SheetsManager::new(registry.clone()),
            registry,
            cache: SheetCache::new(),
            compiler,
            ids,
            theme: ThemeSlot::new(),
            metrics: StyleMetrics::new(),
            config,
        })
    }

    /// The process-wide default context
    pub fn global() -> Arc<Self> {
        GLOBAL.clone()
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn is_ssr(&self) -> bool {
        self.config.is_ssr
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn cache(&self) -> &SheetCache {
        &self.cache
    }

    /// The ambient theme, consulted by theme-dependent definitions
    pub fn theme(&self) -> &ThemeSlot {
        &self.theme
    }

    pub fn metrics(&self) -> &StyleMetrics {
        &self.metrics
    }

    /// The generator used by call-sites that bring none
    pub fn id_generator(&self) -> Arc<dyn IdGenerator> {
        self.ids.clone()
    }

    /// The memoized sheet for `(options.index, definition, theme)`
    ///
    /// Compiles on first access. Returns `None` when generation is disabled
    /// or the compiler declines the definition.
    pub fn sheet_for(
        &self,
        definition: &StyleDefinition,
        theme: &Theme,
        options: &SheetOptions,
    ) -> Option<Arc<Sheet>> {
        if self.config.disable_styles_generation {
            return None;
        }

        let key = SheetKey::new(options.index, definition.id(), theme.id());
        if let Some(sheet) = self.cache.get(&key) {
            self.metrics.record_hit();
            trace!(sheet = %sheet.id(), "sheet cache hit");
            return Some(sheet);
        }

        self.metrics.record_miss();
        match self.compiler.compile(definition, theme, options) {
            Ok(sheet) => {
                debug!(
                    sheet = %sheet.id(),
                    definition = %definition.id(),
                    theme = %theme.id(),
                    index = options.index,
                    "compiled sheet"
                );
                Some(self.cache.insert_if_absent(key, Arc::new(sheet)))
            }
            Err(err) => {
                self.metrics.record_compile_failure();
                warn!(definition = %definition.id(), "style compilation failed: {}", err);
                None
            }
        }
    }

    /// Take a reference on a sheet, attaching it on the first one
    pub fn manage_sheet(&self, index: i64, theme: &Theme, sheet: &Arc<Sheet>) {
        if let Managed::Attached = self.manager.manage(index, theme.id(), sheet) {
            self.metrics.record_attach();
        }
    }

    /// Drop a reference on a sheet, detaching it on the last one
    ///
    /// Detached sheets stay memoized, so an instance that rendered against
    /// one before the detach and one that renders after it still share it.
    pub fn unmanage_sheet(&self, index: i64, theme: &Theme, sheet: &Sheet) {
        match self.manager.unmanage(index, theme.id(), sheet) {
            Unmanaged::Detached(_) => self.metrics.record_detach(),
            Unmanaged::Released(_) => {}
            Unmanaged::Ignored => self.metrics.record_ignored_release(),
        }
    }

    /// Current reference count of a sheet under a theme
    pub fn ref_count(&self, sheet: &Sheet, theme: &Theme) -> usize {
        self.manager.ref_count(sheet, theme.id())
    }

    /// Number of live `(sheet, theme)` registrations
    pub fn registrations(&self) -> usize {
        self.manager.len()
    }

    /// Drop all shared state, for test isolation
    pub fn reset(&self) {
        self.manager.clear();
        self.registry.reset();
        self.cache.clear();
        self.theme.clear();
        self.metrics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::FnIdGenerator;
    use crate::definition::{Block, Styles};
    use restyle_types::no_theme;

    fn options(index: i64) -> SheetOptions {
        SheetOptions {
            index,
            name: None,
            generator: Arc::new(FnIdGenerator(|key: &str| key.to_string())),
        }
    }

    fn definition() -> Arc<StyleDefinition> {
        StyleDefinition::new(Styles::new().rule("button", Block::new().prop("color", "green")))
    }

    #[test]
    fn sheet_for_memoizes_by_identity() {
        let ctx = StyleContext::new(ContextConfig::default());
        let def = definition();
        let theme = no_theme();

        let a = ctx.sheet_for(&def, &theme, &options(0)).unwrap();
        let b = ctx.sheet_for(&def, &theme, &options(0)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let other = ctx.sheet_for(&definition(), &theme, &options(0)).unwrap();
        assert!(!Arc::ptr_eq(&a, &other));

        let snapshot = ctx.metrics().snapshot();
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.cache_misses, 2);
    }

    #[test]
    fn disabled_generation_yields_no_sheet() {
        let ctx = StyleContext::new(ContextConfig::disabled());
        assert!(ctx.sheet_for(&definition(), &no_theme(), &options(0)).is_none());
        assert!(ctx.cache().is_empty());
    }

    #[test]
    fn compile_failure_yields_no_sheet() {
        let ctx = StyleContext::new(ContextConfig::default());
        let def = StyleDefinition::new(Styles::new().rule("", Block::new()));
        assert!(ctx.sheet_for(&def, &no_theme(), &options(0)).is_none());
        assert_eq!(ctx.metrics().snapshot().compile_failures, 1);
    }

    #[test]
    fn detached_sheets_stay_memoized() {
        let ctx = StyleContext::new(ContextConfig::default());
        let def = definition();
        let theme = no_theme();
        let sheet = ctx.sheet_for(&def, &theme, &options(0)).unwrap();

        ctx.manage_sheet(0, &theme, &sheet);
        assert_eq!(ctx.registry().len(), 1);
        ctx.unmanage_sheet(0, &theme, &sheet);
        assert!(ctx.registry().is_empty());
        assert_eq!(ctx.cache().len(), 1);

        ctx.unmanage_sheet(0, &theme, &sheet);
        assert_eq!(ctx.metrics().snapshot().ignored_releases, 1);

        let again = ctx.sheet_for(&def, &theme, &options(0)).unwrap();
        assert!(Arc::ptr_eq(&again, &sheet));
        ctx.manage_sheet(0, &theme, &again);
        assert_eq!(ctx.registry().len(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let ctx = StyleContext::new(ContextConfig::default());
        let theme = no_theme();
        let sheet = ctx.sheet_for(&definition(), &theme, &options(0)).unwrap();
        ctx.manage_sheet(0, &theme, &sheet);

        ctx.reset();
        assert!(ctx.registry().is_empty());
        assert_eq!(ctx.registrations(), 0);
        assert!(ctx.cache().is_empty());
        assert!(!sheet.is_attached());
    }
}
