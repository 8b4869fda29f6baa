//! Theme resolution

use crate::definition::StyleDefinition;
use parking_lot::RwLock;
use restyle_types::{no_theme, Theme};
use std::fmt;
use std::sync::Arc;

/// Source of the ambient theme for a render
pub trait ThemeProvider: Send + Sync + fmt::Debug {
    fn current_theme(&self) -> Option<Arc<Theme>>;
}

/// A settable theme slot
#[derive(Debug, Default)]
pub struct ThemeSlot {
    current: RwLock<Option<Arc<Theme>>>,
}

impl ThemeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(theme: Arc<Theme>) -> Self {
        ThemeSlot {
            current: RwLock::new(Some(theme)),
        }
    }

    pub fn set(&self, theme: Arc<Theme>) {
        *self.current.write() = Some(theme);
    }

    pub fn clear(&self) {
        *self.current.write() = None;
    }
}

impl ThemeProvider for ThemeSlot {
    fn current_theme(&self) -> Option<Arc<Theme>> {
        self.current.read().clone()
    }
}

/// Pick the theme a definition compiles against
///
/// Static definitions always get the [`no_theme`] sentinel and never consult
/// the provider. Theme-dependent ones take the explicit theme first, then the
/// provider, then the sentinel.
pub fn resolve_theme(
    definition: &StyleDefinition,
    explicit: Option<&Arc<Theme>>,
    provider: &dyn ThemeProvider,
) -> Arc<Theme> {
    if !definition.is_theme_dependent() {
        return no_theme();
    }
    explicit
        .cloned()
        .or_else(|| provider.current_theme())
        .unwrap_or_else(no_theme)
}
