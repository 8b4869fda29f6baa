//! Sheet memoization
//!
//! Maps the identity of a call-site's inputs to the sheet compiled from them,
//! so that every consumer of the same `(index, definition, theme)` shares one
//! [`Sheet`]. Keys are identity tokens, never structural hashes: two equal
//! but separately built definitions get separate sheets.

use crate::sheet::Sheet;
use dashmap::DashMap;
use restyle_types::{DefinitionId, ThemeId};
use std::sync::Arc;

/// Composite identity of a memoized sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetKey {
    pub index: i64,
    pub definition: DefinitionId,
    pub theme: ThemeId,
}

impl SheetKey {
    pub fn new(index: i64, definition: DefinitionId, theme: ThemeId) -> Self {
        SheetKey {
            index,
            definition,
            theme,
        }
    }

    /// The key a sheet was compiled under
    pub fn of(sheet: &Sheet) -> Self {
        SheetKey::new(sheet.index(), sheet.definition(), sheet.theme())
    }
}

/// Identity-keyed sheet cache
#[derive(Debug, Default)]
pub struct SheetCache {
    entries: DashMap<SheetKey, Arc<Sheet>>,
}

impl SheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SheetKey) -> Option<Arc<Sheet>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Store `sheet` unless another sheet already holds the key
    ///
    /// Returns whichever sheet ends up cached, so two racing compilations of
    /// the same key still hand out a single sheet.
    pub fn insert_if_absent(&self, key: SheetKey, sheet: Arc<Sheet>) -> Arc<Sheet> {
        self.entries.entry(key).or_insert(sheet).value().clone()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
