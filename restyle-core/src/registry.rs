//! The output registry
//!
//! Ordered collection of attached sheets. Its serialization is what a
//! server-side renderer would inline into the page, and what tests compare
//! against.

use crate::sheet::Sheet;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Registry {
    sheets: RwLock<Vec<(i64, Arc<Sheet>)>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sheet after every sheet with an index `<= index`
    ///
    /// Adding a sheet that is already present does nothing.
    pub fn add(&self, index: i64, sheet: Arc<Sheet>) {
        let mut sheets = self.sheets.write();
        if sheets.iter().any(|(_, s)| s.id() == sheet.id()) {
            return;
        }
        let pos = sheets
            .iter()
            .position(|(i, _)| *i > index)
            .unwrap_or(sheets.len());
        sheets.insert(pos, (index, sheet));
    }

    /// Remove a sheet; false if it was not present
    pub fn remove(&self, sheet: &Sheet) -> bool {
        let mut sheets = self.sheets.write();
        let before = sheets.len();
        sheets.retain(|(_, s)| s.id() != sheet.id());
        sheets.len() != before
    }

    pub fn contains(&self, sheet: &Sheet) -> bool {
        self.sheets.read().iter().any(|(_, s)| s.id() == sheet.id())
    }

    pub fn len(&self) -> usize {
        self.sheets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.read().is_empty()
    }

    /// Attached sheets in output order
    pub fn sheets(&self) -> Vec<Arc<Sheet>> {
        self.sheets.read().iter().map(|(_, s)| s.clone()).collect()
    }

    /// Total number of rules across attached sheets
    pub fn rule_count(&self) -> usize {
        self.sheets.read().iter().map(|(_, s)| s.rule_count()).sum()
    }

    /// Drop every sheet without touching reference counts
    pub fn reset(&self) {
        self.sheets.write().clear();
    }

    /// Concatenated CSS of every attached sheet, in index order
    pub fn to_css(&self) -> String {
        self.sheets
            .read()
            .iter()
            .map(|(_, s)| s.to_css())
            .filter(|css| !css.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}
