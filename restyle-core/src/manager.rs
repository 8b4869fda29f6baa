//! Reference-counted sheet registrations
//!
//! [`SheetsManager`] decides when a shared sheet is attached to and detached
//! from the [`Registry`]. Each `(sheet, theme)` pair has one registration
//! that only exists while its count is above zero. A sheet is attached
//! exactly while at least one of its registrations exists.

use crate::registry::Registry;
use crate::sheet::Sheet;
use parking_lot::Mutex;
use restyle_types::{SheetId, ThemeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
struct Registration {
    sheet: Arc<Sheet>,
    refs: usize,
}

/// Outcome of [`SheetsManager::manage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Managed {
    /// First reference: the sheet was attached
    Attached,
    /// Already attached; carries the new count of this pair
    Shared(usize),
}

/// Outcome of [`SheetsManager::unmanage`]
#[derive(Debug, Clone)]
pub enum Unmanaged {
    /// Last reference dropped: the sheet was detached and its registration removed
    Detached(Arc<Sheet>),
    /// Still attached; carries the remaining count of this pair, which is
    /// zero when only other themes still reference the sheet
    Released(usize),
    /// No registration existed; nothing changed
    Ignored,
}

#[derive(Debug)]
pub struct SheetsManager {
    registry: Arc<Registry>,
    registrations: Mutex<HashMap<(SheetId, ThemeId), Registration>>,
}

impl SheetsManager {
    pub fn new(registry: Arc<Registry>) -> Self {
        SheetsManager {
            registry,
            registrations: Mutex::new(HashMap::new()),
        }
    }

    /// Take a reference on `(sheet, theme)`, attaching the sheet on the first one
    pub fn manage(&self, index: i64, theme: ThemeId, sheet: &Arc<Sheet>) -> Managed {
        let mut registrations = self.registrations.lock();
        let registration = registrations
            .entry((sheet.id(), theme))
            .or_insert_with(|| Registration {
                sheet: sheet.clone(),
                refs: 0,
            });

        registration.refs += 1;
        let refs = registration.refs;
        if refs > 1 || registered_elsewhere(&registrations, sheet.id(), theme) {
            return Managed::Shared(refs);
        }

        sheet.set_attached(true);
        self.registry.add(index, sheet.clone());
        debug!(sheet = %sheet.id(), %theme, index, "attached sheet");
        Managed::Attached
    }

    /// Drop a reference on `(sheet, theme)`, detaching the sheet on the last one
    ///
    /// Releasing a pair that holds no reference is a no-op.
    pub fn unmanage(&self, index: i64, theme: ThemeId, sheet: &Sheet) -> Unmanaged {
        let key = (sheet.id(), theme);
        let mut registrations = self.registrations.lock();

        let remaining = match registrations.get_mut(&key) {
            Some(registration) if registration.refs > 0 => {
                registration.refs -= 1;
                registration.refs
            }
            _ => {
                debug!(sheet = %sheet.id(), %theme, index, "ignoring unbalanced release");
                return Unmanaged::Ignored;
            }
        };

        if remaining > 0 {
            return Unmanaged::Released(remaining);
        }

        let Some(registration) = registrations.remove(&key) else {
            return Unmanaged::Ignored;
        };
        if registered_elsewhere(&registrations, sheet.id(), theme) {
            return Unmanaged::Released(0);
        }
        self.registry.remove(&registration.sheet);
        registration.sheet.set_attached(false);
        debug!(sheet = %sheet.id(), %theme, index, "detached sheet");
        Unmanaged::Detached(registration.sheet)
    }

    /// Current reference count of `(sheet, theme)`; zero when unregistered
    pub fn ref_count(&self, sheet: &Sheet, theme: ThemeId) -> usize {
        self.registrations
            .lock()
            .get(&(sheet.id(), theme))
            .map(|registration| registration.refs)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.registrations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.lock().is_empty()
    }

    /// Forget every registration, detaching their sheets
    pub fn clear(&self) {
        let mut registrations = self.registrations.lock();
        for (_, registration) in registrations.drain() {
            self.registry.remove(&registration.sheet);
            registration.sheet.set_attached(false);
        }
    }
}

/// Whether `sheet` holds a registration under a theme other than `theme`
fn registered_elsewhere(
    registrations: &HashMap<(SheetId, ThemeId), Registration>,
    sheet: SheetId,
    theme: ThemeId,
) -> bool {
    registrations
        .keys()
        .any(|&(id, other)| id == sheet && other != theme)
}
