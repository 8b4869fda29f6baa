//! Class-name resolution
//!
//! Merges a sheet's static class names with one instance's dynamic class
//! names into the map handed back to the caller.

use crate::dynamic::DynamicClassNames;
use crate::sheet::Sheet;
use restyle_types::{empty_class_map, ClassNameMap};
use std::sync::Arc;

/// Build the class map for an instance
///
/// With no sheet this is the shared empty map; with no dynamic names it is
/// the sheet's own static map, so repeated calls return the same `Arc`.
/// Otherwise each static key maps to `"{static} {dynamic}"` when a dynamic
/// rule exists for it. The dynamic part is the class currently registered in
/// the sheet under the dynamic rule key, falling back to the reserved id
/// before the rule has been added.
pub fn resolve(sheet: Option<&Sheet>, dynamic: Option<&DynamicClassNames>) -> Arc<ClassNameMap> {
    let Some(sheet) = sheet else {
        return empty_class_map();
    };
    let Some(dynamic) = dynamic.filter(|names| !names.is_empty()) else {
        return sheet.static_classes();
    };

    let static_classes = sheet.static_classes();
    let mut classes = ClassNameMap::new();

    for key in sheet.static_keys() {
        let Some(base) = static_classes.get(key) else {
            continue;
        };
        let class_name = match dynamic.get(key) {
            Some(name) => {
                let extra = sheet.class_for(&name.key).unwrap_or_else(|| name.id.clone());
                format!("{base} {extra}")
            }
            None => base.to_string(),
        };
        classes.insert(key.clone(), class_name);
    }

    Arc::new(classes)
}
