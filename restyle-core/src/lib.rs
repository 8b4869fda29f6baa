//! Restyle core
//!
//! Scoped style sheets for component trees. A [`StyleDefinition`] describes
//! named rules; a [`StyleHook`] binds it to a call-site, and every mounted
//! component gets a [`StyleInstance`] that maps rule keys to generated class
//! names.
//!
//! # Architecture
//!
//! ```text
//! StyleDefinition ──compile──▶ Sheet ──manage──▶ Registry ──to_css──▶ CSS text
//!        ▲                       ▲
//!   StyleInstance ── render ── SheetCache (per context, keyed by index/definition/theme)
//! ```
//!
//! - Sheets are memoized per `(index, definition, theme)` inside a
//!   [`StyleContext`], so every instance of a call-site shares one sheet.
//! - The [`SheetsManager`](manager::SheetsManager) reference-counts sheets
//!   and attaches them to the [`Registry`] only while someone uses them.
//! - Dynamic rules are private to each instance. Their class names are
//!   reserved during render and their CSS is added at setup, rewritten at
//!   update and removed at cleanup.
//!
//! # Example
//!
//! ```rust
//! use restyle_core::prelude::*;
//! use serde_json::json;
//!
//! let definition = StyleDefinition::new(
//!     Styles::new()
//!         .rule("button", Block::new().prop("padding", 4))
//!         .dynamic("label", |data| {
//!             Block::new().prop("color", data["color"].as_str().unwrap_or("black"))
//!         }),
//! );
//! let hook = StyleHook::new(definition, StyleOptions::new().name("btn"));
//!
//! let context = StyleContext::new(ContextConfig::default());
//! let mut instance = hook.mount(&context);
//! let classes = instance.render(&json!({"color": "red"}), None);
//! instance.commit();
//!
//! assert!(classes.get("button").is_some());
//! assert!(context.registry().to_css().contains("color: red;"));
//! ```

#![warn(missing_debug_implementations)]

pub mod cache;
pub mod classes;
pub mod compiler;
pub mod config;
pub mod context;
pub mod definition;
pub mod dynamic;
pub mod error;
pub mod hook;
pub mod index;
pub mod manager;
pub mod metrics;
pub mod module;
pub mod registry;
pub mod sheet;
pub mod theme;

pub use compiler::{CssCompiler, DefaultIdGenerator, FnIdGenerator, IdGenerator, StyleCompiler};
pub use config::ContextConfig;
pub use context::StyleContext;
pub use definition::{Block, CssValue, StyleDefinition, Styles};
pub use error::{CompileError, ConfigError, ModuleError};
pub use hook::{StyleHook, StyleInstance, StyleOptions};
pub use metrics::{MetricsSnapshot, StyleMetrics};
pub use module::StyleModule;
pub use registry::Registry;
pub use sheet::{Sheet, SheetOptions};
pub use theme::{ThemeProvider, ThemeSlot};

pub use restyle_types::{empty_class_map, no_theme, ClassNameMap, Theme};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::ContextConfig;
    pub use crate::context::StyleContext;
    pub use crate::definition::{Block, StyleDefinition, Styles};
    pub use crate::hook::{StyleHook, StyleInstance, StyleOptions};
    pub use crate::theme::ThemeProvider;
    pub use restyle_types::{ClassNameMap, Theme};
}
