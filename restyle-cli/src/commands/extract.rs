//! Extract CSS from a YAML style module.

use anyhow::{Context, Result};
use restyle_core::{ContextConfig, StyleContext, StyleHook, StyleModule, StyleOptions};
use restyle_types::ClassNameMap;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub json: bool,
    pub minify: bool,
}

#[derive(Serialize)]
struct Extraction<'a> {
    css: &'a str,
    classes: Vec<&'a ClassNameMap>,
}

/// Mount every instance of the module in a server-side context and print
/// the registry.
pub fn extract(config_path: Option<&Path>, module_path: &Path, opts: ExtractOptions) -> Result<()> {
    let mut config = match config_path {
        Some(path) => ContextConfig::from_file(path).context("Failed to load configuration")?,
        None => ContextConfig::default(),
    };
    config.is_ssr = true;
    config.minify |= opts.minify;

    let module = StyleModule::from_file(module_path)
        .with_context(|| format!("Failed to load style module {}", module_path.display()))?;
    tracing::debug!(
        module = module.name.as_deref().unwrap_or("<unnamed>"),
        instances = module.instances.len(),
        "loaded style module"
    );

    let context = StyleContext::new(config);
    let mut options = StyleOptions::new();
    if let Some(name) = &module.name {
        options = options.name(name.clone());
    }
    let hook = StyleHook::new(module.definition.clone(), options);

    let mut instances = Vec::with_capacity(module.instances.len());
    let mut classes = Vec::with_capacity(module.instances.len());
    for data in &module.instances {
        let mut instance = hook.mount(&context);
        classes.push(instance.render(data, None));
        instance.commit();
        instances.push(instance);
    }

    if context.metrics().snapshot().compile_failures > 0 {
        anyhow::bail!("Style module {} failed to compile", module_path.display());
    }

    let css = context.registry().to_css();
    if opts.json {
        let classes = classes.iter().map(|map| &**map).collect();
        let payload = serde_json::to_string_pretty(&Extraction { css: &css, classes })?;
        println!("{}", payload);
    } else if !css.is_empty() {
        println!("{}", css);
    }

    tracing::debug!(metrics = %context.metrics().snapshot(), "extraction complete");
    Ok(())
}
