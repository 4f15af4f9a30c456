//! Library side of the `mera` content tool.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use mera_curriculum::{
    load_content, Catalog, ContentLayout, DiagnosticReport, IntegrityValidator, QuerySurface,
};
use tracing::info;

/// Reads a [`ContentLayout`] from a TOML file, or the default layout.
pub fn load_layout(path: Option<&Path>) -> Result<ContentLayout> {
    let Some(path) = path else {
        return Ok(ContentLayout::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid layout file {}", path.display()))
}

/// Loads the content under `root` and validates it against the built-in
/// component types. The outer error is for I/O problems; the inner one is
/// the diagnostic report of a release that must not ship.
pub fn validate(root: &Path, layout: &ContentLayout) -> Result<Result<Catalog, DiagnosticReport>> {
    let loaded = load_content(root, layout)?;
    Ok(IntegrityValidator::builtin()
        .with_diagnostics(loaded.diagnostics)
        .validate(loaded.documents))
}

/// Writes the query surface of a validated catalog as pretty JSON.
pub fn export(catalog: &Catalog, out: &Path) -> Result<()> {
    let surface = QuerySurface::from_catalog(catalog);
    let json = surface.to_json_pretty()?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(out, json).with_context(|| format!("failed to write {}", out.display()))?;
    info!(path = %out.display(), types = surface.types.len(), entities = surface.entity_ids.len(), "Query surface exported");
    Ok(())
}
