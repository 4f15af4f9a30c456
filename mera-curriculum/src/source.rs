//! Reads content sources from disk.
//!
//! A content root holds one directory per document kind. Each file is one
//! document, YAML, JSON or TOML, decided by its extension. Files are read in
//! lexicographic order per directory and directories in the order lessons,
//! menus, domains, curriculum, so the builder always sees the same sequence.

use std::fs;
use std::path::{Path, PathBuf};

use mera_model::{DocumentKind, SourceDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, DiagnosticKind};

pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("content root {0} does not exist")]
    MissingRoot(PathBuf),

    #[error("failed to list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory names and accepted extensions under a content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentLayout {
    pub lessons: String,
    pub menus: String,
    pub domains: String,
    pub curriculum: String,
    pub extensions: Vec<String>,
}

impl Default for ContentLayout {
    fn default() -> Self {
        Self {
            lessons: "lessons".into(),
            menus: "menus".into(),
            domains: "domains".into(),
            curriculum: "curriculum".into(),
            extensions: vec!["yaml".into(), "yml".into(), "json".into(), "toml".into()],
        }
    }
}

impl ContentLayout {
    fn directories(&self) -> [(&str, DocumentKind); 4] {
        [
            (self.lessons.as_str(), DocumentKind::Lesson),
            (self.menus.as_str(), DocumentKind::Menu),
            (self.domains.as_str(), DocumentKind::Domain),
            (self.curriculum.as_str(), DocumentKind::Curriculum),
        ]
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)))
    }
}

/// Documents read from a content root, plus diagnostics for files that
/// could not be read or parsed.
#[derive(Debug, Default)]
pub struct LoadedContent {
    pub documents: Vec<SourceDocument>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Loads every document under `root`. Missing kind directories are
/// skipped; unreadable files become `MalformedDocument` diagnostics.
pub fn load_content(root: &Path, layout: &ContentLayout) -> LoadResult<LoadedContent> {
    if !root.is_dir() {
        return Err(LoadError::MissingRoot(root.to_path_buf()));
    }

    let mut loaded = LoadedContent::default();
    for (dir, kind) in layout.directories() {
        let path = root.join(dir);
        if !path.is_dir() {
            debug!(path = %path.display(), "Content directory absent, skipping");
            continue;
        }

        for file in list_files(&path, layout)? {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let source = format!("{dir}/{name}");
            match read_document(&file) {
                Ok(body) => loaded.documents.push(SourceDocument::new(source, kind, body)),
                Err(reason) => loaded.diagnostics.push(
                    Diagnostic::new(DiagnosticKind::MalformedDocument, reason).with_source(source),
                ),
            }
        }
    }

    info!(
        root = %root.display(),
        documents = loaded.documents.len(),
        unreadable = loaded.diagnostics.len(),
        "Content loaded"
    );
    Ok(loaded)
}

fn list_files(dir: &Path, layout: &ContentLayout) -> LoadResult<Vec<PathBuf>> {
    let io = |source: std::io::Error| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.is_file() && layout.accepts(&path) {
            files.push(path);
        } else {
            debug!(path = %path.display(), "Ignoring non-content entry");
        }
    }
    files.sort();
    Ok(files)
}

fn read_document(path: &Path) -> Result<Value, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("cannot read file: {e}"))?;
    parse_document(path, &text)
}

/// Parses document text as YAML, JSON or TOML, by file extension. Anything
/// that is not `.yaml`, `.yml` or `.toml` is read as JSON.
pub fn parse_document(path: &Path, text: &str) -> Result<Value, String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str::<Value>(text).map_err(|e| format!("invalid YAML: {e}")),
        "toml" => toml::from_str::<Value>(text).map_err(|e| format!("invalid TOML: {e}")),
        _ => serde_json::from_str::<Value>(text).map_err(|e| format!("invalid JSON: {e}")),
    }
}
