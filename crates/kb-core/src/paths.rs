use crate::error::{KbError, Result};
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const KB_DIR: &str = ".kb";
pub const CONFIG_FILE: &str = ".kb/config.yaml";

pub const README_MD: &str = "README.md";
pub const INDEX_MD: &str = "INDEX.md";
pub const MARKDOWN_EXT: &str = "md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn category_dir(root: &Path, category: &str) -> PathBuf {
    root.join(category)
}

pub fn category_readme(root: &Path, category: &str) -> PathBuf {
    category_dir(root, category).join(README_MD)
}

pub fn index_md_path(root: &Path) -> PathBuf {
    root.join(INDEX_MD)
}

/// True for file names ending in `.md`, ignoring ASCII case.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(MARKDOWN_EXT))
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Join a document path onto `root`, rejecting anything that could leave it.
///
/// Absolute paths are accepted only when they already point inside `root`.
pub fn resolve_document(root: &Path, rel: &str) -> Result<PathBuf> {
    let candidate = Path::new(rel);
    let rel_path = if candidate.is_absolute() {
        candidate
            .strip_prefix(root)
            .map_err(|_| KbError::InvalidPath(rel.to_string()))?
    } else {
        candidate
    };

    let mut out = root.to_path_buf();
    let mut depth = 0usize;
    for component in rel_path.components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            _ => return Err(KbError::InvalidPath(rel.to_string())),
        }
    }
    if depth == 0 {
        return Err(KbError::InvalidPath(rel.to_string()));
    }
    Ok(out)
}

/// Path of `abs` relative to `root`, always `/`-separated.
pub fn relative_path(root: &Path, abs: &Path) -> Option<String> {
    let rel = abs.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// File name without its extension, used as the fallback title.
pub fn base_name(rel: &str) -> &str {
    let file = rel.rsplit('/').next().unwrap_or(rel);
    match file.rfind('.') {
        Some(0) | None => file,
        Some(i) => &file[..i],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
