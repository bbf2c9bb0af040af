use crate::error::{KbError, Result};
use crate::template::{self, Placeholder, Substitution};
use crate::{index, io, paths};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

// ---------------------------------------------------------------------------
// FrontMatter
// ---------------------------------------------------------------------------

/// Optional YAML block at the very top of a document, delimited by `---`.
///
/// Command templates commonly carry `description` and `argument-hint`; any
/// other keys are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        rename = "argument-hint",
        skip_serializing_if = "Option::is_none"
    )]
    pub argument_hint: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Split `content` into the raw front-matter YAML and the byte offset where
/// the body starts. `None` when the document has no front-matter block.
pub fn split_front_matter(content: &str) -> Option<(&str, usize)> {
    let first_len = content.find('\n')? + 1;
    if content[..first_len].trim_end() != "---" {
        return None;
    }

    let mut offset = first_len;
    for line in content[first_len..].split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Some((&content[first_len..offset], offset + line.len()));
        }
        offset += line.len();
    }
    None
}

fn parse_front_matter(path: &str, content: &str) -> Option<FrontMatter> {
    let (yaml, _) = split_front_matter(content)?;
    if yaml.trim().is_empty() {
        return Some(FrontMatter::default());
    }
    match serde_yaml::from_str::<FrontMatter>(yaml) {
        Ok(fm) => Some(fm),
        Err(e) => {
            tracing::warn!(path, error = %e, "ignoring unparseable front matter");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Top-level directory the document lives under.
    pub category: String,
    /// Path relative to the knowledge-base root, `/`-separated.
    pub path: String,
    #[serde(skip)]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_matter: Option<FrontMatter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(
        category: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let content = content.into();
        let front_matter = parse_front_matter(&path, &content);
        Self {
            category: category.into(),
            path,
            content,
            front_matter,
            modified: None,
        }
    }

    /// Read a single document given its path relative to `root`.
    ///
    /// Accepts exactly the files [`Library::load`](crate::library::Library::load)
    /// would list: hidden segments are rejected and a symlink anywhere below
    /// the root counts as missing.
    pub fn load(root: &Path, rel: &str) -> Result<Self> {
        let abs = paths::resolve_document(root, rel)?;
        let rel = paths::relative_path(root, &abs)
            .ok_or_else(|| KbError::InvalidPath(rel.to_string()))?;
        let category = rel.split_once('/').map(|(c, _)| c.to_string());
        let category = match category {
            Some(category)
                if paths::is_markdown(&abs) && !rel.split('/').any(paths::is_hidden) =>
            {
                category
            }
            _ => return Err(KbError::InvalidPath(rel)),
        };

        let mut current = root.to_path_buf();
        for segment in rel.split('/') {
            current.push(segment);
            match std::fs::symlink_metadata(&current) {
                Ok(meta) if !meta.file_type().is_symlink() => {}
                _ => return Err(KbError::DocumentNotFound(rel.clone())),
            }
        }
        if !abs.is_file() {
            return Err(KbError::DocumentNotFound(rel));
        }
        Self::read(root, category, &abs)
    }

    pub(crate) fn read(root: &Path, category: String, abs: &Path) -> Result<Self> {
        let content = io::read_text(abs)?;
        let rel = paths::relative_path(root, abs)
            .ok_or_else(|| KbError::InvalidPath(abs.display().to_string()))?;
        let mut doc = Self::new(category, rel, content);
        doc.modified = std::fs::metadata(abs)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        Ok(doc)
    }

    /// Content after the front-matter block.
    pub fn body(&self) -> &str {
        match split_front_matter(&self.content) {
            Some((_, start)) => &self.content[start..],
            None => &self.content,
        }
    }

    pub fn base_name(&self) -> &str {
        paths::base_name(&self.path)
    }

    pub fn is_readme(&self) -> bool {
        self.path
            .rsplit('/')
            .next()
            .is_some_and(|f| f.eq_ignore_ascii_case(paths::README_MD))
    }

    pub fn title(&self) -> String {
        index::document_title(self)
    }

    pub fn placeholders(&self) -> Result<Vec<Placeholder>> {
        template::scan(&self.content)
    }

    pub fn substitute(&self, vars: &HashMap<String, String>) -> Result<Substitution> {
        template::substitute(&self.content, vars)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
