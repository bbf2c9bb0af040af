use crate::config::Config;
use crate::document::Document;
use crate::error::{KbError, Result};
use crate::paths;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every document under a knowledge-base root, grouped by category.
///
/// A category is a non-hidden top-level directory. Documents are the `.md`
/// files anywhere beneath it; each category's documents are sorted by
/// relative path. Hidden files and directories are skipped and symlinks are
/// not followed.
#[derive(Debug, Clone, Serialize)]
pub struct Library {
    pub root: PathBuf,
    pub categories: BTreeMap<String, Vec<Document>>,
}

impl Library {
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(KbError::RootNotFound(root.to_path_buf()));
        }

        let mut categories = BTreeMap::new();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if paths::is_hidden(&name) || !entry.file_type()?.is_dir() {
                continue;
            }
            let docs = load_category(root, &name)?;
            tracing::debug!(category = %name, documents = docs.len(), "loaded category");
            categories.insert(name, docs);
        }

        Ok(Self {
            root: root.to_path_buf(),
            categories,
        })
    }

    /// Load, then narrow to the config's category allow-list if it has one.
    pub fn load_with(root: &Path, config: &Config) -> Result<Self> {
        let mut library = Self::load(root)?;
        if let Some(allowed) = &config.categories {
            library.retain_categories(allowed);
        }
        Ok(library)
    }

    /// Keep only `names`. Listed categories missing on disk are kept as empty.
    pub fn retain_categories(&mut self, names: &[String]) {
        self.categories.retain(|name, _| names.contains(name));
        for name in names {
            if !self.categories.contains_key(name) {
                tracing::warn!(category = %name, "configured category has no directory");
                self.categories.insert(name.clone(), Vec::new());
            }
        }
    }

    pub fn category(&self, name: &str) -> Option<&[Document]> {
        self.categories.get(name).map(Vec::as_slice)
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// All documents, category by category.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.categories.values().flatten()
    }

    pub fn get(&self, path: &str) -> Option<&Document> {
        let category = path.split('/').next()?;
        self.categories
            .get(category)?
            .iter()
            .find(|d| d.path == path)
    }
}

fn load_category(root: &Path, name: &str) -> Result<Vec<Document>> {
    let dir = paths::category_dir(root, name);
    let walker = WalkDir::new(&dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !paths::is_hidden(&e.file_name().to_string_lossy()));

    let mut docs = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| KbError::Read {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone()),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() || !paths::is_markdown(entry.path()) {
            continue;
        }
        docs.push(Document::read(root, name.to_string(), entry.path())?);
    }
    docs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(docs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_root_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = Library::load(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, KbError::RootNotFound(_)));
    }

    #[test]
    fn root_that_is_a_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "file.md", "# x");
        let err = Library::load(&dir.path().join("file.md")).unwrap_err();
        assert!(matches!(err, KbError::RootNotFound(_)));
    }

    #[test]
    fn groups_by_category_and_keeps_empty_ones() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Notes/b.md", "# B");
        write(dir.path(), "Notes/a.md", "# A");
        std::fs::create_dir_all(dir.path().join("Commands")).unwrap();

        let lib = Library::load(dir.path()).unwrap();
        assert_eq!(lib.category_names(), vec!["Commands", "Notes"]);
        assert!(lib.category("Commands").unwrap().is_empty());
        let paths: Vec<_> = lib.category("Notes").unwrap().iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["Notes/a.md", "Notes/b.md"]);
    }

    #[test]
    fn loaded_paths_match_markdown_files_on_disk() {
        let dir = TempDir::new().unwrap();
        let expected = [
            "Commands/fix-issue.md",
            "Commands/README.md",
            "Issues/templates/bug.md",
            "Notes/UPPER.MD",
            "Prompts/review.md",
        ];
        for rel in expected {
            write(dir.path(), rel, "text");
        }
        write(dir.path(), "Notes/image.png", "not markdown");
        write(dir.path(), "Notes/.draft.md", "hidden");
        write(dir.path(), "Notes/.trash/old.md", "hidden dir");
        write(dir.path(), ".kb/config.yaml", "version: 1");
        write(dir.path(), ".git/notes.md", "hidden category");
        write(dir.path(), "README.md", "root level");

        let lib = Library::load(dir.path()).unwrap();
        let got: BTreeSet<_> = lib.documents().map(|d| d.path.clone()).collect();
        let want: BTreeSet<_> = expected.iter().map(|s| s.to_string()).collect();
        assert_eq!(got, want);
        assert_eq!(lib.documents().count(), expected.len());
    }

    #[test]
    fn nested_documents_belong_to_top_level_category() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Issues/templates/bug.md", "# Bug");
        write(dir.path(), "Issues/a.md", "# A");

        let lib = Library::load(dir.path()).unwrap();
        let issues = lib.category("Issues").unwrap();
        let paths: Vec<_> = issues.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["Issues/a.md", "Issues/templates/bug.md"]);
        assert!(issues.iter().all(|d| d.category == "Issues"));
    }

    #[test]
    fn undecodable_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Notes")).unwrap();
        std::fs::write(dir.path().join("Notes/bad.md"), [0xc3, 0x28]).unwrap();
        let err = Library::load(dir.path()).unwrap_err();
        assert!(matches!(err, KbError::Read { .. }));
    }

    #[test]
    fn get_finds_document_by_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Prompts/review.md", "# Review");
        let lib = Library::load(dir.path()).unwrap();
        assert_eq!(lib.get("Prompts/review.md").unwrap().title(), "Review");
        assert!(lib.get("Prompts/none.md").is_none());
        assert!(lib.get("Missing/x.md").is_none());
    }

    #[test]
    fn config_allow_list_narrows_categories() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Notes/a.md", "# A");
        write(dir.path(), "Scratch/b.md", "# B");

        let config = Config {
            categories: Some(vec!["Notes".to_string(), "Hooks".to_string()]),
            ..Config::default()
        };
        let lib = Library::load_with(dir.path(), &config).unwrap();
        assert_eq!(lib.category_names(), vec!["Hooks", "Notes"]);
        assert!(lib.category("Hooks").unwrap().is_empty());
    }
}
