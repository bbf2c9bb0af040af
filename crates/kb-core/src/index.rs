use crate::document::{split_front_matter, Document, FrontMatter};
use crate::library::Library;
use crate::paths;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Title extraction
// ---------------------------------------------------------------------------

/// Text of the first `# ` heading, skipping fenced code blocks.
///
/// Only level-one headings count; `##` and deeper are ignored, as is `#tag`
/// without a following space.
pub fn heading_title(body: &str) -> Option<String> {
    let mut fence: Option<&str> = None;
    for line in body.lines() {
        let trimmed = line.trim_start();
        for marker in ["```", "~~~"] {
            if trimmed.starts_with(marker) {
                fence = match fence {
                    Some(open) if open == marker => None,
                    None => Some(marker),
                    other => other,
                };
            }
        }
        if fence.is_some() || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        let Some(rest) = line.strip_prefix('#') else {
            continue;
        };
        if !rest.starts_with([' ', '\t']) {
            continue;
        }
        let title = strip_closing_hashes(rest.trim());
        if !title.is_empty() {
            return Some(title.to_string());
        }
    }
    None
}

fn strip_closing_hashes(title: &str) -> &str {
    if !title.ends_with('#') {
        return title;
    }
    let stripped = title.trim_end_matches('#');
    if stripped.is_empty() || stripped.ends_with([' ', '\t']) {
        stripped.trim_end()
    } else {
        title
    }
}

fn resolve_title(body: &str, front_matter_title: Option<&str>, path: &str) -> String {
    heading_title(body)
        .or_else(|| {
            front_matter_title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
        })
        .unwrap_or_else(|| paths::base_name(path).to_string())
}

/// Human-readable title for raw document text.
///
/// First `# ` heading, then a front-matter `title`, then the file's base name.
pub fn extract_title(content: &str, path: &str) -> String {
    match split_front_matter(content) {
        Some((yaml, start)) => {
            let fm_title = serde_yaml::from_str::<FrontMatter>(yaml)
                .ok()
                .and_then(|fm| fm.title);
            resolve_title(&content[start..], fm_title.as_deref(), path)
        }
        None => resolve_title(content, None, path),
    }
}

pub(crate) fn document_title(doc: &Document) -> String {
    let fm_title = doc.front_matter.as_ref().and_then(|fm| fm.title.as_deref());
    resolve_title(doc.body(), fm_title, &doc.path)
}

/// First prose paragraph of `body`, joined onto one line.
fn first_paragraph(body: &str) -> Option<String> {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            if !lines.is_empty() {
                break;
            }
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with('#') {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(trimmed);
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

// ---------------------------------------------------------------------------
// CategoryIndex
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub path: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEntry {
    pub name: String,
    /// First paragraph of the category's `README.md`, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub documents: Vec<IndexEntry>,
}

/// Table of contents over a loaded [`Library`]. Categories are in name order,
/// documents in path order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryIndex {
    pub categories: Vec<CategoryEntry>,
}

impl CategoryIndex {
    pub fn build(library: &Library) -> Self {
        let categories = library
            .categories
            .iter()
            .map(|(name, docs)| CategoryEntry {
                name: name.clone(),
                description: docs
                    .iter()
                    .find(|d| d.is_readme() && d.path.matches('/').count() == 1)
                    .and_then(|d| first_paragraph(d.body())),
                documents: docs
                    .iter()
                    .map(|d| IndexEntry {
                        path: d.path.clone(),
                        title: d.title(),
                        description: d.front_matter.as_ref().and_then(|fm| fm.description.clone()),
                    })
                    .collect(),
            })
            .collect();
        Self { categories }
    }

    pub fn category(&self, name: &str) -> Option<&CategoryEntry> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn document_count(&self) -> usize {
        self.categories.iter().map(|c| c.documents.len()).sum()
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Index\n");
        for category in &self.categories {
            out.push_str(&format!("\n## {}\n\n", category.name));
            if let Some(desc) = &category.description {
                out.push_str(desc);
                out.push_str("\n\n");
            }
            if category.documents.is_empty() {
                out.push_str("_No documents._\n");
                continue;
            }
            for doc in &category.documents {
                let target = if doc.path.contains(' ') {
                    format!("<{}>", doc.path)
                } else {
                    doc.path.clone()
                };
                out.push_str(&format!("- [{}]({})", doc.title, target));
                if let Some(desc) = &doc.description {
                    out.push_str(&format!(": {desc}"));
                }
                out.push('\n');
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[test]
    fn title_from_first_heading() {
        assert_eq!(extract_title("# My Title\nbody", "Notes/x.md"), "My Title");
    }

    #[test]
    fn title_falls_back_to_base_name() {
        assert_eq!(extract_title("no heading here\n", "Notes/setup-guide.md"), "setup-guide");
        assert_eq!(extract_title("", "Notes/empty.md"), "empty");
    }

    #[test]
    fn deeper_headings_and_hashtags_do_not_count() {
        let content = "## Section\n#tag\n###### Deep\n# Real Title\n";
        assert_eq!(extract_title(content, "Notes/x.md"), "Real Title");
    }

    #[test]
    fn headings_inside_code_fences_are_skipped() {
        let content = "```bash\n# install deps\nnpm i\n```\n# After Fence\n";
        assert_eq!(extract_title(content, "Notes/x.md"), "After Fence");
        let tilde = "~~~\n# not this\n~~~\nplain\n";
        assert_eq!(extract_title(tilde, "Notes/tilde.md"), "tilde");
    }

    #[test]
    fn closing_hashes_are_trimmed_but_not_inside_words() {
        assert_eq!(extract_title("# Title ##\n", "a/b.md"), "Title");
        assert_eq!(extract_title("# Learning C#\n", "a/b.md"), "Learning C#");
    }

    #[test]
    fn front_matter_title_is_second_choice() {
        let with_heading = "---\ntitle: From YAML\n---\n# From Heading\n";
        assert_eq!(extract_title(with_heading, "a/b.md"), "From Heading");
        let without_heading = "---\ntitle: From YAML\n---\nbody\n";
        assert_eq!(extract_title(without_heading, "a/b.md"), "From YAML");
    }

    #[test]
    fn front_matter_lines_are_not_headings() {
        let content = "---\ndescription: x\n---\nno heading\n";
        assert_eq!(extract_title(content, "Commands/run.md"), "run");
    }

    fn library() -> Library {
        let mut categories = BTreeMap::new();
        categories.insert(
            "Notes".to_string(),
            vec![
                Document::new(
                    "Notes",
                    "Notes/README.md",
                    "# Notes\n\nThings I learned\nalong the way.\n\nMore.\n",
                ),
                Document::new("Notes", "Notes/a.md", "# Alpha\n"),
                Document::new("Notes", "Notes/b.md", "no heading"),
            ],
        );
        categories.insert("Commands".to_string(), Vec::new());
        Library {
            root: PathBuf::from("/kb"),
            categories,
        }
    }

    #[test]
    fn build_keeps_empty_categories_and_order() {
        let index = CategoryIndex::build(&library());
        let names: Vec<_> = index.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Commands", "Notes"]);
        assert!(index.category("Commands").unwrap().documents.is_empty());

        let notes = index.category("Notes").unwrap();
        let titles: Vec<_> = notes.documents.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Notes", "Alpha", "b"]);
        assert_eq!(
            notes.description.as_deref(),
            Some("Things I learned along the way.")
        );
        assert_eq!(index.document_count(), 3);
    }

    #[test]
    fn markdown_lists_every_category() {
        let md = CategoryIndex::build(&library()).to_markdown();
        assert!(md.starts_with("# Index\n"));
        assert!(md.contains("## Commands\n\n_No documents._\n"));
        assert!(md.contains("- [Alpha](Notes/a.md)\n"));
        assert!(md.find("## Commands").unwrap() < md.find("## Notes").unwrap());
    }

    #[test]
    fn first_paragraph_skips_headings_and_fences() {
        assert_eq!(
            first_paragraph("# T\n\n```\ncode\n```\n\nHello\nworld\n\nNext"),
            Some("Hello world".to_string())
        );
        assert_eq!(first_paragraph("# Only heading\n"), None);
    }
}
