use crate::output::{print_json, print_table};
use anyhow::Context;
use kb_core::{config::Config, index::CategoryIndex, library::Library};
use std::path::Path;

pub fn run(root: &Path, category: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let library = Library::load_with(root, &config)
        .with_context(|| format!("failed to load knowledge base at {}", root.display()))?;
    let mut index = CategoryIndex::build(&library);

    if let Some(name) = category {
        if index.category(name).is_none() {
            anyhow::bail!(
                "category '{name}' not found (available: {})",
                library.category_names().join(", ")
            );
        }
        index.categories.retain(|c| c.name == name);
    }

    if json {
        return print_json(&index);
    }

    if index.categories.is_empty() {
        println!("No categories found in {}.", root.display());
        return Ok(());
    }

    let mut rows = Vec::new();
    for entry in &index.categories {
        if entry.documents.is_empty() {
            rows.push(vec![entry.name.clone(), "(empty)".to_string(), String::new()]);
        }
        for doc in &entry.documents {
            rows.push(vec![entry.name.clone(), doc.title.clone(), doc.path.clone()]);
        }
    }
    print_table(&["CATEGORY", "TITLE", "PATH"], rows);
    Ok(())
}
