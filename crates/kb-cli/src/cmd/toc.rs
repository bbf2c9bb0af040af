use crate::output::print_json;
use anyhow::Context;
use kb_core::{config::Config, index::CategoryIndex, io, library::Library, paths};
use std::path::Path;

pub fn run(root: &Path, write: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let library = Library::load_with(root, &config)
        .with_context(|| format!("failed to load knowledge base at {}", root.display()))?;
    let index = CategoryIndex::build(&library);
    let markdown = index.to_markdown();

    if write {
        let path = paths::index_md_path(root);
        io::atomic_write(&path, markdown.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        if json {
            return print_json(&serde_json::json!({
                "path": paths::INDEX_MD,
                "categories": index.categories.len(),
                "documents": index.document_count(),
            }));
        }
        println!(
            "Wrote {} ({} documents in {} categories)",
            paths::INDEX_MD,
            index.document_count(),
            index.categories.len()
        );
        return Ok(());
    }

    if json {
        return print_json(&serde_json::json!({ "markdown": markdown }));
    }
    print!("{markdown}");
    Ok(())
}
