use crate::output::{print_json, print_table};
use anyhow::Context;
use kb_core::{config::Config, library::Library, search::DocumentIndex};
use std::path::Path;

pub fn run(
    root: &Path,
    query: &str,
    limit: usize,
    category: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let library = Library::load_with(root, &config)
        .with_context(|| format!("failed to load knowledge base at {}", root.display()))?;

    let docs: Vec<_> = library
        .documents()
        .filter(|d| category.is_none_or(|c| d.category == c))
        .collect();
    let index = DocumentIndex::build(&docs).context("failed to build search index")?;
    let results = index.search(query, limit).context("search failed")?;

    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No documents match '{query}'.");
        return Ok(());
    }

    let rows = results
        .iter()
        .map(|r| {
            vec![
                format!("{:.2}", r.score),
                r.title.clone(),
                r.path.clone(),
            ]
        })
        .collect();
    print_table(&["SCORE", "TITLE", "PATH"], rows);
    Ok(())
}
