use crate::output::print_json;
use anyhow::Context;
use kb_core::{document::Document, template};
use std::path::Path;

pub fn run(root: &Path, path: &str, json: bool) -> anyhow::Result<()> {
    let doc = Document::load(root, path)?;
    let placeholders = doc
        .placeholders()
        .with_context(|| format!("failed to scan {}", doc.path))?;
    let names = template::distinct_names(&placeholders);
    let title = doc.title();

    if json {
        return print_json(&serde_json::json!({
            "path": doc.path,
            "category": doc.category,
            "title": title,
            "modified": doc.modified,
            "front_matter": doc.front_matter,
            "placeholders": names,
        }));
    }

    println!("Title:    {title}");
    println!("Category: {}", doc.category);
    println!("Path:     {}", doc.path);
    if let Some(modified) = doc.modified {
        println!("Modified: {}", modified.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(fm) = &doc.front_matter {
        if let Some(desc) = &fm.description {
            println!("About:    {desc}");
        }
        if let Some(hint) = &fm.argument_hint {
            println!("Args:     {hint}");
        }
        for key in fm.extra.keys() {
            println!("Meta:     {key}");
        }
    }
    if names.is_empty() {
        println!("Slots:    (none)");
    } else {
        println!("Slots:    {}", names.join(", "));
    }
    Ok(())
}
