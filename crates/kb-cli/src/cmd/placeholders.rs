use crate::output::{print_json, print_table};
use anyhow::Context;
use kb_core::document::Document;
use std::path::Path;

pub fn run(root: &Path, path: &str, json: bool) -> anyhow::Result<()> {
    let doc = Document::load(root, path)?;
    let found = doc
        .placeholders()
        .with_context(|| format!("failed to scan {}", doc.path))?;

    if json {
        return print_json(&found);
    }

    if found.is_empty() {
        println!("No placeholders in {}.", doc.path);
        return Ok(());
    }

    let rows = found
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                p.syntax.to_string(),
                format!("{}:{}", p.line, p.column),
                p.raw.clone(),
            ]
        })
        .collect();
    print_table(&["NAME", "SYNTAX", "AT", "TOKEN"], rows);
    Ok(())
}
