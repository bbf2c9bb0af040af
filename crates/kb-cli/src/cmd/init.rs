use crate::output::print_json;
use anyhow::Context;
use kb_core::{config::Config, io, paths, types::StandardCategory};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    if !json {
        println!("Initializing knowledge base in: {}", root.display());
    }

    let mut created: Vec<String> = Vec::new();
    let mut existing: Vec<String> = Vec::new();
    let mut record = |rel: String, was_created: bool| {
        if !json {
            let label = if was_created { "created:" } else { "exists: " };
            println!("  {label} {rel}");
        }
        if was_created {
            created.push(rel);
        } else {
            existing.push(rel);
        }
    };

    // 1. Category folders, each with a README describing its purpose
    for category in StandardCategory::all() {
        let dir = paths::category_dir(root, category.as_str());
        io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

        let readme = paths::category_readme(root, category.as_str());
        let written = io::write_if_missing(&readme, category.readme().as_bytes())
            .with_context(|| format!("failed to write {}", readme.display()))?;
        record(format!("{}/{}", category.as_str(), paths::README_MD), written);
    }

    // 2. Config with defaults
    let config_path = paths::config_path(root);
    let written = if config_path.exists() {
        false
    } else {
        Config::default()
            .save(root)
            .context("failed to write .kb/config.yaml")?;
        true
    };
    record(paths::CONFIG_FILE.to_string(), written);

    if json {
        return print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "created": created,
            "existing": existing,
        }));
    }

    println!("\nKnowledge base initialized.");
    println!("Next: add markdown files under the category folders, then run `kb list`.");
    Ok(())
}
