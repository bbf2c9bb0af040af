use crate::output::print_json;
use anyhow::Context;
use kb_core::{config::Config, document::Document, io, template};
use std::path::Path;

pub fn run(
    root: &Path,
    path: &str,
    set: &[String],
    strict: bool,
    output: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let overrides = set
        .iter()
        .map(|s| template::parse_assignment(s))
        .collect::<Result<Vec<_>, _>>()?;

    let config = Config::load(root).context("failed to load config")?;
    let vars = config.merged_variables(&overrides);
    let strict = strict || config.strict;

    let doc = Document::load(root, path)?;
    let sub = doc
        .substitute(&vars)
        .with_context(|| format!("failed to render {}", doc.path))?;

    if strict {
        sub.ensure_complete()
            .with_context(|| format!("failed to render {}", doc.path))?;
    }
    if !sub.unknown.is_empty() {
        for p in &sub.unknown {
            tracing::debug!(name = %p.name, line = p.line, "placeholder left unresolved");
        }
        if !json {
            eprintln!(
                "warning: no value for {} in {}",
                sub.unknown_names().join(", "),
                doc.path
            );
        }
    }

    if let Some(out) = output {
        io::atomic_write(out, sub.text.as_bytes())
            .with_context(|| format!("failed to write {}", out.display()))?;
        if json {
            return print_json(&serde_json::json!({
                "path": doc.path,
                "output": out.display().to_string(),
                "replaced": sub.replaced,
                "unknown": sub.unknown,
            }));
        }
        println!("Rendered {} -> {}", doc.path, out.display());
        return Ok(());
    }

    if json {
        return print_json(&serde_json::json!({
            "path": doc.path,
            "text": sub.text,
            "replaced": sub.replaced,
            "unknown": sub.unknown,
        }));
    }

    print!("{}", sub.text);
    Ok(())
}
