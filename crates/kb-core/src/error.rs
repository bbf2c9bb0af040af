use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KbError {
    #[error("knowledge base root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("invalid document path '{0}': expected <category>/<name>.md inside the root")]
    InvalidPath(String),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed placeholder at line {line}, column {column}: {snippet}")]
    InvalidTemplate {
        line: usize,
        column: usize,
        snippet: String,
    },

    #[error("unresolved placeholders: {}", .0.join(", "))]
    UnknownPlaceholders(Vec<String>),

    #[error("invalid assignment '{0}': expected KEY=VALUE with KEY a placeholder name")]
    InvalidAssignment(String),

    #[error("search error: {0}")]
    Search(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, KbError>;
