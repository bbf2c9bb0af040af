use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// StandardCategory
// ---------------------------------------------------------------------------

/// The top-level folders a fresh knowledge base is scaffolded with.
///
/// Loading does not require these: any non-hidden top-level directory is a
/// category. They exist so `init` and the index can describe the usual ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StandardCategory {
    Notes,
    Prompts,
    Hooks,
    Commands,
    Issues,
}

impl StandardCategory {
    pub fn all() -> &'static [StandardCategory] {
        &[
            StandardCategory::Notes,
            StandardCategory::Prompts,
            StandardCategory::Hooks,
            StandardCategory::Commands,
            StandardCategory::Issues,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StandardCategory::Notes => "Notes",
            StandardCategory::Prompts => "Prompts",
            StandardCategory::Hooks => "Hooks",
            StandardCategory::Commands => "Commands",
            StandardCategory::Issues => "Issues",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StandardCategory::Notes => "Working notes and lessons learned while using the assistant.",
            StandardCategory::Prompts => {
                "Reusable prompt templates. Fill `$NAME` or `{{NAME}}` slots before sending."
            }
            StandardCategory::Hooks => "Notes on assistant hooks and the scripts they run.",
            StandardCategory::Commands => {
                "Slash-command templates. `$ARGUMENTS` receives the text typed after the command."
            }
            StandardCategory::Issues => "Issue-tracking guides and templates.",
        }
    }

    /// Scaffold content for the category's `README.md`.
    pub fn readme(self) -> String {
        format!("# {}\n\n{}\n", self.as_str(), self.description())
    }
}

impl fmt::Display for StandardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StandardCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Notes" => Ok(StandardCategory::Notes),
            "Prompts" => Ok(StandardCategory::Prompts),
            "Hooks" => Ok(StandardCategory::Hooks),
            "Commands" => Ok(StandardCategory::Commands),
            "Issues" => Ok(StandardCategory::Issues),
            _ => Err(format!("not a standard category: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Syntax
// ---------------------------------------------------------------------------

/// How a placeholder was written in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Syntax {
    /// `$NAME`
    Dollar,
    /// `{{NAME}}`
    Brace,
}

impl Syntax {
    pub fn as_str(self) -> &'static str {
        match self {
            Syntax::Dollar => "dollar",
            Syntax::Brace => "brace",
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn standard_category_roundtrips_through_str() {
        for c in StandardCategory::all() {
            assert_eq!(StandardCategory::from_str(c.as_str()).unwrap(), *c);
        }
        assert!(StandardCategory::from_str("notes").is_err());
    }

    #[test]
    fn readme_starts_with_heading() {
        let readme = StandardCategory::Commands.readme();
        assert!(readme.starts_with("# Commands\n"));
        assert!(readme.contains("$ARGUMENTS"));
    }
}
