use crate::error::Result;
use crate::paths;
use crate::template::is_valid_name;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub const CURRENT_VERSION: u32 = 1;

/// Optional per-root settings read from `.kb/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// When set, only these top-level directories are treated as categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Default placeholder values; `--set` on the command line overrides them.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    /// Treat placeholders without a value as an error when rendering.
    #[serde(default)]
    pub strict: bool,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            categories: None,
            variables: BTreeMap::new(),
            strict: false,
        }
    }
}

impl Config {
    /// Load `.kb/config.yaml`, or the defaults when the file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Config variables overlaid with `overrides`.
    pub fn merged_variables(&self, overrides: &[(String, String)]) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = self
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (k, v) in overrides {
            vars.insert(k.clone(), v.clone());
        }
        vars
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != CURRENT_VERSION {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "unsupported config version {} (expected {})",
                    self.version, CURRENT_VERSION
                ),
            });
        }

        for name in self.variables.keys() {
            if !is_valid_name(name) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("variable '{name}' is not a valid placeholder name"),
                });
            } else if !name.starts_with(|c: char| c.is_ascii_uppercase())
                || name.chars().any(|c| c.is_ascii_lowercase())
            {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "variable '{name}' can only be used as {{{{{name}}}}}, not ${name}"
                    ),
                });
            }
        }

        if let Some(categories) = &self.categories {
            if categories.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "categories is empty: no documents will be loaded".to_string(),
                });
            }
            let mut seen = HashSet::new();
            for name in categories {
                if !seen.insert(name.as_str()) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!("category '{name}' is listed more than once"),
                    });
                }
                if name.is_empty() || paths::is_hidden(name) || name.contains(['/', '\\']) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!(
                            "category '{name}' must be a plain, non-hidden directory name"
                        ),
                    });
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.variables.insert("AUTHOR".to_string(), "Ann".to_string());
        cfg.save(dir.path()).unwrap();
        assert!(dir.path().join(".kb/config.yaml").exists());
        assert_eq!(Config::load(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn parses_partial_yaml() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".kb")).unwrap();
        std::fs::write(
            dir.path().join(".kb/config.yaml"),
            "strict: true\nvariables:\n  PROJECT: MyApp\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.version, 1);
        assert!(cfg.strict);
        assert_eq!(cfg.variables.get("PROJECT").map(String::as_str), Some("MyApp"));
        assert!(cfg.categories.is_none());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".kb")).unwrap();
        std::fs::write(dir.path().join(".kb/config.yaml"), "strict: [unclosed").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn overrides_win_over_config_variables() {
        let mut cfg = Config::default();
        cfg.variables.insert("A".to_string(), "config".to_string());
        cfg.variables.insert("B".to_string(), "config".to_string());
        let vars = cfg.merged_variables(&[("A".to_string(), "cli".to_string())]);
        assert_eq!(vars["A"], "cli");
        assert_eq!(vars["B"], "config");
    }

    #[test]
    fn default_config_has_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_variable_names() {
        let mut cfg = Config::default();
        cfg.variables.insert("BAD NAME".to_string(), "x".to_string());
        cfg.variables.insert("place".to_string(), "x".to_string());
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("BAD NAME")));
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("{{place}}")));
    }

    #[test]
    fn validate_flags_category_problems() {
        let cfg = Config {
            categories: Some(vec![
                "Notes".to_string(),
                "Notes".to_string(),
                ".git".to_string(),
                "a/b".to_string(),
            ]),
            ..Config::default()
        };
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.message.contains("more than once")));
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.level == WarnLevel::Error)
                .count(),
            2
        );
    }

    #[test]
    fn validate_flags_unknown_version() {
        let cfg = Config {
            version: 9,
            ..Config::default()
        };
        assert!(cfg.validate()[0].message.contains("unsupported config version 9"));
    }
}
