use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub name: String,
    pub description: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl ValidationRule {
    pub fn new(name: &str, description: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.required {
            "REQUIRED"
        } else {
            "OPTIONAL"
        }
    }
}

pub fn default_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule::new(
            "No hardcoded secrets",
            "API keys, passwords, tokens and other credentials must not appear in source code",
            true,
        ),
        ValidationRule::new(
            "Error handling",
            "Errors must be handled or propagated, never silently swallowed",
            true,
        ),
        ValidationRule::new(
            "Input validation",
            "Data from users or external systems must be validated before use; no injection vulnerabilities",
            true,
        ),
        ValidationRule::new(
            "No debug leftovers",
            "Debug prints, commented-out code and temporary hacks must be removed",
            true,
        ),
        ValidationRule::new(
            "Tests",
            "New behavior should come with tests that exercise it",
            false,
        ),
        ValidationRule::new(
            "Naming",
            "Identifiers should be descriptive and follow the conventions of the surrounding code",
            false,
        ),
        ValidationRule::new(
            "Documentation",
            "Public functions, types and non-obvious logic should be documented",
            false,
        ),
    ]
}

/// Reads a JSON array of rules. An empty array is rejected.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<ValidationRule>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let rules: Vec<ValidationRule> = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Invalid rules file {}: {}", path.display(), e))
    })?;

    if rules.is_empty() {
        return Err(Error::Config(format!(
            "Rules file {} contains no rules",
            path.display()
        )));
    }

    tracing::info!("Loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}
