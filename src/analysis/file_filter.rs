use regex::Regex;

use crate::error::Result;
use crate::models::ChangedFile;

/// Drops files whose name matches any exclusion glob.
///
/// `*` is the only wildcard and matches anything, including `/`. Patterns are
/// not anchored, so `*.md` also matches `notes.md.bak`.
#[derive(Debug, Clone)]
pub struct FileFilter {
    matcher: Option<Regex>,
}

impl FileFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = patterns
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(glob_to_regex)
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { matcher: None });
        }

        let matcher = Regex::new(&alternatives.join("|"))?;
        Ok(Self {
            matcher: Some(matcher),
        })
    }

    pub fn is_excluded(&self, filename: &str) -> bool {
        self.matcher
            .as_ref()
            .map(|m| m.is_match(filename))
            .unwrap_or(false)
    }

    pub fn filter(&self, files: Vec<ChangedFile>) -> Vec<ChangedFile> {
        if self.matcher.is_none() {
            return files;
        }

        files
            .into_iter()
            .filter(|f| {
                let excluded = self.is_excluded(&f.filename);
                if excluded {
                    tracing::debug!("Excluding {}", f.filename);
                }
                !excluded
            })
            .collect()
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("(?:{})", body)
}
