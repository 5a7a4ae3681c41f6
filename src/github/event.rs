use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::error::{Error, Result};

const PULL_REQUEST_EVENTS: &[&str] = &["pull_request", "pull_request_target"];

/// Identifies the pull request under review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

#[derive(Deserialize)]
struct EventPayload {
    number: Option<u64>,
    pull_request: Option<EventPullRequest>,
}

#[derive(Deserialize)]
struct EventPullRequest {
    number: u64,
}

impl PullRequestRef {
    /// Resolves the pull request from the GitHub Actions environment.
    pub fn from_github_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let event_name = lookup("GITHUB_EVENT_NAME").unwrap_or_default();
        if !PULL_REQUEST_EVENTS.contains(&event_name.as_str()) {
            let shown = if event_name.is_empty() {
                "<unset>"
            } else {
                event_name.as_str()
            };
            return Err(Error::NotPullRequest(format!(
                "GITHUB_EVENT_NAME is {}; run on pull_request events or pass --pr owner/repo#N",
                shown
            )));
        }

        let repository = lookup("GITHUB_REPOSITORY")
            .ok_or_else(|| Error::Config("GITHUB_REPOSITORY not set".to_string()))?;
        let (owner, repo) = split_repository(&repository)?;

        let event_path = lookup("GITHUB_EVENT_PATH")
            .ok_or_else(|| Error::Config("GITHUB_EVENT_PATH not set".to_string()))?;
        let payload: EventPayload = serde_json::from_str(&std::fs::read_to_string(&event_path)?)?;

        let number = payload
            .pull_request
            .map(|pr| pr.number)
            .or(payload.number)
            .ok_or_else(|| {
                Error::NotPullRequest(format!("event payload {} has no pull request", event_path))
            })?;

        Ok(Self {
            owner,
            repo,
            number,
        })
    }
}

fn split_repository(repository: &str) -> Result<(String, String)> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::Config(format!(
            "Invalid repository '{}', expected owner/repo",
            repository
        ))),
    }
}

impl FromStr for PullRequestRef {
    type Err = Error;

    /// Parses `owner/repo#123`.
    fn from_str(s: &str) -> Result<Self> {
        let (repository, number) = s.trim().split_once('#').ok_or_else(|| {
            Error::Config(format!("Invalid pull request '{}', expected owner/repo#N", s))
        })?;
        let (owner, repo) = split_repository(repository)?;
        let number = number
            .parse()
            .map_err(|_| Error::Config(format!("Invalid pull request number '{}'", number)))?;

        Ok(Self {
            owner,
            repo,
            number,
        })
    }
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}
