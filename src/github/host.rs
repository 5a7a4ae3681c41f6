use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChangedFile, CommitState, PullRequest};

/// Operations the review pipeline needs from the code-hosting service.
#[async_trait]
pub trait CodeHost: Send + Sync {
    async fn get_pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest>;

    async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>>;

    async fn post_comment(&self, owner: &str, repo: &str, number: u64, body: &str) -> Result<()>;

    async fn set_commit_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        state: CommitState,
        description: &str,
    ) -> Result<()>;
}
