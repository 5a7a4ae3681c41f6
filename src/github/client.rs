use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::github::host::CodeHost;
use crate::github::paginator::Paginator;
use crate::models::{ChangedFile, CommitState, PullRequest};

pub const STATUS_CONTEXT: &str = "prgate/review";
const FILES_PER_PAGE: u32 = 100;

pub struct GitHubClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    state: CommitState,
    description: &'a str,
    context: &'a str,
}

impl GitHubClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("prgate/0.1"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::GitHubApi(format!(
            "Failed to {}: {} - {}",
            what, status, body
        )))
    }
}

#[async_trait]
impl CodeHost for GitHubClient {
    async fn get_pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        let url = format!("{}/repos/{}/{}/pulls/{}", self.base_url, owner, repo, number);
        tracing::info!("Fetching pull request: {}/{}#{}", owner, repo, number);

        let response = self.client.get(&url).send().await?;
        let response = Self::check(response, &format!("fetch pull request #{}", number)).await?;

        Ok(response.json().await?)
    }

    async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/files",
            self.base_url, owner, repo, number
        );
        tracing::debug!("Fetching changed files for: {}/{}#{}", owner, repo, number);
        Paginator::new(&self.client, FILES_PER_PAGE).collect(&url).await
    }

    async fn post_comment(&self, owner: &str, repo: &str, number: u64, body: &str) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_url, owner, repo, number
        );

        let response = self
            .client
            .post(&url)
            .json(&CommentRequest { body })
            .send()
            .await?;
        Self::check(response, &format!("post comment on #{}", number)).await?;

        tracing::info!("Posted review comment on {}/{}#{}", owner, repo, number);
        Ok(())
    }

    async fn set_commit_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        state: CommitState,
        description: &str,
    ) -> Result<()> {
        let url = format!("{}/repos/{}/{}/statuses/{}", self.base_url, owner, repo, sha);

        let response = self
            .client
            .post(&url)
            .json(&StatusRequest {
                state,
                description,
                context: STATUS_CONTEXT,
            })
            .send()
            .await?;
        Self::check(response, &format!("set commit status on {}", sha)).await?;

        tracing::debug!("Commit status for {} set to {}", sha, state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_get_pull_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/widgets/pulls/7")
            .match_header("authorization", "Bearer ghp_test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"number": 7, "title": "Add widget", "body": null,
                    "user": {"login": "octocat"}, "head": {"sha": "abc123"}}"#,
            )
            .create_async()
            .await;

        let client = GitHubClient::new("ghp_test", &server.url()).unwrap();
        let pr = client.get_pull_request("acme", "widgets", 7).await.unwrap();

        mock.assert_async().await;
        assert_eq!(pr.title, "Add widget");
        assert!(pr.body.is_none());
        assert_eq!(pr.user.login, "octocat");
        assert_eq!(pr.head.sha, "abc123");
    }

    #[tokio::test]
    async fn test_list_files_keeps_order_and_missing_patch() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/widgets/pulls/7/files")
            .match_query(Matcher::Exact("per_page=100".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"filename": "src/lib.rs", "status": "modified", "additions": 3, "deletions": 1,
                     "patch": "@@ -1 +1,3 @@\n+fn a() {}"},
                    {"filename": "old.txt", "status": "renamed", "additions": 0, "deletions": 0}
                ]"#,
            )
            .create_async()
            .await;

        let client = GitHubClient::new("ghp_test", &server.url()).unwrap();
        let files = client
            .list_pull_request_files("acme", "widgets", 7)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "src/lib.rs");
        assert_eq!(files[0].additions, 3);
        assert!(files[1].patch.is_none());
    }

    fn file_page(range: std::ops::Range<usize>) -> String {
        let files: Vec<serde_json::Value> = range
            .map(|i| {
                serde_json::json!({
                    "filename": format!("src/file_{:03}.rs", i),
                    "status": "modified",
                    "additions": 1,
                    "deletions": 0,
                    "patch": "+x"
                })
            })
            .collect();
        serde_json::Value::Array(files).to_string()
    }

    #[tokio::test]
    async fn test_list_files_follows_next_link() {
        let mut server = Server::new_async().await;
        let next = format!(
            "<{}/repos/acme/widgets/pulls/7/files?per_page=100&page=2>; rel=\"next\", <{}/repos/acme/widgets/pulls/7/files?per_page=100&page=2>; rel=\"last\"",
            server.url(),
            server.url()
        );
        let first = server
            .mock("GET", "/repos/acme/widgets/pulls/7/files")
            .match_query(Matcher::Exact("per_page=100".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("link", next.as_str())
            .with_body(file_page(0..100))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/repos/acme/widgets/pulls/7/files")
            .match_query(Matcher::Exact("per_page=100&page=2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(file_page(100..101))
            .create_async()
            .await;

        let client = GitHubClient::new("ghp_test", &server.url()).unwrap();
        let files = client
            .list_pull_request_files("acme", "widgets", 7)
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(files.len(), 101);
        for (i, file) in files.iter().enumerate() {
            assert_eq!(file.filename, format!("src/file_{:03}.rs", i));
        }
    }

    #[tokio::test]
    async fn test_list_files_fails_on_later_page() {
        let mut server = Server::new_async().await;
        let next = format!(
            "<{}/repos/acme/widgets/pulls/7/files?per_page=100&page=2>; rel=\"next\"",
            server.url()
        );
        let _first = server
            .mock("GET", "/repos/acme/widgets/pulls/7/files")
            .match_query(Matcher::Exact("per_page=100".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("link", next.as_str())
            .with_body(file_page(0..100))
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/repos/acme/widgets/pulls/7/files")
            .match_query(Matcher::Exact("per_page=100&page=2".into()))
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = GitHubClient::new("ghp_test", &server.url()).unwrap();
        let err = client
            .list_pull_request_files("acme", "widgets", 7)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GitHubApi(msg) if msg.contains("502")));
    }

    #[tokio::test]
    async fn test_list_files_propagates_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/acme/widgets/pulls/7/files")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let client = GitHubClient::new("ghp_test", &server.url()).unwrap();
        let err = client
            .list_pull_request_files("acme", "widgets", 7)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GitHubApi(_)));
    }

    #[tokio::test]
    async fn test_post_comment_and_status() {
        let mut server = Server::new_async().await;
        let comment = server
            .mock("POST", "/repos/acme/widgets/issues/7/comments")
            .match_body(Matcher::Json(serde_json::json!({"body": "looks good"})))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;
        let status = server
            .mock("POST", "/repos/acme/widgets/statuses/abc123")
            .match_body(Matcher::Json(serde_json::json!({
                "state": "failure",
                "description": "Changes requested",
                "context": STATUS_CONTEXT,
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let client = GitHubClient::new("ghp_test", &server.url()).unwrap();
        client
            .post_comment("acme", "widgets", 7, "looks good")
            .await
            .unwrap();
        client
            .set_commit_status(
                "acme",
                "widgets",
                "abc123",
                CommitState::Failure,
                "Changes requested",
            )
            .await
            .unwrap();

        comment.assert_async().await;
        status.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_comment_failure_is_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/repos/acme/widgets/issues/7/comments")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let client = GitHubClient::new("ghp_test", &server.url()).unwrap();
        let err = client
            .post_comment("acme", "widgets", 7, "hi")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("403"));
    }
}
