pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod llm;
pub mod analysis;

pub use config::{Config, PipelineConfig};
pub use error::{Error, Result};
pub use github::{CodeHost, GitHubClient, PullRequestRef};
pub use llm::{CompletionProvider, OpenAIProvider};
pub use analysis::{ReviewOutcome, ReviewPipeline};
