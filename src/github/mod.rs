pub mod client;
pub mod event;
pub mod host;
pub mod paginator;

pub use client::GitHubClient;
pub use event::PullRequestRef;
pub use host::CodeHost;
pub use paginator::Paginator;
