use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::analysis::comment::render_comment;
use crate::analysis::file_filter::FileFilter;
use crate::analysis::review_engine::ReviewEngine;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::github::{CodeHost, PullRequestRef};
use crate::llm::{interpret_response, CompletionProvider, ReviewPrompt};
use crate::models::{AnalysisResult, ChangedFile, CommitState, PullRequest, ValidationRule};

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub result: AnalysisResult,
    pub comment: String,
    pub files_total: usize,
    pub files_reviewed: usize,
}

pub struct ReviewPipeline {
    host: Arc<dyn CodeHost>,
    engine: ReviewEngine,
    filter: FileFilter,
    rules: Vec<ValidationRule>,
    config: PipelineConfig,
}

impl ReviewPipeline {
    pub fn new(
        host: Arc<dyn CodeHost>,
        llm: Arc<dyn CompletionProvider>,
        rules: Vec<ValidationRule>,
        config: PipelineConfig,
    ) -> Result<Self> {
        Ok(Self {
            host,
            engine: ReviewEngine::new(llm, config.models.clone())?,
            filter: FileFilter::new(config.exclude_patterns.as_slice())?,
            rules,
            config,
        })
    }

    pub async fn run(&self, target: &PullRequestRef) -> Result<ReviewOutcome> {
        // Step 1: Fetch pull request metadata
        let pr = self
            .host
            .get_pull_request(&target.owner, &target.repo, target.number)
            .await?;

        self.report_status(target, &pr, CommitState::Pending, "Review in progress")
            .await;

        // Steps 2-6: select, prompt, review, interpret, comment
        let outcome = self.review(target, &pr).await;

        match &outcome {
            Ok(outcome) => {
                let description = if outcome.result.approved {
                    "Approved"
                } else {
                    "Changes requested"
                };
                let state = CommitState::from_approval(outcome.result.approved);
                self.report_status(target, &pr, state, description).await;
            }
            Err(e) => {
                tracing::error!("Review of {} failed: {}", target, e);
                self.report_status(target, &pr, CommitState::Failure, "Review could not be completed")
                    .await;
            }
        }

        outcome
    }

    async fn review(&self, target: &PullRequestRef, pr: &PullRequest) -> Result<ReviewOutcome> {
        let all_files = self
            .host
            .list_pull_request_files(&target.owner, &target.repo, target.number)
            .await?;
        let files_total = all_files.len();
        let files = self.select_files(all_files);

        let prompt = ReviewPrompt::build(&self.rules, pr, &files);
        tracing::debug!(
            "Prompt: {} system / {} user characters, models: {}",
            prompt.system.len(),
            prompt.user.len(),
            self.engine.models().join(", ")
        );

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Reviewing {} file(s)", files.len()));
        spinner.enable_steady_tick(Duration::from_millis(120));
        let raw = self.engine.review(&prompt).await;
        spinner.finish_and_clear();
        let raw = raw?;

        let result = interpret_response(&raw);
        tracing::info!(
            "Verdict for {}: {} ({} issue(s))",
            target,
            if result.approved { "approved" } else { "changes requested" },
            result.issues.len()
        );

        let comment = render_comment(&result);

        if self.config.post_comment {
            if let Err(e) = self
                .host
                .post_comment(&target.owner, &target.repo, target.number, &comment)
                .await
            {
                tracing::error!("Failed to post review comment on {}: {}", target, e);
            }
        }

        Ok(ReviewOutcome {
            result,
            comment,
            files_total,
            files_reviewed: files.len(),
        })
    }

    fn select_files(&self, files: Vec<ChangedFile>) -> Vec<ChangedFile> {
        let total = files.len();
        let mut selected = self.filter.filter(files);

        if let Some(max) = self.config.max_files {
            if selected.len() > max {
                tracing::info!("Capping review at {} files", max);
                selected.truncate(max);
            }
        }

        tracing::info!("Analyzing {} of {} changed files", selected.len(), total);
        selected
    }

    async fn report_status(
        &self,
        target: &PullRequestRef,
        pr: &PullRequest,
        state: CommitState,
        description: &str,
    ) {
        if !self.config.report_status {
            return;
        }

        if let Err(e) = self
            .host
            .set_commit_status(&target.owner, &target.repo, &pr.head.sha, state, description)
            .await
        {
            tracing::warn!("Failed to set commit status {}: {}", state, e);
        }
    }
}
