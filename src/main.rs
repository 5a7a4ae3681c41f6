use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use prgate::analysis::ReviewOutcome;
use prgate::models::{default_rules, load_rules, ValidationRule};
use prgate::{Config, GitHubClient, OpenAIProvider, PipelineConfig, PullRequestRef, ReviewPipeline};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "prgate")]
#[command(version)]
#[command(about = "Review a pull request with an LLM and fail the job when changes are requested")]
struct Args {
    /// Pull request to review (owner/repo#N); defaults to the GitHub Actions event
    #[arg(long)]
    pr: Option<PullRequestRef>,

    /// JSON file with validation rules (overrides REVIEW_RULES_PATH)
    #[arg(long)]
    rules: Option<String>,

    /// Review without posting a comment or commit status
    #[arg(long)]
    dry_run: bool,

    /// Do not set a commit status
    #[arg(long)]
    no_status: bool,

    /// What to print to stdout
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write the rendered comment to this file
    #[arg(short, long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    match run(args).await {
        Ok(approved) => {
            if !approved {
                tracing::warn!("Changes requested, failing the job");
            }
            ExitCode::from(exit_status(approved))
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Process status for a finished review: 0 approves, 1 requests changes.
fn exit_status(approved: bool) -> u8 {
    if approved {
        0
    } else {
        1
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("prgate=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let config = Config::from_env()?;

    let target = match args.pr.clone() {
        Some(pr) => pr,
        None => PullRequestRef::from_github_env()?,
    };

    let rules = resolve_rules(&args, &config)?;

    let github = GitHubClient::new(&config.github_token, &config.github_api_url)?;
    let llm = OpenAIProvider::new(config.openai_api_key.clone(), &config.openai_base_url)?;

    let mut pipeline_config = PipelineConfig::from(&config);
    pipeline_config.post_comment = !args.dry_run;
    pipeline_config.report_status = !args.dry_run && !args.no_status;

    let pipeline = ReviewPipeline::new(Arc::new(github), Arc::new(llm), rules, pipeline_config)?;

    tracing::info!("Starting review of {}", target);
    let outcome = pipeline
        .run(&target)
        .await
        .with_context(|| format!("review of {} failed", target))?;

    output_outcome(&outcome, &args)?;

    Ok(outcome.result.approved)
}

fn resolve_rules(args: &Args, config: &Config) -> anyhow::Result<Vec<ValidationRule>> {
    match args.rules.as_ref().or(config.rules_path.as_ref()) {
        Some(path) => load_rules(path).with_context(|| format!("loading rules from {}", path)),
        None => Ok(default_rules()),
    }
}

fn output_outcome(outcome: &ReviewOutcome, args: &Args) -> anyhow::Result<()> {
    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&outcome.result)?,
        OutputFormat::Text => outcome.comment.clone(),
    };
    println!("{}", output);

    if let Some(ref path) = args.output {
        std::fs::write(path, &outcome.comment)?;
        tracing::info!("Comment written to: {}", path);
    }

    Ok(())
}
