use anyhow::{Context, Result};
use clap::Parser;
use git_backdate::config::Config;
use git_backdate::date_range::DateRange;
use git_backdate::git::GitRepository;
use git_backdate::ledger::CommitLedger;
use git_backdate::orchestrator::{CommitOrchestrator, PublishPolicy, RunReport};
use git_backdate::paths::PlatformPaths;
use git_backdate::sampler::TimestampSampler;
use git_backdate::setup;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Generate signed commits with random author dates between a start date and now
#[derive(Parser, Debug)]
#[command(name = "git-backdate", version, long_version = LONG_VERSION, about)]
struct Cli {
    /// First day of the window (YYYY-MM-DD); the window always ends now
    #[arg(short, long, env = "GIT_BACKDATE_START")]
    start: String,

    /// Number of commits to generate
    #[arg(
        short = 'n',
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    count: u32,

    /// Push after every commit or once after the batch
    #[arg(long, value_enum)]
    policy: Option<PublishPolicy>,

    /// Seconds to wait for a single push
    #[arg(long)]
    push_timeout: Option<u64>,

    /// Ledger file (relative paths resolve against the repository root)
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Any path inside the target repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Remote to verify and push to
    #[arg(long)]
    remote: Option<String>,

    /// Seed the timestamp sampler for reproducible dates
    #[arg(long)]
    seed: Option<u64>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(policy) = self.policy {
            config.publish.policy = policy;
        }
        if let Some(secs) = self.push_timeout {
            config.publish.timeout_secs = secs;
        }
        if let Some(ledger) = &self.ledger {
            config.ledger.path = Some(ledger.clone());
        }
        if let Some(remote) = &self.remote {
            config.publish.remote = remote.clone();
        }
    }
}

fn print_report(report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Fail on a bad start date before touching the repository
    DateRange::validate(&cli.start).context("Invalid start date")?;

    let mut config = Config::load(cli.config.as_deref()).context("Configuration failed")?;
    cli.apply_to(&mut config);

    let gateway = GitRepository::discover(&cli.repo, config.publish.remote.clone())
        .context("Git repository check failed")?;
    setup::prepare_repository(&gateway, &config)
        .await
        .context("Repository preparation failed")?;

    let ledger = CommitLedger::new(PlatformPaths::ledger_path(
        gateway.workdir(),
        config.ledger.path.as_deref(),
    ));
    ledger
        .ensure_initialized()
        .context("Required ledger initialization failed")?;

    let cancel_token = CancellationToken::new();
    let ctrl_c_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current commit");
            ctrl_c_token.cancel();
        }
    });

    let orchestrator = CommitOrchestrator::new(gateway, ledger)
        .with_policy(config.publish.policy)
        .with_push_timeout(Duration::from_secs(config.publish.timeout_secs))
        .with_cancel_token(cancel_token);
    let mut orchestrator = match cli.seed {
        Some(seed) => orchestrator.with_sampler(TimestampSampler::seeded(seed)),
        None => orchestrator,
    };

    match orchestrator.run(cli.count as usize, &cli.start).await {
        Ok(report) => {
            if cli.json {
                print_report(&report)?;
            }
            tracing::info!(
                "Created and published {} commit(s) in {}",
                report.commits.len(),
                orchestrator.ledger().path().display()
            );
            Ok(())
        }
        Err(failure) => {
            if cli.json {
                print_report(&failure.report)?;
            }
            Err(failure).context("Commit generation failed")
        }
    }
}
