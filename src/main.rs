//! Wiring & DI. Entry point: parse CLI, bootstrap adapters, run the pipeline(s).
//! No business logic here.

use clap::{Parser, ValueEnum};
use site_sync::adapters::git::{GitPublisher, GitSettings};
use site_sync::adapters::http::ReqwestSource;
use site_sync::adapters::persistence::FsDocumentStore;
use site_sync::domain::FeedKind;
use site_sync::ports::{ContentSource, DocumentStore, Publisher};
use site_sync::shared::config::AppConfig;
use site_sync::usecases::SyncService;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sync TeamUnify calendar and news feeds into the team website.
#[derive(Parser, Debug)]
#[command(name = "site-sync", version, about)]
struct Cli {
    /// Which feed to sync.
    #[arg(value_enum)]
    feed: FeedArg,

    /// Fetch and patch in memory only; never write or publish.
    #[arg(long)]
    dry_run: bool,

    /// Verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FeedArg {
    Calendar,
    News,
    All,
}

impl FeedArg {
    fn kinds(self) -> Vec<FeedKind> {
        match self {
            FeedArg::Calendar => vec![FeedKind::Calendar],
            FeedArg::News => vec![FeedKind::News],
            FeedArg::All => vec![FeedKind::Calendar, FeedKind::News],
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let env_loaded = dotenv::dotenv();
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(outcome = "aborted", error = %e, "startup failed");
            ExitCode::FAILURE
        }
    }
}

/// Returns Ok(false) when at least one feed run aborted.
async fn run(cli: &Cli) -> anyhow::Result<bool> {
    let cfg = AppConfig::load()?;

    // Credentials are a precondition for publishing; check before any fetch.
    let token = if cli.dry_run {
        cfg.github_token.clone()
    } else {
        Some(cfg.require_token()?)
    };

    let source: Arc<dyn ContentSource> = Arc::new(ReqwestSource::new(
        &cfg.user_agent_or_default(),
        cfg.http_timeout(),
    )?);
    let store: Arc<dyn DocumentStore> = Arc::new(FsDocumentStore::new());
    let publisher: Arc<dyn Publisher> = Arc::new(GitPublisher::new(GitSettings {
        repo_dir: cfg.repo_dir_or_default(),
        remote: cfg.git_remote_or_default(),
        branch: cfg.git_branch.clone(),
        author_name: cfg.git_author_name_or_default(),
        author_email: cfg.git_author_email_or_default(),
        token,
    }));

    info!(
        repo_dir = %cfg.repo_dir_or_default().display(),
        workers = cfg.workers_or_default(),
        dry_run = cli.dry_run,
        "starting sync"
    );
    let service = SyncService::new(&cfg, source, store, publisher, cli.dry_run)?;

    let mut all_ok = true;
    for kind in cli.feed.kinds() {
        // Each feed is independent; outcome already logged by the service.
        if service.run(kind).await.is_err() {
            all_ok = false;
        }
    }
    Ok(all_ok)
}
