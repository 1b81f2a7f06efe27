//! Pipeline orchestration: fetch → (expand) → transform → assemble → patch → publish.
//!
//! - Reads and validates the target document before any network traffic
//! - Absorbs per-article failures; everything else aborts the run
//! - Emits exactly one terminal log line per run

use crate::domain::{DomainError, FeedItem, FeedKind, FetchedFeed, RunOutcome};
use crate::ports::{ContentSource, DocumentStore, Publisher};
use crate::shared::config::AppConfig;
use crate::usecases::article_fetcher::ArticleFetcher;
use crate::usecases::assembler::assemble;
use crate::usecases::feed_source::{FeedEndpoints, FeedSource};
use crate::usecases::patcher::{locate, patch};
use crate::usecases::publication::PublicationGuard;
use crate::usecases::transform::Transformer;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Per-feed target and markers, resolved from configuration up front.
#[derive(Debug, Clone)]
pub struct SyncTargets {
    pub calendar_path: PathBuf,
    pub news_path: PathBuf,
    pub start_marker: String,
    pub end_marker: String,
    pub calendar_message: String,
    pub news_message: String,
}

impl SyncTargets {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            calendar_path: cfg.document_path(FeedKind::Calendar),
            news_path: cfg.document_path(FeedKind::News),
            start_marker: cfg.start_marker_or_default(),
            end_marker: cfg.end_marker_or_default(),
            calendar_message: cfg.commit_message(FeedKind::Calendar).to_string(),
            news_message: cfg.commit_message(FeedKind::News).to_string(),
        }
    }

    fn path(&self, kind: FeedKind) -> &PathBuf {
        match kind {
            FeedKind::Calendar => &self.calendar_path,
            FeedKind::News => &self.news_path,
        }
    }

    fn message(&self, kind: FeedKind) -> &str {
        match kind {
            FeedKind::Calendar => &self.calendar_message,
            FeedKind::News => &self.news_message,
        }
    }
}

pub struct SyncService {
    feeds: FeedSource,
    articles: ArticleFetcher,
    transformer: Transformer,
    store: Arc<dyn DocumentStore>,
    publisher: Arc<dyn Publisher>,
    guard: PublicationGuard,
    targets: SyncTargets,
    dry_run: bool,
}

impl SyncService {
    /// Wire the pipeline from configuration. Fails on invalid origin or time zone.
    pub fn new(
        cfg: &AppConfig,
        source: Arc<dyn ContentSource>,
        store: Arc<dyn DocumentStore>,
        publisher: Arc<dyn Publisher>,
        dry_run: bool,
    ) -> Result<Self, DomainError> {
        let tz = cfg.timezone()?;
        let origin = cfg.origin_url()?;
        let endpoints = FeedEndpoints {
            calendar_url: cfg.calendar_url_or_default(),
            news_url: cfg.news_url_or_default(),
            origin: origin.clone(),
            tz,
        };

        Ok(Self {
            feeds: FeedSource::new(Arc::clone(&source), endpoints),
            articles: ArticleFetcher::new(source, cfg.workers_or_default()),
            transformer: Transformer::new(tz, origin, cfg.calendar_details_url_or_default()),
            guard: PublicationGuard::new(Arc::clone(&store), Arc::clone(&publisher)),
            store,
            publisher,
            targets: SyncTargets::from_config(cfg),
            dry_run,
        })
    }

    /// Run one feed now. Logs the terminal outcome line.
    pub async fn run(&self, kind: FeedKind) -> Result<RunOutcome, DomainError> {
        self.run_at(kind, Utc::now()).await
    }

    /// Run one feed with an explicit "now" (freshness filter and ICS window).
    pub async fn run_at(
        &self,
        kind: FeedKind,
        now: DateTime<Utc>,
    ) -> Result<RunOutcome, DomainError> {
        let result = self.execute(kind, now).await;
        match &result {
            Ok(RunOutcome::DryRun { changed }) => {
                info!(feed = %kind, outcome = "dry-run", would_change = *changed, "sync finished")
            }
            Ok(outcome) => info!(feed = %kind, outcome = %outcome, "sync finished"),
            Err(e) => error!(feed = %kind, outcome = "aborted", error = %e, "sync finished"),
        }
        result
    }

    async fn execute(
        &self,
        kind: FeedKind,
        now: DateTime<Utc>,
    ) -> Result<RunOutcome, DomainError> {
        let path = self.targets.path(kind);
        let start = &self.targets.start_marker;
        let end = &self.targets.end_marker;

        // Precondition: markers must already exist. Checked before fetching.
        let document = self.store.read(path).await?;
        locate(&document, start, end)?;

        let items = self.collect_items(kind, now).await?;
        let inner = assemble(kind, items, now, |item| self.transformer.transform(item));
        let result = patch(&document, start, &inner, end)?;

        if self.dry_run {
            return Ok(RunOutcome::DryRun {
                changed: result.changed,
            });
        }

        let message = self.targets.message(kind);
        if self.guard.maybe_publish(path, &result, message).await? {
            return Ok(RunOutcome::Published);
        }

        // A previous run may have written the file but failed to push.
        if self.publisher.has_pending(path).await? {
            info!(path = %path.display(), "retrying publish of pending changes");
            self.publisher.publish(&[path.clone()], message).await?;
            return Ok(RunOutcome::PublishRetried);
        }
        Ok(RunOutcome::Unchanged)
    }

    async fn collect_items(
        &self,
        kind: FeedKind,
        now: DateTime<Utc>,
    ) -> Result<Vec<FeedItem>, DomainError> {
        match self.feeds.fetch(kind, now).await? {
            FetchedFeed::Events(events) => {
                if events.is_empty() {
                    return Err(DomainError::EmptyFeed(kind.to_string()));
                }
                Ok(events.into_iter().map(FeedItem::from).collect())
            }
            FetchedFeed::ArticleUrls(urls) => {
                if urls.is_empty() {
                    return Err(DomainError::EmptyFeed(kind.to_string()));
                }
                let batch = self.articles.fetch_all(urls).await;
                if batch.articles.is_empty() {
                    return Err(DomainError::EmptyFeed(kind.to_string()));
                }
                Ok(batch.articles.into_iter().map(FeedItem::from).collect())
            }
        }
    }
}
