//! Concurrent article fetcher: a fixed-size worker pool drains a URL queue.
//!
//! Best-effort: a failed fetch or parse is logged and the article dropped.
//! Returns only after every URL was attempted. Output order is arrival order
//! and carries no meaning; the assembler sorts.

use crate::adapters::feeds::parse_article;
use crate::domain::{DomainError, NewsArticle};
use crate::ports::ContentSource;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Articles that made it plus the ones that did not.
#[derive(Debug, Default)]
pub struct ArticleBatch {
    pub articles: Vec<NewsArticle>,
    /// (url, reason) for every dropped article.
    pub failures: Vec<(String, String)>,
}

pub struct ArticleFetcher {
    source: Arc<dyn ContentSource>,
    workers: usize,
}

impl ArticleFetcher {
    pub fn new(source: Arc<dyn ContentSource>, workers: usize) -> Self {
        Self {
            source,
            workers: workers.max(1),
        }
    }

    pub async fn fetch_all(&self, urls: Vec<String>) -> ArticleBatch {
        let total = urls.len();
        if total == 0 {
            return ArticleBatch::default();
        }

        let queue = Arc::new(Mutex::new(VecDeque::from(urls)));
        let (tx, mut rx) = mpsc::unbounded_channel::<Result<NewsArticle, (String, DomainError)>>();

        let mut pool = JoinSet::new();
        for worker in 0..self.workers.min(total) {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let source = Arc::clone(&self.source);
            pool.spawn(async move {
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(url) = next else {
                        break;
                    };
                    let outcome = fetch_one(&*source, &url).await.map_err(|e| (url, e));
                    if tx.send(outcome).is_err() {
                        break;
                    }
                }
                debug!(worker, "article worker drained queue");
            });
        }
        drop(tx);

        // Fan-in barrier: every worker must finish before results are read.
        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "article worker crashed");
            }
        }

        let mut batch = ArticleBatch::default();
        while let Some(outcome) = rx.recv().await {
            match outcome {
                Ok(article) => batch.articles.push(article),
                Err((url, e)) => {
                    warn!(url = %url, error = %e, "dropping article");
                    batch.failures.push((url, e.to_string()));
                }
            }
        }

        info!(
            requested = total,
            fetched = batch.articles.len(),
            failed = batch.failures.len(),
            "article batch complete"
        );
        batch
    }
}

async fn fetch_one(source: &dyn ContentSource, url: &str) -> Result<NewsArticle, DomainError> {
    let html = source.fetch_text(url).await?;
    parse_article(&html, url)
}
