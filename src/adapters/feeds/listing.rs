//! News listing page → candidate article URLs.

use super::selector;
use crate::domain::DomainError;
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

/// Class marking promotional listing entries that are not articles.
const SUPPLEMENT_CLASS: &str = "Supplement";

/// Extract absolute article URLs from the listing page, in page order.
///
/// Entries flagged as supplemental are excluded; duplicate links keep their
/// first position.
pub fn article_urls(html: &str, origin: &Url) -> Result<Vec<String>, DomainError> {
    let document = Html::parse_document(html);
    let item_sel = selector("div.Item")?;
    let link_sel = selector("a[href]")?;

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut skipped = 0usize;

    for item in document.select(&item_sel) {
        if item.value().classes().any(|c| c == SUPPLEMENT_CLASS) {
            skipped += 1;
            continue;
        }
        let Some(href) = item
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            debug!("listing item without link");
            continue;
        };
        let absolute = match origin.join(href.trim()) {
            Ok(u) => u.to_string(),
            Err(e) => {
                debug!(href, error = %e, "unresolvable listing link");
                continue;
            }
        };
        if seen.insert(absolute.clone()) {
            urls.push(absolute);
        }
    }

    info!(count = urls.len(), supplements_skipped = skipped, "indexed article URLs");
    Ok(urls)
}
