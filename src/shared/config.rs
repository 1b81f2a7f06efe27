//! Application configuration. Feed endpoints, target files, markers, git settings.

use crate::domain::{DomainError, FeedKind};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default size of the article worker pool.
pub const DEFAULT_WORKERS: usize = 5;

pub const DEFAULT_CALENDAR_URL: &str = "https://www.gomotionapp.com/rest/ics/system/5/Events.ics?key=l4eIgFXwqEbxbQz42YjRgg%3D%3D&enabled=false&tz=America%2FLos_Angeles";
pub const DEFAULT_NEWS_URL: &str = "https://www.gomotionapp.com/team/cadas/page/news";
pub const DEFAULT_ORIGIN: &str = "https://www.gomotionapp.com";
pub const DEFAULT_CALENDAR_DETAILS_URL: &str = "https://www.gomotionapp.com/team/cadas/controller/cms/admin/index?team=cadas#/calendar-team-events";
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";
pub const DEFAULT_START_MARKER: &str = "<!-- START UNDER HERE -->";
pub const DEFAULT_END_MARKER: &str = "<!-- END AUTOMATION SCRIPT -->";

const CALENDAR_COMMIT_MESSAGE: &str = "automated commit: sync TeamUnify calendar [skip ci]";
const NEWS_COMMIT_MESSAGE: &str = "automated commit: sync TeamUnify news articles [skip ci]";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppConfig {
    /// ICS feed URL. Read from SITE_SYNC_CALENDAR_URL.
    #[serde(default)]
    pub calendar_url: Option<String>,

    /// News listing page URL. Read from SITE_SYNC_NEWS_URL.
    #[serde(default)]
    pub news_url: Option<String>,

    /// Origin used to absolutize relative links and images. Read from SITE_SYNC_ORIGIN.
    #[serde(default)]
    pub origin: Option<String>,

    /// Target of the "More Details" button on every calendar event.
    #[serde(default)]
    pub calendar_details_url: Option<String>,

    /// IANA zone all calendar timestamps are converted into.
    #[serde(default)]
    pub timezone: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Target documents
    // ─────────────────────────────────────────────────────────────────────────
    /// Working copy of the website repository. Read from SITE_SYNC_REPO_DIR.
    #[serde(default)]
    pub repo_dir: Option<String>,

    #[serde(default)]
    pub calendar_file: Option<String>,

    #[serde(default)]
    pub news_file: Option<String>,

    #[serde(default)]
    pub start_marker: Option<String>,

    #[serde(default)]
    pub end_marker: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Fetching
    // ─────────────────────────────────────────────────────────────────────────
    /// Article worker pool size. Read from SITE_SYNC_WORKERS.
    #[serde(default)]
    pub workers: Option<usize>,

    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    #[serde(default)]
    pub user_agent: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Publishing
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub git_remote: Option<String>,

    /// Branch to push. When unset, HEAD is pushed to its upstream.
    #[serde(default)]
    pub git_branch: Option<String>,

    #[serde(default)]
    pub git_author_name: Option<String>,

    #[serde(default)]
    pub git_author_email: Option<String>,

    /// Access token used for push. Read from SITE_SYNC_GITHUB_TOKEN or PAT_TOKEN.
    #[serde(default)]
    pub github_token: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("SITE_SYNC"));
        if let Ok(path) = std::env::var("SITE_SYNC_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // PAT_TOKEN is read directly (no prefix) so existing CI secrets keep working
        if cfg.github_token.is_none() {
            if let Ok(token) = std::env::var("PAT_TOKEN") {
                if !token.is_empty() {
                    cfg.github_token = Some(token);
                }
            }
        }
        Ok(cfg)
    }

    pub fn calendar_url_or_default(&self) -> String {
        self.calendar_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CALENDAR_URL.to_string())
    }

    pub fn news_url_or_default(&self) -> String {
        self.news_url
            .clone()
            .unwrap_or_else(|| DEFAULT_NEWS_URL.to_string())
    }

    pub fn origin_or_default(&self) -> String {
        self.origin
            .clone()
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string())
    }

    /// Parsed origin. Fails if the configured value is not an absolute URL.
    pub fn origin_url(&self) -> Result<url::Url, DomainError> {
        let raw = self.origin_or_default();
        url::Url::parse(&raw)
            .map_err(|e| DomainError::Config(format!("invalid origin '{}': {}", raw, e)))
    }

    pub fn calendar_details_url_or_default(&self) -> String {
        self.calendar_details_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CALENDAR_DETAILS_URL.to_string())
    }

    /// Target time zone. An unknown zone name is a fatal configuration error.
    pub fn timezone(&self) -> Result<Tz, DomainError> {
        let name = self.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE);
        name.parse::<Tz>()
            .map_err(|e| DomainError::Config(format!("invalid timezone '{}': {}", name, e)))
    }

    pub fn repo_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.repo_dir.as_deref().unwrap_or("."))
    }

    /// Absolute-or-relative path of the document a feed is spliced into.
    pub fn document_path(&self, kind: FeedKind) -> PathBuf {
        let file = match kind {
            FeedKind::Calendar => self.calendar_file.as_deref().unwrap_or("calendar.html"),
            FeedKind::News => self.news_file.as_deref().unwrap_or("news.html"),
        };
        self.repo_dir_or_default().join(file)
    }

    pub fn start_marker_or_default(&self) -> String {
        self.start_marker
            .clone()
            .unwrap_or_else(|| DEFAULT_START_MARKER.to_string())
    }

    pub fn end_marker_or_default(&self) -> String {
        self.end_marker
            .clone()
            .unwrap_or_else(|| DEFAULT_END_MARKER.to_string())
    }

    pub fn commit_message(&self, kind: FeedKind) -> &'static str {
        match kind {
            FeedKind::Calendar => CALENDAR_COMMIT_MESSAGE,
            FeedKind::News => NEWS_COMMIT_MESSAGE,
        }
    }

    /// Returns worker pool size. Defaults to DEFAULT_WORKERS; never below 1.
    pub fn workers_or_default(&self) -> usize {
        self.workers.unwrap_or(DEFAULT_WORKERS).max(1)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(30))
    }

    pub fn user_agent_or_default(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| "Mozilla/5.0 (compatible; site-sync)".to_string())
    }

    pub fn git_remote_or_default(&self) -> String {
        self.git_remote
            .clone()
            .unwrap_or_else(|| "origin".to_string())
    }

    pub fn git_author_name_or_default(&self) -> String {
        self.git_author_name
            .clone()
            .unwrap_or_else(|| "site-sync bot".to_string())
    }

    pub fn git_author_email_or_default(&self) -> String {
        self.git_author_email
            .clone()
            .unwrap_or_else(|| "site-sync@users.noreply.github.com".to_string())
    }

    /// Token required for publishing. Missing token is a precondition failure.
    pub fn require_token(&self) -> Result<String, DomainError> {
        self.github_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                DomainError::Credentials(
                    "set SITE_SYNC_GITHUB_TOKEN or PAT_TOKEN to publish".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_team_site() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.origin_or_default(), DEFAULT_ORIGIN);
        assert_eq!(cfg.workers_or_default(), DEFAULT_WORKERS);
        assert_eq!(cfg.timezone().unwrap(), chrono_tz::America::Los_Angeles);
        assert_eq!(
            cfg.document_path(FeedKind::News),
            PathBuf::from(".").join("news.html")
        );
    }

    #[test]
    fn zero_workers_is_clamped() {
        let cfg = AppConfig {
            workers: Some(0),
            ..Default::default()
        };
        assert_eq!(cfg.workers_or_default(), 1);
    }

    #[test]
    fn unknown_timezone_is_a_config_error() {
        let cfg = AppConfig {
            timezone: Some("Mars/Olympus_Mons".into()),
            ..Default::default()
        };
        assert!(matches!(cfg.timezone(), Err(DomainError::Config(_))));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let cfg = AppConfig {
            github_token: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            cfg.require_token(),
            Err(DomainError::Credentials(_))
        ));
    }
}
