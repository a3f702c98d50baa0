use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::fallback::{fallback_news, NEWS_FALLBACK_WARNING};
use super::rss::parse_feed;
use super::{NewsFeed, NewsItem, NewsResponse};
use crate::errors::MarketDataError;
use crate::provider::headers::feed_headers;
use crate::provider::http_client;

/// Per-feed request timeout.
pub const DEFAULT_NEWS_TIMEOUT: Duration = Duration::from_secs(10);

/// Items kept after merging all feeds.
pub const MAX_NEWS_ITEMS: usize = 10;

const NEWS_CLIENT_ID: &str = "NEWS";

#[derive(Clone)]
pub struct NewsService {
    client: Client,
    feeds: Vec<NewsFeed>,
}

impl NewsService {
    pub fn new(feeds: Vec<NewsFeed>, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = http_client(NEWS_CLIENT_ID, feed_headers(), timeout)?;
        Ok(Self { client, feeds })
    }

    pub fn feeds(&self) -> &[NewsFeed] {
        &self.feeds
    }

    /// Fetch every feed concurrently and build the news envelope.
    ///
    /// Never fails: when no feed yields an item the static headlines are
    /// returned with `is_live = false`.
    pub async fn latest(&self) -> NewsResponse {
        let fetches = self.feeds.iter().map(|feed| self.fetch_feed(feed));
        let items = merge_news(join_all(fetches).await);

        if items.is_empty() {
            warn!("No news feed returned items, serving fallback headlines");
            return NewsResponse::new(fallback_news(), Utc::now(), false)
                .with_warning(NEWS_FALLBACK_WARNING);
        }

        info!("Collected {} news items from {} feeds", items.len(), self.feeds.len());
        NewsResponse::new(items, Utc::now(), true)
    }

    async fn fetch_feed(&self, feed: &NewsFeed) -> Vec<NewsItem> {
        let response = match self.client.get(&feed.url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("News feed {} failed: {}", feed.source, e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!(
                "News feed {} returned status {}",
                feed.source,
                response.status()
            );
            return Vec::new();
        }

        match response.text().await {
            Ok(body) => {
                let items = parse_feed(&body, &feed.source, Utc::now());
                debug!("News feed {} yielded {} items", feed.source, items.len());
                items
            }
            Err(e) => {
                warn!("News feed {} body could not be read: {}", feed.source, e);
                Vec::new()
            }
        }
    }
}

/// Concatenate per-feed items in feed order, drop repeated titles
/// (case-insensitive, first wins) and keep at most [`MAX_NEWS_ITEMS`].
pub fn merge_news(batches: impl IntoIterator<Item = Vec<NewsItem>>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|item| seen.insert(item.title.to_lowercase()))
        .take(MAX_NEWS_ITEMS)
        .collect()
}
