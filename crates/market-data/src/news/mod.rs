//! Market news from public RSS feeds.

mod fallback;
pub mod rss;
mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::serialize_millis;

pub use fallback::{fallback_news, NEWS_FALLBACK_WARNING};
pub use service::{merge_news, NewsService, DEFAULT_NEWS_TIMEOUT, MAX_NEWS_ITEMS};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    /// Plain text, at most 150 characters.
    pub excerpt: String,
    /// Display date, e.g. "Jan 29, 2026".
    pub date: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// One RSS source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsFeed {
    pub url: String,
    pub source: String,
}

impl NewsFeed {
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Economic Times markets, Moneycontrol market reports and Mint markets.
    pub fn defaults() -> Vec<NewsFeed> {
        vec![
            NewsFeed::new(
                "https://economictimes.indiatimes.com/markets/rssfeeds/1977021501.cms",
                "Economic Times",
            ),
            NewsFeed::new("https://www.moneycontrol.com/rss/marketreports.xml", "Moneycontrol"),
            NewsFeed::new("https://www.livemint.com/rss/markets", "Mint"),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub success: bool,
    pub data: Vec<NewsItem>,
    #[serde(serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
    pub is_live: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl NewsResponse {
    pub fn new(data: Vec<NewsItem>, timestamp: DateTime<Utc>, is_live: bool) -> Self {
        Self {
            success: true,
            data,
            timestamp,
            is_live,
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_news_response_json_shape() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 29, 10, 15, 0).unwrap();
        let response = NewsResponse::new(fallback_news(), ts, false).with_warning("stale");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["isLive"], false);
        assert_eq!(json["timestamp"], "2026-01-29T10:15:00.000Z");
        assert_eq!(json["warning"], "stale");
        // Fallback items have no link
        assert!(json["data"][0].get("link").is_none());
    }

    #[test]
    fn test_default_feeds() {
        let feeds = NewsFeed::defaults();
        let sources: Vec<&str> = feeds.iter().map(|f| f.source.as_str()).collect();
        assert_eq!(sources, vec!["Economic Times", "Moneycontrol", "Mint"]);
    }
}
