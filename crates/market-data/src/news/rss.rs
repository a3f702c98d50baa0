//! Minimal RSS 2.0 item extraction.
//!
//! Feeds are read with a handful of regular expressions rather than a full
//! XML parser: only `<item>` blocks and four child elements matter, and
//! publishers are inconsistent about CDATA and entity escaping anyway.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use super::NewsItem;

/// Items kept per feed.
pub const MAX_ITEMS_PER_FEED: usize = 5;

const EXCERPT_CHARS: usize = 150;
const TITLE_EXCERPT_CHARS: usize = 100;

lazy_static! {
    static ref ITEM_RE: Regex =
        Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>").expect("Invalid regex pattern");
    static ref TITLE_RE: Regex =
        Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("Invalid regex pattern");
    static ref DESCRIPTION_RE: Regex =
        Regex::new(r"(?is)<description\b[^>]*>(.*?)</description>").expect("Invalid regex pattern");
    static ref PUB_DATE_RE: Regex =
        Regex::new(r"(?is)<pubDate\b[^>]*>(.*?)</pubDate>").expect("Invalid regex pattern");
    static ref LINK_RE: Regex =
        Regex::new(r"(?is)<link\b[^>]*>(.*?)</link>").expect("Invalid regex pattern");
    static ref CDATA_RE: Regex =
        Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("Invalid regex pattern");
    static ref TAG_RE: Regex = Regex::new(r"<[^>]*>").expect("Invalid regex pattern");
    static ref NUMERIC_ENTITY_RE: Regex =
        Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("Invalid regex pattern");
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").expect("Invalid regex pattern");
}

/// Parse up to [`MAX_ITEMS_PER_FEED`] items from an RSS document.
///
/// Items without a title are skipped. `today` is used for items with a
/// missing or unparseable `pubDate`.
pub fn parse_feed(xml: &str, source: &str, today: DateTime<Utc>) -> Vec<NewsItem> {
    ITEM_RE
        .captures_iter(xml)
        .take(MAX_ITEMS_PER_FEED)
        .filter_map(|caps| parse_item(&caps[1], source, today))
        .collect()
}

fn parse_item(block: &str, source: &str, today: DateTime<Utc>) -> Option<NewsItem> {
    let title = element_text(block, &TITLE_RE).filter(|t| !t.is_empty())?;

    let description = element_text(block, &DESCRIPTION_RE).unwrap_or_default();
    let excerpt = if description.is_empty() {
        truncate_chars(&title, TITLE_EXCERPT_CHARS)
    } else {
        truncate_chars(&description, EXCERPT_CHARS)
    };

    let published = element_text(block, &PUB_DATE_RE)
        .and_then(|raw| DateTime::parse_from_rfc2822(&raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(today);

    let link = element_text(block, &LINK_RE).filter(|l| !l.is_empty());

    Some(NewsItem {
        title,
        excerpt,
        date: format_news_date(published),
        source: source.to_string(),
        link,
    })
}

/// Inner text of the first matching element: CDATA unwrapped, entities
/// decoded, tags stripped, whitespace collapsed.
fn element_text(block: &str, re: &Regex) -> Option<String> {
    let raw = re.captures(block)?.get(1)?.as_str();
    let unwrapped = CDATA_RE.replace_all(raw, "$1");
    let decoded = decode_entities(&unwrapped);
    let stripped = TAG_RE.replace_all(&decoded, " ");
    Some(WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string())
}

fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY_RE.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix(|c| c == 'x' || c == 'X') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    // &amp; last so "&amp;lt;" decodes to "&lt;", not "<"
    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect::<String>().trim_end().to_string()
}

/// "Jan 29, 2026" in Indian Standard Time.
pub fn format_news_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&chrono_tz::Asia::Kolkata)
        .format("%b %-d, %Y")
        .to_string()
}
