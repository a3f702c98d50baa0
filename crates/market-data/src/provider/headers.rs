//! HTTP headers for the exchange and quote endpoints

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT,
};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36";

/// Create headers for NSE requests. The data call adds `Cookie` and `Referer`.
pub fn nse_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

/// Create headers for BSE API requests
pub fn bse_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.bseindia.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.bseindia.com"));
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

/// Create headers for Yahoo Finance requests
pub fn yahoo_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

/// Create headers for RSS feed requests
pub fn feed_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/rss+xml, application/xml, text/xml, */*"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nse_headers_look_like_a_browser() {
        let headers = nse_headers();
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
        let agent = headers.get(USER_AGENT).unwrap().to_str().unwrap();
        assert!(agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_bse_headers_have_site_origin() {
        let headers = bse_headers();
        assert_eq!(
            headers.get(REFERER).unwrap().to_str().unwrap(),
            "https://www.bseindia.com/"
        );
        assert_eq!(
            headers.get(ORIGIN).unwrap().to_str().unwrap(),
            "https://www.bseindia.com"
        );
    }

    #[test]
    fn test_yahoo_headers_have_user_agent() {
        assert!(yahoo_headers().contains_key(USER_AGENT));
    }
}
