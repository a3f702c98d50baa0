//! Turns poller state into what the ticker strip shows.

use std::fmt;

use chrono_tz::Asia::Kolkata;
use nifsen_market_data::{MarketDataResponse, MarketStatus, Quote};
use rust_decimal::Decimal;

use crate::state::TickerState;

pub const LOADING_TEXT: &str = "Loading market data...";
pub const RETRY_LABEL: &str = "Retry";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    fn of(change: Decimal) -> Self {
        if change > Decimal::ZERO {
            Trend::Up
        } else if change < Decimal::ZERO {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    fn arrow(self) -> char {
        match self {
            Trend::Up => '▲',
            Trend::Down => '▼',
            Trend::Flat => '–',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickerItem {
    pub symbol: String,
    pub price_label: String,
    pub change_label: String,
    pub trend: Trend,
}

impl From<&Quote> for TickerItem {
    fn from(quote: &Quote) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            price_label: format_price(&quote.currency, quote.price),
            change_label: format_change_percent(quote.change, quote.change_percent),
            trend: Trend::of(quote.change),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickerView {
    Loading(String),
    Error {
        message: String,
        retry_label: String,
    },
    Marquee {
        status_label: String,
        /// The quote list twice in a row, so the scroll can wrap seamlessly.
        items: Vec<TickerItem>,
        /// HH:MM, Indian Standard Time.
        updated_at: String,
    },
}

pub fn render(state: &TickerState) -> TickerView {
    match state {
        TickerState::Loading => TickerView::Loading(LOADING_TEXT.to_string()),
        TickerState::Failed { message, .. } => TickerView::Error {
            message: message.clone(),
            retry_label: RETRY_LABEL.to_string(),
        },
        TickerState::Ready(snapshot) => marquee(snapshot),
    }
}

fn marquee(snapshot: &MarketDataResponse) -> TickerView {
    let status_label = match snapshot.market_status {
        MarketStatus::Open => "Market Open",
        MarketStatus::Closed => "Market Closed",
    };
    let items = snapshot
        .data
        .iter()
        .chain(snapshot.data.iter())
        .map(TickerItem::from)
        .collect();
    let updated_at = snapshot
        .timestamp
        .with_timezone(&Kolkata)
        .format("%H:%M")
        .to_string();

    TickerView::Marquee {
        status_label: status_label.to_string(),
        items,
        updated_at,
    }
}

/// Currency symbol plus en-IN digit grouping, at most two decimals:
/// `₹1,23,456.79`, `$43,200`.
pub fn format_price(currency: &str, price: Decimal) -> String {
    let rounded = price.round_dp(2).normalize();
    let text = rounded.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if rounded < Decimal::ZERO {
        out.push('-');
    }
    out.push_str(currency);
    out.push_str(&group_indian(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// `1234567` -> `12,34,567`: the last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (mut head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    while head.len() > 2 {
        let (rest, pair) = head.split_at(head.len() - 2);
        groups.push(pair);
        head = rest;
    }
    if !head.is_empty() {
        groups.push(head);
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// `+0.05%`, `-1.20%`, `0.00%`. The plus sign follows the absolute change.
pub fn format_change_percent(change: Decimal, change_percent: Decimal) -> String {
    let mut pct = change_percent.round_dp(2);
    pct.rescale(2);
    if change > Decimal::ZERO && pct >= Decimal::ZERO {
        format!("+{}%", pct)
    } else {
        format!("{}%", pct)
    }
}

impl fmt::Display for TickerView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickerView::Loading(text) => write!(f, "{}", text),
            TickerView::Error {
                message,
                retry_label,
            } => write!(f, "{} [{}]", message, retry_label),
            TickerView::Marquee {
                status_label,
                items,
                updated_at,
            } => {
                write!(f, "● {}", status_label)?;
                // one pass is enough on a terminal
                for item in &items[..items.len() / 2] {
                    write!(
                        f,
                        " | {} {} {} {}",
                        item.symbol,
                        item.price_label,
                        item.trend.arrow(),
                        item.change_label
                    )?;
                }
                write!(f, " | {}", updated_at)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn snapshot(status: MarketStatus) -> MarketDataResponse {
        let quotes = vec![
            Quote::new("NIFTY", "Nifty 50", dec!(23250.4), dec!(12.3), dec!(0.05), true),
            Quote::new("DOW", "Dow Jones", dec!(43200), dec!(-518.4), dec!(-1.2), false)
                .with_currency("$"),
            Quote::new("GOLD", "Gold", dec!(78500), dec!(0), dec!(0), true),
        ];
        // 10:15 UTC is 15:45 IST
        let ts = Utc.with_ymd_and_hms(2026, 1, 29, 10, 15, 0).unwrap();
        MarketDataResponse::new(quotes, ts, true, status)
    }

    #[test]
    fn test_loading_view() {
        assert_eq!(
            render(&TickerState::Loading),
            TickerView::Loading("Loading market data...".to_string())
        );
    }

    #[test]
    fn test_error_view_offers_retry() {
        let state = TickerState::Failed {
            message: "Network error".to_string(),
            last: Some(snapshot(MarketStatus::Open)),
        };
        assert_eq!(
            render(&state),
            TickerView::Error {
                message: "Network error".to_string(),
                retry_label: "Retry".to_string(),
            }
        );
    }

    #[test]
    fn test_marquee_doubles_items() {
        let view = render(&TickerState::Ready(snapshot(MarketStatus::Open)));
        let TickerView::Marquee {
            status_label,
            items,
            updated_at,
        } = view
        else {
            panic!("expected marquee");
        };

        assert_eq!(status_label, "Market Open");
        assert_eq!(updated_at, "15:45");
        let symbols: Vec<&str> = items.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["NIFTY", "DOW", "GOLD", "NIFTY", "DOW", "GOLD"]);

        assert_eq!(items[0].price_label, "₹23,250.4");
        assert_eq!(items[0].change_label, "+0.05%");
        assert_eq!(items[0].trend, Trend::Up);
        assert_eq!(items[1].price_label, "$43,200");
        assert_eq!(items[1].change_label, "-1.20%");
        assert_eq!(items[1].trend, Trend::Down);
        assert_eq!(items[2].change_label, "0.00%");
        assert_eq!(items[2].trend, Trend::Flat);
    }

    #[test]
    fn test_closed_status_label() {
        let view = render(&TickerState::Ready(snapshot(MarketStatus::Closed)));
        assert!(matches!(
            view,
            TickerView::Marquee { ref status_label, .. } if status_label == "Market Closed"
        ));
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_price("₹", dec!(0)), "₹0");
        assert_eq!(format_price("₹", dec!(999)), "₹999");
        assert_eq!(format_price("₹", dec!(6150)), "₹6,150");
        assert_eq!(format_price("₹", dec!(81512.30)), "₹81,512.3");
        assert_eq!(format_price("₹", dec!(123456.789)), "₹1,23,456.79");
        assert_eq!(format_price("₹", dec!(12345678)), "₹1,23,45,678");
    }

    #[test]
    fn test_display_prints_one_pass() {
        let view = render(&TickerState::Ready(snapshot(MarketStatus::Open)));
        let line = view.to_string();
        assert!(line.starts_with("● Market Open | NIFTY ₹23,250.4 ▲ +0.05%"));
        assert!(line.ends_with("| 15:45"));
        assert_eq!(line.matches("NIFTY").count(), 1);
    }
}
