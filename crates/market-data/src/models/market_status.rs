//! Trading-session window and the open/closed indicator.

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::quote::Quote;

/// Aggregate market status reported in the response envelope.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Open,
    Closed,
}

impl MarketStatus {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A weekday trading window in a fixed time zone. Both ends are inclusive.
#[derive(Clone, Debug)]
pub struct MarketSession {
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
}

impl MarketSession {
    pub fn new(tz: Tz, open: NaiveTime, close: NaiveTime) -> Self {
        Self { tz, open, close }
    }

    /// Indian equity session: 09:15 to 15:30 IST, Monday to Friday.
    pub fn nse() -> Self {
        Self {
            tz: chrono_tz::Asia::Kolkata,
            open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Whether the session window contains `at`.
    pub fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        let local = self.tz.from_utc_datetime(&at.naive_utc());
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        // Minute resolution: 15:30:59 still counts as 15:30.
        let minutes = local.hour() * 60 + local.minute();
        let open = self.open.hour() * 60 + self.open.minute();
        let close = self.close.hour() * 60 + self.close.minute();
        (open..=close).contains(&minutes)
    }

    pub fn status_at(&self, at: DateTime<Utc>) -> MarketStatus {
        if self.is_open_at(at) {
            MarketStatus::Open
        } else {
            MarketStatus::Closed
        }
    }

    /// Combine the session clock with what live sources report.
    ///
    /// Open when the window is open, or when any live-sourced quote says its
    /// session is trading (US indices and commodities keep trading after the
    /// Indian close).
    pub fn resolve<'a>(
        &self,
        at: DateTime<Utc>,
        live_quotes: impl IntoIterator<Item = &'a Quote>,
    ) -> MarketStatus {
        if self.is_open_at(at) || live_quotes.into_iter().any(|q| q.is_open) {
            MarketStatus::Open
        } else {
            MarketStatus::Closed
        }
    }
}

impl Default for MarketSession {
    fn default() -> Self {
        Self::nse()
    }
}
