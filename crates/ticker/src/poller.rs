//! Interval polling with an owned timer.
//!
//! [`TickerPoller::mount`] spawns one task that fetches immediately and then
//! on every interval tick. The task belongs to the returned [`TickerHandle`]
//! and stops when the handle is unmounted or dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nifsen_market_data::MarketDataResponse;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::client::MarketDataSource;
use crate::state::TickerState;

/// Default time between scheduled polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct TickerConfig {
    /// Time between scheduled polls. Zero is raised to one millisecond.
    pub interval: Duration,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

pub struct TickerPoller;

impl TickerPoller {
    /// Start polling. Must be called from within a tokio runtime.
    pub fn mount(source: Arc<dyn MarketDataSource>, config: TickerConfig) -> TickerHandle {
        let (state_tx, state_rx) = watch::channel(TickerState::Loading);
        let state_tx = Arc::new(state_tx);
        let retry = Arc::new(Notify::new());
        let mounted = Arc::new(AtomicBool::new(true));

        let task = tokio::spawn(poll_loop(
            source,
            config.interval.max(Duration::from_millis(1)),
            Arc::clone(&state_tx),
            Arc::clone(&retry),
            Arc::clone(&mounted),
        ));

        TickerHandle {
            state_tx,
            state_rx,
            retry,
            mounted,
            task,
        }
    }
}

/// Owner of a mounted poller.
pub struct TickerHandle {
    state_tx: Arc<watch::Sender<TickerState>>,
    state_rx: watch::Receiver<TickerState>,
    retry: Arc<Notify>,
    mounted: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn state(&self) -> TickerState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TickerState> {
        self.state_rx.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Show `Loading` and fetch now. The next scheduled poll is one full
    /// interval after this fetch starts.
    pub fn retry(&self) {
        if !self.is_mounted() {
            return;
        }
        self.state_tx.send_replace(TickerState::Loading);
        self.retry.notify_one();
    }

    /// Stop the timer. Responses still in flight are discarded.
    pub fn unmount(self) {}
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.mounted.store(false, Ordering::Release);
        self.task.abort();
    }
}

async fn poll_loop(
    source: Arc<dyn MarketDataSource>,
    interval: Duration,
    state_tx: Arc<watch::Sender<TickerState>>,
    retry: Arc<Notify>,
    mounted: Arc<AtomicBool>,
) {
    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_good: Option<MarketDataResponse> = None;

    loop {
        // The first tick completes immediately.
        tokio::select! {
            _ = timer.tick() => {}
            _ = retry.notified() => timer.reset(),
        }

        let result = source.fetch().await;
        if !mounted.load(Ordering::Acquire) {
            debug!("Ticker unmounted, discarding poll result");
            return;
        }

        let next = match result {
            Ok(snapshot) => {
                last_good = Some(snapshot.clone());
                TickerState::Ready(snapshot)
            }
            Err(err) => {
                warn!("Market data poll failed: {}", err);
                TickerState::Failed {
                    message: err.to_string(),
                    last: last_good.clone(),
                }
            }
        };
        state_tx.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TickerError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use nifsen_market_data::{MarketStatus, Quote};
    use rust_decimal::Decimal;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn snapshot(price: i64) -> MarketDataResponse {
        let quote = Quote::new(
            "NIFTY",
            "Nifty 50",
            Decimal::new(price, 0),
            Decimal::ZERO,
            Decimal::ZERO,
            true,
        );
        let ts = Utc.with_ymd_and_hms(2026, 1, 29, 10, 15, 0).unwrap();
        MarketDataResponse::new(vec![quote], ts, true, MarketStatus::Open)
    }

    /// Replays scripted results, then keeps succeeding.
    struct Scripted {
        calls: AtomicUsize,
        script: Mutex<VecDeque<Result<MarketDataResponse, String>>>,
        delay: Duration,
    }

    impl Scripted {
        fn new(script: Vec<Result<MarketDataResponse, String>>) -> Arc<Self> {
            Self::with_delay(script, Duration::ZERO)
        }

        fn with_delay(script: Vec<Result<MarketDataResponse, String>>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(script.into()),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataSource for Scripted {
        async fn fetch(&self) -> Result<MarketDataResponse, TickerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(snapshot)) => Ok(snapshot),
                Some(Err(message)) => Err(TickerError::Decode(message)),
                None => Ok(snapshot(call as i64)),
            }
        }
    }

    fn mount(source: Arc<Scripted>) -> TickerHandle {
        TickerPoller::mount(source, TickerConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_loads_then_polls_on_interval() {
        let source = Scripted::new(vec![Ok(snapshot(100)), Ok(snapshot(200))]);
        let handle = mount(Arc::clone(&source));
        assert_eq!(handle.state(), TickerState::Loading);

        let mut rx = handle.subscribe();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = {
            let seen = Arc::clone(&seen);
            let mut rx = handle.subscribe();
            tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    seen.lock().unwrap().push(rx.borrow().clone());
                }
            })
        };

        rx.changed().await.unwrap();
        assert_eq!(handle.state(), TickerState::Ready(snapshot(100)));
        assert_eq!(source.calls(), 1);

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(source.calls(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(handle.state(), TickerState::Ready(snapshot(200)));

        // Scheduled polls go straight from one snapshot to the next
        let states = seen.lock().unwrap().clone();
        assert!(states.iter().all(|s| !s.is_loading()));
        assert_eq!(states.len(), 2);

        recorder.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_then_manual_retry() {
        let source = Scripted::new(vec![Err("boom".to_string()), Ok(snapshot(300))]);
        let handle = mount(Arc::clone(&source));
        let mut rx = handle.subscribe();

        rx.changed().await.unwrap();
        match handle.state() {
            TickerState::Failed { message, last } => {
                assert!(message.contains("boom"));
                assert_eq!(last, None);
            }
            other => panic!("expected failure, got {:?}", other),
        }

        handle.retry();
        assert_eq!(handle.state(), TickerState::Loading);

        rx.changed().await.unwrap();
        if rx.borrow().is_loading() {
            rx.changed().await.unwrap();
        }
        assert_eq!(handle.state(), TickerState::Ready(snapshot(300)));
        // Retried right away, well before the scheduled poll
        assert_eq!(source.calls(), 2);
        assert!(handle.is_mounted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_last_good_snapshot() {
        let source = Scripted::new(vec![Ok(snapshot(100)), Err("gateway".to_string())]);
        let handle = mount(Arc::clone(&source));
        let mut rx = handle.subscribe();

        rx.changed().await.unwrap();
        rx.changed().await.unwrap();

        let state = handle.state();
        assert!(matches!(state, TickerState::Failed { .. }));
        assert_eq!(state.snapshot(), Some(&snapshot(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_discards_in_flight_response() {
        let source = Scripted::with_delay(vec![Ok(snapshot(100))], Duration::from_secs(5));
        let handle = mount(Arc::clone(&source));
        let rx = handle.subscribe();

        // Let the first fetch start
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 1);

        handle.unmount();
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(*rx.borrow(), TickerState::Loading);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_the_timer() {
        let source = Scripted::new(vec![]);
        let handle = mount(Arc::clone(&source));
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();

        drop(handle);
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(source.calls(), 1);
    }
}
