// ── Time-to-live cache ──
//
// Memoizes a zero-argument async refresh function. One lock per cache, held
// across the refresh, so concurrent readers of an expired entry wait for the
// single in-flight refresh instead of starting their own.

use std::future::Future;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::error::CoreError;

type RefreshFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync>;

struct CacheEntry<T> {
    value: T,
    /// Time of the last refresh *attempt*. `None` until the first `get()`.
    last_refresh: Option<Instant>,
}

/// A value that is refreshed on demand once it is older than `max_age`.
///
/// Until a refresh has succeeded, [`get`](Self::get) yields `T::default()`.
/// A failed refresh is logged and the previous value keeps being served;
/// the attempt still counts as a refresh, so a failing source is retried at
/// most once per `max_age`.
pub struct TtlCache<T> {
    name: &'static str,
    refresh: RefreshFn<T>,
    max_age: Duration,
    entry: Mutex<CacheEntry<T>>,
}

impl<T> TtlCache<T>
where
    T: Clone + Default + Send + 'static,
{
    /// Create a cache around `refresh`. Nothing is fetched until the first
    /// [`get`](Self::get).
    pub fn new<F, Fut>(name: &'static str, max_age: Duration, refresh: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        Self {
            name,
            refresh: Box::new(move || refresh().boxed()),
            max_age,
            entry: Mutex::new(CacheEntry {
                value: T::default(),
                last_refresh: None,
            }),
        }
    }

    /// Return the cached value, refreshing it first if it is too old.
    pub async fn get(&self) -> T {
        let mut entry = self.entry.lock().await;
        let now = Instant::now();

        if let Some(last) = entry.last_refresh {
            let age = now.saturating_duration_since(last);
            if age < self.max_age {
                debug!(cache = self.name, ?age, "using cached item");
                return entry.value.clone();
            }
            debug!(
                cache = self.name,
                ?age,
                max_age = ?self.max_age,
                "cached data too old, refreshing"
            );
        } else {
            debug!(cache = self.name, "cache empty, refreshing");
        }

        entry.last_refresh = Some(now);
        match (self.refresh)().await {
            Ok(value) => entry.value = value,
            Err(e) => error!(cache = self.name, error = %e, "error getting new data"),
        }
        entry.value.clone()
    }

    /// Return the held value without ever refreshing.
    pub async fn peek(&self) -> T {
        self.entry.lock().await.value.clone()
    }

    /// The configured freshness window.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Name used in log fields.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> std::fmt::Debug for TtlCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}
