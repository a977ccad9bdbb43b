use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default spacing between consecutive follow-up requests.
pub const DEFAULT_PACING: Duration = Duration::from_millis(50);

/// Spaces out consecutive requests to stay clear of abuse detection.
///
/// Backed by a governor limiter with a single cell that replenishes every
/// `interval`, so the first call passes immediately and each later call waits
/// until at least `interval` has elapsed since the previous one. Clones share
/// the same limiter.
///
/// # Example
///
/// ```ignore
/// use forge_audit::platform::Pacer;
///
/// let pacer = Pacer::new(std::time::Duration::from_millis(50));
/// for sha in shas {
///     pacer.pace().await;
///     client.commit_detail(&sha).await?;
/// }
/// ```
#[derive(Clone, Default)]
pub struct Pacer {
    inner: Option<Arc<GovernorRateLimiter>>,
}

impl Pacer {
    /// Create a pacer with the given interval. A zero interval disables pacing.
    pub fn new(interval: Duration) -> Self {
        let inner = Quota::with_period(interval).map(|quota| Arc::new(RateLimiter::direct(quota)));
        Self { inner }
    }

    /// Create a pacer from a millisecond interval.
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// A pacer that never waits.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Wait until the next request may go out.
    pub async fn pace(&self) {
        if let Some(ref limiter) = self.inner {
            limiter.until_ready().await;
        }
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
