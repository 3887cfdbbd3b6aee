//! Per-client request limiting.
//!
//! One GCRA bucket per peer IP: a client may burst `max` requests, and one request of
//! budget comes back every `window / max`, so an idle client is full again after one
//! window. Peers without a known address share one bucket.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use log::{debug, warn};
use warp::{Filter, Rejection};

/// Table size above which idle buckets are dropped.
const PRUNE_THRESHOLD: usize = 1024;

/// Rejection raised when a client exceeds its budget.
#[derive(Debug)]
pub struct RateLimited {
    pub retry_after: Duration,
}

impl warp::reject::Reject for RateLimited {}

struct ClientBucket {
    limiter: governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    last_access: Instant,
}

pub struct RateLimiter {
    quota: Quota,
    window: Duration,
    clock: DefaultClock,
    buckets: DashMap<IpAddr, ClientBucket>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max).unwrap_or(NonZeroU32::MIN);
        let period = window / burst.get();
        let quota = match Quota::with_period(period) {
            Some(quota) => quota.allow_burst(burst),
            // window shorter than max nanoseconds
            None => Quota::per_second(NonZeroU32::MAX),
        };

        Self {
            quota,
            window,
            clock: DefaultClock::default(),
            buckets: DashMap::new(),
        }
    }

    /// Counts one request from `client`. On refusal returns how long until the client
    /// may send again.
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        let now = Instant::now();
        if self.buckets.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut bucket = self.buckets.entry(client).or_insert_with(|| {
            debug!("Tracking new client {}", client);
            ClientBucket {
                limiter: governor::RateLimiter::direct(self.quota),
                last_access: now,
            }
        });
        bucket.last_access = now;

        bucket
            .limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Drops buckets idle for a whole window; those have fully replenished.
    fn prune(&self, now: Instant) {
        let window = self.window;
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_access) < window);
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

/// Filter that rejects with [`RateLimited`] once the peer is over budget.
pub fn with_rate_limit(
    limiter: Arc<RateLimiter>,
) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::addr::remote()
        .and_then(move |addr: Option<SocketAddr>| {
            let limiter = limiter.clone();
            async move {
                let client = addr
                    .map(|a| a.ip())
                    .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
                match limiter.check(client) {
                    Ok(()) => Ok(()),
                    Err(retry_after) => {
                        warn!("Rate limit exceeded for {}", client);
                        Err(warp::reject::custom(RateLimited { retry_after }))
                    }
                }
            }
        })
        .untuple_one()
}

/// Whole seconds to put in `Retry-After`, never zero.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}
