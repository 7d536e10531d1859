//! Bounded in-flight request limiter.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::observability::metrics;

#[derive(Debug)]
struct Counters {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// Caps the number of concurrently outstanding requests.
///
/// Cloning is cheap and every clone shares the same ceiling.
#[derive(Debug, Clone)]
pub struct RequestThrottle {
    semaphore: Arc<Semaphore>,
    counters: Arc<Counters>,
    max_in_flight: usize,
}

impl RequestThrottle {
    /// Create a throttle admitting at most `max_in_flight` requests (minimum 1).
    pub fn new(max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight)),
            counters: Arc::new(Counters {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }),
            max_in_flight,
        }
    }

    /// Wait for a free slot.
    ///
    /// Waiters are served in the order they called `acquire`.
    pub async fn acquire(&self) -> ThrottlePermit {
        let permit = match self.semaphore.clone().acquire_owned().await {
            Ok(permit) => Some(permit),
            // The semaphore is never closed; degrade to unthrottled rather than fail.
            Err(_) => None,
        };

        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(now, Ordering::SeqCst);
        metrics::record_in_flight(now);

        tracing::trace!(
            in_flight = now,
            available = self.semaphore.available_permits(),
            "Throttle slot acquired"
        );

        ThrottlePermit {
            _permit: permit,
            counters: self.counters.clone(),
        }
    }

    /// Run `fut` while holding a slot.
    pub async fn run<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let _permit = self.acquire().await;
        fut.await
    }

    /// Number of requests currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Highest concurrent occupancy observed so far.
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }

    /// Configured ceiling.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}

/// A slot in the throttle.
///
/// When dropped, the slot is released and the in-flight count decremented,
/// whether the request succeeded, failed or panicked.
#[derive(Debug)]
pub struct ThrottlePermit {
    _permit: Option<OwnedSemaphorePermit>,
    counters: Arc<Counters>,
}

impl Drop for ThrottlePermit {
    fn drop(&mut self) {
        let now = self.counters.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::record_in_flight(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_permit_release_on_drop() {
        let throttle = RequestThrottle::new(2);
        let a = throttle.acquire().await;
        let b = throttle.acquire().await;
        assert_eq!(throttle.in_flight(), 2);

        drop(a);
        assert_eq!(throttle.in_flight(), 1);
        drop(b);
        assert_eq!(throttle.in_flight(), 0);
        assert_eq!(throttle.peak_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_zero_ceiling_is_raised_to_one() {
        let throttle = RequestThrottle::new(0);
        assert_eq!(throttle.max_in_flight(), 1);
        let value = throttle.run(async { 7 }).await;
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_never_exceeds_ceiling() {
        let throttle = RequestThrottle::new(3);
        let mut tasks = Vec::new();
        for _ in 0..20 {
            let throttle = throttle.clone();
            tasks.push(tokio::spawn(async move {
                throttle
                    .run(async {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                    })
                    .await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(throttle.in_flight(), 0);
        assert!(throttle.peak_in_flight() <= 3);
        assert_eq!(throttle.peak_in_flight(), 3);
    }

    #[tokio::test]
    async fn test_waiters_admitted_in_arrival_order() {
        let throttle = RequestThrottle::new(1);
        let order = Arc::new(Mutex::new(Vec::new()));
        let gate = throttle.acquire().await;

        let mut tasks = Vec::new();
        for i in 0..5 {
            let throttle = throttle.clone();
            let order = order.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = throttle.acquire().await;
                order.lock().await.push(i);
            }));
            // Let task i enqueue before task i + 1 is spawned.
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        drop(gate);
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(*order.lock().await, vec![0, 1, 2, 3, 4]);
    }
}
