//! Single-flight coalescing keyed by string.
//!
//! The first caller for a key spawns the work on the runtime; later callers
//! for the same key await the same shared result. The work runs as its own
//! task, so dropping any caller (including the first) only detaches that
//! caller. The key is released when the work finishes, even by panicking.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlightError {
    /// The spawned work panicked or the runtime shut it down
    #[error("in-flight task failed: {0}")]
    TaskFailed(String),
}

type Flight<T> = Shared<BoxFuture<'static, Result<T, FlightError>>>;
type FlightMap<T> = Arc<Mutex<HashMap<String, Flight<T>>>>;

fn lock<T>(map: &Mutex<HashMap<String, Flight<T>>>) -> MutexGuard<'_, HashMap<String, Flight<T>>> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Removes the key when the work ends, including on unwind
struct Release<T> {
    map: FlightMap<T>,
    key: String,
}

impl<T> Drop for Release<T> {
    fn drop(&mut self) {
        lock(&self.map).remove(&self.key);
    }
}

pub struct SingleFlight<T> {
    inflight: FlightMap<T>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` for `key`, or join the flight already running for it
    ///
    /// `work` is only polled when this caller leads the flight.
    pub async fn run<F>(&self, key: &str, work: F) -> Result<T, FlightError>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let flight = {
            let mut inflight = lock(&self.inflight);
            match inflight.get(key) {
                Some(existing) => {
                    tracing::debug!("Joining in-flight composition for {}", key);
                    existing.clone()
                }
                None => {
                    let release = Release {
                        map: Arc::clone(&self.inflight),
                        key: key.to_string(),
                    };
                    // The task cannot release the key before it is inserted:
                    // release takes the lock this scope is holding.
                    let handle = tokio::spawn(async move {
                        let _release = release;
                        work.await
                    });
                    let flight = async move {
                        handle
                            .await
                            .map_err(|e| FlightError::TaskFailed(e.to_string()))
                    }
                    .boxed()
                    .shared();
                    inflight.insert(key.to_string(), flight.clone());
                    flight
                }
            }
        };
        flight.await
    }

    /// Number of keys with work currently running
    pub fn in_flight(&self) -> usize {
        lock(&self.inflight).len()
    }
}
