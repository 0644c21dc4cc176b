use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::logging::log_single_flight;

type Flight<T> = Shared<BoxFuture<'static, T>>;

/// Collapses concurrent requests for one shared computation into a single run.
///
/// Callers arriving while a run is in flight await that run. The slot is emptied
/// as soon as the run settles, so completed results are never handed to later callers.
pub struct SingleFlight<T: Clone> {
    resource: &'static str,
    slot: Mutex<Option<(u64, Flight<T>)>>,
    generation: AtomicU64,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            slot: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn in_flight(&self) -> bool {
        self.slot.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    pub async fn run<F, Fut>(&self, make: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (id, flight) = self.join_or_start(make);
        let out = flight.await;
        self.settle(id);
        out
    }

    fn join_or_start<F, Fut>(&self, make: F) -> (u64, Flight<T>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        if let Some((id, flight)) = slot.as_ref() {
            log_single_flight(self.resource, true);
            return (*id, flight.clone());
        }

        let id = self.generation.fetch_add(1, Ordering::SeqCst);
        let flight = make().boxed().shared();
        *slot = Some((id, flight.clone()));
        log_single_flight(self.resource, false);
        (id, flight)
    }

    fn settle(&self, id: u64) {
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        if matches!(slot.as_ref(), Some((current, _)) if *current == id) {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;
    use tokio::time::{sleep, Duration};

    fn counted(
        calls: &Arc<AtomicU32>,
        value: Result<u32, String>,
    ) -> impl Future<Output = Result<u32, String>> {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_millis(20)).await;
            value
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_run() {
        let sf: SingleFlight<Result<u32, String>> = SingleFlight::new("test");
        let calls = Arc::new(AtomicU32::new(0));

        let (a, b, c) = tokio::join!(
            sf.run(|| counted(&calls, Ok(7))),
            sf.run(|| counted(&calls, Ok(8))),
            sf.run(|| counted(&calls, Ok(9))),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!((a, b, c), (Ok(7), Ok(7), Ok(7)));
        assert!(!sf.in_flight());
    }

    #[tokio::test]
    async fn test_completed_result_is_not_reused() {
        let sf: SingleFlight<Result<u32, String>> = SingleFlight::new("test");
        let calls = Arc::new(AtomicU32::new(0));

        assert_eq!(sf.run(|| counted(&calls, Ok(1))).await, Ok(1));
        assert_eq!(sf.run(|| counted(&calls, Ok(2))).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_clears_slot_for_retry() {
        let sf: SingleFlight<Result<u32, String>> = SingleFlight::new("test");
        let calls = Arc::new(AtomicU32::new(0));

        let first = sf.run(|| counted(&calls, Err("offline".to_string()))).await;
        assert_eq!(first, Err("offline".to_string()));
        assert!(!sf.in_flight());

        let second = sf.run(|| counted(&calls, Ok(3))).await;
        assert_eq!(second, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
