use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Sticky record of whether this client has ever served synthetic data.
///
/// Once set it stays set for the life of the client, even after live calls
/// start succeeding again.
#[derive(Debug, Default)]
pub struct OfflineFlag {
    fired: AtomicBool,
    fallbacks: AtomicU64,
    last_operation: Mutex<Option<&'static str>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfflineSnapshot {
    pub offline_fallback: bool,
    pub fallback_count: u64,
    pub last_fallback_operation: Option<&'static str>,
}

impl OfflineFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this was the first fallback of the session.
    pub fn mark(&self, operation: &'static str) -> bool {
        self.fallbacks.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_operation.lock() {
            *last = Some(operation);
        }
        !self.fired.swap(true, Ordering::SeqCst)
    }

    pub fn is_set(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> OfflineSnapshot {
        OfflineSnapshot {
            offline_fallback: self.is_set(),
            fallback_count: self.fallbacks.load(Ordering::SeqCst),
            last_fallback_operation: self.last_operation.lock().ok().and_then(|l| *l),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_is_sticky() {
        let flag = OfflineFlag::new();
        assert!(!flag.is_set());
        assert!(flag.mark("predict"));
        assert!(!flag.mark("cluster_summary"));
        assert!(flag.is_set());

        let snap = flag.snapshot();
        assert_eq!(snap.fallback_count, 2);
        assert_eq!(snap.last_fallback_operation, Some("cluster_summary"));
    }
}
