// Token acquisition and caching
//
// The vendor token is short-lived and process-wide: one slot, overwritten on
// refresh, nothing persisted across restarts. Two requests racing past an
// expired token may both refresh; the overwrite is idempotent, so the slot is
// guarded only against torn reads, not single-flighted.
use crate::error::ProxyError;
use crate::vendor::VendorApi;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CachedToken {
    value: String,
    obtained_at: Instant,
}

pub struct TokenManager {
    vendor: Arc<dyn VendorApi>,
    ttl: Duration,
    slot: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(vendor: Arc<dyn VendorApi>, ttl: Duration) -> Self {
        Self {
            vendor,
            ttl,
            slot: Mutex::new(None),
        }
    }

    // Returns the cached token while it is younger than the TTL; otherwise
    // performs exactly one credential exchange and stores the result.
    pub async fn get_token(&self) -> Result<String, ProxyError> {
        if let Some(token) = self.cached() {
            return Ok(token);
        }

        tracing::debug!("vendor token missing or expired, refreshing");
        let value = self.vendor.fetch_token_header().await?;
        *self.slot.lock() = Some(CachedToken {
            value: value.clone(),
            obtained_at: Instant::now(),
        });

        Ok(value)
    }

    fn cached(&self) -> Option<String> {
        let slot = self.slot.lock();
        slot.as_ref()
            .filter(|token| token.obtained_at.elapsed() < self.ttl)
            .map(|token| token.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingVendor {
        token_calls: AtomicUsize,
        fail: bool,
    }

    impl CountingVendor {
        fn new(fail: bool) -> Self {
            Self {
                token_calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl VendorApi for CountingVendor {
        async fn fetch_token_header(&self) -> Result<String, ProxyError> {
            self.token_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProxyError::Auth("vendor rejected credentials".to_string()));
            }
            Ok("tok-abc".to_string())
        }

        async fn fetch_xml(&self, _url: &str, _token: &str) -> Result<String, ProxyError> {
            unreachable!("token tests never fetch documents")
        }
    }

    #[tokio::test]
    async fn test_token_is_reused_within_ttl() {
        let vendor = Arc::new(CountingVendor::new(false));
        let manager = TokenManager::new(vendor.clone(), Duration::from_secs(300));

        assert_eq!(manager.get_token().await.unwrap(), "tok-abc");
        assert_eq!(manager.get_token().await.unwrap(), "tok-abc");

        // two sequential calls within the TTL issue exactly one exchange
        assert_eq!(vendor.token_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_triggers_refresh() {
        let vendor = Arc::new(CountingVendor::new(false));
        let manager = TokenManager::new(vendor.clone(), Duration::ZERO);

        manager.get_token().await.unwrap();
        manager.get_token().await.unwrap();

        assert_eq!(vendor.token_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rejected_credentials_surface_as_auth_error() {
        let vendor = Arc::new(CountingVendor::new(true));
        let manager = TokenManager::new(vendor, Duration::from_secs(300));

        let err = manager.get_token().await.unwrap_err();
        assert!(matches!(err, ProxyError::Auth(_)));
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_slot_empty() {
        let vendor = Arc::new(CountingVendor::new(true));
        let manager = TokenManager::new(vendor.clone(), Duration::from_secs(300));

        let _ = manager.get_token().await;
        let _ = manager.get_token().await;

        // no stale value is cached on failure, every call retries the exchange
        assert_eq!(vendor.token_calls.load(Ordering::SeqCst), 2);
    }
}
