//! Session broker
//!
//! Produces a usable session for each polling cycle, hiding multi-endpoint
//! failover and reconnection from the caller. The broker owns the only
//! shared mutable state in the system, a descriptor-to-session cache, and
//! serializes whole acquisitions behind one async mutex so concurrent
//! callers never race duplicate connection attempts to the same endpoint.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use trawl_core::domain::endpoint::EndpointDescriptor;

use crate::connector::Connector;
use crate::error::{AcquireError, ConnectError};

/// Acquires authenticated sessions with failover across a fixed server pool
///
/// The pool order is the failover priority and never changes after
/// construction. Sessions are long-lived: callers hold an `Arc` for the
/// duration of one unit of work and simply drop it, there is no release
/// operation.
pub struct SessionBroker<C: Connector> {
    connector: Arc<C>,
    pool: Vec<EndpointDescriptor>,
    cache: Mutex<HashMap<EndpointDescriptor, Arc<C::Session>>>,
}

impl<C: Connector> SessionBroker<C> {
    /// Creates a broker over an ordered pool of candidate endpoints
    pub fn new(connector: C, pool: Vec<EndpointDescriptor>) -> Self {
        Self {
            connector: Arc::new(connector),
            pool,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Candidate endpoints in failover order
    pub fn pool(&self) -> &[EndpointDescriptor] {
        &self.pool
    }

    /// Returns a usable session, or fails once the whole pool is exhausted
    ///
    /// For each endpoint in pool order: a cached session is returned as-is
    /// (probed first when the descriptor asks for it), otherwise a bounded
    /// connection attempt is made. A failed probe triggers a reconnection
    /// attempt for the same endpoint before failover; only a failed
    /// connection attempt advances to the next candidate. One sweep, no
    /// retries: the next scheduled cycle is the retry.
    pub async fn acquire_session(&self) -> Result<Arc<C::Session>, AcquireError> {
        let mut cache = self.cache.lock().await;

        for endpoint in &self.pool {
            if let Some(session) = cache.get(endpoint) {
                if !endpoint.check_on_borrow {
                    return Ok(Arc::clone(session));
                }
                if self.connector.probe(session).await {
                    return Ok(Arc::clone(session));
                }
                debug!(endpoint = %endpoint, "cached session failed probe, reconnecting");
            }

            match self.connect_bounded(endpoint).await {
                Ok(session) => {
                    let session = Arc::new(session);
                    cache.insert(endpoint.clone(), Arc::clone(&session));
                    return Ok(session);
                }
                Err(e) => {
                    info!(
                        endpoint = %endpoint,
                        error = %e,
                        "could not connect, trying next server"
                    );
                }
            }
        }

        let err = AcquireError::NoServerReachable {
            attempted: self.pool.clone(),
        };
        error!("{}", err);
        Err(err)
    }

    /// Runs one connection attempt as a task bounded by the descriptor's
    /// deadline
    ///
    /// On expiry the join handle is dropped: the attempt may keep running in
    /// the background, but its eventual result is never seen and therefore
    /// never cached.
    async fn connect_bounded(
        &self,
        endpoint: &EndpointDescriptor,
    ) -> Result<C::Session, ConnectError> {
        let connector = Arc::clone(&self.connector);
        let target = endpoint.clone();
        let attempt = tokio::spawn(async move { connector.connect(&target).await });

        let joined = match endpoint.connect_timeout() {
            Some(deadline) => match tokio::time::timeout(deadline, attempt).await {
                Ok(joined) => joined,
                Err(_) => return Err(ConnectError::Timeout { after: deadline }),
            },
            None => attempt.await,
        };

        match joined {
            Ok(result) => result,
            Err(_) => Err(ConnectError::Interrupted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    #[derive(Debug)]
    struct FakeSession {
        host: String,
        id: usize,
    }

    #[derive(Clone, Copy)]
    enum Plan {
        Succeed,
        Refuse,
        SucceedAfter(Duration),
    }

    /// Connector scripted per host; defaults to refusing once the script
    /// for a host runs out.
    #[derive(Default)]
    struct FakeConnector {
        plans: StdMutex<HashMap<String, VecDeque<Plan>>>,
        probe_ok: StdMutex<HashMap<String, bool>>,
        connect_log: StdMutex<Vec<String>>,
        probe_log: StdMutex<Vec<String>>,
        next_id: AtomicUsize,
    }

    impl FakeConnector {
        fn plan(&self, host: &str, plans: &[Plan]) {
            self.plans
                .lock()
                .unwrap()
                .insert(host.to_string(), plans.iter().copied().collect());
        }

        fn set_probe(&self, host: &str, ok: bool) {
            self.probe_ok.lock().unwrap().insert(host.to_string(), ok);
        }

        fn connects(&self) -> Vec<String> {
            self.connect_log.lock().unwrap().clone()
        }

        fn probes(&self) -> Vec<String> {
            self.probe_log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Connector for FakeConnector {
        type Session = FakeSession;

        async fn connect(&self, endpoint: &EndpointDescriptor) -> Result<FakeSession, ConnectError> {
            self.connect_log.lock().unwrap().push(endpoint.host.clone());
            let plan = self
                .plans
                .lock()
                .unwrap()
                .get_mut(&endpoint.host)
                .and_then(|queue| queue.pop_front())
                .unwrap_or(Plan::Refuse);

            let session = FakeSession {
                host: endpoint.host.clone(),
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
            };

            match plan {
                Plan::Succeed => Ok(session),
                Plan::Refuse => Err(ConnectError::Refused("connection refused".into())),
                Plan::SucceedAfter(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(session)
                }
            }
        }

        async fn probe(&self, session: &FakeSession) -> bool {
            self.probe_log.lock().unwrap().push(session.host.clone());
            self.probe_ok
                .lock()
                .unwrap()
                .get(&session.host)
                .copied()
                .unwrap_or(true)
        }
    }

    fn endpoint(host: &str) -> EndpointDescriptor {
        EndpointDescriptor::new(host, 8089, "admin", "changeme")
    }

    fn broker(connector: FakeConnector, pool: Vec<EndpointDescriptor>) -> SessionBroker<FakeConnector> {
        SessionBroker::new(connector, pool)
    }

    #[tokio::test]
    async fn test_cache_hit_without_probe_returns_same_session() {
        let connector = FakeConnector::default();
        connector.plan("a", &[Plan::Succeed]);
        let broker = broker(connector, vec![endpoint("a")]);

        let first = broker.acquire_session().await.unwrap();
        let second = broker.acquire_session().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(broker.connector.connects(), vec!["a"]);
        assert!(broker.connector.probes().is_empty());
    }

    #[tokio::test]
    async fn test_probe_success_reuses_cached_session() {
        let connector = FakeConnector::default();
        connector.plan("a", &[Plan::Succeed]);
        let broker = broker(connector, vec![endpoint("a").with_check_on_borrow(true)]);

        let first = broker.acquire_session().await.unwrap();
        let second = broker.acquire_session().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(broker.connector.connects(), vec!["a"]);
        assert_eq!(broker.connector.probes(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_probe_failure_reconnects_same_endpoint_before_failover() {
        let connector = FakeConnector::default();
        connector.plan("a", &[Plan::Succeed, Plan::Succeed]);
        connector.plan("b", &[Plan::Succeed]);
        let broker = broker(
            connector,
            vec![endpoint("a").with_check_on_borrow(true), endpoint("b")],
        );

        let stale = broker.acquire_session().await.unwrap();
        broker.connector.set_probe("a", false);
        let fresh = broker.acquire_session().await.unwrap();

        // reconnected to "a" itself, "b" was never attempted
        assert_eq!(broker.connector.connects(), vec!["a", "a"]);
        assert_eq!(fresh.host, "a");
        assert_ne!(stale.id, fresh.id);
    }

    #[tokio::test]
    async fn test_reconnection_replaces_cache_entry() {
        let connector = FakeConnector::default();
        connector.plan("a", &[Plan::Succeed, Plan::Succeed]);
        let broker = broker(connector, vec![endpoint("a").with_check_on_borrow(true)]);

        let stale = broker.acquire_session().await.unwrap();
        broker.connector.set_probe("a", false);
        let fresh = broker.acquire_session().await.unwrap();

        // once the probe passes again, the replacement is what comes back
        broker.connector.set_probe("a", true);
        let reused = broker.acquire_session().await.unwrap();

        assert!(Arc::ptr_eq(&fresh, &reused));
        assert!(!Arc::ptr_eq(&stale, &reused));
    }

    #[tokio::test]
    async fn test_failover_skips_failed_endpoint_without_caching_it() {
        let connector = FakeConnector::default();
        connector.plan("a", &[Plan::Refuse, Plan::Succeed]);
        connector.plan("b", &[Plan::Succeed]);
        let broker = broker(
            connector,
            vec![endpoint("a"), endpoint("b"), endpoint("c")],
        );

        let session = broker.acquire_session().await.unwrap();
        assert_eq!(session.host, "b");
        assert_eq!(broker.connector.connects(), vec!["a", "b"]);

        // "a" was not cached by its failed attempt: the next sweep tries it
        // again and now wins, ahead of the cached "b" entry.
        let session = broker.acquire_session().await.unwrap();
        assert_eq!(session.host, "a");
        assert_eq!(broker.connector.connects(), vec!["a", "b", "a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_advances_to_next_endpoint_within_deadline() {
        let connector = FakeConnector::default();
        connector.plan("a", &[Plan::SucceedAfter(Duration::from_millis(500))]);
        connector.plan("b", &[Plan::Succeed]);
        let broker = broker(
            connector,
            vec![endpoint("a").with_timeout_millis(100), endpoint("b")],
        );

        let start = Instant::now();
        let session = broker.acquire_session().await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(session.host, "b");
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_exhausted_pool_fails_with_all_attempted_endpoints() {
        let connector = FakeConnector::default();
        let broker = broker(
            connector,
            vec![endpoint("a"), endpoint("b"), endpoint("c")],
        );

        let err = broker.acquire_session().await.unwrap_err();
        let AcquireError::NoServerReachable { attempted } = err;
        assert_eq!(attempted.len(), 3);
        assert_eq!(broker.connector.connects(), vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquisitions_share_one_connection_attempt() {
        let connector = FakeConnector::default();
        connector.plan("a", &[Plan::SucceedAfter(Duration::from_millis(50))]);
        let broker = Arc::new(broker(connector, vec![endpoint("a")]));

        let (first, second) = tokio::join!(broker.acquire_session(), broker.acquire_session());
        let first = first.unwrap();
        let second = second.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(broker.connector.connects(), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_slow_endpoint_fails_fast_and_is_not_cached_later() {
        let connector = FakeConnector::default();
        connector.plan("a", &[Plan::SucceedAfter(Duration::from_millis(500))]);
        let broker = broker(connector, vec![endpoint("a").with_timeout_millis(100)]);

        let start = Instant::now();
        let err = broker.acquire_session().await.unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, AcquireError::NoServerReachable { .. }));
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(150));

        // Let the abandoned attempt finish in the background; its late
        // success must not have been registered in the cache.
        tokio::time::sleep(Duration::from_millis(600)).await;
        let err = broker.acquire_session().await.unwrap_err();
        assert!(matches!(err, AcquireError::NoServerReachable { .. }));
        assert_eq!(broker.connector.connects(), vec!["a", "a"]);
    }
}
