//! Network Module Tests
//!
//! ## Test Scopes
//! - **Registry**: Duplicate registration is rejected; unregistered targets are counted as lost.
//! - **Configuration**: Drop rates outside [0, 1] are refused at the boundary.
//! - **Delivery**: Counting semantics at drop rates 0 and 1, latency, and non-blocking sends.

#[cfg(test)]
mod tests {
    use crate::error::GossipError;
    use crate::message::types::{Message, NodeId, Payload};
    use crate::network::{Endpoint, MockNetwork, NetworkConfig, NetworkStats, Transport};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    /// Endpoint that records every delivery it sees.
    struct RecordingEndpoint {
        id: NodeId,
        received: AtomicUsize,
        senders: Mutex<Vec<NodeId>>,
    }

    impl RecordingEndpoint {
        fn new(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: NodeId::new(id),
                received: AtomicUsize::new(0),
                senders: Mutex::new(Vec::new()),
            })
        }

        fn received(&self) -> usize {
            self.received.load(Ordering::SeqCst)
        }
    }

    impl Endpoint for RecordingEndpoint {
        fn id(&self) -> &NodeId {
            &self.id
        }

        fn receive_message(&self, _msg: Message, from: &NodeId) -> bool {
            self.received.fetch_add(1, Ordering::SeqCst);
            self.senders.lock().push(from.clone());
            true
        }
    }

    fn network(latency_ms: u64, drop_rate: f64) -> Arc<MockNetwork> {
        MockNetwork::new(NetworkConfig {
            latency: Duration::from_millis(latency_ms),
            jitter: Duration::ZERO,
            drop_rate,
            seed: Some(11),
        })
        .expect("valid network config")
    }

    fn message() -> Message {
        Message::new("set", NodeId::new("origin"), Payload::new())
    }

    /// Waits until every send has reached a final outcome.
    async fn settle(network: &MockNetwork) -> NetworkStats {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let stats = network.stats();
            if stats.in_flight() == 0 || Instant::now() > deadline {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    // ============================================================
    // REGISTRY
    // ============================================================

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let net = network(0, 0.0);
        let first = RecordingEndpoint::new("node-1");
        let second = RecordingEndpoint::new("node-1");

        assert!(net.register_node(first.clone()).is_ok());
        let result = net.register_node(second.clone());

        assert_eq!(result, Err(GossipError::DuplicateNode("node-1".to_string())));
        assert_eq!(net.node_count(), 1);

        // The original registration still receives traffic.
        net.send(&NodeId::new("x"), &NodeId::new("node-1"), message());
        settle(&net).await;
        assert_eq!(first.received(), 1);
        assert_eq!(second.received(), 0);
    }

    #[tokio::test]
    async fn test_send_to_unregistered_target_is_counted_not_delivered() {
        let net = network(0, 0.0);
        let target = RecordingEndpoint::new("node-1");
        net.register_node(target.clone()).unwrap();

        assert!(net.unregister_node(&NodeId::new("node-1")));
        assert!(!net.unregister_node(&NodeId::new("node-1")));
        assert!(!net.is_registered(&NodeId::new("node-1")));

        net.send(&NodeId::new("x"), &NodeId::new("node-1"), message());
        net.send(&NodeId::new("x"), &NodeId::new("nobody"), message());
        let stats = settle(&net).await;

        assert_eq!(stats.messages_sent, 2);
        assert_eq!(stats.messages_undeliverable, 2);
        assert_eq!(stats.messages_delivered, 0);
        assert_eq!(target.received(), 0);
    }

    // ============================================================
    // CONFIGURATION
    // ============================================================

    #[test]
    fn test_invalid_drop_rate_rejected_at_construction() {
        for rate in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let config = NetworkConfig {
                drop_rate: rate,
                ..Default::default()
            };
            assert!(MockNetwork::new(config).is_err(), "rate {} accepted", rate);
        }
    }

    #[test]
    fn test_set_drop_rate_validates_and_keeps_previous_value() {
        let net = network(0, 0.25);

        assert!(net.set_drop_rate(1.0).is_ok());
        assert_eq!(net.config().drop_rate, 1.0);

        assert_eq!(net.set_drop_rate(1.01), Err(GossipError::InvalidDropRate(1.01)));
        assert!(net.set_drop_rate(-1.0).is_err());
        assert_eq!(net.config().drop_rate, 1.0);

        assert!(net.set_drop_rate(0.0).is_ok());
        assert_eq!(net.config().drop_rate, 0.0);
    }

    #[test]
    fn test_set_latency_and_jitter() {
        let net = network(5, 0.0);

        net.set_latency(Duration::from_millis(40));
        net.set_jitter(Duration::from_millis(3));

        let config = net.config();
        assert_eq!(config.latency, Duration::from_millis(40));
        assert_eq!(config.jitter, Duration::from_millis(3));
    }

    // ============================================================
    // DELIVERY
    // ============================================================

    #[tokio::test]
    async fn test_full_loss_counts_every_send_but_delivers_nothing() {
        let net = network(0, 1.0);
        let target = RecordingEndpoint::new("node-1");
        net.register_node(target.clone()).unwrap();

        for _ in 0..50 {
            net.send(&NodeId::new("x"), &NodeId::new("node-1"), message());
        }
        let stats = settle(&net).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(net.message_count(), 50);
        assert_eq!(stats.messages_dropped, 50);
        assert_eq!(stats.messages_delivered, 0);
        assert_eq!(target.received(), 0);
    }

    #[tokio::test]
    async fn test_reliable_network_delivers_every_send() {
        let net = network(1, 0.0);
        let target = RecordingEndpoint::new("node-1");
        net.register_node(target.clone()).unwrap();

        for _ in 0..50 {
            net.send(&NodeId::new("node-0"), &NodeId::new("node-1"), message());
        }
        let stats = settle(&net).await;

        assert_eq!(stats.messages_sent, 50);
        assert_eq!(stats.messages_dropped, 0);
        assert_eq!(stats.messages_delivered, 50);
        assert_eq!(target.received(), 50);
        assert!(target.senders.lock().iter().all(|s| s.as_str() == "node-0"));
    }

    #[tokio::test]
    async fn test_partial_loss_splits_between_outcomes() {
        let net = network(0, 0.5);
        let target = RecordingEndpoint::new("node-1");
        net.register_node(target.clone()).unwrap();

        for _ in 0..400 {
            net.send(&NodeId::new("x"), &NodeId::new("node-1"), message());
        }
        let stats = settle(&net).await;

        assert_eq!(stats.messages_sent, 400);
        assert_eq!(stats.messages_dropped + stats.messages_delivered, 400);
        assert!(stats.messages_dropped > 100 && stats.messages_dropped < 300);
        assert_eq!(target.received() as u64, stats.messages_delivered);
    }

    #[tokio::test]
    async fn test_send_does_not_wait_for_latency() {
        let net = network(200, 0.0);
        let target = RecordingEndpoint::new("node-1");
        net.register_node(target.clone()).unwrap();

        let started = Instant::now();
        net.send(&NodeId::new("x"), &NodeId::new("node-1"), message());

        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(target.received(), 0, "delivery must wait for the simulated latency");

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(target.received(), 1);
    }

    #[tokio::test]
    async fn test_jitter_spreads_deliveries_over_the_window() {
        let net = network(0, 0.0);
        net.set_jitter(Duration::from_millis(50));
        let target = RecordingEndpoint::new("node-1");
        net.register_node(target.clone()).unwrap();

        let started = Instant::now();
        for _ in 0..20 {
            net.send(&NodeId::new("node-0"), &NodeId::new("node-1"), message());
        }
        assert_eq!(target.received(), 0);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(
            target.received() < 20,
            "jittered deliveries should not all land at once"
        );

        let stats = settle(&net).await;

        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(stats.messages_sent, 20);
        assert_eq!(stats.messages_delivered, 20);
        assert_eq!(target.received(), 20);
    }

    #[tokio::test]
    async fn test_extreme_latency_with_jitter_does_not_panic() {
        let net = network(0, 0.0);
        net.set_latency(Duration::MAX);
        net.set_jitter(Duration::from_millis(5));
        let target = RecordingEndpoint::new("node-1");
        net.register_node(target.clone()).unwrap();

        net.send(&NodeId::new("node-0"), &NodeId::new("node-1"), message());
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(net.message_count(), 1);
        assert_eq!(net.stats().in_flight(), 1);
        assert_eq!(target.received(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_message_count_is_exact_under_concurrent_senders() {
        let net = network(0, 0.3);
        net.register_node(RecordingEndpoint::new("node-1")).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let net = net.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..125 {
                    net.send(&NodeId::new("x"), &NodeId::new("node-1"), message());
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(net.message_count(), 1000);
        let stats = settle(&net).await;
        assert_eq!(
            stats.messages_dropped + stats.messages_delivered + stats.messages_undeliverable,
            1000
        );
    }

    #[test]
    fn test_send_outside_runtime_is_swallowed() {
        let net = network(0, 0.0);
        net.register_node(RecordingEndpoint::new("node-1")).unwrap();

        net.send(&NodeId::new("x"), &NodeId::new("node-1"), message());

        let stats = net.stats();
        assert_eq!(stats.messages_sent, 1);
        assert_eq!(stats.messages_undeliverable, 1);
    }
}
