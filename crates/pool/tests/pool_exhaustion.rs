//! Pool exhaustion and recovery tests

use std::time::Duration;

use nebula_pool::testing::MockFactory;
use nebula_pool::{Error, Pool, PoolConfig, PoolEvent};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn saturated_config(acquire_timeout_ms: u64) -> PoolConfig {
    PoolConfig::from_millis(1, 1, 60_000, acquire_timeout_ms)
}

async fn wait_until_active(pool: &Pool<MockFactory>, active: usize) {
    while pool.stats().active < active {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn saturated_pool_fails_after_acquire_timeout() {
    let factory = MockFactory::new().with_latency(Duration::from_millis(500));
    let pool = Pool::build(factory, saturated_config(100)).await.unwrap();

    let holder = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.execute("slow".to_string()).await })
    };
    wait_until_active(&pool, 1).await;

    let started = Instant::now();
    let err = pool.execute("second".to_string()).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(
        matches!(err, Error::PoolExhausted { max_size: 1, .. }),
        "expected PoolExhausted, got: {err:?}"
    );
    assert!(elapsed >= Duration::from_millis(100), "failed too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(150), "failed too late: {elapsed:?}");

    assert_eq!(holder.await.unwrap().unwrap(), "slow");
    assert_eq!(pool.stats().timeouts, 1);
}

#[tokio::test]
async fn pool_exhausted_error_is_retryable() {
    let pool = Pool::new(MockFactory::new(), saturated_config(50)).unwrap();

    let _held = pool.checkout().await.unwrap();
    let err = pool.checkout().await.unwrap_err();

    assert!(err.is_retryable(), "PoolExhausted should be retryable");
    assert_eq!(err.pool(), Some("mock"));
}

#[tokio::test]
async fn pool_recovers_after_release() {
    let factory = MockFactory::new();
    let pool = Pool::new(factory.clone(), saturated_config(50)).unwrap();

    let held = pool.checkout().await.unwrap();
    assert!(pool.checkout().await.is_err());
    drop(held);

    let again = pool.checkout().await.expect("should reuse after release");
    drop(again);
    assert_eq!(factory.created(), 1);
    assert_eq!(pool.stats().total_acquisitions, 2);
}

#[tokio::test(start_paused = true)]
async fn waiter_succeeds_when_release_beats_timeout() {
    let factory = MockFactory::new().with_latency(Duration::from_millis(50));
    let pool = Pool::build(factory, saturated_config(1_000)).await.unwrap();

    let first = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.execute("first".to_string()).await })
    };
    wait_until_active(&pool, 1).await;

    let started = Instant::now();
    let response = pool.execute("second".to_string()).await.unwrap();
    assert_eq!(response, "second");
    assert!(started.elapsed() < Duration::from_millis(100));
    assert!(first.await.unwrap().is_ok());
}

#[tokio::test]
async fn exhaustion_is_broadcast() {
    let pool = Pool::new(MockFactory::named("db"), saturated_config(20)).unwrap();
    let mut events = pool.subscribe();

    let _held = pool.checkout().await.unwrap();
    assert!(pool.checkout().await.is_err());

    let mut saw_exhausted = false;
    while let Ok(event) = events.try_recv() {
        if let PoolEvent::Exhausted { pool, .. } = event {
            assert_eq!(pool, "db");
            saw_exhausted = true;
        }
    }
    assert!(saw_exhausted, "expected an Exhausted event");
}

// ---------------------------------------------------------------------------
// Unbounded waits
// ---------------------------------------------------------------------------

fn unbounded_config() -> PoolConfig {
    PoolConfig {
        pool_size: 0,
        max_pool_size: 1,
        acquire_timeout: Duration::MAX,
        ..Default::default()
    }
}

#[tokio::test]
async fn huge_acquire_timeout_still_serves_requests() {
    let config = unbounded_config();
    assert!(config.validate().is_ok());
    let pool = Pool::new(MockFactory::new(), config).unwrap();

    assert_eq!(pool.execute("ping".to_string()).await.unwrap(), "ping");
    assert_eq!(pool.execute("pong".to_string()).await.unwrap(), "pong");
}

#[tokio::test]
async fn huge_acquire_timeout_waits_until_cancelled() {
    let pool = Pool::new(MockFactory::new(), unbounded_config()).unwrap();
    let held = pool.checkout().await.unwrap();

    let token = CancellationToken::new();
    let waiter = {
        let pool = pool.clone();
        let token = token.clone();
        tokio::spawn(async move { pool.checkout_with_cancellation(&token).await.map(drop) })
    };
    while pool.waiters() == 0 {
        tokio::task::yield_now().await;
    }
    token.cancel();

    let err = waiter.await.unwrap().unwrap_err();
    assert!(err.is_exhausted(), "got {err:?}");
    drop(held);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn huge_humantime_timeout_still_serves_requests() {
    let json = r#"{"pool_size": 0, "max_pool_size": 1, "acquire_timeout": "400000000000years"}"#;
    let config: PoolConfig = serde_json::from_str(json).unwrap();
    let pool = Pool::new(MockFactory::new(), config).unwrap();

    assert_eq!(pool.execute("ping".to_string()).await.unwrap(), "ping");
}
