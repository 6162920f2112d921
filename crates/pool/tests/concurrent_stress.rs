//! Concurrent stress test for the pool.
//!
//! Many tasks hammer a small pool. No resource may ever run two requests at
//! once, membership may never pass the ceiling and every acquisition must
//! be matched by a release.

use std::time::Duration;

use nebula_pool::testing::MockFactory;
use nebula_pool::{Pool, PoolConfig};
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_50_tasks_never_share_a_resource() {
    let max_pool_size = 5;
    let factory = MockFactory::new().with_latency(Duration::from_millis(1));
    let pool = Pool::new(
        factory.clone(),
        PoolConfig {
            pool_size: 0,
            max_pool_size,
            acquire_timeout: Duration::from_secs(10),
            ..Default::default()
        },
    )
    .unwrap();

    let mut set = JoinSet::new();
    for task in 0..50 {
        let pool = pool.clone();
        set.spawn(async move {
            for i in 0..20 {
                let request = format!("{task}-{i}");
                let response = pool.execute(request.clone()).await.expect("task should execute");
                assert_eq!(response, request);
                let members = pool.stats().members;
                assert!(members <= max_pool_size, "membership {members} over ceiling");
            }
        });
    }

    // Timeout as a safety net against deadlock.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    while let Some(result) = tokio::time::timeout_at(deadline, set.join_next())
        .await
        .expect("stress test should not deadlock (30s timeout)")
    {
        result.expect("task should not panic");
    }

    assert_eq!(factory.overlaps(), 0, "a resource ran two requests at once");
    assert!(factory.peak_in_flight() <= max_pool_size);
    assert!(factory.created() <= max_pool_size);

    let stats = pool.stats();
    assert_eq!(stats.active, 0);
    assert_eq!(stats.waiters, 0);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.total_acquisitions, 1000);
    assert_eq!(stats.total_releases, stats.total_acquisitions);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_with_concurrent_maintenance() {
    let max_pool_size = 4;
    let factory = MockFactory::new().with_latency(Duration::from_micros(200));
    let config = PoolConfig::from_millis(0, max_pool_size, 0, 10_000);
    let pool = Pool::new(factory.clone(), config).unwrap();

    let sweeper = {
        let pool = pool.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                pool.maintenance();
                tokio::time::sleep(Duration::from_micros(500)).await;
            }
        })
    };

    let mut set = JoinSet::new();
    for task in 0..20 {
        let pool = pool.clone();
        set.spawn(async move {
            for i in 0..25 {
                pool.execute(format!("{task}-{i}")).await.expect("task should execute");
            }
        });
    }
    while let Some(result) = set.join_next().await {
        result.expect("task should not panic");
    }
    sweeper.await.unwrap();

    assert_eq!(factory.overlaps(), 0);
    let stats = pool.stats();
    assert!(stats.members <= max_pool_size);
    assert_eq!(stats.active, 0);
    assert_eq!(
        stats.created,
        stats.destroyed + stats.members as u64,
        "every created resource is either a member or destroyed"
    );
}
