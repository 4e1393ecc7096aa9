//! Integration tests for Redis-backed queued locks.

use queued_lock_core::traits::{LockProvider, LockProviderExt, QueueStore};
use queued_lock_redis::RedisLockProvider;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Helper to get Redis URL from environment or use default.
fn get_redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
}

async fn provider(global_timeout: Duration) -> RedisLockProvider {
    RedisLockProvider::builder()
        .url(get_redis_url())
        .global_timeout(global_timeout)
        .poll_interval(Duration::from_millis(20))
        .build()
        .await
        .unwrap()
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_exclusive_lock_acquisition() {
    let provider = provider(Duration::from_secs(30)).await;
    let mut first = provider.create_lock("test-queued-exclusive").unwrap();
    let mut second = provider.create_lock("test-queued-exclusive").unwrap();
    first.clear().await.unwrap();

    // First acquisition should succeed
    assert!(first.try_acquire().await.unwrap());

    // Second acquisition should fail (lock is held)
    assert!(!second.try_acquire().await.unwrap());
    assert_eq!(first.queue().await.unwrap().len(), 1);

    // Release the lock
    assert!(first.release().await.unwrap());

    // Now acquisition should succeed
    assert!(second.try_acquire().await.unwrap());
    second.clear().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_blocking_acquire() {
    let provider = provider(Duration::from_secs(30)).await;
    let mut holder = provider.create_lock("test-queued-blocking").unwrap();
    holder.clear().await.unwrap();
    assert!(holder.acquire(true, None).await.unwrap());

    // Spawn a task that waits for the same lock
    let mut waiter = provider.create_lock("test-queued-blocking").unwrap();
    let acquire_task = tokio::spawn(async move {
        let acquired = waiter
            .acquire(true, Some(Duration::from_secs(5)))
            .await
            .unwrap();
        (acquired, waiter)
    });

    // Wait a bit to ensure the task is queued
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!acquire_task.is_finished());

    assert!(holder.release().await.unwrap());

    let (acquired, mut waiter) = timeout(Duration::from_secs(5), acquire_task)
        .await
        .unwrap()
        .unwrap();
    assert!(acquired);
    assert!(waiter.has_lock().await.unwrap());
    assert!(waiter.release().await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_refresh_keeps_single_ticket() {
    let provider = provider(Duration::from_secs(2)).await;
    let mut lock = provider.create_lock("test-queued-refresh").unwrap();
    lock.clear().await.unwrap();

    assert!(lock.try_acquire().await.unwrap());
    let acquired_at = lock.acquired_at();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(lock.acquire(true, None).await.unwrap());
    assert_eq!(lock.acquired_at(), acquired_at);
    assert!(lock.seconds_remaining().unwrap() > 1.9);

    let queue = provider.store().all("test-queued-refresh").await.unwrap();
    assert_eq!(queue.len(), 1);
    lock.clear().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_abandoned_lock_expires() {
    let provider = provider(Duration::from_secs(1)).await;
    let mut crashed = provider.create_lock("test-queued-abandoned").unwrap();
    crashed.clear().await.unwrap();
    assert!(crashed.try_acquire().await.unwrap());
    let start = Instant::now();
    drop(crashed);

    let mut survivor = provider
        .acquire_lock("test-queued-abandoned", Some(Duration::from_secs(5)))
        .await
        .unwrap()
        .expect("abandoned lock should be reclaimed");
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert!(survivor.has_lock().await.unwrap());
    survivor.clear().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_clear_removes_queue() {
    let provider = provider(Duration::ZERO).await;
    let mut holder = provider.create_lock("test-queued-clear").unwrap();
    holder.clear().await.unwrap();
    assert!(holder.try_acquire().await.unwrap());

    holder.clear().await.unwrap();
    assert!(!holder.has_lock().await.unwrap());
    assert!(holder.queue().await.unwrap().is_empty());
    assert!(!holder.release().await.unwrap());
}
