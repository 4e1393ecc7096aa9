//! Acquires, refreshes and releases a queued lock held in Redis.
//!
//! ```text
//! REDIS_URL=redis://localhost:6379 RUST_LOG=queued_lock_core=debug \
//!     cargo run -p queued-lock --example redis_lock
//! ```

use std::time::Duration;

use queued_lock::{LockProvider, RedisLockProvider};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let provider = RedisLockProvider::builder()
        .url(url)
        .global_timeout(Duration::from_secs(10))
        .poll_interval(Duration::from_millis(50))
        .build()
        .await?;

    let mut lock = provider.create_lock("demo-resource")?;
    if !lock.acquire(true, Some(Duration::from_secs(30))).await? {
        println!("gave up waiting for {}", lock.name());
        return Ok(());
    }
    println!("acquired {} as {}", lock.name(), lock.owner_id());

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(2)).await;
        lock.acquire(true, None).await?;
        println!("refreshed, {:.1}s remaining", lock.seconds_remaining().unwrap_or_default());
    }

    lock.release().await?;
    println!("released");
    Ok(())
}
