//! Shared fakes for integration tests.
#![allow(dead_code)]

pub mod fake_tool;
pub mod fakes;

use std::time::Duration;

/// Polls `check` every 10 ms until it returns true; panics after 5 s.
pub async fn wait_until<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check().await {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
