use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use core_types::{Note, PersistenceGateway};

/// Adds a fixed round-trip delay to another gateway. Writes land before the
/// delay, reads happen after it.
#[derive(Debug)]
pub struct Delayed<G> {
    inner: G,
    latency: Duration,
}

impl<G> Delayed<G> {
    pub fn new(inner: G, latency: Duration) -> Self {
        Self { inner, latency }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl<G: PersistenceGateway> PersistenceGateway for Delayed<G> {
    async fn load(&self) -> Result<Option<Vec<Note>>> {
        self.wait().await;
        self.inner.load().await
    }

    async fn save(&self, notes: &[Note]) -> Result<()> {
        self.inner.save(notes).await?;
        self.wait().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use crate::MemoryGateway;

    use super::*;

    #[tokio::test]
    async fn round_trip_takes_at_least_the_latency() {
        let gateway = Delayed::new(MemoryGateway::new(), Duration::from_millis(20));
        let started = Instant::now();
        gateway.save(&[Note::blank(1)]).await.expect("save");
        let loaded = gateway.load().await.expect("load");
        assert!(started.elapsed() >= Duration::from_millis(40));
        assert_eq!(loaded, Some(vec![Note::blank(1)]));
    }

    #[tokio::test]
    async fn save_is_visible_before_the_ack() {
        let gateway = Delayed::new(MemoryGateway::new(), Duration::from_millis(50));
        let notes = vec![Note::blank(3)];
        let pending = gateway.save(&notes);
        tokio::pin!(pending);
        let _ = tokio::time::timeout(Duration::from_millis(5), &mut pending).await;
        assert!(gateway.inner().raw().is_some());
        pending.await.expect("save");
    }
}
