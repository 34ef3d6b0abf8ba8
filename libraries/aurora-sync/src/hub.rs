//! State fan-out hub
//!
//! Each consumer runs in its own task behind its own channel. Publishing
//! never blocks the playback owner: a consumer that falls behind loses
//! position ticks but still sees every track, status and queue change in
//! order. A consumer that errors or panics affects nobody else.

use crate::error::Result;
use async_trait::async_trait;
use aurora_core::StateUpdate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Backlog per consumer beyond which position ticks are dropped
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// A passive subscriber of playback state updates
#[async_trait]
pub trait StateConsumer: Send + 'static {
    fn name(&self) -> &str;

    async fn handle(&mut self, update: &StateUpdate) -> Result<()>;

    /// Called once after the hub shuts down
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

struct ConsumerHandle {
    name: String,
    tx: mpsc::UnboundedSender<StateUpdate>,
    /// Updates sent but not yet taken by the consumer task
    pending: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

/// Superseded by the next tick, so a lagging consumer can skip them
fn is_droppable(update: &StateUpdate) -> bool {
    matches!(
        update,
        StateUpdate::Position { .. } | StateUpdate::Seeked { .. }
    )
}

/// Broadcasts state updates to independent consumers
pub struct SyncHub {
    consumers: Vec<ConsumerHandle>,
    capacity: usize,
}

impl Default for SyncHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            consumers: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Spawn a consumer task; must be called inside a Tokio runtime
    pub fn register<C: StateConsumer>(&mut self, consumer: C) {
        let name = consumer.name().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let task = tokio::spawn(run_consumer(consumer, rx, pending.clone()));
        info!(consumer = %name, "Registered state consumer");
        self.consumers.push(ConsumerHandle {
            name,
            tx,
            pending,
            task,
        });
    }

    pub fn consumer_names(&self) -> Vec<&str> {
        self.consumers.iter().map(|c| c.name.as_str()).collect()
    }

    /// Offer one update to every consumer; returns how many accepted it
    ///
    /// Position ticks are dropped for a consumer whose backlog has reached
    /// the channel capacity. Every other update is always queued.
    pub fn publish(&self, update: &StateUpdate) -> usize {
        let mut delivered = 0;
        for consumer in &self.consumers {
            if is_droppable(update) && consumer.pending.load(Ordering::Acquire) >= self.capacity {
                debug!(consumer = %consumer.name, "Consumer lagging, dropped position update");
                continue;
            }
            consumer.pending.fetch_add(1, Ordering::AcqRel);
            match consumer.tx.send(update.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    consumer.pending.fetch_sub(1, Ordering::AcqRel);
                    debug!(consumer = %consumer.name, "Consumer stopped, dropped update");
                }
            }
        }
        delivered
    }

    pub fn publish_all(&self, updates: &[StateUpdate]) {
        for update in updates {
            self.publish(update);
        }
    }

    /// Close every channel and wait for consumers to drain
    pub async fn shutdown(self) {
        for consumer in self.consumers {
            drop(consumer.tx);
            if let Err(e) = consumer.task.await {
                warn!(consumer = %consumer.name, error = %e, "Consumer task ended abnormally");
            }
        }
    }
}

async fn run_consumer<C: StateConsumer>(
    mut consumer: C,
    mut rx: mpsc::UnboundedReceiver<StateUpdate>,
    pending: Arc<AtomicUsize>,
) {
    while let Some(update) = rx.recv().await {
        pending.fetch_sub(1, Ordering::AcqRel);
        if let Err(e) = consumer.handle(&update).await {
            warn!(consumer = consumer.name(), error = %e, "State consumer failed");
        }
    }
    if let Err(e) = consumer.shutdown().await {
        warn!(consumer = consumer.name(), error = %e, "State consumer shutdown failed");
    }
    debug!(consumer = consumer.name(), "State consumer stopped");
}
