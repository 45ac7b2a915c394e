// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory at-least-once queue with a dead-letter list.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leadflow_core::{
    AdapterType, Delivery, HealthStatus, LeadflowError, MessageSource, PluginAdapter,
};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct QueuedMessage {
    id: String,
    body: String,
    receive_count: u32,
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    visible: VecDeque<QueuedMessage>,
    in_flight: HashMap<String, QueuedMessage>,
    acked: Vec<String>,
    dead_letters: Vec<QueuedMessage>,
}

/// Queue that behaves like a redrive-configured cloud queue.
///
/// Received messages stay in flight until acknowledged. A released message
/// becomes visible again, unless it has already been received
/// `max_receive_count` times, in which case it moves to the dead letters.
/// An empty receive waits `empty_wait` before returning nothing.
#[derive(Clone)]
pub struct MemoryQueue {
    state: Arc<Mutex<QueueState>>,
    max_receive_count: u32,
    batch_size: usize,
    empty_wait: Duration,
}

impl MemoryQueue {
    pub fn new(max_receive_count: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            max_receive_count,
            batch_size: 10,
            empty_wait: Duration::from_millis(50),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn max_receive_count(&self) -> u32 {
        self.max_receive_count
    }

    /// Enqueues a body and returns its message id.
    pub async fn send(&self, body: impl Into<String>) -> String {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = format!("msg-{}", state.next_id);
        state.visible.push_back(QueuedMessage {
            id: id.clone(),
            body: body.into(),
            receive_count: 0,
        });
        id
    }

    /// Messages waiting to be received.
    pub async fn visible_len(&self) -> usize {
        self.state.lock().await.visible.len()
    }

    pub async fn in_flight_len(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    /// Ids of acknowledged messages, in ack order.
    pub async fn acked(&self) -> Vec<String> {
        self.state.lock().await.acked.clone()
    }

    /// Ids of dead-lettered messages with their final receive counts.
    pub async fn dead_letters(&self) -> Vec<(String, u32)> {
        self.state
            .lock()
            .await
            .dead_letters
            .iter()
            .map(|m| (m.id.clone(), m.receive_count))
            .collect()
    }
}

#[async_trait]
impl PluginAdapter for MemoryQueue {
    fn name(&self) -> &str {
        "memory-queue"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Queue
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl MessageSource for MemoryQueue {
    async fn receive(&self) -> Result<Vec<Delivery>, LeadflowError> {
        let deliveries = {
            let mut state = self.state.lock().await;
            let mut deliveries = Vec::new();
            while deliveries.len() < self.batch_size {
                let Some(mut message) = state.visible.pop_front() else {
                    break;
                };
                message.receive_count += 1;
                let receipt = format!("{}#{}", message.id, message.receive_count);
                deliveries.push(Delivery {
                    message_id: message.id.clone(),
                    receipt: receipt.clone(),
                    body: message.body.clone(),
                    receive_count: message.receive_count,
                });
                state.in_flight.insert(receipt, message);
            }
            deliveries
        };

        if deliveries.is_empty() {
            tokio::time::sleep(self.empty_wait).await;
        }
        Ok(deliveries)
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), LeadflowError> {
        let mut state = self.state.lock().await;
        let message = state
            .in_flight
            .remove(&delivery.receipt)
            .ok_or_else(|| LeadflowError::Queue {
                message: format!("unknown receipt {}", delivery.receipt),
                source: None,
            })?;
        state.acked.push(message.id);
        Ok(())
    }

    async fn release(&self, delivery: &Delivery) -> Result<(), LeadflowError> {
        let mut state = self.state.lock().await;
        let Some(message) = state.in_flight.remove(&delivery.receipt) else {
            return Ok(());
        };
        if message.receive_count >= self.max_receive_count {
            state.dead_letters.push(message);
        } else {
            state.visible.push_back(message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn released_message_is_redelivered_then_dead_lettered() {
        let queue = MemoryQueue::new(2);
        let id = queue.send("body").await;

        let first = queue.receive().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].receive_count, 1);
        queue.release(&first[0]).await.unwrap();

        let second = queue.receive().await.unwrap();
        assert_eq!(second[0].receive_count, 2);
        queue.release(&second[0]).await.unwrap();

        assert_eq!(queue.visible_len().await, 0);
        assert_eq!(queue.dead_letters().await, vec![(id, 2)]);
    }

    #[tokio::test]
    async fn ack_removes_message() {
        let queue = MemoryQueue::new(3);
        let id = queue.send("body").await;
        let batch = queue.receive().await.unwrap();
        queue.ack(&batch[0]).await.unwrap();

        assert_eq!(queue.acked().await, vec![id]);
        assert_eq!(queue.in_flight_len().await, 0);
        assert!(queue.ack(&batch[0]).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_receive_waits_and_returns_nothing() {
        let queue = MemoryQueue::new(3);
        assert!(queue.receive().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_size_limits_receive() {
        let queue = MemoryQueue::new(3).with_batch_size(2);
        for i in 0..3 {
            queue.send(format!("m{i}")).await;
        }
        assert_eq!(queue.receive().await.unwrap().len(), 2);
        assert_eq!(queue.receive().await.unwrap().len(), 1);
    }
}
