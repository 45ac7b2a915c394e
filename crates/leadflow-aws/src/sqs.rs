// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQS message source.
//!
//! Deliveries are acknowledged by deleting them. Nothing is done on release:
//! the message becomes visible again when its visibility timeout expires, and
//! the queue's redrive policy moves it to the dead-letter queue after
//! `maxReceiveCount` receives.
//!
//! The client's operation timeout comes from [`QueueConfig::receive_timeout`],
//! never from the shared SDK config. A timeout shorter than the long poll
//! would abort receives that SQS may already have dequeued, spending a
//! receive count on a message nobody processed.

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::{Message, MessageSystemAttributeName, QueueAttributeName};
use leadflow_config::model::QueueConfig;
use leadflow_core::{
    AdapterType, Delivery, HealthStatus, LeadflowError, MessageSource, PluginAdapter,
};
use tracing::{debug, warn};

/// Long-polling consumer for one queue.
#[derive(Debug, Clone)]
pub struct SqsSource {
    client: Client,
    queue_url: String,
    max_messages: i32,
    wait_time_secs: i32,
    visibility_timeout_secs: Option<i32>,
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl SqsSource {
    /// Requires `queue.queue_url`.
    pub fn new(
        sdk_config: &aws_config::SdkConfig,
        config: &QueueConfig,
    ) -> Result<Self, LeadflowError> {
        let sqs_config = aws_sdk_sqs::config::Builder::from(sdk_config)
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.receive_timeout())
                    .build(),
            )
            .build();
        Self::from_client(Client::from_conf(sqs_config), config)
    }

    /// Wraps a pre-built client; its timeouts are used as given.
    pub fn from_client(client: Client, config: &QueueConfig) -> Result<Self, LeadflowError> {
        let queue_url = config
            .queue_url
            .clone()
            .ok_or_else(|| LeadflowError::Config("queue.queue_url is required".into()))?;
        Ok(Self {
            client,
            queue_url,
            max_messages: to_i32(config.max_messages),
            wait_time_secs: to_i32(config.wait_time_secs),
            visibility_timeout_secs: config.visibility_timeout_secs.map(to_i32),
        })
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

fn queue_error<E>(operation: &str, err: aws_sdk_sqs::error::SdkError<E>) -> LeadflowError
where
    E: std::error::Error + Send + Sync + 'static,
{
    LeadflowError::Queue {
        message: format!("sqs {operation}: {}", DisplayErrorContext(&err)),
        source: Some(Box::new(err)),
    }
}

/// Converts an SQS message, or `None` when it lacks a body or receipt handle.
pub fn delivery_from_message(message: Message) -> Option<Delivery> {
    let receive_count = message
        .attributes()
        .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
        .and_then(|count| count.parse().ok())
        .unwrap_or(1);
    Some(Delivery {
        message_id: message.message_id.unwrap_or_default(),
        receipt: message.receipt_handle?,
        body: message.body?,
        receive_count,
    })
}

#[async_trait]
impl PluginAdapter for SqsSource {
    fn name(&self) -> &str {
        "sqs"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Queue
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        let response = self
            .client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessages)
            .send()
            .await;
        match response {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(DisplayErrorContext(&e).to_string())),
        }
    }
}

#[async_trait]
impl MessageSource for SqsSource {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn receive(&self) -> Result<Vec<Delivery>, LeadflowError> {
        let mut request = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(self.max_messages)
            .wait_time_seconds(self.wait_time_secs)
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount);
        if let Some(timeout) = self.visibility_timeout_secs {
            request = request.visibility_timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| queue_error("receive_message", e))?;

        let mut deliveries = Vec::new();
        for message in response.messages.unwrap_or_default() {
            let id = message.message_id.clone().unwrap_or_default();
            match delivery_from_message(message) {
                Some(delivery) => deliveries.push(delivery),
                None => warn!(message_id = %id, "dropping SQS message without body or receipt"),
            }
        }
        debug!(count = deliveries.len(), "received deliveries");
        Ok(deliveries)
    }

    #[tracing::instrument(level = "debug", skip(self, delivery), fields(message_id = %delivery.message_id))]
    async fn ack(&self, delivery: &Delivery) -> Result<(), LeadflowError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(&delivery.receipt)
            .send()
            .await
            .map_err(|e| queue_error("delete_message", e))?;
        Ok(())
    }
}
