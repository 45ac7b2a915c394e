// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadflow process` and `leadflow ingest`: one body in, JSON out.

use std::path::Path;

use leadflow_config::LeadflowConfig;
use leadflow_core::LeadflowError;
use serde_json::Value;
use tokio::io::AsyncReadExt;

use crate::adapters::AdapterFactory;

/// Runs one delivery body through the engine and prints its report.
///
/// An error means the delivery must not be acknowledged.
pub async fn run_process(config: LeadflowConfig, file: Option<&Path>) -> Result<(), LeadflowError> {
    let body = read_input(file).await?;
    let factory = AdapterFactory::new(config);
    let store = factory.object_store().await?;
    let engine = factory.engine(store).await?;

    let report = engine.handle_message(&body).await?;
    print_json(&serde_json::to_value(&report)?)
}

/// Stores one webhook payload as a raw object and prints the receipt.
pub async fn run_ingest(config: LeadflowConfig, file: Option<&Path>) -> Result<(), LeadflowError> {
    let body = read_input(file).await?;
    let factory = AdapterFactory::new(config);
    let store = factory.object_store().await?;
    let ingestor = factory.ingestor(store)?;

    let receipt = ingestor.ingest_slice(body.as_bytes()).await?;
    print_json(&serde_json::to_value(&receipt)?)
}

async fn read_input(file: Option<&Path>) -> Result<String, LeadflowError> {
    match file {
        Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            LeadflowError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        }),
        None => {
            let mut body = String::new();
            tokio::io::stdin()
                .read_to_string(&mut body)
                .await
                .map_err(|e| LeadflowError::InvalidInput(format!("cannot read stdin: {e}")))?;
            Ok(body)
        }
    }
}

fn print_json(value: &Value) -> Result<(), LeadflowError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
