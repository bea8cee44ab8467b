// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only stages.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::{EngineError, Result};
use crate::model::Record;
use crate::traits::{Plugin, PluginMetadata};

/// Sets `field` to a fixed value on every record, or to the node config's
/// `value` key when one is given.
pub struct TagStage {
    field: String,
    value: Value,
    metadata: PluginMetadata,
}

impl TagStage {
    pub fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: Value::from(value),
            metadata: PluginMetadata::execute(),
        }
    }
}

#[async_trait]
impl Plugin for TagStage {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, records: &[Record], config: Option<&Value>) -> Result<Vec<Record>> {
        let value = config
            .and_then(|config| config.get("value"))
            .unwrap_or(&self.value);
        Ok(records
            .iter()
            .map(|record| {
                let mut tagged = record.clone();
                tagged.insert(self.field.clone(), value.clone());
                tagged
            })
            .collect())
    }
}

/// Passes records through and remembers every invocation's input and config.
pub struct RecordingStage {
    pub calls: Arc<Mutex<Vec<(Vec<Record>, Option<Value>)>>>,
    metadata: PluginMetadata,
}

impl RecordingStage {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            metadata: PluginMetadata::execute(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Plugin for RecordingStage {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, records: &[Record], config: Option<&Value>) -> Result<Vec<Record>> {
        self.calls
            .lock()
            .unwrap()
            .push((records.to_vec(), config.cloned()));
        Ok(records.to_vec())
    }
}

/// Always fails with an input-validation error.
pub struct FailingStage {
    metadata: PluginMetadata,
}

impl FailingStage {
    pub fn new() -> Self {
        Self {
            metadata: PluginMetadata::execute(),
        }
    }
}

#[async_trait]
impl Plugin for FailingStage {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, _records: &[Record], _config: Option<&Value>) -> Result<Vec<Record>> {
        Err(EngineError::InputValidation("failing stage always fails".to_string()))
    }
}

/// Sleeps before passing records through.
pub struct SlowStage {
    delay: Duration,
    metadata: PluginMetadata,
}

impl SlowStage {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            metadata: PluginMetadata::execute(),
        }
    }
}

#[async_trait]
impl Plugin for SlowStage {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, records: &[Record], _config: Option<&Value>) -> Result<Vec<Record>> {
        tokio::time::sleep(self.delay).await;
        Ok(records.to_vec())
    }
}
