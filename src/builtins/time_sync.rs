// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::errors::Result;
use crate::model::{Record, DURATION, TIMESTAMP};
use crate::parameters::{AggregationMethod, ParameterDescriptor, ParameterRegistry};
use crate::time_sync::{synchronize, TimeSyncConfig};
use crate::traits::{resolve_config, ParameterMetadata, Plugin, PluginMetadata};

/// Time-sync stage - resamples a leaf's records onto a fixed window.
pub struct TimeSyncPlugin {
    config: Option<Value>,
    registry: Arc<ParameterRegistry>,
    metadata: PluginMetadata,
}

impl TimeSyncPlugin {
    pub fn new(config: Option<Value>, registry: Arc<ParameterRegistry>) -> Self {
        let mut parameters = ParameterMetadata::default();
        parameters.inputs.insert(
            TIMESTAMP.to_string(),
            ParameterDescriptor {
                unit: "RFC3339".to_string(),
                description: "refers to the time of occurrence of the input".to_string(),
                ..ParameterDescriptor::new(AggregationMethod::None)
            },
        );
        parameters.inputs.insert(
            DURATION.to_string(),
            ParameterDescriptor {
                unit: "seconds".to_string(),
                description: "refers to the duration of the input".to_string(),
                ..ParameterDescriptor::new(AggregationMethod::Sum)
            },
        );

        Self {
            config,
            registry,
            metadata: PluginMetadata::execute().with_parameters(parameters),
        }
    }
}

#[async_trait]
impl Plugin for TimeSyncPlugin {
    fn name(&self) -> &'static str {
        "time-sync"
    }

    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, records: &[Record], config: Option<&Value>) -> Result<Vec<Record>> {
        let params = TimeSyncConfig::from_value(resolve_config(config, self.config.as_ref()))?.validate()?;
        synchronize(records, &params, &self.registry)
    }
}
