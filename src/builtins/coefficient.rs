// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::parse_config;
use super::sum::required_number;
use crate::errors::{EngineError, Result};
use crate::model::record::number_value;
use crate::model::Record;
use crate::traits::{resolve_config, Plugin, PluginMetadata};
use crate::utils::expression::numeric_value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CoefficientConfig {
    input_parameter: String,
    /// A number, or an `=` expression evaluated against each record.
    coefficient: Value,
    output_parameter: String,
}

/// Coefficient plugin - `output-parameter = input-parameter * coefficient`.
pub struct CoefficientPlugin {
    config: Option<Value>,
    metadata: PluginMetadata,
}

impl CoefficientPlugin {
    pub fn new(config: Option<Value>) -> Self {
        Self {
            config,
            metadata: PluginMetadata::execute(),
        }
    }
}

#[async_trait]
impl Plugin for CoefficientPlugin {
    fn name(&self) -> &'static str {
        "coefficient"
    }

    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, records: &[Record], config: Option<&Value>) -> Result<Vec<Record>> {
        let config: CoefficientConfig =
            parse_config("Coefficient", resolve_config(config, self.config.as_ref()))?;

        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let input = required_number(record, &config.input_parameter, index)?;
                let coefficient = numeric_value(&config.coefficient, record)?.ok_or_else(|| {
                    EngineError::Config(format!(
                        "coefficient must be a number or an expression, got {}",
                        config.coefficient
                    ))
                })?;

                let mut output = record.clone();
                output.insert(config.output_parameter.clone(), number_value(input * coefficient));
                Ok(output)
            })
            .collect()
    }
}
