// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::parse_config;
use crate::errors::{EngineError, Result};
use crate::model::record::number_value;
use crate::model::Record;
use crate::traits::{resolve_config, Plugin, PluginMetadata};
use crate::utils::expression::numeric_value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SumConfig {
    input_parameters: Vec<String>,
    output_parameter: String,
}

/// Sum plugin - writes the sum of `input-parameters` to `output-parameter`.
pub struct SumPlugin {
    config: Option<Value>,
    metadata: PluginMetadata,
}

impl SumPlugin {
    pub fn new(config: Option<Value>) -> Self {
        Self {
            config,
            metadata: PluginMetadata::execute(),
        }
    }
}

#[async_trait]
impl Plugin for SumPlugin {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, records: &[Record], config: Option<&Value>) -> Result<Vec<Record>> {
        let config: SumConfig = parse_config("Sum", resolve_config(config, self.config.as_ref()))?;

        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let mut total = 0.0;
                for field in &config.input_parameters {
                    total += required_number(record, field, index)?;
                }
                let mut output = record.clone();
                output.insert(config.output_parameter.clone(), number_value(total));
                Ok(output)
            })
            .collect()
    }
}

/// Numeric value of `field` in `inputs[index]`, evaluating expressions.
pub(crate) fn required_number(record: &Record, field: &str, index: usize) -> Result<f64> {
    let value = record.get(field).ok_or_else(|| {
        EngineError::InputValidation(format!("'{}' is missing from inputs[{}]", field, index))
    })?;
    numeric_value(value, record)?.ok_or_else(|| {
        EngineError::InputValidation(format!("'{}' in inputs[{}] is not a number", field, index))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn energy_config() -> Value {
        json!({
            "input-parameters": ["cpu/energy", "memory/energy"],
            "output-parameter": "energy"
        })
    }

    #[tokio::test]
    async fn test_sums_inputs_per_record() {
        let plugin = SumPlugin::new(Some(energy_config()));
        let inputs = records(vec![
            json!({"cpu/energy": 1, "memory/energy": 2}),
            json!({"cpu/energy": 0.5, "memory/energy": "= 'cpu/energy' * 3"}),
        ]);

        let outputs = plugin.execute(&inputs, None).await.unwrap();

        assert_eq!(outputs[0]["energy"], json!(3));
        assert_eq!(outputs[1]["energy"], json!(2));
        // inputs are left alone
        assert!(inputs[0].get("energy").is_none());
    }

    #[tokio::test]
    async fn test_missing_input_names_field_and_index() {
        let plugin = SumPlugin::new(Some(energy_config()));
        let inputs = records(vec![
            json!({"cpu/energy": 1, "memory/energy": 2}),
            json!({"cpu/energy": 1}),
        ]);

        let result = plugin.execute(&inputs, None).await;

        assert_eq!(
            result,
            Err(EngineError::InputValidation(
                "'memory/energy' is missing from inputs[1]".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_invalid_config() {
        let plugin = SumPlugin::new(None);
        let inputs = records(vec![json!({"a": 1})]);

        assert!(matches!(plugin.execute(&inputs, None).await, Err(EngineError::Config(_))));

        let incomplete = json!({"input-parameters": ["a"]});
        assert!(matches!(
            plugin.execute(&inputs, Some(&incomplete)).await,
            Err(EngineError::Config(_))
        ));
    }
}
