// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Regrouping of a flat record sequence into nested child nodes.
//!
//! For grouping fields `[region, instance-type]` every record descends one
//! level per field, keyed by that field's value, and is appended to the
//! `inputs` of the deepest node:
//!
//! ```text
//! children:
//!   eu-west:
//!     children:
//!       m5.large:
//!         inputs: [...]
//! ```
//!
//! Key order at every level is first-seen order, and records keep their
//! relative order inside each group.

use serde_json::Value;

use crate::errors::{EngineError, Result};
use crate::model::{Children, Node, Record};

/// Partition `records` by the values of `groups`, in order.
pub fn regroup(records: &[Record], groups: &[String]) -> Result<Children> {
    if groups.is_empty() {
        return Err(EngineError::InvalidGrouping(
            "regroup requires at least one grouping field".to_string(),
        ));
    }

    let mut root = Children::new();

    for (index, record) in records.iter().enumerate() {
        let keys = groups
            .iter()
            .map(|field| group_key(record, field, index))
            .collect::<Result<Vec<String>>>()?;

        let mut level = &mut root;
        for (depth, key) in keys.into_iter().enumerate() {
            let node = level.entry(key).or_insert_with(Node::default);
            if depth + 1 == groups.len() {
                node.inputs.get_or_insert_with(Vec::new).push(record.clone());
                break;
            }
            level = node.children.get_or_insert_with(Children::new);
        }
    }

    Ok(root)
}

fn group_key(record: &Record, field: &str, index: usize) -> Result<String> {
    match record.get(field) {
        Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::Bool(flag)) => Ok(flag.to_string()),
        Some(Value::Array(_)) | Some(Value::Object(_)) => Err(EngineError::InvalidGrouping(format!(
            "grouping field '{}' in inputs[{}] is not a scalar value",
            field, index
        ))),
        _ => Err(EngineError::InvalidGrouping(format!(
            "grouping field '{}' is missing from inputs[{}]",
            field, index
        ))),
    }
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

    fn flatten(children: &Children, out: &mut Vec<Record>) {
        for node in children.values() {
            if let Some(inputs) = &node.inputs {
                out.extend(inputs.iter().cloned());
            }
            if let Some(nested) = &node.children {
                flatten(nested, out);
            }
        }
    }

    fn sample() -> Vec<Record> {
        records(vec![
            json!({"timestamp": "2023-07-06T00:00:00Z", "region": "uk-west", "type": "A1", "v": 1}),
            json!({"timestamp": "2023-07-06T00:00:00Z", "region": "uk-east", "type": "A1", "v": 2}),
            json!({"timestamp": "2023-07-06T00:05:00Z", "region": "uk-west", "type": "B1", "v": 3}),
            json!({"timestamp": "2023-07-06T00:05:00Z", "region": "uk-west", "type": "A1", "v": 4}),
        ])
    }

    #[test]
    fn test_single_field_grouping_keeps_first_seen_order() {
        let children = regroup(&sample(), &["region".to_string()]).unwrap();

        let keys: Vec<&String> = children.keys().collect();
        assert_eq!(keys, vec!["uk-west", "uk-east"]);

        let west = children["uk-west"].inputs.as_ref().unwrap();
        let values: Vec<i64> = west.iter().map(|r| r["v"].as_i64().unwrap()).collect();
        assert_eq!(values, vec![1, 3, 4]);
        assert!(children["uk-west"].children.is_none());
    }

    #[test]
    fn test_nested_grouping() {
        let groups = vec!["region".to_string(), "type".to_string()];
        let children = regroup(&sample(), &groups).unwrap();

        let west = children["uk-west"].children.as_ref().unwrap();
        let types: Vec<&String> = west.keys().collect();
        assert_eq!(types, vec!["A1", "B1"]);
        assert_eq!(west["A1"].inputs.as_ref().unwrap().len(), 2);
        assert!(children["uk-west"].inputs.is_none());
    }

    #[test]
    fn test_regroup_is_lossless() {
        let input = sample();
        let groups = vec!["type".to_string(), "region".to_string()];
        let children = regroup(&input, &groups).unwrap();

        let mut flattened = Vec::new();
        flatten(&children, &mut flattened);

        assert_eq!(flattened.len(), input.len());
        for record in &input {
            let expected = input.iter().filter(|r| *r == record).count();
            let actual = flattened.iter().filter(|r| *r == record).count();
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn test_numeric_group_values_become_keys() {
        let input = records(vec![json!({"zone": 1}), json!({"zone": 2}), json!({"zone": 1})]);

        let children = regroup(&input, &["zone".to_string()]).unwrap();

        assert_eq!(children["1"].inputs.as_ref().unwrap().len(), 2);
        assert_eq!(children["2"].inputs.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_group_list_is_rejected() {
        let result = regroup(&sample(), &[]);

        assert!(matches!(result, Err(EngineError::InvalidGrouping(_))));
    }

    #[test]
    fn test_missing_group_field_names_field_and_index() {
        let mut input = sample();
        input[2].remove("type");

        let result = regroup(&input, &["region".to_string(), "type".to_string()]);

        match result {
            Err(EngineError::InvalidGrouping(message)) => {
                assert!(message.contains("'type'"));
                assert!(message.contains("inputs[2]"));
            }
            other => panic!("expected grouping error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_yields_no_children() {
        let children = regroup(&[], &["region".to_string()]).unwrap();

        assert!(children.is_empty());
    }
}
