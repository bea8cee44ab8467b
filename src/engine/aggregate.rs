// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Aggregation engine: rolls per-metric totals up the computed tree.
//!
//! Vertical aggregation is an explicit post-order fold. Each leaf folds the
//! declared metrics of its `outputs` into an [`Accumulator`]; each interior
//! node snapshots the accumulator it returns into its `aggregated` field.
//!
//! The [`AggregationScope`] decides what an interior node's snapshot covers:
//! `subtree` starts every node from an empty accumulator so the snapshot
//! covers exactly its descendants, `cumulative` threads one accumulator
//! through the whole walk so a snapshot also includes every branch visited
//! before it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::consts::ROOT_NODE_PATH;
use crate::errors::{EngineError, Result};
use crate::model::record::number_value;
use crate::model::{Node, Record};
use crate::observability::messages::aggregation::{
    AggregationCompleted, HorizontalAggregationReserved,
};
use crate::observability::messages::StructuredLog;
use crate::parameters::{AggregationMethod, ParameterRegistry};
use crate::utils::expression::numeric_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    Vertical,
    /// Reserved; accepted but has no behavior.
    Horizontal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationScope {
    #[default]
    Subtree,
    Cumulative,
}

impl AggregationScope {
    fn as_str(&self) -> &'static str {
        match self {
            AggregationScope::Subtree => "subtree",
            AggregationScope::Cumulative => "cumulative",
        }
    }
}

/// The manifest `aggregation` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationParams {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AggregationType>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub scope: AggregationScope,
}

/// Aggregate `tree` according to `params`, returning a new tree.
///
/// Absent params, or params without a `type`, return the tree unchanged.
pub fn aggregate(
    tree: &Node,
    params: Option<&AggregationParams>,
    registry: &ParameterRegistry,
) -> Result<Node> {
    let Some(params) = params else {
        return Ok(tree.clone());
    };

    match params.kind {
        None => Ok(tree.clone()),
        Some(AggregationType::Horizontal) => {
            HorizontalAggregationReserved.log();
            Ok(tree.clone())
        }
        Some(AggregationType::Vertical) => {
            let folder = VerticalFolder::new(params, registry)?;
            let mut copy = tree.clone();
            let mut interior_count = 0;
            folder.fold(&mut copy, ROOT_NODE_PATH, folder.empty(), &mut interior_count)?;

            AggregationCompleted {
                scope: params.scope.as_str(),
                metrics: &params.metrics,
                interior_count,
            }
            .log();

            Ok(copy)
        }
    }
}

#[derive(Debug, Clone, Default)]
struct MetricTotal {
    sum: f64,
    count: usize,
    last: Option<Value>,
}

/// Running totals, one slot per requested metric.
#[derive(Debug, Clone)]
struct Accumulator {
    totals: Vec<MetricTotal>,
}

impl Accumulator {
    fn merge(&mut self, other: &Accumulator) {
        for (total, incoming) in self.totals.iter_mut().zip(&other.totals) {
            total.sum += incoming.sum;
            total.count += incoming.count;
            if incoming.last.is_some() {
                total.last = incoming.last.clone();
            }
        }
    }
}

struct VerticalFolder<'a> {
    metrics: Vec<(&'a str, AggregationMethod)>,
    scope: AggregationScope,
}

impl<'a> VerticalFolder<'a> {
    fn new(params: &'a AggregationParams, registry: &ParameterRegistry) -> Result<Self> {
        if params.metrics.is_empty() {
            return Err(EngineError::InvalidAggregationParams(
                "provided aggregation metrics are empty; please provide a list of metric names"
                    .to_string(),
            ));
        }

        let mut metrics = Vec::with_capacity(params.metrics.len());
        for metric in &params.metrics {
            let method = registry.method_for(metric);
            if method == AggregationMethod::None {
                return Err(EngineError::InvalidAggregationParams(format!(
                    "aggregation is not possible for '{}' since its method is 'none'",
                    metric
                )));
            }
            metrics.push((metric.as_str(), method));
        }

        Ok(Self {
            metrics,
            scope: params.scope,
        })
    }

    fn empty(&self) -> Accumulator {
        Accumulator {
            totals: vec![MetricTotal::default(); self.metrics.len()],
        }
    }

    fn fold(
        &self,
        node: &mut Node,
        path: &str,
        running: Accumulator,
        interior_count: &mut usize,
    ) -> Result<Accumulator> {
        let Some(children) = node.children.as_mut() else {
            return self.fold_leaf(node, path, running);
        };

        let mut total = running;
        for (name, child) in children.iter_mut() {
            let child_path = format!("{}.children.{}", path, name);
            total = match self.scope {
                AggregationScope::Cumulative => self.fold(child, &child_path, total, interior_count)?,
                AggregationScope::Subtree => {
                    let subtotal = self.fold(child, &child_path, self.empty(), interior_count)?;
                    total.merge(&subtotal);
                    total
                }
            };
        }

        node.aggregated = Some(self.snapshot(&total));
        *interior_count += 1;
        Ok(total)
    }

    fn fold_leaf(&self, node: &Node, path: &str, mut running: Accumulator) -> Result<Accumulator> {
        let Some(outputs) = &node.outputs else {
            return Ok(running);
        };

        for (index, record) in outputs.iter().enumerate() {
            for ((metric, method), total) in self.metrics.iter().zip(running.totals.iter_mut()) {
                let value = record.get(*metric).ok_or_else(|| {
                    EngineError::InvalidAggregationParams(format!(
                        "Aggregation metric {} is not found in outputs[{}] of '{}'",
                        metric, index, path
                    ))
                })?;

                if *method == AggregationMethod::Copy {
                    total.last = Some(value.clone());
                    continue;
                }

                let number = numeric_value(value, record)?.ok_or_else(|| {
                    EngineError::InvalidAggregationParams(format!(
                        "Aggregation metric {} in outputs[{}] of '{}' is not numeric",
                        metric, index, path
                    ))
                })?;
                total.sum += number;
                total.count += 1;
            }
        }

        Ok(running)
    }

    fn snapshot(&self, accumulator: &Accumulator) -> Record {
        let mut aggregated = Record::new();
        for ((metric, method), total) in self.metrics.iter().zip(&accumulator.totals) {
            let value = match method {
                AggregationMethod::Sum => number_value(total.sum),
                AggregationMethod::Avg if total.count > 0 => {
                    number_value(total.sum / total.count as f64)
                }
                AggregationMethod::Avg => number_value(0.0),
                AggregationMethod::Copy | AggregationMethod::None => {
                    total.last.clone().unwrap_or(Value::Null)
                }
            };
            aggregated.insert(metric.to_string(), value);
        }
        aggregated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Children;
    use serde_json::json;

    fn leaf(outputs: Vec<Value>) -> Node {
        Node {
            inputs: Some(vec![]),
            outputs: Some(
                outputs
                    .into_iter()
                    .map(|v| v.as_object().cloned().unwrap())
                    .collect(),
            ),
            ..Default::default()
        }
    }

    fn vertical(metrics: &[&str], scope: AggregationScope) -> AggregationParams {
        AggregationParams {
            kind: Some(AggregationType::Vertical),
            metrics: metrics.iter().map(|m| m.to_string()).collect(),
            scope,
        }
    }

    /// root -> { a -> { a1, a2 }, b -> { b1 } }
    fn sample_tree() -> Node {
        let mut a = Children::new();
        a.insert("a1".to_string(), leaf(vec![json!({"carbon": 1, "cpu-util": 10}), json!({"carbon": 2, "cpu-util": 30})]));
        a.insert("a2".to_string(), leaf(vec![json!({"carbon": 3, "cpu-util": 20})]));
        let mut b = Children::new();
        b.insert("b1".to_string(), leaf(vec![json!({"carbon": 10, "cpu-util": 40})]));

        let mut root = Children::new();
        root.insert("a".to_string(), Node::with_children(a));
        root.insert("b".to_string(), Node::with_children(b));
        Node::with_children(root)
    }

    #[test]
    fn test_absent_params_return_tree_unchanged() {
        let registry = ParameterRegistry::with_builtins();
        let tree = sample_tree();

        assert_eq!(aggregate(&tree, None, &registry).unwrap(), tree);

        let untyped = AggregationParams {
            kind: None,
            metrics: vec!["carbon".to_string()],
            scope: AggregationScope::Subtree,
        };
        assert_eq!(aggregate(&tree, Some(&untyped), &registry).unwrap(), tree);
    }

    #[test]
    fn test_horizontal_is_a_no_op() {
        let registry = ParameterRegistry::with_builtins();
        let tree = sample_tree();
        let params = AggregationParams {
            kind: Some(AggregationType::Horizontal),
            metrics: vec!["carbon".to_string()],
            scope: AggregationScope::Subtree,
        };

        assert_eq!(aggregate(&tree, Some(&params), &registry).unwrap(), tree);
    }

    #[test]
    fn test_vertical_subtree_sum_and_avg() {
        let registry = ParameterRegistry::with_builtins();
        let params = vertical(&["carbon", "cpu-util"], AggregationScope::Subtree);

        let result = aggregate(&sample_tree(), Some(&params), &registry).unwrap();

        let a = result.child("a").unwrap().aggregated.as_ref().unwrap();
        assert_eq!(a["carbon"], json!(6));
        assert_eq!(a["cpu-util"], json!(20));

        let b = result.child("b").unwrap().aggregated.as_ref().unwrap();
        assert_eq!(b["carbon"], json!(10));
        assert_eq!(b["cpu-util"], json!(40));

        let root = result.aggregated.as_ref().unwrap();
        assert_eq!(root["carbon"], json!(16));
        assert_eq!(root["cpu-util"], json!(25));

        // leaves are not annotated
        assert!(result.child("a").unwrap().child("a1").unwrap().aggregated.is_none());
    }

    #[test]
    fn test_vertical_cumulative_includes_previous_branches() {
        let registry = ParameterRegistry::with_builtins();
        let params = vertical(&["carbon"], AggregationScope::Cumulative);

        let result = aggregate(&sample_tree(), Some(&params), &registry).unwrap();

        let a = result.child("a").unwrap().aggregated.as_ref().unwrap();
        let b = result.child("b").unwrap().aggregated.as_ref().unwrap();
        assert_eq!(a["carbon"], json!(6));
        // b's snapshot carries a's contribution along
        assert_eq!(b["carbon"], json!(16));
        assert_eq!(result.aggregated.as_ref().unwrap()["carbon"], json!(16));
    }

    #[test]
    fn test_input_tree_is_not_mutated() {
        let registry = ParameterRegistry::with_builtins();
        let tree = sample_tree();
        let params = vertical(&["carbon"], AggregationScope::Subtree);

        aggregate(&tree, Some(&params), &registry).unwrap();

        assert!(tree.aggregated.is_none());
    }

    #[test]
    fn test_missing_metric_names_metric_and_index() {
        let registry = ParameterRegistry::with_builtins();
        let mut children = Children::new();
        children.insert(
            "server".to_string(),
            leaf(vec![json!({"carbon": 1}), json!({"energy": 2})]),
        );
        let tree = Node::with_children(children);
        let params = vertical(&["carbon"], AggregationScope::Subtree);

        let result = aggregate(&tree, Some(&params), &registry);

        match result {
            Err(EngineError::InvalidAggregationParams(message)) => {
                assert!(message.contains("carbon"));
                assert!(message.contains("outputs[1]"));
                assert!(message.contains("tree.children.server"));
            }
            other => panic!("expected aggregation error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_metric_lists() {
        let registry = ParameterRegistry::with_builtins();
        let tree = sample_tree();

        let empty = vertical(&[], AggregationScope::Subtree);
        assert!(matches!(
            aggregate(&tree, Some(&empty), &registry),
            Err(EngineError::InvalidAggregationParams(_))
        ));

        let none_method = vertical(&["timestamp"], AggregationScope::Subtree);
        match aggregate(&tree, Some(&none_method), &registry) {
            Err(EngineError::InvalidAggregationParams(message)) => assert!(message.contains("'none'")),
            other => panic!("expected aggregation error, got {:?}", other),
        }
    }

    #[test]
    fn test_copy_metric_takes_last_value() {
        let registry = ParameterRegistry::with_builtins();
        let mut children = Children::new();
        children.insert("x".to_string(), leaf(vec![json!({"location": "eu"})]));
        children.insert("y".to_string(), leaf(vec![json!({"location": "us"})]));
        let tree = Node::with_children(children);
        let params = vertical(&["location"], AggregationScope::Subtree);

        let result = aggregate(&tree, Some(&params), &registry).unwrap();

        assert_eq!(result.aggregated.as_ref().unwrap()["location"], json!("us"));
    }

    #[test]
    fn test_params_deserialize_from_yaml() {
        let params: AggregationParams =
            serde_yaml::from_str("type: vertical\nmetrics: [carbon]\nscope: cumulative\n").unwrap();

        assert_eq!(params.kind, Some(AggregationType::Vertical));
        assert_eq!(params.scope, AggregationScope::Cumulative);
    }
}
