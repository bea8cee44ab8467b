// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;

use super::BUILTIN_PARAMETERS;
use crate::observability::messages::parameters::UnknownParameterDefaulted;
use crate::observability::messages::StructuredLog;

/// How values of a field combine across time and across the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    Sum,
    Avg,
    None,
    Copy,
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregationMethod::Sum => "sum",
            AggregationMethod::Avg => "avg",
            AggregationMethod::None => "none",
            AggregationMethod::Copy => "copy",
        };
        f.write_str(name)
    }
}

/// Metadata describing one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterDescriptor {
    pub aggregation_method: AggregationMethod,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl ParameterDescriptor {
    pub fn new(aggregation_method: AggregationMethod) -> Self {
        Self {
            aggregation_method,
            unit: String::new(),
            description: String::new(),
        }
    }
}

/// Read-mostly lookup from field name to [`ParameterDescriptor`].
///
/// Unknown fields resolve to [`AggregationMethod::Sum`]. The first lookup of
/// each unknown field logs a warning; the duplicate-suppression set belongs to
/// this instance, so two registries warn independently.
#[derive(Debug, Default)]
pub struct ParameterRegistry {
    descriptors: HashMap<String, ParameterDescriptor>,
    warned: Mutex<HashSet<String>>,
}

impl ParameterRegistry {
    /// Empty registry; every field is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with [`BUILTIN_PARAMETERS`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, method, unit, description) in BUILTIN_PARAMETERS {
            registry.register(
                *name,
                ParameterDescriptor {
                    aggregation_method: *method,
                    unit: unit.to_string(),
                    description: description.to_string(),
                },
            );
        }
        registry
    }

    /// Add or replace a descriptor.
    pub fn register(&mut self, name: impl Into<String>, descriptor: ParameterDescriptor) {
        self.descriptors.insert(name.into(), descriptor);
    }

    pub fn extend<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = (String, ParameterDescriptor)>,
    {
        self.descriptors.extend(descriptors);
    }

    /// Aggregation method for `field`, defaulting to `sum`.
    pub fn method_for(&self, field: &str) -> AggregationMethod {
        match self.descriptors.get(field) {
            Some(descriptor) => descriptor.aggregation_method,
            None => {
                if self.mark_warned(field) {
                    UnknownParameterDefaulted { field }.log();
                }
                AggregationMethod::Sum
            }
        }
    }

    /// Unknown fields looked up so far, sorted.
    pub fn unknown_fields(&self) -> Vec<String> {
        let warned = self.warned.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut fields: Vec<String> = warned.iter().cloned().collect();
        fields.sort();
        fields
    }

    /// Returns true the first time `field` is seen.
    fn mark_warned(&self, field: &str) -> bool {
        let mut warned = self.warned.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        warned.insert(field.to_string())
    }
}
