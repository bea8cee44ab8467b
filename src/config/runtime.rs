// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::builtins::BuiltinPluginFactory;
use crate::config::{Manifest, StageMap};
use crate::engine::{aggregate, ComputeContext, PhaseFilter, PipelineExecutor};
use crate::errors::Result;
use crate::model::Node;
use crate::parameters::ParameterRegistry;

/// Runtime builder - turns a manifest into a ready-to-run [`Runtime`].
///
/// The parameter registry is assembled first, in increasing precedence:
/// built-in parameters, plugin `parameter-metadata`, manifest `parameters`.
/// Plugins are then instantiated against the finished registry.
///
/// # Examples
///
/// ```
/// use impact_engine::config::{parse_manifest, RuntimeBuilder};
///
/// let manifest = parse_manifest(r#"
/// name: demo
/// initialize:
///   plugins:
///     double:
///       method: Coefficient
///       config: {input-parameter: energy, coefficient: 2, output-parameter: doubled}
/// tree: {}
/// "#).unwrap();
///
/// let runtime = RuntimeBuilder::from_manifest(&manifest).unwrap();
/// assert!(runtime.executor.stages().contains_key("double"));
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    pub fn from_manifest(manifest: &Manifest) -> Result<Runtime> {
        let registry = Arc::new(Self::build_registry(manifest));
        let stages = Self::build_stages(manifest, &registry)?;

        let mut executor = PipelineExecutor::new(stages);
        if let Some(timeout) = manifest.executor_options.stage_timeout() {
            executor = executor.with_stage_timeout(timeout);
        }

        Ok(Runtime { executor, registry })
    }

    fn build_registry(manifest: &Manifest) -> ParameterRegistry {
        let mut registry = ParameterRegistry::with_builtins();

        for spec in manifest.initialize.plugins.values() {
            if let Some(metadata) = &spec.parameter_metadata {
                registry.extend(metadata.inputs.clone());
                registry.extend(metadata.outputs.clone());
            }
        }

        registry.extend(manifest.parameters.clone());
        registry
    }

    fn build_stages(manifest: &Manifest, registry: &Arc<ParameterRegistry>) -> Result<StageMap> {
        let mut stages = StageMap::new();
        for (id, spec) in &manifest.initialize.plugins {
            let plugin = BuiltinPluginFactory::create_plugin(id, spec, Arc::clone(registry))?;
            stages.insert(id.clone(), plugin);
        }
        Ok(stages)
    }
}

/// Executor plus the parameter registry shared by its plugins.
pub struct Runtime {
    pub executor: PipelineExecutor,
    pub registry: Arc<ParameterRegistry>,
}

impl Runtime {
    /// Compute the manifest tree, then apply the manifest's aggregation.
    pub async fn run(&self, manifest: &Manifest, phases: PhaseFilter) -> Result<Node> {
        let context = ComputeContext {
            phases,
            ..Default::default()
        };
        let computed = self.executor.compute(&manifest.tree, &context).await?;
        aggregate(&computed, manifest.aggregation.as_ref(), &self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_manifest;
    use crate::errors::EngineError;
    use crate::parameters::AggregationMethod;
    use std::time::Duration;

    #[test]
    fn test_registry_precedence() {
        let manifest = parse_manifest(
            r#"
name: precedence
initialize:
  plugins:
    sum-energy:
      method: Sum
      config: {input-parameters: [a], output-parameter: carbon}
      parameter-metadata:
        outputs:
          carbon: {aggregation-method: avg}
          custom: {aggregation-method: copy}
parameters:
  custom: {aggregation-method: none}
tree: {}
"#,
        )
        .unwrap();

        let runtime = RuntimeBuilder::from_manifest(&manifest).unwrap();

        // plugin metadata overrides the built-in table
        assert_eq!(runtime.registry.method_for("carbon"), AggregationMethod::Avg);
        // manifest parameters override plugin metadata
        assert_eq!(runtime.registry.method_for("custom"), AggregationMethod::None);
        // untouched built-ins survive
        assert_eq!(runtime.registry.method_for("cpu-util"), AggregationMethod::Avg);
    }

    #[test]
    fn test_unknown_method_is_module_initialization_error() {
        let manifest = parse_manifest(
            r#"
name: broken
initialize:
  plugins:
    teads:
      method: TeadsCurve
tree: {}
"#,
        )
        .unwrap();

        let result = RuntimeBuilder::from_manifest(&manifest);

        match result {
            Err(EngineError::ModuleInitialization { stage, reason }) => {
                assert_eq!(stage, "teads");
                assert!(reason.contains("TeadsCurve"));
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected module initialization error"),
        }
    }

    #[test]
    fn test_stage_timeout_applied() {
        let manifest = parse_manifest(
            "name: t\nexecutor-options:\n  stage-timeout-seconds: 3\ntree: {}\n",
        )
        .unwrap();

        let runtime = RuntimeBuilder::from_manifest(&manifest).unwrap();

        assert_eq!(runtime.executor.stage_timeout(), Some(Duration::from_secs(3)));
    }
}
