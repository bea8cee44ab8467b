// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use tracing::Instrument;

use crate::config::consts::ROOT_NODE_PATH;
use crate::config::StageMap;
use crate::engine::regroup::regroup;
use crate::errors::{EngineError, Result};
use crate::model::{merge_defaults, Node, NodeConfig, Phase, PhasedPipeline, Record};
use crate::observability::messages::engine::{
    ComputeCompleted, ComputeFailed, ComputeStarted, NodeSkipped, RegroupApplied, StageCompleted,
    StageFailed, StageStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::PluginKind;

type NodeFuture<'a> = Pin<Box<dyn Future<Output = Result<usize>> + Send + 'a>>;

/// Which pipeline phases a compute run may execute.
///
/// A filter with every flag cleared permits every phase, matching a CLI
/// invocation without any phase switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseFilter {
    pub observe: bool,
    pub regroup: bool,
    pub compute: bool,
}

impl PhaseFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(phase: Phase) -> Self {
        let mut filter = Self::default();
        match phase {
            Phase::Observe => filter.observe = true,
            Phase::Regroup => filter.regroup = true,
            Phase::Compute => filter.compute = true,
        }
        filter
    }

    pub fn allows(&self, phase: Phase) -> bool {
        if !self.observe && !self.regroup && !self.compute {
            return true;
        }
        match phase {
            Phase::Observe => self.observe,
            Phase::Regroup => self.regroup,
            Phase::Compute => self.compute,
        }
    }

    /// Comma-separated permitted phases, for logging.
    pub fn describe(&self) -> String {
        [Phase::Observe, Phase::Regroup, Phase::Compute]
            .into_iter()
            .filter(|phase| self.allows(*phase))
            .map(|phase| phase.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Top-level fallbacks and phase switches for a compute run.
///
/// `pipeline`, `config` and `defaults` are what the root inherits when it
/// does not declare its own.
#[derive(Debug, Clone, Default)]
pub struct ComputeContext {
    pub pipeline: Option<PhasedPipeline>,
    pub config: Option<NodeConfig>,
    pub defaults: Option<Record>,
    pub phases: PhaseFilter,
}

/// Effective settings resolved for one node.
#[derive(Debug, Clone, Default)]
struct Inherited {
    pipeline: Option<PhasedPipeline>,
    config: Option<NodeConfig>,
    defaults: Option<Record>,
}

impl Inherited {
    /// A node's own value replaces the inherited one wholesale.
    fn resolve(&self, node: &Node) -> Self {
        Self {
            pipeline: node.pipeline.clone().or_else(|| self.pipeline.clone()),
            config: node.config.clone().or_else(|| self.config.clone()),
            defaults: node.defaults.clone().or_else(|| self.defaults.clone()),
        }
    }
}

/// Recursive manifest tree executor.
///
/// The executor walks the tree depth-first. Interior nodes only pass their
/// resolved settings down; leaves run `observe`, `regroup` and `compute` in
/// that order. Stages run one at a time and the first failure aborts the run.
pub struct PipelineExecutor {
    stages: StageMap,
    stage_timeout: Option<Duration>,
}

impl PipelineExecutor {
    pub fn new(stages: StageMap) -> Self {
        Self {
            stages,
            stage_timeout: None,
        }
    }

    /// Bound every stage invocation; an overrun fails the run.
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = Some(timeout);
        self
    }

    pub fn stages(&self) -> &StageMap {
        &self.stages
    }

    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout
    }

    /// Compute `tree`, returning a new tree. The caller's tree is never touched.
    pub async fn compute(&self, tree: &Node, context: &ComputeContext) -> Result<Node> {
        let phases = context.phases.describe();
        let started = ComputeStarted {
            phases: &phases,
            stage_count: self.stages.len(),
        };
        started.log();
        let span = started.span("compute");

        let root = Inherited {
            pipeline: context.pipeline.clone(),
            config: context.config.clone(),
            defaults: context.defaults.clone(),
        };

        let start = Instant::now();
        let result = async {
            self.validate(tree, ROOT_NODE_PATH, &root, context.phases)?;

            let mut copy = tree.clone();
            let leaf_count = self
                .compute_node(&mut copy, ROOT_NODE_PATH.to_string(), root, context.phases)
                .await?;
            Ok::<_, EngineError>((copy, leaf_count))
        }
        .instrument(span)
        .await;

        match result {
            Ok((computed, leaf_count)) => {
                ComputeCompleted {
                    leaf_count,
                    duration: start.elapsed(),
                }
                .log();
                Ok(computed)
            }
            Err(error) => {
                ComputeFailed { error: &error }.log();
                Err(error)
            }
        }
    }

    /// Every stage a permitted phase will run must be registered.
    fn validate(&self, node: &Node, path: &str, inherited: &Inherited, phases: PhaseFilter) -> Result<()> {
        let resolved = inherited.resolve(node);

        if let Some(children) = &node.children {
            for (name, child) in children {
                self.validate(child, &format!("{}.children.{}", path, name), &resolved, phases)?;
            }
            return Ok(());
        }

        if let Some(pipeline) = &resolved.pipeline {
            for phase in [Phase::Observe, Phase::Compute] {
                if !phases.allows(phase) {
                    continue;
                }
                for id in pipeline.stage_ids(phase) {
                    if !self.stages.contains_key(id) {
                        return Err(EngineError::UnknownStage {
                            stage: id.clone(),
                            node: path.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn compute_node<'a>(
        &'a self,
        node: &'a mut Node,
        path: String,
        inherited: Inherited,
        phases: PhaseFilter,
    ) -> NodeFuture<'a> {
        Box::pin(async move {
            let resolved = inherited.resolve(node);

            if let Some(children) = node.children.as_mut() {
                let mut leaf_count = 0;
                for (name, child) in children.iter_mut() {
                    let child_path = format!("{}.children.{}", path, name);
                    leaf_count += self
                        .compute_node(child, child_path, resolved.clone(), phases)
                        .await?;
                }
                return Ok(leaf_count);
            }

            let mut records = match (&node.inputs, &resolved.defaults) {
                (Some(inputs), Some(defaults)) => inputs
                    .iter()
                    .map(|record| merge_defaults(defaults, record))
                    .collect::<Vec<_>>(),
                (Some(inputs), None) => inputs.clone(),
                (None, Some(defaults)) => vec![defaults.clone()],
                (None, None) => {
                    NodeSkipped { node: &path }.log();
                    return Ok(0);
                }
            };

            let pipeline = resolved.pipeline.clone().unwrap_or_default();
            let config = resolved.config.as_ref();

            if let Some(observe) = pipeline.observe.as_ref().filter(|_| phases.allows(Phase::Observe)) {
                records = self.run_phase(observe, records, config, &path).await?;
                node.inputs = Some(records.clone());
            }

            if let Some(groups) = pipeline.regroup.as_ref().filter(|_| phases.allows(Phase::Regroup)) {
                let children = regroup(&records, groups)?;
                RegroupApplied {
                    node: &path,
                    groups,
                    child_count: children.len(),
                }
                .log();

                node.inputs = None;
                node.outputs = None;
                node.children = Some(children);

                let remaining = Inherited {
                    pipeline: Some(pipeline.after_regroup()),
                    ..resolved
                };
                // re-enter as an interior node so the new children are computed
                let mut leaf_count = 0;
                if let Some(children) = node.children.as_mut() {
                    for (name, child) in children.iter_mut() {
                        let child_path = format!("{}.children.{}", path, name);
                        leaf_count += self
                            .compute_node(child, child_path, remaining.clone(), phases)
                            .await?;
                    }
                }
                return Ok(leaf_count);
            }

            if let Some(compute) = pipeline.compute.as_ref().filter(|_| phases.allows(Phase::Compute)) {
                records = self.run_phase(compute, records, config, &path).await?;
                node.outputs = Some(records);
            }

            Ok(1)
        })
    }

    /// Run `stage_ids` in order, feeding each output into the next stage.
    async fn run_phase(
        &self,
        stage_ids: &[String],
        mut records: Vec<Record>,
        config: Option<&NodeConfig>,
        path: &str,
    ) -> Result<Vec<Record>> {
        for id in stage_ids {
            let plugin = self.stages.get(id).ok_or_else(|| EngineError::UnknownStage {
                stage: id.clone(),
                node: path.to_string(),
            })?;
            let stage_config = config.and_then(|config| config.get(id));

            StageStarted {
                stage: id,
                node: path,
                record_count: records.len(),
            }
            .log();
            let start = Instant::now();

            let invocation = match plugin.metadata().kind {
                PluginKind::Execute => plugin.execute(&records, stage_config),
            };
            let result = match self.stage_timeout {
                Some(limit) => match tokio::time::timeout(limit, invocation).await {
                    Ok(result) => result,
                    Err(_) => Err(EngineError::StageTimeout {
                        stage: id.clone(),
                        node: path.to_string(),
                        seconds: limit.as_secs(),
                    }),
                },
                None => invocation.await,
            };

            match result {
                Ok(output) => {
                    StageCompleted {
                        stage: id,
                        node: path,
                        output_count: output.len(),
                        duration: start.elapsed(),
                    }
                    .log();
                    records = output;
                }
                Err(error) => {
                    StageFailed {
                        stage: id,
                        node: path,
                        error: &error,
                    }
                    .log();
                    return Err(error);
                }
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_filter_defaults_to_all() {
        let filter = PhaseFilter::default();

        assert!(filter.allows(Phase::Observe));
        assert!(filter.allows(Phase::Regroup));
        assert!(filter.allows(Phase::Compute));
        assert_eq!(filter.describe(), "observe,regroup,compute");
    }

    #[test]
    fn test_phase_filter_only() {
        let filter = PhaseFilter::only(Phase::Regroup);

        assert!(!filter.allows(Phase::Observe));
        assert!(filter.allows(Phase::Regroup));
        assert!(!filter.allows(Phase::Compute));
        assert_eq!(filter.describe(), "regroup");
    }

    #[test]
    fn test_inherited_resolution_is_wholesale() {
        let mut parent_defaults = Record::new();
        parent_defaults.insert("a".to_string(), 1.into());
        parent_defaults.insert("b".to_string(), 2.into());
        let inherited = Inherited {
            defaults: Some(parent_defaults),
            ..Default::default()
        };

        let mut own = Record::new();
        own.insert("a".to_string(), 10.into());
        let node = Node {
            defaults: Some(own.clone()),
            ..Default::default()
        };

        let resolved = inherited.resolve(&node);

        // no key-level merge with the ancestor's defaults
        assert_eq!(resolved.defaults, Some(own));
    }
}
