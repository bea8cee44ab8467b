// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! YAML export of a computed manifest.
//!
//! The exported document is the input manifest with its `tree` replaced by
//! the computed tree, so it can be fed back in as a manifest.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::config::Manifest;
use crate::errors::{EngineError, Result};
use crate::model::Node;

/// Serialize `manifest` with `tree` as its computed tree.
pub fn export_yaml(manifest: &Manifest, tree: &Node) -> Result<String> {
    let exported = Manifest {
        tree: tree.clone(),
        ..manifest.clone()
    };
    serde_yaml::to_string(&exported).map_err(|e| EngineError::Export(e.to_string()))
}

/// Write the exported manifest to `output`, or to stdout when `None`.
pub fn write_yaml(manifest: &Manifest, tree: &Node, output: Option<&Path>) -> Result<()> {
    let yaml = export_yaml(manifest, tree)?;
    match output {
        Some(path) => fs::write(path, yaml)
            .map_err(|e| EngineError::Export(format!("{}: {}", path.display(), e))),
        None => io::stdout()
            .lock()
            .write_all(yaml.as_bytes())
            .map_err(|e| EngineError::Export(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_manifest;
    use serde_json::json;

    const MANIFEST: &str = r#"
name: export
description: exported run
initialize:
  plugins:
    double:
      method: Coefficient
      config: {input-parameter: energy, coefficient: 2, output-parameter: carbon}
tree:
  children:
    server:
      inputs: [{energy: 1}]
"#;

    #[test]
    fn test_export_replaces_tree_and_keeps_header() {
        let manifest = parse_manifest(MANIFEST).unwrap();
        let mut computed = manifest.tree.clone();
        if let Some(children) = computed.children.as_mut() {
            children["server"].outputs = Some(vec![json!({"energy": 1, "carbon": 2})
                .as_object()
                .cloned()
                .unwrap()]);
        }

        let yaml = export_yaml(&manifest, &computed).unwrap();
        let reparsed = parse_manifest(&yaml).unwrap();

        assert_eq!(reparsed.name, "export");
        assert_eq!(reparsed.description.as_deref(), Some("exported run"));
        assert!(reparsed.initialize.plugins.contains_key("double"));
        assert_eq!(reparsed.tree, computed);
    }

    #[test]
    fn test_write_yaml_to_file() {
        let manifest = parse_manifest(MANIFEST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");

        write_yaml(&manifest, &manifest.tree, Some(&path)).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("name: export"));
    }

    #[test]
    fn test_write_yaml_to_missing_directory_fails() {
        let manifest = parse_manifest(MANIFEST).unwrap();
        let path = Path::new("/definitely/not/a/dir/out.yaml");

        let result = write_yaml(&manifest, &manifest.tree, Some(path));

        assert!(matches!(result, Err(EngineError::Export(message)) if message.contains("out.yaml")));
    }
}
