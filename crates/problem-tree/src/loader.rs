// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Loading problems from JSON.
//!
//! A problem file looks like:
//!
//! ```json
//! {
//!   "name": "two-layer",
//!   "tree": {
//!     "kind": "series",
//!     "tensor_movement": { "movements": [
//!       { "shape": { "dims": [{"size": 12, "degree": 1}], "dtype": "f32" },
//!         "src_paths": [""], "dst_paths": [""] }
//!     ]},
//!     "left":  { "kind": "leaf", "op_attrs": { "op_type": "input" } },
//!     "right": { "kind": "leaf", "op_attrs": { "op_type": "relu" } }
//!   }
//! }
//! ```

use crate::problem::Validated;
use crate::{MappingProblem, ProblemTree, ProblemTreeError};
use std::path::Path;

#[derive(serde::Serialize, serde::Deserialize)]
struct ProblemFile {
    #[serde(default = "default_name")]
    name: String,
    tree: ProblemTree,
}

fn default_name() -> String {
    "unnamed".to_string()
}

/// Loads problem trees from disk into a validated [`MappingProblem`].
///
/// # Example
/// ```no_run
/// use problem_tree::ProblemLoader;
/// use std::path::Path;
///
/// let problem = ProblemLoader::load(Path::new("problem.json")).unwrap();
/// println!("{}", problem.summary());
/// ```
pub struct ProblemLoader;

impl ProblemLoader {
    /// Reads, parses and validates a problem file.
    pub fn load(path: &Path) -> Result<MappingProblem<Validated>, ProblemTreeError> {
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "read problem file");
        Self::from_json(&contents)
    }

    /// Parses and validates a problem from a JSON string.
    pub fn from_json(json: &str) -> Result<MappingProblem<Validated>, ProblemTreeError> {
        let file: ProblemFile = serde_json::from_str(json)?;
        MappingProblem::new(file.name, file.tree).validate()
    }

    /// Serialises a problem back to pretty-printed JSON.
    pub fn to_json<S: crate::problem::ProblemState>(
        problem: &MappingProblem<S>,
    ) -> Result<String, ProblemTreeError> {
        let file = ProblemFile {
            name: problem.name.clone(),
            tree: problem.tree().clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinaryTreePath, OperatorType};

    const TWO_LAYER: &str = r#"{
        "name": "two-layer",
        "tree": {
            "kind": "series",
            "tensor_movement": { "movements": [
                { "shape": { "dims": [{"size": 12, "degree": 1}], "dtype": "f32" },
                  "src_paths": [""], "dst_paths": [""] }
            ]},
            "left":  { "kind": "leaf", "op_attrs": { "op_type": "input" } },
            "right": { "kind": "leaf", "op_attrs": { "op_type": "relu" } }
        }
    }"#;

    #[test]
    fn test_from_json() {
        let problem = ProblemLoader::from_json(TWO_LAYER).unwrap();
        assert_eq!(problem.name, "two-layer");
        assert_eq!(problem.num_leaves(), 2);
        let right = problem.tree().leaf_at_path(&BinaryTreePath::right()).unwrap();
        assert_eq!(right.op_attrs.op_type, OperatorType::Relu);
    }

    #[test]
    fn test_from_json_rejects_dangling_path() {
        let bad = TWO_LAYER.replace(r#""src_paths": [""]"#, r#""src_paths": ["L"]"#);
        assert!(matches!(
            ProblemLoader::from_json(&bad),
            Err(ProblemTreeError::InvalidTree(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            ProblemLoader::from_json("{ not json"),
            Err(ProblemTreeError::Parse(_))
        ));
    }

    #[test]
    fn test_to_json_reloads() {
        let problem = ProblemLoader::from_json(TWO_LAYER).unwrap();
        let json = ProblemLoader::to_json(&problem).unwrap();
        let again = ProblemLoader::from_json(&json).unwrap();
        assert_eq!(again.tree(), problem.tree());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ProblemLoader::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ProblemTreeError::Io(_)));
    }
}
