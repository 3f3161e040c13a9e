//! Flow typing configuration
//!
//! Configuration is plain JSON:
//!
//! ```json
//! {
//!   "hints": [{ "name": "input", "type": "string" }],
//!   "default_type": "number",
//!   "max_passes": 64
//! }
//! ```
//!
//! Every field is optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use yolol_ast::Type;

/// Known type of a variable the program reads but never writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeHint {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl TypeHint {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowTypingConfig {
    /// Applied in order before inference; names must be distinct
    pub hints: Vec<TypeHint>,
    /// Type given to internal variables that are read but never written
    pub default_type: Type,
    /// Most passes a run may make. A run that needs more fails with
    /// `PassLimitExceeded`, and `Some(0)` fails before the first pass.
    /// `None` runs to the fixed point.
    pub max_passes: Option<usize>,
}

impl Default for FlowTypingConfig {
    fn default() -> Self {
        Self {
            hints: Vec::new(),
            default_type: Type::NUMBER,
            max_passes: None,
        }
    }
}

impl FlowTypingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid flow typing configuration")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("in {}", path.display()))
    }
}
