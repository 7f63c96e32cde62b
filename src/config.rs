//! Engine settings, loadable from a TOML file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Refuse to enumerate more free atoms than this (2^n rows).
	pub max_free_atoms: usize,

	/// Refuse to record a truth table with more free atoms than this, since
	/// every row is kept in memory.
	pub max_table_atoms: usize,

	/// Maximum nesting of braces, `not` and quantifiers in one sentence.
	pub max_nesting_depth: usize,

	/// Reject predicates that were never registered instead of treating
	/// their invocations as free atoms.
	pub strict_predicates: bool,

	/// Cell text for true values in printed truth tables.
	pub true_label: String,

	/// Cell text for false values in printed truth tables.
	pub false_label: String,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			max_free_atoms: 26,
			max_table_atoms: 20,
			max_nesting_depth: crate::prop_tree::DEFAULT_MAX_DEPTH,
			strict_predicates: false,
			true_label: "T".to_owned(),
			false_label: "F".to_owned(),
		}
	}
}

impl EngineConfig {
	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::from_toml(&content)
			.with_context(|| format!("Failed to parse config file: {}", path.display()))
	}

	pub fn from_toml(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}
}
