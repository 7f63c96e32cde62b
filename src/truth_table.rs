use crate::error::{LogicError, Result};
use crate::ground_tree::{Atom, GroundNode, GroundTree};
use crate::predicate::{Invocation, PredicateRegistry};
use indexmap::{IndexMap, IndexSet};
use std::io;
use tracing::{debug, trace};

/// Invocations pinned to true by `assume_predicate`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssumptionCache {
	entries: IndexSet<Invocation>,
}

impl AssumptionCache {
	pub fn new() -> AssumptionCache {
		AssumptionCache::default()
	}

	/// Returns false if the invocation was already present.
	pub fn insert(&mut self, invocation: Invocation) -> bool {
		self.entries.insert(invocation)
	}

	pub fn contains(&self, invocation: &Invocation) -> bool {
		self.entries.contains(invocation)
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn retain<F: FnMut(&Invocation) -> bool>(&mut self, f: F) {
		self.entries.retain(f);
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Invocation> {
		self.entries.iter()
	}
}

/// Values returned by native evaluators, reused until forgotten.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NativeResults {
	results: IndexMap<Invocation, bool>,
}

impl NativeResults {
	pub fn new() -> NativeResults {
		NativeResults::default()
	}

	pub fn get(&self, invocation: &Invocation) -> Option<bool> {
		self.results.get(invocation).copied()
	}

	pub fn insert(&mut self, invocation: Invocation, value: bool) {
		self.results.insert(invocation, value);
	}

	pub fn clear(&mut self) {
		self.results.clear();
	}

	pub fn retain<F: FnMut(&Invocation) -> bool>(&mut self, mut f: F) {
		self.results.retain(|invocation, _| f(invocation));
	}

	pub fn len(&self) -> usize {
		self.results.len()
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty()
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvalOptions {
	pub max_free_atoms: usize,
	// bound used instead of max_free_atoms when every row is kept
	pub max_table_atoms: usize,
	// visit every row and record it
	pub record_table: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TruthTable {
	// free atom labels in first-appearance order
	pub columns: Vec<String>,
	pub result_label: String,
	// atom values per row, then the sentence value
	pub rows: Vec<(Vec<bool>, bool)>,
}

impl TruthTable {
	pub fn write_to<W: io::Write>(
		&self,
		out: &mut W,
		separator: &str,
		labels: (&str, &str),
	) -> io::Result<()> {
		let mut header: Vec<&str> = self.columns.iter().map(String::as_str).collect();
		header.push(&self.result_label);
		writeln!(out, "{}", header.join(separator))?;
		let label = |b: bool| if b { labels.0 } else { labels.1 };
		for (values, result) in &self.rows {
			let mut fields: Vec<&str> = values.iter().map(|b| label(*b)).collect();
			fields.push(label(*result));
			writeln!(out, "{}", fields.join(separator))?;
		}
		Ok(())
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
	pub valid: bool,
	// number of enumerated atoms
	pub free_atoms: usize,
	pub rows_checked: u64,
	pub table: Option<TruthTable>,
}

/// Decide whether `tree` holds under every assignment to its free atoms.
///
/// Native predicates are computed once (or taken from `natives`) and assumed
/// invocations are fixed to true before enumeration. Row `r` gives atom `i`
/// the value true iff bit `k - 1 - i` of `r` is clear, so the first row is
/// all-true and atom 0 is the most significant.
pub fn evaluate(
	tree: &GroundTree,
	registry: &PredicateRegistry,
	cache: &AssumptionCache,
	natives: &mut NativeResults,
	result_label: &str,
	options: EvalOptions,
) -> Result<Evaluation> {
	let (tree, columns) = resolve_fixed_atoms(tree, registry, cache, natives)?;
	let k = columns.len();
	let limit = if options.record_table {
		options.max_table_atoms
	} else {
		options.max_free_atoms
	};
	// row indices are u64
	let limit = limit.min(63);
	debug!(
		atoms = tree.atoms().len(),
		free = k,
		nodes = tree.nodes.len(),
		"enumerating truth table"
	);
	if k > limit {
		return Err(LogicError::TooManyAtoms { count: k, limit });
	}

	let row_count: u64 = 1u64 << k;
	let mut valid = true;
	let mut rows_checked = 0;
	let mut rows = Vec::new();
	let mut values = vec![false; k];
	for r in 0..row_count {
		for (i, value) in values.iter_mut().enumerate() {
			*value = (r >> (k - 1 - i)) & 1 == 0;
		}
		let result = tree.eval(&values);
		rows_checked += 1;
		if options.record_table {
			rows.push((values.clone(), result));
		}
		if !result {
			trace!(row = r, "counterexample");
			valid = false;
			if !options.record_table {
				break;
			}
		}
	}
	debug!(valid, rows_checked, "evaluation finished");

	Ok(Evaluation {
		valid,
		free_atoms: k,
		rows_checked,
		table: if options.record_table {
			Some(TruthTable {
				columns,
				result_label: result_label.to_owned(),
				rows,
			})
		} else {
			None
		},
	})
}

// Rebuild the tree with native and assumed atoms replaced by constants and the
// remaining free atoms renumbered densely.
fn resolve_fixed_atoms(
	tree: &GroundTree,
	registry: &PredicateRegistry,
	cache: &AssumptionCache,
	natives: &mut NativeResults,
) -> Result<(GroundTree, Vec<String>)> {
	enum Resolved {
		Fixed(bool),
		Free(usize),
	}

	let mut reduced = GroundTree::new();
	let mut resolved = Vec::with_capacity(tree.atoms().len());
	let mut columns = Vec::new();
	for atom in tree.atoms() {
		let fixed = match atom {
			Atom::Prop(_) => None,
			Atom::Predicate(invocation) => match registry.get(&invocation.name) {
				Some(definition) if definition.is_native() => match natives.get(invocation) {
					Some(b) => Some(b),
					None => {
						let value = definition.evaluate(&invocation.args)?;
						if let Some(b) = value {
							natives.insert(invocation.clone(), b);
						}
						value
					}
				},
				_ if cache.contains(invocation) => Some(true),
				_ => None,
			},
		};
		resolved.push(match fixed {
			Some(b) => Resolved::Fixed(b),
			None => {
				columns.push(atom.to_string());
				Resolved::Free(reduced.alloc_atom(atom.clone()))
			}
		});
	}

	for node in &tree.nodes {
		reduced.push_node(match *node {
			GroundNode::Atom(aid) => match resolved[aid] {
				Resolved::Fixed(b) => GroundNode::Const(b),
				Resolved::Free(new_aid) => GroundNode::Atom(new_aid),
			},
			other => other,
		});
	}
	Ok((reduced, columns))
}
