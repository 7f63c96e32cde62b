//! Quantifier-free expressions over interned atoms.
//!
//! Grounding expands `exists`/`all` over the domain. Nodes live in an arena
//! and always refer to earlier nodes, so the root is the last node and a
//! single forward pass evaluates the tree.

use crate::error::{LogicError, Result};
use crate::predicate::{Invocation, PredicateRegistry};
use crate::prop_tree::{Arg, Expr};
use crate::term::{Domain, Term};
use indexmap::IndexSet;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Atom {
	Prop(String),
	Predicate(Invocation),
}

impl fmt::Display for Atom {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Atom::Prop(name) => write!(f, "{}", name),
			Atom::Predicate(invocation) => write!(f, "{}", invocation),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundNode {
	Const(bool),
	// index into the atom table
	Atom(usize),
	Not(usize),
	And(usize, usize),
	Or(usize, usize),
	Implies(usize, usize),
}

#[derive(Clone, Debug, Default)]
pub struct GroundTree {
	pub nodes: Vec<GroundNode>,
	atoms: IndexSet<Atom>,
}

impl GroundTree {
	pub fn new() -> GroundTree {
		GroundTree::default()
	}

	pub fn push_node(&mut self, node: GroundNode) -> usize {
		let id = self.nodes.len();
		self.nodes.push(node);
		id
	}

	/// Identical atoms share one id, assigned in order of first appearance.
	pub fn alloc_atom(&mut self, atom: Atom) -> usize {
		self.atoms.insert_full(atom).0
	}

	pub fn atoms(&self) -> &IndexSet<Atom> {
		&self.atoms
	}

	pub fn root(&self) -> Option<usize> {
		self.nodes.len().checked_sub(1)
	}

	/// Evaluate every node once under the given atom values.
	pub fn eval(&self, atom_values: &[bool]) -> bool {
		let mut values: Vec<bool> = Vec::with_capacity(self.nodes.len());
		for node in &self.nodes {
			let value = match *node {
				GroundNode::Const(b) => b,
				GroundNode::Atom(aid) => atom_values[aid],
				GroundNode::Not(a) => !values[a],
				GroundNode::And(a, b) => values[a] && values[b],
				GroundNode::Or(a, b) => values[a] || values[b],
				GroundNode::Implies(a, b) => !values[a] || values[b],
			};
			values.push(value);
		}
		values.last().copied().unwrap_or(true)
	}

	fn to_string_recurse(&self, id: usize) -> String {
		match self.nodes[id] {
			GroundNode::Const(b) => b.to_string(),
			GroundNode::Atom(aid) => format!("[{}]", self.atoms[aid]),
			GroundNode::Not(a) => format!("not {}", self.to_string_recurse(a)),
			GroundNode::And(a, b) => format!(
				"{{{} and {}}}",
				self.to_string_recurse(a),
				self.to_string_recurse(b)
			),
			GroundNode::Or(a, b) => format!(
				"{{{} or {}}}",
				self.to_string_recurse(a),
				self.to_string_recurse(b)
			),
			GroundNode::Implies(a, b) => format!(
				"{{{} implies {}}}",
				self.to_string_recurse(a),
				self.to_string_recurse(b)
			),
		}
	}
}

impl fmt::Display for GroundTree {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.root() {
			Some(root) => write!(f, "{}", self.to_string_recurse(root)),
			None => Ok(()),
		}
	}
}

/// Expand quantifiers over `domain` and resolve every predicate argument to
/// a domain term.
pub fn ground(
	expr: &Expr,
	domain: &Domain,
	registry: &PredicateRegistry,
	strict: bool,
) -> Result<GroundTree> {
	let mut grounder = Grounder {
		domain,
		registry,
		strict,
		bindings: Vec::new(),
		arities: HashMap::new(),
		tree: GroundTree::new(),
	};
	grounder.ground_recurse(expr)?;
	Ok(grounder.tree)
}

struct Grounder<'a> {
	domain: &'a Domain,
	registry: &'a PredicateRegistry,
	strict: bool,
	// innermost binding last, so shadowing resolves by searching from the end
	bindings: Vec<(&'a str, Term)>,
	// arity of undeclared predicates, fixed by first use
	arities: HashMap<String, usize>,
	tree: GroundTree,
}

impl<'a> Grounder<'a> {
	fn ground_recurse(&mut self, expr: &'a Expr) -> Result<usize> {
		match expr {
			Expr::PropAtom(name) => {
				let aid = self.tree.alloc_atom(Atom::Prop(name.clone()));
				Ok(self.tree.push_node(GroundNode::Atom(aid)))
			}
			Expr::PredicateAtom(name, args) => {
				let invocation = self.invocation(name, args)?;
				let aid = self.tree.alloc_atom(Atom::Predicate(invocation));
				Ok(self.tree.push_node(GroundNode::Atom(aid)))
			}
			Expr::Not(a) => {
				let a1 = self.ground_recurse(a)?;
				Ok(self.tree.push_node(GroundNode::Not(a1)))
			}
			Expr::And(a, b) => {
				let a1 = self.ground_recurse(a)?;
				let b1 = self.ground_recurse(b)?;
				Ok(self.tree.push_node(GroundNode::And(a1, b1)))
			}
			Expr::Or(a, b) => {
				let a1 = self.ground_recurse(a)?;
				let b1 = self.ground_recurse(b)?;
				Ok(self.tree.push_node(GroundNode::Or(a1, b1)))
			}
			Expr::Implies(a, b) => {
				let a1 = self.ground_recurse(a)?;
				let b1 = self.ground_recurse(b)?;
				Ok(self.tree.push_node(GroundNode::Implies(a1, b1)))
			}
			Expr::Exists(var, body) => self.quantify(var, body, false),
			Expr::ForAll(var, body) => self.quantify(var, body, true),
		}
	}

	// `all` folds instances with `and` and is vacuously true; `exists` folds
	// with `or` and is false over an empty domain.
	fn quantify(&mut self, var: &'a str, body: &'a Expr, universal: bool) -> Result<usize> {
		let domain = self.domain;
		let mut acc: Option<usize> = None;
		for term in domain.iter() {
			self.bindings.push((var, term.clone()));
			let instance = self.ground_recurse(body);
			self.bindings.pop();
			let instance = instance?;
			acc = Some(match acc {
				None => instance,
				Some(prev) if universal => self.tree.push_node(GroundNode::And(prev, instance)),
				Some(prev) => self.tree.push_node(GroundNode::Or(prev, instance)),
			});
		}
		Ok(match acc {
			Some(id) => id,
			None => self.tree.push_node(GroundNode::Const(universal)),
		})
	}

	fn invocation(&mut self, name: &str, args: &[Arg]) -> Result<Invocation> {
		match self.registry.get(name) {
			Some(definition) => definition.check_arity(args.len())?,
			None if self.strict => {
				return Err(LogicError::UnknownPredicate {
					name: name.to_owned(),
				})
			}
			None => {
				let expected = *self.arities.entry(name.to_owned()).or_insert(args.len());
				if expected != args.len() {
					return Err(LogicError::Arity {
						name: name.to_owned(),
						expected,
						actual: args.len(),
					});
				}
			}
		}

		let mut terms = Vec::with_capacity(args.len());
		for arg in args {
			let term = match arg {
				Arg::Var(var) => match self.bindings.iter().rev().find(|(v, _)| v == var) {
					Some((_, term)) => term.clone(),
					// the parser only marks arguments bound by an enclosing quantifier
					None => self.domain.lookup(var)?,
				},
				Arg::Term(text) => self.domain.lookup(text)?,
			};
			terms.push(term);
		}
		Ok(Invocation::new(name, terms))
	}
}
