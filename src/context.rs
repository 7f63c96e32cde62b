use crate::config::EngineConfig;
use crate::error::{LogicError, Result};
use crate::ground_tree::ground;
use crate::predicate::{Invocation, PredicateRegistry};
use crate::prop_tree::{parse_invocation, parse_with_depth, Expr, Sentence};
use crate::term::{Domain, Term};
use crate::truth_table::{
	evaluate, AssumptionCache, EvalOptions, Evaluation, NativeResults, TruthTable,
};
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use tracing::{debug, warn};

/// Column separator used when `validate` prints a truth table.
pub const TABLE_SEPARATOR: &str = "|";

/// A standing assumption, kept with its source text for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct Assumption {
	pub text: String,
	pub expr: Expr,
}

/// Domain, predicates, assumptions and pinned invocations for validating
/// sentences.
///
/// Native predicate results are remembered across validations until
/// `forget_predicate_invocations` is called.
///
/// A context is not synchronized; share it across threads only behind a lock.
#[derive(Debug, Default)]
pub struct Context {
	domain: Domain,
	registry: PredicateRegistry,
	assumptions: Vec<Assumption>,
	cache: AssumptionCache,
	natives: RefCell<NativeResults>,
	config: EngineConfig,
}

impl Context {
	pub fn new() -> Context {
		Context::default()
	}

	pub fn with_config(config: EngineConfig) -> Context {
		Context {
			config,
			..Context::default()
		}
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn domain(&self) -> &Domain {
		&self.domain
	}

	pub fn registry(&self) -> &PredicateRegistry {
		&self.registry
	}

	pub fn assumptions(&self) -> &[Assumption] {
		&self.assumptions
	}

	pub fn predicate_cache(&self) -> &AssumptionCache {
		&self.cache
	}

	/// Number of remembered native predicate results.
	pub fn remembered_results(&self) -> usize {
		self.natives.borrow().len()
	}

	/// Replace the domain. Elements are canonicalized to their textual form.
	///
	/// Pinned invocations and remembered native results that mention a term
	/// outside the new domain are dropped; standing assumptions are kept.
	pub fn set_term_domain<I, T>(&mut self, elements: I) -> Result<()>
	where
		I: IntoIterator<Item = T>,
		T: fmt::Display,
	{
		let domain = Domain::from_elements(elements)?;
		let before = self.cache.len();
		let in_domain =
			|invocation: &Invocation| invocation.args.iter().all(|term| domain.contains(term));
		self.cache.retain(in_domain);
		self.natives.get_mut().retain(in_domain);
		debug!(
			terms = domain.len(),
			dropped = before - self.cache.len(),
			"domain replaced"
		);
		self.domain = domain;
		Ok(())
	}

	/// Register `f` as the native evaluator of `name`.
	pub fn set_predicate_function<F>(&mut self, name: &str, arity: usize, f: F)
	where
		F: Fn(&[Term]) -> anyhow::Result<bool> + 'static,
	{
		debug!(predicate = name, arity, "native predicate registered");
		self.registry.set_function(name, arity, f);
		self.forget_results_of(name);
	}

	/// Register a predicate without an evaluator, fixing its arity.
	pub fn declare_predicate(&mut self, name: &str, arity: usize) {
		self.registry.declare(name, arity);
		self.forget_results_of(name);
	}

	fn forget_results_of(&mut self, name: &str) {
		self.natives.get_mut().retain(|invocation| invocation.name != name);
	}

	pub fn assume(&mut self, text: &str) -> Result<()> {
		let expr = self.parse(text)?.into_expr();
		self.assumptions.push(Assumption {
			text: text.trim().to_owned(),
			expr,
		});
		Ok(())
	}

	/// Pin a concrete invocation such as `is a fruit(apple)` to true.
	pub fn assume_predicate(&mut self, text: &str) -> Result<()> {
		let (name, args) = parse_invocation(text)?;
		match self.registry.get(&name) {
			Some(definition) => {
				definition.check_arity(args.len())?;
				if definition.is_native() {
					warn!(predicate = %name, "native predicate ignores assumed invocations");
				}
			}
			None if self.config.strict_predicates => {
				return Err(LogicError::UnknownPredicate { name })
			}
			None => {}
		}
		let args = args
			.iter()
			.map(|arg| self.domain.lookup(arg))
			.collect::<Result<Vec<Term>>>()?;
		let invocation = Invocation::new(name, args);
		debug!(invocation = %invocation, "invocation assumed");
		self.cache.insert(invocation);
		Ok(())
	}

	/// Drop pinned invocations and remembered native results, so native
	/// evaluators run again on the next validation.
	pub fn forget_predicate_invocations(&mut self) {
		debug!(
			pinned = self.cache.len(),
			remembered = self.natives.get_mut().len(),
			"predicate invocations forgotten"
		);
		self.cache.clear();
		self.natives.get_mut().clear();
	}

	/// Whether the standing assumptions imply `text` under every assignment.
	/// With `print_truth_table` the full table is written to stdout.
	pub fn validate(&self, text: &str, print_truth_table: bool) -> Result<bool> {
		let evaluation = self.evaluate(text, print_truth_table)?;
		if let Some(table) = &evaluation.table {
			self.write_table(table, TABLE_SEPARATOR, &mut io::stdout().lock())?;
		}
		Ok(evaluation.valid)
	}

	pub fn print_truth_table(&self, text: &str, separator: &str) -> Result<()> {
		self.write_truth_table(text, separator, &mut io::stdout().lock())
	}

	pub fn write_truth_table<W: Write>(&self, text: &str, separator: &str, out: &mut W) -> Result<()> {
		let table = self.truth_table(text)?;
		self.write_table(&table, separator, out)
	}

	pub fn truth_table(&self, text: &str) -> Result<TruthTable> {
		let evaluation = self.evaluate(text, true)?;
		Ok(evaluation.table.unwrap_or_else(|| TruthTable {
			columns: Vec::new(),
			result_label: text.trim().to_owned(),
			rows: Vec::new(),
		}))
	}

	/// Run the full pipeline: parse, prepend assumptions, ground, enumerate.
	pub fn evaluate(&self, text: &str, record_table: bool) -> Result<Evaluation> {
		let sentence = self.parse(text)?;
		let premises = if sentence.is_argument() {
			None
		} else {
			Expr::conjunction(self.assumptions.iter().map(|a| a.expr.clone()))
		};
		let expr = match premises {
			Some(premises) => Expr::implies(premises, sentence.into_expr()),
			None => sentence.into_expr(),
		};
		let tree = ground(
			&expr,
			&self.domain,
			&self.registry,
			self.config.strict_predicates,
		)?;
		evaluate(
			&tree,
			&self.registry,
			&self.cache,
			&mut self.natives.borrow_mut(),
			text.trim(),
			EvalOptions {
				max_free_atoms: self.config.max_free_atoms,
				max_table_atoms: self.config.max_table_atoms,
				record_table,
			},
		)
	}

	fn parse(&self, text: &str) -> Result<Sentence> {
		parse_with_depth(text, self.config.max_nesting_depth)
	}

	fn write_table<W: Write>(&self, table: &TruthTable, separator: &str, out: &mut W) -> Result<()> {
		table.write_to(
			out,
			separator,
			(&self.config.true_label, &self.config.false_label),
		)?;
		Ok(())
	}
}

/// Validate a sentence with no domain, predicates or assumptions.
pub fn validate(text: &str) -> Result<bool> {
	Context::new().validate(text, false)
}
