use crate::error::{LogicError, Result};
use crate::term::Term;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub type NativeFn = dyn Fn(&[Term]) -> anyhow::Result<bool>;

/// A predicate applied to concrete terms, e.g. `is a fruit(apple)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Invocation {
	pub name: String,
	pub args: Vec<Term>,
}

impl Invocation {
	pub fn new(name: impl Into<String>, args: Vec<Term>) -> Invocation {
		Invocation {
			name: name.into(),
			args,
		}
	}
}

impl fmt::Display for Invocation {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let args: Vec<&str> = self.args.iter().map(Term::as_str).collect();
		write!(f, "{}({})", self.name, args.join(","))
	}
}

#[derive(Clone)]
pub struct PredicateDefinition {
	pub name: String,
	pub arity: usize,
	pub evaluator: Option<Rc<NativeFn>>,
}

impl PredicateDefinition {
	pub fn is_native(&self) -> bool {
		self.evaluator.is_some()
	}

	pub fn check_arity(&self, actual: usize) -> Result<()> {
		if actual != self.arity {
			return Err(LogicError::Arity {
				name: self.name.clone(),
				expected: self.arity,
				actual,
			});
		}
		Ok(())
	}

	/// Run the native evaluator, `None` for a free predicate.
	pub fn evaluate(&self, args: &[Term]) -> Result<Option<bool>> {
		self.check_arity(args.len())?;
		let evaluator = match &self.evaluator {
			Some(evaluator) => evaluator,
			None => return Ok(None),
		};
		(**evaluator)(args)
			.map(Some)
			.map_err(|err| LogicError::PredicateEvaluation {
				name: self.name.clone(),
				args: args
					.iter()
					.map(Term::as_str)
					.collect::<Vec<_>>()
					.join(","),
				message: format!("{:#}", err),
			})
	}
}

impl fmt::Debug for PredicateDefinition {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("PredicateDefinition")
			.field("name", &self.name)
			.field("arity", &self.arity)
			.field("native", &self.is_native())
			.finish()
	}
}

#[derive(Clone, Debug, Default)]
pub struct PredicateRegistry {
	definitions: HashMap<String, PredicateDefinition>,
}

impl PredicateRegistry {
	pub fn new() -> PredicateRegistry {
		PredicateRegistry::default()
	}

	/// Register or replace a predicate with a native evaluator.
	pub fn set_function<F>(&mut self, name: impl Into<String>, arity: usize, f: F)
	where
		F: Fn(&[Term]) -> anyhow::Result<bool> + 'static,
	{
		let name = name.into().trim().to_owned();
		self.definitions.insert(
			name.clone(),
			PredicateDefinition {
				name,
				arity,
				evaluator: Some(Rc::new(f)),
			},
		);
	}

	/// Register or replace a predicate whose invocations are free atoms.
	pub fn declare(&mut self, name: impl Into<String>, arity: usize) {
		let name = name.into().trim().to_owned();
		self.definitions.insert(
			name.clone(),
			PredicateDefinition {
				name,
				arity,
				evaluator: None,
			},
		);
	}

	pub fn get(&self, name: &str) -> Option<&PredicateDefinition> {
		self.definitions.get(name)
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::error::ErrorKind;

	fn terms(values: &[&str]) -> Vec<Term> {
		values.iter().map(|v| Term::canonical(*v).unwrap()).collect()
	}

	#[test]
	fn test_native_evaluation() {
		let mut registry = PredicateRegistry::new();
		registry.set_function("equal", 2, |args| {
			Ok(args[0].parse::<i64>()? == args[1].parse::<i64>()?)
		});
		let equal = registry.get("equal").unwrap();
		assert_eq!(equal.evaluate(&terms(&["3", "3"])).unwrap(), Some(true));
		assert_eq!(equal.evaluate(&terms(&["3", "4"])).unwrap(), Some(false));
		assert_eq!(
			equal.evaluate(&terms(&["3"])).unwrap_err().kind(),
			ErrorKind::Arity
		);
		let err = equal.evaluate(&terms(&["3", "apple"])).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::PredicateEvaluation);
		assert!(err.to_string().contains("3,apple"));
	}

	#[test]
	fn test_declare_and_overwrite() {
		let mut registry = PredicateRegistry::new();
		registry.declare("likes", 2);
		assert_eq!(registry.get("likes").unwrap().evaluate(&terms(&["a", "b"])).unwrap(), None);
		registry.set_function("likes", 1, |_| Ok(true));
		assert_eq!(registry.len(), 1);
		let likes = registry.get("likes").unwrap();
		assert!(likes.is_native());
		assert_eq!(likes.arity, 1);
	}
}
