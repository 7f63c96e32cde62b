use crate::error::{LogicError, Result};
use indexmap::IndexSet;
use std::fmt;
use std::str::FromStr;

// characters that would break atom syntax if they appeared inside a term
const RESERVED: &[char] = &['[', ']', '(', ')', ',', '{', '}'];

/// Canonical textual identity of a domain element or predicate argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term(String);

impl Term {
	/// Canonicalize any displayable value, so `3` and `"3"` are the same term.
	pub fn canonical<T: fmt::Display + ?Sized>(value: &T) -> Result<Term> {
		let text = value.to_string();
		let trimmed = text.trim();
		if trimmed.is_empty() {
			return Err(LogicError::InvalidTerm {
				term: text,
				reason: "term is empty".to_owned(),
			});
		}
		if let Some(ch) = trimmed.chars().find(|ch| RESERVED.contains(ch)) {
			return Err(LogicError::InvalidTerm {
				term: text.clone(),
				reason: format!("term contains reserved character {:?}", ch),
			});
		}
		Ok(Term(trimmed.to_owned()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Read the term back as a typed value, e.g. `term.parse::<i64>()`.
	pub fn parse<T: FromStr>(&self) -> std::result::Result<T, T::Err> {
		self.0.parse()
	}
}

impl fmt::Display for Term {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl AsRef<str> for Term {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Finite domain, ordered by insertion.
#[derive(Clone, Debug, Default)]
pub struct Domain {
	terms: IndexSet<Term>,
}

impl Domain {
	pub fn new() -> Domain {
		Domain::default()
	}

	pub fn from_elements<I, T>(elements: I) -> Result<Domain>
	where
		I: IntoIterator<Item = T>,
		T: fmt::Display,
	{
		let mut terms = IndexSet::new();
		for element in elements {
			let term = Term::canonical(&element)?;
			if terms.contains(&term) {
				return Err(LogicError::DuplicateTerm {
					term: term.to_string(),
				});
			}
			terms.insert(term);
		}
		Ok(Domain { terms })
	}

	pub fn len(&self) -> usize {
		self.terms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	pub fn contains(&self, term: &Term) -> bool {
		self.terms.contains(term)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Term> {
		self.terms.iter()
	}

	/// Resolve written argument text to a member of the domain.
	pub fn lookup(&self, text: &str) -> Result<Term> {
		let term = Term::canonical(text)?;
		if self.contains(&term) {
			Ok(term)
		} else {
			Err(LogicError::TermNotInDomain {
				term: term.to_string(),
			})
		}
	}
}
