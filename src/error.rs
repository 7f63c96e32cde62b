use thiserror::Error;

pub type Result<T> = std::result::Result<T, LogicError>;

#[derive(Error, Debug)]
pub enum LogicError {
	#[error("syntax error at offset {offset} in {sentence:?}: {message}")]
	Syntax {
		sentence: String,
		offset: usize,
		message: String,
	},
	#[error("term {term:?} appears more than once in the domain")]
	DuplicateTerm { term: String },
	#[error("invalid term {term:?}: {reason}")]
	InvalidTerm { term: String, reason: String },
	#[error("term {term:?} is not a member of the domain")]
	TermNotInDomain { term: String },
	#[error("predicate {name:?} expects {expected} argument(s), got {actual}")]
	Arity {
		name: String,
		expected: usize,
		actual: usize,
	},
	#[error("predicate {name:?} is not registered")]
	UnknownPredicate { name: String },
	#[error("predicate {name:?} failed on ({args}): {message}")]
	PredicateEvaluation {
		name: String,
		args: String,
		message: String,
	},
	#[error("{count} free atoms exceed the enumeration limit of {limit}")]
	TooManyAtoms { count: usize, limit: usize },
	#[error("failed to write truth table: {0}")]
	Io(#[from] std::io::Error),
}

/// Coarse classification matching the engine's error taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
	Syntax,
	Domain,
	Arity,
	UnknownPredicate,
	PredicateEvaluation,
	Limit,
	Io,
}

impl LogicError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			LogicError::Syntax { .. } => ErrorKind::Syntax,
			LogicError::DuplicateTerm { .. }
			| LogicError::InvalidTerm { .. }
			| LogicError::TermNotInDomain { .. } => ErrorKind::Domain,
			LogicError::Arity { .. } => ErrorKind::Arity,
			LogicError::UnknownPredicate { .. } => ErrorKind::UnknownPredicate,
			LogicError::PredicateEvaluation { .. } => ErrorKind::PredicateEvaluation,
			LogicError::TooManyAtoms { .. } => ErrorKind::Limit,
			LogicError::Io(_) => ErrorKind::Io,
		}
	}

	pub(crate) fn syntax(sentence: &str, offset: usize, message: impl Into<String>) -> Self {
		LogicError::Syntax {
			sentence: sentence.to_owned(),
			offset,
			message: message.into(),
		}
	}
}

impl std::fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let name = match self {
			ErrorKind::Syntax => "SyntaxError",
			ErrorKind::Domain => "DomainError",
			ErrorKind::Arity => "ArityError",
			ErrorKind::UnknownPredicate => "UnknownPredicateError",
			ErrorKind::PredicateEvaluation => "PredicateEvaluationError",
			ErrorKind::Limit => "LimitError",
			ErrorKind::Io => "IoError",
		};
		write!(f, "{}", name)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_kind() {
		let err = LogicError::syntax("[P", 0, "unmatched '['");
		assert_eq!(err.kind(), ErrorKind::Syntax);
		assert_eq!(
			LogicError::TermNotInDomain { term: "x".into() }.kind(),
			ErrorKind::Domain
		);
		assert_eq!(ErrorKind::Arity.to_string(), "ArityError");
	}

	#[test]
	fn test_message() {
		let err = LogicError::Arity {
			name: "equal".into(),
			expected: 2,
			actual: 1,
		};
		assert_eq!(
			err.to_string(),
			"predicate \"equal\" expects 2 argument(s), got 1"
		);
	}
}
