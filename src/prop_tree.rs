use crate::error::{LogicError, Result};
use crate::lexer::{split_atom, tokenize, Spanned, Token};
use std::fmt;

pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Predicate argument as written: a quantifier variable or a literal term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Arg {
	Var(String),
	Term(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
	PropAtom(String),
	PredicateAtom(String, Vec<Arg>),
	Not(Box<Expr>),
	And(Box<Expr>, Box<Expr>),
	Or(Box<Expr>, Box<Expr>),
	Implies(Box<Expr>, Box<Expr>),
	Exists(String, Box<Expr>),
	ForAll(String, Box<Expr>),
}

impl Expr {
	pub fn not(e: Expr) -> Expr {
		Expr::Not(Box::new(e))
	}

	pub fn and(a: Expr, b: Expr) -> Expr {
		Expr::And(Box::new(a), Box::new(b))
	}

	pub fn or(a: Expr, b: Expr) -> Expr {
		Expr::Or(Box::new(a), Box::new(b))
	}

	pub fn implies(a: Expr, b: Expr) -> Expr {
		Expr::Implies(Box::new(a), Box::new(b))
	}

	/// Conjunction of `exprs` as a balanced tree, `None` for an empty input.
	pub fn conjunction<I: IntoIterator<Item = Expr>>(exprs: I) -> Option<Expr> {
		Expr::balanced(exprs.into_iter().collect(), Expr::and)
	}

	// Joins operands in order, halving at each level so the tree depth grows
	// with the log of the operand count.
	fn balanced(mut operands: Vec<Expr>, join: fn(Expr, Expr) -> Expr) -> Option<Expr> {
		if operands.len() <= 1 {
			return operands.pop();
		}
		let rhs = operands.split_off(operands.len() / 2);
		let lhs = Expr::balanced(operands, join)?;
		let rhs = Expr::balanced(rhs, join)?;
		Some(join(lhs, rhs))
	}

	fn to_string_recurse(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Expr::PropAtom(name) => write!(f, "[{}]", name),
			Expr::PredicateAtom(name, args) => {
				let args: Vec<&str> = args
					.iter()
					.map(|arg| match arg {
						Arg::Var(s) | Arg::Term(s) => s.as_str(),
					})
					.collect();
				write!(f, "[{}({})]", name, args.join(","))
			}
			Expr::Not(a) => {
				write!(f, "not ")?;
				a.to_string_grouped(f)
			}
			Expr::And(a, b) => self.binary(f, a, "and", b),
			Expr::Or(a, b) => self.binary(f, a, "or", b),
			Expr::Implies(a, b) => self.binary(f, a, "implies", b),
			Expr::Exists(var, a) => {
				write!(f, "exists {} ", var)?;
				a.to_string_grouped(f)
			}
			Expr::ForAll(var, a) => {
				write!(f, "all {} ", var)?;
				a.to_string_grouped(f)
			}
		}
	}

	fn binary(&self, f: &mut fmt::Formatter, a: &Expr, op: &str, b: &Expr) -> fmt::Result {
		a.to_string_grouped(f)?;
		write!(f, " {} ", op)?;
		b.to_string_grouped(f)
	}

	// atoms and quantifiers over atoms print bare, everything else in braces
	fn to_string_grouped(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Expr::PropAtom(_) | Expr::PredicateAtom(_, _) => self.to_string_recurse(f),
			Expr::Exists(_, _) | Expr::ForAll(_, _) => self.to_string_recurse(f),
			_ => {
				write!(f, "{{")?;
				self.to_string_recurse(f)?;
				write!(f, "}}")
			}
		}
	}
}

impl fmt::Display for Expr {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		self.to_string_recurse(f)
	}
}

/// A parsed top-level sentence.
#[derive(Clone, Debug, PartialEq)]
pub enum Sentence {
	Claim(Expr),
	// `premises therefore conclusion`, validated without standing assumptions
	Argument { premises: Expr, conclusion: Expr },
}

impl Sentence {
	/// The expression to validate, with `therefore` read as `implies`.
	pub fn into_expr(self) -> Expr {
		match self {
			Sentence::Claim(e) => e,
			Sentence::Argument {
				premises,
				conclusion,
			} => Expr::implies(premises, conclusion),
		}
	}

	/// Whether the sentence carries its own premises.
	pub fn is_argument(&self) -> bool {
		matches!(self, Sentence::Argument { .. })
	}
}

impl fmt::Display for Sentence {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Sentence::Claim(e) => write!(f, "{}", e),
			Sentence::Argument {
				premises,
				conclusion,
			} => {
				premises.to_string_grouped(f)?;
				write!(f, " therefore ")?;
				conclusion.to_string_grouped(f)
			}
		}
	}
}

pub fn parse(text: &str) -> Result<Sentence> {
	parse_with_depth(text, DEFAULT_MAX_DEPTH)
}

pub fn parse_with_depth(text: &str, max_depth: usize) -> Result<Sentence> {
	let mut parser = Parser::new(text, max_depth);
	let sentence = parser.sentence()?;
	parser.expect_end()?;
	Ok(sentence)
}

/// Parse a bare predicate invocation such as `is a fruit(apple)` or
/// `[is a fruit(apple)]`, returning its name and argument texts.
pub fn parse_invocation(text: &str) -> Result<(String, Vec<String>)> {
	let trimmed = text.trim();
	let (inner, base) = if trimmed.starts_with('[') {
		let tokens = tokenize(text);
		match tokens.as_slice() {
			[Spanned {
				token: Token::Atom(inner),
				offset,
			}] => (inner.clone(), offset + 1),
			_ => {
				return Err(LogicError::syntax(
					text,
					0,
					"expected a single bracketed predicate invocation",
				))
			}
		}
	} else {
		(text.to_owned(), 0)
	};
	let atom = split_atom(&inner).map_err(|(pos, msg)| LogicError::syntax(text, base + pos, msg))?;
	match atom.args {
		Some(args) => Ok((atom.name, args)),
		None => Err(LogicError::syntax(
			text,
			0,
			"expected a predicate invocation with an argument list",
		)),
	}
}

struct Parser<'a> {
	text: &'a str,
	tokens: Vec<Spanned>,
	pos: usize,
	// quantifier variables in scope, innermost last
	bound: Vec<String>,
	depth: usize,
	max_depth: usize,
}

impl<'a> Parser<'a> {
	fn new(text: &'a str, max_depth: usize) -> Parser<'a> {
		Parser {
			text,
			tokens: tokenize(text),
			pos: 0,
			bound: Vec::new(),
			depth: 0,
			max_depth,
		}
	}

	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos).map(|s| &s.token)
	}

	fn offset(&self) -> usize {
		self.tokens
			.get(self.pos)
			.map(|s| s.offset)
			.unwrap_or_else(|| self.text.len())
	}

	fn error(&self, message: impl Into<String>) -> LogicError {
		LogicError::syntax(self.text, self.offset(), message)
	}

	fn unexpected(&self, expected: &str) -> LogicError {
		match self.peek() {
			None => self.error(format!("expected {}, found end of sentence", expected)),
			Some(Token::Unexpected(s)) if s == "[" => self.error("unmatched '['"),
			Some(Token::Unexpected(s)) => self.error(format!("unexpected character {:?}", s)),
			Some(token) => self.error(format!("expected {}, found {}", expected, describe(token))),
		}
	}

	fn eat(&mut self, token: &Token) -> bool {
		if self.peek() == Some(token) {
			self.pos += 1;
			true
		} else {
			false
		}
	}

	fn expect_end(&self) -> Result<()> {
		match self.peek() {
			None => Ok(()),
			Some(Token::RightBrace) => Err(self.error("unmatched '}'")),
			Some(Token::Implies) => Err(self.error("'implies' does not chain, group with braces")),
			Some(Token::Therefore) => Err(self.error("'therefore' may appear only once")),
			Some(_) => Err(self.unexpected("end of sentence")),
		}
	}

	fn sentence(&mut self) -> Result<Sentence> {
		let premises = self.implies_expr()?;
		if self.eat(&Token::Therefore) {
			let conclusion = self.implies_expr()?;
			Ok(Sentence::Argument {
				premises,
				conclusion,
			})
		} else {
			Ok(Sentence::Claim(premises))
		}
	}

	fn implies_expr(&mut self) -> Result<Expr> {
		let lhs = self.or_expr()?;
		if self.eat(&Token::Implies) {
			let rhs = self.or_expr()?;
			Ok(Expr::implies(lhs, rhs))
		} else {
			Ok(lhs)
		}
	}

	// `and` and `or` are associative, so a flat chain is built balanced
	// rather than as one long left spine.
	fn or_expr(&mut self) -> Result<Expr> {
		let lhs = self.and_expr()?;
		let mut rest = Vec::new();
		while self.eat(&Token::Or) {
			rest.push(self.and_expr()?);
		}
		Ok(match Expr::balanced(rest, Expr::or) {
			Some(rhs) => Expr::or(lhs, rhs),
			None => lhs,
		})
	}

	fn and_expr(&mut self) -> Result<Expr> {
		let lhs = self.unary()?;
		let mut rest = Vec::new();
		while self.eat(&Token::And) {
			rest.push(self.unary()?);
		}
		Ok(match Expr::balanced(rest, Expr::and) {
			Some(rhs) => Expr::and(lhs, rhs),
			None => lhs,
		})
	}

	fn enter(&mut self) -> Result<()> {
		self.depth += 1;
		if self.depth > self.max_depth {
			return Err(self.error(format!("nesting deeper than {}", self.max_depth)));
		}
		Ok(())
	}

	fn unary(&mut self) -> Result<Expr> {
		self.enter()?;
		let result = match self.peek() {
			Some(Token::Not) => {
				self.pos += 1;
				self.unary().map(Expr::not)
			}
			Some(Token::Exists) | Some(Token::All) => self.quantified(),
			Some(Token::Atom(_)) => self.atom(),
			Some(Token::LeftBrace) => self.group(),
			_ => Err(self.unexpected("'[', '{', 'not' or a quantifier")),
		};
		self.depth -= 1;
		result
	}

	fn group(&mut self) -> Result<Expr> {
		let open = self.offset();
		self.pos += 1;
		let inner = self.implies_expr()?;
		match self.peek() {
			Some(Token::RightBrace) => {
				self.pos += 1;
				Ok(inner)
			}
			Some(Token::Therefore) => Err(self.error("'therefore' is only allowed at the top level")),
			Some(Token::Implies) => Err(self.error("'implies' does not chain, group with braces")),
			None => Err(LogicError::syntax(self.text, open, "unmatched '{'")),
			Some(_) => Err(self.unexpected("'}'")),
		}
	}

	fn quantified(&mut self) -> Result<Expr> {
		let universal = self.peek() == Some(&Token::All);
		self.pos += 1;
		let var = match self.peek() {
			Some(Token::Ident(name)) => name.clone(),
			_ => return Err(self.unexpected("a variable name after the quantifier")),
		};
		self.pos += 1;

		self.enter()?;
		self.bound.push(var.clone());
		let body = match self.peek() {
			Some(Token::Atom(_)) => self.atom(),
			Some(Token::LeftBrace) => self.group(),
			Some(Token::Exists) | Some(Token::All) => self.quantified(),
			_ => Err(self.unexpected(&format!("'[' or '{{' after variable {:?}", var))),
		};
		self.bound.pop();
		self.depth -= 1;

		let body = Box::new(body?);
		Ok(if universal {
			Expr::ForAll(var, body)
		} else {
			Expr::Exists(var, body)
		})
	}

	fn atom(&mut self) -> Result<Expr> {
		let (inner, offset) = match self.tokens.get(self.pos) {
			Some(Spanned {
				token: Token::Atom(inner),
				offset,
			}) => (inner.clone(), *offset),
			_ => return Err(self.unexpected("'['")),
		};
		self.pos += 1;
		let atom = split_atom(&inner)
			.map_err(|(pos, msg)| LogicError::syntax(self.text, offset + 1 + pos, msg))?;
		Ok(match atom.args {
			None => Expr::PropAtom(atom.name),
			Some(args) => {
				let args = args
					.into_iter()
					.map(|arg| {
						if self.bound.iter().any(|v| *v == arg) {
							Arg::Var(arg)
						} else {
							Arg::Term(arg)
						}
					})
					.collect();
				Expr::PredicateAtom(atom.name, args)
			}
		})
	}
}

fn describe(token: &Token) -> String {
	match token {
		Token::Atom(inner) => format!("atom [{}]", inner),
		Token::LeftBrace => "'{'".to_owned(),
		Token::RightBrace => "'}'".to_owned(),
		Token::Not => "'not'".to_owned(),
		Token::And => "'and'".to_owned(),
		Token::Or => "'or'".to_owned(),
		Token::Implies => "'implies'".to_owned(),
		Token::Therefore => "'therefore'".to_owned(),
		Token::Exists => "'exists'".to_owned(),
		Token::All => "'all'".to_owned(),
		Token::Ident(name) => format!("identifier {:?}", name),
		Token::Whitespace => "whitespace".to_owned(),
		Token::Unexpected(s) => format!("{:?}", s),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::error::ErrorKind;

	fn claim(text: &str) -> Expr {
		match parse(text).unwrap() {
			Sentence::Claim(e) => e,
			other => panic!("not a claim: {:?}", other),
		}
	}

	fn p(name: &str) -> Expr {
		Expr::PropAtom(name.to_owned())
	}

	#[test]
	fn test_precedence() {
		assert_eq!(
			claim("[P] or not [P]"),
			Expr::or(p("P"), Expr::not(p("P")))
		);
		assert_eq!(
			claim("[A] or [B] and [C] implies [D]"),
			Expr::implies(Expr::or(p("A"), Expr::and(p("B"), p("C"))), p("D"))
		);
		assert_eq!(
			claim("not {[A] or [B]}"),
			Expr::not(Expr::or(p("A"), p("B")))
		);
	}

	#[test]
	fn test_therefore() {
		let sentence = parse("not [P] or not [Q] therefore not {[P] and [Q]}").unwrap();
		assert!(sentence.is_argument());
		assert_eq!(
			sentence.into_expr(),
			Expr::implies(
				Expr::or(Expr::not(p("P")), Expr::not(p("Q"))),
				Expr::not(Expr::and(p("P"), p("Q")))
			)
		);
	}

	#[test]
	fn test_quantifier_binding() {
		let e = claim("exists x {exists y {not [equal(x,y)] and [gt(x, 3)]}}");
		let expected = Expr::Exists(
			"x".into(),
			Box::new(Expr::Exists(
				"y".into(),
				Box::new(Expr::and(
					Expr::not(Expr::PredicateAtom(
						"equal".into(),
						vec![Arg::Var("x".into()), Arg::Var("y".into())],
					)),
					Expr::PredicateAtom(
						"gt".into(),
						vec![Arg::Var("x".into()), Arg::Term("3".into())],
					),
				)),
			)),
		);
		assert_eq!(e, expected);
		// outside the quantifier the same name is a literal
		assert_eq!(
			claim("all x [R(x)] and [R(x)]"),
			Expr::and(
				Expr::ForAll(
					"x".into(),
					Box::new(Expr::PredicateAtom("R".into(), vec![Arg::Var("x".into())]))
				),
				Expr::PredicateAtom("R".into(), vec![Arg::Term("x".into())])
			)
		);
		// stacked quantifiers
		assert!(matches!(claim("all x all y [R(x,y)]"), Expr::ForAll(_, _)));
	}

	#[test]
	fn test_multi_word_names() {
		assert_eq!(
			claim("[b is a baseball] implies {[b is a ball] and [b is white]}"),
			Expr::implies(p("b is a baseball"), Expr::and(p("b is a ball"), p("b is white")))
		);
		assert_eq!(
			claim("[is a fruit( apple )]"),
			Expr::PredicateAtom("is a fruit".into(), vec![Arg::Term("apple".into())])
		);
	}

	#[test]
	fn test_display_reparses() {
		for text in &[
			"{{{[P] and [Q]} and [R]} and {[S] and [T]}} implies {[Q] and [S]}",
			"all food {[is crunchy(food)] implies [is a fruit(food)]}",
			"exists x [sum_greater_than_39(x,20)] therefore not not [P]",
		] {
			let sentence = parse(text).unwrap();
			assert_eq!(parse(&sentence.to_string()).unwrap(), sentence);
		}
	}

	#[test]
	fn test_from_string_failed() {
		for text in &[
			"[P",
			"[P]]",
			"{[P] and [Q]",
			"[P] and [Q]}",
			"[]",
			"[P] xor [Q]",
			"P and Q",
			"exists [P(x)]",
			"exists x not [P(x)]",
			"[A] implies [B] implies [C]",
			"{[A] therefore [B]}",
			"[A] therefore [B] therefore [C]",
			"[P] and",
			"",
		] {
			let err = parse(text).unwrap_err();
			assert_eq!(err.kind(), ErrorKind::Syntax, "{:?}", text);
		}
	}

	#[test]
	fn test_error_offset() {
		match parse("[P] and [f(a,)]").unwrap_err() {
			LogicError::Syntax { offset, .. } => assert_eq!(offset, 13),
			other => panic!("{:?}", other),
		}
	}

	fn depth(e: &Expr) -> usize {
		match e {
			Expr::PropAtom(_) | Expr::PredicateAtom(_, _) => 1,
			Expr::Not(a) | Expr::Exists(_, a) | Expr::ForAll(_, a) => 1 + depth(a),
			Expr::And(a, b) | Expr::Or(a, b) | Expr::Implies(a, b) => 1 + depth(a).max(depth(b)),
		}
	}

	#[test]
	fn test_long_chains_stay_shallow() {
		let atoms: Vec<String> = (0..5000).map(|i| format!("[A{}]", i)).collect();
		let e = claim(&atoms.join(" and "));
		assert!(depth(&e) <= 16, "depth {}", depth(&e));
		let e = claim(&atoms.join(" or "));
		assert!(depth(&e) <= 16, "depth {}", depth(&e));

		// operand order is kept
		assert_eq!(
			claim("[A] and [B] and [C]"),
			Expr::and(p("A"), Expr::and(p("B"), p("C")))
		);

		let e = Expr::conjunction((0..3000).map(|i| p(&format!("A{}", i)))).unwrap();
		assert!(depth(&e) <= 16, "depth {}", depth(&e));
		assert_eq!(Expr::conjunction(vec![p("A")]), Some(p("A")));
		assert_eq!(Expr::conjunction(Vec::new()), None);
	}

	#[test]
	fn test_depth_limit() {
		let deep = format!("{}[P]{}", "{".repeat(10), "}".repeat(10));
		assert!(parse_with_depth(&deep, 20).is_ok());
		assert!(parse_with_depth(&deep, 5).is_err());
	}

	#[test]
	fn test_parse_invocation() {
		assert_eq!(
			parse_invocation("is a fruit(apple)").unwrap(),
			("is a fruit".to_owned(), vec!["apple".to_owned()])
		);
		assert_eq!(
			parse_invocation(" [likes(a, b)] ").unwrap(),
			("likes".to_owned(), vec!["a".to_owned(), "b".to_owned()])
		);
		assert!(parse_invocation("[P]").is_err());
		assert!(parse_invocation("[P(a)] and [Q(a)]").is_err());
	}
}
