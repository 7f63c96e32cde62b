//! Tokenizers built with `plex`.
//!
//! A sentence is split into brackets, braces and keywords. The text between
//! `[` and `]` is kept whole so that atom names may contain spaces; it is split
//! again by [`split_atom`].

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
	// content between the brackets, untrimmed
	Atom(String),
	LeftBrace,
	RightBrace,
	Not,
	And,
	Or,
	Implies,
	Therefore,
	Exists,
	All,
	Ident(String),
	Whitespace,
	Unexpected(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Spanned {
	pub token: Token,
	// byte offset into the sentence
	pub offset: usize,
}

pub fn tokenize(input: &str) -> Vec<Spanned> {
	use plex::lexer;
	lexer! {
		fn next_token(text: 'a) -> Token;

		r#"[ \t\r\n]+"# => Token::Whitespace,
		r#"\[[^\]]*\]"# => Token::Atom(text[1..text.len() - 1].to_owned()),
		r#"\{"# => Token::LeftBrace,
		r#"\}"# => Token::RightBrace,
		r#"not"# => Token::Not,
		r#"and"# => Token::And,
		r#"or"# => Token::Or,
		r#"implies"# => Token::Implies,
		r#"therefore"# => Token::Therefore,
		r#"exists"# => Token::Exists,
		r#"all"# => Token::All,
		r#"[A-Za-z_][A-Za-z0-9_]*"# => Token::Ident(text.to_owned()),
		r#"."# => Token::Unexpected(text.to_owned()),
	}

	let mut tokens = Vec::new();
	let mut remaining = input;
	while let Some((token, new_remaining)) = next_token(remaining) {
		let offset = input.len() - remaining.len();
		if token != Token::Whitespace {
			tokens.push(Spanned { token, offset });
		}
		remaining = new_remaining;
	}
	if !remaining.is_empty() {
		tokens.push(Spanned {
			token: Token::Unexpected(remaining.to_owned()),
			offset: input.len() - remaining.len(),
		});
	}
	tokens
}

#[derive(Debug)]
enum AtomToken {
	Text(String),
	LeftParen,
	RightParen,
	Comma,
}

/// Name and optional argument list written inside an atom.
#[derive(Clone, Debug, PartialEq)]
pub struct AtomSyntax {
	pub name: String,
	// None for a propositional atom, Some for a predicate invocation
	pub args: Option<Vec<String>>,
}

/// Split `is a fruit(apple)` into its name and arguments.
///
/// On failure returns a message and the byte offset within `inner`.
pub fn split_atom(inner: &str) -> Result<AtomSyntax, (usize, String)> {
	use plex::lexer;
	lexer! {
		fn next_atom_token(text: 'a) -> AtomToken;

		r#"[^(),]+"# => AtomToken::Text(text.to_owned()),
		r#"\("# => AtomToken::LeftParen,
		r#"\)"# => AtomToken::RightParen,
		r#","# => AtomToken::Comma,
	}

	if inner.trim().is_empty() {
		return Err((0, "empty atom".to_owned()));
	}
	if let Some(pos) = inner.find('[') {
		return Err((pos, "'[' inside an atom".to_owned()));
	}

	let mut tokens = Vec::new();
	let mut remaining = inner;
	while let Some((token, new_remaining)) = next_atom_token(remaining) {
		tokens.push((inner.len() - remaining.len(), token));
		remaining = new_remaining;
	}

	let mut iter = tokens.into_iter();
	let name = match iter.next() {
		Some((_, AtomToken::Text(text))) if !text.trim().is_empty() => text.trim().to_owned(),
		Some((pos, _)) => return Err((pos, "atom has no name".to_owned())),
		None => unreachable!(),
	};
	match iter.next() {
		None => return Ok(AtomSyntax { name, args: None }),
		Some((_, AtomToken::LeftParen)) => {}
		Some((pos, _)) => return Err((pos, "expected '(' after the predicate name".to_owned())),
	}

	let mut args: Vec<String> = Vec::new();
	let mut pending: Option<(usize, String)> = None;
	let mut closed = false;
	for (pos, token) in iter.by_ref() {
		match token {
			AtomToken::Text(text) => pending = Some((pos, text)),
			AtomToken::Comma => args.push(argument(pending.take(), pos)?),
			AtomToken::RightParen => {
				match pending.take() {
					// `name()` and `name( )` take no arguments
					Some((_, text)) if text.trim().is_empty() && args.is_empty() => {}
					None if args.is_empty() => {}
					other => args.push(argument(other, pos)?),
				}
				closed = true;
				break;
			}
			AtomToken::LeftParen => return Err((pos, "nested '(' in argument list".to_owned())),
		}
	}
	if !closed {
		return Err((inner.len(), "unmatched '('".to_owned()));
	}
	match iter.next() {
		None => Ok(AtomSyntax {
			name,
			args: Some(args),
		}),
		Some((_, AtomToken::Text(text))) if text.trim().is_empty() => match iter.next() {
			None => Ok(AtomSyntax {
				name,
				args: Some(args),
			}),
			Some((pos, _)) => Err((pos, "text after the argument list".to_owned())),
		},
		Some((pos, _)) => Err((pos, "text after the argument list".to_owned())),
	}
}

// Trimmed argument text ending at `end`. Brackets and braces cannot occur in
// a term, so they mark a malformed invocation.
fn argument(pending: Option<(usize, String)>, end: usize) -> Result<String, (usize, String)> {
	let (start, text) = match pending {
		Some((start, text)) if !text.trim().is_empty() => (start, text),
		_ => return Err((end, "empty argument".to_owned())),
	};
	if let Some((pos, c)) = text
		.char_indices()
		.find(|(_, c)| matches!(c, '[' | ']' | '{' | '}'))
	{
		return Err((start + pos, format!("'{}' inside an argument", c)));
	}
	Ok(text.trim().to_owned())
}
