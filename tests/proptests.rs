//! Property-based tests comparing the engine against a brute-force oracle.

use logicval::{Arg, Context, Expr};
use proptest::prelude::*;
use std::collections::HashMap;

fn prop_atom() -> impl Strategy<Value = Expr> {
	prop::sample::select(vec!["A", "B", "C", "D"]).prop_map(|name| Expr::PropAtom(name.to_owned()))
}

fn q_atom() -> impl Strategy<Value = Expr> {
	prop_oneof![
		prop::sample::select(vec!["a", "b"])
			.prop_map(|t| Expr::PredicateAtom("Q".to_owned(), vec![Arg::Term(t.to_owned())])),
		Just(Expr::PropAtom("P".to_owned())),
	]
}

fn arb_expr(leaf: BoxedStrategy<Expr>) -> impl Strategy<Value = Expr> {
	leaf.prop_recursive(4, 32, 2, |inner| {
		prop_oneof![
			inner.clone().prop_map(Expr::not),
			(inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::and(a, b)),
			(inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::or(a, b)),
			(inner.clone(), inner).prop_map(|(a, b)| Expr::implies(a, b)),
		]
	})
}

fn collect_atoms(expr: &Expr, out: &mut Vec<String>) {
	match expr {
		Expr::PropAtom(_) | Expr::PredicateAtom(_, _) => {
			let key = expr.to_string();
			if !out.contains(&key) {
				out.push(key);
			}
		}
		Expr::Not(a) => collect_atoms(a, out),
		Expr::And(a, b) | Expr::Or(a, b) | Expr::Implies(a, b) => {
			collect_atoms(a, out);
			collect_atoms(b, out);
		}
		Expr::Exists(_, a) | Expr::ForAll(_, a) => collect_atoms(a, out),
	}
}

fn oracle_eval(expr: &Expr, values: &HashMap<String, bool>) -> bool {
	match expr {
		Expr::PropAtom(_) | Expr::PredicateAtom(_, _) => values[&expr.to_string()],
		Expr::Not(a) => !oracle_eval(a, values),
		Expr::And(a, b) => oracle_eval(a, values) && oracle_eval(b, values),
		Expr::Or(a, b) => oracle_eval(a, values) || oracle_eval(b, values),
		Expr::Implies(a, b) => !oracle_eval(a, values) || oracle_eval(b, values),
		Expr::Exists(_, _) | Expr::ForAll(_, _) => unreachable!("oracle is quantifier-free"),
	}
}

// tautology check by brute force, with some atoms fixed
fn oracle(expr: &Expr, fixed: &HashMap<String, bool>) -> bool {
	let mut atoms = Vec::new();
	collect_atoms(expr, &mut atoms);
	atoms.retain(|atom| !fixed.contains_key(atom));
	(0..1u32 << atoms.len()).all(|row| {
		let mut values = fixed.clone();
		for (i, atom) in atoms.iter().enumerate() {
			values.insert(atom.clone(), row & (1 << i) != 0);
		}
		oracle_eval(expr, &values)
	})
}

proptest! {
	#[test]
	fn prop_matches_oracle(expr in arb_expr(prop_atom().boxed())) {
		let text = expr.to_string();
		let valid = logicval::validate(&text).unwrap();
		prop_assert_eq!(valid, oracle(&expr, &HashMap::new()), "{}", text);
	}

	#[test]
	fn prop_display_round_trips(expr in arb_expr(prop_atom().boxed())) {
		let reparsed = logicval::parse(&expr.to_string()).unwrap().into_expr();
		prop_assert_eq!(reparsed, expr);
	}

	#[test]
	fn prop_pruning_equivalence(expr in arb_expr(q_atom().boxed())) {
		let text = expr.to_string();
		let mut c = Context::new();
		c.set_term_domain(vec!["a", "b"]).unwrap();
		c.assume_predicate("Q(a)").unwrap();
		let mut fixed = HashMap::new();
		fixed.insert("[Q(a)]".to_owned(), true);
		prop_assert_eq!(c.validate(&text, false).unwrap(), oracle(&expr, &fixed), "{}", text);
	}

	#[test]
	fn prop_exists_monotone(size in 1usize..6) {
		let mut c = Context::new();
		c.set_term_domain(vec!["t0"]).unwrap();
		c.assume_predicate("P(t0)").unwrap();
		prop_assert!(c.validate("exists x [P(x)]", false).unwrap());
		let terms: Vec<String> = (0..size).map(|i| format!("t{}", i)).collect();
		c.set_term_domain(&terms).unwrap();
		prop_assert!(c.validate("exists x [P(x)]", false).unwrap());
	}

	#[test]
	fn prop_assume_predicate_is_a_set(repeats in 1usize..4) {
		let mut c = Context::new();
		c.set_term_domain(vec!["a", "b"]).unwrap();
		for _ in 0..repeats {
			c.assume_predicate("R(a, b)").unwrap();
		}
		prop_assert_eq!(c.predicate_cache().len(), 1);
		c.forget_predicate_invocations();
		prop_assert!(c.predicate_cache().is_empty());
		c.forget_predicate_invocations();
		prop_assert!(c.predicate_cache().is_empty());
	}
}
