//! Truth-table validation of propositional and finite first-order sentences.
//!
//! ```
//! use logicval::Context;
//!
//! let mut c = Context::new();
//! c.set_term_domain(vec!["apple", "banana", "carrot"]).unwrap();
//! c.assume("[is a fruit(apple)] and [is a fruit(banana)]").unwrap();
//! assert!(c.validate("exists food [is a fruit(food)]", false).unwrap());
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod ground_tree;
pub mod lexer;
pub mod predicate;
pub mod prop_tree;
pub mod term;
pub mod truth_table;

pub use config::EngineConfig;
pub use context::{validate, Assumption, Context, TABLE_SEPARATOR};
pub use error::{ErrorKind, LogicError, Result};
pub use predicate::{Invocation, PredicateDefinition, PredicateRegistry};
pub use prop_tree::{parse, Arg, Expr, Sentence};
pub use term::{Domain, Term};
pub use truth_table::{AssumptionCache, Evaluation, NativeResults, TruthTable};
