//! Integer math expression parser, reducer, and compiler.
//!
//! # Why?
//!
//! Reuse. An expression over named variables can be parsed once, simplified
//! algebraically (constant folding plus regrouping of `+`/`-` and `*`/`/`
//! chains into a canonical form), and then either partially evaluated with
//! some variables substituted or lowered to a flat [`Program`] that is
//! invoked many times with different argument vectors, with no tree
//! traversal or name lookup on the hot path.
//!
//! The parser is a single left-to-right scan over an explicit
//! operand/operator stack — no recursion, no grammar file — so malformed
//! input is reported with the exact character offset that broke the scan.
//!
//! # Example
//!
//! ```rust
//! use arith_expr::*;
//! use std::collections::HashMap;
//!
//! let expr = Expr::parse("2 * (foo + bar) - baz").unwrap();
//! assert_eq!(expr.free_vars(), ["bar", "baz", "foo"]);
//!
//! // Interpreted: substitute, then fold.
//! let bindings = HashMap::from([
//!     ("bar".to_string(), Expr::Integer(3)),
//!     ("baz".to_string(), Expr::Integer(4)),
//!     ("foo".to_string(), Expr::Integer(5)),
//! ]);
//! let reduced = expr.substitute(&bindings).reduce().unwrap();
//! assert_eq!(reduced.as_integer(), Some(12));
//!
//! // Compiled: arguments in sorted free-variable order.
//! let program = expr.compile();
//! assert_eq!(program.call(&[3, 4, 5]), Ok(12));
//!
//! // Canonical form for comparing and printing.
//! let canonical = Expr::parse("x + (4 + 5)").unwrap().normalize();
//! assert_eq!(canonical.to_string(), "x+9");
//! ```

mod compile;
mod evaluate;
mod expression;
mod normalize;
mod parse;

pub use compile::*;
pub use evaluate::*;
pub use expression::*;
pub use parse::*;
