use std::collections::HashMap;

use arith_expr::{BinOp, Expr, Program};
use proptest::prelude::*;

fn arb_op() -> impl Strategy<Value = BinOp> {
    prop_oneof![
        Just(BinOp::Add),
        Just(BinOp::Sub),
        Just(BinOp::Mul),
        Just(BinOp::Div),
        Just(BinOp::Mod),
    ]
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        (-999..1000i32).prop_map(Expr::Integer),
        "[a-e][a-z0-9]{0,2}".prop_map(Expr::Variable),
    ];
    leaf.prop_recursive(6, 48, 2, |inner| {
        (inner.clone(), inner, arb_op())
            .prop_map(|(lhs, rhs, op)| Expr::binary(lhs, rhs, op))
    })
}

/// A tree plus one argument per free variable, in sorted name order.
fn arb_expr_with_args() -> impl Strategy<Value = (Expr, Vec<i32>)> {
    arb_expr().prop_flat_map(|expr| {
        let len = expr.free_vars().len();
        let args = proptest::collection::vec(-40..40i32, len);
        (Just(expr), args)
    })
}

proptest! {
    /// Rendering any tree and parsing it back renders identically; the
    /// re-parse may regroup equal-priority chains left-associatively, but
    /// the text is a fixed point.
    #[test]
    fn render_reparse_renders_identically(expr in arb_expr()) {
        let rendered = expr.to_string();
        let reparsed = Expr::parse(&rendered).unwrap();
        prop_assert_eq!(reparsed.to_string(), rendered);
    }

    /// A parsed tree survives the render/parse cycle structurally: parser
    /// output is always left-associative, so nothing regroups.
    #[test]
    fn parsed_trees_round_trip_structurally(expr in arb_expr()) {
        let first = Expr::parse(&expr.to_string()).unwrap();
        let second = Expr::parse(&first.to_string()).unwrap();
        prop_assert_eq!(second, first);
    }

    #[test]
    fn reduce_is_idempotent(expr in arb_expr()) {
        if let Ok(reduced) = expr.reduce() {
            prop_assert_eq!(reduced.reduce().unwrap(), reduced);
        }
    }

    /// Normalization never changes the free-variable set.
    #[test]
    fn normalize_preserves_free_variables(expr in arb_expr()) {
        prop_assert_eq!(expr.normalize().free_vars(), expr.free_vars());
    }

    /// The canonical form is a fixed point of normalization.
    #[test]
    fn normalize_is_idempotent_on_rendering(expr in arb_expr()) {
        let canonical = expr.normalize();
        prop_assert_eq!(canonical.normalize().to_string(), canonical.to_string());
    }

    /// The compiled program and the substitute-then-reduce interpretation
    /// agree on every argument assignment — value and division-by-zero
    /// failure alike.
    #[test]
    fn compiled_and_interpreted_agree((expr, args) in arb_expr_with_args()) {
        let program = Program::compile(&expr);
        prop_assert_eq!(program.params(), expr.free_vars());

        let bindings: HashMap<String, Expr> = program
            .params()
            .iter()
            .cloned()
            .zip(args.iter().copied().map(Expr::Integer))
            .collect();
        let interpreted = expr.substitute(&bindings).reduce();
        let compiled = program.call(&args);

        match (interpreted, compiled) {
            (Ok(tree), Ok(value)) => prop_assert_eq!(tree.as_integer(), Some(value)),
            (Err(folding), Err(running)) => prop_assert_eq!(folding, running),
            (interpreted, compiled) => prop_assert!(
                false,
                "paths diverged: interpreter {:?}, program {:?}",
                interpreted,
                compiled
            ),
        }
    }
}
