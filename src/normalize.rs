use crate::expression::{BinOp, Expr};

/// One of the two regroupable operator pairs: `+`/`-` and `*`/`/`.
///
/// Each family has a positive operator (associative, commutative) and a
/// negative operator that undoes it. `%` belongs to neither.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Family {
    Additive,
    Multiplicative,
}

impl Family {
    fn of(op: BinOp) -> Option<Family> {
        match op {
            BinOp::Add | BinOp::Sub => Some(Self::Additive),
            BinOp::Mul | BinOp::Div => Some(Self::Multiplicative),
            BinOp::Mod => None,
        }
    }

    fn positive_op(self) -> BinOp {
        match self {
            Self::Additive => BinOp::Add,
            Self::Multiplicative => BinOp::Mul,
        }
    }

    fn negative_op(self) -> BinOp {
        match self {
            Self::Additive => BinOp::Sub,
            Self::Multiplicative => BinOp::Div,
        }
    }

    fn contains(self, op: BinOp) -> bool {
        Family::of(op) == Some(self)
    }

    /// Combines two constants with the positive operator. Add and Mul wrap
    /// and cannot fail.
    fn fold_constants(self, lhs: i32, rhs: i32) -> i32 {
        match self {
            Self::Additive => lhs.wrapping_add(rhs),
            Self::Multiplicative => lhs.wrapping_mul(rhs),
        }
    }
}

/// Which side of the family's negative operator an operand sits on,
/// transitively. Two negations cancel.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    fn flipped(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

impl Expr {
    /// Regroups chains of `+`/`-` and `*`/`/` into a canonical form.
    ///
    /// Every maximal same-family chain is flattened into a positive and a
    /// negative operand list, each list is regrouped as complex subtrees,
    /// variables, and a single folded constant, and the two are rejoined
    /// with the family's negative operator. `2*x*3 - (y - 1)` becomes
    /// `6*x+1-y`: constants migrate to their family's canonical slot and
    /// fold. `%` does not regroup; normalization recurses through it.
    ///
    /// Operands within a group keep traversal order. Two algebraically equal
    /// expressions whose variables appear in different textual order can
    /// therefore normalize to different renderings; see the test below.
    pub fn normalize(&self) -> Expr {
        match self {
            Self::Integer(_) | Self::Variable(_) => self.clone(),
            Self::Binary(node) => match Family::of(node.op) {
                Some(family) => normalize_chain(self, family),
                None => Self::binary(node.lhs.normalize(), node.rhs.normalize(), node.op),
            },
        }
    }
}

fn normalize_chain(root: &Expr, family: Family) -> Expr {
    let mut positive = Vec::new();
    let mut negative = Vec::new();
    collect_operands(root, family, Polarity::Positive, &mut positive, &mut negative);

    // The leftmost branch never crosses a negative operator's right side, so
    // the positive list cannot be empty.
    let Some(folded) = fold_group(positive, family) else {
        return root.clone();
    };
    match fold_group(negative, family) {
        Some(negated) => Expr::binary(folded, negated, family.negative_op()),
        None => folded,
    }
}

/// Flattens a same-family chain into positive and negative operand lists.
///
/// Polarity flips each time the walk descends into the right branch of the
/// family's negative operator, so `a - (b - c)` collects `a, c` positive and
/// `b` negative. An operand outside the family ends the chain there and is
/// normalized on its own before being collected.
fn collect_operands(
    expr: &Expr,
    family: Family,
    polarity: Polarity,
    positive: &mut Vec<Expr>,
    negative: &mut Vec<Expr>,
) {
    if let Expr::Binary(node) = expr {
        if family.contains(node.op) {
            collect_operands(&node.lhs, family, polarity, positive, negative);
            let rhs_polarity = if node.op == family.negative_op() {
                polarity.flipped()
            } else {
                polarity
            };
            collect_operands(&node.rhs, family, rhs_polarity, positive, negative);
            return;
        }
    }

    let operand = expr.normalize();
    match polarity {
        Polarity::Positive => positive.push(operand),
        Polarity::Negative => negative.push(operand),
    }
}

/// Rebuilds one operand list: constants fold into a single literal, and the
/// groups recombine left-associatively with the positive operator. The
/// additive family orders `(complex)+(vars)+(const)`; the multiplicative
/// family orders `(const)*(vars)*(complex)`. Returns `None` for an empty
/// list.
fn fold_group(operands: Vec<Expr>, family: Family) -> Option<Expr> {
    let positive_op = family.positive_op();

    let mut constant: Option<i32> = None;
    let mut variables: Vec<Expr> = Vec::new();
    let mut complex: Vec<Expr> = Vec::new();
    for operand in operands {
        match operand {
            Expr::Integer(value) => {
                constant = Some(match constant {
                    Some(folded) => family.fold_constants(folded, value),
                    None => value,
                });
            }
            Expr::Variable(_) => variables.push(operand),
            Expr::Binary(_) => complex.push(operand),
        }
    }

    let chain = |items: Vec<Expr>| {
        items
            .into_iter()
            .reduce(|lhs, rhs| Expr::binary(lhs, rhs, positive_op))
    };
    let variables = chain(variables);
    let complex = chain(complex);
    let constant = constant.map(Expr::Integer);

    let ordered = match family {
        Family::Additive => [complex, variables, constant],
        Family::Multiplicative => [constant, variables, complex],
    };
    ordered
        .into_iter()
        .flatten()
        .reduce(|lhs, rhs| Expr::binary(lhs, rhs, positive_op))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(input: &str) -> String {
        Expr::parse(input).unwrap().normalize().to_string()
    }

    #[test]
    fn constants_migrate_and_fold() {
        assert_eq!(normalized("x + (4 + 5)"), "x+9");
        assert_eq!(normalized("4 + x + 5"), "x+9");
    }

    #[test]
    fn subtraction_regroups_by_polarity() {
        assert_eq!(normalized("(x + 4) - (y - 5)"), "x+9-y");
        // Double negation cancels back to positive.
        assert_eq!(normalized("a - (b - c)"), "a+c-b");
    }

    #[test]
    fn multiplicative_order_is_const_vars_complex() {
        assert_eq!(normalized("x * 2 * 3"), "6*x");
        assert_eq!(normalized("x * (a + b) * 4"), "4*x*(a+b)");
    }

    #[test]
    fn division_collects_the_divisor_chain() {
        assert_eq!(normalized("x / y / z"), "x/y*z");
        assert_eq!(normalized("12 / 4"), "12/4");
    }

    #[test]
    fn modulo_is_a_chain_boundary() {
        assert_eq!(normalized("x % (2 + 3)"), "x%5");
        // The additive chain does not reach through the modulo.
        assert_eq!(normalized("1 + x % y + 2"), "x%y+3");
    }

    #[test]
    fn parenthesized_constant_chains_join_the_constant_group() {
        assert_eq!(normalized("x * (2 + 3)"), "5*x");
    }

    #[test]
    fn variable_order_is_traversal_order_not_sorted() {
        // Algebraically equal, canonically different. Documented behavior:
        // operands keep the order the walk finds them in.
        assert_eq!(normalized("b + a"), "b+a");
        assert_eq!(normalized("a + b"), "a+b");
    }

    #[test]
    fn normalize_of_a_leaf_is_identity() {
        assert_eq!(normalized("x"), "x");
        assert_eq!(normalized("42"), "42");
    }
}
