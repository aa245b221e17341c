use std::collections::{BTreeSet, HashMap};
use std::fmt;

use once_cell::unsync::OnceCell;

/// Binary operator of an expression node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    /// Binding strength; higher binds tighter.
    pub fn priority(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::Mod => 7,
        }
    }

    /// Whether swapping the operands leaves the result unchanged.
    pub fn commutes(self) -> bool {
        matches!(self, Self::Add | Self::Mul)
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Mod => '%',
        }
    }
}

/// An arithmetic expression over integers and free variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Integer(i32),
    Variable(String),
    Binary(Box<BinaryExpr>),
}

/// An operator applied to two sub-expressions.
#[derive(Clone, Debug)]
pub struct BinaryExpr {
    pub lhs: Expr,
    pub rhs: Expr,
    pub op: BinOp,
    // Computed on first query; a node never changes after construction.
    is_const: OnceCell<bool>,
}

impl PartialEq for BinaryExpr {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.lhs == other.lhs && self.rhs == other.rhs
    }
}

impl Eq for BinaryExpr {}

impl Expr {
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn binary(lhs: Expr, rhs: Expr, op: BinOp) -> Self {
        Self::Binary(Box::new(BinaryExpr {
            lhs,
            rhs,
            op,
            is_const: OnceCell::new(),
        }))
    }

    /// Whether the expression contains no variables.
    pub fn is_const(&self) -> bool {
        match self {
            Self::Integer(_) => true,
            Self::Variable(_) => false,
            Self::Binary(node) => *node
                .is_const
                .get_or_init(|| node.lhs.is_const() && node.rhs.is_const()),
        }
    }

    /// The raw value of an [`Expr::Integer`] leaf.
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Names of the free variables, sorted and de-duplicated.
    ///
    /// The order is lexicographic rather than order of first appearance, so
    /// it is stable under regrouping; compiled programs use it to assign
    /// parameter slots.
    pub fn free_vars(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.collect_vars(&mut names);
        names.into_iter().collect()
    }

    fn collect_vars(&self, names: &mut BTreeSet<String>) {
        match self {
            Self::Integer(_) => {}
            Self::Variable(name) => {
                names.insert(name.clone());
            }
            Self::Binary(node) => {
                node.lhs.collect_vars(names);
                node.rhs.collect_vars(names);
            }
        }
    }

    /// Replaces every variable present in `bindings` with a copy of its
    /// mapped expression.
    ///
    /// Returns a structurally new tree; constant-ness is recomputed lazily in
    /// the result, since substitution can turn a non-constant subtree
    /// constant. No folding happens here, see [`Expr::reduce`].
    pub fn substitute(&self, bindings: &HashMap<String, Expr>) -> Expr {
        match self {
            Self::Integer(value) => Self::Integer(*value),
            Self::Variable(name) => match bindings.get(name) {
                Some(replacement) => replacement.clone(),
                None => Self::Variable(name.clone()),
            },
            Self::Binary(node) => Self::binary(
                node.lhs.substitute(bindings),
                node.rhs.substitute(bindings),
                node.op,
            ),
        }
    }
}

impl fmt::Display for Expr {
    /// Renders back to parseable text. A child is parenthesized only when
    /// its operator binds strictly weaker than its parent's; equal-priority
    /// chains are always built left-associatively, so omitting their parens
    /// never changes how the text re-parses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Variable(name) => f.write_str(name),
            Self::Binary(node) => {
                write_child(f, &node.lhs, node.op)?;
                write!(f, "{}", node.op.symbol())?;
                write_child(f, &node.rhs, node.op)
            }
        }
    }
}

fn write_child(f: &mut fmt::Formatter<'_>, child: &Expr, parent: BinOp) -> fmt::Result {
    match child {
        Expr::Binary(node) if node.op.priority() < parent.priority() => {
            write!(f, "({child})")
        }
        _ => write!(f, "{child}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_flag_memoized_per_node() {
        let expr = Expr::binary(Expr::Integer(1), Expr::Integer(2), BinOp::Add);
        assert!(expr.is_const());
        assert!(expr.is_const());

        let expr = Expr::binary(Expr::variable("x"), Expr::Integer(2), BinOp::Mul);
        assert!(!expr.is_const());
    }

    #[test]
    fn free_vars_sorted_and_unique() {
        let expr = Expr::binary(
            Expr::binary(Expr::variable("z"), Expr::variable("a"), BinOp::Add),
            Expr::binary(Expr::variable("z"), Expr::Integer(3), BinOp::Mul),
            BinOp::Sub,
        );
        assert_eq!(expr.free_vars(), ["a", "z"]);
    }

    #[test]
    fn render_parenthesizes_weaker_children_only() {
        let sum = Expr::binary(Expr::variable("a"), Expr::variable("b"), BinOp::Add);
        let scaled = Expr::binary(sum.clone(), Expr::Integer(2), BinOp::Mul);
        assert_eq!(scaled.to_string(), "(a+b)*2");

        let shifted = Expr::binary(sum, Expr::Integer(2), BinOp::Sub);
        assert_eq!(shifted.to_string(), "a+b-2");
    }

    #[test]
    fn substitute_rebuilds_and_leaves_unbound_names() {
        let expr = Expr::binary(Expr::variable("x"), Expr::variable("y"), BinOp::Add);
        let bindings = HashMap::from([("x".to_string(), Expr::Integer(7))]);
        let substituted = expr.substitute(&bindings);
        assert_eq!(substituted.to_string(), "7+y");
        // The source tree is untouched.
        assert_eq!(expr.to_string(), "x+y");
    }

    #[test]
    fn substitution_can_close_an_open_tree() {
        let expr = Expr::binary(Expr::variable("x"), Expr::Integer(1), BinOp::Add);
        assert!(!expr.is_const());
        let bindings = HashMap::from([("x".to_string(), Expr::Integer(41))]);
        assert!(expr.substitute(&bindings).is_const());
    }
}
