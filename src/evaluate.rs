use crate::expression::{BinOp, Expr};

use thiserror::Error;

/// Result type for evaluation and compiled-program invocation.
pub type EvalResult<T> = Result<T, EvalError>;

/// A runtime arithmetic failure.
///
/// Carries no source position: it is raised while folding values, not while
/// reading text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Division or modulo whose right operand folded to zero.
    #[error("division by zero")]
    DivideByZero,
}

impl BinOp {
    /// Applies the operator to two values.
    ///
    /// Add/sub/mul use 32-bit wraparound; division and modulo truncate toward
    /// zero and fail on a zero divisor. `i32::MIN / -1` wraps like the other
    /// operators rather than faulting.
    pub(crate) fn apply(self, lhs: i32, rhs: i32) -> EvalResult<i32> {
        match self {
            Self::Add => Ok(lhs.wrapping_add(rhs)),
            Self::Sub => Ok(lhs.wrapping_sub(rhs)),
            Self::Mul => Ok(lhs.wrapping_mul(rhs)),
            Self::Div => {
                if rhs == 0 {
                    Err(EvalError::DivideByZero)
                } else {
                    Ok(lhs.wrapping_div(rhs))
                }
            }
            Self::Mod => {
                if rhs == 0 {
                    Err(EvalError::DivideByZero)
                } else {
                    Ok(lhs.wrapping_rem(rhs))
                }
            }
        }
    }
}

impl Expr {
    /// Folds constant subtrees, returning the minimal residual tree.
    ///
    /// Leaves are returned unchanged. A binary node reduces each child that
    /// is constant; when both children fold to integers the operator is
    /// applied and the node becomes a literal. A node with a non-constant
    /// child is rebuilt as-is around the (possibly) folded sibling — no
    /// algebraic identities are applied here, that is [`Expr::normalize`]'s
    /// job. Idempotent.
    ///
    /// Fails only when a division or modulo sees a constant zero divisor;
    /// with a non-constant divisor the node is kept and the check deferred.
    pub fn reduce(&self) -> EvalResult<Expr> {
        match self {
            Self::Integer(_) | Self::Variable(_) => Ok(self.clone()),
            Self::Binary(node) => {
                let lhs = if node.lhs.is_const() {
                    node.lhs.reduce()?
                } else {
                    node.lhs.clone()
                };
                let rhs = if node.rhs.is_const() {
                    node.rhs.reduce()?
                } else {
                    node.rhs.clone()
                };
                if let (Some(l), Some(r)) = (lhs.as_integer(), rhs.as_integer()) {
                    return Ok(Self::Integer(node.op.apply(l, r)?));
                }
                Ok(Self::binary(lhs, rhs, node.op))
            }
        }
    }
}
