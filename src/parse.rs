use crate::expression::{BinOp, Expr};

use thiserror::Error;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A structural or lexical fault in the input text.
///
/// Every variant carries the 0-based character offset at which the problem
/// was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `-` that is neither a binary operator nor the sign of a literal.
    #[error("don't know what to do with this minus, at position {0}")]
    DanglingMinus(usize),
    /// A character that starts neither an identifier nor an integer literal.
    #[error("variants of parsing exhausted, at position {0}")]
    NoParseVariant(usize),
    #[error("more closing brackets than opening brackets, at position {0}")]
    UnbalancedClose(usize),
    #[error("brackets enclose no value, at position {0}")]
    EmptyBrackets(usize),
    /// An operator with no right operand before a closing bracket.
    #[error("orphaned binary operation with empty right operand, at position {0}")]
    OrphanedOperator(usize),
    #[error("no left operand presented, at position {0}")]
    NoLeftOperand(usize),
    /// Two operands with nothing joining them, e.g. `(9 x)`.
    #[error("no operation between operands, at position {0}")]
    NoOperator(usize),
    #[error("not a valid expression, maybe not enough brackets, at position {0}")]
    Incomplete(usize),
    /// The scan consumed everything but a bracket or operator is still open.
    #[error("expression did not reduce to a single value, at position {0}")]
    NotReduced(usize),
}

impl ParseError {
    /// Character offset into the original input.
    pub fn position(&self) -> usize {
        match *self {
            Self::DanglingMinus(p)
            | Self::NoParseVariant(p)
            | Self::UnbalancedClose(p)
            | Self::EmptyBrackets(p)
            | Self::OrphanedOperator(p)
            | Self::NoLeftOperand(p)
            | Self::NoOperator(p)
            | Self::Incomplete(p)
            | Self::NotReduced(p) => p,
        }
    }
}

/// One cell of the parser's working stack.
///
/// Outside the middle of a push, the stack read from the innermost unmatched
/// `OpenBracket` (or the bottom) upward always alternates
/// `Operand, Orphan, Operand, Orphan, ...` with orphan priorities
/// non-decreasing toward the top. Compaction relies on this to collapse the
/// correct triple first.
enum StackCell {
    OpenBracket,
    Orphan(BinOp),
    Operand(Expr),
}

impl Expr {
    /// Parses `input` into an expression tree.
    ///
    /// A single left-to-right scan pushes brackets, operators, and operands
    /// onto an explicit stack; three compaction routines collapse
    /// operand/operator/operand triples as brackets close, as new operands
    /// arrive, and at the end of input. There is no recursion and no
    /// lookahead beyond one character.
    pub fn parse(input: &str) -> ParseResult<Expr> {
        let chars: Vec<char> = input.chars().collect();
        let mut stack: Vec<StackCell> = Vec::new();

        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '(' => {
                    stack.push(StackCell::OpenBracket);
                    i += 1;
                }
                ')' => {
                    compact_on_close_bracket(&mut stack, i + 1)?;
                    // A discharged bracket leaves a fresh operand on top;
                    // pending priorities resolve exactly as for a pushed
                    // literal, keeping the orphan priorities non-decreasing.
                    compact_on_operand(&mut stack);
                    i += 1;
                }
                '+' => {
                    stack.push(StackCell::Orphan(BinOp::Add));
                    i += 1;
                }
                '*' => {
                    stack.push(StackCell::Orphan(BinOp::Mul));
                    i += 1;
                }
                '/' => {
                    stack.push(StackCell::Orphan(BinOp::Div));
                    i += 1;
                }
                '%' => {
                    stack.push(StackCell::Orphan(BinOp::Mod));
                    i += 1;
                }
                c if is_space(c) => i += 1,
                '-' => match stack.last() {
                    // A completed operand before the minus makes it binary.
                    Some(StackCell::Operand(_)) => {
                        stack.push(StackCell::Orphan(BinOp::Sub));
                        i += 1;
                    }
                    // Otherwise it must begin a signed literal, with no gap
                    // before the first digit.
                    _ => match scan_integer(&chars, i) {
                        Some((value, end)) => {
                            stack.push(StackCell::Operand(Expr::Integer(value)));
                            i = end;
                            compact_on_operand(&mut stack);
                        }
                        None => return Err(ParseError::DanglingMinus(i)),
                    },
                },
                _ => {
                    if let Some((name, end)) = scan_identifier(&chars, i) {
                        stack.push(StackCell::Operand(Expr::Variable(name)));
                        i = end;
                        compact_on_operand(&mut stack);
                    } else if let Some((value, end)) = scan_integer(&chars, i) {
                        stack.push(StackCell::Operand(Expr::Integer(value)));
                        i = end;
                        compact_on_operand(&mut stack);
                    } else {
                        return Err(ParseError::NoParseVariant(i));
                    }
                }
            }
        }

        compact_terminal(&mut stack);
        if stack.len() != 1 {
            return Err(ParseError::Incomplete(chars.len()));
        }
        match stack.pop() {
            Some(StackCell::Operand(expr)) => Ok(expr),
            _ => Err(ParseError::NotReduced(chars.len())),
        }
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0B' | '\r' | '\n')
}

/// Scans an integer literal, optionally signed. A `-` only counts when a
/// digit follows it immediately. Digits accumulate with 32-bit wraparound,
/// so `-2147483648` scans exactly.
fn scan_integer(chars: &[char], from: usize) -> Option<(i32, usize)> {
    let mut i = from;
    let mut sign = 1i32;
    if chars.get(i) == Some(&'-') {
        if !matches!(chars.get(i + 1), Some(c) if c.is_ascii_digit()) {
            return None;
        }
        sign = -1;
        i += 1;
    }

    let digits_from = i;
    let mut acc = 0i32;
    while let Some(d) = chars.get(i).and_then(|c| c.to_digit(10)) {
        acc = acc.wrapping_mul(10).wrapping_add(d as i32);
        i += 1;
    }
    if i == digits_from {
        return None;
    }
    Some((acc.wrapping_mul(sign), i))
}

/// Scans an identifier: an alphabetic character followed by alphanumerics.
fn scan_identifier(chars: &[char], from: usize) -> Option<(String, usize)> {
    if !chars.get(from).is_some_and(|c| c.is_alphabetic()) {
        return None;
    }
    let mut i = from + 1;
    while chars
        .get(i)
        .is_some_and(|c| c.is_alphabetic() || c.is_ascii_digit())
    {
        i += 1;
    }
    Some((chars[from..i].iter().collect(), i))
}

/// Drains every pending operator inside the bracket being closed, then
/// discharges the matching `OpenBracket`, leaving the enclosed expression as
/// a single operand cell.
fn compact_on_close_bracket(stack: &mut Vec<StackCell>, position: usize) -> ParseResult<()> {
    loop {
        let rhs = match stack.pop() {
            None => return Err(ParseError::UnbalancedClose(position)),
            Some(StackCell::OpenBracket) => return Err(ParseError::EmptyBrackets(position)),
            Some(StackCell::Orphan(_)) => return Err(ParseError::OrphanedOperator(position)),
            Some(StackCell::Operand(expr)) => expr,
        };
        match stack.pop() {
            None => return Err(ParseError::UnbalancedClose(position)),
            Some(StackCell::OpenBracket) => {
                // Bracket discharged; its content stays as one operand.
                stack.push(StackCell::Operand(rhs));
                return Ok(());
            }
            Some(StackCell::Operand(_)) => return Err(ParseError::NoOperator(position)),
            Some(StackCell::Orphan(op)) => match stack.pop() {
                Some(StackCell::Operand(lhs)) => {
                    stack.push(StackCell::Operand(Expr::binary(lhs, rhs, op)));
                }
                _ => return Err(ParseError::NoLeftOperand(position)),
            },
        }
    }
}

/// Incremental precedence resolution, run after every operand push.
///
/// While the top of the stack reads `a op1 b op2 c` with `op1` binding at
/// least as tightly as `op2`, the `a op1 b` triple collapses and the newest
/// operator and operand are pushed back, keeping orphan priorities
/// non-decreasing toward the top.
fn compact_on_operand(stack: &mut Vec<StackCell>) {
    use StackCell::{Operand, Orphan};

    while stack.len() >= 5 {
        let n = stack.len();
        match &stack[n - 5..] {
            [Operand(_), Orphan(prev), Operand(_), Orphan(newest), Operand(_)]
                if prev.priority() >= newest.priority() => {}
            _ => break,
        }
        let top = stack.pop();
        let pending_op = stack.pop();
        let mid = stack.pop();
        let prev_op = stack.pop();
        let first = stack.pop();
        if let (
            Some(Operand(lhs)),
            Some(Orphan(op)),
            Some(Operand(rhs)),
            Some(Orphan(pending)),
            Some(Operand(newest)),
        ) = (first, prev_op, mid, pending_op, top)
        {
            stack.push(Operand(Expr::binary(lhs, rhs, op)));
            stack.push(Orphan(pending));
            stack.push(Operand(newest));
        }
    }
}

/// Collapses trailing `operand operator operand` triples once the scan is
/// done. Priorities are already non-decreasing toward the top, so plain
/// right-to-left collapsing yields the correctly precedenced tree.
fn compact_terminal(stack: &mut Vec<StackCell>) {
    use StackCell::{Operand, Orphan};

    while stack.len() >= 3 {
        let n = stack.len();
        if !matches!(&stack[n - 3..], [Operand(_), Orphan(_), Operand(_)]) {
            break;
        }
        let (Some(Operand(rhs)), Some(Orphan(op)), Some(Operand(lhs))) =
            (stack.pop(), stack.pop(), stack.pop())
        else {
            break;
        };
        stack.push(Operand(Expr::binary(lhs, rhs, op)));
    }
}
