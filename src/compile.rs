use crate::evaluate::EvalResult;
use crate::expression::{BinOp, Expr};

use log::debug;

/// One step of a compiled program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Instr {
    /// Push an immediate value.
    Const(i32),
    /// Push the argument held in a parameter slot.
    Load(usize),
    /// Pop two values, apply the operator, push the result.
    Apply(BinOp),
}

/// An expression lowered to a flat postorder instruction tape.
///
/// Parameter slots follow the sorted free-variable order of the source
/// expression. Invoking the program is interchangeable with substituting the
/// arguments and reducing: same value out, same division-by-zero failures,
/// for every argument assignment.
#[derive(Clone, Debug)]
pub struct Program {
    params: Vec<String>,
    code: Vec<Instr>,
}

impl Expr {
    /// Lowers this expression into an invocable [`Program`].
    pub fn compile(&self) -> Program {
        Program::compile(self)
    }
}

impl Program {
    pub fn compile(expr: &Expr) -> Program {
        let params = expr.free_vars();
        let mut code = Vec::new();
        emit(expr, &params, &mut code);
        debug!(
            "compiled {} instructions over {} parameters",
            code.len(),
            params.len()
        );
        Program { params, code }
    }

    /// Parameter names in invocation order (lexicographic).
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Runs the program against one argument per parameter slot.
    pub fn call(&self, args: &[i32]) -> EvalResult<i32> {
        assert_eq!(args.len(), self.params.len());

        let mut stack: Vec<i32> = Vec::new();
        for instr in &self.code {
            match *instr {
                Instr::Const(value) => stack.push(value),
                Instr::Load(slot) => stack.push(args[slot]),
                Instr::Apply(op) => {
                    let folded = match (stack.pop(), stack.pop()) {
                        (Some(rhs), Some(lhs)) => op.apply(lhs, rhs)?,
                        _ => panic!("malformed instruction tape"),
                    };
                    stack.push(folded);
                }
            }
        }
        match stack.pop() {
            Some(result) => Ok(result),
            None => panic!("malformed instruction tape"),
        }
    }
}

/// Emits the postorder tape: children first, operator last.
fn emit(expr: &Expr, params: &[String], code: &mut Vec<Instr>) {
    match expr {
        Expr::Integer(value) => code.push(Instr::Const(*value)),
        Expr::Variable(name) => {
            let slot = match params.binary_search_by(|p| p.as_str().cmp(name)) {
                Ok(slot) => slot,
                // `params` is this expression's own free-variable list.
                Err(_) => unreachable!("variable {name} missing from parameter list"),
            };
            code.push(Instr::Load(slot));
        }
        Expr::Binary(node) => {
            emit(&node.lhs, params, code);
            emit(&node.rhs, params, code);
            code.push(Instr::Apply(node.op));
        }
    }
}
