/**
Tree-walking interpreter for hastack

Evaluates a checked program directly over runtime `Value`s. The REPL, the
`run` command and the step debugger all drive this one evaluator. Printed
values are buffered so each front end controls presentation, and a running
(popped, pushed) count is kept for the shell's per-line summary.

The checker guarantees operand shapes before anything reaches this module,
but the evaluator stays total anyway: impossible states surface as
`RuntimeError`, never as a panic.
*/
use crate::ast::{Node, NodeKind};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// A runtime value on the data stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Char(char),
    List(Vec<Value>),
    Quote(Rc<Node>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Quote(body) => write!(f, "{}", body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("RUNTIME ERROR: stack underflow in '{operator}'")]
    StackUnderflow { operator: String },

    #[error("RUNTIME ERROR: unexpected operand for '{operator}'")]
    CorruptStack { operator: String },

    #[error("RUNTIME ERROR: division by zero")]
    DivisionByZero,
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Running totals of stack traffic for one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub popped: usize,
    pub pushed: usize,
}

/// Evaluate a node against the value stack.
pub fn eval(
    node: &Node,
    stack: &mut Vec<Value>,
    counts: &mut Counts,
    output: &mut Vec<String>,
) -> RuntimeResult<()> {
    match &node.kind {
        NodeKind::Noop | NodeKind::PrintType => Ok(()),

        NodeKind::PushInt(n) => {
            stack.push(Value::Int(*n));
            counts.pushed += 1;
            Ok(())
        }

        NodeKind::PushBool(b) => {
            stack.push(Value::Bool(*b));
            counts.pushed += 1;
            Ok(())
        }

        NodeKind::PushChar(c) => {
            stack.push(Value::Char(*c));
            counts.pushed += 1;
            Ok(())
        }

        NodeKind::PushList(body) => {
            let mut items = Vec::new();
            eval(body, &mut items, counts, output)?;
            stack.push(Value::List(items));
            counts.pushed += 1;
            Ok(())
        }

        NodeKind::PushQuote(body) => {
            stack.push(Value::Quote(body.clone()));
            counts.pushed += 1;
            Ok(())
        }

        NodeKind::Eval => {
            let body = pop_quote(node, stack)?;
            counts.popped += 1;
            eval(&body, stack, counts, output)
        }

        NodeKind::Add => int_binop(node, stack, counts, |a, b| Ok(Value::Int(a + b))),
        NodeKind::Sub => int_binop(node, stack, counts, |a, b| Ok(Value::Int(a - b))),
        NodeKind::Mul => int_binop(node, stack, counts, |a, b| Ok(Value::Int(a * b))),
        NodeKind::Div => int_binop(node, stack, counts, |a, b| {
            if b == 0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Int(a / b))
            }
        }),

        NodeKind::Lt => int_binop(node, stack, counts, |a, b| Ok(Value::Bool(a < b))),
        NodeKind::Gt => int_binop(node, stack, counts, |a, b| Ok(Value::Bool(a > b))),
        NodeKind::Lte => int_binop(node, stack, counts, |a, b| Ok(Value::Bool(a <= b))),
        NodeKind::Gte => int_binop(node, stack, counts, |a, b| Ok(Value::Bool(a >= b))),

        NodeKind::Eq => {
            let b = pop(node, stack)?;
            let a = pop(node, stack)?;
            stack.push(Value::Bool(a == b));
            counts.popped += 2;
            counts.pushed += 1;
            Ok(())
        }

        NodeKind::Not => {
            let a = pop_bool(node, stack)?;
            stack.push(Value::Bool(!a));
            counts.popped += 1;
            counts.pushed += 1;
            Ok(())
        }

        NodeKind::Cons => {
            let list = pop_list(node, stack)?;
            let elem = pop(node, stack)?;
            let mut items = Vec::with_capacity(list.len() + 1);
            items.push(elem);
            items.extend(list);
            stack.push(Value::List(items));
            counts.popped += 2;
            counts.pushed += 1;
            Ok(())
        }

        NodeKind::Dup => {
            let a = pop(node, stack)?;
            stack.push(a.clone());
            stack.push(a);
            counts.popped += 1;
            counts.pushed += 2;
            Ok(())
        }

        NodeKind::Print => {
            let a = pop(node, stack)?;
            output.push(a.to_string());
            counts.popped += 1;
            Ok(())
        }

        NodeKind::If => {
            let flag = pop_bool(node, stack)?;
            let else_body = pop_quote(node, stack)?;
            let then_body = pop_quote(node, stack)?;
            counts.popped += 3;
            if flag {
                eval(&then_body, stack, counts, output)
            } else {
                eval(&else_body, stack, counts, output)
            }
        }

        NodeKind::While => {
            let body = pop_quote(node, stack)?;
            let cond = pop_quote(node, stack)?;
            counts.popped += 2;
            loop {
                eval(&cond, stack, counts, output)?;
                let flag = pop_bool(node, stack)?;
                counts.popped += 1;
                if !flag {
                    break;
                }
                eval(&body, stack, counts, output)?;
            }
            Ok(())
        }

        NodeKind::Expr(nodes) => {
            for child in nodes {
                eval(child, stack, counts, output)?;
            }
            Ok(())
        }
    }
}

fn pop(node: &Node, stack: &mut Vec<Value>) -> RuntimeResult<Value> {
    stack.pop().ok_or_else(|| RuntimeError::StackUnderflow {
        operator: node.to_string(),
    })
}

fn pop_bool(node: &Node, stack: &mut Vec<Value>) -> RuntimeResult<bool> {
    match pop(node, stack)? {
        Value::Bool(b) => Ok(b),
        _ => Err(RuntimeError::CorruptStack {
            operator: node.to_string(),
        }),
    }
}

fn pop_list(node: &Node, stack: &mut Vec<Value>) -> RuntimeResult<Vec<Value>> {
    match pop(node, stack)? {
        Value::List(items) => Ok(items),
        _ => Err(RuntimeError::CorruptStack {
            operator: node.to_string(),
        }),
    }
}

fn pop_quote(node: &Node, stack: &mut Vec<Value>) -> RuntimeResult<Rc<Node>> {
    match pop(node, stack)? {
        Value::Quote(body) => Ok(body),
        _ => Err(RuntimeError::CorruptStack {
            operator: node.to_string(),
        }),
    }
}

fn int_binop(
    node: &Node,
    stack: &mut Vec<Value>,
    counts: &mut Counts,
    op: impl FnOnce(i64, i64) -> RuntimeResult<Value>,
) -> RuntimeResult<()> {
    let b = match pop(node, stack)? {
        Value::Int(n) => n,
        _ => {
            return Err(RuntimeError::CorruptStack {
                operator: node.to_string(),
            });
        }
    };
    let a = match pop(node, stack)? {
        Value::Int(n) => n,
        _ => {
            return Err(RuntimeError::CorruptStack {
                operator: node.to_string(),
            });
        }
    };
    stack.push(op(a, b)?);
    counts.popped += 2;
    counts.pushed += 1;
    Ok(())
}
