/**
Abstract-stack simulator for hastack

One recursive walk over the operation tree, threading an abstract stack of
`Type`s in program order: a compile-time shadow of the runtime value stack.
Control-flow operators hand their quotes to the congruence checker; a quote
body is otherwise never inspected until an evaluation site reaches it, and
it is re-simulated at every such site against the stack that is really
there.
*/
use crate::ast::{Node, NodeKind};
use crate::parser::lexer::Location;
use crate::typechecker::congruence::CongruenceMode;
use crate::typechecker::errors::{TypeError, TypeResult};
use crate::typechecker::types::{Type, TypeKind, VarId};
use crate::typechecker::unification::{Substitution, unify};
use std::rc::Rc;

/// The main type checker
pub struct TypeChecker {
    next_var: VarId,
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker { next_var: 0 }
    }

    /// Check a node against a starting abstract stack.
    ///
    /// This is a top-level entry point: it creates the substitution
    /// environment fresh, so bindings never leak in from earlier checks.
    /// The variable counter does persist, which keeps identifiers unique
    /// when an interactive session carries its stack across lines.
    pub fn run(&mut self, node: &Node, stack: Vec<Type>) -> TypeResult<Vec<Type>> {
        let mut env = Substitution::new();
        self.check(node, stack, &mut env)
    }

    pub(crate) fn fresh_var(&mut self, location: &Location) -> Type {
        let id = self.next_var;
        self.next_var += 1;
        Type::var(id, location.clone())
    }

    /// Simulate one node, consuming the stack and returning its new shape.
    pub(crate) fn check(
        &mut self,
        node: &Node,
        mut stack: Vec<Type>,
        env: &mut Substitution,
    ) -> TypeResult<Vec<Type>> {
        match &node.kind {
            NodeKind::Noop => Ok(stack),

            NodeKind::PushInt(_) => {
                stack.push(Type::int(node.location.clone()));
                Ok(stack)
            }

            NodeKind::PushBool(_) => {
                stack.push(Type::bool_(node.location.clone()));
                Ok(stack)
            }

            NodeKind::PushChar(_) => {
                stack.push(Type::char_(node.location.clone()));
                Ok(stack)
            }

            NodeKind::PushList(body) => {
                // Simulate the block on its own empty stack, then fold the
                // results into one running element type.
                let items = self.check(body, Vec::new(), env)?;
                let mut elem = self.fresh_var(&node.location);
                for item in &items {
                    match unify(item, &elem, env) {
                        Some(unified) => elem = unified,
                        None => {
                            return Err(TypeError::HeterogeneousList {
                                location: item.location.clone(),
                            });
                        }
                    }
                }
                stack.push(Type::list(elem, node.location.clone()));
                Ok(stack)
            }

            NodeKind::Add | NodeKind::Sub | NodeKind::Mul | NodeKind::Div => {
                let (a, b) = self.pop_two(node, &mut stack)?;
                self.require(node, "first", &a, &Type::int(node.location.clone()), env)?;
                self.require(node, "second", &b, &Type::int(node.location.clone()), env)?;
                stack.push(Type::int(node.location.clone()));
                Ok(stack)
            }

            NodeKind::Lt | NodeKind::Gt | NodeKind::Lte | NodeKind::Gte => {
                let (a, b) = self.pop_two(node, &mut stack)?;
                self.require(node, "first", &a, &Type::int(node.location.clone()), env)?;
                self.require(node, "second", &b, &Type::int(node.location.clone()), env)?;
                stack.push(Type::bool_(node.location.clone()));
                Ok(stack)
            }

            NodeKind::Eq => {
                // The deeper operand is the pattern: a variable there binds
                // to the top operand, never the reverse.
                let (a, b) = self.pop_two(node, &mut stack)?;
                if unify(&b, &a, env).is_none() {
                    return Err(invalid(node, "second", a.to_string(), &b));
                }
                stack.push(Type::bool_(node.location.clone()));
                Ok(stack)
            }

            NodeKind::Not => {
                let len = stack.len();
                let Some(a) = stack.pop() else {
                    return Err(arity(node, 1, len));
                };
                self.require(node, "first", &a, &Type::bool_(node.location.clone()), env)?;
                stack.push(Type::bool_(node.location.clone()));
                Ok(stack)
            }

            NodeKind::Cons => {
                let (elem, list) = self.pop_two(node, &mut stack)?;
                let pattern = Type::list(elem, node.location.clone());
                if unify(&list, &pattern, env).is_none() {
                    return Err(invalid(node, "second", pattern.to_string(), &list));
                }
                stack.push(list);
                Ok(stack)
            }

            NodeKind::Dup => {
                let Some(top) = stack.last().cloned() else {
                    return Err(arity(node, 1, 0));
                };
                stack.push(top);
                Ok(stack)
            }

            NodeKind::Print => {
                let len = stack.len();
                if stack.pop().is_none() {
                    return Err(arity(node, 1, len));
                }
                Ok(stack)
            }

            NodeKind::PrintType => {
                let Some(top) = stack.last() else {
                    return Err(arity(node, 1, 0));
                };
                // Diagnostic side channel; the stack is untouched.
                println!("(type?) {} {}", top.location, top);
                Ok(stack)
            }

            NodeKind::PushQuote(body) => {
                stack.push(Type::quote(body.clone(), node.location.clone()));
                Ok(stack)
            }

            NodeKind::Eval => {
                let len = stack.len();
                let Some(quote) = stack.pop() else {
                    return Err(arity(node, 1, len));
                };
                let Some(body) = quote_body(&quote) else {
                    return Err(invalid(node, "first", "{...}".to_string(), &quote));
                };
                // The call-site-specific check: the body runs against the
                // remaining real stack, not a fresh one.
                self.check(&body, stack, env)
            }

            NodeKind::If => {
                let len = stack.len();
                let Some(flag) = stack.pop() else {
                    return Err(arity(node, 3, len));
                };
                let Some(else_quote) = stack.pop() else {
                    return Err(arity(node, 3, len));
                };
                let Some(then_quote) = stack.pop() else {
                    return Err(arity(node, 3, len));
                };

                self.require(node, "third", &flag, &Type::bool_(node.location.clone()), env)?;
                let Some(then_body) = quote_body(&then_quote) else {
                    return Err(invalid(node, "first", "{...}".to_string(), &then_quote));
                };
                if quote_body(&else_quote).is_none() {
                    return Err(invalid(node, "second", "{...}".to_string(), &else_quote));
                }

                self.compare(
                    node,
                    &stack,
                    &[&then_quote, &else_quote],
                    0,
                    CongruenceMode::Pairwise,
                    env,
                )?;

                // Congruence already proved the shapes equal, so the
                // then-branch alone determines the result.
                self.check(&then_body, stack, env)
            }

            NodeKind::While => {
                let len = stack.len();
                let Some(body_quote) = stack.pop() else {
                    return Err(arity(node, 2, len));
                };
                let Some(cond_quote) = stack.pop() else {
                    return Err(arity(node, 2, len));
                };

                if quote_body(&cond_quote).is_none() {
                    return Err(invalid(node, "first", "{...}".to_string(), &cond_quote));
                }
                if quote_body(&body_quote).is_none() {
                    return Err(invalid(node, "second", "{...}".to_string(), &body_quote));
                }

                // The condition must reproduce the stack plus one extra
                // slot, and that slot is the loop flag.
                let results = self.compare(
                    node,
                    &stack,
                    &[&cond_quote],
                    1,
                    CongruenceMode::Fixpoint,
                    env,
                )?;
                let flag = results
                    .first()
                    .and_then(|r| r.last())
                    .cloned()
                    .ok_or_else(|| TypeError::IncongruentLoop {
                        location: node.location.clone(),
                        quote: cond_quote.to_string(),
                    })?;
                if unify(&flag, &Type::bool_(node.location.clone()), env).is_none() {
                    return Err(TypeError::LoopFlag {
                        location: node.location.clone(),
                        quote: cond_quote.to_string(),
                        got: flag.to_string(),
                    });
                }

                // The body must reproduce the stack exactly.
                self.compare(node, &stack, &[&body_quote], 0, CongruenceMode::Fixpoint, env)?;

                // Net effect of the whole loop is nothing but the two pops.
                Ok(stack)
            }

            NodeKind::Expr(nodes) => {
                for child in nodes {
                    stack = self.check(child, stack, env)?;
                }
                Ok(stack)
            }
        }
    }

    fn pop_two(&self, node: &Node, stack: &mut Vec<Type>) -> TypeResult<(Type, Type)> {
        let len = stack.len();
        let Some(b) = stack.pop() else {
            return Err(arity(node, 2, len));
        };
        let Some(a) = stack.pop() else {
            return Err(arity(node, 2, len));
        };
        Ok((a, b))
    }

    fn require(
        &self,
        node: &Node,
        position: &'static str,
        actual: &Type,
        pattern: &Type,
        env: &mut Substitution,
    ) -> TypeResult<()> {
        if unify(actual, pattern, env).is_none() {
            return Err(invalid(node, position, pattern.to_string(), actual));
        }
        Ok(())
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn quote_body(ty: &Type) -> Option<Rc<Node>> {
    match &ty.kind {
        TypeKind::Quote(body) => Some(body.clone()),
        _ => None,
    }
}

fn arity(node: &Node, expected: usize, got: usize) -> TypeError {
    TypeError::NotEnoughArguments {
        location: node.location.clone(),
        operator: node.to_string(),
        expected,
        got,
    }
}

fn invalid(node: &Node, position: &'static str, expected: String, got: &Type) -> TypeError {
    TypeError::InvalidArgument {
        location: node.location.clone(),
        operator: node.to_string(),
        position,
        expected,
        got: got.to_string(),
    }
}

/// Check a whole program: it must consume everything it produces.
pub fn check_program(program: &Node) -> TypeResult<()> {
    let stack = TypeChecker::new().run(program, Vec::new())?;
    if let Some(top) = stack.last() {
        return Err(TypeError::UnhandledData {
            location: top.location.clone(),
        });
    }
    Ok(())
}
