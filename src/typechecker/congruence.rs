/**
Congruence proofs for higher-order control flow

Quotes carry no declared signatures, so `if` and `while` stay safe by
simulate-and-compare: each quote is run against a copy of the very stack the
operator sees, and the outcomes are required to agree.

- Pairwise mode (`if`): all quotes must land on stacks of equal depth whose
  slots unify position by position.
- Self mode (`while`): one quote must land back on the entry stack (a
  fixpoint), up to `offset` extra trailing slots the caller accounts for
  (the loop condition's `Bool`).
*/
use crate::ast::Node;
use crate::typechecker::checker::{TypeChecker, quote_body};
use crate::typechecker::errors::{TypeError, TypeResult};
use crate::typechecker::types::{Effect, Type};
use crate::typechecker::unification::{Substitution, unify_effects};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CongruenceMode {
    /// All quotes transform the stack to one shape
    Pairwise,
    /// The quote reproduces the stack it started from
    Fixpoint,
}

impl TypeChecker {
    /// Simulate every quote against its own copy of `stack` and prove the
    /// outcomes congruent. Returns the full simulated stacks (before the
    /// `offset` trailing slots are discounted) so callers can inspect them.
    pub(crate) fn compare(
        &mut self,
        anchor: &Node,
        stack: &[Type],
        quotes: &[&Type],
        offset: usize,
        mode: CongruenceMode,
        env: &mut Substitution,
    ) -> TypeResult<Vec<Vec<Type>>> {
        let mut results = Vec::with_capacity(quotes.len());
        for quote in quotes {
            let Some(body) = quote_body(quote) else {
                return Err(self.mismatch(anchor, quotes, mode));
            };
            results.push(self.check(&body, stack.to_vec(), env)?);
        }

        match mode {
            CongruenceMode::Pairwise => {
                let Some(first) = results.first() else {
                    return Ok(results);
                };
                if first.len() < offset
                    || results.iter().any(|r| r.len() != first.len())
                {
                    return Err(self.mismatch(anchor, quotes, mode));
                }
                let width = first.len() - offset;
                let pattern = Effect::new(Vec::new(), first[..width].to_vec());
                for result in &results[1..] {
                    let actual = Effect::new(Vec::new(), result[..width].to_vec());
                    if unify_effects(&actual, &pattern, env).is_none() {
                        return Err(self.mismatch(anchor, quotes, mode));
                    }
                }
            }

            CongruenceMode::Fixpoint => {
                let Some(result) = results.first() else {
                    return Ok(results);
                };
                if result.len() != stack.len() + offset {
                    return Err(self.mismatch(anchor, quotes, mode));
                }
                // The discounted trailing slots match fresh variables; what
                // they are allowed to be is the caller's concern.
                let mut pattern_pushes = stack.to_vec();
                for _ in 0..offset {
                    pattern_pushes.push(self.fresh_var(&anchor.location));
                }
                let pattern = Effect::new(Vec::new(), pattern_pushes);
                let actual = Effect::new(Vec::new(), result.clone());
                if unify_effects(&actual, &pattern, env).is_none() {
                    return Err(self.mismatch(anchor, quotes, mode));
                }
            }
        }

        Ok(results)
    }

    fn mismatch(&self, anchor: &Node, quotes: &[&Type], mode: CongruenceMode) -> TypeError {
        match mode {
            CongruenceMode::Pairwise => TypeError::IncongruentBranches {
                location: anchor.location.clone(),
                operator: anchor.to_string(),
                sources: quotes
                    .iter()
                    .map(|q| format!("'{}'", q))
                    .collect::<Vec<_>>()
                    .join(" and "),
            },
            CongruenceMode::Fixpoint => TypeError::IncongruentLoop {
                location: anchor.location.clone(),
                quote: quotes
                    .first()
                    .map(|q| q.to_string())
                    .unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::parser::lexer::{Location, lex};
    use crate::parser::parser::Parser;
    use crate::typechecker::types::TypeKind;

    fn loc() -> Location {
        Location::new("<test>", 1, 1)
    }

    /// Parse a program of quote literals and return their types.
    fn quotes(source: &str) -> Vec<Type> {
        let tree = Parser::new(lex("<test>", source)).parse().expect("parses");
        TypeChecker::new()
            .run(&tree, Vec::new())
            .expect("quotes check")
    }

    #[test]
    fn pairwise_accepts_matching_outcomes() {
        let qs = quotes("{1} {2}");
        let refs: Vec<&Type> = qs.iter().collect();
        let mut checker = TypeChecker::new();
        let mut env = Substitution::new();
        let anchor = Node::new(NodeKind::If, loc());
        let results = checker
            .compare(&anchor, &[], &refs, 0, CongruenceMode::Pairwise, &mut env)
            .expect("congruent");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].len(), 1);
    }

    #[test]
    fn pairwise_rejects_different_depths() {
        let qs = quotes("{1 2} {1}");
        let refs: Vec<&Type> = qs.iter().collect();
        let mut checker = TypeChecker::new();
        let mut env = Substitution::new();
        let anchor = Node::new(NodeKind::If, loc());
        let err = checker
            .compare(&anchor, &[], &refs, 0, CongruenceMode::Pairwise, &mut env)
            .unwrap_err();
        assert!(matches!(err, TypeError::IncongruentBranches { .. }));
    }

    #[test]
    fn fixpoint_returns_full_simulated_stack() {
        let qs = quotes("{.}");
        let refs: Vec<&Type> = qs.iter().collect();
        let mut checker = TypeChecker::new();
        let mut env = Substitution::new();
        let anchor = Node::new(NodeKind::While, loc());
        let stack = vec![Type::bool_(loc())];
        let results = checker
            .compare(&anchor, &stack, &refs, 1, CongruenceMode::Fixpoint, &mut env)
            .expect("fixpoint");
        assert_eq!(results[0].len(), 2);
        assert_eq!(results[0][1].kind, TypeKind::Bool);
    }

    #[test]
    fn fixpoint_rejects_shape_changes() {
        let qs = quotes("{1}");
        let refs: Vec<&Type> = qs.iter().collect();
        let mut checker = TypeChecker::new();
        let mut env = Substitution::new();
        let anchor = Node::new(NodeKind::While, loc());
        let err = checker
            .compare(&anchor, &[], &refs, 0, CongruenceMode::Fixpoint, &mut env)
            .unwrap_err();
        assert!(matches!(err, TypeError::IncongruentLoop { .. }));
    }
}
