/**
Asymmetric unification for the hastack checker

`unify(actual, pattern, env)` is directional pattern matching, not symmetric
equality: a `Var` on the pattern side binds to whatever the actual side
holds; a `Var` on the actual side against a concrete pattern fails like any
other kind mismatch. Two quotes always unify without either body being
inspected; quote compatibility is decided where a quote is evaluated, which
is what lets one block serve differently-shaped call sites.

`unify_effects` extends the same walk to pop/push lists and gives `Multi`
(row) variables their meaning: a `Multi` in a pattern list greedily captures
a prefix of the actual list, leaving exactly as many actual elements as
there are pattern elements after it.
*/
use super::types::{Effect, Type, TypeKind, VarId};
use std::collections::HashMap;

/// What a variable is bound to: a single slot or a run of slots.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Single(Type),
    Row(Vec<Type>),
}

/// Bindings accumulated during one top-level check.
///
/// Always created fresh at a top-level entry point and threaded explicitly;
/// sharing one environment between unrelated checks would leak bindings
/// between them.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    bindings: HashMap<VarId, Binding>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution::default()
    }

    pub fn bind(&mut self, id: VarId, ty: Type) {
        self.bindings.insert(id, Binding::Single(ty));
    }

    pub fn bind_row(&mut self, id: VarId, row: Vec<Type>) {
        self.bindings.insert(id, Binding::Row(row));
    }

    pub fn get(&self, id: VarId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    /// Resolve a single type. `Var` becomes its binding, lists resolve
    /// recursively, everything else (quotes included) is untouched.
    pub fn apply(&self, ty: &Type) -> Type {
        match &ty.kind {
            TypeKind::Var(id) => match self.bindings.get(id) {
                Some(Binding::Single(bound)) => bound.clone(),
                _ => ty.clone(),
            },
            TypeKind::List(elem) => Type::list(self.apply(elem), ty.location.clone()),
            _ => ty.clone(),
        }
    }

    /// Resolve a type into the run of slots it stands for: a bound `Multi`
    /// splices its row, anything else is one slot.
    pub fn expand(&self, ty: &Type) -> Vec<Type> {
        match &ty.kind {
            TypeKind::Multi(id) => match self.bindings.get(id) {
                Some(Binding::Row(row)) => row.clone(),
                _ => vec![ty.clone()],
            },
            _ => vec![self.apply(ty)],
        }
    }

    /// Resolve every slot of an effect, splicing row bindings.
    pub fn apply_effect(&self, effect: &Effect) -> Effect {
        Effect::new(
            effect.pops.iter().flat_map(|t| self.expand(t)).collect(),
            effect.pushes.iter().flat_map(|t| self.expand(t)).collect(),
        )
    }
}

/// Unify `actual` against `pattern`, binding pattern-side variables in `env`.
///
/// Returns the unified type (with the actual side's locations) or `None` on
/// a kind mismatch, the only structural failure at this layer.
pub fn unify(actual: &Type, pattern: &Type, env: &mut Substitution) -> Option<Type> {
    if let TypeKind::Var(id) = pattern.kind {
        env.bind(id, actual.clone());
        return Some(actual.clone());
    }
    match (&actual.kind, &pattern.kind) {
        (TypeKind::Int, TypeKind::Int)
        | (TypeKind::Bool, TypeKind::Bool)
        | (TypeKind::Char, TypeKind::Char)
        | (TypeKind::Multi(_), TypeKind::Multi(_)) => Some(actual.clone()),
        (TypeKind::List(a_elem), TypeKind::List(p_elem)) => {
            let elem = unify(a_elem, p_elem, env)?;
            Some(Type::list(elem, actual.location.clone()))
        }
        // Never inspects either body; evaluation sites re-check quotes
        // against the stack they actually run on.
        (TypeKind::Quote(_), TypeKind::Quote(_)) => Some(actual.clone()),
        _ => None,
    }
}

/// Pairwise-unify two effects, pops then pushes.
pub fn unify_effects(actual: &Effect, pattern: &Effect, env: &mut Substitution) -> Option<Effect> {
    let pops = unify_row(&actual.pops, &pattern.pops, env)?;
    let pushes = unify_row(&actual.pushes, &pattern.pushes, env)?;
    Some(Effect::new(pops, pushes))
}

/// Walk one pattern list over one actual list.
///
/// A `Multi` captures greedily: it takes all but as many trailing actual
/// elements as there are pattern elements after it. If the actual list runs
/// out before the pattern list, the walk stops and returns what it built so
/// far rather than failing.
fn unify_row(actual: &[Type], pattern: &[Type], env: &mut Substitution) -> Option<Vec<Type>> {
    let mut out = Vec::with_capacity(actual.len());
    let mut rest = actual;
    for (i, pat) in pattern.iter().enumerate() {
        if let TypeKind::Multi(id) = pat.kind {
            let remaining = pattern.len() - i - 1;
            let take = rest.len().saturating_sub(remaining);
            let captured = rest[..take].to_vec();
            env.bind_row(id, captured.clone());
            out.extend(captured);
            rest = &rest[take..];
            continue;
        }
        let Some(first) = rest.first() else {
            break;
        };
        out.push(unify(first, pat, env)?);
        rest = &rest[1..];
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, NodeKind};
    use crate::parser::lexer::Location;
    use std::rc::Rc;

    fn loc() -> Location {
        Location::new("<test>", 1, 1)
    }

    fn empty_quote() -> Type {
        let body = Rc::new(Node::new(NodeKind::Expr(Vec::new()), loc()));
        Type::quote(body, loc())
    }

    #[test]
    fn atomic_types_unify_with_themselves() {
        let mut env = Substitution::new();
        for ty in [Type::int(loc()), Type::bool_(loc()), Type::char_(loc())] {
            let unified = unify(&ty, &ty, &mut env).expect("identity unification");
            assert_eq!(unified.kind, ty.kind);
        }
    }

    #[test]
    fn kind_mismatch_fails_in_both_orders() {
        let mut env = Substitution::new();
        assert!(unify(&Type::int(loc()), &Type::bool_(loc()), &mut env).is_none());
        assert!(unify(&Type::bool_(loc()), &Type::int(loc()), &mut env).is_none());
    }

    #[test]
    fn pattern_var_binds_to_any_actual() {
        for actual in [
            Type::int(loc()),
            Type::list(Type::bool_(loc()), loc()),
            empty_quote(),
        ] {
            let mut env = Substitution::new();
            let unified = unify(&actual, &Type::var(7, loc()), &mut env).expect("var binds");
            assert_eq!(unified.kind, actual.kind);
            assert_eq!(env.get(7), Some(&Binding::Single(actual)));
        }
    }

    #[test]
    fn actual_var_against_concrete_pattern_fails() {
        let mut env = Substitution::new();
        assert!(unify(&Type::var(0, loc()), &Type::int(loc()), &mut env).is_none());
    }

    #[test]
    fn lists_unify_recursively() {
        let mut env = Substitution::new();
        let ints = Type::list(Type::int(loc()), loc());
        let of_var = Type::list(Type::var(3, loc()), loc());
        assert!(unify(&ints, &of_var, &mut env).is_some());
        assert_eq!(
            env.get(3),
            Some(&Binding::Single(Type::int(loc())))
        );

        let bools = Type::list(Type::bool_(loc()), loc());
        assert!(unify(&ints, &bools, &mut env).is_none());
    }

    #[test]
    fn quotes_unify_without_body_inspection() {
        let mut env = Substitution::new();
        let a = empty_quote();
        let body = Rc::new(Node::new(
            NodeKind::Expr(vec![Rc::new(Node::new(NodeKind::Add, loc()))]),
            loc(),
        ));
        let b = Type::quote(body, loc());
        assert!(unify(&a, &b, &mut env).is_some());
        assert!(unify(&b, &a, &mut env).is_some());
    }

    #[test]
    fn multi_captures_whole_actual_row() {
        // Pattern [..m] => [..m, Bool] against pop rows of several lengths.
        for n in [0usize, 1, 5] {
            let mut env = Substitution::new();
            let pops: Vec<Type> = (0..n).map(|_| Type::int(loc())).collect();
            let mut pushes = pops.clone();
            pushes.push(Type::bool_(loc()));
            let actual = Effect::new(pops.clone(), pushes);

            let pattern = Effect::new(
                vec![Type::multi(9, loc())],
                vec![Type::multi(9, loc()), Type::bool_(loc())],
            );

            assert!(unify_effects(&actual, &pattern, &mut env).is_some());
            assert_eq!(env.get(9), Some(&Binding::Row(pops.clone())));

            let resolved = env.apply_effect(&pattern);
            assert_eq!(resolved.pops.len(), n);
            assert_eq!(resolved.pushes.len(), n + 1);
            assert_eq!(resolved.pushes.last().map(|t| t.kind.clone()), Some(TypeKind::Bool));
        }
    }

    #[test]
    fn applied_pattern_effect_unifies_against_itself() {
        let mut env = Substitution::new();
        let actual = Effect::new(
            vec![Type::int(loc()), Type::char_(loc())],
            vec![Type::int(loc()), Type::char_(loc()), Type::bool_(loc())],
        );
        let pattern = Effect::new(
            vec![Type::multi(0, loc())],
            vec![Type::multi(0, loc()), Type::var(1, loc())],
        );
        assert!(unify_effects(&actual, &pattern, &mut env).is_some());

        let resolved = env.apply_effect(&pattern);
        let mut fresh = Substitution::new();
        assert!(unify_effects(&resolved, &resolved, &mut fresh).is_some());
    }

    #[test]
    fn effects_truncate_when_actual_is_short() {
        // The walk stops when the actual list is exhausted instead of
        // failing; pinned deliberately.
        let mut env = Substitution::new();
        let actual = Effect::new(vec![Type::int(loc())], Vec::new());
        let pattern = Effect::new(
            vec![Type::int(loc()), Type::bool_(loc()), Type::char_(loc())],
            Vec::new(),
        );
        let unified = unify_effects(&actual, &pattern, &mut env).expect("truncates, not fails");
        assert_eq!(unified.pops.len(), 1);
        assert_eq!(unified.pops[0].kind, TypeKind::Int);
    }

    #[test]
    fn environments_do_not_leak_between_checks() {
        let mut env = Substitution::new();
        assert!(unify(&Type::int(loc()), &Type::var(0, loc()), &mut env).is_some());

        let fresh = Substitution::new();
        assert!(fresh.get(0).is_none());
    }
}
