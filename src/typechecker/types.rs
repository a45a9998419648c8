/// Type model for the hastack checker
///
/// A `Type` is an abstract-stack slot: atomic `Int`/`Bool`/`Char`, a `List`
/// of one element type, a `Quote` carrying its *unchecked* source block, a
/// type variable, or a row variable standing for an unknown-length run of
/// slots. Every type remembers the location that introduced it; diagnostics
/// and the residual-stack report depend on that, not on structural identity.
use crate::ast::Node;
use crate::parser::lexer::Location;
use std::fmt;
use std::rc::Rc;

pub type VarId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Int,
    Bool,
    Char,
    List(Box<Type>),
    /// A quote's type is its unchecked body, re-simulated at every
    /// evaluation site; it has no precomputed signature.
    Quote(Rc<Node>),
    Var(VarId),
    Multi(VarId),
}

impl Type {
    pub fn int(location: Location) -> Self {
        Type {
            kind: TypeKind::Int,
            location,
        }
    }

    pub fn bool_(location: Location) -> Self {
        Type {
            kind: TypeKind::Bool,
            location,
        }
    }

    pub fn char_(location: Location) -> Self {
        Type {
            kind: TypeKind::Char,
            location,
        }
    }

    pub fn list(elem: Type, location: Location) -> Self {
        Type {
            kind: TypeKind::List(Box::new(elem)),
            location,
        }
    }

    pub fn quote(body: Rc<Node>, location: Location) -> Self {
        Type {
            kind: TypeKind::Quote(body),
            location,
        }
    }

    pub fn var(id: VarId, location: Location) -> Self {
        Type {
            kind: TypeKind::Var(id),
            location,
        }
    }

    pub fn multi(id: VarId, location: Location) -> Self {
        Type {
            kind: TypeKind::Multi(id),
            location,
        }
    }
}

fn pretty_var(id: VarId) -> String {
    match u8::try_from(id) {
        Ok(n) if n < 26 => ((b'a' + n) as char).to_string(),
        _ => format!("v{}", id),
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Int => write!(f, "Int"),
            TypeKind::Bool => write!(f, "Bool"),
            TypeKind::Char => write!(f, "Char"),
            TypeKind::List(elem) => write!(f, "{} List", elem),
            TypeKind::Quote(body) => write!(f, "{}", body),
            TypeKind::Var(id) => write!(f, "{}", pretty_var(*id)),
            TypeKind::Multi(id) => write!(f, "..{}", pretty_var(*id)),
        }
    }
}

/// A pair of pop/push lists describing a stack transformation. Only the
/// congruence checker reasons in effects; quotes never own one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Effect {
    pub pops: Vec<Type>,
    pub pushes: Vec<Type>,
}

impl Effect {
    pub fn new(pops: Vec<Type>, pushes: Vec<Type>) -> Self {
        Effect { pops, pushes }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |types: &[Type]| {
            types
                .iter()
                .map(Type::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(f, "[{}] => [{}]", join(&self.pops), join(&self.pushes))
    }
}
