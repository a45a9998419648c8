/// Type checker for hastack
///
/// This module implements stack-effect checking with:
/// - An abstract-stack simulation of every operation
/// - Asymmetric unification with row polymorphism
/// - Congruence proofs for `if` branches and `while` fixpoints
/// - Deferred, call-site-specific checking of quote bodies
pub mod checker;
pub mod congruence;
pub mod errors;
pub mod types;
pub mod unification;

pub use checker::{TypeChecker, check_program};
pub use errors::{DiagnosticMode, TypeError, TypeResult};
pub use types::{Effect, Type, TypeKind};
pub use unification::{Substitution, unify, unify_effects};
