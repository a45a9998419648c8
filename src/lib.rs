/// hastack - a concatenative stack language and its toolchain
///
/// This crate implements:
/// - A regex-driven lexer and a macro-expanding parser
/// - A stack-effect type checker: abstract-stack simulation, asymmetric
///   unification with row polymorphism, and congruence proofs for the
///   higher-order control-flow operators
/// - A tree-walking interpreter, an interactive shell and a step debugger
/// - C and Go code generation
pub mod ast;
pub mod codegen;
pub mod debugger;
pub mod interp;
pub mod parser;
pub mod repl;
pub mod typechecker;

pub use ast::{Node, NodeKind};
pub use parser::{Location, MacroTable, ParseError, Parser, Token, TokenKind, lex};
pub use typechecker::{
    DiagnosticMode, Type, TypeChecker, TypeError, TypeKind, TypeResult, check_program,
};
