/**
Error types and the diagnostic policy switch for the type checker

Every checker failure is a located `TypeError`; the line it displays is the
diagnostic the toolchain prints. `DiagnosticMode` carries the fatal vs.
recoverable policy: batch drivers terminate on the first diagnostic, the
interactive shell keeps the process alive and discards the bad input.
*/
use crate::parser::lexer::Location;
use thiserror::Error;

/// Errors detected by the abstract-stack simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// Fewer abstract-stack items than the operator needs
    #[error(
        "{location} TYPE ERROR: Not enough arguments on the stack for the '{operator}' operator, expected at least {expected}, got {got}"
    )]
    NotEnoughArguments {
        location: Location,
        operator: String,
        expected: usize,
        got: usize,
    },

    /// An operand fails to unify against what the operator requires
    #[error(
        "{location} TYPE ERROR: Invalid type for the {position} argument of the '{operator}' operator, expected '{expected}', got '{got}'"
    )]
    InvalidArgument {
        location: Location,
        operator: String,
        position: &'static str,
        expected: String,
        got: String,
    },

    /// A list literal's elements don't share one unifiable type
    #[error("{location} TYPE ERROR: Attempting to create a list with different types")]
    HeterogeneousList { location: Location },

    /// The branches of an `if` transform the stack to different shapes
    #[error("{location} TYPE ERROR: Branches of the '{operator}' operator are not congruent: {sources}")]
    IncongruentBranches {
        location: Location,
        operator: String,
        sources: String,
    },

    /// A `while` quote fails the fixpoint proof
    #[error(
        "{location} TYPE ERROR: The quote '{quote}' of the 'while' operator does not preserve the shape of the stack"
    )]
    IncongruentLoop { location: Location, quote: String },

    /// A `while` condition preserves the stack but tops it with a non-Bool
    #[error(
        "{location} TYPE ERROR: The condition '{quote}' of the 'while' operator must leave a 'Bool' on top of the stack, got '{got}'"
    )]
    LoopFlag {
        location: Location,
        quote: String,
        got: String,
    },

    /// A whole program finished with values left unconsumed
    #[error("{location} TYPE ERROR: Program finished with unhandled data on the stack")]
    UnhandledData { location: Location },
}

impl TypeError {
    pub fn location(&self) -> &Location {
        match self {
            TypeError::NotEnoughArguments { location, .. }
            | TypeError::InvalidArgument { location, .. }
            | TypeError::HeterogeneousList { location }
            | TypeError::IncongruentBranches { location, .. }
            | TypeError::IncongruentLoop { location, .. }
            | TypeError::LoopFlag { location, .. }
            | TypeError::UnhandledData { location } => location,
        }
    }
}

/// Result type for type checking operations
pub type TypeResult<T> = Result<T, TypeError>;

/// What a driver does with a diagnostic.
///
/// `Fatal` prints the located message and terminates with status 1.
/// `Recoverable` prints the same message and hands the error back so the
/// caller can discard the input and continue. The policy is a plain value
/// each caller passes where it reports; nothing is global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticMode {
    #[default]
    Fatal,
    Recoverable,
}

impl DiagnosticMode {
    /// Print the diagnostic line, then apply the policy.
    pub fn report(self, err: TypeError) -> TypeError {
        eprintln!("{}", err);
        if self == DiagnosticMode::Fatal {
            std::process::exit(1);
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::new("main.stk", 2, 5)
    }

    #[test]
    fn diagnostics_are_one_located_line() {
        let err = TypeError::NotEnoughArguments {
            location: loc(),
            operator: "+".to_string(),
            expected: 2,
            got: 1,
        };
        assert_eq!(
            err.to_string(),
            "main.stk:2:5: TYPE ERROR: Not enough arguments on the stack for the '+' operator, expected at least 2, got 1"
        );

        let err = TypeError::UnhandledData { location: loc() };
        assert_eq!(
            err.to_string(),
            "main.stk:2:5: TYPE ERROR: Program finished with unhandled data on the stack"
        );
    }

    #[test]
    fn recoverable_mode_returns_the_error() {
        let err = TypeError::HeterogeneousList { location: loc() };
        let back = DiagnosticMode::Recoverable.report(err.clone());
        assert_eq!(back, err);
    }
}
