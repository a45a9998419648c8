/**
Error types for code generation

Generation itself is mechanical and cannot fail on a checked program; what
can fail is landing the generated sources on disk.
*/
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    /// Writing a generated source file failed
    #[error("Failed to write generated source: {0}")]
    Io(#[from] io::Error),
}

/// Result type for code generation operations
pub type CodegenResult<T> = Result<T, CodegenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_carry_context() {
        let err = CodegenError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(err.to_string().contains("Failed to write generated source"));
    }
}
