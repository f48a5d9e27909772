//! Common result and error types for the iceasc workspace.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a broken internal invariant (a bug in iceasc), never a
/// problem with the input. Input problems have their own error enums in the
/// crates that detect them.
pub type IceResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in iceasc, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("wire table out of sync");
        assert_eq!(format!("{err}"), "internal error: wire table out of sync");
    }

    #[test]
    fn err_path() {
        let r: IceResult<i32> = Err(InternalError::new("test error"));
        let err = r.err().unwrap();
        assert_eq!(err.message, "test error");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
