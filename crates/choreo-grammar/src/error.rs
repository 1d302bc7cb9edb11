use std::fmt;

/// A token the parsers skipped.
///
/// Both grammars are tolerant: nothing here ever aborts a parse. Diagnostics
/// only describe what was ignored so callers can surface it (the machine logs
/// them at debug level).
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Byte offset of the offending token in the parsed source.
    pub offset: usize,
    /// The token as written.
    pub token: String,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(offset: usize, token: impl Into<String>, msg: impl Into<String>) -> Self {
        Self { offset, token: token.into(), message: msg.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped {:?} at byte {}: {}", self.token, self.offset, self.message)
    }
}

impl std::error::Error for Diagnostic {}
