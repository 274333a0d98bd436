// Self-check of generated code against the stable dialect

use crate::module::{Diagnostic, Location};
use crate::parser::{EchoParser, Parser};

/// Diagnostic kind for generated code the stable parser rejects
pub const OUTPUT_VALIDATION_FAILURE: &str = "output-validation-failure";

/// Parse `code` with the strict stable parser. A failure is returned as a
/// diagnostic; its column is converted to the 0-based convention used by
/// node spans.
pub fn validate(code: &str) -> Option<Diagnostic> {
    match EchoParser::strict().parse(code) {
        Ok(_) => {
            tracing::debug!(bytes = code.len(), "output validated");
            None
        }
        Err(e) => {
            tracing::debug!(line = e.line, column = e.column, error = %e.message, "output failed validation");
            Some(Diagnostic::new(
                OUTPUT_VALIDATION_FAILURE,
                e.message,
                Location::new(e.line, e.column.saturating_sub(1)),
            ))
        }
    }
}
