// Stable dialect restrictions, applied after a successful parse

use super::ParseError;
use crate::ast::SyntaxTree;

/// Reject the first Next-only construct in source order
pub(super) fn check_stable(tree: &SyntaxTree) -> Result<(), ParseError> {
    for id in tree.reachable() {
        if let Some(feature) = tree.kind(id).next_only_feature() {
            let start = tree.span(id).start;
            return Err(ParseError::new(
                format!("{feature} not supported by the stable dialect"),
                start.line,
                start.column + 1,
            ));
        }
    }
    Ok(())
}
