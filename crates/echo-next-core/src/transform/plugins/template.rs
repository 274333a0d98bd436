// strings.template: template literals become string concatenation

use crate::ast::{BinaryOp, NodeId, NodeKind};
use crate::module::Module;
use crate::transform::{Plugin, TransformResult, Visit};

/// Rewrites `` `a${b}c` `` as `"a" + b + "c"`.
///
/// The leading string is kept even when empty so the first `+` is always a
/// string concatenation.
pub struct TemplateLiterals;

impl Plugin for TemplateLiterals {
    type Context = ();

    fn name(&self) -> &'static str {
        "strings.template"
    }

    fn description(&self) -> &'static str {
        "Rewrite template literals as string concatenation"
    }

    fn leave(&self, node: NodeId, module: &mut Module, _cx: &mut ()) -> TransformResult<Visit> {
        let tree = module.tree_mut();
        let (quasis, expressions) = match tree.kind(node) {
            NodeKind::Template {
                quasis,
                expressions,
            } => (quasis.clone(), expressions.clone()),
            _ => return Ok(Visit::Continue),
        };
        let span = tree.span(node);

        let mut quasis = quasis.iter().map(|quasi| quoted(quasi));
        let mut chain = NodeKind::String(quasis.next().unwrap_or_default());
        for expression in expressions {
            let left = tree.alloc(chain, span);
            chain = NodeKind::Binary {
                op: BinaryOp::Add,
                left,
                right: expression,
            };

            match quasis.next() {
                Some(text) if !text.is_empty() => {
                    let left = tree.alloc(chain, span);
                    let right = tree.alloc(NodeKind::String(text), span);
                    chain = NodeKind::Binary {
                        op: BinaryOp::Add,
                        left,
                        right,
                    };
                }
                _ => {}
            }
        }

        tree.replace(node, chain);
        Ok(Visit::Continue)
    }
}

/// Template source text as the raw contents of a double-quoted string
fn quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('`') => out.push('`'),
                Some('$') => out.push('$'),
                // Line continuation
                Some('\n' | '\u{2028}' | '\u{2029}') => {}
                Some('\r') => {
                    chars.next_if_eq(&'\n');
                }
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push_str("\\\\"),
            },
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transform::plugins::apply;

    #[test]
    fn test_substitutions() {
        assert_eq!(
            apply(TemplateLiterals, "var s = `a${x}b${y}`;").code,
            "var s = \"a\" + x + \"b\" + y;\n"
        );
    }

    #[test]
    fn test_leading_empty_string_kept() {
        assert_eq!(
            apply(TemplateLiterals, "var s = `${x}${y}`;").code,
            "var s = \"\" + x + y;\n"
        );
    }

    #[test]
    fn test_no_substitutions() {
        assert_eq!(
            apply(TemplateLiterals, "var s = `plain`;").code,
            "var s = \"plain\";\n"
        );
    }

    #[test]
    fn test_low_precedence_substitution_is_parenthesized() {
        assert_eq!(
            apply(TemplateLiterals, "var s = `${a - b}!`;").code,
            "var s = \"\" + (a - b) + \"!\";\n"
        );
    }

    #[test]
    fn test_nested_templates() {
        assert_eq!(
            apply(TemplateLiterals, "var s = `a${`b${c}`}`;").code,
            "var s = \"a\" + (\"b\" + c);\n"
        );
    }

    #[test]
    fn test_escaping() {
        assert_eq!(quoted("say \"hi\"\nnext"), "say \\\"hi\\\"\\nnext");
        assert_eq!(quoted("\\`tick\\` \\${x}"), "`tick` ${x}");
        assert_eq!(quoted("tab\\t"), "tab\\t");
    }

    #[test]
    fn test_crlf_line_continuation() {
        assert_eq!(quoted("a\\\nb"), "ab");
        assert_eq!(quoted("a\\\r\nb"), "ab");
        assert_eq!(quoted("a\\\rb"), "ab");
        assert_eq!(quoted("a\r\nb"), "a\\r\\nb");
        assert_eq!(
            apply(TemplateLiterals, "var s = `a\\\r\nb`;").code,
            "var s = \"ab\";\n"
        );
    }
}
