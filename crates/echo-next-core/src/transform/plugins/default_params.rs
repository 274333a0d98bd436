// functions.default-params: parameter defaults become null checks

use super::{function_signature, identifier, prepend_to_body};
use crate::ast::{BinaryOp, NodeId, NodeKind, Span, SyntaxTree};
use crate::module::Module;
use crate::transform::{Plugin, TransformResult, Visit};

/// Rewrites `function f(p = d) {}` as
/// `function f(p) { if (p == null) { p = d; } }`.
///
/// Runs on `enter`, so the moved default expressions are walked as part of
/// the body.
pub struct DefaultParams;

impl Plugin for DefaultParams {
    type Context = ();

    fn name(&self) -> &'static str {
        "functions.default-params"
    }

    fn description(&self) -> &'static str {
        "Replace parameter defaults with `== null` checks at the top of the body"
    }

    fn enter(&self, node: NodeId, module: &mut Module, _cx: &mut ()) -> TransformResult<Visit> {
        let tree = module.tree_mut();
        let Some((params, _)) = function_signature(tree.kind(node)) else {
            return Ok(Visit::Continue);
        };

        let mut checks = Vec::new();
        for param in params {
            let (name, default) = match tree.kind_mut(param) {
                NodeKind::Param { name, default, .. } => match default.take() {
                    Some(default) => (name.clone(), default),
                    None => continue,
                },
                _ => continue,
            };
            let span = tree.span(param);
            checks.push(null_check(tree, &name, default, span));
        }

        if !checks.is_empty() {
            prepend_to_body(tree, node, checks);
        }
        Ok(Visit::Continue)
    }
}

/// `if (name == null) { name = default; }`
fn null_check(tree: &mut SyntaxTree, name: &str, default: NodeId, span: Span) -> NodeId {
    let left = identifier(tree, name, span);
    let right = tree.alloc(NodeKind::Null, span);
    let test = tree.alloc(
        NodeKind::Binary {
            op: BinaryOp::Equal,
            left,
            right,
        },
        span,
    );

    let target = identifier(tree, name, span);
    let assign = tree.alloc(
        NodeKind::Assign {
            target,
            value: default,
        },
        span,
    );
    let statement = tree.alloc(NodeKind::ExpressionStatement { expression: assign }, span);
    let consequent = tree.alloc(
        NodeKind::Block {
            body: vec![statement],
        },
        span,
    );

    tree.alloc(
        NodeKind::If {
            test,
            consequent,
            alternate: None,
        },
        span,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transform::plugins::apply;

    #[test]
    fn test_defaults_in_declaration() {
        let expected = "\
function f(a, b, c) {
  if (b == null) {
    b = 2;
  }
  if (c == null) {
    c = b * 2;
  }
  return a + b + c;
}
";
        assert_eq!(
            apply(DefaultParams, "function f(a, b = 2, c = b * 2) { return a + b + c; }").code,
            expected
        );
    }

    #[test]
    fn test_arrow_expression_body_becomes_block() {
        assert_eq!(
            apply(DefaultParams, "var f = (a = 1) => a;").code,
            "var f = (a) => {\n  if (a == null) {\n    a = 1;\n  }\n  return a;\n};\n"
        );
    }

    #[test]
    fn test_nested_default_is_rewritten() {
        let output = apply(DefaultParams, "function f(g = function (x = 1) { return x; }) {}").code;
        assert!(!output.contains("x = 1)"), "{output}");
        assert!(output.contains("if (x == null)"), "{output}");
    }

    #[test]
    fn test_functions_without_defaults_untouched() {
        assert_eq!(
            apply(DefaultParams, "function f(a) { return a; }").code,
            "function f(a) {\n  return a;\n}\n"
        );
    }
}
