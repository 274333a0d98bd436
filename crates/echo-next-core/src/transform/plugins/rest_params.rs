// functions.rest-params: `...rest` becomes a slice of `arguments`

use super::{function_signature, identifier, member, prepend_to_body, set_function_params};
use crate::ast::{DeclKind, NodeId, NodeKind, Span, SyntaxTree};
use crate::module::Module;
use crate::transform::{Plugin, TransformResult, Visit};

/// Rewrites `function f(a, ...rest) {}` as
/// `function f(a) { var rest = Array.prototype.slice.call(arguments, 1); }`.
///
/// Arrow functions have no `arguments` of their own and are left alone;
/// `functions.arrow` runs first in the catalog.
pub struct RestParams;

impl Plugin for RestParams {
    type Context = ();

    fn name(&self) -> &'static str {
        "functions.rest-params"
    }

    fn description(&self) -> &'static str {
        "Replace a rest parameter with a slice of `arguments`"
    }

    fn enter(&self, node: NodeId, module: &mut Module, _cx: &mut ()) -> TransformResult<Visit> {
        let tree = module.tree_mut();
        if matches!(tree.kind(node), NodeKind::ArrowFunction { .. }) {
            return Ok(Visit::Continue);
        }
        let Some((mut params, _)) = function_signature(tree.kind(node)) else {
            return Ok(Visit::Continue);
        };

        let Some(&last) = params.last() else {
            return Ok(Visit::Continue);
        };
        let name = match tree.kind(last) {
            NodeKind::Param {
                name, rest: true, ..
            } => name.clone(),
            _ => return Ok(Visit::Continue),
        };

        params.pop();
        let index = params.len();
        set_function_params(tree, node, params);

        let span = tree.span(last);
        let declaration = slice_arguments(tree, &name, index, span);
        prepend_to_body(tree, node, vec![declaration]);
        Ok(Visit::Continue)
    }
}

/// `var name = Array.prototype.slice.call(arguments, index);`
fn slice_arguments(tree: &mut SyntaxTree, name: &str, index: usize, span: Span) -> NodeId {
    let array = identifier(tree, "Array", span);
    let prototype = member(tree, array, "prototype", span);
    let slice = member(tree, prototype, "slice", span);
    let callee = member(tree, slice, "call", span);
    let arguments = identifier(tree, "arguments", span);
    let start = tree.alloc(NodeKind::Number(index.to_string()), span);
    let init = tree.alloc(
        NodeKind::Call {
            callee,
            arguments: vec![arguments, start],
        },
        span,
    );

    let declarator = tree.alloc(
        NodeKind::VariableDeclarator {
            name: name.to_string(),
            init: Some(init),
        },
        span,
    );
    tree.alloc(
        NodeKind::VariableDeclaration {
            kind: DeclKind::Var,
            declarations: vec![declarator],
        },
        span,
    )
}
