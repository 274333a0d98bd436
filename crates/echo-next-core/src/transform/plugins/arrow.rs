// functions.arrow: arrow functions become function expressions

use std::collections::HashSet;

use super::{ensure_block, member};
use crate::ast::{NodeId, NodeKind};
use crate::module::Module;
use crate::transform::{Plugin, TransformResult, Visit};

/// Rewrites `(a) => e` as `function (a) { return e; }`.
///
/// An arrow that uses the surrounding `this`, directly or through nested
/// arrows, is bound explicitly: `function (a) { ... }.bind(this)`.
pub struct ArrowFunctions;

impl Plugin for ArrowFunctions {
    /// Arrows whose body refers to a lexical `this`
    type Context = HashSet<NodeId>;

    fn name(&self) -> &'static str {
        "functions.arrow"
    }

    fn description(&self) -> &'static str {
        "Rewrite arrow functions as function expressions, binding `this` where used"
    }

    fn enter(&self, node: NodeId, module: &mut Module, lexical_this: &mut HashSet<NodeId>) -> TransformResult<Visit> {
        if !matches!(module.tree().kind(node), NodeKind::This) {
            return Ok(Visit::Continue);
        }

        for ancestor in module.ancestors(node) {
            match module.tree().kind(ancestor) {
                NodeKind::ArrowFunction { .. } => {
                    lexical_this.insert(ancestor);
                }
                kind if kind.is_function() => break,
                _ => {}
            }
        }

        Ok(Visit::Continue)
    }

    // Children go first so nested arrows are already rewritten
    fn leave(&self, node: NodeId, module: &mut Module, lexical_this: &mut HashSet<NodeId>) -> TransformResult<Visit> {
        let tree = module.tree_mut();
        let (params, body) = match tree.kind(node) {
            NodeKind::ArrowFunction { params, body } => (params.clone(), *body),
            _ => return Ok(Visit::Continue),
        };

        let span = tree.span(node);
        let body = ensure_block(tree, body);
        let function = NodeKind::FunctionExpression {
            name: None,
            params,
            body,
        };

        if lexical_this.contains(&node) {
            let function = tree.alloc(function, span);
            let callee = member(tree, function, "bind", span);
            let this = tree.alloc(NodeKind::This, span);
            tree.replace(
                node,
                NodeKind::Call {
                    callee,
                    arguments: vec![this],
                },
            );
        } else {
            tree.replace(node, function);
        }

        Ok(Visit::Continue)
    }
}
