// operators.exponent: `a ** b` becomes `Math.pow(a, b)`

use super::{identifier, member};
use crate::ast::{BinaryOp, NodeId, NodeKind};
use crate::module::Module;
use crate::transform::{Plugin, TransformResult, Visit};

pub struct ExponentOperator;

impl Plugin for ExponentOperator {
    type Context = ();

    fn name(&self) -> &'static str {
        "operators.exponent"
    }

    fn description(&self) -> &'static str {
        "Rewrite `**` as a `Math.pow` call"
    }

    fn leave(&self, node: NodeId, module: &mut Module, _cx: &mut ()) -> TransformResult<Visit> {
        let tree = module.tree_mut();
        let (left, right) = match tree.kind(node) {
            NodeKind::Binary {
                op: BinaryOp::Power,
                left,
                right,
            } => (*left, *right),
            _ => return Ok(Visit::Continue),
        };

        let span = tree.span(node);
        let math = identifier(tree, "Math", span);
        let callee = member(tree, math, "pow", span);
        tree.replace(
            node,
            NodeKind::Call {
                callee,
                arguments: vec![left, right],
            },
        );
        Ok(Visit::Continue)
    }
}
