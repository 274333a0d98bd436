// declarations.block-scope: `let` and `const` become `var`

use crate::ast::{DeclKind, NodeId, NodeKind};
use crate::module::Module;
use crate::transform::{Plugin, TransformResult, Visit};

/// Diagnostic kind for declarations whose scope widens when rewritten
pub const BLOCK_SCOPE_HOISTED: &str = "block-scope-hoisted";

/// Rewrites `let` and `const` declarations as `var`.
///
/// A declaration nested in a block that is not a function body now leaks out
/// of that block; those get a `block-scope-hoisted` warning.
pub struct BlockScope;

impl Plugin for BlockScope {
    type Context = ();

    fn name(&self) -> &'static str {
        "declarations.block-scope"
    }

    fn description(&self) -> &'static str {
        "Rewrite `let` and `const` as `var`, warning when a declaration leaves its block"
    }

    fn enter(&self, node: NodeId, module: &mut Module, _cx: &mut ()) -> TransformResult<Visit> {
        let (keyword, names) = match module.tree().kind(node) {
            NodeKind::VariableDeclaration {
                kind: kind @ (DeclKind::Let | DeclKind::Const),
                declarations,
            } => (kind.keyword(), declared_names(module, declarations)),
            _ => return Ok(Visit::Continue),
        };

        if is_nested_in_block(module, node) {
            tracing::debug!(%keyword, %names, "block-scoped declaration hoisted");
            module.warn(
                node,
                BLOCK_SCOPE_HOISTED,
                format!("`{keyword}` declaration of {names} is hoisted out of its block"),
            );
        }

        if let NodeKind::VariableDeclaration { kind, .. } = module.tree_mut().kind_mut(node) {
            *kind = DeclKind::Var;
        }
        Ok(Visit::Continue)
    }
}

fn declared_names(module: &Module, declarations: &[NodeId]) -> String {
    declarations
        .iter()
        .filter_map(|id| match module.tree().kind(*id) {
            NodeKind::VariableDeclarator { name, .. } => Some(format!("`{name}`")),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether the nearest statement container is something other than a
/// function body or the program
fn is_nested_in_block(module: &Module, node: NodeId) -> bool {
    let tree = module.tree();
    for ancestor in module.ancestors(node) {
        match tree.kind(ancestor) {
            NodeKind::Program { .. } => return false,
            kind if kind.is_function() => return false,
            NodeKind::Block { .. } => {
                return !module
                    .parent(ancestor)
                    .is_some_and(|parent| tree.kind(parent).is_function());
            }
            NodeKind::If { .. } | NodeKind::While { .. } => return true,
            _ => {}
        }
    }
    false
}
