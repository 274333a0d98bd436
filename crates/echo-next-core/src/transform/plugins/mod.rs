/*!
# Built-in plugins

Each plugin lowers one Next-only construct to its Stable equivalent. The
default catalog runs them in an order where earlier rewrites feed later ones:
arrows become function expressions before parameter defaults and rest
parameters are moved into function bodies.
*/

pub mod arrow;
pub mod block_scope;
pub mod concise;
pub mod default_params;
pub mod exponent;
pub mod rest_params;
pub mod shorthand;
pub mod template;

pub use arrow::ArrowFunctions;
pub use block_scope::BlockScope;
pub use concise::ConciseMethods;
pub use default_params::DefaultParams;
pub use exponent::ExponentOperator;
pub use rest_params::RestParams;
pub use shorthand::ShorthandProperties;
pub use template::TemplateLiterals;

use std::sync::{Arc, LazyLock};

use super::sequencer::PluginList;
use super::Pass;
use crate::ast::{NodeId, NodeKind, Span, SyntaxTree};

static CATALOG: LazyLock<PluginList> = LazyLock::new(|| {
    vec![
        Arc::new(ArrowFunctions),
        Arc::new(ConciseMethods),
        Arc::new(DefaultParams),
        Arc::new(RestParams),
        Arc::new(ShorthandProperties),
        Arc::new(TemplateLiterals),
        Arc::new(ExponentOperator),
        Arc::new(BlockScope),
    ]
});

/// The default plugin list, in run order
pub fn catalog() -> PluginList {
    CATALOG.clone()
}

/// Look up a catalog plugin by its name
pub fn by_name(name: &str) -> Option<Arc<dyn Pass>> {
    CATALOG.iter().find(|plugin| plugin.name() == name).cloned()
}

/// Names of the catalog plugins, in run order
pub fn names() -> Vec<&'static str> {
    CATALOG.iter().map(|plugin| plugin.name()).collect()
}

// Node construction shared by the plugins

fn identifier(tree: &mut SyntaxTree, name: &str, span: Span) -> NodeId {
    tree.alloc(NodeKind::Identifier(name.to_string()), span)
}

fn member(tree: &mut SyntaxTree, object: NodeId, property: &str, span: Span) -> NodeId {
    tree.alloc(
        NodeKind::Member {
            object,
            property: property.to_string(),
        },
        span,
    )
}

/// Parameters and body of any function node
fn function_signature(kind: &NodeKind) -> Option<(Vec<NodeId>, NodeId)> {
    match kind {
        NodeKind::FunctionDeclaration { params, body, .. }
        | NodeKind::FunctionExpression { params, body, .. }
        | NodeKind::ArrowFunction { params, body } => Some((params.clone(), *body)),
        _ => None,
    }
}

fn set_function_params(tree: &mut SyntaxTree, function: NodeId, new_params: Vec<NodeId>) {
    match tree.kind_mut(function) {
        NodeKind::FunctionDeclaration { params, .. }
        | NodeKind::FunctionExpression { params, .. }
        | NodeKind::ArrowFunction { params, .. } => *params = new_params,
        _ => {}
    }
}

fn set_function_body(tree: &mut SyntaxTree, function: NodeId, new_body: NodeId) {
    match tree.kind_mut(function) {
        NodeKind::FunctionDeclaration { body, .. }
        | NodeKind::FunctionExpression { body, .. }
        | NodeKind::ArrowFunction { body, .. } => *body = new_body,
        _ => {}
    }
}

/// Return `body` if it is a block, otherwise wrap it as `{ return body; }`
fn ensure_block(tree: &mut SyntaxTree, body: NodeId) -> NodeId {
    if matches!(tree.kind(body), NodeKind::Block { .. }) {
        return body;
    }
    let span = tree.span(body);
    let ret = tree.alloc(
        NodeKind::Return {
            argument: Some(body),
        },
        span,
    );
    tree.alloc(NodeKind::Block { body: vec![ret] }, span)
}

/// Insert statements at the top of a function's body, turning an expression
/// body into a block first
fn prepend_to_body(tree: &mut SyntaxTree, function: NodeId, statements: Vec<NodeId>) {
    let Some((_, body)) = function_signature(tree.kind(function)) else {
        return;
    };
    let block = ensure_block(tree, body);
    if block != body {
        set_function_body(tree, function, block);
    }
    if let NodeKind::Block { body } = tree.kind_mut(block) {
        body.splice(0..0, statements);
    }
}

#[cfg(test)]
pub(crate) fn apply<P>(plugin: P, source: &str) -> crate::module::RenderedModule
where
    P: super::Plugin + 'static,
{
    let mut module = crate::module::Module::new(source).unwrap();
    let plugins: PluginList = vec![Arc::new(plugin)];
    super::run(&mut module, &plugins).unwrap();
    module.render()
}
