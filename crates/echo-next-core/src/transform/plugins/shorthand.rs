// objects.shorthand: `{ a }` becomes `{ a: a }`

use crate::ast::{NodeId, NodeKind};
use crate::module::Module;
use crate::transform::{Plugin, TransformResult, Visit};

pub struct ShorthandProperties;

impl Plugin for ShorthandProperties {
    type Context = ();

    fn name(&self) -> &'static str {
        "objects.shorthand"
    }

    fn description(&self) -> &'static str {
        "Spell out shorthand object properties"
    }

    fn enter(&self, node: NodeId, module: &mut Module, _cx: &mut ()) -> TransformResult<Visit> {
        if let NodeKind::Property { shorthand, .. } = module.tree_mut().kind_mut(node) {
            *shorthand = false;
        }
        Ok(Visit::Continue)
    }
}
