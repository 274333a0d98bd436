// objects.concise: `m() {}` becomes `m: function () {}`

use crate::ast::{NodeId, NodeKind};
use crate::module::Module;
use crate::transform::{Plugin, TransformResult, Visit};

pub struct ConciseMethods;

impl Plugin for ConciseMethods {
    type Context = ();

    fn name(&self) -> &'static str {
        "objects.concise"
    }

    fn description(&self) -> &'static str {
        "Expand concise object methods into function-valued properties"
    }

    fn enter(&self, node: NodeId, module: &mut Module, _cx: &mut ()) -> TransformResult<Visit> {
        // The value already is the function expression
        if let NodeKind::Property { method, .. } = module.tree_mut().kind_mut(node) {
            *method = false;
        }
        Ok(Visit::Continue)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transform::plugins::apply;

    #[test]
    fn test_method_becomes_property() {
        assert_eq!(
            apply(ConciseMethods, "var o = { m(a) { return a; }, n: 1 };").code,
            "var o = { m: function (a) {\n  return a;\n}, n: 1 };\n"
        );
    }

    #[test]
    fn test_quoted_method_name() {
        assert_eq!(
            apply(ConciseMethods, "var o = { \"m\"() {} };").code,
            "var o = { \"m\": function () {} };\n"
        );
    }
}
