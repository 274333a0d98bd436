// Depth-first enter/leave walk for a single plugin

use super::{Plugin, TransformResult, Visit};
use crate::ast::NodeId;
use crate::module::Module;

/// What one walk did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Walked {
    /// Number of `enter` calls
    pub entered: usize,
    /// A hook returned [`Visit::Stop`]
    pub stopped: bool,
}

/// Walk the module's current root, rebuilding the parent index as nodes are
/// entered. A node's children are read after its `enter` returns.
pub fn walk<P>(plugin: &P, module: &mut Module, cx: &mut P::Context) -> TransformResult<Walked>
where
    P: Plugin + ?Sized,
{
    module.clear_parents();
    let root = module.tree().root();
    let mut walked = Walked::default();
    if visit(plugin, module, cx, root, None, &mut walked)? == Visit::Stop {
        walked.stopped = true;
    }
    Ok(walked)
}

fn visit<P>(
    plugin: &P,
    module: &mut Module,
    cx: &mut P::Context,
    id: NodeId,
    parent: Option<NodeId>,
    walked: &mut Walked,
) -> TransformResult<Visit>
where
    P: Plugin + ?Sized,
{
    if let Some(parent) = parent {
        module.set_parent(id, parent);
    }

    walked.entered += 1;
    match plugin.enter(id, module, cx)? {
        Visit::Stop => return Ok(Visit::Stop),
        Visit::Skip => {}
        Visit::Continue => {
            for child in module.tree().children(id) {
                if visit(plugin, module, cx, child, Some(id), walked)? == Visit::Stop {
                    return Ok(Visit::Stop);
                }
            }
        }
    }

    match plugin.leave(id, module, cx)? {
        Visit::Stop => Ok(Visit::Stop),
        Visit::Skip | Visit::Continue => Ok(Visit::Continue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    /// Records `enter:<node>` / `leave:<node>` using identifier names and kinds
    struct Recorder {
        skip: Option<&'static str>,
        stop: Option<&'static str>,
    }

    fn label(module: &Module, id: NodeId) -> String {
        match module.tree().kind(id) {
            NodeKind::Identifier(name) => name.clone(),
            NodeKind::Program { .. } => "program".into(),
            NodeKind::ExpressionStatement { .. } => "stmt".into(),
            NodeKind::Call { .. } => "call".into(),
            other => format!("{other}"),
        }
    }

    impl Plugin for Recorder {
        type Context = Vec<String>;

        fn name(&self) -> &'static str {
            "recorder"
        }

        fn enter(&self, node: NodeId, module: &mut Module, log: &mut Vec<String>) -> TransformResult<Visit> {
            let label = label(module, node);
            log.push(format!("enter:{label}"));
            if self.stop.is_some_and(|stop| stop == label) {
                return Ok(Visit::Stop);
            }
            if self.skip.is_some_and(|skip| skip == label) {
                return Ok(Visit::Skip);
            }
            Ok(Visit::Continue)
        }

        fn leave(&self, node: NodeId, module: &mut Module, log: &mut Vec<String>) -> TransformResult<Visit> {
            log.push(format!("leave:{}", label(module, node)));
            Ok(Visit::Skip)
        }
    }

    fn run(source: &str, plugin: Recorder) -> (Vec<String>, Walked) {
        let mut module = Module::new(source).unwrap();
        let mut log = Vec::new();
        let walked = walk(&plugin, &mut module, &mut log).unwrap();
        (log, walked)
    }

    #[test]
    fn test_enter_and_leave_order() {
        let (log, walked) = run("f(a);", Recorder { skip: None, stop: None });
        assert_eq!(
            log,
            vec![
                "enter:program",
                "enter:stmt",
                "enter:call",
                "enter:f",
                "leave:f",
                "enter:a",
                "leave:a",
                "leave:call",
                "leave:stmt",
                "leave:program",
            ]
        );
        assert_eq!(walked.entered, 5);
        assert!(!walked.stopped);
    }

    #[test]
    fn test_skip_from_enter_still_leaves() {
        let (log, _) = run("f(a); b;", Recorder { skip: Some("call"), stop: None });
        assert_eq!(
            log,
            vec![
                "enter:program",
                "enter:stmt",
                "enter:call",
                "leave:call",
                "leave:stmt",
                "enter:stmt",
                "enter:b",
                "leave:b",
                "leave:stmt",
                "leave:program",
            ]
        );
    }

    #[test]
    fn test_stop_ends_the_walk() {
        let (log, walked) = run("f(a); b;", Recorder { skip: None, stop: Some("f") });
        assert_eq!(
            log,
            vec!["enter:program", "enter:stmt", "enter:call", "enter:f"]
        );
        assert!(walked.stopped);
    }

    #[test]
    fn test_parents_recorded_on_enter() {
        struct ParentCheck;

        impl Plugin for ParentCheck {
            type Context = Vec<(NodeId, Option<NodeId>)>;

            fn name(&self) -> &'static str {
                "parent-check"
            }

            fn enter(&self, node: NodeId, module: &mut Module, seen: &mut Self::Context) -> TransformResult<Visit> {
                seen.push((node, module.parent(node)));
                Ok(Visit::Continue)
            }
        }

        let mut module = Module::new("a;").unwrap();
        let root = module.tree().root();
        let stmt = module.tree().children(root)[0];
        let ident = module.tree().children(stmt)[0];

        let mut seen = Vec::new();
        walk(&ParentCheck, &mut module, &mut seen).unwrap();
        assert_eq!(seen, vec![(root, None), (stmt, Some(root)), (ident, Some(stmt))]);
    }

    #[test]
    fn test_children_read_after_enter() {
        // Replacing the node in `enter` means the new children get walked
        struct Rewrap;

        impl Plugin for Rewrap {
            type Context = Vec<String>;

            fn name(&self) -> &'static str {
                "rewrap"
            }

            fn enter(&self, node: NodeId, module: &mut Module, names: &mut Vec<String>) -> TransformResult<Visit> {
                let tree = module.tree_mut();
                match tree.kind(node).clone() {
                    NodeKind::ExpressionStatement { expression } => {
                        let span = tree.span(expression);
                        let fresh = tree.alloc(NodeKind::Identifier("fresh".into()), span);
                        tree.replace(node, NodeKind::ExpressionStatement { expression: fresh });
                    }
                    NodeKind::Identifier(name) => names.push(name),
                    _ => {}
                }
                Ok(Visit::Continue)
            }
        }

        let mut module = Module::new("old;").unwrap();
        let mut names = Vec::new();
        walk(&Rewrap, &mut module, &mut names).unwrap();
        assert_eq!(names, vec!["fresh"]);
    }

    #[test]
    fn test_hook_error_propagates() {
        struct Fails;

        impl Plugin for Fails {
            type Context = ();

            fn name(&self) -> &'static str {
                "fails"
            }

            fn leave(&self, _node: NodeId, _module: &mut Module, _cx: &mut ()) -> TransformResult<Visit> {
                anyhow::bail!("leave failed")
            }
        }

        let mut module = Module::new("a;").unwrap();
        let err = walk(&Fails, &mut module, &mut ()).unwrap_err();
        assert_eq!(err.to_string(), "leave failed");
    }
}
