// Runs an ordered plugin list against one module

use std::sync::Arc;
use std::time::Instant;

use super::{Pass, TransformResult};
use crate::module::Module;

/// Ordered list of type-erased plugins
pub type PluginList = Vec<Arc<dyn Pass>>;

/// Run each plugin's full lifecycle in order. The first hook error aborts
/// the run and is returned unchanged; earlier edits stay in the tree.
pub fn run(module: &mut Module, plugins: &[Arc<dyn Pass>]) -> TransformResult<()> {
    for plugin in plugins {
        let span = tracing::debug_span!("plugin", name = plugin.name());
        let _entered = span.enter();

        let start_time = Instant::now();
        let walked = plugin.run(module)?;
        tracing::debug!(
            nodes = walked.entered,
            stopped = walked.stopped,
            elapsed_us = start_time.elapsed().as_micros() as u64,
            "pass finished"
        );
    }

    module.clear_parents();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ast::{NodeId, NodeKind};
    use crate::transform::{Plugin, Visit};

    /// Appends `<tag>:<hook>` to a shared journal
    struct Journal {
        tag: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Journal {
        fn record(&self, hook: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{hook}", self.tag));
        }
    }

    impl Plugin for Journal {
        type Context = usize;

        fn name(&self) -> &'static str {
            self.tag
        }

        fn begin(&self, _module: &mut Module) -> TransformResult<usize> {
            self.record("begin");
            Ok(0)
        }

        fn enter(&self, _node: NodeId, _module: &mut Module, count: &mut usize) -> TransformResult<Visit> {
            *count += 1;
            Ok(Visit::Continue)
        }

        fn end(&self, _module: &mut Module, count: usize) -> TransformResult<()> {
            self.record(&format!("end({count})"));
            Ok(())
        }
    }

    #[test]
    fn test_plugins_run_one_after_another() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let plugins: PluginList = vec![
            Arc::new(Journal {
                tag: "first",
                events: events.clone(),
            }),
            Arc::new(Journal {
                tag: "second",
                events: events.clone(),
            }),
        ];

        let mut module = Module::new("a;").unwrap();
        run(&mut module, &plugins).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec!["first:begin", "first:end(3)", "second:begin", "second:end(3)"]
        );
    }

    #[test]
    fn test_parents_cleared_after_last_pass() {
        let mut module = Module::new("a;").unwrap();
        let root = module.tree().root();
        let stmt = module.tree().children(root)[0];

        let plugins: PluginList = vec![Arc::new(Journal {
            tag: "only",
            events: Arc::default(),
        })];
        run(&mut module, &plugins).unwrap();
        assert_eq!(module.parent(stmt), None);
    }

    #[test]
    fn test_error_aborts_remaining_plugins() {
        struct Broken;

        impl Plugin for Broken {
            type Context = ();

            fn name(&self) -> &'static str {
                "broken"
            }

            fn enter(&self, node: NodeId, module: &mut Module, _cx: &mut ()) -> TransformResult<Visit> {
                if let NodeKind::Identifier(_) = module.tree().kind(node) {
                    module.tree_mut().replace(node, NodeKind::Identifier("edited".into()));
                    anyhow::bail!("broken at {node}");
                }
                Ok(Visit::Continue)
            }
        }

        let events = Arc::new(Mutex::new(Vec::new()));
        let plugins: PluginList = vec![
            Arc::new(Broken),
            Arc::new(Journal {
                tag: "after",
                events: events.clone(),
            }),
        ];

        let mut module = Module::new("a;").unwrap();
        let err = run(&mut module, &plugins).unwrap_err();
        assert!(err.to_string().starts_with("broken at n"));
        assert!(events.lock().unwrap().is_empty());
        // No rollback
        assert_eq!(module.render().code, "edited;\n");
    }
}
