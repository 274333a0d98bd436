/*!
# Transform passes

Plugins rewrite a [`Module`]'s syntax tree in place, one pass per plugin.

## Lifecycle

For every plugin, in list order:

1. `begin` creates the plugin's private context
2. one depth-first walk calls `enter` before a node's children and `leave`
   after them, recording each node's parent as it goes
3. `end` consumes the context

Edits made by one plugin are what the next plugin walks. A hook error aborts
the whole run; nothing is rolled back.

## Example

```rust
use echo_next_core::ast::{NodeId, NodeKind};
use echo_next_core::transform::{Plugin, TransformResult, Visit};
use echo_next_core::Module;

struct CountCalls;

impl Plugin for CountCalls {
    type Context = usize;

    fn name(&self) -> &'static str {
        "count-calls"
    }

    fn enter(&self, node: NodeId, module: &mut Module, calls: &mut usize) -> TransformResult<Visit> {
        if matches!(module.tree().kind(node), NodeKind::Call { .. }) {
            *calls += 1;
        }
        Ok(Visit::Continue)
    }
}
```
*/

pub mod plugins;
pub mod sequencer;
pub mod traversal;

pub use sequencer::run;
pub use traversal::{walk, Walked};

use crate::ast::NodeId;
use crate::module::Module;

// Common result type for plugin hooks
pub type TransformResult<T> = anyhow::Result<T>;

/// What the traversal should do after a hook returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visit {
    #[default]
    Continue,
    /// From `enter`: leave the children alone but still call `leave`.
    /// From `leave`: same as `Continue`.
    Skip,
    /// End this pass now. Later plugins still run.
    Stop,
}

/// A transformation over the whole module
///
/// All hooks default to doing nothing. Per-run state belongs in `Context`;
/// the plugin value itself is shared and must stay immutable.
pub trait Plugin: Send + Sync {
    /// State private to one run of this plugin
    type Context: Default;

    /// Identifier used in logs and by [`plugins::by_name`]
    fn name(&self) -> &'static str;

    /// One-line summary of the rewrite
    fn description(&self) -> &'static str {
        ""
    }

    fn begin(&self, module: &mut Module) -> TransformResult<Self::Context> {
        let _ = module;
        Ok(Self::Context::default())
    }

    fn enter(&self, node: NodeId, module: &mut Module, cx: &mut Self::Context) -> TransformResult<Visit> {
        let _ = (node, module, cx);
        Ok(Visit::Continue)
    }

    fn leave(&self, node: NodeId, module: &mut Module, cx: &mut Self::Context) -> TransformResult<Visit> {
        let _ = (node, module, cx);
        Ok(Visit::Continue)
    }

    fn end(&self, module: &mut Module, cx: Self::Context) -> TransformResult<()> {
        let _ = (module, cx);
        Ok(())
    }
}

/// Object-safe view of a [`Plugin`] with its context type erased, so plugins
/// of different types can share one ordered list
pub trait Pass: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Run the full begin, walk, end lifecycle once
    fn run(&self, module: &mut Module) -> TransformResult<Walked>;
}

impl<P: Plugin> Pass for P {
    fn name(&self) -> &'static str {
        Plugin::name(self)
    }

    fn description(&self) -> &'static str {
        Plugin::description(self)
    }

    fn run(&self, module: &mut Module) -> TransformResult<Walked> {
        let mut cx = self.begin(module)?;
        let walked = walk(self, module, &mut cx)?;
        self.end(module, cx)?;
        Ok(walked)
    }
}
