// A parsed source file as seen by the transform passes
// Owns the syntax tree, the warnings raised while transforming it and the
// parent index the traversal maintains.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::{self, NodeId, SyntaxTree};
use crate::parser::{self, Dialect, ParseError};

/// Where a diagnostic points. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A non-fatal problem reported alongside the generated code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: String,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    pub fn new(kind: impl Into<String>, message: impl Into<String>, location: Location) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            location,
        }
    }
}

/// Final output of a conversion
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderedModule {
    pub code: String,
    pub warnings: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct Module {
    source: String,
    tree: SyntaxTree,
    diagnostics: Vec<Diagnostic>,
    /// child -> parent, rebuilt by every pass as nodes are entered
    parents: HashMap<NodeId, NodeId>,
}

impl Module {
    /// Parse `source` with the permissive Next grammar
    pub fn new(source: impl Into<String>) -> Result<Self, ParseError> {
        let source = source.into();
        let tree = parser::parse(&source, Dialect::Next)?;
        Ok(Self::from_tree(source, tree))
    }

    pub fn from_tree(source: impl Into<String>, tree: SyntaxTree) -> Self {
        Self {
            source: source.into(),
            tree,
            diagnostics: Vec::new(),
            parents: HashMap::new(),
        }
    }

    /// The source the tree was parsed from, without any directive line
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut SyntaxTree {
        &mut self.tree
    }

    /// Parent of `id` as recorded by the current pass.
    /// Only nodes the pass has already entered have a parent; the root has none.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Recorded ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            module: self,
            current: self.parent(id),
        }
    }

    /// Record a warning against the start of node `id`
    pub fn warn(&mut self, id: NodeId, kind: &str, message: impl Into<String>) {
        let start = self.tree.span(id).start;
        self.diagnostics.push(Diagnostic::new(
            kind,
            message,
            Location::new(start.line, start.column),
        ));
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Generate source text for the current tree. Warnings raised by the
    /// passes come first, followed by any the renderer adds.
    pub fn render(&self) -> RenderedModule {
        let rendered = ast::render(&self.tree);
        let mut warnings = self.diagnostics.clone();
        warnings.extend(rendered.warnings);
        RenderedModule {
            code: rendered.code,
            warnings,
        }
    }

    pub(crate) fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        self.parents.insert(child, parent);
    }

    pub(crate) fn clear_parents(&mut self) {
        self.parents.clear();
    }
}

/// Iterator returned by [`Module::ancestors`]
pub struct Ancestors<'m> {
    module: &'m Module,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.module.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    #[test]
    fn test_new_parses_next_source() {
        let module = Module::new("let x = () => 1;").unwrap();
        assert_eq!(module.source(), "let x = () => 1;");
        assert_eq!(module.tree().children(module.tree().root()).len(), 1);
    }

    #[test]
    fn test_new_reports_parse_errors() {
        let err = Module::new("var = ;").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_ancestors_follow_recorded_parents() {
        let mut module = Module::new("a.b;").unwrap();
        let root = module.tree().root();
        let stmt = module.tree().children(root)[0];
        let member = module.tree().children(stmt)[0];
        let object = module.tree().children(member)[0];

        module.set_parent(stmt, root);
        module.set_parent(member, stmt);
        module.set_parent(object, member);

        assert_eq!(module.parent(root), None);
        assert_eq!(
            module.ancestors(object).collect::<Vec<_>>(),
            vec![member, stmt, root]
        );

        module.clear_parents();
        assert_eq!(module.parent(object), None);
    }

    #[test]
    fn test_warnings_point_at_node_start() {
        let mut module = Module::new("var a;\n  b;").unwrap();
        let second = module.tree().children(module.tree().root())[1];
        module.warn(second, "test-kind", "something odd");

        let rendered = module.render();
        assert_eq!(rendered.code, "var a;\nb;\n");
        assert_eq!(
            rendered.warnings,
            vec![Diagnostic::new("test-kind", "something odd", Location::new(2, 2))]
        );
    }

    #[test]
    fn test_pushed_diagnostics_are_rendered() {
        let mut module = Module::new("a;").unwrap();
        module.push_diagnostic(Diagnostic::new("custom", "from a plugin", Location::new(1, 0)));
        assert_eq!(module.diagnostics().len(), 1);

        let rendered = module.render();
        assert_eq!(rendered.code, "a;\n");
        assert_eq!(
            rendered.warnings,
            vec![Diagnostic::new("custom", "from a plugin", Location::new(1, 0))]
        );
    }

    #[test]
    fn test_rendered_module_json_shape() {
        let rendered = RenderedModule {
            code: "var a;\n".into(),
            warnings: vec![Diagnostic::new("k", "m", Location::new(3, 4))],
        };
        let json = serde_json::to_value(&rendered).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "var a;\n",
                "warnings": [
                    { "kind": "k", "message": "m", "location": { "line": 3, "column": 4 } }
                ]
            })
        );
    }

    #[test]
    fn test_tree_mutation_is_rendered() {
        let mut module = Module::new("a;").unwrap();
        let root = module.tree().root();
        let stmt = module.tree().children(root)[0];
        let ident = module.tree().children(stmt)[0];
        module
            .tree_mut()
            .replace(ident, NodeKind::Identifier("renamed".into()));
        assert_eq!(module.render().code, "renamed;\n");
    }
}
