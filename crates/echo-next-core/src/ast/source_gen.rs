// Source code generation from the syntax tree
// Output is canonical: two-space indentation, one statement per line and only
// the parentheses the precedence table requires.

use super::*;
use crate::module::{Diagnostic, Location};

/// Diagnostic kind for nodes the renderer had to print in a different form
pub const RENDER_FALLBACK: &str = "render-fallback";

/// Text produced by [`render`] plus anything the renderer had to report
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rendered {
    pub code: String,
    pub warnings: Vec<Diagnostic>,
}

/// Render the tree reachable from its root
pub fn render(tree: &SyntaxTree) -> Rendered {
    let mut printer = Printer {
        tree,
        out: String::new(),
        indent: 0,
        warnings: Vec::new(),
    };

    let root = tree.root();
    match tree.kind(root) {
        NodeKind::Program { body } => {
            for stmt in body {
                printer.statement(*stmt);
                printer.out.push('\n');
            }
        }
        _ => {
            printer.statement(root);
            printer.out.push('\n');
        }
    }

    Rendered {
        code: printer.out,
        warnings: printer.warnings,
    }
}

// Binding power, weakest first
const ASSIGN: u8 = 1;
const UNARY: u8 = 9;
const POSTFIX: u8 = 10;
const PRIMARY: u8 = 11;

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 2,
        BinaryOp::And => 3,
        BinaryOp::Equal | BinaryOp::NotEqual => 4,
        BinaryOp::LessThan
        | BinaryOp::LessEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterEqual => 5,
        BinaryOp::Add | BinaryOp::Subtract => 6,
        BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 7,
        BinaryOp::Power => 8,
    }
}

fn precedence(kind: &NodeKind) -> u8 {
    match kind {
        NodeKind::Assign { .. } | NodeKind::ArrowFunction { .. } => ASSIGN,
        NodeKind::Binary { op, .. } => binary_precedence(*op),
        NodeKind::Unary { .. } => UNARY,
        NodeKind::Member { .. } | NodeKind::Index { .. } | NodeKind::Call { .. } => POSTFIX,
        _ => PRIMARY,
    }
}

/// Whether an expression statement would be misread as a declaration or block
fn needs_statement_parens(text: &str) -> bool {
    if text.starts_with('{') {
        return true;
    }
    match text.strip_prefix("function") {
        Some(rest) => !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
        None => false,
    }
}

struct Printer<'t> {
    tree: &'t SyntaxTree,
    out: String,
    indent: usize,
    warnings: Vec<Diagnostic>,
}

impl Printer<'_> {
    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn fallback(&mut self, id: NodeId, message: String) {
        let start = self.tree.span(id).start;
        self.warnings.push(Diagnostic::new(
            RENDER_FALLBACK,
            message,
            Location::new(start.line, start.column),
        ));
    }

    fn statement(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::VariableDeclaration { kind, declarations } => {
                self.out.push_str(kind.keyword());
                self.out.push(' ');
                for (i, declarator) in declarations.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.declarator(*declarator);
                }
                self.out.push(';');
            }
            NodeKind::FunctionDeclaration { name, params, body } => {
                self.out.push_str("function ");
                self.out.push_str(name);
                self.params(params);
                self.out.push(' ');
                self.statement(*body);
            }
            NodeKind::Return { argument } => {
                self.out.push_str("return");
                if let Some(argument) = argument {
                    self.out.push(' ');
                    self.expr(*argument, ASSIGN);
                }
                self.out.push(';');
            }
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.out.push_str("if (");
                self.expr(*test, ASSIGN);
                self.out.push_str(") ");
                match alternate {
                    Some(alternate) => {
                        // Brace the consequent so a nested `if` cannot claim our `else`
                        self.braced(*consequent);
                        self.out.push_str(" else ");
                        self.statement(*alternate);
                    }
                    None => self.statement(*consequent),
                }
            }
            NodeKind::While { test, body } => {
                self.out.push_str("while (");
                self.expr(*test, ASSIGN);
                self.out.push_str(") ");
                self.statement(*body);
            }
            NodeKind::Block { body } => self.block(body),
            NodeKind::Empty => self.out.push(';'),
            NodeKind::ExpressionStatement { expression } => self.expression_statement(*expression),
            NodeKind::VariableDeclarator { .. } | NodeKind::Param { .. } | NodeKind::Property { .. } => {
                self.fallback(id, format!("cannot render {kind} as a statement", kind = tree.kind(id)));
            }
            NodeKind::Program { body } => {
                for (i, stmt) in body.iter().enumerate() {
                    if i > 0 {
                        self.newline();
                    }
                    self.statement(*stmt);
                }
            }
            _ => self.expression_statement(id),
        }
    }

    fn expression_statement(&mut self, expression: NodeId) {
        let start = self.out.len();
        self.expr(expression, ASSIGN);
        if needs_statement_parens(&self.out[start..]) {
            self.out.insert(start, '(');
            self.out.push(')');
        }
        self.out.push(';');
    }

    fn block(&mut self, body: &[NodeId]) {
        if body.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push('{');
        self.indent += 1;
        for stmt in body {
            self.newline();
            self.statement(*stmt);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    /// Render a statement, wrapping it in a block unless it already is one
    fn braced(&mut self, id: NodeId) {
        if matches!(self.tree.kind(id), NodeKind::Block { .. }) {
            self.statement(id);
        } else {
            self.block(&[id]);
        }
    }

    fn declarator(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::VariableDeclarator { name, init } => {
                self.out.push_str(name);
                if let Some(init) = init {
                    self.out.push_str(" = ");
                    self.expr(*init, ASSIGN);
                }
            }
            other => {
                self.fallback(id, format!("expected a declarator, found {other}"));
            }
        }
    }

    fn params(&mut self, params: &[NodeId]) {
        let tree = self.tree;
        self.out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            match tree.kind(*param) {
                NodeKind::Param {
                    name,
                    default,
                    rest,
                } => {
                    if *rest {
                        self.out.push_str("...");
                    }
                    self.out.push_str(name);
                    if let Some(default) = default {
                        self.out.push_str(" = ");
                        self.expr(*default, ASSIGN);
                    }
                }
                NodeKind::Identifier(name) => self.out.push_str(name),
                other => {
                    self.fallback(*param, format!("expected a parameter, found {other}"));
                }
            }
        }
        self.out.push(')');
    }

    fn list(&mut self, items: &[NodeId]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(*item, ASSIGN);
        }
    }

    fn expr(&mut self, id: NodeId, min_precedence: u8) {
        let tree = self.tree;
        let kind = tree.kind(id);
        let wrap = precedence(kind) < min_precedence;
        if wrap {
            self.out.push('(');
        }

        match kind {
            // Literals
            NodeKind::Number(raw) => self.out.push_str(raw),
            NodeKind::String(raw) => {
                self.out.push('"');
                self.out.push_str(raw);
                self.out.push('"');
            }
            NodeKind::Boolean(b) => self.out.push_str(if *b { "true" } else { "false" }),
            NodeKind::Null => self.out.push_str("null"),
            NodeKind::Template {
                quasis,
                expressions,
            } => {
                self.out.push('`');
                for (i, quasi) in quasis.iter().enumerate() {
                    self.out.push_str(quasi);
                    if let Some(expression) = expressions.get(i) {
                        self.out.push_str("${");
                        self.expr(*expression, ASSIGN);
                        self.out.push('}');
                    }
                }
                self.out.push('`');
            }

            // Identifiers
            NodeKind::Identifier(name) => self.out.push_str(name),
            NodeKind::This => self.out.push_str("this"),

            // Collections
            NodeKind::Array { elements } => {
                self.out.push('[');
                self.list(elements);
                self.out.push(']');
            }
            NodeKind::Object { properties } => {
                if properties.is_empty() {
                    self.out.push_str("{}");
                } else {
                    self.out.push_str("{ ");
                    for (i, property) in properties.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.property(*property);
                    }
                    self.out.push_str(" }");
                }
            }

            // Functions
            NodeKind::FunctionExpression { name, params, body } => {
                self.out.push_str("function");
                if let Some(name) = name {
                    self.out.push(' ');
                    self.out.push_str(name);
                } else {
                    self.out.push(' ');
                }
                self.params(params);
                self.out.push(' ');
                self.statement(*body);
            }
            NodeKind::ArrowFunction { params, body } => {
                self.params(params);
                self.out.push_str(" => ");
                if matches!(tree.kind(*body), NodeKind::Block { .. }) {
                    self.statement(*body);
                } else {
                    let start = self.out.len();
                    self.expr(*body, ASSIGN);
                    if self.out[start..].starts_with('{') {
                        self.out.insert(start, '(');
                        self.out.push(')');
                    }
                }
            }

            // Operations
            NodeKind::Member { object, property } => {
                self.expr(*object, POSTFIX);
                self.out.push('.');
                self.out.push_str(property);
            }
            NodeKind::Index { object, index } => {
                self.expr(*object, POSTFIX);
                self.out.push('[');
                self.expr(*index, ASSIGN);
                self.out.push(']');
            }
            NodeKind::Call { callee, arguments } => {
                self.expr(*callee, POSTFIX);
                self.out.push('(');
                self.list(arguments);
                self.out.push(')');
            }
            NodeKind::Binary { op, left, right } => {
                let own = binary_precedence(*op);
                let (left_min, right_min) = if *op == BinaryOp::Power {
                    (POSTFIX, own)
                } else {
                    (own, own + 1)
                };
                self.expr(*left, left_min);
                self.out.push(' ');
                self.out.push_str(op.symbol());
                self.out.push(' ');
                self.expr(*right, right_min);
            }
            NodeKind::Unary { op, argument } => {
                self.out.push_str(op.symbol());
                self.expr(*argument, UNARY);
            }
            NodeKind::Assign { target, value } => {
                self.expr(*target, POSTFIX);
                self.out.push_str(" = ");
                self.expr(*value, ASSIGN);
            }

            other => {
                self.fallback(id, format!("cannot render {other} as an expression"));
            }
        }

        if wrap {
            self.out.push(')');
        }
    }

    fn property(&mut self, id: NodeId) {
        let tree = self.tree;
        let NodeKind::Property {
            key,
            value,
            shorthand,
            method,
        } = tree.kind(id)
        else {
            self.fallback(id, format!("expected a property, found {}", tree.kind(id)));
            return;
        };

        let key_text = match key {
            PropertyKey::Identifier(name) => name.clone(),
            PropertyKey::String(raw) => format!("\"{raw}\""),
        };

        if *shorthand {
            match (key, tree.kind(*value)) {
                (PropertyKey::Identifier(name), NodeKind::Identifier(value_name)) if name == value_name => {
                    self.out.push_str(name);
                    return;
                }
                _ => self.fallback(id, format!("property `{key_text}` cannot be written in shorthand form")),
            }
        }

        if *method {
            match tree.kind(*value) {
                NodeKind::FunctionExpression { params, body, .. } => {
                    self.out.push_str(&key_text);
                    self.params(params);
                    self.out.push(' ');
                    self.statement(*body);
                    return;
                }
                _ => self.fallback(id, format!("property `{key_text}` cannot be written as a method")),
            }
        }

        self.out.push_str(&key_text);
        self.out.push_str(": ");
        self.expr(*value, ASSIGN);
    }
}
