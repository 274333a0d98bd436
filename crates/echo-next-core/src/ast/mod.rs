// Arena syntax tree for Echo source
// Both dialects parse into this tree; plugins rewrite it in place and the
// renderer in `source_gen` turns it back into text.

pub mod source_gen;
pub use source_gen::{render, Rendered};

#[cfg(test)]
mod source_gen_tests;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a node for the lifetime of one tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A point in the source text. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span running from the start of `self` to the end of `other`
    pub fn to(self, other: Span) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

/// Declaration keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKind {
    /// var x = ... (function scoped)
    Var,
    /// let x = ... (block scoped, Next only)
    Let,
    /// const x = ... (block scoped, immutable, Next only)
    Const,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    /// `**`, Next only
    Power,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "**",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "||" => BinaryOp::Or,
            "&&" => BinaryOp::And,
            "==" => BinaryOp::Equal,
            "!=" => BinaryOp::NotEqual,
            "<" => BinaryOp::LessThan,
            "<=" => BinaryOp::LessEqual,
            ">" => BinaryOp::GreaterThan,
            ">=" => BinaryOp::GreaterEqual,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Subtract,
            "*" => BinaryOp::Multiply,
            "/" => BinaryOp::Divide,
            "%" => BinaryOp::Modulo,
            "**" => BinaryOp::Power,
            _ => return None,
        };
        Some(op)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Minus,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Minus => "-",
        }
    }
}

/// Object literal key: `name: ...` or `"quoted": ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKey {
    Identifier(String),
    /// Raw (still escaped) string contents
    String(String),
}

impl PropertyKey {
    pub fn name(&self) -> &str {
        match self {
            PropertyKey::Identifier(name) | PropertyKey::String(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    // Top-level program
    Program {
        body: Vec<NodeId>,
    },

    // Statements
    VariableDeclaration {
        kind: DeclKind,
        declarations: Vec<NodeId>,
    },
    VariableDeclarator {
        name: String,
        init: Option<NodeId>,
    },
    FunctionDeclaration {
        name: String,
        params: Vec<NodeId>,
        body: NodeId,
    },
    Return {
        argument: Option<NodeId>,
    },
    If {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    While {
        test: NodeId,
        body: NodeId,
    },
    Block {
        body: Vec<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    Empty,

    // Function parameters
    Param {
        name: String,
        default: Option<NodeId>,
        rest: bool,
    },

    // Literals
    /// Number as written in the source
    Number(String),
    /// Raw (still escaped) contents between the double quotes
    String(String),
    Boolean(bool),
    Null,
    /// Template literal, Next only. `quasis.len() == expressions.len() + 1`
    Template {
        quasis: Vec<String>,
        expressions: Vec<NodeId>,
    },

    // Identifiers
    Identifier(String),
    This,

    // Collections
    Array {
        elements: Vec<NodeId>,
    },
    Object {
        properties: Vec<NodeId>,
    },
    Property {
        key: PropertyKey,
        value: NodeId,
        /// `{ a }`, Next only
        shorthand: bool,
        /// `{ a() {} }`, Next only; `value` is the function expression
        method: bool,
    },

    // Functions
    FunctionExpression {
        name: Option<String>,
        params: Vec<NodeId>,
        body: NodeId,
    },
    /// Next only; `body` is a `Block` or an expression
    ArrowFunction {
        params: Vec<NodeId>,
        body: NodeId,
    },

    // Operations
    Member {
        object: NodeId,
        property: String,
    },
    Index {
        object: NodeId,
        index: NodeId,
    },
    Call {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: UnaryOp,
        argument: NodeId,
    },
    Assign {
        target: NodeId,
        value: NodeId,
    },
}

impl NodeKind {
    /// Child node ids in source order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program { body } | NodeKind::Block { body } => body.clone(),
            NodeKind::VariableDeclaration { declarations, .. } => declarations.clone(),
            NodeKind::VariableDeclarator { init, .. } => init.iter().copied().collect(),
            NodeKind::FunctionDeclaration { params, body, .. }
            | NodeKind::FunctionExpression { params, body, .. }
            | NodeKind::ArrowFunction { params, body } => {
                let mut children = params.clone();
                children.push(*body);
                children
            }
            NodeKind::Return { argument } => argument.iter().copied().collect(),
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                let mut children = vec![*test, *consequent];
                children.extend(alternate.iter().copied());
                children
            }
            NodeKind::While { test, body } => vec![*test, *body],
            NodeKind::ExpressionStatement { expression } => vec![*expression],
            NodeKind::Param { default, .. } => default.iter().copied().collect(),
            NodeKind::Template { expressions, .. } => expressions.clone(),
            NodeKind::Array { elements } => elements.clone(),
            NodeKind::Object { properties } => properties.clone(),
            NodeKind::Property { value, .. } => vec![*value],
            NodeKind::Member { object, .. } => vec![*object],
            NodeKind::Index { object, index } => vec![*object, *index],
            NodeKind::Call { callee, arguments } => {
                let mut children = vec![*callee];
                children.extend(arguments.iter().copied());
                children
            }
            NodeKind::Binary { left, right, .. } => vec![*left, *right],
            NodeKind::Unary { argument, .. } => vec![*argument],
            NodeKind::Assign { target, value } => vec![*target, *value],
            NodeKind::Empty
            | NodeKind::Number(_)
            | NodeKind::String(_)
            | NodeKind::Boolean(_)
            | NodeKind::Null
            | NodeKind::Identifier(_)
            | NodeKind::This => Vec::new(),
        }
    }

    /// Check if this node is a statement (vs expression or auxiliary node)
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::VariableDeclaration { .. }
                | NodeKind::FunctionDeclaration { .. }
                | NodeKind::Return { .. }
                | NodeKind::If { .. }
                | NodeKind::While { .. }
                | NodeKind::Block { .. }
                | NodeKind::ExpressionStatement { .. }
                | NodeKind::Empty
        )
    }

    /// Check if this node introduces a function scope
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration { .. }
                | NodeKind::FunctionExpression { .. }
                | NodeKind::ArrowFunction { .. }
        )
    }

    /// Name of the Next-only construct this node uses by itself, if any.
    /// Children are not inspected.
    pub fn next_only_feature(&self) -> Option<&'static str> {
        match self {
            NodeKind::VariableDeclaration {
                kind: DeclKind::Let,
                ..
            } => Some("`let` declarations"),
            NodeKind::VariableDeclaration {
                kind: DeclKind::Const,
                ..
            } => Some("`const` declarations"),
            NodeKind::ArrowFunction { .. } => Some("arrow functions"),
            NodeKind::Template { .. } => Some("template literals"),
            NodeKind::Param { rest: true, .. } => Some("rest parameters"),
            NodeKind::Param {
                default: Some(_), ..
            } => Some("default parameters"),
            NodeKind::Property {
                shorthand: true, ..
            } => Some("shorthand properties"),
            NodeKind::Property { method: true, .. } => Some("concise methods"),
            NodeKind::Binary {
                op: BinaryOp::Power,
                ..
            } => Some("the `**` operator"),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Number(raw) => write!(f, "{raw}"),
            NodeKind::String(raw) => write!(f, "\"{raw}\""),
            NodeKind::Boolean(b) => write!(f, "{b}"),
            NodeKind::Null => write!(f, "null"),
            NodeKind::Identifier(name) => write!(f, "{name}"),
            NodeKind::This => write!(f, "this"),
            NodeKind::Program { .. } => write!(f, "<program>"),
            kind if kind.is_statement() => write!(f, "<statement>"),
            _ => write!(f, "<expression>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Arena of nodes plus the current root.
///
/// Nodes are never freed while the tree lives: detaching a subtree only
/// removes it from its parent's child list, so every `NodeId` handed out stays
/// valid. Traversal starts from `root`, which makes detached nodes invisible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    /// Create a tree holding a single empty program
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Program { body: Vec::new() },
                span: Span::default(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    /// Number of nodes ever allocated, reachable or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new, detached node
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, span });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = span;
    }

    /// Replace the kind of `id` in place, returning the old kind.
    /// The node keeps its identity and span, so its parent needs no update.
    pub fn replace(&mut self, id: NodeId, kind: NodeKind) -> NodeKind {
        std::mem::replace(&mut self.nodes[id.index()].kind, kind)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// All nodes reachable from the root, in depth-first pre-order
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        order
    }

    /// Name carried by an identifier node
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}
