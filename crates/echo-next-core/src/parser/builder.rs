// Lowers pest pairs into the arena syntax tree

use pest::iterators::Pair;

use super::{ParseError, Rule};
use crate::ast::{
    BinaryOp, DeclKind, NodeId, NodeKind, Position, PropertyKey, Span, SyntaxTree, UnaryOp,
};

type BuildResult<T> = Result<T, ParseError>;

pub(super) fn build(source: &str, program: Pair<'_, Rule>) -> BuildResult<SyntaxTree> {
    let mut builder = TreeBuilder {
        lines: LineIndex::new(source),
        tree: SyntaxTree::new(),
    };
    builder.program(program)?;
    Ok(builder.tree)
}

/// Byte offset to line/column lookup
struct LineIndex<'s> {
    source: &'s str,
    starts: Vec<usize>,
}

impl<'s> LineIndex<'s> {
    fn new(source: &'s str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { source, starts }
    }

    fn position(&self, offset: usize) -> Position {
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = self.source[self.starts[line]..offset].chars().count();
        Position {
            offset,
            line: line + 1,
            column,
        }
    }
}

struct TreeBuilder<'s> {
    lines: LineIndex<'s>,
    tree: SyntaxTree,
}

/// Keyword tokens carry no information once the enclosing rule matched
fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_var
            | Rule::kw_let
            | Rule::kw_const
            | Rule::kw_function
            | Rule::kw_return
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
    )
}

fn significant(pair: Pair<'_, Rule>) -> Vec<Pair<'_, Rule>> {
    pair.into_inner()
        .filter(|p| !is_keyword(p.as_rule()))
        .collect()
}

impl TreeBuilder<'_> {
    fn span(&self, pair: &Pair<'_, Rule>) -> Span {
        let span = pair.as_span();
        Span::new(
            self.lines.position(span.start()),
            self.lines.position(span.end()),
        )
    }

    fn error(&self, pair: &Pair<'_, Rule>, message: &str) -> ParseError {
        let start = self.lines.position(pair.as_span().start());
        ParseError::new(message, start.line, start.column + 1)
    }

    fn unexpected(&self, pair: &Pair<'_, Rule>) -> ParseError {
        self.error(pair, &format!("unexpected {:?}", pair.as_rule()))
    }

    fn node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.tree.alloc(kind, span)
    }

    fn program(&mut self, pair: Pair<'_, Rule>) -> BuildResult<()> {
        let span = self.span(&pair);
        let mut body = Vec::new();
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::EOI {
                continue;
            }
            body.push(self.statement(inner)?);
        }
        let root = self.tree.root();
        self.tree.replace(root, NodeKind::Program { body });
        self.tree.set_span(root, span);
        Ok(())
    }

    fn statement(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let span = self.span(&pair);
        let kind = match pair.as_rule() {
            Rule::var_decl => {
                let mut inner = significant(pair).into_iter();
                let kind = match inner.next().and_then(|k| k.into_inner().next()) {
                    Some(k) if k.as_rule() == Rule::kw_let => DeclKind::Let,
                    Some(k) if k.as_rule() == Rule::kw_const => DeclKind::Const,
                    _ => DeclKind::Var,
                };
                let declarations = inner
                    .map(|declarator| self.declarator(declarator))
                    .collect::<BuildResult<Vec<_>>>()?;
                NodeKind::VariableDeclaration { kind, declarations }
            }
            Rule::function_decl => {
                let mut inner = significant(pair).into_iter();
                let (name, params, body) = match (inner.next(), inner.next(), inner.next()) {
                    (Some(name), Some(params), Some(body)) => {
                        (name.as_str().to_string(), self.params(params)?, self.statement(body)?)
                    }
                    _ => return Err(at(span.start, "malformed function")),
                };
                NodeKind::FunctionDeclaration { name, params, body }
            }
            Rule::return_stmt => {
                let argument = significant(pair)
                    .into_iter()
                    .next()
                    .map(|expr| self.expr(expr))
                    .transpose()?;
                NodeKind::Return { argument }
            }
            Rule::if_stmt => {
                let mut inner = significant(pair).into_iter();
                let (test, consequent) = match (inner.next(), inner.next()) {
                    (Some(test), Some(consequent)) => (self.expr(test)?, self.statement(consequent)?),
                    _ => return Err(at(span.start, "malformed if statement")),
                };
                let alternate = inner.next().map(|alt| self.statement(alt)).transpose()?;
                NodeKind::If {
                    test,
                    consequent,
                    alternate,
                }
            }
            Rule::while_stmt => {
                let mut inner = significant(pair).into_iter();
                match (inner.next(), inner.next()) {
                    (Some(test), Some(body)) => NodeKind::While {
                        test: self.expr(test)?,
                        body: self.statement(body)?,
                    },
                    _ => return Err(at(span.start, "malformed while statement")),
                }
            }
            Rule::block => {
                let body = pair
                    .into_inner()
                    .map(|stmt| self.statement(stmt))
                    .collect::<BuildResult<Vec<_>>>()?;
                NodeKind::Block { body }
            }
            Rule::empty_stmt => NodeKind::Empty,
            Rule::expr_stmt => match pair.into_inner().next() {
                Some(expr) => NodeKind::ExpressionStatement {
                    expression: self.expr(expr)?,
                },
                None => return Err(at(span.start, "expected expression")),
            },
            _ => return Err(self.unexpected(&pair)),
        };
        Ok(self.node(kind, span))
    }

    fn declarator(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let name = inner.next().map(|p| p.as_str().to_string()).unwrap_or_default();
        let init = inner.next().map(|expr| self.expr(expr)).transpose()?;
        Ok(self.node(NodeKind::VariableDeclarator { name, init }, span))
    }

    fn params(&mut self, pair: Pair<'_, Rule>) -> BuildResult<Vec<NodeId>> {
        let params: Vec<_> = pair.into_inner().collect();
        let count = params.len();
        let mut ids = Vec::with_capacity(count);

        for (i, param) in params.into_iter().enumerate() {
            let span = self.span(&param);
            let mut rest = false;
            let mut name = String::new();
            let mut default = None;

            for inner in param.clone().into_inner() {
                match inner.as_rule() {
                    Rule::rest_marker => rest = true,
                    Rule::ident => name = inner.as_str().to_string(),
                    _ => default = Some(self.expr(inner)?),
                }
            }

            if rest && i + 1 != count {
                return Err(self.error(&param, "rest parameter must be last"));
            }
            if rest && default.is_some() {
                return Err(self.error(&param, "rest parameter cannot have a default value"));
            }

            ids.push(self.node(NodeKind::Param { name, default, rest }, span));
        }

        Ok(ids)
    }

    fn expr(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let span = self.span(&pair);
        match pair.as_rule() {
            Rule::expr => match pair.into_inner().next() {
                Some(inner) => self.expr(inner),
                None => Err(at(span.start, "expected expression")),
            },
            Rule::assignment => self.assignment(pair),
            Rule::arrow_function => self.arrow_function(pair),
            Rule::logical_or
            | Rule::logical_and
            | Rule::equality
            | Rule::relational
            | Rule::additive
            | Rule::multiplicative => self.binary_chain(pair),
            Rule::exponent => self.exponent(pair),
            Rule::unary => self.unary(pair),
            Rule::postfix => self.postfix(pair),
            _ => self.primary(pair),
        }
    }

    fn assignment(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| at(span.start, "expected expression"))?;

        let Some(value) = inner.next() else {
            return self.expr(first);
        };

        let target_pair = first.clone();
        let target = self.expr(first)?;
        if !matches!(
            self.tree.kind(target),
            NodeKind::Identifier(_) | NodeKind::Member { .. } | NodeKind::Index { .. }
        ) {
            return Err(self.error(&target_pair, "invalid assignment target"));
        }

        let value = self.expr(value)?;
        Ok(self.node(NodeKind::Assign { target, value }, span))
    }

    fn arrow_function(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let (Some(params_pair), Some(body_pair)) = (inner.next(), inner.next()) else {
            return Err(at(span.start, "malformed arrow function"));
        };

        let mut params = Vec::new();
        for p in params_pair.into_inner() {
            match p.as_rule() {
                Rule::ident => {
                    let param_span = self.span(&p);
                    params.push(self.node(
                        NodeKind::Param {
                            name: p.as_str().to_string(),
                            default: None,
                            rest: false,
                        },
                        param_span,
                    ));
                }
                Rule::params => params.extend(self.params(p)?),
                _ => return Err(self.unexpected(&p)),
            }
        }

        let body = match body_pair.into_inner().next() {
            Some(b) if b.as_rule() == Rule::block => self.statement(b)?,
            Some(b) => self.expr(b)?,
            None => return Err(at(span.end, "expected arrow function body")),
        };

        Ok(self.node(NodeKind::ArrowFunction { params, body }, span))
    }

    /// Left-associative operator chain: `operand (op operand)*`
    fn binary_chain(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let outer = self.span(&pair);
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| at(outer.start, "expected expression"))?;
        let mut left = self.expr(first)?;

        while let (Some(op), Some(operand)) = (inner.next(), inner.next()) {
            let op = BinaryOp::from_symbol(op.as_str().trim())
                .ok_or_else(|| self.error(&op, "unknown operator"))?;
            let right = self.expr(operand)?;
            let span = self.tree.span(left).to(self.tree.span(right));
            left = self.node(NodeKind::Binary { op, left, right }, span);
        }

        Ok(left)
    }

    /// Right-associative `**`
    fn exponent(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let base = inner
            .next()
            .ok_or_else(|| at(span.start, "expected expression"))?;
        let left = self.expr(base)?;

        match (inner.next(), inner.next()) {
            (Some(_), Some(power)) => {
                let right = self.expr(power)?;
                Ok(self.node(
                    NodeKind::Binary {
                        op: BinaryOp::Power,
                        left,
                        right,
                    },
                    span,
                ))
            }
            _ => Ok(left),
        }
    }

    fn unary(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| at(span.start, "expected expression"))?;

        if first.as_rule() != Rule::op_unary {
            return self.expr(first);
        }

        let op = if first.as_str().trim() == "!" {
            UnaryOp::Not
        } else {
            UnaryOp::Minus
        };
        let operand = inner
            .next()
            .ok_or_else(|| self.error(&first, "expected operand"))?;
        let argument = self.expr(operand)?;
        Ok(self.node(NodeKind::Unary { op, argument }, span))
    }

    fn postfix(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let outer = self.span(&pair);
        let mut inner = pair.into_inner();
        let primary = inner
            .next()
            .ok_or_else(|| at(outer.start, "expected expression"))?;
        let mut object = self.expr(primary)?;

        for suffix in inner {
            let span = self.tree.span(object).to(self.span(&suffix));
            let kind = match suffix.as_rule() {
                Rule::call_args => NodeKind::Call {
                    callee: object,
                    arguments: suffix
                        .into_inner()
                        .map(|arg| self.expr(arg))
                        .collect::<BuildResult<Vec<_>>>()?,
                },
                Rule::member_suffix => NodeKind::Member {
                    object,
                    property: suffix
                        .into_inner()
                        .next()
                        .map(|name| name.as_str().to_string())
                        .unwrap_or_default(),
                },
                Rule::index_suffix => match suffix.into_inner().next() {
                    Some(index) => NodeKind::Index {
                        object,
                        index: self.expr(index)?,
                    },
                    None => return Err(at(span.end, "expected index")),
                },
                _ => return Err(self.unexpected(&suffix)),
            };
            object = self.node(kind, span);
        }

        Ok(object)
    }

    fn primary(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let span = self.span(&pair);
        let kind = match pair.as_rule() {
            Rule::number => NodeKind::Number(pair.as_str().to_string()),
            Rule::string => NodeKind::String(string_contents(pair)),
            Rule::boolean => NodeKind::Boolean(pair.as_str() == "true"),
            Rule::null => NodeKind::Null,
            Rule::this => NodeKind::This,
            Rule::ident => NodeKind::Identifier(pair.as_str().to_string()),
            Rule::template => {
                let mut quasis = Vec::new();
                let mut expressions = Vec::new();
                let mut current = String::new();
                for part in pair.into_inner() {
                    match part.as_rule() {
                        Rule::template_chars => current.push_str(part.as_str()),
                        Rule::template_sub => {
                            quasis.push(std::mem::take(&mut current));
                            if let Some(expr) = part.into_inner().next() {
                                expressions.push(self.expr(expr)?);
                            }
                        }
                        _ => return Err(self.unexpected(&part)),
                    }
                }
                quasis.push(current);
                NodeKind::Template {
                    quasis,
                    expressions,
                }
            }
            Rule::array => NodeKind::Array {
                elements: pair
                    .into_inner()
                    .map(|element| self.expr(element))
                    .collect::<BuildResult<Vec<_>>>()?,
            },
            Rule::object => NodeKind::Object {
                properties: pair
                    .into_inner()
                    .map(|property| self.property(property))
                    .collect::<BuildResult<Vec<_>>>()?,
            },
            Rule::function_expr => {
                let mut name = None;
                let mut params = Vec::new();
                let mut body = None;
                for inner in significant(pair) {
                    match inner.as_rule() {
                        Rule::ident => name = Some(inner.as_str().to_string()),
                        Rule::params => params = self.params(inner)?,
                        Rule::block => body = Some(self.statement(inner)?),
                        _ => return Err(self.unexpected(&inner)),
                    }
                }
                let body = body.ok_or_else(|| {
                    at(span.end, "expected function body")
                })?;
                NodeKind::FunctionExpression { name, params, body }
            }
            _ => return Err(self.unexpected(&pair)),
        };
        Ok(self.node(kind, span))
    }

    fn property(&mut self, pair: Pair<'_, Rule>) -> BuildResult<NodeId> {
        let span = self.span(&pair);
        let rule = pair.as_rule();
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| at(span.start, "expected property"))?;

        let kind = match rule {
            Rule::shorthand_property => {
                let name = first.as_str().to_string();
                let value = self.node(NodeKind::Identifier(name.clone()), span);
                NodeKind::Property {
                    key: PropertyKey::Identifier(name),
                    value,
                    shorthand: true,
                    method: false,
                }
            }
            Rule::keyed_property => {
                let key = property_key(first);
                let value = match inner.next() {
                    Some(value) => self.expr(value)?,
                    None => return Err(at(span.end, "expected property value")),
                };
                NodeKind::Property {
                    key,
                    value,
                    shorthand: false,
                    method: false,
                }
            }
            Rule::method_property => {
                let key = property_key(first);
                let (Some(params), Some(body)) = (inner.next(), inner.next()) else {
                    return Err(at(span.start, "malformed method"));
                };
                let params = self.params(params)?;
                let body = self.statement(body)?;
                let value = self.node(
                    NodeKind::FunctionExpression {
                        name: None,
                        params,
                        body,
                    },
                    span,
                );
                NodeKind::Property {
                    key,
                    value,
                    shorthand: false,
                    method: true,
                }
            }
            _ => return Err(self.unexpected(&first)),
        };
        Ok(self.node(kind, span))
    }
}

fn at(position: Position, message: &str) -> ParseError {
    ParseError::new(message, position.line, position.column + 1)
}

fn string_contents(pair: Pair<'_, Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|inner| inner.as_str().to_string())
        .unwrap_or_default()
}

fn property_key(pair: Pair<'_, Rule>) -> PropertyKey {
    match pair.into_inner().next() {
        Some(key) if key.as_rule() == Rule::string => PropertyKey::String(string_contents(key)),
        Some(key) => PropertyKey::Identifier(key.as_str().to_string()),
        None => PropertyKey::Identifier(String::new()),
    }
}
