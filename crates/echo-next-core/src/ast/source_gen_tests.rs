// Tests for rendering syntax trees back into source text

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::ast::source_gen::RENDER_FALLBACK;
    use crate::ast::{render, BinaryOp, NodeKind, PropertyKey, Span, SyntaxTree};
    use crate::parser::{parse, Dialect};

    fn round_trip(source: &str) -> String {
        let tree = parse(source, Dialect::Next).expect("source should parse");
        let rendered = render(&tree);
        assert!(rendered.warnings.is_empty(), "{:?}", rendered.warnings);
        rendered.code
    }

    #[test]
    fn test_empty_program_renders_nothing() {
        assert_eq!(round_trip(""), "");
        assert_eq!(round_trip("  // only a comment\n"), "");
    }

    #[test]
    fn test_statements_one_per_line() {
        assert_eq!(
            round_trip("var a=1;var b;a=b;"),
            "var a = 1;\nvar b;\na = b;\n"
        );
    }

    #[test]
    fn test_nested_blocks_are_indented() {
        let source = "function f(a){if(a){return 1;}else{while(a){a=a-1;}}return;}";
        let expected = "\
function f(a) {
  if (a) {
    return 1;
  } else {
    while (a) {
      a = a - 1;
    }
  }
  return;
}
";
        assert_eq!(round_trip(source), expected);
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(round_trip("function f() {}"), "function f() {}\n");
        assert_eq!(round_trip("{}"), "{}\n");
    }

    #[test]
    fn test_parentheses_follow_precedence() {
        assert_eq!(round_trip("(a + b) * c;"), "(a + b) * c;\n");
        assert_eq!(round_trip("a + (b * c);"), "a + b * c;\n");
        assert_eq!(round_trip("a - (b - c);"), "a - (b - c);\n");
        assert_eq!(round_trip("(a - b) - c;"), "a - b - c;\n");
        assert_eq!(round_trip("!(a && b) || c;"), "!(a && b) || c;\n");
        assert_eq!(round_trip("(a = b).c;"), "(a = b).c;\n");
    }

    #[test]
    fn test_exponent_associativity() {
        assert_eq!(round_trip("a ** b ** c;"), "a ** b ** c;\n");
        assert_eq!(round_trip("(a ** b) ** c;"), "(a ** b) ** c;\n");
        assert_eq!(round_trip("(-a) ** 2;"), "(-a) ** 2;\n");
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            round_trip("[1, 2.5, \"s\\n\", true, null, this];"),
            "[1, 2.5, \"s\\n\", true, null, this];\n"
        );
        assert_eq!(round_trip("`a${b}c`;"), "`a${b}c`;\n");
    }

    #[test]
    fn test_objects_render_inline() {
        assert_eq!(
            round_trip("var o = {a: 1, \"b c\": [2], d, e(x) { return x; }};"),
            "var o = { a: 1, \"b c\": [2], d, e(x) {\n  return x;\n} };\n"
        );
        assert_eq!(round_trip("var o = {};"), "var o = {};\n");
    }

    #[test]
    fn test_expression_statement_guards() {
        assert_eq!(round_trip("({ a: 1 });"), "({ a: 1 });\n");
        assert_eq!(round_trip("(function () {})();"), "(function () {}());\n");
        assert_eq!(round_trip("functional();"), "functional();\n");
    }

    #[test]
    fn test_arrow_functions() {
        assert_eq!(round_trip("var f = x => x;"), "var f = (x) => x;\n");
        assert_eq!(
            round_trip("var f = (a, b) => ({ a: b });"),
            "var f = (a, b) => ({ a: b });\n"
        );
        assert_eq!(
            round_trip("var f = () => { return 1; };"),
            "var f = () => {\n  return 1;\n};\n"
        );
    }

    #[test]
    fn test_params() {
        assert_eq!(
            round_trip("function f(a, b = 1 + 2, ...c) {}"),
            "function f(a, b = 1 + 2, ...c) {}\n"
        );
    }

    #[test]
    fn test_dangling_else_is_braced() {
        let mut tree = parse("if (a) b(); else c();", Dialect::Next).unwrap();
        let outer = tree.children(tree.root())[0];
        let NodeKind::If { consequent, .. } = tree.kind(outer).clone() else {
            panic!("expected if");
        };

        // Swap the consequent for an `if` with no else of its own
        let test = tree.alloc(NodeKind::Identifier("x".into()), Span::default());
        let inner_body = tree.alloc(NodeKind::Empty, Span::default());
        tree.replace(
            consequent,
            NodeKind::If {
                test,
                consequent: inner_body,
                alternate: None,
            },
        );

        assert_eq!(
            render(&tree).code,
            "if (a) {\n  if (x) ;\n} else c();\n"
        );
    }

    #[test]
    fn test_generated_nodes_render_with_parentheses() {
        let mut tree = SyntaxTree::new();
        let a = tree.alloc(NodeKind::Identifier("a".into()), Span::default());
        let b = tree.alloc(NodeKind::Identifier("b".into()), Span::default());
        let c = tree.alloc(NodeKind::Identifier("c".into()), Span::default());
        let sum = tree.alloc(
            NodeKind::Binary {
                op: BinaryOp::Add,
                left: a,
                right: b,
            },
            Span::default(),
        );
        let product = tree.alloc(
            NodeKind::Binary {
                op: BinaryOp::Multiply,
                left: c,
                right: sum,
            },
            Span::default(),
        );
        let stmt = tree.alloc(NodeKind::ExpressionStatement { expression: product }, Span::default());
        let root = tree.root();
        tree.replace(root, NodeKind::Program { body: vec![stmt] });

        assert_eq!(render(&tree).code, "c * (a + b);\n");
    }

    #[test]
    fn test_mismatched_shorthand_falls_back_with_warning() {
        let mut tree = parse("var o = { a };", Dialect::Next).unwrap();
        let property = tree
            .reachable()
            .into_iter()
            .find(|id| matches!(tree.kind(*id), NodeKind::Property { .. }))
            .unwrap();
        let NodeKind::Property { value, .. } = tree.kind(property).clone() else {
            unreachable!()
        };
        tree.replace(value, NodeKind::Identifier("b".into()));

        let rendered = render(&tree);
        assert_eq!(rendered.code, "var o = { a: b };\n");
        assert_eq!(rendered.warnings.len(), 1);
        assert_eq!(rendered.warnings[0].kind, RENDER_FALLBACK);
        assert_eq!(rendered.warnings[0].location.line, 1);
    }

    #[test]
    fn test_mismatched_method_falls_back_with_warning() {
        let mut tree = SyntaxTree::new();
        let one = tree.alloc(NodeKind::Number("1".into()), Span::default());
        let property = tree.alloc(
            NodeKind::Property {
                key: PropertyKey::Identifier("m".into()),
                value: one,
                shorthand: false,
                method: true,
            },
            Span::default(),
        );
        let object = tree.alloc(
            NodeKind::Object {
                properties: vec![property],
            },
            Span::default(),
        );
        let stmt = tree.alloc(NodeKind::ExpressionStatement { expression: object }, Span::default());
        let root = tree.root();
        tree.replace(root, NodeKind::Program { body: vec![stmt] });

        let rendered = render(&tree);
        assert_eq!(rendered.code, "({ m: 1 });\n");
        assert_eq!(rendered.warnings[0].kind, RENDER_FALLBACK);
    }

    #[test]
    fn test_rendered_output_reparses_to_same_output() {
        let source = "\
var add = (a, b = 2) => a + b;
let o = { add, twice(x) { return x * 2; } };
const s = `sum ${add(1)} and ${o.twice(3)}`;
if (s) { o.twice(2 ** 3); } else if (!s) ; else { while (false) {} }
";
        let first = round_trip(source);
        let second = round_trip(&first);
        assert_eq!(first, second);
    }
}
