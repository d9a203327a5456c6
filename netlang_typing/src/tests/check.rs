use crate::data::diagnostic::{Diagnostic, DiagnosticStringSettings, Diagnostics};
use crate::front::block::TypedBlock;
use crate::front::node::check_program;
use crate::front::session::TypingSettings;
use crate::front::types::Ty;
use crate::syntax::ast::{
    Block, DeclaredType, Equation, EquationBlock, Expression, ExpressionKind, GateOp, Identifier, NodeDef, Operator,
    Pattern, PortDecl, Program, StaticBinaryOp, StaticExpr,
};
use crate::syntax::pos::Span;
use crate::syntax::source::SourceDatabase;
use crate::tests::{
    bit, bit_array, bits, call, check_err, check_ok, equation, equation_tuple, equations, int, local, n, node, op,
    port, static_if, var,
};

fn sub(left: StaticExpr, right: StaticExpr) -> StaticExpr {
    StaticExpr::binary(StaticBinaryOp::Sub, left, right)
}

fn add(left: StaticExpr, right: StaticExpr) -> StaticExpr {
    StaticExpr::binary(StaticBinaryOp::Add, left, right)
}

#[track_caller]
fn assert_error(diag: &Diagnostic, title: &str, label: &str) {
    assert_eq!(diag.title, title);
    let labels: Vec<&str> = diag.annotations.iter().map(|a| a.label.as_str()).collect();
    assert!(labels.contains(&label), "label {:?} not in {:?}", label, labels);
}

/// `pair(x: bit) -> (p: bit, q: bit[2])`, duplicates its input.
fn pair_node() -> NodeDef {
    node(
        "pair",
        &[],
        vec![port("x", DeclaredType::Bit)],
        vec![port("p", DeclaredType::Bit), port("q", bits(int(2)))],
        equations(
            vec![],
            vec![
                equation("p", var("x")),
                equation("q", op(Operator::Concat, vec![var("x"), var("x")])),
            ],
        ),
    )
}

#[test]
fn check_gate() {
    let program = check_ok(vec![node(
        "nand_gate",
        &[],
        vec![port("a", DeclaredType::Bit), port("b", DeclaredType::Bit)],
        vec![port("o", DeclaredType::Bit)],
        equations(
            vec![],
            vec![equation("o", op(Operator::Gate(GateOp::Nand), vec![var("a"), var("b")]))],
        ),
    )]);

    let signature = &program.nodes[0].signature;
    assert_eq!(signature.inputs, vec![Ty::Bit, Ty::Bit]);
    assert_eq!(signature.outputs, vec![Ty::Bit]);
    assert!(signature.constraints.is_empty());
    assert_eq!(signature.to_diagnostic_string(), "(bit, bit) -> (bit)");
}

#[test]
fn check_bit_operators() {
    let body = equations(
        vec![local("r", None)],
        vec![
            equation("r", op(Operator::Reg, vec![var("o")])),
            equation(
                "o",
                op(
                    Operator::Mux,
                    vec![var("s"), op(Operator::Not, vec![var("r")]), bit(true)],
                ),
            ),
        ],
    );
    check_ok(vec![node(
        "toggle",
        &[],
        vec![port("s", DeclaredType::Bit)],
        vec![port("o", DeclaredType::Bit)],
        body,
    )]);
}

#[test]
fn check_select_parameter_width() {
    let program = check_ok(vec![node(
        "sel",
        &["n"],
        vec![port("x", bits(n("n")))],
        vec![port("o", DeclaredType::Bit)],
        equations(vec![], vec![equation("o", op(Operator::Select(int(5)), vec![var("x")]))]),
    )]);

    let signature = &program.nodes[0].signature;
    assert_eq!(signature.constraints, vec![StaticExpr::lte(int(5), n("n"))]);
    assert_eq!(signature.to_diagnostic_string(), "<n>(bit[n]) -> (bit) where 5 <= n");
}

#[test]
fn check_select_internal_width_stays_unresolved() {
    let program = check_ok(vec![node(
        "sel",
        &[],
        vec![],
        vec![port("o", DeclaredType::Bit)],
        equations(
            vec![local("t", None)],
            vec![equation("o", op(Operator::Select(int(5)), vec![var("t")]))],
        ),
    )]);

    assert_eq!(program.nodes[0].signature.constraints, vec![StaticExpr::lte(int(5), n("$w0"))]);
}

#[test]
fn check_select_fixed_width() {
    let sel = |index: i64| {
        node(
            "sel",
            &[],
            vec![port("x", bits(int(8)))],
            vec![port("o", DeclaredType::Bit)],
            equations(vec![], vec![equation("o", op(Operator::Select(int(index)), vec![var("x")]))]),
        )
    };

    let program = check_ok(vec![sel(5)]);
    assert!(program.nodes[0].signature.constraints.is_empty());

    let diag = check_err(vec![sel(9)]);
    assert_error(&diag, "static constraint is always false", "constraint `9 <= $w0` can never hold");
}

#[test]
fn check_bit_as_array_width() {
    let copy = |params: &[&str]| {
        node(
            "copy",
            params,
            vec![port("x", bits(n("w")))],
            vec![port("o", DeclaredType::Bit)],
            equations(vec![], vec![equation("o", var("x"))]),
        )
    };

    let program = check_ok(vec![copy(&["w"])]);
    assert_eq!(program.nodes[0].signature.constraints, vec![StaticExpr::equal(n("w"), int(1))]);

    let program = check_ok(vec![copy(&[])]);
    assert!(program.nodes[0].signature.constraints.is_empty());
}

#[test]
fn check_concat_then_select() {
    let program = check_ok(vec![node(
        "cat",
        &["a", "b", "i"],
        vec![port("x", bits(n("a"))), port("y", bits(n("b")))],
        vec![port("o", DeclaredType::Bit)],
        equations(
            vec![],
            vec![equation(
                "o",
                op(
                    Operator::Select(n("i")),
                    vec![op(Operator::Concat, vec![var("x"), var("y")])],
                ),
            )],
        ),
    )]);

    let constraints = &program.nodes[0].signature.constraints;
    assert_eq!(constraints, &vec![StaticExpr::lte(n("i"), add(n("a"), n("b")))]);
    assert_eq!(constraints[0].to_string(), "i <= (a + b)");
}

#[test]
fn check_slice() {
    let program = check_ok(vec![node(
        "low",
        &[],
        vec![port("x", bits(int(8)))],
        vec![port("o", bits(int(4)))],
        equations(vec![], vec![equation("o", op(Operator::Slice(int(1), int(4)), vec![var("x")]))]),
    )]);
    assert!(program.nodes[0].signature.constraints.is_empty());

    let diag = check_err(vec![node(
        "low",
        &[],
        vec![port("x", bits(int(8)))],
        vec![port("o", bits(int(4)))],
        equations(vec![], vec![equation("o", op(Operator::Slice(int(0), int(3)), vec![var("x")]))]),
    )]);
    assert_error(&diag, "static constraint is always false", "constraint `0 < 0` can never hold");
}

#[test]
fn check_memories() {
    let rom = op(
        Operator::Rom {
            addr_size: n("a"),
            word_size: n("w"),
        },
        vec![var("addr")],
    );
    let ram = op(
        Operator::Ram {
            addr_size: n("a"),
            word_size: n("w"),
        },
        vec![var("addr"), var("we"), var("addr"), var("data")],
    );

    let program = check_ok(vec![node(
        "mem",
        &["a", "w"],
        vec![
            port("addr", bits(n("a"))),
            port("we", DeclaredType::Bit),
            port("data", bits(n("w"))),
        ],
        vec![port("rom_out", bits(n("w"))), port("ram_out", bits(n("w")))],
        equations(vec![], vec![equation("rom_out", rom), equation("ram_out", ram)]),
    )]);
    assert!(program.nodes[0].signature.constraints.is_empty());

    let diag = check_err(vec![node(
        "mem",
        &["a", "w"],
        vec![port("addr", bits(n("a")))],
        vec![port("o", bits(n("w")))],
        equations(
            vec![],
            vec![equation(
                "o",
                op(
                    Operator::Ram {
                        addr_size: n("a"),
                        word_size: n("w"),
                    },
                    vec![var("addr")],
                ),
            )],
        ),
    )]);
    assert_error(&diag, "wrong number of arguments", "found 1 arguments, expected 4");
}

#[test]
fn check_bit_array_constant() {
    let program = check_ok(vec![node(
        "konst",
        &[],
        vec![],
        vec![port("o", bits(int(3)))],
        equations(vec![], vec![equation("o", bit_array(&[true, false, true]))]),
    )]);
    assert!(program.nodes[0].signature.constraints.is_empty());

    let diag = check_err(vec![node(
        "konst",
        &[],
        vec![],
        vec![port("o", bits(int(3)))],
        equations(vec![], vec![equation("o", bit_array(&[true, false]))]),
    )]);
    assert_error(&diag, "static constraint is always false", "constraint `2 = 3` can never hold");
}

#[test]
fn check_call_with_multiple_outputs() {
    let user = node(
        "user",
        &[],
        vec![port("x", DeclaredType::Bit)],
        vec![port("a", DeclaredType::Bit), port("b", bits(int(2)))],
        equations(vec![], vec![equation_tuple(&["a", "b"], call("pair", vec![], vec![var("x")]))]),
    );

    let program = check_ok(vec![pair_node(), user]);
    assert_eq!(program.nodes.len(), 2);
    assert!(program.nodes[0].signature.constraints.is_empty());
    assert_eq!(
        program.nodes[0].signature.to_diagnostic_string(),
        "(bit) -> (bit, bit[2])"
    );
}

#[test]
fn check_call_result_arity() {
    let user = node(
        "user",
        &[],
        vec![port("x", DeclaredType::Bit)],
        vec![port("a", DeclaredType::Bit), port("b", bits(int(2)))],
        equations(
            vec![local("c", None)],
            vec![equation_tuple(&["a", "b", "c"], call("pair", vec![], vec![var("x")]))],
        ),
    );

    let diag = check_err(vec![pair_node(), user]);
    assert_error(&diag, "wrong number of results", "found 2 results, expected 3");
}

#[test]
fn check_call_type_mismatch() {
    let user = node(
        "user",
        &[],
        vec![port("x", DeclaredType::Bit)],
        vec![port("a", DeclaredType::Bit)],
        equations(vec![], vec![equation("a", call("pair", vec![], vec![var("x")]))]),
    );

    let diag = check_err(vec![pair_node(), user]);
    assert_error(&diag, "type mismatch", "found type `(bit, bit[2])`, expected `bit`");
}

#[test]
fn check_call_instantiates_constraints() {
    let sel = node(
        "sel",
        &["n"],
        vec![port("x", bits(n("n")))],
        vec![port("o", DeclaredType::Bit)],
        equations(vec![], vec![equation("o", op(Operator::Select(int(5)), vec![var("x")]))]),
    );
    let user = |width: i64| {
        node(
            "user",
            &[],
            vec![port("x", bits(int(width)))],
            vec![port("o", DeclaredType::Bit)],
            equations(vec![], vec![equation("o", call("sel", vec![int(width)], vec![var("x")]))]),
        )
    };

    let program = check_ok(vec![sel.clone(), user(8)]);
    assert!(program.nodes[1].signature.constraints.is_empty());

    let diag = check_err(vec![sel, user(4)]);
    assert_error(&diag, "static constraint is always false", "constraint `5 <= 4` can never hold");
}

#[test]
fn check_recursive_call() {
    // chain<n>(x: bit[n]) -> (o: bit):
    //   if n = 0 then o = 0
    //   else y = slice(2, n)(x); o = chain<n - 1>(y)
    let base = equations(vec![], vec![equation("o", bit(false))]);
    let step = equations(
        vec![local("y", Some(bits(sub(n("n"), int(1)))))],
        vec![
            equation("y", op(Operator::Slice(int(2), n("n")), vec![var("x")])),
            equation("o", call("chain", vec![sub(n("n"), int(1))], vec![var("y")])),
        ],
    );
    let chain = node(
        "chain",
        &["n"],
        vec![port("x", bits(n("n")))],
        vec![port("o", DeclaredType::Bit)],
        static_if(StaticExpr::equal(n("n"), int(0)), base, step),
    );

    let program = check_ok(vec![chain]);
    let signature = &program.nodes[0].signature;
    assert_eq!(signature.params, vec!["n".to_owned()]);

    // the slice width is not rewritten into `n - 1`
    let slice_width = add(sub(n("n"), int(2)), int(1));
    assert_eq!(
        signature.constraints,
        vec![StaticExpr::equal(slice_width, sub(n("n"), int(1)))]
    );
}

#[test]
fn check_static_if_refines_true_branch() {
    let checker = |cond: StaticExpr| {
        node(
            "f",
            &["n"],
            vec![port("x", bits(n("n")))],
            vec![port("o", DeclaredType::Bit)],
            static_if(
                cond,
                equations(vec![], vec![equation("o", var("x"))]),
                equations(vec![], vec![equation("o", op(Operator::Select(int(1)), vec![var("x")]))]),
            ),
        )
    };

    // `n = 1` makes `x` a single bit wide in the true branch
    let program = check_ok(vec![checker(StaticExpr::equal(n("n"), int(1)))]);
    assert_eq!(program.nodes[0].signature.constraints, vec![StaticExpr::lte(int(1), n("n"))]);

    // other guard shapes are not used for refinement
    let program = check_ok(vec![checker(StaticExpr::equal(int(1), n("n")))]);
    assert_eq!(
        program.nodes[0].signature.constraints,
        vec![StaticExpr::equal(n("n"), int(1)), StaticExpr::lte(int(1), n("n"))]
    );
}

#[test]
fn check_static_if_guard_must_be_bool() {
    let diag = check_err(vec![node(
        "f",
        &["n"],
        vec![],
        vec![port("o", DeclaredType::Bit)],
        static_if(
            n("n"),
            equations(vec![], vec![equation("o", bit(true))]),
            equations(vec![], vec![equation("o", bit(false))]),
        ),
    )]);
    assert_error(&diag, "static type mismatch", "found static type `int`, expected `bool`");
}

#[test]
fn check_static_args_must_be_int() {
    let diag = check_err(vec![node(
        "f",
        &[],
        vec![port("x", bits(int(4)))],
        vec![port("o", DeclaredType::Bit)],
        equations(
            vec![],
            vec![equation("o", op(Operator::Select(StaticExpr::Bool(true)), vec![var("x")]))],
        ),
    )]);
    assert_error(&diag, "static type mismatch", "found static type `bool`, expected `int`");
}

#[test]
fn check_params_arity() {
    let user = node(
        "user",
        &[],
        vec![port("x", DeclaredType::Bit)],
        vec![port("a", DeclaredType::Bit), port("b", bits(int(2)))],
        equations(vec![], vec![equation_tuple(&["a", "b"], call("pair", vec![int(3)], vec![var("x")]))]),
    );

    let diag = check_err(vec![pair_node(), user]);
    assert_error(&diag, "wrong number of static parameters", "found 1 static parameters, expected 0");
}

#[test]
fn check_unbound_names() {
    let body = |expr: Expression| equations(vec![], vec![equation("o", expr)]);
    let single = |expr: Expression| {
        node(
            "f",
            &[],
            vec![port("x", DeclaredType::Bit)],
            vec![port("o", DeclaredType::Bit)],
            body(expr),
        )
    };

    let diag = check_err(vec![single(var("z"))]);
    assert_error(&diag, "unbound variable `z`", "variable not found");

    let diag = check_err(vec![single(call("missing", vec![], vec![var("x")]))]);
    assert_error(&diag, "unbound node `missing`", "node not found");

    // nodes can only call nodes declared before them
    let user = node(
        "user",
        &[],
        vec![port("x", DeclaredType::Bit)],
        vec![port("a", DeclaredType::Bit), port("b", bits(int(2)))],
        equations(vec![], vec![equation_tuple(&["a", "b"], call("pair", vec![], vec![var("x")]))]),
    );
    let diag = check_err(vec![user, pair_node()]);
    assert_error(&diag, "unbound node `pair`", "node not found");
}

#[test]
fn check_aborts_at_first_failing_node() {
    let bad = node(
        "bad",
        &[],
        vec![],
        vec![port("o", DeclaredType::Bit)],
        equations(vec![], vec![equation("o", var("missing"))]),
    );
    let also_bad = node(
        "also_bad",
        &[],
        vec![],
        vec![port("o", DeclaredType::Bit)],
        equations(vec![], vec![equation("o", var("missing"))]),
    );

    // only a single diagnostic is reported
    let diag = check_err(vec![pair_node(), bad, also_bad]);
    assert_eq!(diag.title, "unbound variable `missing`");
}

#[test]
fn check_typed_output_is_resolved() {
    let program = check_ok(vec![node(
        "f",
        &[],
        vec![port("x", bits(int(4)))],
        vec![port("o", bits(int(4)))],
        equations(
            vec![local("t", None)],
            vec![equation("t", var("x")), equation("o", var("t"))],
        ),
    )]);

    let typed = &program.nodes[0];
    assert_eq!(typed.inputs[0].1, Ty::BitArray(int(4)));
    assert_eq!(typed.outputs[0].1, Ty::BitArray(int(4)));

    let TypedBlock::Equations(block) = &typed.body else {
        panic!("expected equation block");
    };
    assert_eq!(block.locals[0].0.string, "t");
    assert_eq!(block.locals[0].1, Ty::BitArray(int(4)));
    for equation in &block.equations {
        assert_eq!(equation.expr.ty, Ty::BitArray(int(4)));
    }
}

#[test]
fn check_diagnostic_rendering() {
    let src = "node top(a: bit) -> (o: bit) {\n    o = missing(a);\n}\n";
    let mut database = SourceDatabase::new();
    let file = database.add_file("top.net".to_owned(), src.to_owned());

    let span_of = |s: &str| {
        let start = src.find(s).unwrap();
        Span::new(file, start, start + s.len())
    };
    let ident = |s: &str, span: Span| Identifier {
        span,
        string: s.to_owned(),
    };

    let call_span = span_of("missing(a)");
    assert_eq!(database.span_str(call_span), "missing(a)");
    let arg_span = Span::new(file, call_span.end - 2, call_span.end - 1);
    let node = NodeDef {
        span: Span::new(file, 0, src.len() - 1),
        id: ident("top", span_of("top")),
        params: vec![],
        inputs: vec![PortDecl {
            span: span_of("a: bit"),
            id: ident("a", span_of("a: bit")),
            ty: DeclaredType::Bit,
        }],
        outputs: vec![PortDecl {
            span: span_of("o: bit"),
            id: ident("o", span_of("o: bit")),
            ty: DeclaredType::Bit,
        }],
        body: Block::Equations(EquationBlock {
            span: span_of("{\n    o = missing(a);\n}"),
            locals: vec![],
            equations: vec![Equation {
                span: span_of("o = missing(a);"),
                pattern: Pattern::Single(ident("o", span_of("o = "))),
                expr: Expression {
                    span: call_span,
                    kind: ExpressionKind::Call {
                        node: ident("missing", span_of("missing")),
                        static_args: vec![],
                        args: vec![Expression {
                            span: arg_span,
                            kind: ExpressionKind::Variable(ident("a", arg_span)),
                        }],
                    },
                },
            }],
        }),
    };

    let diags = Diagnostics::new();
    let result = check_program(&diags, TypingSettings::default(), &Program { nodes: vec![node] });
    assert!(result.is_err());

    let mut diags = diags.finish();
    assert_eq!(diags.len(), 1);
    let settings = DiagnosticStringSettings {
        styled: false,
        ..DiagnosticStringSettings::default()
    };
    let rendered = diags.remove(0).to_string(&database, settings);

    assert!(rendered.contains("unbound node `missing`"), "{}", rendered);
    assert!(rendered.contains("node not found"), "{}", rendered);
    assert!(rendered.contains("while checking node `top`"), "{}", rendered);
    assert!(rendered.contains("top.net"), "{}", rendered);
}
