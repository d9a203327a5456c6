use crate::data::diagnostic::{Diagnostic, Diagnostics};
use crate::front::node::{check_program, TypedProgram};
use crate::front::session::TypingSettings;
use crate::syntax::ast::{
    Block, DeclaredType, Equation, EquationBlock, Expression, ExpressionKind, Identifier, LocalDecl, NodeDef,
    Operator, Pattern, PortDecl, Program, StaticExpr, StaticIfBlock, Value,
};
use crate::syntax::pos::{FileId, Span};

mod check;

// Small AST builders, all nodes share the same dummy span.

fn sp() -> Span {
    Span::empty_at(FileId::SINGLE, 0)
}

fn id(name: &str) -> Identifier {
    Identifier {
        span: sp(),
        string: name.to_owned(),
    }
}

fn bits(width: StaticExpr) -> DeclaredType {
    DeclaredType::BitArray(width)
}

fn port(name: &str, ty: DeclaredType) -> PortDecl {
    PortDecl {
        span: sp(),
        id: id(name),
        ty,
    }
}

fn local(name: &str, ty: Option<DeclaredType>) -> LocalDecl {
    LocalDecl { id: id(name), ty }
}

fn expr(kind: ExpressionKind) -> Expression {
    Expression { span: sp(), kind }
}

fn var(name: &str) -> Expression {
    expr(ExpressionKind::Variable(id(name)))
}

fn bit(value: bool) -> Expression {
    expr(ExpressionKind::Const(Value::Bit(value)))
}

fn bit_array(values: &[bool]) -> Expression {
    expr(ExpressionKind::Const(Value::BitArray(values.to_vec())))
}

fn op(op: Operator, args: Vec<Expression>) -> Expression {
    expr(ExpressionKind::Operator { op, args })
}

fn call(node: &str, static_args: Vec<StaticExpr>, args: Vec<Expression>) -> Expression {
    expr(ExpressionKind::Call {
        node: id(node),
        static_args,
        args,
    })
}

fn equation(target: &str, expr: Expression) -> Equation {
    Equation {
        span: sp(),
        pattern: Pattern::Single(id(target)),
        expr,
    }
}

fn equation_tuple(targets: &[&str], expr: Expression) -> Equation {
    Equation {
        span: sp(),
        pattern: Pattern::Tuple(targets.iter().map(|t| id(t)).collect()),
        expr,
    }
}

fn equations(locals: Vec<LocalDecl>, equations: Vec<Equation>) -> Block {
    Block::Equations(EquationBlock {
        span: sp(),
        locals,
        equations,
    })
}

fn static_if(cond: StaticExpr, then_block: Block, else_block: Block) -> Block {
    Block::StaticIf(StaticIfBlock {
        span: sp(),
        cond,
        then_block: Box::new(then_block),
        else_block: Box::new(else_block),
    })
}

fn node(name: &str, params: &[&str], inputs: Vec<PortDecl>, outputs: Vec<PortDecl>, body: Block) -> NodeDef {
    NodeDef {
        span: sp(),
        id: id(name),
        params: params.iter().map(|p| id(p)).collect(),
        inputs,
        outputs,
        body,
    }
}

fn n(name: &str) -> StaticExpr {
    StaticExpr::var(name)
}

fn int(value: i64) -> StaticExpr {
    StaticExpr::int(value)
}

/// Check a program, returning the reported diagnostics on failure.
fn check_nodes(nodes: Vec<NodeDef>) -> Result<TypedProgram, Vec<Diagnostic>> {
    let diags = Diagnostics::new();
    let result = check_program(&diags, TypingSettings::default(), &Program { nodes });
    let diags = diags.finish();

    match result {
        Ok(program) => {
            assert!(diags.is_empty());
            Ok(program)
        }
        Err(_) => {
            assert_eq!(diags.len(), 1);
            Err(diags)
        }
    }
}

#[track_caller]
fn check_ok(nodes: Vec<NodeDef>) -> TypedProgram {
    match check_nodes(nodes) {
        Ok(program) => program,
        Err(diags) => panic!("expected success, got {:?}", diags),
    }
}

#[track_caller]
fn check_err(nodes: Vec<NodeDef>) -> Diagnostic {
    match check_nodes(nodes) {
        Ok(program) => panic!("expected failure, got {:?}", program),
        Err(mut diags) => diags.remove(0),
    }
}
