use crate::syntax::pos::Span;
use num_bigint::BigInt;

#[derive(Debug, Clone)]
pub struct Program {
    pub nodes: Vec<NodeDef>,
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub span: Span,
    pub string: String,
}

#[derive(Debug, Clone)]
pub struct NodeDef {
    pub span: Span,
    pub id: Identifier,
    /// Static parameters, all of them are integers.
    pub params: Vec<Identifier>,
    pub inputs: Vec<PortDecl>,
    pub outputs: Vec<PortDecl>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct PortDecl {
    pub span: Span,
    pub id: Identifier,
    /// The parser fills in [DeclaredType::Bit] when the port has no annotation.
    pub ty: DeclaredType,
}

#[derive(Debug, Clone)]
pub struct LocalDecl {
    pub id: Identifier,
    pub ty: Option<DeclaredType>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DeclaredType {
    Bit,
    BitArray(StaticExpr),
}

#[derive(Debug, Clone)]
pub enum Block {
    Equations(EquationBlock),
    StaticIf(StaticIfBlock),
}

#[derive(Debug, Clone)]
pub struct EquationBlock {
    pub span: Span,
    pub locals: Vec<LocalDecl>,
    pub equations: Vec<Equation>,
}

/// Compile-time branch, both branches are checked but only one will be elaborated.
#[derive(Debug, Clone)]
pub struct StaticIfBlock {
    pub span: Span,
    pub cond: StaticExpr,
    pub then_block: Box<Block>,
    pub else_block: Box<Block>,
}

#[derive(Debug, Clone)]
pub struct Equation {
    pub span: Span,
    pub pattern: Pattern,
    pub expr: Expression,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Single(Identifier),
    Tuple(Vec<Identifier>),
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub span: Span,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Const(Value),
    Variable(Identifier),
    Operator { op: Operator, args: Vec<Expression> },
    Call {
        node: Identifier,
        static_args: Vec<StaticExpr>,
        args: Vec<Expression>,
    },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Value {
    Bit(bool),
    BitArray(Vec<bool>),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Operator {
    Reg,
    Not,
    Gate(GateOp),
    Mux,
    Select(StaticExpr),
    Slice(StaticExpr, StaticExpr),
    Concat,
    Rom { addr_size: StaticExpr, word_size: StaticExpr },
    Ram { addr_size: StaticExpr, word_size: StaticExpr },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum GateOp {
    #[strum(serialize = "and")]
    And,
    #[strum(serialize = "or")]
    Or,
    #[strum(serialize = "xor")]
    Xor,
    #[strum(serialize = "nand")]
    Nand,
}

/// Expression that is fully known at node instantiation time.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum StaticExpr {
    Int(BigInt),
    Bool(bool),
    Var(String),
    Binary(StaticBinaryOp, Box<StaticExpr>, Box<StaticExpr>),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, strum::Display)]
pub enum StaticBinaryOp {
    // arithmetic
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "^")]
    Pow,

    // relational
    #[strum(serialize = "=")]
    Eq,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Lte,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Gte,
}

impl StaticExpr {
    pub fn int(value: impl Into<BigInt>) -> StaticExpr {
        StaticExpr::Int(value.into())
    }

    pub fn var(name: impl Into<String>) -> StaticExpr {
        StaticExpr::Var(name.into())
    }

    pub fn binary(op: StaticBinaryOp, left: StaticExpr, right: StaticExpr) -> StaticExpr {
        StaticExpr::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn equal(left: StaticExpr, right: StaticExpr) -> StaticExpr {
        StaticExpr::binary(StaticBinaryOp::Eq, left, right)
    }

    pub fn lte(left: StaticExpr, right: StaticExpr) -> StaticExpr {
        StaticExpr::binary(StaticBinaryOp::Lte, left, right)
    }
}
