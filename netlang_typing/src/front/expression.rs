use crate::front::error::{TypingError, TypingErrorKind, TypingResult};
use crate::front::registry::InstantiateError;
use crate::front::session::CheckSession;
use crate::front::static_expr::StaticType;
use crate::front::types::{Ty, TypeStore};
use crate::syntax::ast::{Expression, ExpressionKind, Identifier, Operator, StaticBinaryOp, StaticExpr, Value};
use crate::syntax::pos::Span;
use indexmap::IndexMap;
use itertools::zip_eq;

/// Types of all variables visible in the current block.
pub type Env = IndexMap<String, Ty>;

#[derive(Debug, Clone)]
pub struct TypedExpression {
    pub span: Span,
    pub ty: Ty,
    pub kind: TypedExpressionKind,
}

#[derive(Debug, Clone)]
pub enum TypedExpressionKind {
    Const(Value),
    Variable(String),
    Operator {
        op: Operator,
        args: Vec<TypedExpression>,
    },
    Call {
        node: String,
        static_args: Vec<StaticExpr>,
        args: Vec<TypedExpression>,
    },
}

impl CheckSession<'_> {
    pub fn infer_expression(&mut self, env: &Env, expr: &Expression) -> TypingResult<TypedExpression> {
        let span = expr.span;

        let (kind, ty) = match &expr.kind {
            ExpressionKind::Const(value) => {
                let ty = match value {
                    Value::Bit(_) => Ty::Bit,
                    Value::BitArray(bits) => Ty::BitArray(StaticExpr::int(bits.len())),
                };
                (TypedExpressionKind::Const(value.clone()), ty)
            }
            ExpressionKind::Variable(id) => {
                let ty = env
                    .get(&id.string)
                    .ok_or_else(|| TypingError::new(id.span, TypingErrorKind::UnboundVariable(id.string.clone())))?;
                (TypedExpressionKind::Variable(id.string.clone()), ty.clone())
            }
            ExpressionKind::Operator { op, args } => {
                let (args, ty) = self.infer_operator(env, span, op, args)?;
                let kind = TypedExpressionKind::Operator { op: op.clone(), args };
                (kind, ty)
            }
            ExpressionKind::Call { node, static_args, args } => {
                let (args, ty) = self.infer_call(env, span, node, static_args, args)?;
                let kind = TypedExpressionKind::Call {
                    node: node.string.clone(),
                    static_args: static_args.clone(),
                    args,
                };
                (kind, ty)
            }
        };

        Ok(TypedExpression { span, ty, kind })
    }

    pub fn check_expression(&mut self, env: &Env, expr: &Expression, expected: &Ty) -> TypingResult<TypedExpression> {
        let typed = self.infer_expression(env, expr)?;
        self.unify_at(expr.span, &typed.ty, expected)?;
        Ok(typed)
    }

    fn check_args(
        &mut self,
        env: &Env,
        span: Span,
        args: &[Expression],
        expected: &[Ty],
    ) -> TypingResult<Vec<TypedExpression>> {
        if args.len() != expected.len() {
            let kind = TypingErrorKind::ArgsArity {
                found: args.len(),
                expected: expected.len(),
            };
            return Err(TypingError::new(span, kind));
        }

        zip_eq(args, expected)
            .map(|(arg, expected)| self.check_expression(env, arg, expected))
            .collect()
    }

    fn infer_operator(
        &mut self,
        env: &Env,
        span: Span,
        op: &Operator,
        args: &[Expression],
    ) -> TypingResult<(Vec<TypedExpression>, Ty)> {
        match op {
            Operator::Reg | Operator::Not => {
                let args = self.check_args(env, span, args, &[Ty::Bit])?;
                Ok((args, Ty::Bit))
            }
            Operator::Gate(_) => {
                let args = self.check_args(env, span, args, &[Ty::Bit, Ty::Bit])?;
                Ok((args, Ty::Bit))
            }
            Operator::Mux => {
                let args = self.check_args(env, span, args, &[Ty::Bit, Ty::Bit, Ty::Bit])?;
                Ok((args, Ty::Bit))
            }
            Operator::Select(index) => {
                self.expect_static(span, index, StaticType::Int)?;
                let width = self.fresh_width();
                let args = self.check_args(env, span, args, &[Ty::BitArray(width.clone())])?;
                self.constraints.emit(StaticExpr::lte(index.clone(), width));
                Ok((args, Ty::Bit))
            }
            Operator::Slice(start, end) => {
                self.expect_static(span, start, StaticType::Int)?;
                self.expect_static(span, end, StaticType::Int)?;
                let width = self.fresh_width();
                let args = self.check_args(env, span, args, &[Ty::BitArray(width.clone())])?;
                self.constraints
                    .emit(StaticExpr::binary(StaticBinaryOp::Lt, StaticExpr::int(0), start.clone()));
                self.constraints.emit(StaticExpr::lte(end.clone(), width));

                let result_width = StaticExpr::binary(
                    StaticBinaryOp::Add,
                    StaticExpr::binary(StaticBinaryOp::Sub, end.clone(), start.clone()),
                    StaticExpr::int(1),
                );
                Ok((args, Ty::BitArray(result_width.simplify())))
            }
            Operator::Concat => {
                let left = self.fresh_width();
                let right = self.fresh_width();
                let expected = [Ty::BitArray(left.clone()), Ty::BitArray(right.clone())];
                let args = self.check_args(env, span, args, &expected)?;
                let result_width = StaticExpr::binary(StaticBinaryOp::Add, left, right);
                Ok((args, Ty::BitArray(result_width)))
            }
            Operator::Rom { addr_size, word_size } => {
                self.expect_static(span, addr_size, StaticType::Int)?;
                self.expect_static(span, word_size, StaticType::Int)?;
                let args = self.check_args(env, span, args, &[Ty::BitArray(addr_size.clone())])?;
                Ok((args, Ty::BitArray(word_size.clone())))
            }
            Operator::Ram { addr_size, word_size } => {
                self.expect_static(span, addr_size, StaticType::Int)?;
                self.expect_static(span, word_size, StaticType::Int)?;
                // read_addr, write_enable, write_addr, data_in
                let expected = [
                    Ty::BitArray(addr_size.clone()),
                    Ty::Bit,
                    Ty::BitArray(addr_size.clone()),
                    Ty::BitArray(word_size.clone()),
                ];
                let args = self.check_args(env, span, args, &expected)?;
                Ok((args, Ty::BitArray(word_size.clone())))
            }
        }
    }

    fn infer_call(
        &mut self,
        env: &Env,
        span: Span,
        node: &Identifier,
        static_args: &[StaticExpr],
        args: &[Expression],
    ) -> TypingResult<(Vec<TypedExpression>, Ty)> {
        for static_arg in static_args {
            self.expect_static(span, static_arg, StaticType::Int)?;
        }

        let signature = self
            .registry
            .instantiate(&node.string, static_args)
            .map_err(|e| match e {
                InstantiateError::UnboundNode => {
                    TypingError::new(node.span, TypingErrorKind::UnboundNode(node.string.clone()))
                }
                InstantiateError::ParamsArity { found, expected } => {
                    TypingError::new(span, TypingErrorKind::ParamsArity { found, expected })
                }
            })?;

        let args = self.check_args(env, span, args, &signature.inputs)?;

        // the callee requirements now become requirements of the caller
        for constraint in signature.constraints {
            self.constraints.emit(constraint);
        }

        Ok((args, Ty::from_outputs(signature.outputs)))
    }
}

impl TypedExpression {
    /// Replace all types in this expression tree by their fully resolved version.
    pub fn finalize(&mut self, types: &mut TypeStore) {
        self.ty = types.resolve(&self.ty);
        match &mut self.kind {
            TypedExpressionKind::Const(_) | TypedExpressionKind::Variable(_) => {}
            TypedExpressionKind::Operator { op: _, args } | TypedExpressionKind::Call { args, .. } => {
                for arg in args {
                    arg.finalize(types);
                }
            }
        }
    }
}
