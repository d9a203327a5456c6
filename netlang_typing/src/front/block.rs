use crate::front::error::{TypingError, TypingErrorKind, TypingResult};
use crate::front::expression::{Env, TypedExpression};
use crate::front::session::CheckSession;
use crate::front::static_expr::{StaticSubstitution, StaticType};
use crate::front::types::{Ty, TypeStore};
use crate::syntax::ast::{Block, EquationBlock, Identifier, Pattern, StaticExpr, StaticIfBlock};
use crate::syntax::pos::Span;

#[derive(Debug, Clone)]
pub enum TypedBlock {
    Equations(TypedEquationBlock),
    StaticIf(TypedStaticIfBlock),
}

#[derive(Debug, Clone)]
pub struct TypedEquationBlock {
    pub span: Span,
    pub locals: Vec<(Identifier, Ty)>,
    pub equations: Vec<TypedEquation>,
}

#[derive(Debug, Clone)]
pub struct TypedEquation {
    pub span: Span,
    pub pattern: Pattern,
    pub expr: TypedExpression,
}

#[derive(Debug, Clone)]
pub struct TypedStaticIfBlock {
    pub span: Span,
    pub cond: StaticExpr,
    pub then_block: Box<TypedBlock>,
    pub else_block: Box<TypedBlock>,
}

impl CheckSession<'_> {
    pub fn check_block(&mut self, env: &Env, block: &Block) -> TypingResult<TypedBlock> {
        match block {
            Block::Equations(block) => Ok(TypedBlock::Equations(self.check_equation_block(env, block)?)),
            Block::StaticIf(block) => Ok(TypedBlock::StaticIf(self.check_static_if_block(env, block)?)),
        }
    }

    fn check_equation_block(&mut self, env: &Env, block: &EquationBlock) -> TypingResult<TypedEquationBlock> {
        let EquationBlock { span, locals, equations } = block;

        // declare locals, shadowing outer variables
        let mut env = env.clone();
        let mut typed_locals = vec![];
        for local in locals {
            let ty = self.types.fresh();
            if let Some(declared) = &local.ty {
                self.unify_at(local.id.span, &ty, &Ty::from(declared))?;
            }
            env.insert(local.id.string.clone(), ty.clone());
            typed_locals.push((local.id.clone(), ty));
        }

        let mut typed_equations = vec![];
        for equation in equations {
            let pattern_ty = self.pattern_type(&env, &equation.pattern)?;
            let expr = self.check_expression(&env, &equation.expr, &pattern_ty)?;
            typed_equations.push(TypedEquation {
                span: equation.span,
                pattern: equation.pattern.clone(),
                expr,
            });
        }

        Ok(TypedEquationBlock {
            span: *span,
            locals: typed_locals,
            equations: typed_equations,
        })
    }

    fn check_static_if_block(&mut self, env: &Env, block: &StaticIfBlock) -> TypingResult<TypedStaticIfBlock> {
        let StaticIfBlock {
            span,
            cond,
            then_block,
            else_block,
        } = block;

        self.expect_static(*span, cond, StaticType::Bool)?;

        // a `var = expr` condition lets the true branch assume the equality in all widths
        let then_env = match cond.as_var_equality() {
            Some((var, value)) => {
                let mut subst = StaticSubstitution::new();
                subst.insert(var.to_owned(), value.clone());
                self.refine_env(env, &subst)
            }
            None => env.clone(),
        };

        let then_block = self.check_block(&then_env, then_block)?;
        let else_block = self.check_block(env, else_block)?;

        Ok(TypedStaticIfBlock {
            span: *span,
            cond: cond.clone(),
            then_block: Box::new(then_block),
            else_block: Box::new(else_block),
        })
    }

    fn refine_env(&mut self, env: &Env, subst: &StaticSubstitution) -> Env {
        env.iter()
            .map(|(name, ty)| (name.clone(), self.types.substitute_widths(ty, subst)))
            .collect()
    }

    fn pattern_type(&self, env: &Env, pattern: &Pattern) -> TypingResult<Ty> {
        let lookup = |id: &Identifier| {
            env.get(&id.string)
                .cloned()
                .ok_or_else(|| TypingError::new(id.span, TypingErrorKind::UnboundVariable(id.string.clone())))
        };

        match pattern {
            Pattern::Single(id) => lookup(id),
            Pattern::Tuple(ids) => Ok(Ty::Product(ids.iter().map(lookup).collect::<TypingResult<_>>()?)),
        }
    }
}

impl TypedBlock {
    pub fn finalize(&mut self, types: &mut TypeStore) {
        match self {
            TypedBlock::Equations(block) => {
                for (_, ty) in &mut block.locals {
                    *ty = types.resolve(ty);
                }
                for equation in &mut block.equations {
                    equation.expr.finalize(types);
                }
            }
            TypedBlock::StaticIf(block) => {
                block.then_block.finalize(types);
                block.else_block.finalize(types);
            }
        }
    }
}
