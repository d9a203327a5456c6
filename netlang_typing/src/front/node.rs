use crate::data::diagnostic::Diagnostics;
use crate::error::CompileResult;
use crate::front::block::TypedBlock;
use crate::front::constraints::{solve, ConstraintFalse};
use crate::front::error::{TypingError, TypingErrorKind, TypingResult};
use crate::front::expression::Env;
use crate::front::registry::Signature;
use crate::front::session::{CheckSession, TypingSettings};
use crate::front::types::Ty;
use crate::syntax::ast::{Identifier, NodeDef, PortDecl, Program};
use crate::syntax::pos::Span;
use indexmap::IndexSet;
use log::debug;

#[derive(Debug, Clone)]
pub struct TypedProgram {
    pub nodes: Vec<TypedNode>,
}

/// A node after checking, with all types fully resolved.
#[derive(Debug, Clone)]
pub struct TypedNode {
    pub span: Span,
    pub id: Identifier,
    pub params: Vec<Identifier>,
    pub inputs: Vec<(Identifier, Ty)>,
    pub outputs: Vec<(Identifier, Ty)>,
    pub body: TypedBlock,
    pub signature: Signature,
}

/// Check all nodes of `program` in declaration order.
///
/// Checking stops at the first node that fails, the error is reported to `diags`.
pub fn check_program(
    diags: &Diagnostics,
    settings: TypingSettings,
    program: &Program,
) -> CompileResult<TypedProgram> {
    let mut session = CheckSession::new(diags, settings);

    let mut nodes = vec![];
    for node in &program.nodes {
        nodes.push(session.check_node(node)?);
    }

    Ok(TypedProgram { nodes })
}

impl CheckSession<'_> {
    /// Check a single node and register its final signature.
    ///
    /// On failure the error is reported to the diagnostics collector,
    /// and any constraints gathered for this node are discarded.
    pub fn check_node(&mut self, node: &NodeDef) -> CompileResult<TypedNode> {
        debug!("checking node {}", node.id.string);

        match self.check_node_inner(node) {
            Ok(typed) => {
                debug!(
                    "checked node {}: {}",
                    node.id.string,
                    typed.signature.to_diagnostic_string()
                );
                Ok(typed)
            }
            Err(e) => {
                let _ = self.constraints.drain();
                Err(self.diags.report(e.to_diagnostic(&node.id)).into())
            }
        }
    }

    fn check_node_inner(&mut self, node: &NodeDef) -> TypingResult<TypedNode> {
        let NodeDef {
            span,
            id,
            params,
            inputs,
            outputs,
            body,
        } = node;

        // port types, each a fresh variable unified with its declared type
        let inputs = self.check_ports(inputs)?;
        let outputs = self.check_ports(outputs)?;
        let param_names: Vec<String> = params.iter().map(|p| p.string.clone()).collect();

        // provisional registration, allows the body to call this node recursively
        let provisional = Signature {
            inputs: inputs.iter().map(|(_, ty)| self.types.resolve(ty)).collect(),
            outputs: outputs.iter().map(|(_, ty)| self.types.resolve(ty)).collect(),
            params: param_names.clone(),
            constraints: vec![],
        };
        debug!("provisionally registering {}: {}", id.string, provisional.to_diagnostic_string());
        self.registry.register(id.string.clone(), provisional);

        // inputs first, outputs can shadow them
        let mut env = Env::new();
        for (port, ty) in inputs.iter().chain(&outputs) {
            env.insert(port.string.clone(), ty.clone());
        }

        let mut body = self.check_block(&env, body)?;

        // finalize
        body.finalize(&mut self.types);
        let inputs: Vec<(Identifier, Ty)> = inputs
            .into_iter()
            .map(|(port, ty)| (port, self.types.resolve(&ty)))
            .collect();
        let outputs: Vec<(Identifier, Ty)> = outputs
            .into_iter()
            .map(|(port, ty)| (port, self.types.resolve(&ty)))
            .collect();

        // solve
        let constraints = self.constraints.drain();
        let param_set: IndexSet<String> = param_names.iter().cloned().collect();
        let constraints = solve(&param_set, constraints).map_err(|ConstraintFalse { constraint }| {
            TypingError::new(*span, TypingErrorKind::StaticConstraintFalse(constraint))
        })?;

        let signature = Signature {
            inputs: inputs.iter().map(|(_, ty)| ty.clone()).collect(),
            outputs: outputs.iter().map(|(_, ty)| ty.clone()).collect(),
            params: param_names,
            constraints,
        };
        self.registry.register(id.string.clone(), signature.clone());

        Ok(TypedNode {
            span: *span,
            id: id.clone(),
            params: params.clone(),
            inputs,
            outputs,
            body,
            signature,
        })
    }

    fn check_ports(&mut self, ports: &[PortDecl]) -> TypingResult<Vec<(Identifier, Ty)>> {
        ports
            .iter()
            .map(|port| {
                let ty = self.types.fresh();
                self.unify_at(port.span, &ty, &Ty::from(&port.ty))?;
                Ok((port.id.clone(), ty))
            })
            .collect()
    }
}
