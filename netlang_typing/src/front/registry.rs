use crate::front::static_expr::StaticSubstitution;
use crate::front::types::Ty;
use crate::syntax::ast::StaticExpr;
use indexmap::IndexMap;
use netlang_util::swrite;
use netlang_util::swrite::swrite_separated;

/// The externally visible typing contract of a node.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Signature {
    pub inputs: Vec<Ty>,
    pub outputs: Vec<Ty>,
    pub params: Vec<String>,
    /// Conditions on the static parameters that every instantiation must satisfy.
    pub constraints: Vec<StaticExpr>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InstantiateError {
    UnboundNode,
    ParamsArity { found: usize, expected: usize },
}

/// All nodes that have been checked so far, by name.
pub struct Registry {
    nodes: IndexMap<String, Signature>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            nodes: IndexMap::new(),
        }
    }

    /// Register a node, replacing any previous signature with the same name.
    pub fn register(&mut self, name: String, signature: Signature) {
        self.nodes.insert(name, signature);
    }

    /// Specialize the signature of `name` for a call site with the given static arguments.
    pub fn instantiate(&self, name: &str, args: &[StaticExpr]) -> Result<Signature, InstantiateError> {
        let signature = self.nodes.get(name).ok_or(InstantiateError::UnboundNode)?;

        if args.len() != signature.params.len() {
            return Err(InstantiateError::ParamsArity {
                found: args.len(),
                expected: signature.params.len(),
            });
        }

        let subst: StaticSubstitution = signature.params.iter().cloned().zip(args.iter().cloned()).collect();
        Ok(signature.substitute(&subst))
    }
}

impl Signature {
    pub fn substitute(&self, subst: &StaticSubstitution) -> Signature {
        Signature {
            inputs: self.inputs.iter().map(|ty| ty.substitute_widths(subst)).collect(),
            outputs: self.outputs.iter().map(|ty| ty.substitute_widths(subst)).collect(),
            params: self.params.clone(),
            constraints: self.constraints.iter().map(|c| c.substitute(subst)).collect(),
        }
    }

    pub fn to_diagnostic_string(&self) -> String {
        let mut s = String::new();
        if !self.params.is_empty() {
            s.push('<');
            swrite_separated(&mut s, ", ", &self.params);
            s.push('>');
        }
        s.push('(');
        swrite_separated(&mut s, ", ", &self.inputs);
        s.push_str(") -> (");
        swrite_separated(&mut s, ", ", &self.outputs);
        s.push(')');
        if !self.constraints.is_empty() {
            swrite!(&mut s, " where ");
            swrite_separated(&mut s, ", ", &self.constraints);
        }
        s
    }
}
