pub mod block;
pub mod constraints;
pub mod error;
pub mod expression;
pub mod node;
pub mod registry;
pub mod session;
pub mod static_expr;
pub mod types;
