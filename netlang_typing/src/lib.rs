//! Width and static type checking for netlang nodes.
//!
//! The entry point is [front::node::check_program], which checks all nodes of a parsed program in order,
//! registering each one so later nodes can instantiate it.

pub mod data;
pub mod error;
pub mod front;
pub mod syntax;
pub mod util;

#[cfg(test)]
mod tests;
