//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod commands;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod prompt;
pub mod reconcile;
pub mod router;
pub mod tally;

#[cfg(test)]
pub(crate) mod test_support;
