//! Shared wire types and errors for the @ys agent.

pub mod error;
pub mod types;
