//! Payload compilation for the @ys agent.
//!
//! Options are merged from the config file and the command line
//! ([`options::merge`]), then [`compiler::compile`] validates them and builds
//! the wire [`Payload`](ays_common::types::Payload). Multi-value reports go
//! through [`align::align`], thresholds through [`threshold::parse`] and child
//! node names through [`node_name::normalize`].

pub mod align;
pub mod compiler;
pub mod node_name;
pub mod options;
pub mod threshold;


pub use compiler::{compile, compile_with, DEFAULT_SERVER};
pub use options::{merge, Options};
