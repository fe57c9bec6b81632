//! Interpreter helper functions

pub mod quoting;
pub mod tilde;
