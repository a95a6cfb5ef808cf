//! Shared utilities for the tokenizer
//!
//! Source positions, spans over the input buffer, and a source map for
//! rendering positioned diagnostics.

pub mod span;

pub use span::{Position, SourceMap, Span};
