//! Diagnostics surface shared by every stream and combinator
//!
//! Positioned [`ParseError`] values for source problems, [`internal_error`]
//! for calling-layer bugs, and a [`WarningSink`] for non-fatal findings.

pub mod error;

pub use error::{
    internal_error, CollectedWarnings, LogWarningSink, ParseError, ParseResult, Warning,
    WarningSink,
};
