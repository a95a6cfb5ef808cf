//! Lexical analysis for reflection headers
//!
//! Provides the buffer lexer, the replay reader for captured tokens, the
//! preprocessor collaborator contract, and the checker run over excluded regions.
//!

pub mod analyzer;
pub mod illegal_contents;
pub mod preprocessor;
pub mod replay;

use crate::config::compile_time::lexical::*;
use crate::config::compile_time::stream::{MAX_REPLAY_SAVED_STATES, MAX_SAVED_STATES};
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::syntax::ParseResult;
use crate::tokens::Token;

pub use analyzer::{BufferLexer, LexicalMetrics};
pub use illegal_contents::IllegalContentsChecker;
pub use preprocessor::{
    ConditionalPreprocessor, Directive, DirectiveVerdict, Preprocessor, RegionVerdict,
};
pub use replay::{ReplayPool, ReplayReader};

// ============================================================================
// MODULE API
// ============================================================================

/// Tokenize a whole header without preprocessor cooperation
pub fn tokenize(source: &str) -> ParseResult<Vec<Token<'_>>> {
    BufferLexer::new(source).tokenize_all()
}

/// Tokenize with custom runtime preferences (limits remain compile-time)
pub fn tokenize_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> ParseResult<Vec<Token<'_>>> {
    BufferLexer::with_preferences(source, preferences).tokenize_all()
}

/// Tokenize with the default conditional preprocessor attached
pub fn tokenize_preprocessed(source: &str) -> ParseResult<Vec<Token<'_>>> {
    BufferLexer::new(source)
        .with_preprocessor(Box::new(ConditionalPreprocessor::new()))
        .tokenize_all()
}

/// Create a lexer with default preferences
pub fn create_lexer(source: &str) -> BufferLexer<'_> {
    BufferLexer::new(source)
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

const LEXICAL_CODES: [codes::Code; 11] = [
    codes::lexical::UNTERMINATED_STRING,
    codes::lexical::UNTERMINATED_CHAR,
    codes::lexical::IDENTIFIER_TOO_LONG,
    codes::lexical::STRING_TOO_LONG,
    codes::lexical::NUMBER_TOO_LONG,
    codes::lexical::UNTERMINATED_QUOTE,
    codes::lexical::UNEXPECTED_COMMENT_CLOSE,
    codes::lexical::UNTERMINATED_COMMENT,
    codes::preprocessor::ILLEGAL_MACRO_IN_CONDITIONAL,
    codes::preprocessor::SERIALIZE_IN_CONDITIONAL,
    codes::preprocessor::INVALID_DIRECTIVE,
];

/// Validate error code registration and log the compiled limits (for system startup)
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    for code in &LEXICAL_CODES {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_debug!("Lexical limits initialized",
        "max_name_length" => MAX_NAME_LENGTH,
        "max_string_length" => MAX_STRING_LENGTH,
        "max_number_length" => MAX_NUMBER_LENGTH,
        "max_saved_states" => MAX_SAVED_STATES,
        "max_replay_saved_states" => MAX_REPLAY_SAVED_STATES
    );

    Ok(())
}

/// Validate that compiled limits are usable
pub fn validate_limits() -> Result<(), String> {
    if MAX_NAME_LENGTH == 0 {
        return Err("MAX_NAME_LENGTH cannot be zero".to_string());
    }
    if MAX_STRING_LENGTH == 0 {
        return Err("MAX_STRING_LENGTH cannot be zero".to_string());
    }
    if MAX_NUMBER_LENGTH == 0 {
        return Err("MAX_NUMBER_LENGTH cannot be zero".to_string());
    }
    if MAX_SAVED_STATES == 0 || MAX_REPLAY_SAVED_STATES == 0 {
        return Err("save state stacks must allow at least one snapshot".to_string());
    }
    Ok(())
}

/// Compiled lexical limits for diagnostics
pub fn limits_report() -> String {
    format!(
        "name<={} string<={} number<={} saved_states<={} replay_saved_states<={}",
        MAX_NAME_LENGTH,
        MAX_STRING_LENGTH,
        MAX_NUMBER_LENGTH,
        MAX_SAVED_STATES,
        MAX_REPLAY_SAVED_STATES
    )
}
