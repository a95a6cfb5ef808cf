//! Positioned parse errors and the non-fatal warning channel
//!
//! Source-level failures are values the caller can match on and recover from.
//! Protocol misuse by the calling layer goes through [`internal_error`], which
//! logs and panics.

use crate::logging::{codes, Code};
use crate::utils::{Position, SourceMap, Span};
use crate::{log_error, log_warning};

pub type ParseResult<T> = Result<T, ParseError>;

/// Source errors raised by the lexer, the combinators and the skipper
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Missing '{expected}'{} at {position}, found '{found}'", context_suffix(.context))]
    UnexpectedToken {
        expected: String,
        found: String,
        context: Option<String>,
        position: Position,
    },

    #[error("Unterminated string constant at {position}")]
    UnterminatedString { position: Position },

    #[error("Unterminated character constant at {position}")]
    UnterminatedChar { position: Position },

    #[error("Identifier length exceeds maximum of {max} at {position}")]
    IdentifierTooLong { max: usize, position: Position },

    #[error("String length exceeds maximum of {max} at {position}")]
    StringTooLong { max: usize, position: Position },

    #[error("Numeric literal length exceeds maximum of {max} at {position}")]
    NumberTooLong { max: usize, position: Position },

    #[error("Unterminated quoted string at {position}")]
    UnterminatedQuote { position: Position },

    #[error("Unexpected '*/' outside of a comment at {position}")]
    UnexpectedCommentClose { position: Position },

    #[error("End of input inside a block comment at {position}")]
    UnterminatedComment { position: Position },

    #[error("Mismatched '{open}' and '{close}'{} at {position}", context_suffix(.context))]
    MismatchedDelimiters {
        open: String,
        close: String,
        context: Option<String>,
        position: Position,
    },

    #[error("Unexpected '{bracket}' at {position}. Did you miss a semi-colon?")]
    UnbalancedBracket { bracket: char, position: Position },

    #[error("Invalid numeric value '{text}' at {position}")]
    InvalidNumeric { text: String, position: Position },

    #[error("'{name}' must not be inside preprocessor blocks, except for WITH_EDITORONLY_DATA (at {position})")]
    IllegalMacroInConditional { name: String, position: Position },

    #[error("Serialize functions must not be inside preprocessor blocks, except for WITH_EDITORONLY_DATA (at {position})")]
    SerializeInConditional { position: Position },

    #[error("Invalid preprocessor directive: {message} at {position}")]
    InvalidDirective { message: String, position: Position },
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(ctx) => format!(" in {}", ctx),
        None => String::new(),
    }
}

impl ParseError {
    /// Create unexpected token error
    pub fn unexpected_token(
        expected: &str,
        found: &str,
        context: Option<&str>,
        position: Position,
    ) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            context: context.map(str::to_string),
            position,
        }
    }

    /// Create mismatched delimiter error naming both delimiters
    pub fn mismatched_delimiters(
        open: &str,
        close: &str,
        context: Option<&str>,
        position: Position,
    ) -> Self {
        Self::MismatchedDelimiters {
            open: open.to_string(),
            close: close.to_string(),
            context: context.map(str::to_string),
            position,
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            Self::UnterminatedChar { .. } => codes::lexical::UNTERMINATED_CHAR,
            Self::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            Self::StringTooLong { .. } => codes::lexical::STRING_TOO_LONG,
            Self::NumberTooLong { .. } => codes::lexical::NUMBER_TOO_LONG,
            Self::UnterminatedQuote { .. } => codes::lexical::UNTERMINATED_QUOTE,
            Self::UnexpectedCommentClose { .. } => codes::lexical::UNEXPECTED_COMMENT_CLOSE,
            Self::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            Self::MismatchedDelimiters { .. } => codes::syntax::MISMATCHED_DELIMITERS,
            Self::UnbalancedBracket { .. } => codes::syntax::UNBALANCED_BRACKET,
            Self::InvalidNumeric { .. } => codes::syntax::INVALID_NUMERIC,
            Self::IllegalMacroInConditional { .. } => {
                codes::preprocessor::ILLEGAL_MACRO_IN_CONDITIONAL
            }
            Self::SerializeInConditional { .. } => codes::preprocessor::SERIALIZE_IN_CONDITIONAL,
            Self::InvalidDirective { .. } => codes::preprocessor::INVALID_DIRECTIVE,
        }
    }

    /// Source position the error is reported at
    pub fn position(&self) -> Position {
        match self {
            Self::UnexpectedToken { position, .. }
            | Self::UnterminatedString { position }
            | Self::UnterminatedChar { position }
            | Self::IdentifierTooLong { position, .. }
            | Self::StringTooLong { position, .. }
            | Self::NumberTooLong { position, .. }
            | Self::UnterminatedQuote { position }
            | Self::UnexpectedCommentClose { position }
            | Self::UnterminatedComment { position }
            | Self::MismatchedDelimiters { position, .. }
            | Self::UnbalancedBracket { position, .. }
            | Self::InvalidNumeric { position, .. }
            | Self::IllegalMacroInConditional { position, .. }
            | Self::SerializeInConditional { position }
            | Self::InvalidDirective { position, .. } => *position,
        }
    }

    /// Whether the caller may catch this and try another parse path
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::IdentifierTooLong { .. } | Self::UnbalancedBracket { .. }
        )
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    /// Get recommended action
    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }

    /// Render with a caret-underlined excerpt of the offending line
    pub fn render(&self, source_map: &SourceMap<'_>) -> String {
        source_map.format_error(&Span::empty_at(self.position()), &self.to_string())
    }

    /// Report through the global logger and hand the error back
    pub fn logged(self) -> Self {
        let message = self.to_string();
        log_error!(self.error_code(), &message,
            span = Span::empty_at(self.position()),
            "line" => self.position().line
        );
        self
    }
}

/// Abort on protocol misuse by the calling layer
#[track_caller]
pub fn internal_error(message: &str) -> ! {
    log_error!(codes::system::INTERNAL_ERROR, message);
    panic!("Internal error: {}", message)
}

// ============================================================================
// WARNINGS
// ============================================================================

/// A non-fatal diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub code: Code,
    pub message: String,
    pub position: Position,
}

/// Receiver for non-fatal diagnostics
pub trait WarningSink {
    fn warning(&mut self, code: Code, message: &str, position: Position);
}

/// Forwards warnings to the global logger
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWarningSink;

impl WarningSink for LogWarningSink {
    fn warning(&mut self, code: Code, message: &str, position: Position) {
        log_warning!(code = code, message, span = Span::empty_at(position),
            "line" => position.line
        );
    }
}

/// Keeps warnings for the caller to inspect
#[derive(Debug, Default, Clone)]
pub struct CollectedWarnings {
    warnings: Vec<Warning>,
}

impl CollectedWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }
}

impl WarningSink for CollectedWarnings {
    fn warning(&mut self, code: Code, message: &str, position: Position) {
        self.warnings.push(Warning {
            code,
            message: message.to_string(),
            position,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let pos = Position::new(4, 1);

        let unexpected = ParseError::unexpected_token(")", ";", None, pos);
        assert_eq!(unexpected.error_code().as_str(), "E050");

        let unbalanced = ParseError::UnbalancedBracket {
            bracket: '}',
            position: pos,
        };
        assert_eq!(unbalanced.error_code().as_str(), "E043");

        let serialize = ParseError::SerializeInConditional { position: pos };
        assert_eq!(serialize.error_code().as_str(), "E061");
    }

    #[test]
    fn test_recoverability() {
        let pos = Position::start();
        assert!(ParseError::UnterminatedString { position: pos }.is_recoverable());
        assert!(!ParseError::IdentifierTooLong {
            max: 1024,
            position: pos
        }
        .is_recoverable());
        assert!(!ParseError::UnbalancedBracket {
            bracket: ')',
            position: pos
        }
        .is_recoverable());
    }

    #[test]
    fn test_messages() {
        let pos = Position::new(10, 2);
        let error = ParseError::unexpected_token(",", "}", Some("parameter list"), pos);
        let text = error.to_string();
        assert!(text.contains("Missing ','"));
        assert!(text.contains("in parameter list"));
        assert!(text.contains("found '}'"));

        let delims = ParseError::mismatched_delimiters("<", ">", None, pos);
        assert!(delims.to_string().contains("'<' and '>'"));

        let bracket = ParseError::UnbalancedBracket {
            bracket: '}',
            position: pos,
        };
        assert!(bracket.to_string().contains("Did you miss a semi-colon?"));
    }

    #[test]
    fn test_render_points_at_position() {
        let source = "int x;\nint y = \"oops;\n";
        let map = SourceMap::new(source);
        let error = ParseError::UnterminatedString {
            position: map.position_at(15),
        };

        let rendered = error.render(&map);
        assert!(rendered.contains("--> 2:9"));
        assert!(rendered.contains("int y = \"oops;"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn test_collected_warnings() {
        let mut sink = CollectedWarnings::new();
        assert!(sink.is_empty());

        sink.warning(
            codes::warnings::REFLECTION_MACRO_SKIPPED,
            "UPROPERTY skipped",
            Position::new(3, 1),
        );

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.warnings()[0].code, codes::warnings::REFLECTION_MACRO_SKIPPED);
        assert_eq!(sink.warnings()[0].position.offset, 3);
    }

    #[test]
    #[should_panic(expected = "Internal error: nested recording")]
    fn test_internal_error_panics() {
        internal_error("nested recording");
    }
}
