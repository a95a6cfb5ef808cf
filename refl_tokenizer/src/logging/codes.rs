//! Consolidated error codes and classification system
//!
//! Single source of truth for all diagnostic codes raised by the tokenizer,
//! their metadata, and the classification functions built on top of them.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning, and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    /// Protocol misuse by the calling layer; always fatal
    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const UNTERMINATED_STRING: Code = Code::new("E020");
    pub const UNTERMINATED_CHAR: Code = Code::new("E021");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E022");
    pub const STRING_TOO_LONG: Code = Code::new("E023");
    pub const NUMBER_TOO_LONG: Code = Code::new("E024");
    pub const UNTERMINATED_QUOTE: Code = Code::new("E025");
    pub const UNEXPECTED_COMMENT_CLOSE: Code = Code::new("E026");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E027");
}

/// Syntax error codes raised by the combinators and the skipper
pub mod syntax {
    use super::Code;

    pub const MISMATCHED_DELIMITERS: Code = Code::new("E042");
    pub const UNBALANCED_BRACKET: Code = Code::new("E043");
    pub const INVALID_NUMERIC: Code = Code::new("E044");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
}

/// Preprocessor and conditional-region codes
pub mod preprocessor {
    use super::Code;

    pub const ILLEGAL_MACRO_IN_CONDITIONAL: Code = Code::new("E060");
    pub const SERIALIZE_IN_CONDITIONAL: Code = Code::new("E061");
    pub const INVALID_DIRECTIVE: Code = Code::new("E062");
}

/// Warning codes
pub mod warnings {
    use super::Code;

    pub const GENERIC_WARNING: Code = Code::new("W000");
    pub const REFLECTION_MACRO_SKIPPED: Code = Code::new("W010");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const DECLARATION_SKIPPED: Code = Code::new("I040");
    pub const REGION_SKIPPED: Code = Code::new("I041");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        registry.insert(
            "ERR001",
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Token stream protocol misuse by the calling layer",
                "File a bug report against the parser that drove the stream",
            ),
        );
        registry.insert(
            "ERR002",
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "Logging or configuration initialization failure",
                "Check runtime configuration and environment variables",
            ),
        );

        // Lexical errors
        registry.insert(
            "E020",
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::High,
                true,
                false,
                "String constant is not terminated before end of line",
                "Close the string literal with a double quote",
            ),
        );
        registry.insert(
            "E021",
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::High,
                true,
                false,
                "Character constant is not terminated",
                "Close the character literal with a single quote",
            ),
        );
        registry.insert(
            "E022",
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::Critical,
                false,
                true,
                "Identifier exceeds the maximum name length",
                "Shorten the identifier",
            ),
        );
        registry.insert(
            "E023",
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::High,
                true,
                false,
                "String exceeds the maximum string length",
                "Shorten the string or split it",
            ),
        );
        registry.insert(
            "E024",
            ErrorMetadata::new(
                "E024",
                "Lexical",
                Severity::High,
                true,
                false,
                "Numeric literal exceeds the maximum length",
                "Shorten the numeric literal",
            ),
        );
        registry.insert(
            "E025",
            ErrorMetadata::new(
                "E025",
                "Lexical",
                Severity::High,
                true,
                false,
                "Quoted text inside a raw string is not terminated",
                "Balance the double quotes in the raw string",
            ),
        );
        registry.insert(
            "E026",
            ErrorMetadata::new(
                "E026",
                "Lexical",
                Severity::High,
                true,
                false,
                "Block comment terminator found outside of a comment",
                "Remove the stray '*/'",
            ),
        );
        registry.insert(
            "E027",
            ErrorMetadata::new(
                "E027",
                "Lexical",
                Severity::High,
                true,
                false,
                "End of input reached inside a block comment",
                "Close the block comment with '*/'",
            ),
        );

        // Syntax errors
        registry.insert(
            "E042",
            ErrorMetadata::new(
                "E042",
                "Syntax",
                Severity::High,
                true,
                false,
                "Opening and closing delimiters do not match",
                "Balance the delimiters around the construct",
            ),
        );
        registry.insert(
            "E043",
            ErrorMetadata::new(
                "E043",
                "Syntax",
                Severity::Critical,
                false,
                true,
                "Closing bracket found with no matching opener while skipping a declaration",
                "Check for a missing semicolon before this point",
            ),
        );
        registry.insert(
            "E044",
            ErrorMetadata::new(
                "E044",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Expected a numeric constant",
                "Provide an integer or floating point literal",
            ),
        );
        registry.insert(
            "E050",
            ErrorMetadata::new(
                "E050",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Unexpected token",
                "Check syntax around the reported position",
            ),
        );

        // Preprocessor errors
        registry.insert(
            "E060",
            ErrorMetadata::new(
                "E060",
                "Preprocessor",
                Severity::High,
                true,
                false,
                "Reflection markup macro found inside a conditional block",
                "Move the macro outside the conditional or use WITH_EDITORONLY_DATA",
            ),
        );
        registry.insert(
            "E061",
            ErrorMetadata::new(
                "E061",
                "Preprocessor",
                Severity::High,
                true,
                false,
                "Serialization entry point found inside a conditional block",
                "Keep Serialize declarations outside preprocessor conditionals",
            ),
        );
        registry.insert(
            "E062",
            ErrorMetadata::new(
                "E062",
                "Preprocessor",
                Severity::Medium,
                true,
                false,
                "Malformed or unbalanced preprocessor directive",
                "Check the #if/#else/#endif structure",
            ),
        );

        // Warnings
        registry.insert(
            "W000",
            ErrorMetadata::new(
                "W000",
                "Warning",
                Severity::Low,
                true,
                false,
                "General warning",
                "Review the reported construct",
            ),
        );
        registry.insert(
            "W010",
            ErrorMetadata::new(
                "W010",
                "Warning",
                Severity::Low,
                true,
                false,
                "Reflection markup macro seen while skipping an unrecognized declaration",
                "The macro will not be processed; check the surrounding declaration",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_registered() {
        let all = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            lexical::UNTERMINATED_STRING,
            lexical::UNTERMINATED_CHAR,
            lexical::IDENTIFIER_TOO_LONG,
            lexical::STRING_TOO_LONG,
            lexical::NUMBER_TOO_LONG,
            lexical::UNTERMINATED_QUOTE,
            lexical::UNEXPECTED_COMMENT_CLOSE,
            lexical::UNTERMINATED_COMMENT,
            syntax::MISMATCHED_DELIMITERS,
            syntax::UNBALANCED_BRACKET,
            syntax::INVALID_NUMERIC,
            syntax::UNEXPECTED_TOKEN,
            preprocessor::ILLEGAL_MACRO_IN_CONDITIONAL,
            preprocessor::SERIALIZE_IN_CONDITIONAL,
            preprocessor::INVALID_DIRECTIVE,
            warnings::GENERIC_WARNING,
            warnings::REFLECTION_MACRO_SKIPPED,
        ];

        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("ERR001"));
        assert!(!is_recoverable("E043"));
        assert!(is_recoverable("E050"));
        assert_eq!(get_category("E061"), "Preprocessor");
        assert_eq!(get_description("nope"), "Unknown error");
    }
}
