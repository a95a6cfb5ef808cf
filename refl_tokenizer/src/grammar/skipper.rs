//! Heuristic skipping of declarations the grammar does not understand
//!
//! The skipper tracks nesting of one bracket pair, chosen from the first token:
//! macro-style names (`MY_MACRO(...)`) use parentheses, everything else braces.

use serde::Serialize;

use crate::grammar::keywords::{
    is_reflection_macro, probably_a_macro, skipper_macro_exceptions, skipper_paren_identifiers,
};
use crate::logging::codes;
use crate::syntax::{ParseError, ParseResult, WarningSink};
use crate::tokens::{Token, TokenStream};
use crate::log_success;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkipOutcome {
    /// A bracketed body was seen, so this was a definition rather than a forward reference
    pub found_body: bool,
    pub macro_style: bool,
    pub tokens_skipped: usize,
}

fn is_macro_style(token: &Token<'_>) -> bool {
    token.is_identifier()
        && probably_a_macro(token.value)
        && !skipper_macro_exceptions().contains(&token.value)
}

fn bracket_pair(first: &Token<'_>, macro_style: bool) -> (char, char) {
    let paren_identifier =
        first.is_identifier() && skipper_paren_identifiers().contains(&first.value);
    if macro_style || paren_identifier {
        ('(', ')')
    } else {
        ('{', '}')
    }
}

/// Skip the declaration that starts with the already consumed `first` token.
/// Stops after the terminating `;` or closing bracket, leaving the next
/// declaration in the stream.
pub fn skip_declaration<'src>(
    stream: &mut dyn TokenStream<'src>,
    first: Token<'src>,
    warnings: &mut dyn WarningSink,
) -> ParseResult<SkipOutcome> {
    let macro_style = is_macro_style(&first);
    let (mut open, mut close) = bracket_pair(&first, macro_style);
    let is_class_or_struct =
        first.is_identifier_text("class") || first.is_identifier_text("struct");

    let mut outcome = SkipOutcome {
        found_body: false,
        macro_style,
        tokens_skipped: 1,
    };
    let mut depth: usize = 0;
    let mut token = first;

    loop {
        if token.is_identifier() && is_reflection_macro(token.value) {
            warnings.warning(
                codes::warnings::REFLECTION_MACRO_SKIPPED,
                &format!("'{}' ignored while skipping an unrecognized declaration", token.value),
                token.position(),
            );
        }

        if token.is_symbol_char(open) {
            depth += 1;
            outcome.found_body = true;
        } else if token.is_symbol_char(close) {
            if depth == 0 {
                return Err(ParseError::UnbalancedBracket {
                    bracket: close,
                    position: token.position(),
                }
                .logged());
            }
            depth -= 1;
            if depth == 0 {
                // A macro that expands to something with a body: `MACRO(...) { ... }`
                if open == '(' && macro_style && stream.peek_token()?.is_symbol_char('{') {
                    open = '{';
                    close = '}';
                    token = stream.get_token()?;
                    outcome.tokens_skipped += 1;
                    continue;
                }
                break;
            }
        } else if depth == 0 && token.is_symbol_char(';') {
            break;
        }

        token = stream.get_token()?;
        if token.is_end_type() {
            if depth > 0 {
                return Err(ParseError::mismatched_delimiters(
                    &open.to_string(),
                    &close.to_string(),
                    Some("skipped declaration"),
                    token.position(),
                )
                .logged());
            }
            break;
        }
        outcome.tokens_skipped += 1;
    }

    // `class Foo { ... } Instance;`
    if is_class_or_struct && outcome.found_body {
        stream.save_state();
        let name = stream.get_token()?;
        if name.is_identifier() && stream.peek_token()?.is_symbol_char(';') {
            stream.consume_token();
            stream.abandon_state();
            outcome.tokens_skipped += 2;
        } else {
            stream.restore_state();
        }
    }

    while stream.peek_token()?.is_symbol_char(';') {
        stream.consume_token();
        outcome.tokens_skipped += 1;
    }

    log_success!(codes::success::DECLARATION_SKIPPED, "Skipped unrecognized declaration",
        "first" => first.value,
        "line" => first.input_line,
        "tokens" => outcome.tokens_skipped,
        "found_body" => outcome.found_body
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::BufferLexer;
    use crate::syntax::CollectedWarnings;
    use assert_matches::assert_matches;

    fn skip(source: &str) -> (ParseResult<SkipOutcome>, Vec<String>, CollectedWarnings) {
        let mut lexer = BufferLexer::new(source);
        let mut warnings = CollectedWarnings::new();
        let first = lexer.get_token().unwrap();
        let result = skip_declaration(&mut lexer, first, &mut warnings);
        let rest = lexer
            .tokenize_all()
            .map(|tokens| tokens.iter().map(|t| t.value.to_string()).collect())
            .unwrap_or_default();
        (result, rest, warnings)
    }

    #[test]
    fn test_macro_with_nested_parens() {
        let (result, rest, _) = skip("MY_MACRO(a, (b), c) int x;");
        let outcome = result.unwrap();
        assert!(outcome.macro_style);
        assert!(outcome.found_body);
        assert_eq!(rest, vec!["int", "x", ";"]);
    }

    #[test]
    fn test_macro_followed_by_body() {
        let (result, rest, _) = skip("IMPLEMENT_THING(Foo) { return 1; } int y;");
        assert!(result.unwrap().found_body);
        assert_eq!(rest, vec!["int", "y", ";"]);
    }

    #[test]
    fn test_plain_statement_ends_at_semicolon() {
        let (result, rest, _) = skip("typedef int32 FMyInt;;; float z;");
        let outcome = result.unwrap();
        assert!(!outcome.found_body);
        assert_eq!(rest, vec!["float", "z", ";"]);
    }

    #[test]
    fn test_class_with_instance() {
        let (result, rest, _) = skip("struct FInner { int A; } Instance; int After;");
        assert!(result.unwrap().found_body);
        assert_eq!(rest, vec!["int", "After", ";"]);

        let (result, rest, _) = skip("class FForward; int After;");
        assert!(!result.unwrap().found_body);
        assert_eq!(rest, vec!["int", "After", ";"]);
    }

    #[test]
    fn test_special_cased_identifiers() {
        let (result, rest, _) = skip("static_assert(sizeof(int) == 4, \"size\") int next;");
        assert!(!result.unwrap().macro_style);
        assert_eq!(rest, vec!["int", "next", ";"]);

        let (result, rest, _) = skip("DECLARE_FUNCTION(execFoo) { P_FINISH; } int next;");
        assert!(!result.unwrap().macro_style);
        assert_eq!(rest, vec!["int", "next", ";"]);
    }

    #[test]
    fn test_unbalanced_bracket() {
        let (result, _, _) = skip("void F() } int x;");
        assert_matches!(result, Err(ParseError::UnbalancedBracket { bracket: '}', .. }));
    }

    #[test]
    fn test_reflection_macro_warning() {
        let (result, _, warnings) = skip("namespace Inner { UPROPERTY() int32 X; } int y;");
        assert!(result.is_ok());
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings.warnings()[0].code,
            codes::warnings::REFLECTION_MACRO_SKIPPED
        );
    }
}
