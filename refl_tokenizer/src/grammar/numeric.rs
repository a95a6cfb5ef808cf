//! Numeric constant combinators
//!
//! The `_expression` variants also accept a sign written as its own token
//! (`- 5`); when no number follows the sign the stream is left untouched.

use crate::grammar::combinators::unexpected;
use crate::syntax::{ParseError, ParseResult};
use crate::tokens::{Token, TokenStream};

// ============================================================================
// PLAIN CONSTANTS
// ============================================================================

fn try_optional_decoded<'src, T>(
    stream: &mut dyn TokenStream<'src>,
    decode: fn(&Token<'src>) -> Option<T>,
) -> ParseResult<Option<T>> {
    let token = stream.peek_token()?;
    match decode(&token) {
        Some(value) => {
            stream.consume_token();
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub fn try_optional_const_int<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<i32>> {
    try_optional_decoded(stream, Token::get_const_int)
}

pub fn try_optional_const_long<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<i64>> {
    try_optional_decoded(stream, Token::get_const_long)
}

pub fn try_optional_const_float<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<f32>> {
    try_optional_decoded(stream, Token::get_const_float)
}

pub fn try_optional_const_double<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<f64>> {
    try_optional_decoded(stream, Token::get_const_double)
}

// ============================================================================
// SIGNED EXPRESSIONS
// ============================================================================

fn try_optional_signed<'src, T>(
    stream: &mut dyn TokenStream<'src>,
    decode: fn(&Token<'src>) -> Option<T>,
    negate: fn(T) -> T,
) -> ParseResult<Option<T>> {
    let sign = stream.peek_token()?;
    let negative = sign.is_symbol_char('-');
    if !negative && !sign.is_symbol_char('+') {
        return try_optional_decoded(stream, decode);
    }

    stream.save_state();
    stream.consume_token();
    match try_optional_decoded(stream, decode) {
        Ok(Some(value)) => {
            stream.abandon_state();
            Ok(Some(if negative { negate(value) } else { value }))
        }
        Ok(None) => {
            stream.restore_state();
            Ok(None)
        }
        Err(error) => {
            stream.restore_state();
            Err(error)
        }
    }
}

pub fn try_optional_const_int_expression<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<i32>> {
    try_optional_signed(stream, Token::get_const_int, i32::wrapping_neg)
}

pub fn try_optional_const_long_expression<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<i64>> {
    try_optional_signed(stream, Token::get_const_long, i64::wrapping_neg)
}

pub fn try_optional_const_float_expression<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<f32>> {
    try_optional_signed(stream, Token::get_const_float, |value: f32| -value)
}

pub fn try_optional_const_double_expression<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<f64>> {
    try_optional_signed(stream, Token::get_const_double, |value: f64| -value)
}

// ============================================================================
// REQUIRED CONSTANTS
// ============================================================================

fn missing_int(token: &Token<'_>, context: Option<&str>) -> ParseError {
    if token.is_numeric() {
        ParseError::InvalidNumeric {
            text: token.value.to_string(),
            position: token.position(),
        }
        .logged()
    } else {
        unexpected("integer constant", token, context)
    }
}

pub fn require_const_int<'src>(
    stream: &mut dyn TokenStream<'src>,
    context: Option<&str>,
) -> ParseResult<i32> {
    match try_optional_const_int(stream)? {
        Some(value) => Ok(value),
        None => {
            let token = stream.peek_token()?;
            Err(missing_int(&token, context))
        }
    }
}

pub fn require_const_int_expression<'src>(
    stream: &mut dyn TokenStream<'src>,
    context: Option<&str>,
) -> ParseResult<i32> {
    match try_optional_const_int_expression(stream)? {
        Some(value) => Ok(value),
        None => {
            let token = stream.peek_token()?;
            Err(missing_int(&token, context))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::BufferLexer;
    use assert_matches::assert_matches;

    #[test]
    fn test_plain_constants() {
        let mut lexer = BufferLexer::new("42 0x10 2.0 1.5f name");
        assert_eq!(try_optional_const_int(&mut lexer).unwrap(), Some(42));
        assert_eq!(try_optional_const_long(&mut lexer).unwrap(), Some(16));
        assert_eq!(try_optional_const_int(&mut lexer).unwrap(), Some(2));
        assert_eq!(try_optional_const_int(&mut lexer).unwrap(), None);
        assert_eq!(try_optional_const_float(&mut lexer).unwrap(), Some(1.5));
        assert_eq!(try_optional_const_double(&mut lexer).unwrap(), None);
        assert_eq!(lexer.peek_token().unwrap().value, "name");
    }

    #[test]
    fn test_standalone_sign_folds() {
        let mut lexer = BufferLexer::new("- 5 + 7 -3 - 2.5");
        assert_eq!(try_optional_const_int_expression(&mut lexer).unwrap(), Some(-5));
        assert_eq!(try_optional_const_int_expression(&mut lexer).unwrap(), Some(7));
        assert_eq!(try_optional_const_long_expression(&mut lexer).unwrap(), Some(-3));
        assert_eq!(
            try_optional_const_double_expression(&mut lexer).unwrap(),
            Some(-2.5)
        );
        assert!(lexer.is_eof().unwrap());
    }

    #[test]
    fn test_sign_without_number_leaves_stream() {
        let mut lexer = BufferLexer::new("- Value");
        let before = lexer.peek_token().unwrap();
        assert_eq!(try_optional_const_int_expression(&mut lexer).unwrap(), None);
        assert_eq!(lexer.peek_token().unwrap(), before);
    }

    #[test]
    fn test_require_const_int() {
        let mut lexer = BufferLexer::new("- 8");
        assert_eq!(require_const_int_expression(&mut lexer, None).unwrap(), -8);

        let mut lexer = BufferLexer::new("1.5");
        assert_matches!(
            require_const_int(&mut lexer, Some("alignment")),
            Err(ParseError::InvalidNumeric { .. })
        );

        let mut lexer = BufferLexer::new("Value");
        assert_matches!(
            require_const_int(&mut lexer, Some("alignment")),
            Err(ParseError::UnexpectedToken { .. })
        );
    }
}
