//! Token value type for the reflection header dialect
//!
//! A [`Token`] is a `Copy` value: a kind, a view into the source buffer, where it
//! started, and where the stream stood before it was lexed so a peek can be undone.
use crate::syntax::internal_error;
use crate::utils::{Position, Span};
use serde::Serialize;
use std::fmt;

/// Classification of a lexical unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // === END TYPES ===
    EndOfFile,
    EndOfDefault,
    EndOfType,
    EndOfDeclaration,

    // === CONTENT ===
    /// Remainder of a physical line, produced only by `get_line`
    Line,
    Identifier,
    Symbol,
    FloatConst,
    DecimalConst,
    HexConst,
    CharConst,
    StringConst,
}

impl TokenKind {
    /// Sentinel kinds that mark stream boundaries rather than content
    pub fn is_end_type(self) -> bool {
        matches!(
            self,
            Self::EndOfFile | Self::EndOfDefault | Self::EndOfType | Self::EndOfDeclaration
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EndOfFile => "end of file",
            Self::EndOfDefault => "end of default value",
            Self::EndOfType => "end of type",
            Self::EndOfDeclaration => "end of declaration",
            Self::Line => "line",
            Self::Identifier => "identifier",
            Self::Symbol => "symbol",
            Self::FloatConst => "float constant",
            Self::DecimalConst => "decimal constant",
            Self::HexConst => "hex constant",
            Self::CharConst => "character constant",
            Self::StringConst => "string constant",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classified lexical unit borrowed from the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// Source text of the token; empty for end types
    pub value: &'src str,
    pub input_start_pos: usize,
    pub input_line: u32,
    /// Stream position before this token was lexed
    pub unget_pos: usize,
    pub unget_line: u32,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, value: &'src str, start: Position, unget: Position) -> Self {
        Self {
            kind,
            value,
            input_start_pos: start.offset,
            input_line: start.line,
            unget_pos: unget.offset,
            unget_line: unget.line,
        }
    }

    /// Zero-length sentinel at `position`
    pub fn end(kind: TokenKind, position: Position) -> Self {
        debug_assert!(kind.is_end_type());
        Self::new(kind, "", position, position)
    }

    // ========================================================================
    // POSITION
    // ========================================================================

    pub fn position(&self) -> Position {
        Position::new(self.input_start_pos, self.input_line)
    }

    pub fn unget_position(&self) -> Position {
        Position::new(self.unget_pos, self.unget_line)
    }

    pub fn span(&self) -> Span {
        Span::covering(self.position(), self.value)
    }

    // ========================================================================
    // CLASSIFICATION
    // ========================================================================

    pub fn is_end_type(&self) -> bool {
        self.kind.is_end_type()
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    pub fn is_identifier_text(&self, text: &str) -> bool {
        self.is_identifier() && self.value == text
    }

    pub fn is_symbol(&self) -> bool {
        self.kind == TokenKind::Symbol
    }

    pub fn is_symbol_char(&self, c: char) -> bool {
        self.is_symbol() && self.value.len() == c.len_utf8() && self.value.starts_with(c)
    }

    pub fn is_symbol_text(&self, text: &str) -> bool {
        self.is_symbol() && self.value == text
    }

    /// Identifier or symbol whose text is exactly `text`
    pub fn is_value(&self, text: &str) -> bool {
        (self.is_identifier() || self.is_symbol()) && self.value == text
    }

    pub fn is_const_int(&self) -> bool {
        matches!(self.kind, TokenKind::DecimalConst | TokenKind::HexConst)
    }

    pub fn is_const_float(&self) -> bool {
        self.kind == TokenKind::FloatConst
    }

    pub fn is_numeric(&self) -> bool {
        self.is_const_int() || self.is_const_float()
    }

    pub fn is_const_string(&self) -> bool {
        self.kind == TokenKind::StringConst
    }

    pub fn is_const_char(&self) -> bool {
        self.kind == TokenKind::CharConst
    }

    // ========================================================================
    // NUMERIC DECODING
    // ========================================================================

    /// Integer value; floats are accepted only when they truncate exactly
    pub fn get_const_int(&self) -> Option<i32> {
        match self.kind {
            TokenKind::DecimalConst => i32::try_from(parse_decimal(self.value)?).ok(),
            TokenKind::HexConst => {
                let (negative, digits) = split_hex(self.value);
                let value = u32::from_str_radix(digits, 16).ok()? as i32;
                Some(if negative { value.wrapping_neg() } else { value })
            }
            TokenKind::FloatConst => {
                let (value, exact) = self.truncate_float()?;
                if exact {
                    i32::try_from(value).ok()
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// 64-bit integer value; floats are accepted only when they truncate exactly
    pub fn get_const_long(&self) -> Option<i64> {
        match self.kind {
            TokenKind::DecimalConst => parse_decimal(self.value),
            TokenKind::HexConst => {
                let (negative, digits) = split_hex(self.value);
                let value = u64::from_str_radix(digits, 16).ok()? as i64;
                Some(if negative { value.wrapping_neg() } else { value })
            }
            TokenKind::FloatConst => {
                let (value, exact) = self.truncate_float()?;
                if exact {
                    Some(value)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn get_const_float(&self) -> Option<f32> {
        self.get_const_double().map(|value| value as f32)
    }

    pub fn get_const_double(&self) -> Option<f64> {
        match self.kind {
            TokenKind::FloatConst => self
                .value
                .trim_end_matches(['f', 'F'])
                .parse::<f64>()
                .ok(),
            TokenKind::DecimalConst | TokenKind::HexConst => {
                self.get_const_long().map(|value| value as f64)
            }
            _ => None,
        }
    }

    /// Integer part of a float constant and whether dropping the fraction lost nothing
    pub fn truncate_float(&self) -> Option<(i64, bool)> {
        if self.kind != TokenKind::FloatConst {
            return None;
        }
        let value = self.get_const_double()?;
        let truncated = value.trunc();
        Some((truncated as i64, truncated == value))
    }

    // ========================================================================
    // STRING DECODING
    // ========================================================================

    /// Contents of a string or char constant with quotes removed and escapes resolved
    pub fn get_unescaped_string(&self) -> String {
        if !matches!(self.kind, TokenKind::StringConst | TokenKind::CharConst) {
            internal_error(&format!(
                "get_unescaped_string called on a {} token",
                self.kind
            ));
        }

        let inner = strip_quotes(self.value);
        let mut result = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some(other) => result.push(other),
                None => result.push('\\'),
            }
        }
        result
    }

    /// Decoded text for string/char constants, source text for everything else
    pub fn token_string(&self) -> String {
        match self.kind {
            TokenKind::StringConst | TokenKind::CharConst => self.get_unescaped_string(),
            _ => self.value.to_string(),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end_type() {
            write!(f, "<{}>", self.kind)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn strip_quotes(value: &str) -> &str {
    let mut inner = value;
    for quote in ['"', '\''] {
        if inner.len() >= 2 && inner.starts_with(quote) && inner.ends_with(quote) {
            inner = &inner[1..inner.len() - 1];
            break;
        }
    }
    inner
}

fn strip_int_suffix(value: &str) -> &str {
    value.trim_end_matches(['u', 'U', 'l', 'L'])
}

fn parse_decimal(value: &str) -> Option<i64> {
    strip_int_suffix(value).parse::<i64>().ok()
}

fn split_hex(value: &str) -> (bool, &str) {
    let (negative, unsigned) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
        .unwrap_or(unsigned);
    (negative, strip_int_suffix(digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, value: &str) -> Token<'_> {
        Token::new(kind, value, Position::start(), Position::start())
    }

    #[test]
    fn test_end_types() {
        assert!(TokenKind::EndOfFile.is_end_type());
        assert!(TokenKind::EndOfDeclaration.is_end_type());
        assert!(!TokenKind::Identifier.is_end_type());

        let eof = Token::end(TokenKind::EndOfFile, Position::new(12, 3));
        assert_eq!(eof.value, "");
        assert_eq!(eof.to_string(), "<end of file>");
    }

    #[test]
    fn test_integer_suffixes() {
        assert_eq!(token(TokenKind::DecimalConst, "123UL").get_const_int(), Some(123));
        assert_eq!(token(TokenKind::DecimalConst, "-42").get_const_int(), Some(-42));
        assert_eq!(token(TokenKind::HexConst, "0x1AUL").get_const_int(), Some(26));
        assert_eq!(token(TokenKind::HexConst, "0XFF").get_const_long(), Some(255));
        assert_eq!(token(TokenKind::HexConst, "0xFFFFFFFF").get_const_int(), Some(-1));
    }

    #[test]
    fn test_float_truncation() {
        let exact = token(TokenKind::FloatConst, "2.0f");
        assert_eq!(exact.truncate_float(), Some((2, true)));
        assert_eq!(exact.get_const_int(), Some(2));

        let inexact = token(TokenKind::FloatConst, "1.5f");
        assert_eq!(inexact.truncate_float(), Some((1, false)));
        assert_eq!(inexact.get_const_int(), None);
        assert_eq!(inexact.get_const_float(), Some(1.5));
    }

    #[test]
    fn test_non_numeric_decoding() {
        let ident = token(TokenKind::Identifier, "Value");
        assert_eq!(ident.get_const_int(), None);
        assert_eq!(ident.get_const_double(), None);
        assert_eq!(token(TokenKind::DecimalConst, "7").get_const_double(), Some(7.0));
    }

    #[test]
    fn test_unescaped_string() {
        let string = token(TokenKind::StringConst, r#""a\tb\n\"c\"""#);
        assert_eq!(string.get_unescaped_string(), "a\tb\n\"c\"");

        let ch = token(TokenKind::CharConst, r"'\''");
        assert_eq!(ch.get_unescaped_string(), "'");
        assert_eq!(ch.token_string(), "'");

        assert_eq!(token(TokenKind::Identifier, "Foo").token_string(), "Foo");
    }

    #[test]
    #[should_panic(expected = "Internal error")]
    fn test_unescaped_string_on_identifier_panics() {
        token(TokenKind::Identifier, "Foo").get_unescaped_string();
    }

    #[test]
    fn test_classification_helpers() {
        let colon = token(TokenKind::Symbol, "::");
        assert!(colon.is_symbol_text("::"));
        assert!(!colon.is_symbol_char(':'));
        assert!(colon.is_value("::"));

        let semi = token(TokenKind::Symbol, ";");
        assert!(semi.is_symbol_char(';'));

        let ident = token(TokenKind::Identifier, "UCLASS");
        assert!(ident.is_identifier_text("UCLASS"));
        assert!(!ident.is_identifier_text("USTRUCT"));
    }

    #[test]
    fn test_span_covers_value() {
        let tok = Token::new(
            TokenKind::Identifier,
            "Actor",
            Position::new(6, 2),
            Position::new(5, 2),
        );
        let span = tok.span();
        assert_eq!(span.start.offset, 6);
        assert_eq!(span.end.offset, 11);
        assert_eq!(tok.unget_position(), Position::new(5, 2));
    }
}
