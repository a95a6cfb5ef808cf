//! Checks run over preprocessor-excluded regions
//!
//! Reflection markup and `Serialize` entry points hidden behind an undecidable
//! conditional would silently vanish from the generated metadata, so the lexer
//! feeds every token of such a region through [`IllegalContentsChecker`].

use crate::grammar::keywords::is_reflection_macro;
use crate::syntax::{ParseError, ParseResult};
use crate::tokens::Token;

/// Progress through `void Serialize (` followed by `FArchive`, `FStructuredArchiveRecord`
/// or `FStructuredArchive :: FRecord`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SerializeState {
    #[default]
    Start,
    SawVoid,
    SawSerialize,
    SawOpenParen,
    SawStructuredArchive,
    SawScope,
}

#[derive(Debug, Clone, Default)]
pub struct IllegalContentsChecker {
    state: SerializeState,
}

impl IllegalContentsChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.state = SerializeState::Start;
    }

    /// Feed one token of an excluded region
    pub fn check(&mut self, token: &Token<'_>) -> ParseResult<()> {
        if token.is_identifier() && is_reflection_macro(token.value) {
            self.reset();
            return Err(ParseError::IllegalMacroInConditional {
                name: token.value.to_string(),
                position: token.position(),
            });
        }

        if let Some(next) = self.advance(token) {
            self.state = next;
        } else {
            self.state = if token.is_identifier_text("void") {
                SerializeState::SawVoid
            } else {
                SerializeState::Start
            };
            return Ok(());
        }

        if self.state == SerializeState::Start {
            self.reset();
            return Err(ParseError::SerializeInConditional {
                position: token.position(),
            });
        }
        Ok(())
    }

    /// Next state on a match; `Some(Start)` means the full sequence matched
    fn advance(&self, token: &Token<'_>) -> Option<SerializeState> {
        use SerializeState::*;

        match self.state {
            Start if token.is_identifier_text("void") => Some(SawVoid),
            SawVoid if token.is_identifier_text("Serialize") => Some(SawSerialize),
            SawSerialize if token.is_symbol_char('(') => Some(SawOpenParen),
            SawOpenParen
                if token.is_identifier_text("FArchive")
                    || token.is_identifier_text("FStructuredArchiveRecord") =>
            {
                Some(Start)
            }
            SawOpenParen if token.is_identifier_text("FStructuredArchive") => {
                Some(SawStructuredArchive)
            }
            SawStructuredArchive if token.is_symbol_text("::") => Some(SawScope),
            SawScope if token.is_identifier_text("FRecord") => Some(Start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;
    use crate::utils::Position;
    use assert_matches::assert_matches;

    fn tokens(pairs: &[(TokenKind, &'static str)]) -> Vec<Token<'static>> {
        pairs.iter()
            .enumerate()
            .map(|(i, (kind, value))| {
                Token::new(*kind, *value, Position::new(i, 1), Position::new(i, 1))
            })
            .collect()
    }

    fn run(checker: &mut IllegalContentsChecker, toks: &[Token<'_>]) -> ParseResult<()> {
        for token in toks {
            checker.check(token)?;
        }
        Ok(())
    }

    #[test]
    fn test_serialize_archive_detected() {
        use TokenKind::*;
        let toks = tokens(&[
            (Identifier, "virtual"),
            (Identifier, "void"),
            (Identifier, "Serialize"),
            (Symbol, "("),
            (Identifier, "FArchive"),
        ]);
        let mut checker = IllegalContentsChecker::new();
        assert_matches!(
            run(&mut checker, &toks),
            Err(ParseError::SerializeInConditional { .. })
        );
    }

    #[test]
    fn test_structured_archive_record_detected() {
        use TokenKind::*;
        let toks = tokens(&[
            (Identifier, "void"),
            (Identifier, "Serialize"),
            (Symbol, "("),
            (Identifier, "FStructuredArchive"),
            (Symbol, "::"),
            (Identifier, "FRecord"),
        ]);
        let mut checker = IllegalContentsChecker::new();
        assert_matches!(
            run(&mut checker, &toks),
            Err(ParseError::SerializeInConditional { .. })
        );
    }

    #[test]
    fn test_mismatch_retests_void() {
        use TokenKind::*;
        let toks = tokens(&[
            (Identifier, "void"),
            (Identifier, "void"),
            (Identifier, "Serialize"),
            (Symbol, "("),
            (Identifier, "FStructuredArchiveRecord"),
        ]);
        let mut checker = IllegalContentsChecker::new();
        assert!(run(&mut checker, &toks).is_err());
    }

    #[test]
    fn test_unrelated_tokens_pass() {
        use TokenKind::*;
        let toks = tokens(&[
            (Identifier, "void"),
            (Identifier, "Tick"),
            (Symbol, "("),
            (Identifier, "float"),
            (Symbol, ")"),
            (Symbol, ";"),
            (Identifier, "void"),
            (Identifier, "Serialize"),
            (Symbol, "("),
            (Identifier, "FMemoryArchive"),
        ]);
        let mut checker = IllegalContentsChecker::new();
        assert!(run(&mut checker, &toks).is_ok());
    }

    #[test]
    fn test_reflection_macro_detected() {
        let toks = tokens(&[(TokenKind::Identifier, "UPROPERTY")]);
        let mut checker = IllegalContentsChecker::new();
        let error = run(&mut checker, &toks).unwrap_err();
        assert_matches!(
            &error,
            ParseError::IllegalMacroInConditional { name, .. } if name == "UPROPERTY"
        );
        assert!(error.to_string().contains("must not be inside preprocessor blocks"));
    }
}
