//! Qualified C++ identifiers: `::Outer::Inner<TArray<int32>>`
//!
//! Chains are collected into a [`TokenList`] owned by the caller's arena so the
//! parse does not allocate a `Vec` per identifier.

use crate::grammar::combinators::{require_identifier, unexpected};
use crate::syntax::{ParseError, ParseResult};
use crate::tokens::{TokenList, TokenListArena, TokenStream};

/// Consume `::? Identifier (:: Identifier)*`, with `<...>` argument lists after
/// any segment when `allow_templates` is set. Returns `None` without consuming
/// anything when the next token cannot start an identifier.
pub fn try_optional_cpp_identifier<'src>(
    stream: &mut dyn TokenStream<'src>,
    arena: &mut TokenListArena<'src>,
    allow_templates: bool,
) -> ParseResult<Option<TokenList>> {
    let first = stream.peek_token()?;
    if !first.is_identifier() && !first.is_symbol_text("::") {
        return Ok(None);
    }

    let mut list = arena.borrow_list();
    match collect_identifier(stream, arena, &mut list, allow_templates) {
        Ok(()) => Ok(Some(list)),
        Err(error) => {
            arena.release(list);
            Err(error)
        }
    }
}

pub fn require_cpp_identifier<'src>(
    stream: &mut dyn TokenStream<'src>,
    arena: &mut TokenListArena<'src>,
    allow_templates: bool,
    context: Option<&str>,
) -> ParseResult<TokenList> {
    match try_optional_cpp_identifier(stream, arena, allow_templates)? {
        Some(list) => Ok(list),
        None => {
            let token = stream.peek_token()?;
            Err(unexpected("identifier", &token, context))
        }
    }
}

fn collect_identifier<'src>(
    stream: &mut dyn TokenStream<'src>,
    arena: &mut TokenListArena<'src>,
    list: &mut TokenList,
    allow_templates: bool,
) -> ParseResult<()> {
    let leading = stream.peek_token()?;
    if leading.is_symbol_text("::") {
        stream.consume_token();
        arena.push(list, leading);
    }

    loop {
        let segment = require_identifier(stream, Some("qualified identifier"))?;
        arena.push(list, segment);

        if allow_templates && stream.peek_token()?.is_symbol_char('<') {
            collect_template_arguments(stream, arena, list)?;
        }

        let separator = stream.peek_token()?;
        if !separator.is_symbol_text("::") {
            return Ok(());
        }
        stream.consume_token();
        arena.push(list, separator);
    }
}

fn collect_template_arguments<'src>(
    stream: &mut dyn TokenStream<'src>,
    arena: &mut TokenListArena<'src>,
    list: &mut TokenList,
) -> ParseResult<()> {
    let open = stream.get_token()?;
    arena.push(list, open);
    let mut depth = 1usize;

    while depth > 0 {
        let token = stream.peek_token()?;
        if token.is_end_type() || token.is_symbol_char(';') || token.is_symbol_char('{') {
            return Err(ParseError::mismatched_delimiters(
                "<",
                ">",
                Some("template argument list"),
                open.position(),
            )
            .logged());
        }
        stream.consume_token();
        arena.push(list, token);

        if token.is_symbol_char('<') {
            depth += 1;
        } else if token.is_symbol_char('>') {
            depth -= 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::BufferLexer;
    use assert_matches::assert_matches;

    #[test]
    fn test_qualified_identifier() {
        let mut lexer = BufferLexer::new("::UE::Math::FVector Location;");
        let mut arena = TokenListArena::new();
        let list = try_optional_cpp_identifier(&mut lexer, &mut arena, false)
            .unwrap()
            .unwrap();
        assert_eq!(arena.join(&list), "::UE::Math::FVector");
        assert_eq!(list.len(), 6);
        assert_eq!(lexer.get_token().unwrap().value, "Location");
    }

    #[test]
    fn test_nested_templates() {
        let mut lexer = BufferLexer::new("TMap<FName, TArray<int32>>::Iterator It");
        let mut arena = TokenListArena::new();
        let list = require_cpp_identifier(&mut lexer, &mut arena, true, None).unwrap();
        assert_eq!(arena.join(&list), "TMap<FName,TArray<int32>>::Iterator");
        assert_eq!(lexer.get_token().unwrap().value, "It");
    }

    #[test]
    fn test_templates_ignored_when_disabled() {
        let mut lexer = BufferLexer::new("TArray<int32>");
        let mut arena = TokenListArena::new();
        let list = require_cpp_identifier(&mut lexer, &mut arena, false, None).unwrap();
        assert_eq!(arena.join(&list), "TArray");
        assert_eq!(lexer.peek_token().unwrap().value, "<");
    }

    #[test]
    fn test_mismatched_template_brackets() {
        let mut lexer = BufferLexer::new("TArray<TSubclassOf<UObject> Items;");
        let mut arena = TokenListArena::new();
        let error = require_cpp_identifier(&mut lexer, &mut arena, true, None).unwrap_err();
        assert_matches!(
            &error,
            ParseError::MismatchedDelimiters { open, close, .. } if open == "<" && close == ">"
        );
        assert_eq!(arena.live_nodes(), 0);
    }

    #[test]
    fn test_not_an_identifier() {
        let mut lexer = BufferLexer::new("42");
        let mut arena = TokenListArena::new();
        assert!(try_optional_cpp_identifier(&mut lexer, &mut arena, true)
            .unwrap()
            .is_none());
        assert_matches!(
            require_cpp_identifier(&mut lexer, &mut arena, true, Some("type")),
            Err(ParseError::UnexpectedToken { .. })
        );

        let mut lexer = BufferLexer::new(":: 42");
        assert_matches!(
            try_optional_cpp_identifier(&mut lexer, &mut arena, true),
            Err(ParseError::UnexpectedToken { .. })
        );
    }
}
