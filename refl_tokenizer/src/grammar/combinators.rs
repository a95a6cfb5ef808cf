//! Small parsing combinators over any [`TokenStream`]
//!
//! Every helper takes `&mut dyn TokenStream`, so the same code drives the buffer
//! lexer and the replay reader.

use crate::syntax::{ParseError, ParseResult};
use crate::tokens::{Token, TokenStream};

// ============================================================================
// SINGLE TOKENS
// ============================================================================

/// Consume the next token when it is an identifier or symbol spelled `text`
pub fn try_optional<'src>(stream: &mut dyn TokenStream<'src>, text: &str) -> ParseResult<bool> {
    let token = stream.peek_token()?;
    if token.is_value(text) {
        stream.consume_token();
        Ok(true)
    } else {
        Ok(false)
    }
}

pub fn try_optional_symbol<'src>(
    stream: &mut dyn TokenStream<'src>,
    symbol: char,
) -> ParseResult<bool> {
    let token = stream.peek_token()?;
    if token.is_symbol_char(symbol) {
        stream.consume_token();
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Consume and return the next token when it matches any of `texts`
pub fn try_optional_any<'src>(
    stream: &mut dyn TokenStream<'src>,
    texts: &[&str],
) -> ParseResult<Option<Token<'src>>> {
    let token = stream.peek_token()?;
    if texts.iter().any(|text| token.is_value(text)) {
        stream.consume_token();
        Ok(Some(token))
    } else {
        Ok(None)
    }
}

/// Skip `text` if present
pub fn optional<'src>(stream: &mut dyn TokenStream<'src>, text: &str) -> ParseResult<()> {
    try_optional(stream, text).map(|_| ())
}

/// Run `action` after `text` when `text` is present
pub fn optional_with<'src, F>(
    stream: &mut dyn TokenStream<'src>,
    text: &str,
    action: F,
) -> ParseResult<bool>
where
    F: FnOnce(&mut dyn TokenStream<'src>) -> ParseResult<()>,
{
    if try_optional(stream, text)? {
        action(stream)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

pub fn require<'src>(
    stream: &mut dyn TokenStream<'src>,
    text: &str,
    context: Option<&str>,
) -> ParseResult<Token<'src>> {
    let token = stream.peek_token()?;
    if token.is_value(text) {
        stream.consume_token();
        Ok(token)
    } else {
        Err(unexpected(text, &token, context))
    }
}

pub fn require_symbol<'src>(
    stream: &mut dyn TokenStream<'src>,
    symbol: char,
    context: Option<&str>,
) -> ParseResult<Token<'src>> {
    let token = stream.peek_token()?;
    if token.is_symbol_char(symbol) {
        stream.consume_token();
        Ok(token)
    } else {
        Err(unexpected(&symbol.to_string(), &token, context))
    }
}

pub fn try_optional_identifier<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<Token<'src>>> {
    let token = stream.peek_token()?;
    if token.is_identifier() {
        stream.consume_token();
        Ok(Some(token))
    } else {
        Ok(None)
    }
}

pub fn require_identifier<'src>(
    stream: &mut dyn TokenStream<'src>,
    context: Option<&str>,
) -> ParseResult<Token<'src>> {
    match try_optional_identifier(stream)? {
        Some(token) => Ok(token),
        None => {
            let token = stream.peek_token()?;
            Err(unexpected("identifier", &token, context))
        }
    }
}

/// Positioned "missing X" error, logged on creation
pub(crate) fn unexpected(expected: &str, found: &Token<'_>, context: Option<&str>) -> ParseError {
    ParseError::unexpected_token(expected, &found.to_string(), context, found.position()).logged()
}

// ============================================================================
// DELIMITED LISTS
// ============================================================================

/// Parse `initiator element (separator element)* terminator`, running `action`
/// once per element. A separator directly before the terminator is accepted
/// only with `allow_trailing`.
pub fn require_list<'src, F>(
    stream: &mut dyn TokenStream<'src>,
    initiator: char,
    terminator: char,
    separator: char,
    allow_trailing: bool,
    context: &str,
    mut action: F,
) -> ParseResult<()>
where
    F: FnMut(&mut dyn TokenStream<'src>) -> ParseResult<()>,
{
    require_symbol(stream, initiator, Some(context))?;
    if try_optional_symbol(stream, terminator)? {
        return Ok(());
    }

    loop {
        action(&mut *stream)?;

        if try_optional_symbol(stream, terminator)? {
            return Ok(());
        }
        let token = stream.peek_token()?;
        if !token.is_symbol_char(separator) {
            let expected = format!("{}' or '{}", separator, terminator);
            return Err(unexpected(&expected, &token, Some(context)));
        }
        stream.consume_token();

        let next = stream.peek_token()?;
        if next.is_symbol_char(terminator) {
            if allow_trailing {
                stream.consume_token();
                return Ok(());
            }
            return Err(unexpected("list element", &next, Some(context)));
        }
    }
}

/// Like [`require_list`], handing each element to `action` as its raw tokens.
/// Elements may contain nested `()`, `[]` and `{}` groups.
pub fn require_list_tokens<'src, F>(
    stream: &mut dyn TokenStream<'src>,
    initiator: char,
    terminator: char,
    separator: char,
    allow_trailing: bool,
    context: &str,
    mut action: F,
) -> ParseResult<()>
where
    F: FnMut(&[Token<'src>]) -> ParseResult<()>,
{
    require_list(
        stream,
        initiator,
        terminator,
        separator,
        allow_trailing,
        context,
        |stream| {
            let element = collect_element(stream, terminator, separator, context)?;
            action(&element)
        },
    )
}

fn collect_element<'src>(
    stream: &mut dyn TokenStream<'src>,
    terminator: char,
    separator: char,
    context: &str,
) -> ParseResult<Vec<Token<'src>>> {
    let mut tokens = Vec::new();
    let mut closers: Vec<char> = Vec::new();

    loop {
        let token = stream.peek_token()?;
        if token.is_end_type() {
            return Err(unexpected(&terminator.to_string(), &token, Some(context)));
        }
        if closers.is_empty()
            && (token.is_symbol_char(terminator) || token.is_symbol_char(separator))
        {
            break;
        }

        match token.value {
            "(" if token.is_symbol() => closers.push(')'),
            "[" if token.is_symbol() => closers.push(']'),
            "[[" if token.is_symbol() => {
                closers.push(']');
                closers.push(']');
            }
            "{" if token.is_symbol() => closers.push('}'),
            ")" | "]" | "}" if token.is_symbol() => {
                let expected = closers.pop();
                if expected.map_or(true, |c| !token.is_symbol_char(c)) {
                    return Err(unexpected(
                        &expected.unwrap_or(terminator).to_string(),
                        &token,
                        Some(context),
                    ));
                }
            }
            _ => {}
        }

        stream.consume_token();
        tokens.push(token);
    }

    if tokens.is_empty() {
        let token = stream.peek_token()?;
        return Err(unexpected("list element", &token, Some(context)));
    }
    Ok(tokens)
}

/// [`require_list`] when the next token is `initiator`; otherwise nothing
pub fn try_optional_list<'src, F>(
    stream: &mut dyn TokenStream<'src>,
    initiator: char,
    terminator: char,
    separator: char,
    allow_trailing: bool,
    context: &str,
    action: F,
) -> ParseResult<bool>
where
    F: FnMut(&mut dyn TokenStream<'src>) -> ParseResult<()>,
{
    if !stream.peek_token()?.is_symbol_char(initiator) {
        return Ok(false);
    }
    require_list(stream, initiator, terminator, separator, allow_trailing, context, action)?;
    Ok(true)
}

/// Consume a balanced `open ... close` group and return the tokens inside it
pub fn skip_balanced<'src>(
    stream: &mut dyn TokenStream<'src>,
    open: char,
    close: char,
    context: &str,
) -> ParseResult<Vec<Token<'src>>> {
    let start = require_symbol(stream, open, Some(context))?;
    let mut depth = 1usize;
    let mut inner = Vec::new();

    loop {
        let token = stream.get_token()?;
        if token.is_end_type() {
            return Err(ParseError::mismatched_delimiters(
                &open.to_string(),
                &close.to_string(),
                Some(context),
                start.position(),
            )
            .logged());
        }
        if token.is_symbol_char(open) {
            depth += 1;
        } else if token.is_symbol_char(close) {
            depth -= 1;
            if depth == 0 {
                return Ok(inner);
            }
        }
        inner.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::{BufferLexer, ReplayReader};
    use crate::tokens::TokenKind;
    use assert_matches::assert_matches;

    fn identifiers<'src>(
        stream: &mut dyn TokenStream<'src>,
        allow_trailing: bool,
    ) -> ParseResult<Vec<&'src str>> {
        let mut names = Vec::new();
        require_list(stream, '(', ')', ',', allow_trailing, "test list", |stream| {
            names.push(require_identifier(stream, Some("test list"))?.value);
            Ok(())
        })?;
        Ok(names)
    }

    #[test]
    fn test_trailing_separator_allowed() {
        let mut lexer = BufferLexer::new("(a, b,)");
        assert_eq!(identifiers(&mut lexer, true).unwrap(), vec!["a", "b"]);
        assert!(lexer.is_eof().unwrap());
    }

    #[test]
    fn test_trailing_separator_rejected_at_terminator() {
        let source = "(a, b,)";
        let mut lexer = BufferLexer::new(source);
        let error = identifiers(&mut lexer, false).unwrap_err();
        assert_matches!(error, ParseError::UnexpectedToken { ref found, .. } if found == ")");
        assert_eq!(error.position().offset, source.find(')').unwrap());
    }

    #[test]
    fn test_empty_and_malformed_lists() {
        let mut lexer = BufferLexer::new("()");
        assert!(identifiers(&mut lexer, false).unwrap().is_empty());

        let mut lexer = BufferLexer::new("(a b)");
        assert_matches!(
            identifiers(&mut lexer, false),
            Err(ParseError::UnexpectedToken { .. })
        );
    }

    #[test]
    fn test_list_over_replay() {
        let tokens = BufferLexer::new("(x, y)").tokenize_all().unwrap();
        let mut replay = ReplayReader::new(&tokens, TokenKind::EndOfType);
        assert_eq!(identifiers(&mut replay, false).unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_require_list_tokens() {
        let mut lexer = BufferLexer::new("(ClampMin=\"0\", meta=(A, B), Category)");
        let mut elements = Vec::new();
        require_list_tokens(&mut lexer, '(', ')', ',', false, "specifiers", |tokens| {
            elements.push(tokens.iter().map(|t| t.value).collect::<String>());
            Ok(())
        })
        .unwrap();
        assert_eq!(elements, vec!["ClampMin=\"0\"", "meta=(A,B)", "Category"]);
    }

    #[test]
    fn test_require_reports_context() {
        let mut lexer = BufferLexer::new("int");
        let error = require_symbol(&mut lexer, ';', Some("property declaration")).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("';'"));
        assert!(message.contains("property declaration"));
        assert!(message.contains("'int'"));
    }

    #[test]
    fn test_optional_forms() {
        let mut lexer = BufferLexer::new("const virtual Foo");
        assert!(try_optional(&mut lexer, "const").unwrap());
        assert!(!try_optional(&mut lexer, "const").unwrap());
        assert_eq!(
            try_optional_any(&mut lexer, &["static", "virtual"]).unwrap().map(|t| t.value),
            Some("virtual")
        );

        let mut seen = None;
        let matched = optional_with(&mut lexer, "Foo", |stream| {
            seen = Some(stream.is_eof()?);
            Ok(())
        })
        .unwrap();
        assert!(matched);
        assert_eq!(seen, Some(true));
    }

    #[test]
    fn test_try_optional_list() {
        let mut lexer = BufferLexer::new("Name (A)");
        let mut count = 0;
        let parsed = try_optional_list(&mut lexer, '(', ')', ',', false, "meta", |stream| {
            count += 1;
            stream.consume_token();
            Ok(())
        })
        .unwrap();
        assert!(!parsed);

        lexer.get_token().unwrap();
        let parsed = try_optional_list(&mut lexer, '(', ')', ',', false, "meta", |stream| {
            count += 1;
            stream.consume_token();
            Ok(())
        })
        .unwrap();
        assert!(parsed);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_skip_balanced() {
        let mut lexer = BufferLexer::new("(a, (b), c) rest");
        let inner = skip_balanced(&mut lexer, '(', ')', "arguments").unwrap();
        assert_eq!(inner.len(), 7);
        assert_eq!(lexer.get_token().unwrap().value, "rest");

        let mut lexer = BufferLexer::new("(a, (b)");
        assert_matches!(
            skip_balanced(&mut lexer, '(', ')', "arguments"),
            Err(ParseError::MismatchedDelimiters { .. })
        );
    }
}
