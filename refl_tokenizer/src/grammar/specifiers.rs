//! Declaration specifiers that precede reflected members
//!
//! Recognizes deprecation macros, argument-less markers, `[[...]]` attribute
//! lists (with an optional `using Ns:` prefix) and `alignas(N)`.

use serde::Serialize;

use crate::grammar::combinators::{
    require_identifier, require_list_tokens, require_symbol, skip_balanced, try_optional_symbol,
};
use crate::grammar::keywords::{DeprecationMacro, SpecifierMarker};
use crate::grammar::numeric::require_const_int_expression;
use crate::syntax::ParseResult;
use crate::tokens::{Token, TokenStream};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deprecation {
    pub kind: DeprecationMacro,
    pub version: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketAttribute {
    pub namespace: Option<String>,
    pub name: String,
    /// Argument tokens joined by single spaces
    pub arguments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeclarationSpecifiers {
    pub deprecation: Option<Deprecation>,
    pub markers: Vec<SpecifierMarker>,
    pub attributes: Vec<BracketAttribute>,
    pub alignment: Option<i32>,
}

impl DeclarationSpecifiers {
    pub fn is_empty(&self) -> bool {
        self.deprecation.is_none()
            && self.markers.is_empty()
            && self.attributes.is_empty()
            && self.alignment.is_none()
    }

    pub fn has_marker(&self, marker: SpecifierMarker) -> bool {
        self.markers.contains(&marker)
    }
}

fn join_values(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .map(|token| token.value)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `UE_DEPRECATED(5.1, "Use Other instead")` and friends
pub fn try_parse_deprecation<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<Deprecation>> {
    let token = stream.peek_token()?;
    let Some(kind) = token
        .is_identifier()
        .then(|| DeprecationMacro::from_str(token.value))
        .flatten()
    else {
        return Ok(None);
    };
    stream.consume_token();

    let mut deprecation = Deprecation {
        kind,
        version: None,
        message: None,
    };
    if !stream.peek_token()?.is_symbol_char('(') {
        return Ok(Some(deprecation));
    }

    let mut index = 0;
    require_list_tokens(stream, '(', ')', ',', false, kind.as_str(), |element| {
        match (index, element) {
            (0, [single]) if single.is_const_string() => {
                deprecation.message = Some(single.get_unescaped_string())
            }
            (0, _) => deprecation.version = Some(join_values(element)),
            (_, [single]) if single.is_const_string() => {
                deprecation.message = Some(single.get_unescaped_string())
            }
            _ => {}
        }
        index += 1;
        Ok(())
    })?;
    Ok(Some(deprecation))
}

pub fn try_parse_marker<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<SpecifierMarker>> {
    let token = stream.peek_token()?;
    if !token.is_identifier() {
        return Ok(None);
    }
    let marker = SpecifierMarker::from_str(token.value);
    if marker.is_some() {
        stream.consume_token();
    }
    Ok(marker)
}

/// `[[using Ns: a, b(args)]]` or `[[ns::a]]`
pub fn try_parse_bracket_attributes<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<Option<Vec<BracketAttribute>>> {
    if !stream.peek_token()?.is_symbol_text("[[") {
        return Ok(None);
    }
    stream.consume_token();

    let mut using_namespace = None;
    if stream.peek_token()?.is_identifier_text("using") {
        stream.consume_token();
        using_namespace = Some(require_identifier(stream, Some("attribute namespace"))?.value);
        require_symbol(stream, ':', Some("attribute namespace"))?;
    }

    let mut attributes = Vec::new();
    if !stream.peek_token()?.is_symbol_char(']') {
        loop {
            attributes.push(parse_attribute(stream, using_namespace)?);
            if !try_optional_symbol(stream, ',')? {
                break;
            }
        }
    }

    require_symbol(stream, ']', Some("attribute list"))?;
    require_symbol(stream, ']', Some("attribute list"))?;
    Ok(Some(attributes))
}

fn parse_attribute<'src>(
    stream: &mut dyn TokenStream<'src>,
    using_namespace: Option<&'src str>,
) -> ParseResult<BracketAttribute> {
    let mut namespace = using_namespace.map(str::to_string);
    let mut name = require_identifier(stream, Some("attribute"))?.value;

    if stream.peek_token()?.is_symbol_text("::") {
        stream.consume_token();
        namespace = Some(name.to_string());
        name = require_identifier(stream, Some("attribute"))?.value;
    }

    let arguments = if stream.peek_token()?.is_symbol_char('(') {
        Some(join_values(&skip_balanced(stream, '(', ')', "attribute arguments")?))
    } else {
        None
    };

    Ok(BracketAttribute {
        namespace,
        name: name.to_string(),
        arguments,
    })
}

/// `alignas(N)`
pub fn try_parse_alignas<'src>(stream: &mut dyn TokenStream<'src>) -> ParseResult<Option<i32>> {
    if !stream.peek_token()?.is_identifier_text("alignas") {
        return Ok(None);
    }
    stream.consume_token();

    require_symbol(stream, '(', Some("alignas"))?;
    let alignment = require_const_int_expression(stream, Some("alignas"))?;
    require_symbol(stream, ')', Some("alignas"))?;
    Ok(Some(alignment))
}

/// Collect every specifier in front of a declaration, in any order
pub fn parse_specifiers<'src>(
    stream: &mut dyn TokenStream<'src>,
) -> ParseResult<DeclarationSpecifiers> {
    let mut specifiers = DeclarationSpecifiers::default();

    loop {
        if let Some(deprecation) = try_parse_deprecation(stream)? {
            specifiers.deprecation = Some(deprecation);
        } else if let Some(marker) = try_parse_marker(stream)? {
            specifiers.markers.push(marker);
        } else if let Some(attributes) = try_parse_bracket_attributes(stream)? {
            specifiers.attributes.extend(attributes);
        } else if let Some(alignment) = try_parse_alignas(stream)? {
            specifiers.alignment = Some(alignment);
        } else {
            return Ok(specifiers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::BufferLexer;
    use crate::syntax::ParseError;
    use assert_matches::assert_matches;

    #[test]
    fn test_deprecation_macro() {
        let source = "UE_DEPRECATED(5.1, \"Use NewValue instead\") int32 OldValue;";
        let mut lexer = BufferLexer::new(source);
        let deprecation = try_parse_deprecation(&mut lexer).unwrap().unwrap();
        assert_eq!(deprecation.kind, DeprecationMacro::UeDeprecated);
        assert_eq!(deprecation.version.as_deref(), Some("5.1"));
        assert_eq!(deprecation.message.as_deref(), Some("Use NewValue instead"));
        assert_eq!(lexer.get_token().unwrap().value, "int32");
    }

    #[test]
    fn test_markers_and_alignas() {
        let source = "UE_NODISCARD alignas(16) UE_NO_UNIQUE_ADDRESS FVector V;";
        let mut lexer = BufferLexer::new(source);
        let specifiers = parse_specifiers(&mut lexer).unwrap();
        assert!(specifiers.has_marker(SpecifierMarker::NoDiscard));
        assert!(specifiers.has_marker(SpecifierMarker::NoUniqueAddress));
        assert_eq!(specifiers.alignment, Some(16));
        assert_eq!(lexer.peek_token().unwrap().value, "FVector");
    }

    #[test]
    fn test_bracket_attributes() {
        let source =
            "[[using clang: annotate(\"x\", (1)), noinline]] [[msvc::noop_dtor]] int F();";
        let mut lexer = BufferLexer::new(source);
        let specifiers = parse_specifiers(&mut lexer).unwrap();

        assert_eq!(specifiers.attributes.len(), 3);
        let annotate = &specifiers.attributes[0];
        assert_eq!(annotate.namespace.as_deref(), Some("clang"));
        assert_eq!(annotate.name, "annotate");
        assert_eq!(annotate.arguments.as_deref(), Some("\"x\" , ( 1 )"));
        assert_eq!(specifiers.attributes[1].namespace.as_deref(), Some("clang"));
        assert_eq!(specifiers.attributes[2].namespace.as_deref(), Some("msvc"));
        assert_eq!(specifiers.attributes[2].name, "noop_dtor");
        assert_eq!(lexer.peek_token().unwrap().value, "int");
    }

    #[test]
    fn test_no_specifiers() {
        let mut lexer = BufferLexer::new("int32 Value;");
        assert!(parse_specifiers(&mut lexer).unwrap().is_empty());
        assert_eq!(lexer.peek_token().unwrap().value, "int32");
    }

    #[test]
    fn test_unclosed_attribute_list() {
        let mut lexer = BufferLexer::new("[[nodiscard int");
        assert_matches!(
            try_parse_bracket_attributes(&mut lexer),
            Err(ParseError::UnexpectedToken { .. })
        );
    }
}
