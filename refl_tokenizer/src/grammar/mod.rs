//! Grammar helpers over the token stream contract
//!
//! Combinators, qualified identifiers, numeric constants, declaration
//! specifiers, the declaration skipper, and the reflection keyword tables.

pub mod combinators;
pub mod identifiers;
pub mod keywords;
pub mod numeric;
pub mod skipper;
pub mod specifiers;

pub use combinators::{
    optional, optional_with, require, require_identifier, require_list, require_list_tokens,
    require_symbol, skip_balanced, try_optional, try_optional_any, try_optional_identifier,
    try_optional_list, try_optional_symbol,
};
pub use identifiers::{require_cpp_identifier, try_optional_cpp_identifier};
pub use keywords::{
    classify_word_type, is_reflection_macro, probably_a_macro, DeprecationMacro, ReflectionMacro,
    SpecifierMarker, WordType,
};
pub use numeric::{
    require_const_int, require_const_int_expression, try_optional_const_double,
    try_optional_const_double_expression, try_optional_const_float,
    try_optional_const_float_expression, try_optional_const_int, try_optional_const_int_expression,
    try_optional_const_long, try_optional_const_long_expression,
};
pub use skipper::{skip_declaration, SkipOutcome};
pub use specifiers::{
    parse_specifiers, try_parse_alignas, try_parse_bracket_attributes, try_parse_deprecation,
    try_parse_marker, BracketAttribute, DeclarationSpecifiers, Deprecation,
};
