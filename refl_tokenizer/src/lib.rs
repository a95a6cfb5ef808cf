// Internal modules
pub mod config;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use lexical::{BufferLexer, ConditionalPreprocessor, Preprocessor, ReplayPool, ReplayReader};
pub use syntax::{ParseError, ParseResult};
pub use tokens::{Comment, Token, TokenKind, TokenListArena, TokenStream};
pub use utils::{Position, SourceMap, Span};
