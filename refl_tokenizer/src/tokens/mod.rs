//! Token model for reflection header tokenization
//!
//! - [`Token`] / [`TokenKind`]: `Copy` token values borrowing the source buffer
//! - [`Comment`]: comment runs attached to the next declaration
//! - [`TokenListArena`]: pooled linked lists for identifier chains
//! - [`TokenStream`]: the contract implemented by the buffer lexer and the replay reader

pub mod comment;
pub mod token;
pub mod token_list;
pub mod token_stream;

pub use comment::{Comment, CommentKind};
pub use token::{is_identifier_char, is_identifier_start, Token, TokenKind};
pub use token_list::{NodeId, TokenList, TokenListArena};
pub use token_stream::{RawStringOptions, TokenStream};
