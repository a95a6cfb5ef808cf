//! Stream contract shared by the buffer lexer and the replay reader
//!
//! Everything above the lexical layer talks to a `&mut dyn TokenStream`, so the
//! same grammar code runs against live scanning and against recorded tokens.

use crate::syntax::ParseResult;
use crate::tokens::{Comment, Token};
use crate::utils::Position;

/// Options for [`TokenStream::get_raw_string`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawStringOptions {
    /// Terminators inside double quotes do not end the scan
    pub respect_quotes: bool,
    /// Leave the terminator in the stream
    pub dont_consume_terminator: bool,
}

impl RawStringOptions {
    pub fn respecting_quotes() -> Self {
        Self {
            respect_quotes: true,
            dont_consume_terminator: false,
        }
    }
}

pub trait TokenStream<'src> {
    // ========================================================================
    // TOKENS
    // ========================================================================

    /// Current token without consuming it; repeated calls return the same token
    fn peek_token(&mut self) -> ParseResult<Token<'src>>;

    /// Mark the current token consumed
    fn consume_token(&mut self);

    fn get_token(&mut self) -> ParseResult<Token<'src>> {
        let token = self.peek_token()?;
        self.consume_token();
        Ok(token)
    }

    fn is_eof(&mut self) -> ParseResult<bool> {
        Ok(self.peek_token()?.is_end_type())
    }

    /// Rest of the physical line as a single `Line` token
    fn get_line(&mut self) -> ParseResult<Token<'src>>;

    /// Raw text up to `terminator` or end of line
    fn get_raw_string(
        &mut self,
        terminator: char,
        options: RawStringOptions,
    ) -> ParseResult<&'src str>;

    // ========================================================================
    // COMMENTS
    // ========================================================================

    /// Committed comments only
    fn comments(&self) -> &[Comment<'src>];
    fn clear_comments(&mut self);
    fn disable_comments(&mut self);
    fn enable_comments(&mut self);
    fn commit_pending_comments(&mut self);

    // ========================================================================
    // BACKTRACKING
    // ========================================================================

    fn save_state(&mut self);
    fn restore_state(&mut self);
    fn abandon_state(&mut self);

    // ========================================================================
    // RECORDING
    // ========================================================================

    fn enable_recording(&mut self);
    fn record_token(&mut self, token: Token<'src>);
    fn disable_recording(&mut self);
    fn recorded_tokens(&self) -> &[Token<'src>];

    /// Position used when reporting diagnostics
    fn position(&self) -> Position;
}
