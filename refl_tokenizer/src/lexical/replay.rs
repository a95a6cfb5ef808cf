//! Replay of previously captured tokens
//!
//! A [`ReplayReader`] serves a recorded token slice through the same
//! [`TokenStream`] contract as the buffer lexer, so grammar helpers can re-parse
//! a captured region (a default value, a specifier argument) without re-lexing.

use crate::config::compile_time::stream::MAX_REPLAY_SAVED_STATES;
use crate::syntax::{internal_error, ParseResult};
use crate::tokens::{Comment, RawStringOptions, Token, TokenKind, TokenStream};
use crate::utils::Position;

pub struct ReplayReader<'r, 'src> {
    tokens: &'r [Token<'src>],
    cursor: usize,
    saved: Vec<usize>,
    end_token: Token<'src>,
}

impl<'r, 'src> ReplayReader<'r, 'src> {
    /// Reader yielding `tokens` and then an `end_kind` token forever
    pub fn new(tokens: &'r [Token<'src>], end_kind: TokenKind) -> Self {
        Self::with_stack(tokens, end_kind, Vec::with_capacity(MAX_REPLAY_SAVED_STATES))
    }

    fn with_stack(tokens: &'r [Token<'src>], end_kind: TokenKind, mut saved: Vec<usize>) -> Self {
        saved.clear();
        Self {
            tokens,
            cursor: 0,
            saved,
            end_token: synthesize_end(tokens, end_kind),
        }
    }

    /// Point the reader at a new slice, dropping any saved states
    pub fn reset(&mut self, tokens: &'r [Token<'src>], end_kind: TokenKind) {
        self.tokens = tokens;
        self.cursor = 0;
        self.saved.clear();
        self.end_token = synthesize_end(tokens, end_kind);
    }

    pub fn remaining(&self) -> &'r [Token<'src>] {
        &self.tokens[self.cursor..]
    }
}

/// End token placed directly after the last replayed token
fn synthesize_end<'src>(tokens: &[Token<'src>], end_kind: TokenKind) -> Token<'src> {
    let position = tokens.last().map_or_else(Position::start, |last| {
        Position::new(last.input_start_pos + last.value.len(), last.input_line)
    });
    Token::end(end_kind, position)
}

impl<'r, 'src> TokenStream<'src> for ReplayReader<'r, 'src> {
    fn peek_token(&mut self) -> ParseResult<Token<'src>> {
        Ok(self.tokens.get(self.cursor).copied().unwrap_or(self.end_token))
    }

    fn consume_token(&mut self) {
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
    }

    fn get_line(&mut self) -> ParseResult<Token<'src>> {
        internal_error("get_line is not supported on replayed tokens")
    }

    fn get_raw_string(
        &mut self,
        _terminator: char,
        _options: RawStringOptions,
    ) -> ParseResult<&'src str> {
        internal_error("get_raw_string is not supported on replayed tokens")
    }

    // Replayed tokens carry no comments
    fn comments(&self) -> &[Comment<'src>] {
        &[]
    }

    fn clear_comments(&mut self) {}

    fn disable_comments(&mut self) {}

    fn enable_comments(&mut self) {}

    fn commit_pending_comments(&mut self) {}

    fn save_state(&mut self) {
        if self.saved.len() >= MAX_REPLAY_SAVED_STATES {
            internal_error("replay save state stack overflow");
        }
        self.saved.push(self.cursor);
    }

    fn restore_state(&mut self) {
        match self.saved.pop() {
            Some(cursor) => self.cursor = cursor,
            None => internal_error("restore_state called without a saved state"),
        }
    }

    fn abandon_state(&mut self) {
        if self.saved.pop().is_none() {
            internal_error("abandon_state called without a saved state");
        }
    }

    fn enable_recording(&mut self) {
        internal_error("recording is not supported on replayed tokens")
    }

    fn record_token(&mut self, _token: Token<'src>) {
        internal_error("recording is not supported on replayed tokens")
    }

    fn disable_recording(&mut self) {
        internal_error("recording is not supported on replayed tokens")
    }

    fn recorded_tokens(&self) -> &[Token<'src>] {
        &[]
    }

    fn position(&self) -> Position {
        self.tokens
            .get(self.cursor)
            .unwrap_or(&self.end_token)
            .position()
    }
}

/// Reuses the save-state stacks of finished readers
#[derive(Debug, Default)]
pub struct ReplayPool {
    spare: Vec<Vec<usize>>,
}

impl ReplayPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire<'r, 'src>(
        &mut self,
        tokens: &'r [Token<'src>],
        end_kind: TokenKind,
    ) -> ReplayReader<'r, 'src> {
        match self.spare.pop() {
            Some(stack) => ReplayReader::with_stack(tokens, end_kind, stack),
            None => ReplayReader::new(tokens, end_kind),
        }
    }

    pub fn release(&mut self, reader: ReplayReader<'_, '_>) {
        self.spare.push(reader.saved);
    }

    pub fn available(&self) -> usize {
        self.spare.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::BufferLexer;

    fn record_all<'src>(lexer: &mut BufferLexer<'src>) -> Vec<Token<'src>> {
        lexer.enable_recording();
        while !lexer.peek_token().unwrap().is_end_type() {
            lexer.consume_token();
        }
        let recorded = lexer.recorded_tokens().to_vec();
        lexer.disable_recording();
        recorded
    }

    #[test]
    fn test_recorded_run_replays_like_lexer() {
        let source = "UPROPERTY(EditAnywhere, meta=(ClampMin=\"0\")) TArray<FName> Names;";
        let recorded = record_all(&mut BufferLexer::new(source));
        let previous = BufferLexer::new("Unrelated Tokens").tokenize_all().unwrap();

        let mut replay = ReplayReader::new(&previous, TokenKind::EndOfType);
        replay.get_token().unwrap();
        replay.save_state();
        replay.reset(&recorded, TokenKind::EndOfFile);

        let mut lexer = BufferLexer::new(source);
        loop {
            let expected = lexer.get_token().unwrap();
            let actual = replay.get_token().unwrap();
            if expected.is_end_type() {
                assert!(actual.is_end_type());
                break;
            }
            assert_eq!(expected.kind, actual.kind);
            assert_eq!(expected.value, actual.value);
            assert_eq!(expected.position(), actual.position());
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn test_reset_drops_saved_states() {
        let first = BufferLexer::new("a b").tokenize_all().unwrap();
        let second = BufferLexer::new("c").tokenize_all().unwrap();
        let mut replay = ReplayReader::new(&first, TokenKind::EndOfType);
        replay.save_state();
        replay.save_state();

        replay.reset(&second, TokenKind::EndOfDeclaration);
        // Both slots are free again after the reset
        replay.save_state();
        replay.save_state();
        assert_eq!(replay.get_token().unwrap().value, "c");
        assert_eq!(replay.peek_token().unwrap().kind, TokenKind::EndOfDeclaration);
    }

    #[test]
    fn test_synthesized_end_token() {
        let source = "Foo  Bar";
        let tokens = BufferLexer::new(source).tokenize_all().unwrap();
        let mut replay = ReplayReader::new(&tokens, TokenKind::EndOfType);

        replay.get_token().unwrap();
        replay.get_token().unwrap();
        let end = replay.get_token().unwrap();
        assert_eq!(end.kind, TokenKind::EndOfType);
        assert_eq!(end.input_start_pos, source.len());
        assert!(replay.is_eof().unwrap());

        let empty: [Token<'_>; 0] = [];
        let mut replay = ReplayReader::new(&empty, TokenKind::EndOfDefault);
        assert_eq!(replay.peek_token().unwrap().input_start_pos, 0);
    }

    #[test]
    fn test_save_restore() {
        let tokens = BufferLexer::new("a b c").tokenize_all().unwrap();
        let mut replay = ReplayReader::new(&tokens, TokenKind::EndOfType);

        replay.save_state();
        replay.get_token().unwrap();
        replay.save_state();
        replay.get_token().unwrap();
        replay.restore_state();
        assert_eq!(replay.peek_token().unwrap().value, "b");
        replay.restore_state();
        assert_eq!(replay.peek_token().unwrap().value, "a");
    }

    #[test]
    #[should_panic(expected = "stack overflow")]
    fn test_replay_save_bound() {
        let mut replay = ReplayReader::new(&[], TokenKind::EndOfType);
        for _ in 0..=MAX_REPLAY_SAVED_STATES {
            replay.save_state();
        }
    }

    #[test]
    #[should_panic(expected = "not supported")]
    fn test_get_line_unsupported() {
        let mut replay = ReplayReader::new(&[], TokenKind::EndOfType);
        let _ = replay.get_line();
    }

    #[test]
    fn test_pool_reuses_stacks() {
        let tokens = BufferLexer::new("x y").tokenize_all().unwrap();
        let mut pool = ReplayPool::new();

        let mut reader = pool.acquire(&tokens, TokenKind::EndOfType);
        reader.save_state();
        pool.release(reader);
        assert_eq!(pool.available(), 1);

        let mut reader = pool.acquire(&tokens, TokenKind::EndOfType);
        assert_eq!(pool.available(), 0);
        // Stale saved states are dropped on reuse
        reader.save_state();
        reader.save_state();
        assert_eq!(reader.remaining().len(), 2);
    }
}
