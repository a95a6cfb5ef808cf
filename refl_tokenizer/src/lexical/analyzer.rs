//! Buffer-driven lexer for reflection headers
//!
//! [`BufferLexer`] scans an in-memory header into [`Token`]s on demand. A peeked
//! token stays current until it is consumed, comments are attributed to the next
//! declaration, line-initial directives are delegated to an attached
//! [`Preprocessor`], and a bounded stack of snapshots supports backtracking.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::compile_time::lexical::{MAX_NAME_LENGTH, MAX_NUMBER_LENGTH, MAX_STRING_LENGTH};
use crate::config::compile_time::stream::MAX_SAVED_STATES;
use crate::config::runtime::LexicalPreferences;
use crate::grammar::keywords::is_two_char_symbol;
use crate::lexical::illegal_contents::IllegalContentsChecker;
use crate::lexical::preprocessor::{Directive, Preprocessor, RegionVerdict};
use crate::logging::codes;
use crate::syntax::{internal_error, ParseError, ParseResult};
use crate::tokens::{
    is_identifier_char, is_identifier_start, Comment, CommentKind, RawStringOptions, Token,
    TokenKind, TokenStream,
};
use crate::utils::Position;
use crate::{log_debug, log_error, log_success};

/// Counters collected while tokenizing, gated by [`LexicalPreferences`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub symbol_tokens: usize,
    pub numeric_tokens: usize,
    pub string_tokens: usize,
    pub comment_count: usize,
    pub directives_seen: usize,
    pub regions_skipped: usize,

    // Runtime preference-controlled metrics
    pub tokens_by_kind: HashMap<TokenKind, usize>,
    pub symbol_usage_patterns: HashMap<String, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token<'_>, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        match token.kind {
            TokenKind::Identifier => self.identifier_tokens += 1,
            TokenKind::Symbol => {
                self.symbol_tokens += 1;
                if preferences.track_symbol_patterns {
                    *self
                        .symbol_usage_patterns
                        .entry(token.value.to_string())
                        .or_insert(0) += 1;
                }
            }
            TokenKind::DecimalConst | TokenKind::HexConst | TokenKind::FloatConst => {
                self.numeric_tokens += 1
            }
            TokenKind::StringConst | TokenKind::CharConst => self.string_tokens += 1,
            _ => {}
        }

        if preferences.collect_detailed_metrics {
            *self.tokens_by_kind.entry(token.kind).or_insert(0) += 1;
        }
    }
}

// ============================================================================
// INTERNAL STATE
// ============================================================================

/// Collected comments; the first `committed_len` are visible to the consumer
#[derive(Debug, Clone, Default)]
struct CommentBuffer<'src> {
    comments: Vec<Comment<'src>>,
    committed_len: usize,
    newlines_since_comment: u32,
    clear_at_newline: bool,
}

impl<'src> CommentBuffer<'src> {
    fn clear(&mut self) {
        self.comments.clear();
        self.committed_len = 0;
    }

    fn clear_pending(&mut self) {
        self.comments.truncate(self.committed_len);
    }

    fn commit(&mut self) {
        self.committed_len = self.comments.len();
    }

    fn committed(&self) -> &[Comment<'src>] {
        &self.comments[..self.committed_len]
    }

    fn on_newline(&mut self) {
        self.newlines_since_comment += 1;
        if self.clear_at_newline {
            self.clear();
            self.clear_at_newline = false;
        }
    }

    fn add(&mut self, comment: Comment<'src>, inline: bool) {
        match comment.kind {
            CommentKind::Block => self.clear(),
            CommentKind::Line if self.newlines_since_comment >= 2 => self.clear(),
            CommentKind::Line => {}
        }
        self.comments.push(comment);
        self.newlines_since_comment = 0;
        if inline {
            self.clear_at_newline = true;
        }
    }
}

#[derive(Debug, Clone)]
struct SavedState<'src> {
    pos: usize,
    line: u32,
    has_token: bool,
    token: Token<'src>,
    comments: CommentBuffer<'src>,
    recorded_len: usize,
}

// ============================================================================
// BUFFER LEXER
// ============================================================================

pub struct BufferLexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    line: u32,
    has_token: bool,
    token: Token<'src>,
    comments: CommentBuffer<'src>,
    comments_disabled: u32,
    skipping_region: bool,
    saved: Vec<SavedState<'src>>,
    recording: bool,
    recorded: Vec<Token<'src>>,
    preprocessor: Option<Box<dyn Preprocessor>>,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl<'src> BufferLexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_preferences(source, LexicalPreferences::default())
    }

    pub fn with_preferences(source: &'src str, preferences: LexicalPreferences) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            has_token: false,
            token: Token::end(TokenKind::EndOfFile, Position::start()),
            comments: CommentBuffer::default(),
            comments_disabled: 0,
            skipping_region: false,
            saved: Vec::with_capacity(MAX_SAVED_STATES),
            recording: false,
            recorded: Vec::new(),
            preprocessor: None,
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Attach the collaborator that handles line-initial `#` directives
    pub fn with_preprocessor(mut self, preprocessor: Box<dyn Preprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    pub fn set_preprocessor(&mut self, preprocessor: Option<Box<dyn Preprocessor>>) {
        self.preprocessor = preprocessor;
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    /// Only whitespace separates `token` from the start of its line
    pub fn is_first_token_in_line(&self, token: &Token<'_>) -> bool {
        self.is_line_start(token.input_start_pos)
    }

    /// Lex every remaining token up to end of file (excluded)
    pub fn tokenize_all(&mut self) -> ParseResult<Vec<Token<'src>>> {
        log_debug!("Starting lexical analysis",
            "bytes" => self.source.len(),
            "max_name_length" => MAX_NAME_LENGTH,
            "max_string_length" => MAX_STRING_LENGTH
        );

        let mut tokens = Vec::new();
        loop {
            let token = self.get_token()?;
            if token.is_end_type() {
                break;
            }
            tokens.push(token);
        }

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
            "tokens" => tokens.len(),
            "comments" => self.metrics.comment_count,
            "regions_skipped" => self.metrics.regions_skipped
        );
        Ok(tokens)
    }

    // ========================================================================
    // ERROR REPORTING
    // ========================================================================

    fn report(&self, error: ParseError) -> ParseError {
        if self.skipping_region
            && matches!(
                error,
                ParseError::UnterminatedString { .. } | ParseError::UnterminatedChar { .. }
            )
        {
            return error;
        }
        if self.preferences.include_position_in_errors {
            error.logged()
        } else {
            log_error!(error.error_code(), &error.to_string());
            error
        }
    }

    fn current_position(&self) -> Position {
        Position::new(self.pos, self.line)
    }

    fn byte_at(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or(0)
    }

    fn is_line_start(&self, offset: usize) -> bool {
        self.bytes[..offset.min(self.bytes.len())]
            .iter()
            .rev()
            .take_while(|&&b| b != b'\n')
            .all(|&b| matches!(b, b' ' | b'\t' | b'\r' | 0x0B | 0x0C))
    }

    /// Put a peeked but unconsumed token back into the buffer
    fn unget_current(&mut self) {
        if self.has_token {
            self.pos = self.token.unget_pos;
            self.line = self.token.unget_line;
            self.has_token = false;
        }
    }

    // ========================================================================
    // WHITESPACE AND COMMENTS
    // ========================================================================

    fn skip_whitespace_and_comments(&mut self) -> ParseResult<()> {
        loop {
            if self.pos >= self.bytes.len() {
                return Ok(());
            }

            match (self.byte_at(self.pos), self.byte_at(self.pos + 1)) {
                (b'\n', _) => {
                    self.pos += 1;
                    self.line += 1;
                    self.comments.on_newline();
                }
                (b' ' | b'\t' | b'\r' | 0x0B | 0x0C, _) => self.pos += 1,
                (b'\\', b'\n') => {
                    self.pos += 2;
                    self.line += 1;
                }
                (b'\\', b'\r') if self.byte_at(self.pos + 2) == b'\n' => {
                    self.pos += 3;
                    self.line += 1;
                }
                (b'/', b'/') => {
                    let start = self.current_position();
                    let inline = !self.is_line_start(self.pos);
                    let end = self.bytes[self.pos..]
                        .iter()
                        .position(|&b| b == b'\n')
                        .map_or(self.bytes.len(), |i| self.pos + i);
                    let text = self.source[self.pos..end].trim_end_matches('\r');
                    self.pos = end;
                    self.collect_comment(Comment::new(CommentKind::Line, text, start), inline);
                }
                (b'/', b'*') => {
                    let start = self.current_position();
                    let close = self.source[self.pos + 2..]
                        .find("*/")
                        .map(|i| self.pos + 2 + i + 2)
                        .ok_or_else(|| {
                            self.report(ParseError::UnterminatedComment { position: start })
                        })?;
                    let text = &self.source[self.pos..close];
                    self.line += text.bytes().filter(|&b| b == b'\n').count() as u32;
                    self.pos = close;
                    self.collect_comment(Comment::new(CommentKind::Block, text, start), false);
                }
                (b'*', b'/') => {
                    return Err(self.report(ParseError::UnexpectedCommentClose {
                        position: self.current_position(),
                    }));
                }
                _ => {
                    if self.comments.newlines_since_comment >= 2 {
                        self.comments.clear_pending();
                    }
                    return Ok(());
                }
            }
        }
    }

    fn collect_comment(&mut self, comment: Comment<'src>, inline: bool) {
        self.metrics.comment_count += 1;
        self.comments.add(comment, inline);
    }

    // ========================================================================
    // TOKEN SCANNING
    // ========================================================================

    /// Next token with directives delegated to the preprocessor
    fn lex_token(&mut self) -> ParseResult<Token<'src>> {
        loop {
            let unget = self.current_position();
            self.skip_whitespace_and_comments()?;
            let start = self.current_position();

            if self.pos >= self.bytes.len() {
                return Ok(Token::new(TokenKind::EndOfFile, "", start, unget));
            }

            if self.bytes[self.pos] == b'#'
                && self.preprocessor.is_some()
                && self.is_line_start(self.pos)
            {
                self.pos += 1;
                let hash = Token::new(TokenKind::Symbol, "#", start, unget);
                self.handle_directive(hash)?;
                continue;
            }

            return self.lex_at(start, unget);
        }
    }

    /// Next token without directive handling
    fn lex_raw(&mut self) -> ParseResult<Token<'src>> {
        let unget = self.current_position();
        self.skip_whitespace_and_comments()?;
        let start = self.current_position();
        if self.pos >= self.bytes.len() {
            return Ok(Token::new(TokenKind::EndOfFile, "", start, unget));
        }
        self.lex_at(start, unget)
    }

    fn lex_at(&mut self, start: Position, unget: Position) -> ParseResult<Token<'src>> {
        let c = self.byte_at(self.pos);
        let next = self.byte_at(self.pos + 1);

        if is_identifier_start(c as char) {
            self.lex_identifier(start, unget)
        } else if c.is_ascii_digit() || (matches!(c, b'+' | b'-' | b'.') && next.is_ascii_digit())
        {
            self.lex_number(start, unget)
        } else if c == b'\'' {
            self.lex_char(start, unget)
        } else if c == b'"' {
            self.lex_string(start, unget)
        } else {
            Ok(self.lex_symbol(start, unget))
        }
    }

    fn finish(
        &mut self,
        kind: TokenKind,
        start: Position,
        unget: Position,
        end: usize,
        newlines: u32,
    ) -> Token<'src> {
        let value = &self.source[start.offset..end];
        self.pos = end;
        self.line += newlines;
        Token::new(kind, value, start, unget)
    }

    fn lex_identifier(&mut self, start: Position, unget: Position) -> ParseResult<Token<'src>> {
        let mut end = self.pos;
        while end < self.bytes.len() && is_identifier_char(self.bytes[end] as char) {
            end += 1;
        }
        if end - self.pos > MAX_NAME_LENGTH {
            return Err(self.report(ParseError::IdentifierTooLong {
                max: MAX_NAME_LENGTH,
                position: start,
            }));
        }
        Ok(self.finish(TokenKind::Identifier, start, unget, end, 0))
    }

    fn lex_number(&mut self, start: Position, unget: Position) -> ParseResult<Token<'src>> {
        let mut end = self.pos;
        if matches!(self.byte_at(end), b'+' | b'-') {
            end += 1;
        }

        let kind;
        if self.byte_at(end) == b'0' && matches!(self.byte_at(end + 1), b'x' | b'X') {
            kind = TokenKind::HexConst;
            end += 2;
            while self.byte_at(end).is_ascii_hexdigit() {
                end += 1;
            }
            while matches!(self.byte_at(end), b'u' | b'U' | b'l' | b'L') {
                end += 1;
            }
        } else {
            let mut is_float = false;
            while self.byte_at(end).is_ascii_digit() {
                end += 1;
            }
            if self.byte_at(end) == b'.' {
                is_float = true;
                end += 1;
                while self.byte_at(end).is_ascii_digit() {
                    end += 1;
                }
            }
            if matches!(self.byte_at(end), b'e' | b'E') {
                let sign = usize::from(matches!(self.byte_at(end + 1), b'+' | b'-'));
                if self.byte_at(end + 1 + sign).is_ascii_digit() {
                    is_float = true;
                    end += 1 + sign;
                    while self.byte_at(end).is_ascii_digit() {
                        end += 1;
                    }
                }
            }
            if matches!(self.byte_at(end), b'f' | b'F') {
                is_float = true;
                end += 1;
            } else if !is_float {
                while matches!(self.byte_at(end), b'u' | b'U' | b'l' | b'L') {
                    end += 1;
                }
            }
            kind = if is_float {
                TokenKind::FloatConst
            } else {
                TokenKind::DecimalConst
            };
        }

        if end - self.pos > MAX_NUMBER_LENGTH {
            return Err(self.report(ParseError::NumberTooLong {
                max: MAX_NUMBER_LENGTH,
                position: start,
            }));
        }
        Ok(self.finish(kind, start, unget, end, 0))
    }

    fn lex_char(&mut self, start: Position, unget: Position) -> ParseResult<Token<'src>> {
        let mut end = self.pos + 1;
        match self.source[end..].chars().next() {
            Some('\\') => {
                end += 1;
                end += self.source[end..].chars().next().map_or(0, char::len_utf8);
            }
            Some('\n') | Some('\'') | None => {
                return Err(self.report(ParseError::UnterminatedChar { position: start }));
            }
            Some(c) => end += c.len_utf8(),
        }
        if self.byte_at(end) != b'\'' {
            return Err(self.report(ParseError::UnterminatedChar { position: start }));
        }
        Ok(self.finish(TokenKind::CharConst, start, unget, end + 1, 0))
    }

    fn lex_string(&mut self, start: Position, unget: Position) -> ParseResult<Token<'src>> {
        let mut end = self.pos + 1;
        let mut newlines = 0;
        loop {
            if end - self.pos > MAX_STRING_LENGTH {
                return Err(self.report(ParseError::StringTooLong {
                    max: MAX_STRING_LENGTH,
                    position: start,
                }));
            }
            match self.byte_at(end) {
                _ if end >= self.bytes.len() => {
                    return Err(self.report(ParseError::UnterminatedString { position: start }));
                }
                b'\n' => {
                    return Err(self.report(ParseError::UnterminatedString { position: start }));
                }
                b'\\' => {
                    if self.byte_at(end + 1) == b'\n' {
                        newlines += 1;
                    }
                    end = (end + 2).min(self.bytes.len());
                    // Keep `end` on a char boundary after escaping a multi-byte char
                    while !self.source.is_char_boundary(end) {
                        end += 1;
                    }
                }
                b'"' => {
                    end += 1;
                    break;
                }
                _ => end += 1,
            }
        }
        Ok(self.finish(TokenKind::StringConst, start, unget, end, newlines))
    }

    fn lex_symbol(&mut self, start: Position, unget: Position) -> Token<'src> {
        if let Some(pair) = self.source.get(self.pos..self.pos + 2) {
            if is_two_char_symbol(pair) {
                return self.finish(TokenKind::Symbol, start, unget, self.pos + 2, 0);
            }
        }
        let width = self.source[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.finish(TokenKind::Symbol, start, unget, self.pos + width, 0)
    }

    // ========================================================================
    // PREPROCESSOR COOPERATION
    // ========================================================================

    /// Read the directive following `hash` up to a trailing comment or the end of the
    /// line. The line break is consumed without counting toward comment separation.
    fn read_directive(&mut self, hash: Token<'src>) -> Directive<'src> {
        while matches!(self.byte_at(self.pos), b' ' | b'\t') {
            self.pos += 1;
        }
        let name_start = self.pos;
        while self.pos < self.bytes.len() && is_identifier_char(self.bytes[self.pos] as char) {
            self.pos += 1;
        }
        let name = &self.source[name_start..self.pos];

        let args_start = self.pos;
        while self.pos < self.bytes.len() {
            match (self.bytes[self.pos], self.byte_at(self.pos + 1)) {
                (b'\n', _) | (b'/', b'/') | (b'/', b'*') => break,
                (b'\\', b'\n') => {
                    self.pos += 2;
                    self.line += 1;
                }
                (b'"', _) => self.skip_directive_string(),
                _ => self.pos += 1,
            }
        }
        // Multi-byte chars only appear inside the argument run, never at its ends
        let arguments = self.source[args_start..self.pos].trim();

        if self.byte_at(self.pos) == b'\n' {
            self.pos += 1;
            self.line += 1;
        }

        Directive {
            hash,
            name,
            arguments,
        }
    }

    /// Step over a string literal inside directive arguments, stopping at its
    /// closing quote or the end of the line
    fn skip_directive_string(&mut self) {
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\n' => return,
                b'\\' if self.byte_at(self.pos + 1) != b'\n' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    fn handle_directive(&mut self, hash: Token<'src>) -> ParseResult<()> {
        let directive = self.read_directive(hash);
        self.metrics.directives_seen += 1;

        let verdict = match self.preprocessor.as_mut() {
            Some(preprocessor) => preprocessor.parse_directive(&directive, true),
            None => return Ok(()),
        }
        .map_err(|error| self.report(error))?;

        if verdict.clear_comments {
            self.comments.clear_pending();
        }
        if !verdict.region.is_included() {
            self.skip_excluded_region(verdict.region, directive.position())?;
        }
        Ok(())
    }

    fn skip_excluded_region(&mut self, verdict: RegionVerdict, start: Position) -> ParseResult<()> {
        let mut scan = verdict == RegionVerdict::ExcludeAndScanForIllegalContents;
        let comments_before = self.comments.clone();

        self.disable_comments();
        self.skipping_region = true;
        let result = self.scan_excluded(&mut scan);
        self.skipping_region = false;
        self.enable_comments();

        self.comments = comments_before;
        self.metrics.regions_skipped += 1;

        if self.preferences.log_skipped_regions && result.is_ok() {
            log_success!(codes::success::REGION_SKIPPED, "Skipped preprocessor-excluded region",
                "start_line" => start.line,
                "end_line" => self.line
            );
        }
        result
    }

    fn scan_excluded(&mut self, scan: &mut bool) -> ParseResult<()> {
        let mut checker = IllegalContentsChecker::new();
        let region_start = self.current_position();

        loop {
            let token = match self.lex_raw() {
                Ok(token) => token,
                Err(
                    ParseError::UnterminatedString { .. } | ParseError::UnterminatedChar { .. },
                ) => {
                    // Apostrophes in excluded prose are not literals
                    self.skip_rest_of_line();
                    continue;
                }
                Err(error) => return Err(error),
            };

            if token.kind == TokenKind::EndOfFile {
                return Err(self.report(ParseError::InvalidDirective {
                    message: "end of file inside a preprocessor-excluded region".to_string(),
                    position: region_start,
                }));
            }

            if token.is_symbol_char('#') && self.is_line_start(token.input_start_pos) {
                let directive = self.read_directive(token);
                self.metrics.directives_seen += 1;
                let verdict = match self.preprocessor.as_mut() {
                    Some(preprocessor) => preprocessor.parse_directive(&directive, false),
                    None => return Ok(()),
                }
                .map_err(|error| self.report(error))?;

                match verdict.region {
                    RegionVerdict::Include => return Ok(()),
                    RegionVerdict::ExcludeAndScanForIllegalContents => {
                        if !*scan {
                            checker.reset();
                        }
                        *scan = true;
                    }
                    RegionVerdict::ExcludeSilently => *scan = false,
                }
                continue;
            }

            if *scan {
                checker.check(&token).map_err(|error| self.report(error))?;
            }
        }
    }

    fn skip_rest_of_line(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }
}

// ============================================================================
// STREAM CONTRACT
// ============================================================================

impl<'src> TokenStream<'src> for BufferLexer<'src> {
    fn peek_token(&mut self) -> ParseResult<Token<'src>> {
        if !self.has_token {
            self.token = self.lex_token()?;
            self.has_token = true;
        }
        Ok(self.token)
    }

    fn consume_token(&mut self) {
        if !self.has_token {
            internal_error("consume_token called without a peeked token");
        }
        self.has_token = false;

        if self.recording {
            self.recorded.push(self.token);
        }
        self.metrics.record_token(&self.token, &self.preferences);

        if self.comments_disabled > 0 {
            self.comments.clear_pending();
        } else {
            self.comments.commit();
        }
    }

    fn get_line(&mut self) -> ParseResult<Token<'src>> {
        self.unget_current();
        let unget = self.current_position();

        while matches!(self.byte_at(self.pos), b' ' | b'\t') {
            self.pos += 1;
        }
        let start = self.current_position();
        let end = self.bytes[self.pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.bytes.len(), |i| self.pos + i);

        let value = self.source[self.pos..end].trim_end();
        let token = Token::new(TokenKind::Line, value, start, unget);

        if end < self.bytes.len() {
            self.pos = end + 1;
            self.line += 1;
            self.comments.on_newline();
        } else {
            self.pos = end;
        }
        Ok(token)
    }

    fn get_raw_string(
        &mut self,
        terminator: char,
        options: RawStringOptions,
    ) -> ParseResult<&'src str> {
        self.unget_current();
        self.skip_whitespace_and_comments()?;

        let start = self.current_position();
        let mut end = self.pos;
        let mut in_quotes = false;
        let mut at_terminator = false;

        while let Some(c) = self.source[end..].chars().next() {
            if c == '\n' {
                break;
            }
            if c == '\\' {
                end += 1;
                end += self.source[end..].chars().next().map_or(0, char::len_utf8);
            } else if c == '"' && options.respect_quotes {
                in_quotes = !in_quotes;
                end += 1;
            } else if c == terminator && !in_quotes {
                at_terminator = true;
                break;
            } else {
                end += c.len_utf8();
            }

            if end - start.offset > MAX_STRING_LENGTH {
                return Err(self.report(ParseError::StringTooLong {
                    max: MAX_STRING_LENGTH,
                    position: start,
                }));
            }
        }

        if in_quotes {
            return Err(self.report(ParseError::UnterminatedQuote { position: start }));
        }

        let text = self.source[start.offset..end].trim_end();
        self.pos = if at_terminator && !options.dont_consume_terminator {
            end + terminator.len_utf8()
        } else {
            end
        };
        Ok(text)
    }

    fn comments(&self) -> &[Comment<'src>] {
        self.comments.committed()
    }

    fn clear_comments(&mut self) {
        self.comments.clear();
    }

    fn disable_comments(&mut self) {
        self.comments_disabled += 1;
    }

    fn enable_comments(&mut self) {
        if self.comments_disabled == 0 {
            internal_error("enable_comments called without matching disable_comments");
        }
        self.comments_disabled -= 1;
    }

    fn commit_pending_comments(&mut self) {
        self.comments.commit();
    }

    fn save_state(&mut self) {
        if self.saved.len() >= MAX_SAVED_STATES {
            internal_error("lexer save state stack overflow");
        }
        self.saved.push(SavedState {
            pos: self.pos,
            line: self.line,
            has_token: self.has_token,
            token: self.token,
            comments: self.comments.clone(),
            recorded_len: self.recorded.len(),
        });
        if let Some(preprocessor) = self.preprocessor.as_mut() {
            preprocessor.save_state();
        }
    }

    fn restore_state(&mut self) {
        let Some(state) = self.saved.pop() else {
            internal_error("restore_state called without a saved state");
        };
        self.pos = state.pos;
        self.line = state.line;
        self.has_token = state.has_token;
        self.token = state.token;
        self.comments = state.comments;
        self.recorded.truncate(state.recorded_len);
        if let Some(preprocessor) = self.preprocessor.as_mut() {
            preprocessor.restore_state();
        }
    }

    fn abandon_state(&mut self) {
        if self.saved.pop().is_none() {
            internal_error("abandon_state called without a saved state");
        }
        if let Some(preprocessor) = self.preprocessor.as_mut() {
            preprocessor.abandon_state();
        }
    }

    fn enable_recording(&mut self) {
        if self.recording {
            internal_error("recording is already enabled");
        }
        self.recording = true;
    }

    fn record_token(&mut self, token: Token<'src>) {
        if !self.recording {
            internal_error("record_token called while recording is disabled");
        }
        self.recorded.push(token);
    }

    fn disable_recording(&mut self) {
        self.recording = false;
        self.recorded.clear();
    }

    fn recorded_tokens(&self) -> &[Token<'src>] {
        &self.recorded
    }

    fn position(&self) -> Position {
        if self.has_token {
            self.token.position()
        } else {
            self.current_position()
        }
    }
}
