//! Preprocessor contract consumed by the buffer lexer
//!
//! When the lexer meets a line-initial `#` it reads the directive line and asks
//! the attached [`Preprocessor`] what to do with the region that follows.
//! [`ConditionalPreprocessor`] is a small reference implementation that tracks
//! `#if` nesting against sets of known-true and known-false symbols.

use std::collections::HashSet;

use crate::syntax::{ParseError, ParseResult};
use crate::tokens::Token;
use crate::utils::Position;

/// What the lexer does with the lines following a directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionVerdict {
    Include,
    ExcludeAndScanForIllegalContents,
    ExcludeSilently,
}

impl RegionVerdict {
    pub fn is_included(self) -> bool {
        self == Self::Include
    }

    fn inverted(self) -> Self {
        match self {
            Self::Include => Self::ExcludeSilently,
            Self::ExcludeSilently => Self::Include,
            Self::ExcludeAndScanForIllegalContents => Self::ExcludeAndScanForIllegalContents,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveVerdict {
    pub region: RegionVerdict,
    /// Drop comments collected before the directive
    pub clear_comments: bool,
}

impl DirectiveVerdict {
    pub fn include() -> Self {
        Self {
            region: RegionVerdict::Include,
            clear_comments: false,
        }
    }
}

/// One directive line, e.g. `#if WITH_EDITOR`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Directive<'src> {
    /// The `#` symbol token
    pub hash: Token<'src>,
    /// Directive name (`if`, `endif`, ...); empty for a null directive
    pub name: &'src str,
    /// Rest of the line with comments and surrounding whitespace removed
    pub arguments: &'src str,
}

impl Directive<'_> {
    pub fn position(&self) -> Position {
        self.hash.position()
    }
}

/// Collaborator deciding region inclusion for directives
pub trait Preprocessor {
    /// `is_included` is false while the lexer is skipping an excluded region;
    /// returning an including verdict then ends the skip.
    fn parse_directive(
        &mut self,
        directive: &Directive<'_>,
        is_included: bool,
    ) -> ParseResult<DirectiveVerdict>;

    fn save_state(&mut self);
    fn restore_state(&mut self);
    fn abandon_state(&mut self);
}

// ============================================================================
// REFERENCE CONDITIONAL PREPROCESSOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ConditionalFrame {
    verdict: RegionVerdict,
    /// Some branch of this `#if` chain was included
    branch_taken: bool,
    /// Some condition in this chain could not be decided
    saw_unknown: bool,
}

/// `#if`/`#ifdef`/`#ifndef`/`#elif`/`#else`/`#endif` over fixed symbol sets
#[derive(Debug, Clone)]
pub struct ConditionalPreprocessor {
    known_true: HashSet<String>,
    known_false: HashSet<String>,
    stack: Vec<ConditionalFrame>,
    saved: Vec<Vec<ConditionalFrame>>,
}

impl Default for ConditionalPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionalPreprocessor {
    pub fn new() -> Self {
        let known_true = ["1", "WITH_EDITORONLY_DATA", "WITH_EDITOR"]
            .into_iter()
            .map(String::from)
            .collect();
        let known_false = ["0", "CPP"].into_iter().map(String::from).collect();
        Self {
            known_true,
            known_false,
            stack: Vec::new(),
            saved: Vec::new(),
        }
    }

    /// Treat `symbol` as defined and true
    pub fn with_defined(mut self, symbol: &str) -> Self {
        self.known_false.remove(symbol);
        self.known_true.insert(symbol.to_string());
        self
    }

    /// Treat `symbol` as undefined or false
    pub fn with_undefined(mut self, symbol: &str) -> Self {
        self.known_true.remove(symbol);
        self.known_false.insert(symbol.to_string());
        self
    }

    /// Number of open conditional blocks
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Verdict for the current region: the outermost exclusion wins
    fn effective(&self) -> RegionVerdict {
        self.stack
            .iter()
            .map(|frame| frame.verdict)
            .find(|verdict| !verdict.is_included())
            .unwrap_or(RegionVerdict::Include)
    }

    fn classify_symbol(&self, symbol: &str) -> RegionVerdict {
        if self.known_true.contains(symbol) {
            RegionVerdict::Include
        } else if self.known_false.contains(symbol) {
            RegionVerdict::ExcludeSilently
        } else {
            RegionVerdict::ExcludeAndScanForIllegalContents
        }
    }

    fn classify_condition(&self, condition: &str) -> RegionVerdict {
        let condition = condition.trim();
        if let Some(negated) = condition.strip_prefix('!') {
            return self.classify_condition(negated).inverted();
        }
        if let Some(inner) = condition
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return self.classify_condition(inner);
        }
        if let Some(rest) = condition.strip_prefix("defined") {
            let symbol = rest
                .trim()
                .trim_start_matches('(')
                .trim_end_matches(')')
                .trim();
            return self.classify_symbol(symbol);
        }
        self.classify_symbol(condition)
    }

    fn open(&mut self, verdict: RegionVerdict) {
        self.stack.push(ConditionalFrame {
            verdict,
            branch_taken: verdict.is_included(),
            saw_unknown: verdict == RegionVerdict::ExcludeAndScanForIllegalContents,
        });
    }

    fn top(&mut self, directive: &Directive<'_>) -> ParseResult<&mut ConditionalFrame> {
        let position = directive.position();
        let name = directive.name;
        self.stack.last_mut().ok_or_else(|| ParseError::InvalidDirective {
            message: format!("#{} without matching #if", name),
            position,
        })
    }
}

impl Preprocessor for ConditionalPreprocessor {
    fn parse_directive(
        &mut self,
        directive: &Directive<'_>,
        is_included: bool,
    ) -> ParseResult<DirectiveVerdict> {
        let conditional = |region| DirectiveVerdict {
            region,
            clear_comments: true,
        };

        match directive.name {
            "if" => {
                let verdict = self.classify_condition(directive.arguments);
                self.open(verdict);
            }
            "ifdef" => {
                let verdict = self.classify_symbol(directive.arguments.trim());
                self.open(verdict);
            }
            "ifndef" => {
                let verdict = self.classify_symbol(directive.arguments.trim()).inverted();
                self.open(verdict);
            }
            "elif" => {
                let verdict = self.classify_condition(directive.arguments);
                let frame = self.top(directive)?;
                if frame.branch_taken {
                    frame.verdict = RegionVerdict::ExcludeSilently;
                } else {
                    frame.verdict = verdict;
                    frame.branch_taken = verdict.is_included();
                    frame.saw_unknown |= verdict == RegionVerdict::ExcludeAndScanForIllegalContents;
                }
            }
            "else" => {
                let frame = self.top(directive)?;
                frame.verdict = if frame.branch_taken {
                    RegionVerdict::ExcludeSilently
                } else if frame.saw_unknown {
                    RegionVerdict::ExcludeAndScanForIllegalContents
                } else {
                    RegionVerdict::Include
                };
                frame.branch_taken = true;
            }
            "endif" => {
                self.top(directive)?;
                self.stack.pop();
            }
            "" | "include" | "pragma" | "define" | "undef" | "error" | "warning" | "line" => {
                return Ok(DirectiveVerdict {
                    region: self.effective(),
                    clear_comments: false,
                });
            }
            other => {
                if !is_included {
                    return Ok(conditional(self.effective()));
                }
                return Err(ParseError::InvalidDirective {
                    message: format!("unknown directive '#{}'", other),
                    position: directive.position(),
                });
            }
        }

        Ok(conditional(self.effective()))
    }

    fn save_state(&mut self) {
        self.saved.push(self.stack.clone());
    }

    fn restore_state(&mut self) {
        if let Some(stack) = self.saved.pop() {
            self.stack = stack;
        }
    }

    fn abandon_state(&mut self) {
        self.saved.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    fn directive<'a>(name: &'a str, arguments: &'a str) -> Directive<'a> {
        Directive {
            hash: Token::new(TokenKind::Symbol, "#", Position::start(), Position::start()),
            name,
            arguments,
        }
    }

    #[test]
    fn test_known_symbols() {
        let mut pp = ConditionalPreprocessor::new();

        let verdict = pp
            .parse_directive(&directive("if", "WITH_EDITORONLY_DATA"), true)
            .unwrap();
        assert_eq!(verdict.region, RegionVerdict::Include);
        assert!(verdict.clear_comments);
        pp.parse_directive(&directive("endif", ""), true).unwrap();

        let verdict = pp.parse_directive(&directive("if", "0"), true).unwrap();
        assert_eq!(verdict.region, RegionVerdict::ExcludeSilently);
        let verdict = pp.parse_directive(&directive("endif", ""), false).unwrap();
        assert_eq!(verdict.region, RegionVerdict::Include);

        let verdict = pp.parse_directive(&directive("if", "!CPP"), true).unwrap();
        assert_eq!(verdict.region, RegionVerdict::Include);
    }

    #[test]
    fn test_unknown_condition_requests_scan() {
        let mut pp = ConditionalPreprocessor::new();
        let verdict = pp
            .parse_directive(&directive("if", "PLATFORM_WINDOWS"), true)
            .unwrap();
        assert_eq!(
            verdict.region,
            RegionVerdict::ExcludeAndScanForIllegalContents
        );

        let verdict = pp.parse_directive(&directive("else", ""), false).unwrap();
        assert_eq!(
            verdict.region,
            RegionVerdict::ExcludeAndScanForIllegalContents
        );

        let verdict = pp.parse_directive(&directive("endif", ""), false).unwrap();
        assert_eq!(verdict.region, RegionVerdict::Include);
        assert_eq!(pp.depth(), 0);
    }

    #[test]
    fn test_else_after_taken_branch_is_silent() {
        let mut pp = ConditionalPreprocessor::new();
        pp.parse_directive(&directive("if", "WITH_EDITOR"), true)
            .unwrap();
        let verdict = pp.parse_directive(&directive("else", ""), true).unwrap();
        assert_eq!(verdict.region, RegionVerdict::ExcludeSilently);
    }

    #[test]
    fn test_nested_blocks_keep_outer_exclusion() {
        let mut pp = ConditionalPreprocessor::new();
        pp.parse_directive(&directive("if", "0"), true).unwrap();
        let verdict = pp.parse_directive(&directive("if", "1"), false).unwrap();
        assert_eq!(verdict.region, RegionVerdict::ExcludeSilently);
        let verdict = pp.parse_directive(&directive("endif", ""), false).unwrap();
        assert_eq!(verdict.region, RegionVerdict::ExcludeSilently);
        let verdict = pp.parse_directive(&directive("endif", ""), false).unwrap();
        assert_eq!(verdict.region, RegionVerdict::Include);
    }

    #[test]
    fn test_ifdef_and_custom_symbols() {
        let mut pp = ConditionalPreprocessor::new().with_defined("UE_BUILD_SHIPPING");
        let verdict = pp
            .parse_directive(&directive("ifdef", "UE_BUILD_SHIPPING"), true)
            .unwrap();
        assert!(verdict.region.is_included());
        pp.parse_directive(&directive("endif", ""), true).unwrap();

        let verdict = pp
            .parse_directive(&directive("ifndef", "UE_BUILD_SHIPPING"), true)
            .unwrap();
        assert_eq!(verdict.region, RegionVerdict::ExcludeSilently);
    }

    #[test]
    fn test_unmatched_endif_is_an_error() {
        let mut pp = ConditionalPreprocessor::new();
        let error = pp
            .parse_directive(&directive("endif", ""), true)
            .unwrap_err();
        assert!(matches!(error, ParseError::InvalidDirective { .. }));
    }

    #[test]
    fn test_passthrough_directives() {
        let mut pp = ConditionalPreprocessor::new();
        let verdict = pp
            .parse_directive(&directive("include", "\"Actor.generated.h\""), true)
            .unwrap();
        assert_eq!(verdict, DirectiveVerdict::include());
    }

    #[test]
    fn test_save_and_restore() {
        let mut pp = ConditionalPreprocessor::new();
        pp.save_state();
        pp.parse_directive(&directive("if", "1"), true).unwrap();
        assert_eq!(pp.depth(), 1);
        pp.restore_state();
        assert_eq!(pp.depth(), 0);
    }
}
