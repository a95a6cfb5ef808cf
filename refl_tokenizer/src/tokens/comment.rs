//! Comment views collected by the lexer
use crate::utils::{Position, Span};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    /// `/* ... */`
    Block,
    /// `// ...` up to end of line
    Line,
}

/// One comment run, borrowed from the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Comment<'src> {
    pub kind: CommentKind,
    /// Full text including the delimiters
    pub text: &'src str,
    pub position: Position,
}

impl<'src> Comment<'src> {
    pub fn new(kind: CommentKind, text: &'src str, position: Position) -> Self {
        Self {
            kind,
            text,
            position,
        }
    }

    pub fn is_block(&self) -> bool {
        self.kind == CommentKind::Block
    }

    pub fn is_line(&self) -> bool {
        self.kind == CommentKind::Line
    }

    /// Comment text without `//`, `/*` or `*/`
    pub fn body(&self) -> &'src str {
        match self.kind {
            CommentKind::Line => self.text.strip_prefix("//").unwrap_or(self.text),
            CommentKind::Block => {
                let text = self.text.strip_prefix("/*").unwrap_or(self.text);
                text.strip_suffix("*/").unwrap_or(text)
            }
        }
    }

    pub fn span(&self) -> Span {
        Span::covering(self.position, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_strips_delimiters() {
        let block = Comment::new(CommentKind::Block, "/* doc */", Position::start());
        assert_eq!(block.body(), " doc ");
        assert!(block.is_block());

        let line = Comment::new(CommentKind::Line, "// note", Position::new(10, 2));
        assert_eq!(line.body(), " note");
        assert_eq!(line.span().end.offset, 17);
    }
}
