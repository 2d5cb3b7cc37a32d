use std::ops::Range;

use crate::error::LexErrKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'source> {
    /// End of input.
    Eoi,
    /// The beginning of an environment, e.g. `\begin{matrix}`. Holds the environment name.
    Begin(&'source str),
    /// The end of an environment, e.g. `\end{matrix}`. Holds the environment name.
    End(&'source str),
    /// The character `{`.
    GroupBegin,
    /// The character `}`.
    GroupEnd,
    /// The character `^` for superscripts.
    Circumflex,
    /// The character `_` for subscripts.
    Underscore,
    /// A new column in an environment, `&`.
    NewColumn,
    /// A new row in an environment, `\\`.
    NewLine,
    /// A control word or control symbol, including the leading backslash, e.g. `\alpha` or `\,`.
    Command(&'source str),
    /// A single ASCII digit.
    Digit(char),
    /// A letter, e.g. `a`, `Z` or `é`.
    Letter(char),
    /// Any other single character, e.g. `+`, `(` or `'`.
    Symbol(char),
    /// The raw braced argument of a text-box command like `\text`, without the braces.
    Text(&'source str),
    /// Malformed input. The parser turns this into an error.
    Error(LexErrKind<'source>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    #[inline]
    pub const fn zero_width(at: usize) -> Self {
        Span { start: at, end: at }
    }

    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Returns a new `Span` with the same start position as `self`, but with the end position set
    /// to `self.start + length`.
    #[inline]
    pub const fn with_length(self, length: usize) -> Self {
        Span {
            start: self.start,
            end: self.start + length,
        }
    }
}

impl From<Span> for Range<usize> {
    #[inline]
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// A token together with its span in the input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokSpan<'source>(Token<'source>, Span);

impl<'source> TokSpan<'source> {
    #[inline]
    pub const fn new(token: Token<'source>, span: Span) -> Self {
        TokSpan(token, span)
    }

    #[inline]
    pub fn token(&self) -> &Token<'source> {
        &self.0
    }

    #[inline]
    pub fn into_token(self) -> Token<'source> {
        self.0
    }

    #[inline]
    pub fn into_parts(self) -> (Token<'source>, Span) {
        (self.0, self.1)
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.1
    }
}
