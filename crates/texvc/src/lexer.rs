use std::iter::FusedIterator;
use std::mem;
use std::str::CharIndices;

use crate::commands::{Shape, get_shape};
use crate::error::LexErrKind;
use crate::token::{Span, TokSpan, Token};

/// Splits `input` into tokens.
///
/// The returned iterator is lazy and finite. It ends after the last token, or after the first
/// [`Token::Error`]; [`Token::Eoi`] itself is never yielded.
#[inline]
pub fn tokenize(input: &str) -> Lexer<'_> {
    Lexer::new(input)
}

/// Lexer
pub struct Lexer<'source> {
    input: CharIndices<'source>,
    peek: (usize, Option<char>),
    input_string: &'source str,
    input_length: usize,
    /// Offsets of the `{` of all open groups.
    open_groups: Vec<usize>,
    /// Names and spans of all open environments.
    open_environments: Vec<(&'source str, Span)>,
    /// Set after a text-box command like `\text`; a following `{...}` is read verbatim.
    text_box_next: bool,
    done: bool,
}

impl<'source> Lexer<'source> {
    pub fn new(input: &'source str) -> Self {
        let mut lexer = Lexer {
            input: input.char_indices(),
            peek: (0, None),
            input_string: input,
            input_length: input.len(),
            open_groups: Vec::new(),
            open_environments: Vec::new(),
            text_box_next: false,
            done: false,
        };
        lexer.read_char(); // Initialize `peek`.
        lexer
    }

    #[inline]
    pub fn input(&self) -> &'source str {
        self.input_string
    }

    #[inline]
    pub fn input_length(&self) -> usize {
        self.input_length
    }

    /// One character progresses.
    fn read_char(&mut self) -> (usize, Option<char>) {
        mem::replace(
            &mut self.peek,
            self.input
                .next()
                .map(|(idx, ch)| (idx, Some(ch)))
                .unwrap_or((self.input_length, None)),
        )
    }

    /// Skip whitespace and `%` comments.
    fn skip_whitespace(&mut self) {
        loop {
            match self.peek.1 {
                Some(ch) if ch.is_whitespace() => {
                    self.read_char();
                }
                Some('%') => {
                    while !matches!(self.peek.1, Some('\n') | None) {
                        self.read_char();
                    }
                }
                _ => break,
            }
        }
    }

    /// Reads the token at the current position.
    ///
    /// At the end of the input, this returns [`Token::Eoi`] or, if a group or environment is
    /// still open, the corresponding error.
    pub fn next_token(&mut self) -> TokSpan<'source> {
        self.skip_whitespace();
        if mem::take(&mut self.text_box_next) && self.peek.1 == Some('{') {
            return self.read_text_box();
        }

        let (loc, ch) = self.read_char();
        let Some(ch) = ch else {
            return self.end_of_input(loc);
        };
        let span = Span::new(loc, loc + ch.len_utf8());
        let tok = match ch {
            '\0' => Token::Error(LexErrKind::DisallowedChar(ch)),
            '{' => {
                self.open_groups.push(loc);
                Token::GroupBegin
            }
            '}' => {
                if self.open_groups.pop().is_some() {
                    Token::GroupEnd
                } else {
                    Token::Error(LexErrKind::UnmatchedClose)
                }
            }
            '^' => Token::Circumflex,
            '_' => Token::Underscore,
            '&' => Token::NewColumn,
            '\\' => return self.read_control_sequence(loc),
            c if c.is_ascii_digit() => Token::Digit(c),
            c if c.is_alphabetic() => Token::Letter(c),
            c => Token::Symbol(c),
        };
        TokSpan::new(tok, span)
    }

    fn end_of_input(&self, loc: usize) -> TokSpan<'source> {
        let group = self.open_groups.last().copied();
        let env = self.open_environments.last().copied();
        // Report whichever construct was opened last.
        match (group, env) {
            (Some(start), env) if env.is_none_or(|(_, env_span)| start > env_span.start()) => {
                TokSpan::new(
                    Token::Error(LexErrKind::UnclosedGroup),
                    Span::new(start, start + 1),
                )
            }
            (_, Some((name, env_span))) => TokSpan::new(
                Token::Error(LexErrKind::UnclosedEnvironment(name)),
                env_span,
            ),
            _ => TokSpan::new(Token::Eoi, Span::zero_width(loc)),
        }
    }

    /// Read a control word, a control symbol, `\\`, or an environment marker.
    ///
    /// `start` is the position of the backslash, which has already been consumed.
    fn read_control_sequence(&mut self, start: usize) -> TokSpan<'source> {
        match self.peek.1 {
            None => {
                return TokSpan::new(
                    Token::Error(LexErrKind::IncompleteCommand),
                    Span::new(start, start + 1),
                );
            }
            Some('\0') => {
                return TokSpan::new(
                    Token::Error(LexErrKind::DisallowedChar('\0')),
                    Span::new(start + 1, start + 2),
                );
            }
            Some('\\') => {
                self.read_char();
                return TokSpan::new(Token::NewLine, Span::new(start, start + 2));
            }
            Some(_) => {}
        }

        // Read in all ASCII alphabetic characters.
        while self.peek.1.is_some_and(|ch| ch.is_ascii_alphabetic()) {
            self.read_char();
        }
        if self.peek.0 == start + 1 {
            // Always read at least one character.
            self.read_char();
        } else if self.peek.1 == Some('*') {
            // Starred forms like `\operatorname*` are only names if the grammar knows them.
            let starred = self.input_string.get(start..=self.peek.0).unwrap_or_default();
            if get_shape(starred).is_some() {
                self.read_char();
            }
        }
        let end = self.peek.0;
        let span = Span::new(start, end);
        let name = self.input_string.get(start..end).unwrap_or_default();

        match name {
            r"\begin" => self.read_environment(true, span),
            r"\end" => self.read_environment(false, span),
            _ => {
                if get_shape(name) == Some(Shape::TextBox) {
                    self.text_box_next = true;
                }
                TokSpan::new(Token::Command(name), span)
            }
        }
    }

    fn read_environment(&mut self, begin: bool, cmd_span: Span) -> TokSpan<'source> {
        self.skip_whitespace();
        let Some((name, end)) = self.read_env_name() else {
            return TokSpan::new(
                Token::Error(LexErrKind::UnclosedEnvName),
                Span::new(cmd_span.start(), self.peek.0),
            );
        };
        let span = Span::new(cmd_span.start(), end);
        if begin {
            self.open_environments.push((name, span));
            TokSpan::new(Token::Begin(name), span)
        } else {
            self.open_environments.pop();
            TokSpan::new(Token::End(name), span)
        }
    }

    /// Read a braced environment name.
    ///
    /// On success, returns the name and the index of the character after the `}`.
    fn read_env_name(&mut self) -> Option<(&'source str, usize)> {
        if self.peek.1 != Some('{') {
            return None;
        }
        self.read_char();
        let start = self.peek.0;
        while self
            .peek
            .1
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '*')
        {
            self.read_char();
        }
        let (loc, closing) = self.read_char();
        if closing == Some('}') {
            Some((self.input_string.get(start..loc)?, loc + 1))
        } else {
            None
        }
    }

    /// Read the braced argument of a text-box command verbatim.
    ///
    /// Nested braces are kept as they are; a backslash escapes the next character.
    fn read_text_box(&mut self) -> TokSpan<'source> {
        let (open, _) = self.read_char(); // Discard the `{`.
        let start = self.peek.0;
        let mut nesting = 0usize;
        loop {
            let (loc, ch) = self.read_char();
            match ch {
                None => {
                    return TokSpan::new(
                        Token::Error(LexErrKind::UnclosedText),
                        Span::new(open, self.input_length),
                    );
                }
                Some('\0') => {
                    return TokSpan::new(
                        Token::Error(LexErrKind::DisallowedChar('\0')),
                        Span::new(loc, loc + 1),
                    );
                }
                Some('{') => nesting += 1,
                Some('}') => {
                    if nesting == 0 {
                        let text = self.input_string.get(start..loc).unwrap_or_default();
                        return TokSpan::new(Token::Text(text), Span::new(open, loc + 1));
                    }
                    nesting -= 1;
                }
                Some('\\') => {
                    self.read_char();
                }
                Some(_) => {}
            }
        }
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = TokSpan<'source>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let tokspan = self.next_token();
        match tokspan.token() {
            Token::Eoi => {
                self.done = true;
                None
            }
            Token::Error(_) => {
                self.done = true;
                Some(tokspan)
            }
            _ => Some(tokspan),
        }
    }
}

impl FusedIterator for Lexer<'_> {}

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        tokenize(input).map(TokSpan::into_token).collect()
    }

    fn spans(input: &str) -> Vec<Range<usize>> {
        tokenize(input).map(|tokspan| tokspan.span().into()).collect()
    }

    #[test]
    fn simple_expression() {
        assert_eq!(
            tokens("x^2 + y_{ij}"),
            [
                Token::Letter('x'),
                Token::Circumflex,
                Token::Digit('2'),
                Token::Symbol('+'),
                Token::Letter('y'),
                Token::Underscore,
                Token::GroupBegin,
                Token::Letter('i'),
                Token::Letter('j'),
                Token::GroupEnd,
            ]
        );
        assert_eq!(spans("x^2 + y"), [0..1, 1..2, 2..3, 4..5, 6..7]);
    }

    #[test]
    fn commands() {
        assert_eq!(
            tokens(r"\alpha\beta \, \\ a"),
            [
                Token::Command(r"\alpha"),
                Token::Command(r"\beta"),
                Token::Command(r"\,"),
                Token::NewLine,
                Token::Letter('a'),
            ]
        );
        assert_eq!(tokens(r"\ x"), [Token::Command(r"\ "), Token::Letter('x')]);
        assert_eq!(spans(r"\alpha2"), [0..6, 6..7]);
        assert_eq!(
            tokens(r"\operatorname*\alpha*"),
            [
                Token::Command(r"\operatorname*"),
                Token::Command(r"\alpha"),
                Token::Symbol('*'),
            ]
        );
    }

    #[test]
    fn comment() {
        assert_eq!(
            tokens("ab%hello\ncd"),
            [
                Token::Letter('a'),
                Token::Letter('b'),
                Token::Letter('c'),
                Token::Letter('d'),
            ]
        );
        assert_eq!(tokens(r"\%"), [Token::Command(r"\%")]);
    }

    #[test]
    fn environments() {
        assert_eq!(
            tokens(r"\begin{matrix} a & b \\ c \end {matrix}"),
            [
                Token::Begin("matrix"),
                Token::Letter('a'),
                Token::NewColumn,
                Token::Letter('b'),
                Token::NewLine,
                Token::Letter('c'),
                Token::End("matrix"),
            ]
        );
        assert_eq!(spans(r"\begin{cases}\end{cases}"), [0..13, 13..24]);
    }

    #[test]
    fn text_box_is_raw() {
        assert_eq!(
            tokens(r"\text{ if $x$ {y} \} }+"),
            [
                Token::Command(r"\text"),
                Token::Text(r" if $x$ {y} \} "),
                Token::Symbol('+'),
            ]
        );
        assert_eq!(spans(r"\mbox {ab}"), [0..5, 6..10]);
        // Without braces, the argument is lexed normally.
        assert_eq!(
            tokens(r"\text x"),
            [Token::Command(r"\text"), Token::Letter('x')]
        );
    }

    #[test]
    fn errors() {
        let problems = [
            ("x + y}", LexErrKind::UnmatchedClose, 5..6),
            ("{x + {y}", LexErrKind::UnclosedGroup, 0..1),
            (
                r"\begin{matrix} x",
                LexErrKind::UnclosedEnvironment("matrix"),
                0..14,
            ),
            (
                r"\begin{matrix} {x",
                LexErrKind::UnclosedGroup,
                15..16,
            ),
            (r"\begin{matrix", LexErrKind::UnclosedEnvName, 0..13),
            (r"\begin x", LexErrKind::UnclosedEnvName, 0..7),
            (r"\text{abc", LexErrKind::UnclosedText, 5..9),
            ("x + \u{0} + y", LexErrKind::DisallowedChar('\0'), 4..5),
            ("\\text{\u{0}}", LexErrKind::DisallowedChar('\0'), 6..7),
            (r"x\", LexErrKind::IncompleteCommand, 1..2),
        ];
        for (problem, expected, span) in problems {
            let last = tokenize(problem).last();
            let Some(last) = last else {
                panic!("no tokens for {problem:?}");
            };
            assert_eq!(*last.token(), Token::Error(expected), "{problem:?}");
            assert_eq!(Range::from(last.span()), span, "{problem:?}");
        }
    }

    #[test]
    fn stops_after_error() {
        let mut lexer = tokenize("}}x");
        assert_eq!(
            lexer.next().map(TokSpan::into_token),
            Some(Token::Error(LexErrKind::UnmatchedClose))
        );
        assert_eq!(lexer.next(), None);
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn restartable() {
        let input = r"\frac{a}{b}";
        assert_eq!(tokens(input), tokens(input));
        assert!(tokens("").is_empty());
        assert!(tokens("  % only a comment").is_empty());
    }
}
