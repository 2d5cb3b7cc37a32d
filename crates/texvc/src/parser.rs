use std::mem;

use crate::commands::{Shape, get_shape};
use crate::environments::Env;
use crate::error::{Misplaced, TexErrKind, TexError};
use crate::lexer::Lexer;
use crate::node::{Literal, Matrix, TexArray, TexNode};
use crate::token::{Span, TokSpan, Token};

/// Maximum nesting depth of groups, macros and environments, and maximum length of a chain of
/// scripts.
const HARD_LIMIT: usize = 128;

type ParseResult<T> = Result<T, Box<TexError>>;

#[inline]
fn error(span: Span, kind: TexErrKind) -> Box<TexError> {
    Box::new(TexError(span.into(), kind))
}

pub(crate) struct Parser<'source> {
    lexer: Lexer<'source>,
    peek: TokSpan<'source>,
    input: &'source str,
    use_mhchem: bool,
    depth: usize,
}

impl<'source> Parser<'source> {
    pub(crate) fn new(lexer: Lexer<'source>, use_mhchem: bool) -> Self {
        let input = lexer.input();
        let mut p = Parser {
            lexer,
            peek: TokSpan::new(Token::Eoi, Span::zero_width(0)),
            input,
            use_mhchem,
            depth: 0,
        };
        // Discard the dummy token and load the first real one.
        p.next_token();
        p
    }

    /// Returns the current token and advances. After the end of input, this keeps returning
    /// `Token::Eoi`.
    fn next_token(&mut self) -> TokSpan<'source> {
        let eoi = Span::zero_width(self.input.len());
        let next = self
            .lexer
            .next()
            .unwrap_or(TokSpan::new(Token::Eoi, eoi));
        mem::replace(&mut self.peek, next)
    }

    /// Parses the whole input into a (non-curly) sequence.
    pub(crate) fn parse(&mut self) -> ParseResult<TexNode> {
        let args = self.parse_sequence()?;
        match self.peek.into_parts() {
            (Token::Eoi, _) => Ok(TexNode::TexArray(TexArray::new(args))),
            (tok, span) => Err(unexpected(tok, span)),
        }
    }

    fn enter(&mut self, span: Span) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > HARD_LIMIT {
            return Err(error(span, TexErrKind::HardLimitExceeded));
        }
        Ok(())
    }

    #[inline]
    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parses nodes until a token that closes something, or the end of input.
    fn parse_sequence(&mut self) -> ParseResult<Vec<TexNode>> {
        let mut nodes = Vec::new();
        while !matches!(
            self.peek.token(),
            Token::Eoi | Token::GroupEnd | Token::NewColumn | Token::NewLine | Token::End(_)
        ) {
            nodes.push(self.parse_postfix()?);
        }
        Ok(nodes)
    }

    /// Parses a primary followed by any number of `^` and `_` scripts.
    fn parse_postfix(&mut self) -> ParseResult<TexNode> {
        let mut node = match self.peek.token() {
            // A script at the start of a sequence has an empty base.
            Token::Circumflex | Token::Underscore => TexNode::TexArray(TexArray::default()),
            _ => self.parse_primary()?,
        };
        let mut chain = 0usize;
        loop {
            let (tok, span) = self.peek.into_parts();
            let is_sup = match tok {
                Token::Circumflex => true,
                Token::Underscore => false,
                _ => break,
            };
            chain += 1;
            if chain > HARD_LIMIT {
                return Err(error(span, TexErrKind::HardLimitExceeded));
            }
            self.next_token();
            let script = Box::new(self.parse_script()?);
            let base = Box::new(node);
            node = if is_sup {
                TexNode::UQ { base, up: script }
            } else {
                TexNode::DQ { base, down: script }
            };
        }
        Ok(node)
    }

    /// Parses the argument of a script or of a macro whose argument need not be braced.
    fn parse_script(&mut self) -> ParseResult<TexNode> {
        let (tok, span) = self.peek.into_parts();
        match tok {
            Token::Circumflex | Token::Underscore => {
                Err(error(span, TexErrKind::BoundFollowedByBound))
            }
            Token::Eoi => Err(error(span, TexErrKind::ExpectedArgumentGotEoi)),
            Token::GroupEnd | Token::End(_) | Token::NewColumn | Token::NewLine => {
                Err(error(span, TexErrKind::ExpectedArgumentGotClose))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ParseResult<TexNode> {
        let (tok, span) = self.next_token().into_parts();
        match tok {
            Token::Letter(ch) | Token::Symbol(ch) => Ok(TexNode::Literal(Literal::from(ch))),
            Token::Digit(_) => Ok(self.parse_number(span)),
            Token::GroupBegin => self.parse_group(span),
            Token::Command(name) => self.parse_macro(name, span),
            Token::Begin(name) => self.parse_environment(name, span),
            tok => Err(unexpected(tok, span)),
        }
    }

    /// Merges a run of adjacent digits and decimal points into one literal.
    fn parse_number(&mut self, first: Span) -> TexNode {
        let mut end = first.end();
        while let (Token::Digit(_) | Token::Symbol('.'), span) = self.peek.into_parts()
            && span.start() == end
        {
            end = span.end();
            self.next_token();
        }
        TexNode::literal(self.input.get(first.start()..end).unwrap_or_default())
    }

    /// Parses the rest of a group whose `{` has been consumed.
    fn parse_group(&mut self, open: Span) -> ParseResult<TexNode> {
        self.enter(open)?;
        let args = self.parse_sequence()?;
        let (tok, span) = self.next_token().into_parts();
        if !matches!(tok, Token::GroupEnd) {
            return Err(unexpected(tok, span));
        }
        self.leave();
        Ok(TexNode::TexArray(TexArray::curly(args)))
    }

    /// Parses a `{...}` group, which must come next.
    fn parse_braced(&mut self, name: &str) -> ParseResult<TexNode> {
        let (tok, span) = self.peek.into_parts();
        match tok {
            Token::GroupBegin => {
                self.next_token();
                self.parse_group(span)
            }
            Token::Error(_) => Err(unexpected(tok, span)),
            _ => Err(error(span, TexErrKind::ExpectedBracedArgument(name.into()))),
        }
    }

    fn parse_macro(&mut self, name: &'source str, span: Span) -> ParseResult<TexNode> {
        let Some(shape) = get_shape(name) else {
            return Ok(TexNode::literal(name));
        };
        self.enter(span)?;
        let node = match shape {
            Shape::Fun1 => TexNode::Fun1 {
                name: name.into(),
                arg: Box::new(self.parse_braced(name)?),
            },
            Shape::Fun1nb => TexNode::Fun1nb {
                name: name.into(),
                arg: Box::new(self.parse_script()?),
            },
            Shape::Fun2 => {
                let first = Box::new(self.parse_braced(name)?);
                let second = Box::new(self.parse_braced(name)?);
                TexNode::Fun2 {
                    name: name.into(),
                    first,
                    second,
                }
            }
            Shape::TextBox => {
                let (tok, text_span) = self.next_token().into_parts();
                let Token::Text(text) = tok else {
                    return Err(match tok {
                        Token::Error(_) => unexpected(tok, text_span),
                        _ => error(text_span, TexErrKind::ExpectedBracedArgument(name.into())),
                    });
                };
                let args = if text.is_empty() {
                    Vec::new()
                } else {
                    vec![TexNode::literal(text)]
                };
                TexNode::Fun1 {
                    name: name.into(),
                    arg: Box::new(TexNode::TexArray(TexArray::curly(args))),
                }
            }
            Shape::Chem => {
                if !self.use_mhchem {
                    return Err(error(span, TexErrKind::MhchemRequired));
                }
                TexNode::Fun1 {
                    name: name.into(),
                    arg: Box::new(self.parse_braced(name)?),
                }
            }
            Shape::Delimiter => {
                let (tok, delim_span) = self.next_token().into_parts();
                let delim = match tok {
                    Token::Symbol(ch) => Literal::from(ch),
                    Token::Command(delim) if get_shape(delim).is_none() => Literal::new(delim),
                    Token::Error(_) => return Err(unexpected(tok, delim_span)),
                    _ => {
                        return Err(error(
                            delim_span,
                            TexErrKind::ExpectedDelimiter(name.into()),
                        ));
                    }
                };
                TexNode::Fun1nb {
                    name: name.into(),
                    arg: Box::new(TexNode::Literal(delim)),
                }
            }
        };
        self.leave();
        Ok(node)
    }

    /// Parses the body of an environment whose `\begin{name}` has been consumed.
    fn parse_environment(&mut self, name: &'source str, span: Span) -> ParseResult<TexNode> {
        let Some(env) = Env::from_str(name) else {
            return Err(error(span, TexErrKind::UnknownEnvironment(name.into())));
        };
        self.enter(span)?;
        let mut rows = Vec::new();
        let mut row = Vec::new();
        loop {
            row.push(TexArray::new(self.parse_sequence()?));
            let (tok, tok_span) = self.next_token().into_parts();
            match tok {
                Token::NewColumn => {}
                Token::NewLine => rows.push(mem::take(&mut row)),
                Token::End(end_name) => {
                    let Some(end_env) = Env::from_str(end_name) else {
                        return Err(error(
                            tok_span,
                            TexErrKind::UnknownEnvironment(end_name.into()),
                        ));
                    };
                    if end_env != env {
                        return Err(error(
                            tok_span,
                            TexErrKind::MismatchedEnvironment {
                                expected: env,
                                got: end_env,
                            },
                        ));
                    }
                    // A `\\` right before `\end` does not start another row.
                    let trailing_empty = matches!(row.as_slice(), [cell] if cell.is_empty());
                    if !trailing_empty || rows.is_empty() {
                        rows.push(row);
                    }
                    break;
                }
                tok => return Err(unexpected(tok, tok_span)),
            }
        }
        self.leave();
        Ok(TexNode::Matrix(Matrix::new(env, rows)))
    }
}

/// The error for a token that cannot appear where it was found.
fn unexpected(tok: Token<'_>, span: Span) -> Box<TexError> {
    let kind = match tok {
        Token::Error(kind) => kind.into(),
        Token::NewColumn => TexErrKind::CannotBeUsedHere(Misplaced::Ampersand),
        Token::NewLine => TexErrKind::CannotBeUsedHere(Misplaced::NewLine),
        Token::End(_) => TexErrKind::CannotBeUsedHere(Misplaced::End),
        Token::GroupEnd => TexErrKind::CannotBeUsedHere(Misplaced::GroupClose),
        Token::Circumflex | Token::Underscore => TexErrKind::BoundFollowedByBound,
        Token::Eoi => TexErrKind::ExpectedArgumentGotEoi,
        _ => TexErrKind::ExpectedArgumentGotClose,
    };
    error(span, kind)
}
