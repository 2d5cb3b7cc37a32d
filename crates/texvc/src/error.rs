use std::fmt;
use std::ops::Range;

use strum_macros::IntoStaticStr;

use crate::environments::Env;

/// Represents an error that occurred while converting a formula.
///
/// The range is the byte span of the offending part of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexError(pub Range<usize>, pub(crate) TexErrKind);

/// The broad class of a [`TexError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The input could not be split into tokens, e.g. because of an unclosed brace.
    Lex,
    /// The tokens do not form a valid formula, e.g. a missing argument.
    Syntax,
    /// A macro is syntactically fine but has no rendering.
    UnknownMacro,
}

/// Lexical errors, as carried by [`Token::Error`](crate::token::Token::Error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrKind<'source> {
    UnmatchedClose,
    UnclosedGroup,
    UnclosedEnvironment(&'source str),
    UnclosedEnvName,
    UnclosedText,
    DisallowedChar(char),
    IncompleteCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TexErrKind {
    UnmatchedClose,
    UnclosedGroup,
    UnclosedEnvironment(Box<str>),
    UnclosedEnvName,
    UnclosedText,
    DisallowedChar(char),
    IncompleteCommand,
    ExpectedArgumentGotClose,
    ExpectedArgumentGotEoi,
    ExpectedBracedArgument(Box<str>),
    ExpectedDelimiter(Box<str>),
    BoundFollowedByBound,
    MhchemRequired,
    UnknownEnvironment(Box<str>),
    MismatchedEnvironment { expected: Env, got: Env },
    CannotBeUsedHere(Misplaced),
    HardLimitExceeded,
    UnknownMacro(Box<str>),
    InvalidArgument(Box<str>),
}

/// Tokens that are only valid inside a particular construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub(crate) enum Misplaced {
    #[strum(serialize = "&")]
    Ampersand,
    #[strum(serialize = r"\\")]
    NewLine,
    #[strum(serialize = r"\end{...}")]
    End,
    #[strum(serialize = "}")]
    GroupClose,
}

impl Misplaced {
    fn correct_place(self) -> &'static str {
        match self {
            Misplaced::Ampersand | Misplaced::NewLine | Misplaced::End => {
                "inside a matrix-like environment"
            }
            Misplaced::GroupClose => "in the group where the matching \"{\" was opened",
        }
    }
}

impl From<LexErrKind<'_>> for TexErrKind {
    fn from(kind: LexErrKind<'_>) -> Self {
        match kind {
            LexErrKind::UnmatchedClose => TexErrKind::UnmatchedClose,
            LexErrKind::UnclosedGroup => TexErrKind::UnclosedGroup,
            LexErrKind::UnclosedEnvironment(name) => TexErrKind::UnclosedEnvironment(name.into()),
            LexErrKind::UnclosedEnvName => TexErrKind::UnclosedEnvName,
            LexErrKind::UnclosedText => TexErrKind::UnclosedText,
            LexErrKind::DisallowedChar(ch) => TexErrKind::DisallowedChar(ch),
            LexErrKind::IncompleteCommand => TexErrKind::IncompleteCommand,
        }
    }
}

impl TexErrKind {
    /// Returns the error message as a string.
    pub fn string(&self) -> String {
        match self {
            TexErrKind::UnmatchedClose => "Unmatched closing token: \"}\".".to_string(),
            TexErrKind::UnclosedGroup => "Expected token \"}\", but not found.".to_string(),
            TexErrKind::UnclosedEnvironment(name) => {
                "Expected \"\\end{".to_string() + name + "}\", but reached end of input."
            }
            TexErrKind::UnclosedEnvName => "Unterminated environment name.".to_string(),
            TexErrKind::UnclosedText => "Unterminated text argument.".to_string(),
            TexErrKind::DisallowedChar(got) => {
                let mut text = "Disallowed character: '".to_string();
                text.extend(got.escape_default());
                text += "'.";
                text
            }
            TexErrKind::IncompleteCommand => "Backslash at end of input.".to_string(),
            TexErrKind::ExpectedArgumentGotClose => {
                r"Expected argument but got closing token (`}`, `&`, `\\`, `\end`).".to_string()
            }
            TexErrKind::ExpectedArgumentGotEoi => {
                "Expected argument but reached end of input.".to_string()
            }
            TexErrKind::ExpectedBracedArgument(name) => {
                "Expected a braced argument after \"".to_string() + name + "\"."
            }
            TexErrKind::ExpectedDelimiter(name) => {
                "There must be a delimiter after \"".to_string() + name + "\", but not found."
            }
            TexErrKind::BoundFollowedByBound => {
                "'^' or '_' directly followed by '^' or '_'.".to_string()
            }
            TexErrKind::MhchemRequired => {
                "Chemistry markup (\\ce) is not enabled.".to_string()
            }
            TexErrKind::UnknownEnvironment(name) => {
                "Unknown environment \"".to_string() + name + "\"."
            }
            TexErrKind::MismatchedEnvironment { expected, got } => {
                "Expected \"\\end{".to_string()
                    + expected.as_str()
                    + "}\", but got \"\\end{"
                    + got.as_str()
                    + "}\"."
            }
            TexErrKind::CannotBeUsedHere(got) => {
                "Got \"".to_string()
                    + <&str>::from(*got)
                    + "\", which may only appear "
                    + got.correct_place()
                    + "."
            }
            TexErrKind::HardLimitExceeded => {
                "Hard limit exceeded. Please simplify your formula.".to_string()
            }
            TexErrKind::UnknownMacro(name) => "Unknown function \"".to_string() + name + "\".",
            TexErrKind::InvalidArgument(name) => {
                "Invalid argument for \"".to_string() + name + "\"."
            }
        }
    }
}

impl TexError {
    pub fn category(&self) -> ErrorCategory {
        match &self.1 {
            TexErrKind::UnmatchedClose
            | TexErrKind::UnclosedGroup
            | TexErrKind::UnclosedEnvironment(_)
            | TexErrKind::UnclosedEnvName
            | TexErrKind::UnclosedText
            | TexErrKind::DisallowedChar(_)
            | TexErrKind::IncompleteCommand => ErrorCategory::Lex,
            TexErrKind::UnknownMacro(_) => ErrorCategory::UnknownMacro,
            _ => ErrorCategory::Syntax,
        }
    }

    /// The macro the error is about, if any, including the leading backslash.
    pub fn macro_name(&self) -> Option<&str> {
        match &self.1 {
            TexErrKind::ExpectedBracedArgument(name)
            | TexErrKind::ExpectedDelimiter(name)
            | TexErrKind::UnknownMacro(name)
            | TexErrKind::InvalidArgument(name) => Some(&**name),
            TexErrKind::MhchemRequired => Some(r"\ce"),
            _ => None,
        }
    }

    #[inline]
    pub fn span(&self) -> Range<usize> {
        self.0.clone()
    }

    pub fn error_message(&self) -> String {
        self.1.string()
    }
}

#[cfg(feature = "ariadne")]
impl TexError {
    /// Convert this error into an [`ariadne::Report`] for pretty-printing.
    pub fn to_report<'name>(
        &self,
        source_name: &'name str,
        with_color: bool,
    ) -> ariadne::Report<'static, (&'name str, Range<usize>)> {
        use ariadne::{Label, Report, ReportKind};

        let label_msg = match &self.1 {
            TexErrKind::UnmatchedClose => "unmatched \"}\"".into(),
            TexErrKind::UnclosedGroup => "expected \"}\" to close this group".into(),
            TexErrKind::UnclosedEnvironment(name) => format!("\"{name}\" is opened here"),
            TexErrKind::UnclosedEnvName => "unterminated name".into(),
            TexErrKind::UnclosedText => "unterminated text".into(),
            TexErrKind::DisallowedChar(_) => "disallowed character".into(),
            TexErrKind::IncompleteCommand => "incomplete command".into(),
            TexErrKind::ExpectedArgumentGotClose | TexErrKind::ExpectedArgumentGotEoi => {
                "expected an argument here".into()
            }
            TexErrKind::ExpectedBracedArgument(_) => "expected \"{\" here".into(),
            TexErrKind::ExpectedDelimiter(name) => {
                format!("expected a delimiter after \"{name}\"")
            }
            TexErrKind::BoundFollowedByBound => "unexpected bound".into(),
            TexErrKind::MhchemRequired => "chemistry markup is disabled".into(),
            TexErrKind::UnknownEnvironment(_) => "unknown environment".into(),
            TexErrKind::MismatchedEnvironment { expected, .. } => {
                format!("expected \"\\end{{{}}}\" here", expected.as_str())
            }
            TexErrKind::CannotBeUsedHere(got) => format!("may only appear {}", got.correct_place()),
            TexErrKind::HardLimitExceeded => "limit exceeded".into(),
            TexErrKind::UnknownMacro(_) => "unknown function".into(),
            TexErrKind::InvalidArgument(_) => "invalid argument".into(),
        };

        let mut config = ariadne::Config::default().with_index_type(ariadne::IndexType::Byte);
        if !with_color {
            config = config.with_color(false);
        }
        Report::build(ReportKind::Error, (source_name, self.0.start..self.0.start))
            .with_config(config)
            .with_message(self.1.string())
            .with_label(Label::new((source_name, self.0.clone())).with_message(label_msg))
            .finish()
    }
}

impl fmt::Display for TexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0.start, self.1.string())
    }
}

impl std::error::Error for TexError {}

/// Failures while rendering a parsed formula to MathML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No rendering is registered for this macro.
    UnknownMacro(Box<str>),
    /// The macro exists, but cannot render the argument it was given.
    InvalidArgument(Box<str>),
}

impl RenderError {
    #[inline]
    pub fn macro_name(&self) -> &str {
        match self {
            RenderError::UnknownMacro(name) | RenderError::InvalidArgument(name) => name,
        }
    }

    /// Attaches the location of the first use of the macro in `input`.
    pub(crate) fn into_tex_error(self, input: &str) -> TexError {
        let span = find_macro(input, self.macro_name()).unwrap_or(0..0);
        match self {
            RenderError::UnknownMacro(name) => TexError(span, TexErrKind::UnknownMacro(name)),
            RenderError::InvalidArgument(name) => {
                TexError(span, TexErrKind::InvalidArgument(name))
            }
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnknownMacro(name) => write!(f, "unknown function \"{name}\""),
            RenderError::InvalidArgument(name) => write!(f, "invalid argument for \"{name}\""),
        }
    }
}

impl std::error::Error for RenderError {}

/// Finds the first occurrence of the control word `name` in `input`.
///
/// A control word only matches if it is not followed by another letter, so `\in` does not match
/// inside `\infty`.
fn find_macro(input: &str, name: &str) -> Option<Range<usize>> {
    let is_word = name.ends_with(|ch: char| ch.is_ascii_alphabetic());
    let mut offset = 0;
    while let Some(pos) = input.get(offset..)?.find(name) {
        let start = offset + pos;
        let end = start + name.len();
        let boundary = !is_word
            || !input
                .get(end..)
                .is_some_and(|rest| rest.starts_with(|ch: char| ch.is_ascii_alphabetic()));
        if boundary {
            return Some(start..end);
        }
        offset = end;
    }
    None
}
