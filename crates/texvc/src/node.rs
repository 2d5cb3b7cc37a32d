//! The syntax tree of a formula, with its two renderings.

use texvc_mathml::attribute::{AttrMap, MathVariant};
use texvc_mathml::element::{self, EMPTY_MI};

use crate::character_class::CharClass;
use crate::commands::{Shape, get_shape};
use crate::context::{RenderContext, StateFlags};
use crate::environments::Env;
use crate::error::RenderError;
use crate::registry::Direction;

/// A terminal symbol: a letter, a run of digits, a symbol, a control word, or raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal(Box<str>);

impl Literal {
    #[inline]
    pub fn new(value: impl Into<Box<str>>) -> Self {
        Literal(value.into())
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn class(&self) -> CharClass {
        CharClass::of(&self.0)
    }

    /// Control words like `\alpha` need a space after them when re-rendered; control symbols
    /// like `\,` don't.
    fn is_control_word(&self) -> bool {
        self.0.starts_with('\\') && self.0.ends_with(|ch: char| ch.is_ascii_alphabetic())
    }

    fn render_mml(&self, node: &TexNode, ctx: RenderContext<'_>) -> Result<String, RenderError> {
        let value = self.value();
        Ok(match self.class() {
            CharClass::Letter => {
                let default = ctx
                    .state()
                    .flags
                    .contains(StateFlags::CHEMISTRY)
                    .then_some(MathVariant::Normal);
                element::mi(value, &ctx.leaf_attrs(default))
            }
            CharClass::Digit => element::mn(value, &ctx.leaf_attrs(None)),
            CharClass::Symbol => match value {
                "~" => element::mspace("0.333em", ctx.attrs()),
                "-" => element::mo("\u{2212}", ctx.attrs()),
                "'" => element::mo("\u{2032}", ctx.attrs()),
                "*" => element::mo("\u{2217}", ctx.attrs()),
                _ => element::mo(value, ctx.attrs()),
            },
            CharClass::Macro => return dispatch(node, ctx, value),
        })
    }
}

impl From<char> for Literal {
    fn from(ch: char) -> Self {
        let mut buf = [0u8; 4];
        Literal::new(&*ch.encode_utf8(&mut buf))
    }
}

/// An ordered sequence of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TexArray {
    args: Vec<TexNode>,
    /// Whether the sequence was written as an explicit `{...}` group.
    curly: bool,
}

impl TexArray {
    #[inline]
    pub fn new(args: Vec<TexNode>) -> Self {
        TexArray { args, curly: false }
    }

    #[inline]
    pub fn curly(args: Vec<TexNode>) -> Self {
        TexArray { args, curly: true }
    }

    #[inline]
    pub fn args(&self) -> &[TexNode] {
        &self.args
    }

    #[inline]
    pub fn is_curly(&self) -> bool {
        self.curly
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    fn render_into(&self, output: &mut String) {
        if self.curly {
            output.push('{');
        }
        for arg in &self.args {
            arg.render_into(output);
        }
        if self.curly {
            output.push('}');
        }
    }

    /// Renders the children one after the other.
    ///
    /// An empty sequence renders the empty-identifier placeholder. Nested curly groups become a
    /// single `<mrow>` each.
    pub fn render_mml(&self, ctx: RenderContext<'_>) -> Result<String, RenderError> {
        if self.args.is_empty() {
            return Ok(EMPTY_MI.to_string());
        }
        let mut output = String::new();
        for arg in &self.args {
            let rendered = match arg {
                TexNode::TexArray(inner) if inner.is_curly() => arg.render_mml_single(ctx)?,
                _ => arg.render_mml(ctx)?,
            };
            output.push_str(&rendered);
        }
        Ok(output)
    }
}

/// A table-like environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    env: Env,
    rows: Vec<Vec<TexArray>>,
}

impl Matrix {
    #[inline]
    pub fn new(env: Env, rows: Vec<Vec<TexArray>>) -> Self {
        Matrix { env, rows }
    }

    #[inline]
    pub fn env(&self) -> Env {
        self.env
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<TexArray>] {
        &self.rows
    }

    fn render_into(&self, output: &mut String) {
        output.push_str(r"\begin{");
        output.push_str(self.env.as_str());
        output.push('}');
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                output.push_str(r"\\");
            }
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    output.push('&');
                }
                cell.render_into(output);
            }
        }
        output.push_str(r"\end{");
        output.push_str(self.env.as_str());
        output.push('}');
    }
}

/// A node of the syntax tree.
///
/// Every node owns its children. Trees are built bottom-up by the parser and never change
/// afterwards.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TexNode {
    Literal(Literal),
    TexArray(TexArray),
    /// Superscript: `base^up`.
    UQ { base: Box<TexNode>, up: Box<TexNode> },
    /// Subscript: `base_down`.
    DQ { base: Box<TexNode>, down: Box<TexNode> },
    /// A macro with one braced argument.
    Fun1 { name: Box<str>, arg: Box<TexNode> },
    /// A macro with one argument that need not be braced.
    Fun1nb { name: Box<str>, arg: Box<TexNode> },
    /// A macro with two braced arguments.
    Fun2 {
        name: Box<str>,
        first: Box<TexNode>,
        second: Box<TexNode>,
    },
    Matrix(Matrix),
}

impl TexNode {
    #[inline]
    pub fn literal(value: impl Into<Box<str>>) -> Self {
        TexNode::Literal(Literal::new(value))
    }

    /// The macro name of `Fun1`, `Fun1nb` and `Fun2` nodes.
    pub fn name(&self) -> Option<&str> {
        match self {
            TexNode::Fun1 { name, .. }
            | TexNode::Fun1nb { name, .. }
            | TexNode::Fun2 { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The argument of `Fun1` and `Fun1nb` nodes.
    pub fn single_arg(&self) -> Option<&TexNode> {
        match self {
            TexNode::Fun1 { arg, .. } | TexNode::Fun1nb { arg, .. } => Some(arg),
            _ => None,
        }
    }

    /// The two arguments of `Fun2` nodes.
    pub fn two_args(&self) -> Option<(&TexNode, &TexNode)> {
        match self {
            TexNode::Fun2 { first, second, .. } => Some((first, second)),
            _ => None,
        }
    }

    #[inline]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            TexNode::Literal(lit) => Some(lit.value()),
            _ => None,
        }
    }

    #[inline]
    pub fn is_empty_array(&self) -> bool {
        matches!(self, TexNode::TexArray(array) if array.is_empty())
    }

    /// Looks through sequences of exactly one node.
    pub fn peel(&self) -> &TexNode {
        let mut node = self;
        while let TexNode::TexArray(array) = node
            && let [only] = array.args()
        {
            node = only;
        }
        node
    }

    /// Returns the canonical text of this node.
    ///
    /// Parsing the canonical text gives a tree with the same canonical text.
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.render_into(&mut output);
        output
    }

    fn render_into(&self, output: &mut String) {
        match self {
            TexNode::Literal(lit) => {
                output.push_str(lit.value());
                if lit.is_control_word() {
                    output.push(' ');
                }
            }
            TexNode::TexArray(array) => array.render_into(output),
            TexNode::UQ { base, up } => {
                base.render_into(output);
                output.push('^');
                up.render_braced(output);
            }
            TexNode::DQ { base, down } => {
                base.render_into(output);
                output.push('_');
                down.render_braced(output);
            }
            TexNode::Fun1 { name, arg } if get_shape(name) == Some(Shape::TextBox) => {
                output.push_str(name);
                output.push('{');
                arg.render_verbatim(output);
                output.push('}');
            }
            TexNode::Fun1 { name, arg } => {
                output.push_str(name);
                arg.render_braced(output);
            }
            TexNode::Fun1nb { name, arg } => {
                output.push_str(name);
                output.push(' ');
                arg.render_into(output);
            }
            TexNode::Fun2 {
                name,
                first,
                second,
            } => {
                output.push_str(name);
                first.render_braced(output);
                second.render_braced(output);
            }
            TexNode::Matrix(matrix) => matrix.render_into(output),
        }
    }

    /// The raw content of a text box, without braces or added spaces.
    fn render_verbatim(&self, output: &mut String) {
        match self {
            TexNode::Literal(lit) => output.push_str(lit.value()),
            TexNode::TexArray(array) => {
                for arg in array.args() {
                    arg.render_verbatim(output);
                }
            }
            _ => self.render_into(output),
        }
    }

    fn render_braced(&self, output: &mut String) {
        if let TexNode::TexArray(array) = self
            && array.is_curly()
        {
            array.render_into(output);
        } else {
            output.push('{');
            self.render_into(output);
            output.push('}');
        }
    }

    /// Renders this node as a MathML fragment.
    ///
    /// The result only depends on the node and `ctx`.
    pub fn render_mml(&self, ctx: RenderContext<'_>) -> Result<String, RenderError> {
        match self {
            TexNode::Literal(lit) => lit.render_mml(self, ctx),
            TexNode::TexArray(array) => array.render_mml(ctx),
            TexNode::UQ { base, up } => render_script(ctx, base, up, Direction::Over),
            TexNode::DQ { base, down } => render_script(ctx, base, down, Direction::Under),
            TexNode::Fun1 { name, .. }
            | TexNode::Fun1nb { name, .. }
            | TexNode::Fun2 { name, .. } => dispatch(self, ctx, name),
            TexNode::Matrix(matrix) => {
                let name = matrix.env().as_str();
                let Some(spec) = ctx.registry().environment(matrix.env()) else {
                    return Err(RenderError::UnknownMacro(name.into()));
                };
                (spec.handler)(self, ctx, name, spec)
            }
        }
    }

    /// Like [`render_mml`](Self::render_mml), but always returns exactly one element.
    ///
    /// Sequences with more than one child are wrapped in `<mrow>`.
    pub fn render_mml_single(&self, ctx: RenderContext<'_>) -> Result<String, RenderError> {
        match self {
            TexNode::TexArray(array) => match array.args() {
                [] => Ok(EMPTY_MI.to_string()),
                [only] => only.render_mml_single(ctx),
                _ => Ok(element::mrow(&array.render_mml(ctx)?, &AttrMap::new())),
            },
            _ => self.render_mml(ctx),
        }
    }
}

fn dispatch(node: &TexNode, ctx: RenderContext<'_>, name: &str) -> Result<String, RenderError> {
    let Some(spec) = ctx.registry().get(name) else {
        log::debug!("no rendering registered for {name}");
        return Err(RenderError::UnknownMacro(name.into()));
    };
    (spec.handler)(node, ctx, name, spec)
}

/// Renders a sub- or superscript.
///
/// A base that stacks in the same direction as the script, like `\overbrace{a}^{b}`, gets the
/// script placed above (or below) it instead.
fn render_script(
    ctx: RenderContext<'_>,
    base: &TexNode,
    script: &TexNode,
    direction: Direction,
) -> Result<String, RenderError> {
    let base_mml = base.render_mml_single(ctx)?;
    let script_mml = if script.is_empty_array() {
        EMPTY_MI.to_string()
    } else {
        element::mrow(&script.render_mml(ctx.without_attrs())?, &AttrMap::new())
    };
    let stacked = ctx.registry().stacking_direction(base) == Some(direction);
    let none = AttrMap::new();
    Ok(match (direction, stacked) {
        (Direction::Over, true) => element::mover(&base_mml, &script_mml, &none),
        (Direction::Over, false) => element::msup(&base_mml, &script_mml, &none),
        (Direction::Under, true) => element::munder(&base_mml, &script_mml, &none),
        (Direction::Under, false) => element::msub(&base_mml, &script_mml, &none),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(value: &str) -> TexNode {
        TexNode::literal(value)
    }

    fn curly(args: Vec<TexNode>) -> TexNode {
        TexNode::TexArray(TexArray::curly(args))
    }

    fn mml(node: &TexNode) -> String {
        let attrs = AttrMap::new();
        node.render_mml(RenderContext::new(&attrs)).unwrap()
    }

    #[test]
    fn canonical_text() {
        let node = TexNode::TexArray(TexArray::new(vec![
            TexNode::UQ {
                base: Box::new(lit(r"\alpha")),
                up: Box::new(lit("2")),
            },
            TexNode::Fun1 {
                name: r"\hat".into(),
                arg: Box::new(curly(vec![lit("x")])),
            },
            TexNode::Fun1nb {
                name: r"\left".into(),
                arg: Box::new(lit("(")),
            },
            TexNode::Fun2 {
                name: r"\frac".into(),
                first: Box::new(curly(vec![lit("a")])),
                second: Box::new(curly(vec![])),
            },
        ]));
        assert_eq!(node.render(), r"\alpha ^{2}\hat{x}\left (\frac{a}{}");
    }

    #[test]
    fn canonical_matrix() {
        let node = TexNode::Matrix(Matrix::new(
            Env::PMatrix,
            vec![
                vec![
                    TexArray::new(vec![lit("a")]),
                    TexArray::new(vec![lit("b")]),
                ],
                vec![TexArray::new(vec![]), TexArray::new(vec![lit("d")])],
            ],
        ));
        assert_eq!(node.render(), r"\begin{pmatrix}a&b\\&d\end{pmatrix}");
    }

    #[test]
    fn control_symbols_have_no_trailing_space() {
        assert_eq!(lit(r"\,").render(), r"\,");
        assert_eq!(lit(r"\infty").render(), r"\infty ");
    }

    #[test]
    fn text_box_content_is_verbatim() {
        let node = TexNode::Fun1 {
            name: r"\text".into(),
            arg: Box::new(curly(vec![lit(r"\S")])),
        };
        assert_eq!(node.render(), r"\text{\S}");
        let node = TexNode::Fun1 {
            name: r"\mbox".into(),
            arg: Box::new(curly(vec![])),
        };
        assert_eq!(node.render(), r"\mbox{}");
    }

    #[test]
    fn literal_classes() {
        assert_eq!(mml(&lit("x")), "<mi>x</mi>");
        assert_eq!(mml(&lit("3.14")), "<mn>3.14</mn>");
        assert_eq!(mml(&lit("-")), "<mo>\u{2212}</mo>");
        assert_eq!(mml(&lit("<")), "<mo>&lt;</mo>");
        assert_eq!(mml(&lit(r"\alpha")), "<mi>\u{3b1}</mi>");
    }

    #[test]
    fn empty_superscript_is_placeholder() {
        let node = TexNode::UQ {
            base: Box::new(lit("a")),
            up: Box::new(curly(vec![])),
        };
        assert_eq!(mml(&node), "<msup><mi>a</mi><mi></mi></msup>");
        let node = TexNode::UQ {
            base: Box::new(TexNode::TexArray(TexArray::default())),
            up: Box::new(lit("a")),
        };
        assert_eq!(mml(&node), "<msup><mi></mi><mrow><mi>a</mi></mrow></msup>");
    }

    #[test]
    fn overbrace_base_stacks() {
        let overbrace = TexNode::Fun1nb {
            name: r"\overbrace".into(),
            arg: Box::new(curly(vec![lit("a")])),
        };
        let node = TexNode::UQ {
            base: Box::new(overbrace.clone()),
            up: Box::new(curly(vec![lit("b")])),
        };
        let output = mml(&node);
        assert!(output.starts_with("<mover><mrow><mover>"), "{output}");
        assert!(!output.contains("msup"), "{output}");
        // In the other direction, the base is an ordinary one.
        let node = TexNode::DQ {
            base: Box::new(overbrace),
            down: Box::new(curly(vec![lit("b")])),
        };
        assert!(mml(&node).starts_with("<msub>"));
    }

    #[test]
    fn rendering_is_pure() {
        let node = TexNode::DQ {
            base: Box::new(lit("x")),
            down: Box::new(curly(vec![lit("i"), lit("+"), lit("1")])),
        };
        let first = mml(&node);
        assert_eq!(first, mml(&node));
        assert_eq!(
            first,
            "<msub><mi>x</mi><mrow><mi>i</mi><mo>+</mo><mn>1</mn></mrow></msub>"
        );
    }

    #[test]
    fn unknown_macro() {
        let attrs = AttrMap::new();
        assert_eq!(
            lit(r"\nosuchmacro").render_mml(RenderContext::new(&attrs)),
            Err(RenderError::UnknownMacro(r"\nosuchmacro".into()))
        );
    }

    #[test]
    fn peel_single_children() {
        let inner = TexNode::DQ {
            base: Box::new(lit("x")),
            down: Box::new(lit("1")),
        };
        let node = curly(vec![curly(vec![inner.clone()])]);
        assert_eq!(node.peel(), &inner);
    }
}
