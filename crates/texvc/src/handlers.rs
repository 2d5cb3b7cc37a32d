//! Rendering functions for the entries of the macro registry.
//!
//! All of them share the [`Handler`](crate::registry::Handler) signature. A handler decides which
//! of the elements it produces receives the attributes of the context.

use texvc_mathml::attribute::{AttrMap, MathVariant};
use texvc_mathml::element;
use texvc_mathml::table::{mtable, mtd, mtr};

use crate::character_class::CharClass;
use crate::context::{RenderContext, StateFlags};
use crate::error::RenderError;
use crate::node::TexNode;
use crate::registry::{Direction, Family, FracStyle, MacroSpec};

type HandlerResult = Result<String, RenderError>;

#[inline]
fn invalid(name: &str) -> RenderError {
    RenderError::InvalidArgument(name.into())
}

fn single_arg<'node>(node: &'node TexNode, name: &str) -> Result<&'node TexNode, RenderError> {
    node.single_arg().ok_or_else(|| invalid(name))
}

fn two_args<'node>(
    node: &'node TexNode,
    name: &str,
) -> Result<(&'node TexNode, &'node TexNode), RenderError> {
    node.two_args().ok_or_else(|| invalid(name))
}

fn codepoint(spec: &MacroSpec, name: &str) -> Result<String, RenderError> {
    spec.codepoint
        .map(String::from)
        .ok_or_else(|| invalid(name))
}

/// Collects the text of a tree made only of literals.
///
/// Control words are only accepted if `allow_macros` is set; their text is taken verbatim.
fn plain_text(node: &TexNode, allow_macros: bool, output: &mut String) -> bool {
    match node {
        TexNode::Literal(lit) if allow_macros || lit.class() != CharClass::Macro => {
            output.push_str(lit.value());
            true
        }
        TexNode::TexArray(array) => array
            .args()
            .iter()
            .all(|arg| plain_text(arg, allow_macros, output)),
        _ => false,
    }
}

#[inline]
fn is_upper_greek(ch: char) -> bool {
    ('\u{391}'..='\u{3A9}').contains(&ch)
}

pub fn identifier(
    _: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    spec: &MacroSpec,
) -> HandlerResult {
    let Some(ch) = spec.codepoint else {
        return Err(invalid(name));
    };
    // Capital Greek letters are upright unless a font macro says otherwise.
    let default = is_upper_greek(ch).then_some(MathVariant::Normal);
    let mut buf = [0u8; 4];
    Ok(element::mi(ch.encode_utf8(&mut buf), &ctx.leaf_attrs(default)))
}

pub fn operator(
    _: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    spec: &MacroSpec,
) -> HandlerResult {
    Ok(element::mo(&codepoint(spec, name)?, ctx.attrs()))
}

pub fn function(_: &TexNode, ctx: RenderContext<'_>, name: &str, _: &MacroSpec) -> HandlerResult {
    let text = name.strip_prefix('\\').unwrap_or(name);
    Ok(element::mi(text, &ctx.leaf_attrs(None)))
}

pub fn space(_: &TexNode, ctx: RenderContext<'_>, name: &str, spec: &MacroSpec) -> HandlerResult {
    let Family::Space(width) = spec.family else {
        return Err(invalid(name));
    };
    Ok(element::mspace(width, ctx.attrs()))
}

/// `\hat{x}` and friends.
pub fn accent(
    node: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    spec: &MacroSpec,
) -> HandlerResult {
    let arg = single_arg(node, name)?;
    let Family::Accent { stretchy } = spec.family else {
        return Err(invalid(name));
    };
    let base = arg.render_mml_single(ctx)?;
    let stretchy = if stretchy { "true" } else { "false" };
    let mark = element::mo(
        &codepoint(spec, name)?,
        &AttrMap::from([("stretchy", stretchy)]),
    );
    Ok(element::mover(
        &base,
        &mark,
        &AttrMap::from([("accent", "true")]),
    ))
}

/// `\overbrace{x}`, `\underline{x}` and friends.
pub fn underover(
    node: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    spec: &MacroSpec,
) -> HandlerResult {
    let arg = single_arg(node, name)?;
    let Family::Stack(direction) = spec.family else {
        return Err(invalid(name));
    };
    let none = AttrMap::new();
    let mut base = arg.render_mml_single(ctx)?;
    if matches!(arg.peel(), TexNode::UQ { .. } | TexNode::DQ { .. }) {
        base = element::mrow(&base, &none);
    }
    let mark = element::mo(
        &codepoint(spec, name)?,
        &AttrMap::from([("stretchy", "true")]),
    );
    let inner = match direction {
        Direction::Over => element::mover(&base, &mark, &none),
        Direction::Under => element::munder(&base, &mark, &none),
    };
    Ok(element::mrow(&inner, &none))
}

/// `\overset{a}{b}`, `\underset{a}{b}` and `\stackrel{a}{b}`: `a` is placed on `b`.
pub fn stack(
    node: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    spec: &MacroSpec,
) -> HandlerResult {
    let (mark, base) = two_args(node, name)?;
    let Family::Stack(direction) = spec.family else {
        return Err(invalid(name));
    };
    let inner = ctx.without_attrs();
    let base = base.render_mml_single(inner)?;
    let mark = mark.render_mml_single(inner)?;
    Ok(match direction {
        Direction::Over => element::mover(&base, &mark, ctx.attrs()),
        Direction::Under => element::munder(&base, &mark, ctx.attrs()),
    })
}

/// The table-like environments.
pub fn array(
    node: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    spec: &MacroSpec,
) -> HandlerResult {
    let TexNode::Matrix(matrix) = node else {
        return Err(invalid(name));
    };
    let Family::Table(table) = spec.family else {
        return Err(invalid(name));
    };
    let cell_ctx = ctx.without_attrs().with_flag(StateFlags::INSIDE_MATRIX);
    let mut rows = String::new();
    for row in matrix.rows() {
        let mut cells = String::new();
        for cell in row {
            cells.push_str(&mtd(&cell.render_mml(cell_ctx)?));
        }
        rows.push_str(&mtr(&cells));
    }

    let mut table_attrs = AttrMap::new();
    if ctx.state().flags.contains(StateFlags::INSIDE_MATRIX) {
        table_attrs.insert("displaystyle", "false");
    }
    if table.small {
        table_attrs.insert("scriptlevel", "1");
    }
    let table_mml = mtable(&rows, table.align, &table_attrs.merged(ctx.attrs()));
    if table.open.is_none() && table.close.is_none() {
        return Ok(table_mml);
    }

    let fence = AttrMap::from([("fence", "true"), ("stretchy", "true")]);
    let mut output = String::new();
    if let Some(open) = table.open {
        output.push_str(&element::mo(&String::from(open), &fence));
    }
    output.push_str(&table_mml);
    if let Some(close) = table.close {
        output.push_str(&element::mo(&String::from(close), &fence));
    }
    Ok(element::mrow(&output, &AttrMap::new()))
}

pub fn boldsymbol(
    node: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    _: &MacroSpec,
) -> HandlerResult {
    single_arg(node, name)?.render_mml_single(ctx.with_variant(MathVariant::BoldItalic))
}

/// `\mathbf{x}` and friends.
pub fn mathfont(
    node: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    spec: &MacroSpec,
) -> HandlerResult {
    let arg = single_arg(node, name)?;
    let Family::Variant(variant) = spec.family else {
        return Err(invalid(name));
    };
    arg.render_mml_single(ctx.with_variant(variant))
}

pub fn cancel(
    node: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    spec: &MacroSpec,
) -> HandlerResult {
    let arg = single_arg(node, name)?;
    let Family::Notation(notation) = spec.family else {
        return Err(invalid(name));
    };
    let content = arg.render_mml_single(ctx.without_attrs())?;
    Ok(element::menclose(notation, &content, ctx.attrs()))
}

pub fn frac(node: &TexNode, ctx: RenderContext<'_>, name: &str, spec: &MacroSpec) -> HandlerResult {
    let (num, denom) = two_args(node, name)?;
    let Family::Frac(style) = spec.family else {
        return Err(invalid(name));
    };
    let inner = ctx.without_attrs();
    let num = num.render_mml_single(inner)?;
    let denom = denom.render_mml_single(inner)?;
    Ok(match style {
        FracStyle::Inherit => element::mfrac(&num, &denom, ctx.attrs()),
        FracStyle::Display => element::mfrac(
            &num,
            &denom,
            &AttrMap::from([("displaystyle", "true")]).merged(ctx.attrs()),
        ),
        FracStyle::Text => element::mfrac(
            &num,
            &denom,
            &AttrMap::from([("displaystyle", "false")]).merged(ctx.attrs()),
        ),
        FracStyle::Binom => {
            let none = AttrMap::new();
            let mut output = element::mo("(", &none);
            output.push_str(&element::mfrac(
                &num,
                &denom,
                &AttrMap::from([("linethickness", "0")]),
            ));
            output.push_str(&element::mo(")", &none));
            element::mrow(&output, ctx.attrs())
        }
    })
}

pub fn sqrt(node: &TexNode, ctx: RenderContext<'_>, name: &str, _: &MacroSpec) -> HandlerResult {
    let content = single_arg(node, name)?.render_mml(ctx.without_attrs())?;
    Ok(element::msqrt(&content, ctx.attrs()))
}

/// Replaces the escaped characters of a text box (`\}`, `\$`, `\ `, ...) with the characters
/// themselves. Other backslashes are kept.
fn unescape_text(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(&next) = chars.peek()
            && matches!(next, '{' | '}' | '$' | '%' | '&' | '#' | '_' | ' ')
        {
            output.push(next);
            chars.next();
        } else {
            output.push(ch);
        }
    }
    output
}

/// Spaces at the edges of a text box would be dropped by the renderer.
fn protect_edge_spaces(raw: &str) -> String {
    let core = raw.trim_matches(' ');
    let leading = raw.len() - raw.trim_start_matches(' ').len();
    let trailing = if core.is_empty() {
        0
    } else {
        raw.len() - raw.trim_end_matches(' ').len()
    };
    let mut output = "\u{A0}".repeat(leading);
    output.push_str(core);
    output.push_str(&"\u{A0}".repeat(trailing));
    output
}

/// `\text{...}` and the other text boxes.
pub fn text(node: &TexNode, ctx: RenderContext<'_>, name: &str, spec: &MacroSpec) -> HandlerResult {
    let arg = single_arg(node, name)?;
    let Family::Text(variant) = spec.family else {
        return Err(invalid(name));
    };
    let mut raw = String::new();
    if !plain_text(arg, true, &mut raw) {
        return Err(invalid(name));
    }
    Ok(element::mtext(
        &protect_edge_spaces(&unescape_text(&raw)),
        &ctx.leaf_attrs(variant),
    ))
}

pub fn operatorname(
    node: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    _: &MacroSpec,
) -> HandlerResult {
    let mut text = String::new();
    if !plain_text(single_arg(node, name)?, false, &mut text) || text.is_empty() {
        return Err(invalid(name));
    }
    // A single-letter <mi> would be italic.
    let default = (text.chars().count() == 1).then_some(MathVariant::Normal);
    Ok(element::mi(&text, &ctx.leaf_attrs(default)))
}

/// `\left` and `\right`.
pub fn delimiter(
    node: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    _: &MacroSpec,
) -> HandlerResult {
    let Some(TexNode::Literal(lit)) = node.single_arg() else {
        return Err(invalid(name));
    };
    let value = lit.value();
    let delim = match lit.class() {
        // The null delimiter.
        CharClass::Symbol if value == "." => return Ok(String::new()),
        CharClass::Symbol => value.to_string(),
        CharClass::Macro => {
            let Some(spec) = ctx.registry().get(value) else {
                return Err(RenderError::UnknownMacro(value.into()));
            };
            codepoint(spec, name)?
        }
        CharClass::Letter | CharClass::Digit => return Err(invalid(name)),
    };
    let attrs = AttrMap::from([("fence", "true"), ("stretchy", "true")]).merged(ctx.attrs());
    Ok(element::mo(&delim, &attrs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environments::Env;
    use crate::node::{Matrix, TexArray};

    fn curly(args: Vec<TexNode>) -> Box<TexNode> {
        Box::new(TexNode::TexArray(TexArray::curly(args)))
    }

    fn fun1(name: &str, arg: Box<TexNode>) -> TexNode {
        TexNode::Fun1 {
            name: name.into(),
            arg,
        }
    }

    fn render(node: &TexNode, attrs: &AttrMap) -> HandlerResult {
        node.render_mml(RenderContext::new(attrs))
    }

    #[test]
    fn accent_marks() {
        let node = fun1(r"\widetilde", curly(vec![TexNode::literal("x")]));
        assert_eq!(
            render(&node, &AttrMap::new()).unwrap(),
            r#"<mover accent="true"><mi>x</mi><mo stretchy="true">~</mo></mover>"#
        );
        let node = fun1(r"\hat", curly(vec![TexNode::literal("x")]));
        assert_eq!(
            render(&node, &AttrMap::new()).unwrap(),
            r#"<mover accent="true"><mi>x</mi><mo stretchy="false">^</mo></mover>"#
        );
    }

    #[test]
    fn underover_with_subscript_base() {
        let node = TexNode::Fun1nb {
            name: r"\underbrace".into(),
            arg: curly(vec![TexNode::DQ {
                base: Box::new(TexNode::literal("x")),
                down: Box::new(TexNode::literal("1")),
            }]),
        };
        let output = render(&node, &AttrMap::from([("id", "u")])).unwrap();
        assert!(output.starts_with("<mrow><munder><mrow><msub>"), "{output}");
        assert!(output.contains(r#"<mi id="u">x</mi>"#), "{output}");
    }

    #[test]
    fn underover_attributes_go_to_base() {
        let node = TexNode::Fun1nb {
            name: r"\overline".into(),
            arg: curly(vec![TexNode::literal("a")]),
        };
        assert_eq!(
            render(&node, &AttrMap::from([("k", "v")])).unwrap(),
            r#"<mrow><mover><mi k="v">a</mi><mo stretchy="true">‾</mo></mover></mrow>"#
        );
    }

    #[test]
    fn accent_attributes_go_to_base() {
        let node = fun1(r"\hat", curly(vec![TexNode::literal("x")]));
        let output = render(&node, &AttrMap::from([("k", "v")])).unwrap();
        assert_eq!(
            output,
            r#"<mover accent="true"><mi k="v">x</mi><mo stretchy="false">^</mo></mover>"#
        );
        assert!(!output.contains(r#"<mover accent="true" k="#), "{output}");
    }

    #[test]
    fn cancel_notation_comes_from_spec() {
        let node = fun1(r"\cancel", curly(vec![TexNode::literal("a")]));
        let spec = MacroSpec::new(cancel, None, Family::Notation("something"));
        let attrs = AttrMap::new();
        assert_eq!(
            cancel(&node, RenderContext::new(&attrs), r"\cancel", &spec).unwrap(),
            r#"<menclose notation="something"><mi>a</mi></menclose>"#
        );
    }

    #[test]
    fn cancel_with_attrs() {
        let node = fun1(r"\bcancel", curly(vec![TexNode::literal("a")]));
        assert_eq!(
            render(&node, &AttrMap::from([("class", "c")])).unwrap(),
            r#"<menclose notation="downdiagonalstrike" class="c"><mi>a</mi></menclose>"#
        );
    }

    #[test]
    fn boldsymbol_overrides_variant() {
        let node = fun1(r"\boldsymbol", curly(vec![TexNode::literal(r"\Gamma")]));
        assert_eq!(
            render(&node, &AttrMap::new()).unwrap(),
            r#"<mi mathvariant="bold-italic">Γ</mi>"#
        );
        let node = fun1(r"\mathbb", curly(vec![TexNode::literal("R")]));
        assert_eq!(
            render(&node, &AttrMap::new()).unwrap(),
            r#"<mi mathvariant="double-struck">R</mi>"#
        );
    }

    #[test]
    fn fractions() {
        let fun2 = |name: &str| TexNode::Fun2 {
            name: name.into(),
            first: curly(vec![TexNode::literal("a")]),
            second: curly(vec![TexNode::literal("b")]),
        };
        let none = AttrMap::new();
        assert_eq!(
            render(&fun2(r"\frac"), &none).unwrap(),
            "<mfrac><mi>a</mi><mi>b</mi></mfrac>"
        );
        assert_eq!(
            render(&fun2(r"\dfrac"), &none).unwrap(),
            r#"<mfrac displaystyle="true"><mi>a</mi><mi>b</mi></mfrac>"#
        );
        assert_eq!(
            render(&fun2(r"\binom"), &none).unwrap(),
            r#"<mrow><mo>(</mo><mfrac linethickness="0"><mi>a</mi><mi>b</mi></mfrac><mo>)</mo></mrow>"#
        );
        assert_eq!(
            render(&fun2(r"\overset"), &none).unwrap(),
            "<mover><mi>b</mi><mi>a</mi></mover>"
        );
        assert_eq!(
            render(&fun2(r"\underset"), &none).unwrap(),
            "<munder><mi>b</mi><mi>a</mi></munder>"
        );
    }

    #[test]
    fn text_keeps_edge_spaces() {
        let node = fun1(r"\text", curly(vec![TexNode::literal(" if x ")]));
        assert_eq!(
            render(&node, &AttrMap::new()).unwrap(),
            "<mtext>\u{A0}if x\u{A0}</mtext>"
        );
        let node = fun1(r"\textrm", curly(vec![TexNode::literal("&")]));
        assert_eq!(
            render(&node, &AttrMap::new()).unwrap(),
            r#"<mtext mathvariant="normal">&amp;</mtext>"#
        );
        assert_eq!(protect_edge_spaces("  "), "\u{A0}\u{A0}");
        assert_eq!(protect_edge_spaces(""), "");
    }

    #[test]
    fn text_escapes() {
        let node = fun1(r"\text", curly(vec![TexNode::literal(r"a \} b \$5 \{\%\&\#\_")]));
        assert_eq!(
            render(&node, &AttrMap::new()).unwrap(),
            "<mtext>a } b $5 {%&amp;#_</mtext>"
        );
        assert_eq!(unescape_text(r"\S x\ "), r"\S x ");
        assert_eq!(unescape_text(r"\\S"), r"\\S");
        assert_eq!(unescape_text(r"end\"), r"end\");
    }

    #[test]
    fn operatorname() {
        let node = fun1(
            r"\operatorname",
            curly(vec![
                TexNode::literal("s"),
                TexNode::literal("g"),
                TexNode::literal("n"),
            ]),
        );
        assert_eq!(render(&node, &AttrMap::new()).unwrap(), "<mi>sgn</mi>");
        let node = fun1(r"\operatorname", curly(vec![TexNode::literal(r"\alpha")]));
        assert_eq!(
            render(&node, &AttrMap::new()),
            Err(RenderError::InvalidArgument(r"\operatorname".into()))
        );
    }

    #[test]
    fn delimiters() {
        let delim = |name: &str, value: &str| TexNode::Fun1nb {
            name: name.into(),
            arg: Box::new(TexNode::literal(value)),
        };
        let none = AttrMap::new();
        assert_eq!(
            render(&delim(r"\left", "("), &none).unwrap(),
            r#"<mo fence="true" stretchy="true">(</mo>"#
        );
        assert_eq!(
            render(&delim(r"\right", r"\rangle"), &none).unwrap(),
            r#"<mo fence="true" stretchy="true">⟩</mo>"#
        );
        assert_eq!(render(&delim(r"\right", "."), &none).unwrap(), "");
        assert_eq!(
            render(&delim(r"\left", r"\sin"), &none),
            Err(RenderError::InvalidArgument(r"\left".into()))
        );
        assert_eq!(
            render(&delim(r"\left", r"\foo"), &none),
            Err(RenderError::UnknownMacro(r"\foo".into()))
        );
    }

    #[test]
    fn fenced_table() {
        let cell = |value: &str| TexArray::new(vec![TexNode::literal(value)]);
        let node = TexNode::Matrix(Matrix::new(
            Env::PMatrix,
            vec![vec![cell("a"), TexArray::default()]],
        ));
        assert_eq!(
            render(&node, &AttrMap::from([("id", "m")])).unwrap(),
            concat!(
                r#"<mrow><mo fence="true" stretchy="true">(</mo>"#,
                r#"<mtable id="m"><mtr><mtd><mi>a</mi></mtd><mtd><mi></mi></mtd></mtr></mtable>"#,
                r#"<mo fence="true" stretchy="true">)</mo></mrow>"#,
            )
        );
    }

    #[test]
    fn nested_tables() {
        let inner = TexNode::Matrix(Matrix::new(
            Env::Matrix,
            vec![vec![TexArray::new(vec![TexNode::literal("1")])]],
        ));
        let outer = TexNode::Matrix(Matrix::new(
            Env::Cases,
            vec![vec![TexArray::new(vec![inner])]],
        ));
        let output = render(&outer, &AttrMap::new()).unwrap();
        assert!(output.contains(r#"<mtable columnalign="left">"#), "{output}");
        assert!(output.contains(r#"<mtable displaystyle="false">"#), "{output}");
        assert!(!output.contains("fence=\"true\" stretchy=\"true\">}"), "{output}");
    }

    #[test]
    fn wrong_node_shape() {
        let node = TexNode::literal("x");
        let spec = MacroSpec::new(frac, None, Family::Frac(FracStyle::Inherit));
        let attrs = AttrMap::new();
        assert_eq!(
            frac(&node, RenderContext::new(&attrs), r"\frac", &spec),
            Err(RenderError::InvalidArgument(r"\frac".into()))
        );
    }
}
