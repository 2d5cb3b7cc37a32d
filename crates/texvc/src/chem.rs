//! A small subset of chemistry notation for `\ce{...}`.
//!
//! Element symbols are set upright, a digit right after an element becomes its subscript, and
//! `->`, `<-` and `<=>` become reaction arrows.

use texvc_mathml::attribute::{AttrMap, MathVariant};
use texvc_mathml::element;

use crate::character_class::CharClass;
use crate::context::{RenderContext, StateFlags};
use crate::error::RenderError;
use crate::node::TexNode;
use crate::registry::MacroSpec;

static ARROWS: &[(&[&str], &str)] = &[
    (&["<", "=", ">"], "⇌"),
    (&["-", ">"], "→"),
    (&["<", "-"], "←"),
];

fn arrow_at(nodes: &[TexNode], start: usize) -> Option<(&'static str, usize)> {
    ARROWS.iter().find_map(|&(pattern, arrow)| {
        let matches = pattern
            .iter()
            .enumerate()
            .all(|(k, part)| nodes.get(start + k).and_then(TexNode::as_literal) == Some(*part));
        matches.then_some((arrow, pattern.len()))
    })
}

#[inline]
fn is_single(value: &str, pred: impl Fn(char) -> bool) -> bool {
    let mut chars = value.chars();
    matches!((chars.next(), chars.next()), (Some(ch), None) if pred(ch))
}

pub fn chem(
    node: &TexNode,
    ctx: RenderContext<'_>,
    name: &str,
    _: &MacroSpec,
) -> Result<String, RenderError> {
    let arg = node
        .single_arg()
        .ok_or_else(|| RenderError::InvalidArgument(name.into()))?;
    let nodes = match arg {
        TexNode::TexArray(array) => array.args(),
        other => std::slice::from_ref(other),
    };
    let inner = ctx.without_attrs().with_flag(StateFlags::CHEMISTRY);
    let upright = AttrMap::from([("mathvariant", MathVariant::Normal.as_str())]);
    let none = AttrMap::new();
    let literal_at = |i: usize| nodes.get(i).and_then(TexNode::as_literal);

    let mut output = String::new();
    let mut i = 0;
    while let Some(node) = nodes.get(i) {
        if let Some((arrow, len)) = arrow_at(nodes, i) {
            output.push_str(&element::mo(arrow, &none));
            i += len;
            continue;
        }
        i += 1;
        match node.as_literal() {
            Some(value) if is_single(value, |ch| ch.is_ascii_uppercase()) => {
                let mut symbol = value.to_string();
                while let Some(next) = literal_at(i)
                    && is_single(next, |ch| ch.is_ascii_lowercase())
                {
                    symbol.push_str(next);
                    i += 1;
                }
                let atom = element::mi(&symbol, &upright);
                if let Some(count) =
                    literal_at(i).filter(|v| CharClass::of(v) == CharClass::Digit)
                {
                    output.push_str(&element::msub(&atom, &element::mn(count, &none), &none));
                    i += 1;
                } else {
                    output.push_str(&atom);
                }
            }
            _ => output.push_str(&node.render_mml(inner)?),
        }
    }
    Ok(element::mrow(&output, ctx.attrs()))
}
