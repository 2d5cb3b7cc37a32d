use strum_macros::IntoStaticStr;

use crate::attribute::AttrMap;
use crate::escape::{escape_attribute_value, escape_text, push_attribute_name};

/// The placeholder used in place of empty arguments.
///
/// An empty `<mrow>` inside a script or an under/over composition is rendered incorrectly by
/// several browsers, so empty arguments become an empty identifier instead.
pub const EMPTY_MI: &str = "<mi></mi>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Tag {
    Math,
    Semantics,
    Annotation,
    Mrow,
    Mi,
    Mn,
    Mo,
    Mtext,
    Mspace,
    Msup,
    Msub,
    Mover,
    Munder,
    Menclose,
    Mfrac,
    Msqrt,
    Mtable,
    Mtr,
    Mtd,
}

impl Tag {
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Writes `<tag name="value" ...>` into `output`.
pub(crate) fn push_start_tag(output: &mut String, tag: Tag, attrs: &AttrMap) {
    output.push('<');
    output.push_str(tag.as_str());
    for (name, value) in attrs.iter() {
        output.push(' ');
        if !push_attribute_name(output, name) {
            // Nothing usable was left of the name; drop the attribute entirely.
            output.pop();
            continue;
        }
        output.push_str("=\"");
        escape_attribute_value(output, value);
        output.push('"');
    }
    output.push('>');
}

#[inline]
fn push_end_tag(output: &mut String, tag: Tag) {
    output.push_str("</");
    output.push_str(tag.as_str());
    output.push('>');
}

/// Wraps already-rendered `content` in `tag`.
pub fn element(tag: Tag, content: &str, attrs: &AttrMap) -> String {
    let mut output = String::with_capacity(content.len() + 16);
    push_start_tag(&mut output, tag, attrs);
    output.push_str(content);
    push_end_tag(&mut output, tag);
    output
}

/// Wraps the concatenation of several already-rendered children in `tag`.
pub fn element_of(tag: Tag, children: &[&str], attrs: &AttrMap) -> String {
    let len = children.iter().map(|c| c.len()).sum::<usize>();
    let mut output = String::with_capacity(len + 16);
    push_start_tag(&mut output, tag, attrs);
    for child in children {
        output.push_str(child);
    }
    push_end_tag(&mut output, tag);
    output
}

/// Builds a leaf element from raw text, which is escaped.
pub fn leaf(tag: Tag, text: &str, attrs: &AttrMap) -> String {
    let mut output = String::with_capacity(text.len() + 16);
    push_start_tag(&mut output, tag, attrs);
    escape_text(&mut output, text);
    push_end_tag(&mut output, tag);
    output
}

#[inline]
pub fn mi(text: &str, attrs: &AttrMap) -> String {
    leaf(Tag::Mi, text, attrs)
}

#[inline]
pub fn mn(text: &str, attrs: &AttrMap) -> String {
    leaf(Tag::Mn, text, attrs)
}

#[inline]
pub fn mo(text: &str, attrs: &AttrMap) -> String {
    leaf(Tag::Mo, text, attrs)
}

#[inline]
pub fn mtext(text: &str, attrs: &AttrMap) -> String {
    leaf(Tag::Mtext, text, attrs)
}

pub fn mspace(width: &str, attrs: &AttrMap) -> String {
    element(Tag::Mspace, "", &AttrMap::from([("width", width)]).merged(attrs))
}

#[inline]
pub fn mrow(content: &str, attrs: &AttrMap) -> String {
    element(Tag::Mrow, content, attrs)
}

#[inline]
pub fn msup(base: &str, sup: &str, attrs: &AttrMap) -> String {
    element_of(Tag::Msup, &[base, sup], attrs)
}

#[inline]
pub fn msub(base: &str, sub: &str, attrs: &AttrMap) -> String {
    element_of(Tag::Msub, &[base, sub], attrs)
}

#[inline]
pub fn mover(base: &str, over: &str, attrs: &AttrMap) -> String {
    element_of(Tag::Mover, &[base, over], attrs)
}

#[inline]
pub fn munder(base: &str, under: &str, attrs: &AttrMap) -> String {
    element_of(Tag::Munder, &[base, under], attrs)
}

/// `<menclose>` with the given `notation`, e.g. `updiagonalstrike`.
pub fn menclose(notation: &str, content: &str, attrs: &AttrMap) -> String {
    element(
        Tag::Menclose,
        content,
        &AttrMap::from([("notation", notation)]).merged(attrs),
    )
}

#[inline]
pub fn mfrac(num: &str, denom: &str, attrs: &AttrMap) -> String {
    element_of(Tag::Mfrac, &[num, denom], attrs)
}

#[inline]
pub fn msqrt(content: &str, attrs: &AttrMap) -> String {
    element(Tag::Msqrt, content, attrs)
}

#[inline]
pub fn math(content: &str, attrs: &AttrMap) -> String {
    element(Tag::Math, content, attrs)
}

/// `<semantics>` holding `content` and an annotation with the given `encoding`.
pub fn semantics(content: &str, encoding: &str, annotation: &str) -> String {
    let annotation = leaf(
        Tag::Annotation,
        annotation,
        &AttrMap::from([("encoding", encoding)]),
    );
    element_of(Tag::Semantics, &[content, &annotation], &AttrMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_escapes_text() {
        assert_eq!(mo("<", &AttrMap::new()), "<mo>&lt;</mo>");
        assert_eq!(mi("x", &AttrMap::new()), "<mi>x</mi>");
    }

    #[test]
    fn attributes_are_escaped() {
        let attrs = AttrMap::from([("k", r#""<script>alert("problem")</script>""#)]);
        let output = mi("a", &attrs);
        assert_eq!(
            output,
            r#"<mi k="&quot;&lt;script&gt;alert(&quot;problem&quot;)&lt;/script&gt;&quot;">a</mi>"#
        );
    }

    #[test]
    fn unusable_attribute_names_are_dropped() {
        let attrs = AttrMap::from([("\"><", "x"), ("k", "v")]);
        assert_eq!(mi("a", &attrs), r#"<mi k="v">a</mi>"#);
    }

    #[test]
    fn caller_attributes_override_builtin() {
        let attrs = AttrMap::from([("notation", "box"), ("k", "v")]);
        assert_eq!(
            menclose("updiagonalstrike", "<mi>a</mi>", &attrs),
            r#"<menclose notation="box" k="v"><mi>a</mi></menclose>"#
        );
    }

    #[test]
    fn compositions() {
        let none = AttrMap::new();
        assert_eq!(
            msup("<mi>x</mi>", EMPTY_MI, &none),
            "<msup><mi>x</mi><mi></mi></msup>"
        );
        assert_eq!(
            munder("<mi>x</mi>", "<mo>_</mo>", &none),
            "<munder><mi>x</mi><mo>_</mo></munder>"
        );
        assert_eq!(
            mspace("0.1667em", &none),
            r#"<mspace width="0.1667em"></mspace>"#
        );
    }

    #[test]
    fn semantics_annotation() {
        assert_eq!(
            semantics("<mi>x</mi>", "application/x-tex", "x<y"),
            r#"<semantics><mi>x</mi><annotation encoding="application/x-tex">x&lt;y</annotation></semantics>"#
        );
    }
}
