use crate::attribute::AttrMap;
use crate::element::{EMPTY_MI, Tag, element};

/// Column alignment of a whole table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnAlign {
    #[default]
    Centered,
    Left,
    /// Alternating right and left columns, for aligned equations.
    RightLeft,
}

impl ColumnAlign {
    #[inline]
    fn as_attr(self) -> Option<&'static str> {
        match self {
            ColumnAlign::Centered => None,
            ColumnAlign::Left => Some("left"),
            ColumnAlign::RightLeft => Some("right left"),
        }
    }
}

/// `<mtable>` around already-rendered `<mtr>` rows.
pub fn mtable(rows: &str, align: ColumnAlign, attrs: &AttrMap) -> String {
    match align.as_attr() {
        Some(columnalign) => element(
            Tag::Mtable,
            rows,
            &AttrMap::from([("columnalign", columnalign)]).merged(attrs),
        ),
        None => element(Tag::Mtable, rows, attrs),
    }
}

/// `<mtr>` around already-rendered `<mtd>` cells.
#[inline]
pub fn mtr(cells: &str) -> String {
    element(Tag::Mtr, cells, &AttrMap::new())
}

/// `<mtd>` around a rendered cell. An empty cell gets the empty-identifier placeholder.
pub fn mtd(content: &str) -> String {
    let content = if content.is_empty() { EMPTY_MI } else { content };
    element(Tag::Mtd, content, &AttrMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_table() {
        let row1 = mtr(&(mtd("<mn>1</mn>") + &mtd("")));
        let row2 = mtr(&mtd("<mn>3</mn>"));
        assert_eq!(
            mtable(&(row1 + &row2), ColumnAlign::Centered, &AttrMap::new()),
            "<mtable><mtr><mtd><mn>1</mn></mtd><mtd><mi></mi></mtd></mtr><mtr><mtd><mn>3</mn></mtd></mtr></mtable>"
        );
    }

    #[test]
    fn left_aligned_table_with_attrs() {
        let attrs = AttrMap::from([("id", "t")]);
        assert_eq!(
            mtable("", ColumnAlign::Left, &attrs),
            r#"<mtable columnalign="left" id="t"></mtable>"#
        );
    }
}
