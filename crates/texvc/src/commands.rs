/// How a macro takes its arguments.
///
/// Control words that are not listed here take no arguments and are parsed as literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// One braced argument, e.g. `\sqrt{x}`.
    Fun1,
    /// One argument that need not be braced, e.g. `\overbrace x`.
    Fun1nb,
    /// Two braced arguments, e.g. `\frac{a}{b}`.
    Fun2,
    /// One braced argument which is raw text, e.g. `\text{if }`.
    TextBox,
    /// One braced argument in chemistry notation, `\ce{H2O}`.
    Chem,
    /// A single delimiter token, e.g. `\left(`.
    Delimiter,
}

static COMMANDS: phf::Map<&'static str, Shape> = phf::phf_map! {
    // Accents
    r"\hat" => Shape::Fun1,
    r"\widehat" => Shape::Fun1,
    r"\tilde" => Shape::Fun1,
    r"\widetilde" => Shape::Fun1,
    r"\bar" => Shape::Fun1,
    r"\vec" => Shape::Fun1,
    r"\dot" => Shape::Fun1,
    r"\ddot" => Shape::Fun1,
    r"\acute" => Shape::Fun1,
    r"\grave" => Shape::Fun1,
    r"\breve" => Shape::Fun1,
    r"\check" => Shape::Fun1,
    r"\mathring" => Shape::Fun1,
    // Over and under compositions
    r"\overline" => Shape::Fun1,
    r"\underline" => Shape::Fun1,
    r"\overbrace" => Shape::Fun1nb,
    r"\underbrace" => Shape::Fun1nb,
    r"\overleftarrow" => Shape::Fun1nb,
    r"\overrightarrow" => Shape::Fun1nb,
    r"\overleftrightarrow" => Shape::Fun1nb,
    r"\underleftarrow" => Shape::Fun1nb,
    r"\underrightarrow" => Shape::Fun1nb,
    r"\underleftrightarrow" => Shape::Fun1nb,
    // Fonts
    r"\boldsymbol" => Shape::Fun1,
    r"\bm" => Shape::Fun1,
    r"\mathrm" => Shape::Fun1,
    r"\mathbf" => Shape::Fun1,
    r"\mathit" => Shape::Fun1,
    r"\mathbb" => Shape::Fun1,
    r"\mathcal" => Shape::Fun1,
    r"\mathfrak" => Shape::Fun1,
    r"\mathsf" => Shape::Fun1,
    r"\mathtt" => Shape::Fun1,
    // Enclosures
    r"\cancel" => Shape::Fun1,
    r"\bcancel" => Shape::Fun1,
    r"\xcancel" => Shape::Fun1,
    r"\sout" => Shape::Fun1,
    // Miscellaneous
    r"\sqrt" => Shape::Fun1,
    r"\operatorname" => Shape::Fun1,
    r"\operatorname*" => Shape::Fun1,
    r"\frac" => Shape::Fun2,
    r"\dfrac" => Shape::Fun2,
    r"\tfrac" => Shape::Fun2,
    r"\binom" => Shape::Fun2,
    r"\overset" => Shape::Fun2,
    r"\underset" => Shape::Fun2,
    r"\stackrel" => Shape::Fun2,
    r"\text" => Shape::TextBox,
    r"\mbox" => Shape::TextBox,
    r"\textrm" => Shape::TextBox,
    r"\hbox" => Shape::TextBox,
    r"\ce" => Shape::Chem,
    r"\left" => Shape::Delimiter,
    r"\right" => Shape::Delimiter,
};

#[inline]
pub(crate) fn get_shape(command: &str) -> Option<Shape> {
    COMMANDS.get(command).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes() {
        assert_eq!(get_shape(r"\frac"), Some(Shape::Fun2));
        assert_eq!(get_shape(r"\overbrace"), Some(Shape::Fun1nb));
        assert_eq!(get_shape(r"\text"), Some(Shape::TextBox));
        assert_eq!(get_shape(r"\alpha"), None);
        assert_eq!(get_shape("frac"), None);
    }
}
