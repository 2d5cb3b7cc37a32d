/// The class of a literal, which decides the element it is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// `<mi>`
    Letter,
    /// `<mn>`
    Digit,
    /// `<mo>`
    Symbol,
    /// A control word or control symbol; rendered through the macro registry.
    Macro,
}

impl CharClass {
    pub fn of(value: &str) -> Self {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some('\\'), Some(_)) => CharClass::Macro,
            (Some(ch), _) if ch.is_ascii_digit() => CharClass::Digit,
            (Some(ch), _) if ch.is_alphabetic() => CharClass::Letter,
            _ => CharClass::Symbol,
        }
    }
}
