/// Escapes special characters in `input` for safe inclusion in element content.
/// Specifically, it replaces:
/// - `&` with `&amp;`
/// - `<` with `&lt;`
/// - `>` with `&gt;`
///
/// This function uses `memchr` for efficient searching of special characters.
pub fn escape_text(output: &mut String, input: &str) {
    let mut rest = input;

    while let Some(index) = memchr::memchr3(b'&', b'<', b'>', rest.as_bytes()) {
        // The special characters are ASCII, so `index` and `index + 1` are char boundaries.
        let Some((before, after)) = rest.split_at_checked(index) else {
            break;
        };
        output.push_str(before);
        let Some((special, tail)) = after.split_at_checked(1) else {
            break;
        };
        output.push_str(match special {
            "&" => "&amp;",
            "<" => "&lt;",
            _ => "&gt;",
        });
        rest = tail;
    }

    output.push_str(rest);
}

/// Escapes special characters in `input` for safe inclusion in attribute values
/// which are enclosed in double quotes.
///
/// Besides `&` and `"`, this also replaces `'`, `<` and `>`, because attribute values may come
/// from untrusted input and must not be able to introduce markup of any kind.
pub fn escape_attribute_value(output: &mut String, input: &str) {
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(ch),
        }
    }
}

/// Writes the characters of `name` that are valid in an XML attribute name.
///
/// Returns `false` if nothing was written.
pub(crate) fn push_attribute_name(output: &mut String, name: &str) -> bool {
    let before = output.len();
    output.extend(
        name.chars()
            .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':' | '.')),
    );
    output.len() > before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(input: &str) -> String {
        let mut output = String::new();
        escape_text(&mut output, input);
        output
    }

    fn attr(input: &str) -> String {
        let mut output = String::new();
        escape_attribute_value(&mut output, input);
        output
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(text(""), "");
        assert_eq!(attr(""), "");
    }

    #[test]
    fn test_no_special_characters() {
        assert_eq!(text("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_all_special_characters() {
        assert_eq!(text("<tag>&content</tag>"), "&lt;tag&gt;&amp;content&lt;/tag&gt;");
    }

    #[test]
    fn test_consecutive_special_characters() {
        assert_eq!(text("&<>"), "&amp;&lt;&gt;");
    }

    #[test]
    fn test_utf8_with_special_characters() {
        assert_eq!(text("Hello 世界 & <test>"), "Hello 世界 &amp; &lt;test&gt;");
    }

    #[test]
    fn test_appends_to_existing_output() {
        let mut output = "prefix: ".to_string();
        escape_text(&mut output, "<tag>");
        assert_eq!(output, "prefix: &lt;tag&gt;");
    }

    #[test]
    fn test_quotes_are_kept_in_text() {
        assert_eq!(text(r#"say "hi""#), r#"say "hi""#);
    }

    #[test]
    fn test_script_in_attribute() {
        assert_eq!(
            attr(r#""<script>alert("problem")</script>""#),
            "&quot;&lt;script&gt;alert(&quot;problem&quot;)&lt;/script&gt;&quot;"
        );
    }

    #[test]
    fn test_single_quote_in_attribute() {
        assert_eq!(attr("it's"), "it&#39;s");
    }

    #[test]
    fn test_attribute_name_filter() {
        let mut output = String::new();
        assert!(push_attribute_name(&mut output, "data-x"));
        assert!(!push_attribute_name(&mut output, "\"><"));
        assert!(push_attribute_name(&mut output, " on load"));
        assert_eq!(output, "data-xonload");
    }
}
