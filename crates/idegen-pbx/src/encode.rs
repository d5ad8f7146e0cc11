//! Quoting and escaping of text values, byte-for-byte as Xcode writes them.

use std::borrow::Cow;

use crate::Layout;

/// Replacements for the control characters 0x00..=0x1F in indented blocks.
/// Carriage return is written as `\n`, same as line feed.
const ESCAPES: [&str; 32] = [
    "\\U0000", "\\U0001", "\\U0002", "\\U0003", "\\U0004", "\\U0005", "\\U0006", "\\a",
    "\\b", "\\t", "\\n", "\\v", "\\f", "\\n", "\\U000e", "\\U000f",
    "\\U0010", "\\U0011", "\\U0012", "\\U0013", "\\U0014", "\\U0015", "\\U0016", "\\U0017",
    "\\U0018", "\\U0019", "\\U001a", "\\U001b", "\\U001c", "\\U001d", "\\U001e", "\\U001f",
];

/// Same as [`ESCAPES`], except that tab, line feed and vertical tab pass
/// through unescaped inside single-line objects.
const SINGLE_LINE_ESCAPES: [&str; 32] = [
    "\\U0000", "\\U0001", "\\U0002", "\\U0003", "\\U0004", "\\U0005", "\\U0006", "\\a",
    "\\b", "\t", "\n", "\u{b}", "\\f", "\\n", "\\U000e", "\\U000f",
    "\\U0010", "\\U0011", "\\U0012", "\\U0013", "\\U0014", "\\U0015", "\\U0016", "\\U0017",
    "\\U0018", "\\U0019", "\\U001a", "\\U001b", "\\U001c", "\\U001d", "\\U001e", "\\U001f",
];

/// A string can be written without quotes when it is non-empty, uses only
/// `A-Za-z0-9$./_` and has no run of three underscores.
pub fn is_bare(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'$' | b'.' | b'/' | b'_'))
        && !value.contains("___")
}

/// Encode `value` for output within an object of the given layout.
pub fn encode_string(value: &str, layout: Layout) -> Cow<'_, str> {
    if is_bare(value) {
        return Cow::Borrowed(value);
    }

    let table = match layout {
        Layout::SingleLine => &SINGLE_LINE_ESCAPES,
        Layout::MultiLine => &ESCAPES,
    };

    let mut encoded = String::with_capacity(value.len() + 2);
    encoded.push('"');
    for c in value.chars() {
        match c {
            '\\' => encoded.push_str("\\\\"),
            '"' => encoded.push_str("\\\""),
            c if (c as u32) < 0x20 => encoded.push_str(table[c as usize]),
            c => encoded.push(c),
        }
    }
    encoded.push('"');
    Cow::Owned(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multi(value: &str) -> String {
        encode_string(value, Layout::MultiLine).into_owned()
    }

    fn single(value: &str) -> String {
        encode_string(value, Layout::SingleLine).into_owned()
    }

    #[test]
    fn bare_strings() {
        assert_eq!(multi("abc"), "abc");
        assert_eq!(multi("a.b$c_d"), "a.b$c_d");
        assert_eq!(multi("../src/main.c"), "../src/main.c");
        assert_eq!(multi("__a__"), "__a__");
    }

    #[test]
    fn quoted_strings() {
        assert_eq!(multi(""), "\"\"");
        assert_eq!(multi("___"), "\"___\"");
        assert_eq!(single("a___b"), "\"a___b\"");
        assert_eq!(multi("has space"), "\"has space\"");
        assert_eq!(multi("<group>"), "\"<group>\"");
        assert_eq!(multi("back\\slash"), "\"back\\\\slash\"");
        assert_eq!(multi("\""), "\"\\\"\"");
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(multi("caf\u{e9}"), "\"caf\u{e9}\"");
    }

    #[test]
    fn control_characters_multi_line() {
        let expected = [
            (0u8, "\\U0000"),
            (1, "\\U0001"),
            (7, "\\a"),
            (8, "\\b"),
            (9, "\\t"),
            (10, "\\n"),
            (11, "\\v"),
            (12, "\\f"),
            (13, "\\n"),
            (14, "\\U000e"),
            (27, "\\U001b"),
            (31, "\\U001f"),
        ];
        for (byte, escape) in expected {
            let value = (byte as char).to_string();
            assert_eq!(multi(&value), format!("\"{escape}\""), "byte {byte}");
        }
    }

    #[test]
    fn control_characters_single_line() {
        assert_eq!(single("\t"), "\"\t\"");
        assert_eq!(single("\n"), "\"\n\"");
        assert_eq!(single("\u{b}"), "\"\u{b}\"");
        assert_eq!(single("\r"), "\"\\n\"");
        assert_eq!(single("\u{c}"), "\"\\f\"");
        assert_eq!(single("\u{7}"), "\"\\a\"");
        assert_eq!(single("\u{1f}"), "\"\\U001f\"");
    }

    #[test]
    fn every_control_character_is_escaped_or_literal() {
        for byte in 0u8..0x20 {
            let value = (byte as char).to_string();
            let multi = multi(&value);
            let escape = match byte {
                7 => "\\a".to_string(),
                8 => "\\b".to_string(),
                9 => "\\t".to_string(),
                10 | 13 => "\\n".to_string(),
                11 => "\\v".to_string(),
                12 => "\\f".to_string(),
                _ => format!("\\U{byte:04x}"),
            };
            assert_eq!(multi, format!("\"{escape}\""), "byte {byte}");

            let single = single(&value);
            if matches!(byte, 9 | 10 | 11) {
                assert_eq!(single, format!("\"{value}\""));
            } else {
                assert_eq!(single, multi, "byte {byte}");
            }
        }
    }
}
