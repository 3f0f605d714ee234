//! HTML entity encoding and decoding.

use std::collections::HashMap;

lazy_static::lazy_static! {
    static ref ENTITIES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        // Markup structure
        m.insert("lt", "<");
        m.insert("gt", ">");
        m.insert("amp", "&");
        m.insert("quot", "\"");
        m.insert("apos", "'");
        // Typography
        m.insert("nbsp", "\u{00A0}");
        m.insert("shy", "\u{00AD}");
        m.insert("copy", "\u{00A9}");
        m.insert("reg", "\u{00AE}");
        m.insert("trade", "\u{2122}");
        m.insert("hellip", "\u{2026}");
        m.insert("mdash", "\u{2014}");
        m.insert("ndash", "\u{2013}");
        m.insert("ldquo", "\u{201C}");
        m.insert("rdquo", "\u{201D}");
        m.insert("lsquo", "\u{2018}");
        m.insert("rsquo", "\u{2019}");
        m.insert("laquo", "\u{00AB}");
        m.insert("raquo", "\u{00BB}");
        m.insert("bull", "\u{2022}");
        m.insert("middot", "\u{00B7}");
        m.insert("sect", "\u{00A7}");
        m.insert("para", "\u{00B6}");
        m.insert("dagger", "\u{2020}");
        m.insert("iexcl", "\u{00A1}");
        m.insert("iquest", "\u{00BF}");
        // Math and units
        m.insert("times", "\u{00D7}");
        m.insert("divide", "\u{00F7}");
        m.insert("plusmn", "\u{00B1}");
        m.insert("deg", "\u{00B0}");
        m.insert("micro", "\u{00B5}");
        m.insert("frac14", "\u{00BC}");
        m.insert("frac12", "\u{00BD}");
        m.insert("frac34", "\u{00BE}");
        m.insert("sup1", "\u{00B9}");
        m.insert("sup2", "\u{00B2}");
        m.insert("sup3", "\u{00B3}");
        m.insert("le", "\u{2264}");
        m.insert("ge", "\u{2265}");
        m.insert("ne", "\u{2260}");
        m.insert("larr", "\u{2190}");
        m.insert("rarr", "\u{2192}");
        // Currency
        m.insert("euro", "\u{20AC}");
        m.insert("pound", "\u{00A3}");
        m.insert("yen", "\u{00A5}");
        m.insert("cent", "\u{00A2}");
        // Latin letters
        m.insert("Agrave", "\u{00C0}");
        m.insert("Aacute", "\u{00C1}");
        m.insert("Auml", "\u{00C4}");
        m.insert("Ccedil", "\u{00C7}");
        m.insert("Eacute", "\u{00C9}");
        m.insert("Ouml", "\u{00D6}");
        m.insert("Uuml", "\u{00DC}");
        m.insert("szlig", "\u{00DF}");
        m.insert("agrave", "\u{00E0}");
        m.insert("aacute", "\u{00E1}");
        m.insert("auml", "\u{00E4}");
        m.insert("ccedil", "\u{00E7}");
        m.insert("egrave", "\u{00E8}");
        m.insert("eacute", "\u{00E9}");
        m.insert("ntilde", "\u{00F1}");
        m.insert("ouml", "\u{00F6}");
        m.insert("uuml", "\u{00FC}");
        // Greek
        m.insert("alpha", "\u{03B1}");
        m.insert("beta", "\u{03B2}");
        m.insert("gamma", "\u{03B3}");
        m.insert("delta", "\u{03B4}");
        m.insert("epsilon", "\u{03B5}");
        m.insert("pi", "\u{03C0}");
        m.insert("sigma", "\u{03C3}");
        m.insert("omega", "\u{03C9}");
        m
    };
}

/// Escape the reserved markup characters `& < > " '`.
pub fn escape(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Decode named and numeric character references.
///
/// References that cannot be decoded are kept verbatim.
pub fn unescape(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut found_end = false;

        while let Some(&next_ch) = chars.peek() {
            if next_ch == ';' {
                chars.next();
                found_end = true;
                break;
            } else if next_ch.is_ascii_alphanumeric() || (next_ch == '#' && entity.is_empty()) {
                entity.push(next_ch);
                chars.next();
            } else {
                break;
            }

            // Limit entity length to prevent runaway scans
            if entity.len() > 32 {
                break;
            }
        }

        if found_end && !entity.is_empty() {
            if let Some(numeric) = entity.strip_prefix('#') {
                if let Some(decoded) = decode_numeric(numeric) {
                    result.push(decoded);
                    continue;
                }
            } else if let Some(&decoded) = ENTITIES.get(entity.as_str()) {
                result.push_str(decoded);
                continue;
            }
        }

        result.push('&');
        result.push_str(&entity);
        if found_end {
            result.push(';');
        }
    }

    result
}

fn decode_numeric(num_str: &str) -> Option<char> {
    let (radix, digits) = match num_str.strip_prefix(['x', 'X']) {
        Some(hex) => (16, hex),
        None => (10, num_str),
    };
    if digits.is_empty() {
        return None;
    }

    let code_point = u32::from_str_radix(digits, radix).ok()?;
    Some(char::from_u32(code_point).unwrap_or('\u{FFFD}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_reserved() {
        assert_eq!(escape("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
        assert_eq!(escape("Tom & Jerry's"), "Tom &amp; Jerry&apos;s");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_unescape_basic_entities() {
        assert_eq!(unescape("&lt;"), "<");
        assert_eq!(unescape("&gt;"), ">");
        assert_eq!(unescape("&amp;"), "&");
        assert_eq!(unescape("&quot;"), "\"");
        assert_eq!(unescape("&apos;"), "'");
    }

    #[test]
    fn test_unescape_numeric_entities() {
        assert_eq!(unescape("&#65;"), "A");
        assert_eq!(unescape("&#x41;"), "A");
        assert_eq!(unescape("Let&#x27;s go"), "Let's go");
        assert_eq!(unescape("&#x1F600;"), "\u{1F600}");
        assert_eq!(unescape("&#xD800;"), "\u{FFFD}");
    }

    #[test]
    fn test_unescape_unknown_or_incomplete() {
        assert_eq!(unescape("&unknown;"), "&unknown;");
        assert_eq!(unescape("&lt"), "&lt");
        assert_eq!(unescape("&"), "&");
        assert_eq!(unescape("&#;"), "&#;");
        assert_eq!(unescape("a & b"), "a & b");
    }

    #[test]
    fn test_unescape_does_not_double_decode() {
        assert_eq!(unescape("&amp;amp;"), "&amp;");
        assert_eq!(unescape("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_escape_round_trip() {
        for s in ["<", ">", "&", "'", "\"", "<a href='x'>\"&amp;\"</a>", "&&&;;<>"] {
            assert_eq!(unescape(&escape(s)), s);
        }
    }

    #[test]
    fn test_unescape_named_typography() {
        assert_eq!(unescape("&nbsp;"), "\u{00A0}");
        assert_eq!(unescape("&copy; 2024"), "\u{00A9} 2024");
        assert_eq!(unescape("caf&eacute;"), "caf\u{00E9}");
    }
}
