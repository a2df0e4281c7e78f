//! Axis label text helpers

/// Wrap a nominee name for a narrow band.
///
/// First whitespace-separated token on line one, the remainder on line
/// two. Names without whitespace longer than `split_at` characters are
/// hard-split.
pub fn wrap_label(name: &str, split_at: usize) -> Vec<String> {
    let name = name.trim();
    if name.is_empty() {
        return Vec::new();
    }

    if let Some((first, rest)) = name.split_once(char::is_whitespace) {
        let rest = rest.trim_start();
        if rest.is_empty() {
            return vec![first.to_string()];
        }
        return vec![first.to_string(), rest.to_string()];
    }

    let split_at = split_at.max(1);
    if name.chars().count() > split_at {
        let head: String = name.chars().take(split_at).collect();
        let tail: String = name.chars().skip(split_at).collect();
        return vec![head, tail];
    }

    vec![name.to_string()]
}

/// Format a tick value; whole numbers print without decimals
pub fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Escape text for XML content and attribute values
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_word_name() {
        assert_eq!(wrap_label("Alice Smith", 12), vec!["Alice", "Smith"]);
    }

    #[test]
    fn test_remainder_kept_together() {
        assert_eq!(
            wrap_label("Mary Jane Watson", 12),
            vec!["Mary", "Jane Watson"]
        );
    }

    #[test]
    fn test_short_single_token() {
        assert_eq!(wrap_label("Bob", 12), vec!["Bob"]);
    }

    #[test]
    fn test_long_single_token_hard_split() {
        assert_eq!(
            wrap_label("Supercalifragilistic", 12),
            vec!["Supercalifra", "gilistic"]
        );
    }

    #[test]
    fn test_hard_split_counts_characters() {
        assert_eq!(wrap_label("ÉÉÉÉÉ", 3), vec!["ÉÉÉ", "ÉÉ"]);
    }

    #[test]
    fn test_blank_name() {
        assert!(wrap_label("   ", 12).is_empty());
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(12.0), "12");
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(2.5), "2.5");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Tom & \"Jerry\" <3"), "Tom &amp; &quot;Jerry&quot; &lt;3");
    }
}
