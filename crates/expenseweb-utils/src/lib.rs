//! Utility functions and helpers

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            grouped.push(',');
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let int_part: String = grouped.chars().rev().collect();

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, int_part, f),
        None => format!("{}{}", sign, int_part),
    }
}

/// Format a money amount, e.g. `1,234.50 EUR`
pub fn format_amount(value: f64, currency: &str, decimal_places: usize) -> String {
    let number = format_number(format!("{:.*}", decimal_places, value));
    if currency.is_empty() {
        number
    } else {
        format!("{} {}", number, currency)
    }
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Generate a unique ID (millisecond timestamp plus a process-wide counter)
pub fn generate_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", now, seq)
}

/// Parse an `application/x-www-form-urlencoded` body into ordered pairs.
///
/// Repeated keys (multi-selects, checkbox groups) are kept. `+` decodes to a
/// space.
pub fn parse_form_pairs(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|p| !p.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Parse a urlencoded body into a map; later duplicates win
pub fn parse_form_body(body: &str) -> HashMap<String, String> {
    parse_form_pairs(body).into_iter().collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number("-1234.50"), "-1,234.50");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234.5, "EUR", 2), "1,234.50 EUR");
        assert_eq!(format_amount(-3.0, "", 0), "-3");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_generate_id_is_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_form_body() {
        let params = parse_form_body("category=Food+%26+Drink&sub_category=&amount=12.5&flag");
        assert_eq!(params["category"], "Food & Drink");
        assert_eq!(params["sub_category"], "");
        assert_eq!(params["amount"], "12.5");
        assert_eq!(params["flag"], "");
        assert!(parse_form_body("").is_empty());
    }

    #[test]
    fn test_parse_form_pairs_keeps_repeats() {
        let pairs = parse_form_pairs("access_scope=balances&access_scope=details");
        let scopes: Vec<&str> = pairs.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(scopes, vec!["balances", "details"]);
    }
}
