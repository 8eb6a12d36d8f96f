//! Natural (numeric-aware) string ordering
//!
//! `"port2" < "port10"`, letters compare case-insensitively first. Ties are
//! broken by plain lexical order so the result is `Equal` only for equal
//! strings.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;
    for (idx, ch) in s.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match in_digits {
            Some(current) if current != is_digit => {
                out.push(make_chunk(&s[start..idx], current));
                start = idx;
                in_digits = Some(is_digit);
            }
            None => in_digits = Some(is_digit),
            _ => {}
        }
    }
    if let Some(current) = in_digits {
        out.push(make_chunk(&s[start..], current));
    }
    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(s)
    } else {
        Chunk::Text(s)
    }
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    let a_low = a.chars().flat_map(char::to_lowercase);
    let b_low = b.chars().flat_map(char::to_lowercase);
    a_low.cmp(b_low)
}

/// Compare two strings in natural order
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let a_chunks = chunks(a);
    let b_chunks = chunks(b);
    for (ca, cb) in a_chunks.iter().zip(b_chunks.iter()) {
        let ord = match (ca, cb) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => cmp_text(x, y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_chunks
        .len()
        .cmp(&b_chunks.len())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_runs_compare_by_value() {
        assert_eq!(natural_cmp("port2", "port10"), Ordering::Less);
        assert_eq!(natural_cmp("10", "9"), Ordering::Greater);
        assert_eq!(natural_cmp("a1b2", "a1b10"), Ordering::Less);
    }

    #[test]
    fn test_case_insensitive_with_lexical_tiebreak() {
        assert_eq!(natural_cmp("Album", "album"), "Album".cmp("album"));
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
    }

    #[test]
    fn test_equal_only_for_identical_strings() {
        assert_eq!(natural_cmp("x01", "x01"), Ordering::Equal);
        assert_ne!(natural_cmp("x01", "x1"), Ordering::Equal);
        assert_ne!(natural_cmp("", "0"), Ordering::Equal);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("eth", "eth0"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }
}
