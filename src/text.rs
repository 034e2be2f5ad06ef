//! Fixed-capacity text types and display line wrapping.

use heapless::String;

use crate::config::{NAME_LEN, TEXT_LEN};

/// Client ids, user names and option labels.
pub type Name = String<NAME_LEN>;

/// Message bodies, questions and composed text.
pub type Text = String<TEXT_LEN>;

/// Copy `value` into a bounded string, or `None` if it does not fit.
pub fn bounded<const N: usize>(value: &str) -> Option<String<N>> {
    let mut out = String::new();
    out.push_str(value).ok()?;
    Some(out)
}

/// Copy as much of `value` as fits, cutting on a character boundary.
pub fn truncated<const N: usize>(value: &str) -> String<N> {
    let mut out = String::new();
    for c in value.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// One entry per non-blank line of `text`, trimmed and cut to `L` bytes.
/// Lines past the first `N` entries are ignored.
pub fn parse_list<const L: usize, const N: usize>(text: &str) -> heapless::Vec<String<L>, N> {
    let mut entries = heapless::Vec::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if entries.push(truncated(line)).is_err() {
            debug!("list: keeping the first {} entries", N);
            break;
        }
    }
    entries
}

/// The trailing `columns` characters of `value`.
pub fn tail(value: &str, columns: usize) -> &str {
    let count = value.chars().count();
    if count <= columns {
        return value;
    }
    let skip = count - columns;
    match value.char_indices().nth(skip) {
        Some((at, _)) => &value[at..],
        None => "",
    }
}

/// Split `text` into display rows of at most `columns` characters.
pub fn wrap(text: &str, columns: usize) -> Wrapped<'_> {
    Wrapped {
        rest: text,
        columns: columns.max(1),
    }
}

/// Iterator returned by [`wrap`].
pub struct Wrapped<'a> {
    rest: &'a str,
    columns: usize,
}

impl<'a> Iterator for Wrapped<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let split = self
            .rest
            .char_indices()
            .nth(self.columns)
            .map_or(self.rest.len(), |(at, _)| at);
        let (line, rest) = self.rest.split_at(split);
        self.rest = rest;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_splits_on_column_count() {
        let rows: Vec<&str> = wrap("Q:Tea? R:Yes please", 8).collect();
        assert_eq!(rows, ["Q:Tea? R", ":Yes ple", "ase"]);
    }

    #[test]
    fn wrap_of_empty_text_yields_nothing() {
        assert_eq!(wrap("", 16).count(), 0);
    }

    #[test]
    fn wrap_respects_multibyte_characters() {
        let rows: Vec<&str> = wrap("héllo", 2).collect();
        assert_eq!(rows, ["hé", "ll", "o"]);
    }

    #[test]
    fn bounded_rejects_overflow() {
        assert_eq!(bounded::<4>("abcd").as_deref(), Some("abcd"));
        assert!(bounded::<4>("abcde").is_none());
    }

    #[test]
    fn truncated_keeps_prefix() {
        let value: String<3> = truncated("abcdef");
        assert_eq!(value.as_str(), "abc");
    }

    #[test]
    fn list_skips_blank_lines_and_trims() {
        let list: heapless::Vec<Name, 4> = parse_list("Bob\n\n  Ann \r\n");
        assert_eq!(list, [truncated::<NAME_LEN>("Bob"), truncated("Ann")]);
    }

    #[test]
    fn list_stops_at_capacity() {
        let list: heapless::Vec<String<4>, 2> = parse_list("alpha\nbeta\ngamma\n");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].as_str(), "alph");
        assert_eq!(list[1].as_str(), "beta");
    }

    #[test]
    fn tail_keeps_last_columns() {
        assert_eq!(tail("abcdef", 4), "cdef");
        assert_eq!(tail("ab", 4), "ab");
    }
}
