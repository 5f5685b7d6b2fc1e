//! Flat `key=value` table format for the generated CDN map files.
//!
//! One entry per line, in the order written. Reserved characters in keys and
//! values are backslash-escaped so a line-oriented reader can split on the
//! first unescaped `=`:
//!
//! | char                  | written as      |
//! |-----------------------|-----------------|
//! | `:` `=` `#` `!` space | `\:` `\=` ...   |
//! | tab, LF, CR           | `\t` `\n` `\r`  |
//! | `\`                   | `\\`            |
//!
//! List values (child links) are joined with `|`; a `|` inside an item is
//! written as `\|`.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

/// Separator between the items of a list value.
pub const LIST_SEPARATOR: char = '|';

#[inline]
const fn is_reserved(ch: char) -> bool {
    matches!(ch, ':' | '=' | '#' | '!' | ' ' | '\t' | '\n' | '\r' | '\\')
}

/// Escape a key or value.
pub fn escape(value: &str) -> Cow<'_, str> {
    escape_with(value, &[])
}

/// Escape a list item (also escapes the list separator).
pub fn escape_item(value: &str) -> Cow<'_, str> {
    escape_with(value, &[LIST_SEPARATOR])
}

fn escape_with<'a>(value: &'a str, extra: &[char]) -> Cow<'a, str> {
    let needs_escape = |ch: char| is_reserved(ch) || extra.contains(&ch);
    if !value.chars().any(needs_escape) {
        // nothing to escape, borrow entire string
        return Cow::Borrowed(value);
    }

    let mut output = String::with_capacity(value.len() * 2);
    for ch in value.chars() {
        if !needs_escape(ch) {
            output.push(ch);
            continue;
        }
        output.push('\\');
        output.push(match ch {
            '\t' => 't',
            '\n' => 'n',
            '\r' => 'r',
            other => other,
        });
    }
    Cow::Owned(output)
}

/// Reverse [`escape`]: `\t` `\n` `\r` map back to control characters, any
/// other escaped character stands for itself.
pub fn unescape(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => output.push('\t'),
            Some('n') => output.push('\n'),
            Some('r') => output.push('\r'),
            Some(other) => output.push(other),
            None => {}
        }
    }
    output
}

/// Split `raw` at every unescaped `separator`, keeping escapes intact.
fn split_unescaped(raw: &str, separator: char, limit: Option<usize>) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, ch) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
        } else if ch == separator && limit.is_none_or(|max| parts.len() + 1 < max) {
            parts.push(&raw[start..i]);
            start = i + ch.len_utf8();
        }
    }
    parts.push(&raw[start..]);
    parts
}

/// Format one `key=value` line (without the line terminator).
pub fn format_entry(key: &str, value: &str) -> String {
    format!("{}={}", escape(key), escape(value))
}

/// Format one list entry: `key=item|item|...`.
pub fn format_list_entry<I, S>(key: &str, items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let value = items
        .into_iter()
        .map(|item| escape_item(item.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join("|");
    format!("{}={}", escape(key), value)
}

/// Parse one line into an unescaped `(key, value)` pair.
///
/// Returns `None` for blank lines, comments (`#` or `!`), and lines without
/// an unescaped `=`.
pub fn parse_line(line: &str) -> Option<(String, String)> {
    if line.trim().is_empty() || line.starts_with('#') || line.starts_with('!') {
        return None;
    }
    match split_unescaped(line, '=', Some(2)).as_slice() {
        [key, value] => Some((unescape(key), unescape(value))),
        _ => None,
    }
}

/// Parse one list line into its key and unescaped items.
pub fn parse_list_line(line: &str) -> Option<(String, Vec<String>)> {
    if line.trim().is_empty() || line.starts_with('#') || line.starts_with('!') {
        return None;
    }
    match split_unescaped(line, '=', Some(2)).as_slice() {
        [key, value] => {
            let items = split_unescaped(value, LIST_SEPARATOR, None)
                .into_iter()
                .filter(|item| !item.is_empty())
                .map(unescape)
                .collect();
            Some((unescape(key), items))
        }
        _ => None,
    }
}

/// Write `key=value` lines in iteration order.
pub fn write_entries<'a, W, I>(writer: &mut W, entries: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut count = 0;
    for (key, value) in entries {
        writeln!(writer, "{}", format_entry(key, value))?;
        count += 1;
    }
    Ok(count)
}

/// Read every `key=value` line of a table.
pub fn read_entries(reader: impl BufRead) -> io::Result<Vec<(String, String)>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        if let Some(entry) = parse_line(&line?) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_value_is_borrowed() {
        assert!(matches!(escape("/cdn/abc.js"), Cow::Borrowed("/cdn/abc.js")));
    }

    #[test]
    fn test_escape_reserved_chars() {
        assert_eq!(escape("http://x"), "http\\://x");
        assert_eq!(escape("a=b#c!d e"), "a\\=b\\#c\\!d\\ e");
        assert_eq!(escape("tab\there\nline\r"), "tab\\there\\nline\\r");
        assert_eq!(escape("c:\\dir"), "c\\:\\\\dir");
    }

    #[test]
    fn test_escape_item_separator() {
        assert_eq!(escape_item("/a|b.png"), "/a\\|b.png");
        assert_eq!(escape("/a|b.png"), "/a|b.png");
    }

    #[test]
    fn test_round_trip_every_reserved_char() {
        let key = "/odd path/with=equals:colon#hash!bang\\slash\ttab.css";
        let value = "/cdn/ab cd=ef\r\n.css";
        let line = format_entry(key, value);
        assert!(!line.contains('\n'));
        assert_eq!(parse_line(&line), Some((key.to_string(), value.to_string())));
    }

    #[test]
    fn test_round_trip_list() {
        let items = ["/img/a.png", "/img/b|c.png", "/img/d e.png"];
        let line = format_list_entry("/all.merge", items);
        assert_eq!(line, "/all.merge=/img/a.png|/img/b\\|c.png|/img/d\\ e.png");
        let (key, parsed) = parse_list_line(&line).unwrap();
        assert_eq!(key, "/all.merge");
        assert_eq!(parsed, items);
    }

    #[test]
    fn test_parse_line_skips_comments_and_blanks() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("# comment"), None);
        assert_eq!(parse_line("! comment"), None);
        assert_eq!(parse_line("no separator"), None);
        assert_eq!(
            parse_line("/a.js=/cdn/x.js"),
            Some(("/a.js".to_string(), "/cdn/x.js".to_string()))
        );
    }

    #[test]
    fn test_write_and_read_entries() {
        let mut buffer = Vec::new();
        let written = write_entries(
            &mut buffer,
            [("/b.js", "/cdn/2.js"), ("/a.js", "/cdn/1.js")],
        )
        .unwrap();
        assert_eq!(written, 2);

        let entries = read_entries(&buffer[..]).unwrap();
        assert_eq!(
            entries,
            vec![
                ("/b.js".to_string(), "/cdn/2.js".to_string()),
                ("/a.js".to_string(), "/cdn/1.js".to_string()),
            ]
        );
    }
}
