//! Stylesheet stand-in: one `@import` per child.

use super::PlaceholderGenerator;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct StylePlaceholder;

impl PlaceholderGenerator for StylePlaceholder {
    fn target_extension(&self) -> &'static str {
        ".css"
    }

    fn render(&self, suffix: &str, children: &[&str]) -> String {
        let mut out = String::from("/* debug stand-in: imports each merged stylesheet */\n");
        for child in children {
            let _ = writeln!(out, "@import url({});", quote_url(&format!("{child}{suffix}")));
        }
        out
    }
}

/// Quote a URL only when it holds characters an unquoted `url()` rejects.
fn quote_url(url: &str) -> String {
    if url
        .chars()
        .any(|ch| ch.is_whitespace() || matches!(ch, '(' | ')' | '\'' | '"' | '\\'))
    {
        let escaped = url.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_imports() {
        let body = StylePlaceholder.render("?abc", &["/cdn/1.css", "/cdn/debug/2.css"]);
        let lines: Vec<_> = body.lines().collect();
        assert!(lines[0].starts_with("/*"));
        assert_eq!(lines[1], "@import url(/cdn/1.css?abc);");
        assert_eq!(lines[2], "@import url(/cdn/debug/2.css?abc);");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_quote_url() {
        assert_eq!(quote_url("/cdn/a.css?x"), "/cdn/a.css?x");
        assert_eq!(quote_url("/my dir/a.css"), "\"/my dir/a.css\"");
    }
}
