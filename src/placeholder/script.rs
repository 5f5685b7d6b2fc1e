//! Script stand-in: writes one `<script>` tag per child.

use super::PlaceholderGenerator;
use std::fmt::Write;

/// Loads each child script in order with `document.write`, falling back to
/// inserting `<script>` elements when the document is already closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptPlaceholder;

impl PlaceholderGenerator for ScriptPlaceholder {
    fn target_extension(&self) -> &'static str {
        ".js"
    }

    fn render(&self, suffix: &str, children: &[&str]) -> String {
        let mut tags = String::new();
        let mut inserts = String::new();
        for child in children {
            let src = escape_js_string(&format!("{child}{suffix}"));
            // escaped `<` so the literal never closes an enclosing <script>
            let _ = writeln!(
                tags,
                "\t\tdocument.write('\\u003cscript type=\"text/javascript\" src=\"{src}\">\\u003c/script>');"
            );
            let _ = writeln!(
                inserts,
                "\t\ts = d.createElement('script'); s.type = 'text/javascript'; s.async = false; s.src = '{src}'; p.insertBefore(s, f);"
            );
        }

        let mut out = String::new();
        out.push_str("(function () {\n");
        out.push_str("\ttry {\n");
        out.push_str(&tags);
        out.push_str("\t} catch (ex) {\n");
        out.push_str("\t\tvar s, d = document, f = d.getElementsByTagName('script')[0], p = f.parentNode;\n");
        out.push_str(&inserts);
        out.push_str("\t}\n");
        out.push_str("})();\n");
        out
    }
}

/// Escape for a single-quoted JavaScript string literal.
fn escape_js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}
