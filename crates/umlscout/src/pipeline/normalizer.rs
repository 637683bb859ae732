//! Source text normalization
//!
//! Removes comments, preprocessor directives and marker-only lines. The
//! output keeps the line structure of the input: every removed line
//! becomes an empty line, and block comments keep their newlines.

use tracing::trace;

use crate::dialects::Dialect;

/// Per-dialect comment and decoration stripper
pub struct SourceNormalizer<'d> {
    dialect: &'d Dialect,
}

impl<'d> SourceNormalizer<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self { dialect }
    }

    pub fn normalize(&self, text: &str) -> String {
        let stripped = strip_comments(text);
        let mut out = Vec::new();
        let mut in_directive = false;
        let mut blanked = 0usize;

        for line in stripped.lines() {
            let trimmed = line.trim();

            let directive = in_directive || trimmed.starts_with('#');
            in_directive = directive && trimmed.ends_with('\\');

            if directive || self.is_marker_only(trimmed) {
                if !trimmed.is_empty() {
                    blanked += 1;
                }
                out.push("");
            } else {
                out.push(line);
            }
        }

        trace!(blanked, "Normalized source");
        out.join("\n")
    }

    /// A line holding nothing but a bare visibility keyword or a decoration token
    fn is_marker_only(&self, trimmed: &str) -> bool {
        matches!(trimmed, "public" | "protected" | "private")
            || self.dialect.is_decoration_line(trimmed)
    }
}

/// Remove `//` and `/* */` comments
///
/// Comment markers inside string literals are not special-cased.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                // Line comment: drop up to, not including, the newline
                while chars.peek().is_some_and(|&n| n != '\n') {
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                // Keep tokens on either side of an inline block comment apart
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(dialect: Dialect, text: &str) -> String {
        SourceNormalizer::new(&dialect).normalize(text)
    }

    #[test]
    fn test_strip_line_and_block_comments() {
        let text = "int a; // trailing\n/* block\n spanning */int b;\nint/*x*/c;";
        let out = strip_comments(text);
        assert_eq!(out, "int a; \n\n int b;\nint c;");
    }

    #[test]
    fn test_strip_comments_is_not_literal_aware() {
        let out = strip_comments("const char* url = \"http://example\";");
        assert_eq!(out, "const char* url = \"http:");
    }

    #[test]
    fn test_line_count_preserved() {
        let text = "#include \"A.h\"\n/* one\ntwo */\nclass A {\n};\n";
        let out = normalize(Dialect::cpp(), text);
        assert_eq!(out.lines().count(), text.lines().count());
    }

    #[test]
    fn test_preprocessor_lines_and_continuations_blanked() {
        let text = "#define BIG(x) \\\n  do { x; } \\\n  while (0)\nclass A {};";
        let out = normalize(Dialect::cpp(), text);
        assert_eq!(out, "\n\n\nclass A {};");
    }

    #[test]
    fn test_marker_only_lines_blanked() {
        let text = "class A {\n  GENERATED_BODY()\n  public\n  const override\npublic:\n  int X;\n};";
        let out = normalize(Dialect::unreal(), text);
        assert_eq!(out, "class A {\n\n\n\npublic:\n  int X;\n};");
    }

    #[test]
    fn test_decorations_are_dialect_specific() {
        let out = normalize(Dialect::cpp(), "GENERATED_BODY()");
        assert_eq!(out, "GENERATED_BODY()");
    }
}
