//! Balanced-delimiter scanning over source text
//!
//! Everything here tracks string and character literal state, so a `{`
//! inside `"{"` or `'}'` never moves a body extent. It is still a
//! heuristic: there is no preprocessor and no real tokenizer.

/// Lexical state while walking source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    Str,
    /// C# `@"..."` string, where `""` is the only escape
    Verbatim,
    Char,
}

/// Byte-level cursor that knows whether it is inside a literal
struct LiteralTracker {
    state: LexState,
    escaped: bool,
}

impl LiteralTracker {
    fn new() -> Self {
        Self {
            state: LexState::Code,
            escaped: false,
        }
    }

    /// Feed the byte at `i`; returns true when that byte is code, not literal content
    fn step(&mut self, bytes: &[u8], i: usize) -> bool {
        let b = bytes[i];
        match self.state {
            LexState::Code => match b {
                b'"' => {
                    self.state = if i > 0 && bytes[i - 1] == b'@' {
                        LexState::Verbatim
                    } else {
                        LexState::Str
                    };
                    false
                }
                b'\'' if !is_digit_separator(bytes, i) => {
                    self.state = LexState::Char;
                    false
                }
                _ => true,
            },
            LexState::Str | LexState::Char => {
                let closing = if self.state == LexState::Str { b'"' } else { b'\'' };
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == closing || b == b'\n' {
                    // Unterminated literals end at the line break
                    self.state = LexState::Code;
                }
                false
            }
            LexState::Verbatim => {
                if b == b'"' {
                    if bytes.get(i + 1) == Some(&b'"') {
                        self.escaped = true;
                    } else if self.escaped {
                        self.escaped = false;
                    } else {
                        self.state = LexState::Code;
                    }
                }
                false
            }
        }
    }
}

/// `1'000'000` style digit separators are not character literals
fn is_digit_separator(bytes: &[u8], i: usize) -> bool {
    i > 0
        && bytes[i - 1].is_ascii_alphanumeric()
        && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit())
        && bytes[..i]
            .iter()
            .rev()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'\'')
            .last()
            .is_some_and(|b| b.is_ascii_digit())
}

fn closing_for(open: u8) -> Option<u8> {
    match open {
        b'{' => Some(b'}'),
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'<' => Some(b'>'),
        _ => None,
    }
}

/// Find the delimiter that closes the one at `open_at`
///
/// Starts at depth zero on the opening delimiter, increments on every
/// opener and decrements on every closer, and stops when depth returns
/// to zero. Returns `None` if the text ends first.
pub fn find_matching(text: &str, open_at: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let open = *bytes.get(open_at)?;
    let close = closing_for(open)?;
    let mut tracker = LiteralTracker::new();
    let mut depth = 0usize;

    for i in open_at..bytes.len() {
        if !tracker.step(bytes, i) {
            continue;
        }
        if bytes[i] == open {
            depth += 1;
        } else if bytes[i] == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Index just past the block opened at `open_at`, or the end of the text
pub fn skip_block(text: &str, open_at: usize) -> usize {
    find_matching(text, open_at)
        .map(|close| close + 1)
        .unwrap_or(text.len())
}

/// Byte offsets of every code (non-literal) byte in `text`
///
/// Yields `(index, byte)` pairs, skipping bytes inside string and
/// character literals, including their quotes.
pub fn code_bytes(text: &str) -> impl Iterator<Item = (usize, u8)> + '_ {
    let bytes = text.as_bytes();
    let mut tracker = LiteralTracker::new();
    (0..bytes.len()).filter_map(move |i| tracker.step(bytes, i).then_some((i, bytes[i])))
}

/// Non-ASCII bytes count as identifier bytes, so a run of them always
/// covers whole UTF-8 characters.
pub fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || !b.is_ascii()
}

pub fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii()
}

/// Whether `word` is a plain identifier
pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Identifiers outside literals, with their byte offsets
pub fn identifiers(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut last_code = None;

    for (i, b) in code_bytes(text) {
        // A literal between two code bytes also ends a word
        if last_code.is_some_and(|prev| prev + 1 != i) {
            if let Some(s) = start.take() {
                words.push((s, &text[s..last_code.unwrap_or(s) + 1]));
            }
        }
        match start {
            Some(_) if is_ident_char(b) => {}
            Some(s) => {
                words.push((s, &text[s..i]));
                start = None;
            }
            None => {}
        }
        if start.is_none() && is_ident_start(b) && (i == 0 || !is_ident_char(bytes[i - 1])) {
            start = Some(i);
        }
        last_code = Some(i);
    }
    if let (Some(s), Some(end)) = (start, last_code) {
        words.push((s, &text[s..=end]));
    }
    words
}

/// Split on `sep` where it is not nested in (), <>, [] or {}
pub fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, b) in code_bytes(text) {
        match b {
            b'(' | b'<' | b'[' | b'{' => depth += 1,
            b')' | b'>' | b']' | b'}' => depth = (depth - 1).max(0),
            _ if b == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Remove every `open ... close` group, nested groups included
pub fn strip_groups(text: &str, open: char, close: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        if c == open {
            depth += 1;
        } else if c == close && depth > 0 {
            depth -= 1;
        } else if depth == 0 {
            out.push(c);
        }
    }
    out
}

/// Collapse runs of whitespace into single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matching_nested() {
        let text = "class A { void f() { if (x) { } } };";
        let open = text.find('{').unwrap();
        let close = find_matching(text, open).unwrap();
        assert_eq!(&text[close..], "};");
    }

    #[test]
    fn test_find_matching_ignores_braces_in_literals() {
        let text = r#"{ const char* s = "}"; char c = '{'; char e = '\''; }tail"#;
        let close = find_matching(text, 0).unwrap();
        assert_eq!(&text[close + 1..], "tail");
    }

    #[test]
    fn test_find_matching_verbatim_string() {
        let text = r#"{ var s = @"a ""}"" b"; }x"#;
        let close = find_matching(text, 0).unwrap();
        assert_eq!(&text[close + 1..], "x");
    }

    #[test]
    fn test_digit_separator_is_not_char_literal() {
        let text = "{ int n = 1'000'000; }x";
        let close = find_matching(text, 0).unwrap();
        assert_eq!(&text[close + 1..], "x");
    }

    #[test]
    fn test_unbalanced_runs_to_end() {
        let text = "{ { }";
        assert_eq!(find_matching(text, 0), None);
        assert_eq!(skip_block(text, 0), text.len());
    }

    #[test]
    fn test_identifiers_skip_literals() {
        let words: Vec<_> = identifiers(r#"class "struct" Foo"#)
            .into_iter()
            .map(|(_, w)| w)
            .collect();
        assert_eq!(words, vec!["class", "Foo"]);
    }

    #[test]
    fn test_identifiers_offsets() {
        let words = identifiers("a1 _b(c)");
        assert_eq!(words, vec![(0, "a1"), (3, "_b"), (6, "c")]);
    }

    #[test]
    fn test_split_top_level() {
        let parts = split_top_level("public TMap<A, B>, protected C", b',');
        assert_eq!(parts, vec!["public TMap<A, B>", " protected C"]);
    }

    #[test]
    fn test_strip_groups() {
        assert_eq!(strip_groups("TArray<TPair<A, B>>", '<', '>'), "TArray");
        assert_eq!(strip_groups("int Values[4]", '[', ']'), "int Values");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("AMyActor"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a::b"));
        assert!(!is_identifier(""));
        assert!(is_identifier("Ünï"));
        assert!(is_identifier("Größe2"));
        assert!(!is_identifier("a→b"));
    }

    #[test]
    fn test_identifiers_non_ascii() {
        let words: Vec<_> = identifiers("class Ünï : public Bäse {")
            .into_iter()
            .map(|(_, w)| w)
            .collect();
        assert_eq!(words, vec!["class", "Ünï", "public", "Bäse"]);
    }
}
