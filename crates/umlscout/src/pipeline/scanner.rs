//! Type declaration discovery
//!
//! Walks the identifiers of a normalized file looking for declaration
//! keywords, then reads the header that follows: qualifiers, name, generic
//! parameters and the base clause, up to the opening brace. The body extent
//! comes from the literal-aware delimiter matcher.

use std::ops::Range;
use tracing::{debug, trace};

use crate::core::delimiters::{
    collapse_whitespace, find_matching, identifiers, is_ident_char, is_ident_start,
    split_top_level, strip_groups,
};
use crate::core::{Entity, EntityKind};
use crate::dialects::Dialect;

/// Access and inheritance keywords dropped from base tokens
const BASE_SPECIFIERS: &[&str] = &["public", "protected", "private", "virtual", "internal"];

/// Words that may follow a type name before the base clause
const NAME_SUFFIXES: &[&str] = &["final", "sealed", "abstract"];

/// A declaration found in one file, before member extraction
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Entity without members
    pub entity: Entity,
    /// Byte range of the body, braces excluded
    pub body: Range<usize>,
}

/// Finds type declarations and their body extents
pub struct EntityScanner<'d> {
    dialect: &'d Dialect,
}

impl<'d> EntityScanner<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self { dialect }
    }

    /// Every declaration in `text`, nested ones included, in source order
    pub fn scan(&self, text: &str) -> Vec<Declaration> {
        let words = identifiers(text);
        let mut found = Vec::new();

        for (i, &(offset, word)) in words.iter().enumerate() {
            let Some(mut kind) = self.dialect.declaration_kind(word) else {
                continue;
            };

            // `enum class` / `enum struct` is handled from the `enum` keyword
            if kind != EntityKind::Enum && i > 0 {
                let (prev_offset, prev) = words[i - 1];
                if prev == "enum" && text[prev_offset + prev.len()..offset].trim().is_empty() {
                    continue;
                }
            }

            let mut header_start = offset + word.len();
            if kind == EntityKind::Enum {
                if let Some(&(next_offset, next)) = words.get(i + 1) {
                    if matches!(next, "class" | "struct")
                        && text[header_start..next_offset].trim().is_empty()
                    {
                        header_start = next_offset + next.len();
                    }
                }
            }

            let Some(header) = self.read_header(text, header_start) else {
                trace!(keyword = word, offset, "Skipped unresolvable declaration");
                continue;
            };

            let annotation = preceding_annotation(text, offset)
                .filter(|a| self.dialect.annotation_kind(a).is_some());
            if annotation.and_then(|a| self.dialect.annotation_kind(a)) == Some(EntityKind::Interface)
            {
                kind = EntityKind::Interface;
            } else if kind == EntityKind::Class
                && self.dialect.declaration_kind("interface").is_none()
                && self.dialect.looks_like_interface(header.name)
            {
                kind = EntityKind::Interface;
            }

            let bases = if kind == EntityKind::Enum {
                // Underlying type, not inheritance
                Vec::new()
            } else {
                header.base_clause.map(clean_bases).unwrap_or_default()
            };

            let body_end = find_matching(text, header.open_brace).unwrap_or(text.len());
            let mut entity = Entity::new(header.name, kind).with_bases(bases);
            if let Some(annotation) = annotation {
                entity = entity.with_annotation(annotation);
            }

            debug!(
                entity = %entity.name,
                kind = %entity.kind,
                bases = entity.bases.len(),
                "Found declaration"
            );
            found.push(Declaration {
                entity,
                body: header.open_brace + 1..body_end,
            });
        }

        found
    }

    /// Read `[qualifiers] Name [<...>] [final] [: bases] {` starting after the keyword
    fn read_header<'t>(&self, text: &'t str, start: usize) -> Option<Header<'t>> {
        let mut cursor = Cursor::new(text, start);
        let mut name;

        loop {
            cursor.skip_ws();
            name = cursor.ident()?;
            if self.dialect.declaration_kind(name).is_some() {
                return None;
            }
            cursor.skip_ws();

            // `EXPORT_MACRO(...)` style qualifier
            if cursor.peek() == Some(b'(') {
                cursor.skip_group()?;
                cursor.skip_ws();
                match cursor.peek_ident() {
                    Some(next) if self.dialect.declaration_kind(next).is_none() => continue,
                    _ => return None,
                }
            }

            match cursor.peek_ident() {
                Some(next) if NAME_SUFFIXES.contains(&next) || next == "where" => break,
                Some(_) => continue,
                None => break,
            }
        }

        if cursor.peek() == Some(b'<') {
            cursor.skip_group()?;
            cursor.skip_ws();
        }
        if cursor.peek_ident().is_some_and(|w| NAME_SUFFIXES.contains(&w)) {
            cursor.ident();
            cursor.skip_ws();
        }

        let mut base_clause = None;
        match cursor.peek() {
            Some(b'{') => {}
            Some(b':') if cursor.peek_at(1) != Some(b':') => {
                cursor.advance(1);
                let clause_start = cursor.pos;
                let clause_end = cursor.find_header_end()?;
                base_clause = Some(&text[clause_start..clause_end]);
            }
            _ if cursor.peek_ident() == Some("where") => {
                cursor.find_header_end()?;
            }
            _ => return None,
        }

        cursor.seek_brace()?;
        if cursor.lines > self.dialect.max_header_lines {
            trace!(name, lines = cursor.lines, "Header spans too many lines");
            return None;
        }

        Some(Header {
            name,
            base_clause,
            open_brace: cursor.pos,
        })
    }
}

struct Header<'t> {
    name: &'t str,
    base_clause: Option<&'t str>,
    open_brace: usize,
}

/// Forward-only byte cursor over a declaration header
struct Cursor<'t> {
    text: &'t str,
    pos: usize,
    /// Newlines crossed since the keyword
    lines: usize,
}

impl<'t> Cursor<'t> {
    fn new(text: &'t str, pos: usize) -> Self {
        Self { text, pos, lines: 0 }
    }

    fn bytes(&self) -> &'t [u8] {
        self.text.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes().get(self.pos + ahead).copied()
    }

    fn advance(&mut self, n: usize) {
        for &b in &self.bytes()[self.pos..(self.pos + n).min(self.text.len())] {
            if b == b'\n' {
                self.lines += 1;
            }
        }
        self.pos = (self.pos + n).min(self.text.len());
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.advance(1);
        }
    }

    fn ident_len(&self) -> usize {
        let bytes = self.bytes();
        if !bytes.get(self.pos).is_some_and(|&b| is_ident_start(b)) {
            return 0;
        }
        bytes[self.pos..].iter().take_while(|&&b| is_ident_char(b)).count()
    }

    fn peek_ident(&self) -> Option<&'t str> {
        let len = self.ident_len();
        (len > 0).then(|| &self.text[self.pos..self.pos + len])
    }

    fn ident(&mut self) -> Option<&'t str> {
        let word = self.peek_ident()?;
        self.advance(word.len());
        Some(word)
    }

    /// Skip the balanced group opened at the cursor
    fn skip_group(&mut self) -> Option<()> {
        let close = find_matching(self.text, self.pos)?;
        self.advance(close + 1 - self.pos);
        Some(())
    }

    /// Advance to the first `{` or `;` at angle/paren depth zero
    ///
    /// Returns the position of the stop character; `;` means there is no body.
    fn find_header_end(&mut self) -> Option<usize> {
        let mut depth = 0i32;
        while let Some(b) = self.peek() {
            match b {
                b'<' | b'(' => depth += 1,
                b'>' | b')' => depth -= 1,
                b'{' if depth <= 0 => return Some(self.pos),
                b';' | b'}' => return None,
                _ if depth <= 0 && self.peek_ident() == Some("where") => {
                    let at = self.pos;
                    self.seek_brace()?;
                    return Some(at);
                }
                _ => {}
            }
            if is_ident_start(b) {
                let len = self.ident_len();
                self.advance(len);
            } else {
                self.advance(1);
            }
        }
        None
    }

    /// Advance to the opening brace, failing on `;`
    fn seek_brace(&mut self) -> Option<()> {
        while let Some(b) = self.peek() {
            match b {
                b'{' => return Some(()),
                b';' | b'}' => return None,
                _ => self.advance(1),
            }
        }
        None
    }
}

/// Clean a raw base clause into base names
///
/// Drops access and `virtual` specifiers and generic arguments, and keeps
/// each distinct name once in declaration order.
pub fn clean_bases(clause: &str) -> Vec<String> {
    let mut bases: Vec<String> = Vec::new();
    for raw in split_top_level(clause, b',') {
        let without_generics = strip_groups(raw, '<', '>');
        let name = collapse_whitespace(&without_generics)
            .split(' ')
            .filter(|word| !BASE_SPECIFIERS.contains(word))
            .collect::<Vec<_>>()
            .join(" ");
        let name = name.trim().trim_start_matches("::").to_string();
        if !name.is_empty() && !bases.contains(&name) {
            bases.push(name);
        }
    }
    bases
}

/// Identifier of an annotation macro immediately before `offset`
///
/// Recognizes `NAME(...)` and a bare `NAME`, skipping whitespace and
/// type qualifiers such as `public` or `partial` in between.
fn preceding_annotation(text: &str, offset: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut end = offset;

    loop {
        while end > 0 && bytes[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
        if end == 0 {
            return None;
        }

        if bytes[end - 1] == b')' {
            let mut depth = 0usize;
            let mut i = end;
            while i > 0 {
                i -= 1;
                match bytes[i] {
                    b')' => depth += 1,
                    b'(' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            if depth != 0 {
                return None;
            }
            end = i;
            while end > 0 && bytes[end - 1].is_ascii_whitespace() {
                end -= 1;
            }
        }

        let start = bytes[..end]
            .iter()
            .rposition(|&b| !is_ident_char(b))
            .map_or(0, |p| p + 1);
        let word = &text[start..end];
        if word.is_empty() {
            return None;
        }
        if matches!(
            word,
            "public" | "private" | "protected" | "internal" | "partial" | "static" | "abstract" | "sealed"
        ) {
            end = start;
            continue;
        }
        return Some(word);
    }
}
