//! Member extraction
//!
//! An entity body is cut into statements at top-level `;` and at balanced
//! `{ ... }` blocks, so inline method bodies and nested blocks are skipped
//! whole. Each statement is stripped of section labels, macros and
//! attributes, then matched against the method grammar and, failing that,
//! the attribute grammar.

use chumsky::prelude::*;
use tracing::{span, trace, Level};

use crate::core::chumsky_utils::{balanced_group, group_contents, optional_whitespace, rest};
use crate::core::delimiters::{
    code_bytes, collapse_whitespace, identifiers, is_ident_char, is_identifier, skip_block,
    split_top_level, strip_groups,
};
use crate::core::{Attribute, Entity, EntityKind, Method, Visibility};
use crate::dialects::Dialect;

/// Qualifier words dropped when cleaning a declared type
const TYPE_QUALIFIERS: &[&str] = &[
    "const",
    "constexpr",
    "consteval",
    "virtual",
    "static",
    "inline",
    "mutable",
    "volatile",
    "explicit",
    "friend",
    "typename",
    "class",
    "struct",
    "enum",
    "union",
    "override",
    "final",
    "readonly",
    "abstract",
    "sealed",
    "new",
    "async",
    "unsafe",
    "extern",
    "event",
    "ref",
    "required",
    "partial",
    "public",
    "protected",
    "private",
    "internal",
    "FORCEINLINE",
    "FORCENOINLINE",
];

/// Statements starting with one of these never declare a member
const SKIPPED_LEADERS: &[&str] = &[
    "using",
    "typedef",
    "friend",
    "static_assert",
    "return",
    "namespace",
    "delegate",
];

const NESTED_TYPE_KEYWORDS: &[&str] = &["class", "struct", "union", "enum", "interface", "record"];

/// Policy deciding which method candidates are constructor or truncation noise
pub trait NoiseFilter: Send + Sync {
    /// Whether `method` should be discarded from the entity named `entity`
    fn is_noise(&self, method: &str, entity: &str) -> bool;

    fn name(&self) -> &'static str;
}

/// Default noise policy
///
/// Discards a method whose name equals the entity name, is shorter than
/// `min_name_len`, or is shorter than the entity name while ending in the
/// same character.
#[derive(Debug, Clone, Copy)]
pub struct TruncationFilter {
    pub min_name_len: usize,
}

impl TruncationFilter {
    pub fn new() -> Self {
        Self { min_name_len: 3 }
    }

    pub fn with_min_name_len(mut self, len: usize) -> Self {
        self.min_name_len = len;
        self
    }
}

impl Default for TruncationFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseFilter for TruncationFilter {
    fn is_noise(&self, method: &str, entity: &str) -> bool {
        let method_len = method.chars().count();
        method == entity
            || method_len < self.min_name_len
            || (method_len < entity.chars().count()
                && method.chars().last() == entity.chars().last())
    }

    fn name(&self) -> &'static str {
        "truncation"
    }
}

/// Policy that keeps every method candidate
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl NoiseFilter for KeepAll {
    fn is_noise(&self, _method: &str, _entity: &str) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "keep-all"
    }
}

/// How a statement ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Semicolon,
    /// Followed by a balanced `{ ... }` block
    Block,
    /// Ran into the end of the body
    End,
}

#[derive(Debug, Clone, Copy)]
struct Statement<'b> {
    text: &'b str,
    terminator: Terminator,
}

/// Method signature as matched by the grammar
#[derive(Debug, Clone, PartialEq)]
struct Signature<'s> {
    head: &'s str,
    params: &'s str,
    trailing_return: Option<&'s str>,
}

/// Extracts attributes, methods and enumerators from entity bodies
pub struct MemberExtractor<'a> {
    dialect: &'a Dialect,
    noise: &'a dyn NoiseFilter,
}

impl<'a> MemberExtractor<'a> {
    pub fn new(dialect: &'a Dialect, noise: &'a dyn NoiseFilter) -> Self {
        Self { dialect, noise }
    }

    /// Fill `entity` with the members declared in `body`
    pub fn extract(&self, entity: &mut Entity, body: &str) {
        let span = span!(Level::TRACE, "extract_members", entity = %entity.name);
        let _enter = span.enter();

        if entity.kind == EntityKind::Enum {
            self.extract_enum_values(entity, body);
            return;
        }

        let mut cursor = self.dialect.default_visibility(entity.kind);
        for statement in segment(body) {
            self.extract_statement(entity, statement, &mut cursor);
        }

        trace!(
            attributes = entity.attributes.len(),
            methods = entity.methods.len(),
            "Members extracted"
        );
    }

    fn extract_statement(
        &self,
        entity: &mut Entity,
        statement: Statement<'_>,
        cursor: &mut Visibility,
    ) {
        let mut text = statement.text.trim();
        let mut inline = None;

        loop {
            if let Some((visibility, after)) = strip_section_label(text) {
                *cursor = visibility;
                text = after;
            } else if let Some(after) = self.strip_leading_macro(text) {
                text = after;
            } else if let Some(after) = self.strip_attribute_brackets(text) {
                text = after;
            } else if let Some((visibility, after)) = self.strip_inline_visibility(text) {
                inline.get_or_insert(visibility);
                text = after;
            } else if let Some(after) = strip_template_prefix(text) {
                text = after;
            } else {
                break;
            }
        }

        let words = identifiers(text);
        let Some(&(_, leader)) = words.first() else {
            return;
        };
        if SKIPPED_LEADERS.contains(&leader) {
            return;
        }
        if NESTED_TYPE_KEYWORDS.contains(&leader)
            && (statement.terminator == Terminator::Block || text.split_whitespace().count() <= 2)
        {
            return;
        }

        if words.iter().any(|&(_, w)| w == "operator") {
            return;
        }

        let visibility = inline.unwrap_or(*cursor);

        if text.contains('(') {
            if let Ok(signature) = signature_parser().parse(text).into_result() {
                if let Some(method) = self.build_method(&entity.name, &signature, visibility) {
                    trace!(name = %method.name, ret = %method.return_type, "Method");
                    entity.add_method(method);
                }
                return;
            }
        }

        for attribute in self.build_attributes(text, visibility) {
            trace!(name = %attribute.name, ty = %attribute.declared_type, "Attribute");
            entity.add_attribute(attribute);
        }
    }

    fn build_method(
        &self,
        entity: &str,
        signature: &Signature<'_>,
        visibility: Visibility,
    ) -> Option<Method> {
        let (raw_type, name) = split_declarator(signature.head)?;
        let prefix = raw_type.trim_end();
        if prefix.ends_with('~') || prefix.ends_with(':') {
            return None;
        }

        let mut return_type = clean_type(&raw_type);
        if return_type == "auto" {
            if let Some(trailing) = signature.trailing_return {
                return_type = clean_type(trailing);
            }
        }
        if return_type.is_empty() {
            trace!(name, "Discarded untyped call");
            return None;
        }
        if self.noise.is_noise(name, entity) {
            trace!(name, filter = self.noise.name(), "Discarded noisy method");
            return None;
        }

        Some(Method::new(
            name,
            return_type,
            collapse_whitespace(signature.params),
            visibility,
        ))
    }

    fn build_attributes(&self, text: &str, visibility: Visibility) -> Vec<Attribute> {
        let parser = declarator_parser();
        let mut shared_type: Option<String> = None;
        let mut attributes = Vec::new();

        for (i, part) in split_top_level(text, b',').into_iter().enumerate() {
            let Ok(declarator) = parser.parse(part).into_result() else {
                return attributes;
            };
            let Some((raw_type, name)) = split_declarator(declarator) else {
                continue;
            };
            if TYPE_QUALIFIERS.contains(&name) {
                continue;
            }

            let declared_type = if i == 0 {
                let cleaned = clean_type(&raw_type);
                if cleaned.is_empty() {
                    return attributes;
                }
                shared_type = Some(cleaned.clone());
                cleaned
            } else {
                match &shared_type {
                    Some(ty) => ty.clone(),
                    None => return attributes,
                }
            };
            attributes.push(Attribute::new(name, declared_type, visibility));
        }
        attributes
    }

    fn extract_enum_values(&self, entity: &mut Entity, body: &str) {
        for part in split_top_level(body, b',') {
            let part = self.strip_attribute_brackets(part.trim()).unwrap_or(part);
            let before_value = split_top_level(part, b'=')[0];
            if let Some(&(_, value)) = identifiers(before_value).first() {
                entity.add_enum_value(value);
            }
        }
        trace!(values = entity.enum_values.len(), "Enumerators extracted");
    }

    /// Remove a leading annotation macro such as `UPROPERTY(...)` or any
    /// all-caps invocation `SOME_MACRO(...)`
    fn strip_leading_macro<'t>(&self, text: &'t str) -> Option<&'t str> {
        let word_len = text.bytes().take_while(|&b| is_ident_char(b)).count();
        if word_len == 0 {
            return None;
        }
        let word = &text[..word_len];
        let after = text[word_len..].trim_start();

        if after.starts_with('(') && (self.dialect.is_member_annotation(word) || is_macro_name(word)) {
            let offset = text.len() - after.len();
            let end = skip_block(text, offset);
            return Some(text[end..].trim_start());
        }
        if self.dialect.is_member_annotation(word) {
            return Some(after);
        }
        None
    }

    fn strip_attribute_brackets<'t>(&self, text: &'t str) -> Option<&'t str> {
        if !self.dialect.attribute_brackets || !text.starts_with('[') {
            return None;
        }
        Some(text[skip_block(text, 0)..].trim_start())
    }

    fn strip_inline_visibility<'t>(&self, text: &'t str) -> Option<(Visibility, &'t str)> {
        if !self.dialect.inline_visibility {
            return None;
        }
        let word_len = text.bytes().take_while(|&b| is_ident_char(b)).count();
        let visibility = Visibility::from_keyword(&text[..word_len])?;
        Some((visibility, text[word_len..].trim_start()))
    }
}

/// `public:` style section label at the start of a statement
fn strip_section_label(text: &str) -> Option<(Visibility, &str)> {
    let word_len = text.bytes().take_while(|&b| is_ident_char(b)).count();
    let visibility = match &text[..word_len] {
        "public" => Visibility::Public,
        "protected" => Visibility::Protected,
        "private" => Visibility::Private,
        _ => return None,
    };
    let after = text[word_len..].trim_start();
    let rest = after.strip_prefix(':')?;
    if rest.starts_with(':') {
        return None;
    }
    Some((visibility, rest.trim_start()))
}

fn strip_template_prefix(text: &str) -> Option<&str> {
    let after = text.strip_prefix("template")?.trim_start();
    if !after.starts_with('<') {
        return None;
    }
    let offset = text.len() - after.len();
    Some(text[skip_block(text, offset)..].trim_start())
}

/// All-caps identifier with at least one letter, e.g. `DECLARE_DELEGATE`
fn is_macro_name(word: &str) -> bool {
    word.len() > 1
        && word.bytes().any(|b| b.is_ascii_uppercase())
        && word
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// Cut a body into statements
fn segment(body: &str) -> Vec<Statement<'_>> {
    let bytes = body.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut parens = 0i32;
    let mut initializer = false;
    let mut skip_until = 0;

    for (i, b) in code_bytes(body) {
        if i < skip_until {
            continue;
        }
        match b {
            b'(' => parens += 1,
            b')' => parens = (parens - 1).max(0),
            b'=' if parens == 0 && is_initializer(body, start, i) => initializer = true,
            b';' if parens == 0 => {
                statements.push(Statement {
                    text: &body[start..i],
                    terminator: Terminator::Semicolon,
                });
                start = i + 1;
                initializer = false;
            }
            b'{' if parens == 0 => {
                let end = skip_block(body, i);
                if initializer {
                    // Brace initializer, still part of this statement
                    skip_until = end;
                    continue;
                }
                statements.push(Statement {
                    text: &body[start..i],
                    terminator: Terminator::Block,
                });

                // Swallow `;` or a property initializer `= value;` after the block
                let mut next = end;
                while next < bytes.len() && bytes[next].is_ascii_whitespace() {
                    next += 1;
                }
                if bytes.get(next) == Some(&b';') {
                    next += 1;
                } else if bytes.get(next) == Some(&b'=') {
                    next = body[next..]
                        .find(';')
                        .map_or(bytes.len(), |p| next + p + 1);
                }
                start = next;
                skip_until = next;
                initializer = false;
            }
            _ => {}
        }
    }

    if start < bytes.len() && !body[start..].trim().is_empty() {
        statements.push(Statement {
            text: &body[start..],
            terminator: Terminator::End,
        });
    }
    statements
}

/// Whether the `=` at `at` starts an initializer rather than being part of an operator
fn is_initializer(body: &str, start: usize, at: usize) -> bool {
    let bytes = body.as_bytes();
    let prev = at.checked_sub(1).map(|p| bytes[p]);
    let next = bytes.get(at + 1).copied();
    if prev.is_some_and(|p| b"=!<>+-*/%&|^".contains(&p)) || next == Some(b'=') {
        return false;
    }
    !body[start..at].trim_end().ends_with("operator")
}

/// Split `type tokens name` into the raw type prefix and the name
///
/// Generic arguments and array brackets are removed first, so the name is
/// the last identifier of what remains.
fn split_declarator(declarator: &str) -> Option<(String, &str)> {
    let stripped = strip_groups(&strip_groups(declarator, '<', '>'), '[', ']');
    let stripped = stripped.trim_end();
    let name_len = stripped
        .bytes()
        .rev()
        .take_while(|&b| is_ident_char(b))
        .count();
    let name = &stripped[stripped.len() - name_len..];
    if !is_identifier(name) {
        return None;
    }
    // Return the name as a slice of the original declarator
    let at = declarator.rfind(name)?;
    let name = &declarator[at..at + name.len()];
    Some((stripped[..stripped.len() - name_len].to_string(), name))
}

/// Remove qualifiers, pointer and reference markers and generic arguments
pub fn clean_type(raw: &str) -> String {
    let without_groups = strip_groups(&strip_groups(raw, '<', '>'), '[', ']');
    let spaced: String = without_groups
        .chars()
        .map(|c| if matches!(c, '*' | '&' | '^' | '?') { ' ' } else { c })
        .collect();
    spaced
        .split_whitespace()
        .filter(|word| !TYPE_QUALIFIERS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `<head>(<params>) [qualifiers] [-> T | => expr | = 0 | : init-list | where ...]`
fn signature_parser<'src>() -> impl Parser<'src, &'src str, Signature<'src>> + Clone {
    let head_piece = choice((
        balanced_group('<', '>').ignored(),
        balanced_group('[', ']').ignored(),
        just("::").ignored(),
        none_of("();={}[]<>:").ignored(),
    ));
    let head = head_piece.repeated().at_least(1).to_slice();

    let qualifier = choice((
        text::keyword("const"),
        text::keyword("override"),
        text::keyword("final"),
        text::keyword("noexcept"),
        text::keyword("volatile"),
        text::keyword("throw"),
        text::keyword("PURE_VIRTUAL"),
    ))
    .then(optional_whitespace())
    .then(balanced_group('(', ')').or_not())
    .ignored();

    let trailing_return = just("->")
        .ignore_then(rest())
        .map(|s: &'src str| Some(s.trim()));
    let expression_body = just("=>").then(rest()).to(None);
    let pure = just('=')
        .then(optional_whitespace())
        .then(choice((
            just("0").ignored(),
            text::keyword("default").ignored(),
            text::keyword("delete").ignored(),
        )))
        .to(None);
    let init_list = just(':').then(rest()).to(None);
    let constraints = text::keyword("where").then(rest()).to(None);

    optional_whitespace()
        .ignore_then(head)
        .then(group_contents('(', ')'))
        .then_ignore(optional_whitespace().then(qualifier).repeated())
        .then_ignore(optional_whitespace())
        .then(choice((trailing_return, expression_body, pure, init_list, constraints)).or_not())
        .then_ignore(optional_whitespace())
        .then_ignore(end())
        .map(|((head, params), trailing)| Signature {
            head,
            params,
            trailing_return: trailing.flatten(),
        })
}

/// `<type tokens> <name> [[N]...] [: bits | = init]`
fn declarator_parser<'src>() -> impl Parser<'src, &'src str, &'src str> + Clone {
    let piece = choice((
        balanced_group('<', '>').ignored(),
        balanced_group('[', ']').ignored(),
        just("::").ignored(),
        none_of("=:;{}()[]<>,").ignored(),
    ));
    let bitfield = just(':').then(rest()).ignored();
    let initializer = just('=').then(rest()).ignored();

    optional_whitespace()
        .ignore_then(piece.repeated().at_least(1).to_slice())
        .then_ignore(bitfield.or(initializer).or_not())
        .then_ignore(end())
}
