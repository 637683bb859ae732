//! Shared chumsky parser utilities for member signatures
//!
//! Small combinators used by the member grammar. They work on a single
//! already-segmented statement, never on a whole file.

use chumsky::prelude::*;

/// Parse optional whitespace including newlines.
///
/// Uses explicit character matching to avoid the "repeated combinator making no progress"
/// issue that can occur with `chumsky::text::whitespace().repeated()`.
pub fn optional_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t\n\r").repeated().ignored()
}

/// Parse required whitespace (at least one whitespace/newline character).
pub fn whitespace_required<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t\n\r").repeated().at_least(1).ignored()
}

/// Parse a balanced `open ... close` group, returning the whole slice
///
/// Nested groups of the same delimiter pair are matched recursively; other
/// characters are opaque.
pub fn balanced_group<'src>(
    open: char,
    close: char,
) -> impl Parser<'src, &'src str, &'src str> + Clone {
    recursive(move |group| {
        just(open)
            .then(
                none_of([open, close])
                    .ignored()
                    .or(group.ignored())
                    .repeated(),
            )
            .then(just(close))
            .to_slice()
    })
}

/// Parse the contents of a balanced group, without its delimiters
pub fn group_contents<'src>(
    open: char,
    close: char,
) -> impl Parser<'src, &'src str, &'src str> + Clone {
    balanced_group(open, close)
        .map(move |s: &'src str| &s[open.len_utf8()..s.len() - close.len_utf8()])
}

/// Consume the rest of the input
pub fn rest<'src>() -> impl Parser<'src, &'src str, &'src str> + Clone {
    any().repeated().to_slice()
}
