//! Placeholder scanning and substitution.
//!
//! Two slot syntaxes are recognised and handled in one left-to-right pass:
//!
//! - `$NAME`: a `$` followed by an uppercase identifier (`[A-Z][A-Z0-9_]*`).
//!   A trailing lowercase letter disqualifies the token (`$HOMEdir` is text).
//! - `{{NAME}}`: a double-brace pair on a single line whose trimmed inner text
//!   is an identifier (`[A-Za-z_][A-Za-z0-9_]*`). Pairs with any other inner
//!   text are left alone.
//! - A `$` glued to another `$` or to `{{` is literal: `$$X`, `$A$B`,
//!   `${{ X }}` and `$A{{X}}` are not placeholders.
//!
//! Replacement text is appended to the output and never scanned again, so a
//! value containing `$` or `{{` cannot trigger further expansion.

use crate::error::{KbError, Result};
use crate::types::Syntax;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

/// True if `name` can be written as a `{{NAME}}` slot.
pub fn is_valid_name(name: &str) -> bool {
    name_re().is_match(name)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    pub name: String,
    pub syntax: Syntax,
    /// 1-based line of the token's first character.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// The token exactly as written, e.g. `{{ PLACE }}`.
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub text: String,
    /// Distinct names that were replaced, in first-seen order.
    pub replaced: Vec<String>,
    /// Every token occurrence that had no value and was left verbatim.
    pub unknown: Vec<Placeholder>,
}

impl Substitution {
    /// Distinct unresolved names, in first-seen order.
    pub fn unknown_names(&self) -> Vec<String> {
        distinct_names(&self.unknown)
    }

    /// Fails with [`KbError::UnknownPlaceholders`] if anything was left unresolved.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.unknown.is_empty() {
            Ok(())
        } else {
            Err(KbError::UnknownPlaceholders(self.unknown_names()))
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

enum Segment<'a> {
    Text(&'a str),
    Token(Token<'a>),
}

struct Token<'a> {
    raw: &'a str,
    name: &'a str,
    syntax: Syntax,
    line: usize,
    column: usize,
}

impl Token<'_> {
    fn to_placeholder(&self) -> Placeholder {
        Placeholder {
            name: self.name.to_string(),
            syntax: self.syntax,
            line: self.line,
            column: self.column,
            raw: self.raw.to_string(),
        }
    }
}

fn is_dollar_name_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'
}

/// Length in bytes of the `$NAME` identifier starting at `rest`, or 0.
fn dollar_name_len(rest: &[u8]) -> usize {
    match rest.first() {
        Some(b) if b.is_ascii_uppercase() => {}
        _ => return 0,
    }
    let len = rest.iter().take_while(|b| is_dollar_name_byte(**b)).count();
    match rest.get(len) {
        Some(b) if b.is_ascii_lowercase() => 0,
        _ => len,
    }
}

/// Byte length and word count of the `$WORD` run glued together at the start
/// of `rest`, e.g. `$A$B` is 4 bytes in 2 words and `$$` is 2 bytes in 2.
fn dollar_run(rest: &[u8]) -> (usize, usize) {
    let mut len = 0;
    let mut words = 0;
    while rest.get(len) == Some(&b'$') {
        len += 1;
        words += 1;
        len += rest[len..]
            .iter()
            .take_while(|b| is_dollar_name_byte(**b))
            .count();
    }
    (len, words)
}

fn column_of(content: &str, line_start: usize, at: usize) -> usize {
    content[line_start..at].chars().count() + 1
}

fn snippet_at(content: &str, start: usize) -> String {
    let line_end = content[start..]
        .find('\n')
        .map_or(content.len(), |o| start + o);
    content[start..line_end].chars().take(40).collect()
}

/// Byte index just past the `}}` closing the `{{` at `open`. The pair must
/// close on the same line with no second `{{` in between.
fn close_brace(content: &str, open: usize, line: usize, line_start: usize) -> Result<usize> {
    let line_end = content[open..]
        .find('\n')
        .map_or(content.len(), |o| open + o);
    let inside = &content[open + 2..line_end];
    let close = match (inside.find("}}"), inside.find("{{")) {
        (Some(c), Some(r)) if r < c => None,
        (c, _) => c,
    };
    match close {
        Some(close) => Ok(open + 2 + close + 2),
        None => Err(KbError::InvalidTemplate {
            line,
            column: column_of(content, line_start, open),
            snippet: snippet_at(content, open),
        }),
    }
}

/// Split `content` into literal text and placeholder tokens.
///
/// A `$` glued to another `$` or to a following `{{` starts a literal run:
/// `$$NAME`, `$A$B`, `${{ NAME }}` and `$A{{B}}` are all left as written, so
/// no value is ever emitted directly after a `$`.
fn tokenize(content: &str) -> Result<Vec<Segment<'_>>> {
    let bytes = content.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    let mut line = 1;
    let mut line_start = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                line += 1;
                line_start = i + 1;
                i += 1;
            }
            b'$' => {
                let (run, words) = dollar_run(&bytes[i..]);
                if words > 1 || bytes[i + run..].starts_with(b"{{") {
                    i += run;
                    if bytes[i..].starts_with(b"{{") {
                        i = close_brace(content, i, line, line_start)?;
                    }
                    continue;
                }
                let len = dollar_name_len(&bytes[i + 1..]);
                if len == 0 {
                    i += 1;
                    continue;
                }
                let end = i + 1 + len;
                if text_start < i {
                    segments.push(Segment::Text(&content[text_start..i]));
                }
                segments.push(Segment::Token(Token {
                    raw: &content[i..end],
                    name: &content[i + 1..end],
                    syntax: Syntax::Dollar,
                    line,
                    column: column_of(content, line_start, i),
                }));
                i = end;
                text_start = end;
            }
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                let open = i;
                let end = close_brace(content, open, line, line_start)?;
                let name = content[open + 2..end - 2].trim();
                if is_valid_name(name) {
                    if text_start < open {
                        segments.push(Segment::Text(&content[text_start..open]));
                    }
                    segments.push(Segment::Token(Token {
                        raw: &content[open..end],
                        name,
                        syntax: Syntax::Brace,
                        line,
                        column: column_of(content, line_start, open),
                    }));
                    text_start = end;
                }
                i = end;
            }
            _ => i += 1,
        }
    }

    if text_start < content.len() {
        segments.push(Segment::Text(&content[text_start..]));
    }
    Ok(segments)
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Every placeholder occurrence in `content`, in source order.
pub fn scan(content: &str) -> Result<Vec<Placeholder>> {
    Ok(tokenize(content)?
        .iter()
        .filter_map(|s| match s {
            Segment::Token(t) => Some(t.to_placeholder()),
            Segment::Text(_) => None,
        })
        .collect())
}

/// Distinct names in first-seen order.
pub fn distinct_names(placeholders: &[Placeholder]) -> Vec<String> {
    let mut seen = HashSet::new();
    placeholders
        .iter()
        .filter(|p| seen.insert(p.name.as_str()))
        .map(|p| p.name.clone())
        .collect()
}

/// Replace every known placeholder in a single pass.
///
/// Names missing from `vars` are left exactly as written and reported in
/// [`Substitution::unknown`].
pub fn substitute(content: &str, vars: &HashMap<String, String>) -> Result<Substitution> {
    let segments = tokenize(content)?;

    let mut text = String::with_capacity(content.len());
    let mut replaced: Vec<String> = Vec::new();
    let mut unknown = Vec::new();

    for segment in &segments {
        match segment {
            Segment::Text(t) => text.push_str(t),
            Segment::Token(token) => match vars.get(token.name) {
                Some(value) => {
                    text.push_str(value);
                    if !replaced.iter().any(|n| n == token.name) {
                        replaced.push(token.name.to_string());
                    }
                }
                None => {
                    text.push_str(token.raw);
                    unknown.push(token.to_placeholder());
                }
            },
        }
    }

    Ok(Substitution {
        text,
        replaced,
        unknown,
    })
}

pub fn render(content: &str, vars: &HashMap<String, String>) -> Result<String> {
    Ok(substitute(content, vars)?.text)
}

/// Parse a `KEY=VALUE` pair as given to `--set`. The value may be empty and
/// may itself contain `=`.
pub fn parse_assignment(s: &str) -> Result<(String, String)> {
    let Some((key, value)) = s.split_once('=') else {
        return Err(KbError::InvalidAssignment(s.to_string()));
    };
    if !is_valid_name(key) {
        return Err(KbError::InvalidAssignment(s.to_string()));
    }
    Ok((key.to_string(), value.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
