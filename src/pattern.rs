//! Pattern parsing and compilation.
//!
//! A route pattern is a path string beginning with `/`. After stripping the
//! leading slash it splits on `/` into parts; a part is either static text or
//! a whole-segment placeholder of the form `{name}` or `{name:regex}`.
//! This module is the only producer of compiled route regexes: it turns a
//! pattern into an anchored `^…$` regex with `(?P<name>…)` captures and an
//! ordered parameter-name list, and it decides whether a pattern can live in
//! the segment trie or must fall back to linear regex matching.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Constraint applied to a placeholder written without one: any run of
/// characters up to the next `/`.
pub const DEFAULT_PARAM_REGEX: &str = "[^/]+";

static PARAM_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

/// One component of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches a URI segment byte-equal to `literal`.
    Static { literal: String },
    /// Matches a URI segment whose full content satisfies `regex`.
    Param { name: String, regex: String },
}

/// Error raised when a pattern cannot be compiled into a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Patterns must begin with `/`.
    MissingLeadingSlash { pattern: String },
    /// The same placeholder name appears twice in one pattern.
    DuplicateParameter { pattern: String, name: String },
    /// A placeholder constraint (or the assembled pattern) is not a valid regex.
    InvalidRegex { pattern: String, message: String },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::MissingLeadingSlash { pattern } => {
                write!(f, "invalid pattern '{pattern}': must begin with '/'")
            }
            PatternError::DuplicateParameter { pattern, name } => {
                write!(
                    f,
                    "invalid pattern '{pattern}': parameter '{name}' appears more than once"
                )
            }
            PatternError::InvalidRegex { pattern, message } => {
                write!(f, "invalid pattern '{pattern}': {message}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Split a pattern into typed segments.
///
/// One leading `/` is stripped, then the remainder splits on `/`. A part that
/// is exactly one well-formed placeholder becomes [`Segment::Param`]; every
/// other part - including parts that mix literal text with a placeholder -
/// becomes [`Segment::Static`]. The pattern `/` produces zero segments, and a
/// trailing `/` produces a final empty static segment, so `/users/` and
/// `/users` are distinct.
pub fn parse(pattern: &str) -> Vec<Segment> {
    let rest = pattern.strip_prefix('/').unwrap_or(pattern);
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/')
        .map(|part| match whole_placeholder(part) {
            Some((name, regex)) => Segment::Param { name, regex },
            None => Segment::Static {
                literal: part.to_string(),
            },
        })
        .collect()
}

/// Compile a pattern into an anchored regex string and its parameter names.
///
/// Every placeholder - including those inside mixed-literal segments - is
/// replaced with `(?P<name>regex)`, literal text is regex-escaped, and the
/// result is anchored as `^…$`. Parameter names are recorded in pattern
/// order.
///
/// # Errors
///
/// Returns [`PatternError`] if the pattern lacks a leading `/`, repeats a
/// parameter name, or assembles into an invalid regex.
pub fn compile(pattern: &str) -> Result<(String, Vec<String>), PatternError> {
    if !pattern.starts_with('/') {
        return Err(PatternError::MissingLeadingSlash {
            pattern: pattern.to_string(),
        });
    }

    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    let mut names: Vec<String> = Vec::new();
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        match scan_placeholder(&rest[open..]) {
            Some((len, name, regex)) => {
                out.push_str(&regex::escape(&rest[..open]));
                if names.iter().any(|n| *n == name) {
                    return Err(PatternError::DuplicateParameter {
                        pattern: pattern.to_string(),
                        name,
                    });
                }
                out.push_str("(?P<");
                out.push_str(&name);
                out.push('>');
                out.push_str(&regex);
                out.push(')');
                names.push(name);
                rest = &rest[open + len..];
            }
            None => {
                // Not a placeholder: the brace is literal text.
                out.push_str(&regex::escape(&rest[..=open]));
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(&regex::escape(rest));
    out.push('$');

    if let Err(e) = Regex::new(&out) {
        return Err(PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        });
    }
    Ok((out, names))
}

/// Decide whether a pattern can be inserted into the segment trie.
///
/// True iff every segment is pure static text or a single whole-segment
/// placeholder, and no placeholder constraint can match the character `/`
/// (probed against `^(?:regex)$`). A constraint that fails to compile also
/// disqualifies the pattern; such routes register normally and match through
/// the fallback list.
pub fn is_trie_compatible(pattern: &str) -> bool {
    for segment in parse(pattern) {
        match segment {
            Segment::Static { literal } => {
                if contains_placeholder(&literal) {
                    return false;
                }
            }
            Segment::Param { regex, .. } => match Regex::new(&anchor_segment(&regex)) {
                Ok(re) => {
                    if re.is_match("/") {
                        return false;
                    }
                }
                Err(_) => return false,
            },
        }
    }
    true
}

/// Anchor a placeholder constraint for whole-segment matching.
pub(crate) fn anchor_segment(regex: &str) -> String {
    let mut out = String::with_capacity(regex.len() + 6);
    out.push_str("^(?:");
    out.push_str(regex);
    out.push_str(")$");
    out
}

/// Split a request path into segments for trie matching.
///
/// Mirrors pattern segmentation: `split_path("/") == []` and
/// `split_path("/a/b/") == ["a", "b", ""]`.
pub fn split_path(path: &str) -> Vec<&str> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/').collect()
}

/// Rewrite every placeholder in `pattern` with the value produced by `repl`,
/// leaving literal text untouched. Used by reverse URL generation, which
/// substitutes into the original pattern rather than the compiled regex.
pub(crate) fn replace_placeholders<E>(
    pattern: &str,
    mut repl: impl FnMut(&str) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        match scan_placeholder(&rest[open..]) {
            Some((len, name, _)) => {
                out.push_str(&rest[..open]);
                out.push_str(&repl(&name)?);
                rest = &rest[open + len..];
            }
            None => {
                out.push_str(&rest[..=open]);
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Scan a placeholder starting at the leading `{` of `s`.
///
/// Brace counting is depth-balanced so constraints may contain `{m,n}`
/// repetitions. Returns the total scanned length, the parameter name, and
/// the constraint (defaulted when none is written). A braced group whose
/// name is not `[A-Za-z_][A-Za-z0-9_]*` is not a placeholder.
fn scan_placeholder(s: &str) -> Option<(usize, String, String)> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let inner = &s[1..i];
                    let (name, regex) = match inner.split_once(':') {
                        Some((n, r)) => (n, r.to_string()),
                        None => (inner, DEFAULT_PARAM_REGEX.to_string()),
                    };
                    if !PARAM_NAME_RE.is_match(name) {
                        return None;
                    }
                    return Some((i + 1, name.to_string(), regex));
                }
            }
            _ => {}
        }
    }
    None
}

/// True when `part` is exactly one placeholder, with nothing before or after.
fn whole_placeholder(part: &str) -> Option<(String, String)> {
    if !part.starts_with('{') {
        return None;
    }
    let (len, name, regex) = scan_placeholder(part)?;
    if len == part.len() {
        Some((name, regex))
    } else {
        None
    }
}

fn contains_placeholder(text: &str) -> bool {
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        if scan_placeholder(&rest[open..]).is_some() {
            return true;
        }
        rest = &rest[open + 1..];
    }
    false
}
