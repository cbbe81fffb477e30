//! Pattern matching logic.
//!
//! # Responsibilities
//! - Match a literal/capture pattern against a request path
//! - Extract named captures into [`Params`]
//! - Report the path remainder absorbed by a trailing-slash pattern
//!
//! # Design Decisions
//! - A capture is `:` followed by an alphanumeric (or `_`) name
//! - A captured value runs until the pattern character that follows the
//!   capture, or the next `/`, whichever comes first
//! - Single left-to-right scan, no backtracking, O(n + m)
//! - A pattern ending in `/` (other than the root) matches any path that
//!   continues past it
//! - Total over all inputs: never panics, always yields match or no-match

use std::fmt;

use crate::routing::params::Params;

const CAPTURE: u8 = b':';
const SEPARATOR: u8 = b'/';

/// A route template mixing literal characters and `:name` captures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    raw: String,
}

impl Pattern {
    /// Create a pattern. The template is not validated.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The template as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Attempt to match `path`, returning the captures on success.
    pub fn matches(&self, path: &str) -> Option<Params> {
        match_path(&self.raw, path)
    }

    /// See [`tail`].
    pub fn tail<'p>(&self, path: &'p str) -> &'p str {
        tail(&self.raw, path)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Pattern {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Where a scan stopped.
enum Scan {
    /// Path fully consumed with the pattern exactly exhausted.
    Exact,
    /// Pattern exhausted on a trailing `/` with path left at this offset.
    Prefix(usize),
    Mismatch,
}

/// Walk `pattern` and `path` together, pushing captures into `params`.
fn scan(pattern: &str, path: &str, mut params: Option<&mut Params>) -> Scan {
    let pat = pattern.as_bytes();
    let input = path.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < input.len() {
        if j >= pat.len() {
            return if pattern != "/" && pat.last() == Some(&SEPARATOR) {
                Scan::Prefix(i)
            } else {
                Scan::Mismatch
            };
        }

        if pat[j] == CAPTURE {
            let name_end = skip_name(pat, j + 1);
            let value_end = find_value_end(input, pat.get(name_end).copied(), i);
            if let Some(params) = params.as_deref_mut() {
                // Cuts land on ASCII bytes, UTF-8 lead bytes or string ends.
                params.add(&pattern[j..name_end], &path[i..value_end]);
            }
            j = name_end;
            i = value_end;
        } else if input[i] == pat[j] {
            i += 1;
            j += 1;
        } else {
            return Scan::Mismatch;
        }
    }

    if j == pat.len() {
        Scan::Exact
    } else {
        Scan::Mismatch
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// End of the capture name starting at `from`.
fn skip_name(pat: &[u8], from: usize) -> usize {
    pat[from..]
        .iter()
        .position(|&b| !is_name_byte(b))
        .map_or(pat.len(), |offset| from + offset)
}

/// End of the captured value starting at `from`: the first `stop` byte, the
/// first `/`, or the end of the path.
fn find_value_end(input: &[u8], stop: Option<u8>, from: usize) -> usize {
    input[from..]
        .iter()
        .position(|&b| b == SEPARATOR || Some(b) == stop)
        .map_or(input.len(), |offset| from + offset)
}

/// Match `path` against `pattern`.
///
/// Returns the captured parameters (possibly empty) on success and `None`
/// when the path does not match.
///
/// ```
/// use patmux::routing::match_path;
///
/// let params = match_path("/hello/:name", "/hello/blake").unwrap();
/// assert_eq!(params.get(":name"), Some("blake"));
/// assert!(match_path("/hello/:name", "/hello/blake/").is_none());
/// ```
pub fn match_path(pattern: &str, path: &str) -> Option<Params> {
    let mut params = Params::new();
    match scan(pattern, path, Some(&mut params)) {
        Scan::Exact | Scan::Prefix(_) => Some(params),
        Scan::Mismatch => None,
    }
}

/// The part of `path` left over after a trailing-slash `pattern` matched.
///
/// Empty when the pattern does not end in `/`, when nothing follows it in the
/// path, or when the path does not match at all.
///
/// ```
/// use patmux::routing::tail;
///
/// assert_eq!(tail("/:a/", "/x/y/z"), "y/z");
/// assert_eq!(tail("/:a", "/x/y/z"), "");
/// ```
pub fn tail<'p>(pattern: &str, path: &'p str) -> &'p str {
    match scan(pattern, path, None) {
        Scan::Prefix(i) => &path[i..],
        Scan::Exact | Scan::Mismatch => "",
    }
}
