//! Path pattern matching for access control
//!
//! ACL paths may contain `*` (zero or more characters, `/` included) and
//! `:name` parameters (exactly one non-empty path segment). Everything else
//! is matched literally and the whole path must match.

use regex::Regex;

/// Compiled ACL path pattern
#[derive(Debug)]
pub struct PathPattern {
    source: String,
    regex: Option<Regex>,
}

impl PathPattern {
    /// Compile an ACL path into an anchored matcher
    pub fn compile(pattern: &str) -> Self {
        let regex = Regex::new(&translate(pattern)).ok();

        Self {
            source: pattern.to_string(),
            regex,
        }
    }

    /// Check whether the whole `path` matches this pattern.
    ///
    /// A pattern that failed to compile matches nothing.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(path))
    }

    /// The pattern as written in the ACL
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Translate an ACL path into an anchored regular expression
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut literal = String::new();
    let mut last_was_wildcard = false;
    let mut rest = pattern;

    out.push('^');

    while let Some(c) = rest.chars().next() {
        match c {
            '*' => {
                flush_literal(&mut out, &mut literal);
                // `**` collapses into a single wildcard
                if !last_was_wildcard {
                    out.push_str(".*");
                }
                last_was_wildcard = true;
                rest = &rest[1..];
            }
            ':' => {
                let name_len = rest[1..].find('/').unwrap_or(rest.len() - 1);
                if name_len == 0 {
                    literal.push(':');
                    last_was_wildcard = false;
                    rest = &rest[1..];
                } else {
                    flush_literal(&mut out, &mut literal);
                    out.push_str("[^/]+");
                    last_was_wildcard = false;
                    rest = &rest[1 + name_len..];
                }
            }
            _ => {
                literal.push(c);
                last_was_wildcard = false;
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    flush_literal(&mut out, &mut literal);
    out.push('$');
    out
}

fn flush_literal(out: &mut String, literal: &mut String) {
    if !literal.is_empty() {
        out.push_str(&regex::escape(literal));
        literal.clear();
    }
}
