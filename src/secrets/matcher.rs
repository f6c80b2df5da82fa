//! Case-insensitive glob matching for policy allow-lists.

use globset::GlobBuilder;

/// Returns `true` when `candidate` matches at least one pattern.
///
/// An empty pattern list means no restriction. Candidate and patterns are
/// lower-cased, `*` never crosses `/`, and a malformed pattern never matches.
/// Braces are literal and `**` is the same as `*`, as in plain shell patterns.
pub fn matches<S: AsRef<str>>(candidate: &str, patterns: &[S]) -> bool {
    if patterns.is_empty() {
        return true;
    }

    let candidate = candidate.to_lowercase();
    patterns.iter().any(|pattern| glob_matches(&pattern.as_ref().to_lowercase(), &candidate))
}

fn glob_matches(pattern: &str, candidate: &str) -> bool {
    match GlobBuilder::new(&shell_pattern(pattern)).literal_separator(true).backslash_escape(true).build() {
        Ok(glob) => glob.compile_matcher().is_match(candidate),
        Err(_) => false,
    }
}

/// Rewrite a shell pattern into globset syntax: escape braces so they are not
/// read as alternation and collapse runs of `*`. Escapes and character
/// classes pass through untouched.
fn shell_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
                // a leading `]` (after an optional negation) is part of the class
                if chars.peek() == Some(&'^') {
                    out.push('!');
                    chars.next();
                }
                if let Some(&']') = chars.peek() {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            '{' | '}' if !in_class => {
                out.push('\\');
                out.push(c);
            }
            '*' if !in_class => {
                out.push(c);
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }
    out
}
