//! Hostname and base-path matching.
//!
//! # Responsibilities
//! - Match a request host against a literal hostname (exact, case-sensitive)
//! - Match a request host against a glob pattern (`*`, `?`, `[...]`)
//! - Decide whether a request URI lives under an application's base path
//!
//! # Design Decisions
//! - Host comparison is case-sensitive; configured hostnames are used verbatim
//! - Globs are anchored at both ends, `*` may match the empty string
//! - No regex: the glob walker backtracks only to the last `*`

/// Returns true if `pattern` contains a wildcard and takes part in glob matching.
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*')
}

/// Literal hostname match.
pub fn matches_exact(host: &str, pattern: &str) -> bool {
    host == pattern
}

/// Shell-glob hostname match.
///
/// Supports `*` (any run of characters), `?` (exactly one character),
/// bracket classes such as `[a-z]` / `[!0-9]` and `\` escapes.
pub fn matches_wildcard(host: &str, pattern: &str) -> bool {
    let text: Vec<char> = host.chars().collect();
    let pat: Vec<char> = pattern.chars().collect();

    let (mut t, mut p) = (0usize, 0usize);
    // Position after the last `*` and the text index it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pat.len() {
            match pat[p] {
                '*' => {
                    // Collapse consecutive stars
                    while p < pat.len() && pat[p] == '*' {
                        p += 1;
                    }
                    backtrack = Some((p, t));
                    continue;
                }
                '?' => {
                    t += 1;
                    p += 1;
                    continue;
                }
                '[' => {
                    if let Some((matched, next)) = match_class(&pat, p, text[t]) {
                        if matched {
                            t += 1;
                            p = next;
                            continue;
                        }
                    } else if text[t] == '[' {
                        // Unterminated class, `[` is literal
                        t += 1;
                        p += 1;
                        continue;
                    }
                }
                '\\' if p + 1 < pat.len() => {
                    if pat[p + 1] == text[t] {
                        t += 1;
                        p += 2;
                        continue;
                    }
                }
                c => {
                    if c == text[t] {
                        t += 1;
                        p += 1;
                        continue;
                    }
                }
            }
        }

        // Mismatch: let the last star absorb one more character
        match backtrack {
            Some((star_p, star_t)) => {
                p = star_p;
                t = star_t + 1;
                backtrack = Some((star_p, star_t + 1));
            }
            None => return false,
        }
    }

    // Only trailing stars may remain
    pat[p..].iter().all(|c| *c == '*')
}

/// Evaluate a bracket class starting at `pat[start] == '['`.
///
/// Returns `(matched, index after the closing bracket)`, or `None` when the
/// class is not terminated.
fn match_class(pat: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negated = matches!(pat.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut matched = false;
    let mut first = true;
    loop {
        let current = *pat.get(i)?;
        if current == ']' && !first {
            break;
        }
        first = false;

        if pat.get(i + 1) == Some(&'-') && pat.get(i + 2).is_some_and(|end| *end != ']') {
            let end = pat[i + 2];
            if current <= c && c <= end {
                matched = true;
            }
            i += 3;
        } else {
            if current == c {
                matched = true;
            }
            i += 1;
        }
    }

    Some((matched != negated, i + 1))
}

/// Normalize a configured base path; the empty string means the root.
pub fn normalize_base_path(base_path: &str) -> &str {
    if base_path.is_empty() {
        "/"
    } else {
        base_path
    }
}

/// Compute the request URI relative to `base_path`.
///
/// The first occurrence of the base path is removed; a root base path leaves
/// the URI untouched.
pub fn relative_uri(request_uri: &str, base_path: &str) -> String {
    let base_path = normalize_base_path(base_path);
    if base_path == "/" {
        request_uri.to_string()
    } else {
        request_uri.replacen(base_path, "", 1)
    }
}

/// Returns true if the request lives under `base_path`.
pub fn within_base_path(request_uri: &str, base_path: &str) -> bool {
    request_uri.starts_with(normalize_base_path(base_path))
}
