//! Entry-name patterns
//!
//! - `*` matches any run of characters inside one path segment
//! - `?` matches exactly one character other than `/`
//! - a pattern ending in `/` is a prefix match on everything below it

/// Match a container entry name against a pattern
pub fn matches(pattern: &str, name: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('/') {
        if !prefix.contains(['*', '?']) {
            return name.len() > pattern.len() && name.starts_with(pattern);
        }
        // Wildcard directory prefix: match the leading segments only
        let depth = pattern.matches('/').count();
        let Some(head) = leading_segments(name, depth) else {
            return false;
        };
        return head.len() < name.len() && glob(&chars(pattern), &chars(head));
    }

    glob(&chars(pattern), &chars(name))
}

/// The first `count` segments of `name`, including the trailing slash
fn leading_segments(name: &str, count: usize) -> Option<&str> {
    let end = name.match_indices('/').nth(count.checked_sub(1)?)?.0;
    Some(&name[..=end])
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn glob(pattern: &[char], name: &[char]) -> bool {
    match (pattern.first(), name.first()) {
        (None, None) => true,
        (Some('*'), _) => {
            glob(&pattern[1..], name)
                || (!name.is_empty() && name[0] != '/' && glob(pattern, &name[1..]))
        }
        (Some('?'), Some(&c)) if c != '/' => glob(&pattern[1..], &name[1..]),
        (Some(&p), Some(&c)) if p == c => glob(&pattern[1..], &name[1..]),
        _ => false,
    }
}
