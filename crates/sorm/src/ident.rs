//! Backtick identifier quoting.
//!
//! Identifiers are dot-aware: each `.`-separated part is quoted on its own,
//! so a qualified column stays valid after quoting.
//!
//! ```ignore
//! assert_eq!(quote_ident("t.col"), "`t`.`col`");
//! assert_eq!(quote_ident("col"), "`col`");
//! assert_eq!(quote_ident("t.*"), "`t`.*");
//! ```

/// Quote a (possibly qualified) identifier with backticks.
///
/// A bare `*` part is kept as-is so `*` and `t.*` remain wildcards. Embedded
/// backticks are doubled.
pub fn quote_ident(name: &str) -> String {
    let name = name.trim();
    if name == "*" {
        return "*".to_string();
    }
    let mut out = String::with_capacity(name.len() + 2);
    write_ident(&mut out, name);
    out
}

pub(crate) fn write_ident(out: &mut String, name: &str) {
    for (i, part) in name.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        if part == "*" {
            out.push('*');
            continue;
        }
        out.push('`');
        for ch in part.chars() {
            if ch == '`' {
                out.push_str("``");
            } else {
                out.push(ch);
            }
        }
        out.push('`');
    }
}

/// Split a comma-separated list, trimming each entry and skipping empties.
pub fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Split a comma-separated list and quote each entry.
pub fn quote_list(list: &str) -> Vec<String> {
    split_list(list).map(quote_ident).collect()
}
