//! LIKE-pattern sanitization shared by `match`, `remove`, and `list`'s prefix
//! query. `/` is the escape character (`ESCAPE '/'` in every query that uses
//! these patterns), since the paths themselves are `/`-separated and `\` is
//! reserved for rejected foreign-OS name components.

/// Escapes a literal path segment so it can be used as a SQL-LIKE operand
/// without its own `%`/`_`/`/` being treated as wildcards or the escape
/// character. Does *not* translate `*` to `%` — callers that accept a glob
/// from a user should call `glob_to_like` instead.
pub fn escape_like(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        match c {
            '/' => out.push_str("//"),
            '%' => out.push_str("/%"),
            '_' => out.push_str("/_"),
            other => out.push(other),
        }
    }
    out
}

/// Translates a user-supplied glob pattern (`*` as wildcard) into a sanitized
/// SQL-LIKE pattern: escape literal `/`, `%`, `_` first, then turn `*` into
/// the LIKE wildcard `%`. An empty pattern becomes `%` (match everything).
pub fn glob_to_like(glob: &str) -> String {
    if glob.is_empty() {
        return "%".to_string();
    }
    escape_like(glob).replace('*', "%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_matches_everything() {
        assert_eq!(glob_to_like(""), "%");
    }

    #[test]
    fn literal_percent_and_underscore_are_escaped_before_glob_translation() {
        // "weird%name_*" must match exactly "weird%name_<anything>", not use
        // the embedded `%`/`_` as LIKE wildcards.
        assert_eq!(glob_to_like("weird%name_*"), "weird/%name/_%");
    }

    #[test]
    fn embedded_slash_is_escaped_so_it_cannot_be_mistaken_for_the_escape_char() {
        assert_eq!(escape_like("a/b"), "a//b");
    }

    #[test]
    fn star_becomes_percent_wildcard() {
        assert_eq!(glob_to_like("a*b"), "a%b");
    }
}
