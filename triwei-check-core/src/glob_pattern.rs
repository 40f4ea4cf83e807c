//! Asset-pack glob matching
//!
//! Pack globs are matched against site-relative POSIX paths:
//!
//! - `**` matches any run of characters, `/` included
//! - `*` matches within a single path segment
//! - `?` matches one character other than `/`
//!
//! Everything else is literal. A leading `./` or `/` is ignored.

use regex::Regex;

use crate::error::{
    CheckError,
    CheckResult,
};

/// Compiled asset glob
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex:  Regex,
}

impl GlobPattern {
    /// Compile a glob pattern
    pub fn new(pattern: &str) -> CheckResult<Self> {
        let regex = Regex::new(&glob_to_regex(pattern))
            .map_err(|e| CheckError::Pattern(format!("{}: {}", pattern, e)))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Whether a site-relative POSIX path matches
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Translate a glob into an anchored regular expression
pub fn glob_to_regex(pattern: &str) -> String {
    let posix = pattern.replace('\\', "/");
    let trimmed = posix
        .strip_prefix("./")
        .or_else(|| posix.strip_prefix('/'))
        .unwrap_or(&posix);

    let mut out = String::with_capacity(trimmed.len() * 2 + 2);
    out.push('^');
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            },
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, path: &str) -> bool {
        GlobPattern::new(pattern).unwrap().is_match(path)
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        assert!(matches("assets/audio/*.ogg", "assets/audio/hit.ogg"));
        assert!(!matches("assets/audio/*.ogg", "assets/audio/sfx/hit.ogg"));
        assert!(!matches("assets/audio/*.ogg", "assets/audio/hit.oggx"));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        assert!(matches("assets/**", "assets/img/a/b.png"));
        assert!(matches("games/**/sprites/*.png", "games/linreg/art/sprites/hero.png"));
    }

    #[test]
    fn test_literal_characters_are_escaped() {
        assert!(matches("assets/fonts/inter+bold.woff2", "assets/fonts/inter+bold.woff2"));
        assert!(!matches("assets/a.png", "assets/aXpng"));
        assert!(matches("data/(v1)/[x].json", "data/(v1)/[x].json"));
    }

    #[test]
    fn test_question_mark_and_prefixes() {
        assert!(matches("./img/?.png", "img/a.png"));
        assert!(!matches("img/?.png", "img/ab.png"));
        assert!(matches("/img/a.png", "img/a.png"));
        assert!(matches(".\\img\\a.png", "img/a.png"));
    }

    #[test]
    fn test_regex_shape() {
        assert_eq!(glob_to_regex("a/*.js"), r"^a/[^/]*\.js$");
        assert_eq!(glob_to_regex("**"), "^.*$");
    }
}
