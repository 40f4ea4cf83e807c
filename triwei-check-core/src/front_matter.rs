//! Front matter and Markdown structure helpers
//!
//! Pages carry a YAML-ish block between `---` lines. The checks only need
//! flat `key: value` lookups plus a few line-anchored searches, so the block
//! is scanned line by line instead of being handed to a YAML parser.

use std::sync::LazyLock;

use regex::Regex;

static TOP_LEVEL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9_]+):\s*(.*)$").unwrap_or_else(|e| panic!("key regex: {e}"))
});

static PERMALINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*permalink:\s*(/\S+)\s*$").unwrap_or_else(|e| panic!("permalink regex: {e}"))
});

static GAME_PERMALINK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*permalink:\s*(/games/\S+)\s*$")
        .unwrap_or_else(|e| panic!("game permalink regex: {e}"))
});

/// Parsed front matter block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    /// Text between the delimiters, lines joined with `\n`
    pub raw:  String,
    /// Everything after the closing delimiter
    pub body: String,
    fields:   Vec<(String, String)>,
}

impl FrontMatter {
    /// Parse the front matter at the very start of `content`.
    ///
    /// Returns `None` when the content does not open with a `---` line,
    /// the block is never closed, or the block is empty.
    pub fn parse(content: &str) -> Option<Self> {
        let mut lines = content.split_inclusive('\n');
        let first = lines.next()?;
        if trim_eol(first) != "---" {
            return None;
        }

        let mut raw_lines = Vec::new();
        let mut consumed = first.len();
        let mut closed = false;
        for line in lines.by_ref() {
            consumed += line.len();
            if trim_eol(line) == "---" {
                closed = true;
                break;
            }
            raw_lines.push(trim_eol(line));
        }

        if !closed || raw_lines.is_empty() {
            return None;
        }

        let fields = raw_lines
            .iter()
            .filter_map(|line| {
                TOP_LEVEL_KEY
                    .captures(line)
                    .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            })
            .collect();

        Some(Self {
            raw: raw_lines.join("\n"),
            body: content[consumed..].to_string(),
            fields,
        })
    }

    /// Raw value of a top-level key (last occurrence wins)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Value of a top-level key with surrounding quotes removed
    pub fn get_unquoted(&self, key: &str) -> Option<&str> {
        self.get(key).map(strip_quotes)
    }

    /// Whether a top-level key is present
    pub fn has_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Whether `key:` starts any line of the block, at any indentation
    pub fn has_nested_key(&self, key: &str) -> bool {
        let pattern = format!(r"(?m)^\s*{}:", regex::escape(key));
        Regex::new(&pattern).map(|re| re.is_match(&self.raw)).unwrap_or(false)
    }

    /// Keys in the order they appear
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

/// Remove one leading and one trailing quote character, if present
pub fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix(['"', '\'']).unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}

/// Whether `body` contains a `## <heading>` line
pub fn has_heading(body: &str, heading: &str) -> bool {
    let pattern = format!(r"(?m)^##\s+{}\s*$", regex::escape(heading));
    Regex::new(&pattern).map(|re| re.is_match(body)).unwrap_or(false)
}

/// First `permalink: /...` line anywhere in the content
pub fn find_permalink(content: &str) -> Option<&str> {
    PERMALINK.captures(content).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// First `/games/...` permalink following a `---` line
pub fn find_game_permalink(content: &str) -> Option<&str> {
    let mut lines = content.lines().skip_while(|line| !line.trim_start().starts_with("---"));
    lines.next()?;
    lines
        .filter_map(|line| GAME_PERMALINK_LINE.captures(line))
        .find_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Numeric `key: <number>` line anywhere in the content
pub fn find_number_field(content: &str, key: &str) -> Option<f64> {
    let pattern = format!(r"(?m)^\s*{}:\s*(\d+(?:\.\d+)?)\s*$", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    re.captures(content)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC_PAGE: &str = "---\nlayout: spec\ntitle: \"Linear Regression\"\nslug: linreg\npermalink: /games/specs/linreg/\nasset_budget:\n  initial_transfer_kb: 120\n  interactive_transfer_kb: 300.5\n---\n## Overview\nText\n##  Core Loop  \n";

    #[test]
    fn test_parse_front_matter() {
        let fm = FrontMatter::parse(SPEC_PAGE).unwrap();
        assert_eq!(fm.get("layout"), Some("spec"));
        assert_eq!(fm.get_unquoted("title"), Some("Linear Regression"));
        assert!(fm.has_key("asset_budget"));
        assert!(!fm.has_key("initial_transfer_kb"));
        assert!(fm.has_nested_key("initial_transfer_kb"));
        assert!(fm.body.starts_with("## Overview"));
    }

    #[test]
    fn test_parse_crlf() {
        let fm = FrontMatter::parse("---\r\nslug: a\r\n---\r\nbody\r\n").unwrap();
        assert_eq!(fm.get("slug"), Some("a"));
        assert_eq!(fm.body, "body\r\n");
    }

    #[test]
    fn test_missing_or_unclosed_front_matter() {
        assert!(FrontMatter::parse("# Title\n").is_none());
        assert!(FrontMatter::parse("---\nslug: a\n").is_none());
        assert!(FrontMatter::parse("---\n---\nbody").is_none());
        assert!(FrontMatter::parse("\n---\nslug: a\n---\n").is_none());
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"linreg\""), "linreg");
        assert_eq!(strip_quotes("'x'"), "x");
        assert_eq!(strip_quotes("plain"), "plain");
        assert_eq!(strip_quotes("\"half"), "half");
    }

    #[test]
    fn test_headings() {
        let fm = FrontMatter::parse(SPEC_PAGE).unwrap();
        assert!(has_heading(&fm.body, "Overview"));
        assert!(has_heading(&fm.body, "Core Loop"));
        assert!(!has_heading(&fm.body, "Controls"));
        assert!(!has_heading("### Overview\n", "Overview"));
    }

    #[test]
    fn test_permalinks() {
        assert_eq!(find_permalink(SPEC_PAGE), Some("/games/specs/linreg/"));
        assert_eq!(find_permalink("no permalink here"), None);

        let page = "<!-- comment -->\n---\nlayout: game\npermalink: /labs/x/\npermalink: /games/linreg/\n---\n";
        assert_eq!(find_game_permalink(page), Some("/games/linreg/"));
        assert_eq!(find_game_permalink("permalink: /games/x/\n"), None);
    }

    #[test]
    fn test_number_fields() {
        assert_eq!(find_number_field(SPEC_PAGE, "initial_transfer_kb"), Some(120.0));
        assert_eq!(find_number_field(SPEC_PAGE, "interactive_transfer_kb"), Some(300.5));
        assert_eq!(find_number_field(SPEC_PAGE, "max_gpu_tex_mb"), None);
    }
}
