//! JavaScript syntax check
//!
//! Scripts are parsed, never run. A game script is checked the way a
//! function body is: top-level `return` is allowed, `import`/`export` are
//! not.

use std::fmt;

use oxc_allocator::Allocator;
use oxc_parser::{
    ParseOptions,
    Parser,
};
use oxc_span::SourceType;

/// First syntax error found in a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    /// 1-based line within the checked source
    pub line:    u32,
    pub message: String,
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.line)
    }
}

/// Parse `source`, returning the first error the parser reports
pub fn check_script(source: &str) -> Result<(), SyntaxIssue> {
    let allocator = Allocator::default();
    let options = ParseOptions {
        allow_return_outside_function: true,
        parse_regular_expression: true,
        ..ParseOptions::default()
    };
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).with_options(options).parse();

    match parsed.errors.first() {
        None => Ok(()),
        Some(error) => {
            let offset = error
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map_or(source.len(), |label| label.offset());
            Err(SyntaxIssue {
                line:    line_at(source, offset),
                message: error.message.to_string(),
            })
        },
    }
}

/// 1-based line of a byte offset
fn line_at(source: &str, offset: usize) -> u32 {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() as u32 + 1
}
