//! Block locator for `process` and `workflow` definitions
//!
//! Blocks are found with a header regex and delimited with a plain brace
//! counter. The counter has no notion of strings or comments, so a stray
//! `{` inside a quoted string shifts the match.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keyword introducing a named block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BlockKeyword {
    Process,
    Workflow,
}

impl BlockKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKeyword::Process => "process",
            BlockKeyword::Workflow => "workflow",
        }
    }
}

impl fmt::Display for BlockKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open byte range `[start, end)` into a source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    /// Start offset (byte index)
    pub start: usize,
    /// End offset (byte index, exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies entirely inside this span
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The text covered by this span, or `""` if it does not fit `text`
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }
}

/// Find the header `keyword name {` and return the offset just past the brace.
///
/// Only the first header in document order is considered.
pub fn find_block_header(text: &str, keyword: BlockKeyword, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    let pattern = format!(r"\b{}\s+{}\s*\{{", keyword.as_str(), regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.find(text).map(|m| m.end())
}

/// Scan forward from `start` with a brace depth of 1 and return the offset of
/// the brace that brings the depth back to 0.
///
/// Returns `None` when the braces never balance.
pub fn find_closing_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth: i64 = 1;
    for (offset, byte) in text.as_bytes().iter().enumerate().skip(start) {
        match byte {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            return Some(offset);
        }
    }
    None
}

/// Locate the body of the named block: the text strictly between its opening
/// brace and the matching closing brace.
pub fn find_block_body(text: &str, keyword: BlockKeyword, name: &str) -> Option<Span> {
    let start = find_block_header(text, keyword, name)?;
    let Some(end) = find_closing_brace(text, start) else {
        debug!(%keyword, name, "block body has unbalanced braces");
        return None;
    };
    Some(Span::new(start, end))
}
