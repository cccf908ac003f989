//! Section lookup and line extraction inside a block body
//!
//! A section starts at a colon-terminated keyword (`input:`, `output:`,
//! `take:`, `emit:`) and runs until the next line that opens another
//! recognised section, or to the end of the block.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::block::{BlockKeyword, Span};

/// Output channel with a trailing `, emit: <name>` alias.
///
/// The expression part may span several lines as long as each line ends in a
/// comma. Commas nested inside call arguments are not treated specially.
static NAMED_OUTPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"((?:.*,\s+)*.*),\s*emit:\s*(\w+)").expect("valid regex"));

/// Workflow emit assignment `name = expression`.
static WORKFLOW_EMIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s*=\s*(.*)").expect("valid regex"));

/// Logical section of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Input,
    Output,
    Take,
    Emit,
}

impl SectionKind {
    /// The section keyword without its colon
    pub fn keyword(&self) -> &'static str {
        match self {
            SectionKind::Input => "input",
            SectionKind::Output => "output",
            SectionKind::Take => "take",
            SectionKind::Emit => "emit",
        }
    }

    /// Line prefixes that end this section
    pub fn stop_keywords(&self) -> &'static [&'static str] {
        match self {
            SectionKind::Input => &["output:", "when:", "script:", "shell:", "exec:", "stub:"],
            SectionKind::Output => &["when:", "script:", "shell:", "exec:", "stub:"],
            SectionKind::Take => &["main:", "emit:"],
            SectionKind::Emit => &[],
        }
    }

    /// The block keyword this section belongs to
    pub fn block_keyword(&self) -> BlockKeyword {
        match self {
            SectionKind::Input | SectionKind::Output => BlockKeyword::Process,
            SectionKind::Take | SectionKind::Emit => BlockKeyword::Workflow,
        }
    }

    /// Whether the section declares data leaving the block
    pub fn is_output(&self) -> bool {
        matches!(self, SectionKind::Output | SectionKind::Emit)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One channel declared in a section.
///
/// Input and take lines, and output lines without an alias, carry no name and
/// are addressed by their position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub expression: String,
}

impl ChannelEntry {
    pub fn named(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            expression: expression.into(),
        }
    }

    pub fn positional(expression: impl Into<String>) -> Self {
        Self {
            name: None,
            expression: expression.into(),
        }
    }

    /// Accessor label: the alias, or the position for unnamed channels
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => index.to_string(),
        }
    }
}

/// Find the first `keyword:` inside `span` and return the absolute offset just
/// past the keyword and any whitespace following it.
pub fn find_section(text: &str, span: Span, keyword: &str) -> Option<usize> {
    let pattern = format!(r"\b{}:\s*", regex::escape(keyword));
    let re = Regex::new(&pattern).ok()?;
    re.find(span.slice(text)).map(|m| span.start + m.end())
}

/// Locate a section inside a block body.
///
/// The section ends at the start of the first line opening one of the kind's
/// stop keywords, or at the end of the block.
pub fn section_span(text: &str, block: Span, kind: SectionKind) -> Option<Span> {
    let start = find_section(text, block, kind.keyword())?;
    let body = Span::new(start, block.end).slice(text);
    let mut offset = start;
    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if kind.stop_keywords().iter().any(|k| trimmed.starts_with(k)) {
            return Some(Span::new(start, offset));
        }
        offset += line.len();
    }
    Some(Span::new(start, block.end))
}

/// Trimmed, non-blank lines of `span`, stopping before the first line that
/// starts with a stop keyword.
pub fn extract_section_lines<'a>(
    text: &'a str,
    span: Span,
    stop_keywords: &'a [&'a str],
) -> impl Iterator<Item = &'a str> + 'a {
    span.slice(text)
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take_while(move |line| !stop_keywords.iter().any(|k| line.starts_with(k)))
}

/// Output channels carrying an `emit:` alias, in source order.
///
/// Returns an empty list when no alias is present anywhere in `span`; callers
/// then fall back to [`extract_section_lines`].
pub fn extract_named_channels(text: &str, span: Span) -> Vec<ChannelEntry> {
    NAMED_OUTPUT
        .captures_iter(span.slice(text))
        .filter_map(|caps| {
            let expression = collapse_lines(caps.get(1)?.as_str());
            let name = caps.get(2)?.as_str();
            Some(ChannelEntry::named(name, expression))
        })
        .collect()
}

/// Workflow `emit:` assignments of the form `name = expression`.
pub fn extract_workflow_emits(text: &str, span: Span) -> Vec<ChannelEntry> {
    WORKFLOW_EMIT
        .captures_iter(span.slice(text))
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let expression = caps.get(2)?.as_str().trim();
            Some(ChannelEntry::named(name, expression))
        })
        .collect()
}

fn collapse_lines(expression: &str) -> String {
    expression
        .split('\n')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<String>()
}

#[cfg(test)]
mod tests;
