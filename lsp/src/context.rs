//! What surrounds the cursor in an open document
//!
//! Providers only see a [`CursorContext`]: the document text, the cursor
//! position, the document's path and the workspace it belongs to.

use std::path::{Path, PathBuf};

use nfscope_core::{LocatedBlock, ScanResult, Workspace};
use tower_lsp::lsp_types::{Position, Range};

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Cursor position inside a document
#[derive(Debug, Clone)]
pub struct CursorContext {
    pub text: String,
    pub path: Option<PathBuf>,
    pub line: u32,
    pub character: u32,
    pub workspace: Workspace,
}

impl CursorContext {
    pub fn new(
        text: impl Into<String>,
        path: Option<PathBuf>,
        position: Position,
        workspace: Workspace,
    ) -> Self {
        Self {
            text: text.into(),
            path,
            line: position.line,
            character: position.character,
            workspace,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The whole line under the cursor, empty past the end of the document
    pub fn line_text(&self) -> &str {
        self.text.lines().nth(self.line as usize).unwrap_or("")
    }

    /// Byte offset of the cursor within its line. The client counts the
    /// column in UTF-16 code units.
    fn cursor_offset(&self) -> usize {
        let line = self.line_text();
        let mut units = 0;
        for (offset, c) in line.char_indices() {
            if units >= self.character as usize {
                return offset;
            }
            units += c.len_utf16();
        }
        line.len()
    }

    /// Text of the current line before the cursor
    pub fn prefix(&self) -> &str {
        &self.line_text()[..self.cursor_offset()]
    }

    /// Prefix with any partially typed identifier removed
    pub fn prefix_before_word(&self) -> &str {
        self.prefix().trim_end_matches(is_ident_char)
    }

    /// Byte range of the identifier touching the cursor
    fn word_bounds(&self) -> Option<(usize, usize)> {
        let line = self.line_text();
        let cursor = self.cursor_offset();
        let (before, after) = line.split_at(cursor);
        let start = before
            .rfind(|c: char| !is_ident_char(c))
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = cursor
            + after
                .find(|c: char| !is_ident_char(c))
                .unwrap_or(after.len());
        (start < end).then_some((start, end))
    }

    /// Dotted chain ending with the word under the cursor.
    ///
    /// On `html` in `FASTQC.out.html` this is `["FASTQC", "out", "html"]`,
    /// on `out` it is `["FASTQC", "out"]`.
    pub fn dotted_chain(&self) -> Vec<&str> {
        let Some((start, end)) = self.word_bounds() else {
            return Vec::new();
        };
        let line = self.line_text();
        let mut chain = vec![&line[start..end]];
        let mut head = &line[..start];
        while let Some(rest) = head.strip_suffix('.') {
            let word_start = rest
                .rfind(|c: char| !is_ident_char(c))
                .map(|i| i + 1)
                .unwrap_or(0);
            if word_start == rest.len() {
                break;
            }
            chain.push(&rest[word_start..]);
            head = &rest[..word_start];
        }
        chain.reverse();
        chain
    }

    /// The block name in front of `NAME.out.` when the cursor follows it
    pub fn out_target(&self) -> Option<&str> {
        let head = self.prefix_before_word().strip_suffix(".out.")?;
        let start = head
            .rfind(|c: char| !is_ident_char(c))
            .map(|i| i + 1)
            .unwrap_or(0);
        let name = &head[start..];
        (!name.is_empty()).then_some(name)
    }

    /// Column of the first non-blank character of the current line
    pub fn indent(&self) -> usize {
        let line = self.line_text();
        line.chars().take_while(|c| c.is_whitespace()).count()
    }

    /// The current line from its indentation up to the cursor
    pub fn typed_range(&self) -> Range {
        Range {
            start: Position {
                line: self.line,
                character: self.indent() as u32,
            },
            end: Position {
                line: self.line,
                character: self.character.max(self.indent() as u32),
            },
        }
    }

    /// Look up a process or workflow called `name` from this document.
    ///
    /// Documents without a file path cannot resolve relative includes and
    /// fall back to the workspace root.
    pub fn locate(&self, name: &str) -> ScanResult<Option<LocatedBlock>> {
        let script = self
            .path
            .clone()
            .unwrap_or_else(|| self.workspace.root().join("untitled.nf"));
        self.workspace.locate_block(&script, &self.text, name)
    }
}
