//! Channel lookup: block → section → channel entries
//!
//! Every stage that finds nothing yields an empty result. Reading the file is
//! the only step that can fail.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::block::{find_block_body, BlockKeyword};
use crate::error::{ScanError, ScanResult};
use crate::section::{
    extract_named_channels, extract_section_lines, extract_workflow_emits, section_span,
    ChannelEntry, SectionKind,
};

/// Channels declared in one section of the named block within `text`.
pub fn channel_info(
    text: &str,
    keyword: BlockKeyword,
    name: &str,
    kind: SectionKind,
) -> Vec<ChannelEntry> {
    let Some(block) = find_block_body(text, keyword, name) else {
        return Vec::new();
    };
    let Some(span) = section_span(text, block, kind) else {
        debug!(%keyword, name, section = %kind, "section not found");
        return Vec::new();
    };

    let structured = match kind {
        SectionKind::Output => extract_named_channels(text, span),
        SectionKind::Emit => extract_workflow_emits(text, span),
        SectionKind::Input | SectionKind::Take => Vec::new(),
    };
    if !structured.is_empty() {
        return structured;
    }

    extract_section_lines(text, span, kind.stop_keywords())
        .map(ChannelEntry::positional)
        .collect()
}

/// Read `path` and look up channels of the named block.
pub fn get_channel_info(
    path: &Path,
    keyword: BlockKeyword,
    name: &str,
    kind: SectionKind,
) -> ScanResult<Vec<ChannelEntry>> {
    let text = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
    Ok(channel_info(&text, keyword, name, kind))
}

/// Inputs and outputs of a block, whichever kind of block the name refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub keyword: BlockKeyword,
    pub name: String,
    /// `input:` lines of a process, `take:` lines of a workflow
    pub inputs: Vec<ChannelEntry>,
    /// `output:` channels of a process, `emit:` channels of a workflow
    pub outputs: Vec<ChannelEntry>,
}

impl BlockSummary {
    /// Summarise the named process, or the named workflow if no such process
    /// exists in `text`.
    pub fn from_text(text: &str, name: &str) -> Option<Self> {
        let (keyword, input_kind, output_kind) =
            if find_block_body(text, BlockKeyword::Process, name).is_some() {
                (BlockKeyword::Process, SectionKind::Input, SectionKind::Output)
            } else if find_block_body(text, BlockKeyword::Workflow, name).is_some() {
                (BlockKeyword::Workflow, SectionKind::Take, SectionKind::Emit)
            } else {
                return None;
            };

        Some(Self {
            keyword,
            name: name.to_string(),
            inputs: channel_info(text, keyword, name, input_kind),
            outputs: channel_info(text, keyword, name, output_kind),
        })
    }

    pub fn from_path(path: &Path, name: &str) -> ScanResult<Option<Self>> {
        let text = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        Ok(Self::from_text(&text, name))
    }

    pub fn is_process(&self) -> bool {
        self.keyword == BlockKeyword::Process
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}
