//! Hover over a process or workflow name used in a script

use nfscope_core::include::find_include_path;
use nfscope_core::{BlockKeyword, ChannelEntry, LocatedBlock, Workspace};
use tower_lsp::lsp_types::Hover;

use super::{markdown_hover, HoverProvider};
use crate::context::CursorContext;
use crate::error::ProviderResult;

/// Shows the inputs and outputs of the block a name refers to
pub struct ProcessHover;

impl HoverProvider for ProcessHover {
    fn id(&self) -> &'static str {
        "process-info"
    }

    fn hover(&self, ctx: &CursorContext) -> ProviderResult<Option<Hover>> {
        let chain = ctx.dotted_chain();
        let [name] = chain.as_slice() else {
            return Ok(None);
        };
        if !looks_like_block_name(name) && find_include_path(&ctx.text, name).is_none() {
            return Ok(None);
        }
        let Some(located) = ctx.locate(name)? else {
            return Ok(None);
        };
        Ok(Some(markdown_hover(render_block(
            &located,
            &ctx.workspace,
            true,
            None,
        ))))
    }
}

/// Process and workflow names are conventionally upper snake case
fn looks_like_block_name(word: &str) -> bool {
    word.starts_with(|c: char| c.is_ascii_uppercase())
        && word
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Markdown description of a located block.
///
/// `focus` names an output channel to highlight.
pub(crate) fn render_block(
    located: &LocatedBlock,
    workspace: &Workspace,
    with_inputs: bool,
    focus: Option<&str>,
) -> String {
    let summary = &located.summary;
    let (title, inputs, outputs) = match summary.keyword {
        BlockKeyword::Process => ("Process", "Input", "Output"),
        BlockKeyword::Workflow => ("Workflow", "Take", "Emit"),
    };

    let mut out = format!(
        "### {title}: `{}`\n\nFile: `{}`\n",
        summary.name,
        workspace.display_path(&located.path)
    );
    if with_inputs {
        out.push_str(&channel_list(inputs, summary.keyword, &summary.inputs, None));
    }
    out.push_str(&channel_list(outputs, summary.keyword, &summary.outputs, focus));
    out
}

fn channel_list(
    heading: &str,
    keyword: BlockKeyword,
    entries: &[ChannelEntry],
    focus: Option<&str>,
) -> String {
    if entries.is_empty() {
        return format!(
            "\n*No {} channels for {keyword}!*\n",
            heading.to_lowercase()
        );
    }
    let mut out = format!("\n### {heading} channels:\n\n");
    for entry in entries {
        let line = match &entry.name {
            Some(name) => format!("`{name}: {}`", entry.expression),
            None => format!("`{}`", entry.expression),
        };
        if focus.is_some() && entry.name.as_deref() == focus {
            out.push_str(&format!("- **{line}**\n"));
        } else {
            out.push_str(&format!("- {line}\n"));
        }
    }
    out
}
