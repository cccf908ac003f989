//! `NAME.out.<channel>` completion and hover

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Hover};

use super::process_info::render_block;
use super::{markdown_doc, markdown_hover, CompletionProvider, HoverProvider};
use crate::context::CursorContext;
use crate::error::ProviderResult;

/// Completes named output channels after `NAME.out.`
pub struct OutputChannelCompletion;

impl CompletionProvider for OutputChannelCompletion {
    fn id(&self) -> &'static str {
        "output-channels"
    }

    fn complete(&self, ctx: &CursorContext) -> ProviderResult<Vec<CompletionItem>> {
        let Some(name) = ctx.out_target() else {
            return Ok(Vec::new());
        };
        let Some(located) = ctx.locate(name)? else {
            return Ok(Vec::new());
        };

        let origin = ctx.workspace.display_path(&located.path);
        let summary = &located.summary;
        // Positional outputs are reached with `.out[i]`, not by name
        let items = summary
            .outputs
            .iter()
            .filter_map(|entry| {
                let channel = entry.name.as_ref()?;
                Some(CompletionItem {
                    label: channel.clone(),
                    kind: Some(CompletionItemKind::FIELD),
                    detail: Some(entry.expression.clone()),
                    documentation: markdown_doc(format!(
                        "`{}`\n\nEmitted by {} `{}` in `{origin}`",
                        entry.expression, summary.keyword, summary.name
                    )),
                    ..Default::default()
                })
            })
            .collect();
        Ok(items)
    }
}

/// Describes the outputs of `NAME` when hovering `NAME.out` or
/// `NAME.out.channel`
pub struct OutputChannelHover;

impl HoverProvider for OutputChannelHover {
    fn id(&self) -> &'static str {
        "output-channels"
    }

    fn hover(&self, ctx: &CursorContext) -> ProviderResult<Option<Hover>> {
        let chain = ctx.dotted_chain();
        let (name, focus) = match chain.as_slice() {
            [name, "out"] => (*name, None),
            [name, "out", channel] => (*name, Some(*channel)),
            _ => return Ok(None),
        };
        let Some(located) = ctx.locate(name)? else {
            return Ok(None);
        };
        Ok(Some(markdown_hover(render_block(
            &located,
            &ctx.workspace,
            false,
            focus,
        ))))
    }
}
