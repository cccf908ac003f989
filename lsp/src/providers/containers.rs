//! `container` directive completion from the cached image index

use std::sync::Arc;

use nfscope_core::index::containers::container_directive;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, CompletionTextEdit, TextEdit};

use super::{directive_argument, markdown_doc, CompletionProvider};
use crate::context::CursorContext;
use crate::error::ProviderResult;
use crate::indexes::Indexes;

pub const MAX_IMAGE_ITEMS: usize = 500;

/// Replaces the typed `container` line with a directive choosing between the
/// Singularity and Docker image
pub struct ContainerCompletion {
    indexes: Arc<Indexes>,
}

impl ContainerCompletion {
    pub fn new(indexes: Arc<Indexes>) -> Self {
        Self { indexes }
    }
}

impl CompletionProvider for ContainerCompletion {
    fn id(&self) -> &'static str {
        "containers"
    }

    fn complete(&self, ctx: &CursorContext) -> ProviderResult<Vec<CompletionItem>> {
        let Some(typed) = directive_argument(ctx.prefix(), "container") else {
            return Ok(Vec::new());
        };
        let Some(mut images) = self.indexes.container_images()? else {
            return Ok(Vec::new());
        };
        images.sort_by(|a, b| b.modified.cmp(&a.modified));

        let config = self.indexes.config();
        let range = ctx.typed_range();
        let column = ctx.indent();
        let items = images
            .iter()
            .filter(|image| image.name.starts_with(typed))
            .take(MAX_IMAGE_ITEMS)
            .map(|image| {
                let directive = container_directive(
                    &image.name,
                    column,
                    &config.singularity_base_url,
                    &config.docker_base_url,
                );
                CompletionItem {
                    label: image.summary(),
                    kind: Some(CompletionItemKind::VALUE),
                    detail: Some(image.size_mb()),
                    documentation: markdown_doc(format!("```groovy\n{directive}```")),
                    filter_text: Some(format!("container {}", image.name)),
                    text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                        range,
                        new_text: directive,
                    })),
                    ..Default::default()
                }
            })
            .collect();
        Ok(items)
    }
}
