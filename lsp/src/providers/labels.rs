//! `label` directive completion from `withLabel` selectors in the config files

use std::fs;

use nfscope_core::labels::config_labels;
use nfscope_core::ScanError;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind};

use super::{directive_argument, markdown_doc, CompletionProvider};
use crate::context::CursorContext;
use crate::error::ProviderResult;

pub struct LabelCompletion;

impl CompletionProvider for LabelCompletion {
    fn id(&self) -> &'static str {
        "labels"
    }

    fn complete(&self, ctx: &CursorContext) -> ProviderResult<Vec<CompletionItem>> {
        if directive_argument(ctx.prefix(), "label").is_none() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        for path in ctx.workspace.config_files() {
            let text = fs::read_to_string(&path).map_err(|e| ScanError::io(&path, e))?;
            let config = ctx.workspace.display_path(&path);
            items.extend(config_labels(&config, &text).into_iter().map(|label| {
                CompletionItem {
                    insert_text: Some(format!("'{}'", label.label)),
                    filter_text: Some(label.label.clone()),
                    kind: Some(CompletionItemKind::VALUE),
                    detail: Some(format!("{}: {}", label.config, label.label)),
                    documentation: markdown_doc(format!("```groovy\n{}\n```", label.body)),
                    label: label.label,
                    ..Default::default()
                }
            }));
        }
        Ok(items)
    }
}
