//! Completes `include` statements for processes defined elsewhere in the
//! workspace, plus one statement per module bringing in all of its functions

use std::fs;

use nfscope_core::include::{
    find_functions, find_processes, include_functions_statement, include_process_statement,
};
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, CompletionTextEdit, TextEdit};
use tracing::warn;

use super::{directive_argument, markdown_doc, CompletionProvider};
use crate::context::CursorContext;
use crate::error::ProviderResult;

pub struct IncludeCompletion;

impl CompletionProvider for IncludeCompletion {
    fn id(&self) -> &'static str {
        "includes"
    }

    fn complete(&self, ctx: &CursorContext) -> ProviderResult<Vec<CompletionItem>> {
        let Some(script) = ctx.path() else {
            return Ok(Vec::new());
        };
        if directive_argument(ctx.prefix(), "include").is_none() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        for module in ctx.workspace.nf_files() {
            if module == script {
                continue;
            }
            let text = match fs::read_to_string(&module) {
                Ok(text) => text,
                Err(err) => {
                    warn!(path = %module.display(), error = %err, "skipping unreadable module");
                    continue;
                }
            };
            let origin = ctx.workspace.display_path(&module);
            for process in find_processes(&text) {
                let statement = include_process_statement(&process, script, &module);
                items.push(CompletionItem {
                    label: process.clone(),
                    kind: Some(CompletionItemKind::MODULE),
                    detail: Some(origin.clone()),
                    documentation: markdown_doc(format!("```groovy\n{statement}\n```")),
                    filter_text: Some(format!("include {process}")),
                    text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                        range: ctx.typed_range(),
                        new_text: statement,
                    })),
                    ..Default::default()
                });
            }

            let functions = find_functions(&text);
            if functions.is_empty() {
                continue;
            }
            let names = functions.join("; ");
            let statement = include_functions_statement(&functions, script, &module);
            items.push(CompletionItem {
                label: format!("{{ {names} }}"),
                kind: Some(CompletionItemKind::FUNCTION),
                detail: Some(origin),
                documentation: markdown_doc(format!("```groovy\n{statement}\n```")),
                filter_text: Some(format!("include {names}")),
                text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                    range: ctx.typed_range(),
                    new_text: statement,
                })),
                ..Default::default()
            });
        }
        Ok(items)
    }
}
