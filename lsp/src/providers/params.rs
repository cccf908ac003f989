//! `params.` completion from the params config, hover from the schema

use std::fs;
use std::path::Path;

use nfscope_core::params::{params_list, Param, ParamSchema};
use nfscope_core::{ScanError, ScanResult, Workspace};
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Hover};
use tracing::debug;

use super::{markdown_doc, markdown_hover, CompletionProvider, HoverProvider};
use crate::context::CursorContext;
use crate::error::ProviderResult;

/// Params declared in the workspace's params config; empty if it is absent
fn workspace_params(workspace: &Workspace) -> ScanResult<Vec<Param>> {
    let path = workspace.params_config_path();
    if !path.is_file() {
        debug!(path = %path.display(), "no params config");
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path).map_err(|e| ScanError::io(&path, e))?;
    Ok(params_list(&text).unwrap_or_default())
}

fn config_name(workspace: &Workspace) -> &str {
    Path::new(&workspace.config().params_config)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("nextflow.config")
}

/// Completes parameter names after `params.`
pub struct ParamsCompletion;

impl CompletionProvider for ParamsCompletion {
    fn id(&self) -> &'static str {
        "params"
    }

    fn complete(&self, ctx: &CursorContext) -> ProviderResult<Vec<CompletionItem>> {
        let Some(head) = ctx.prefix_before_word().strip_suffix("params.") else {
            return Ok(Vec::new());
        };
        if head.ends_with(|c: char| c.is_alphanumeric() || c == '_') {
            return Ok(Vec::new());
        }

        let config = config_name(&ctx.workspace);
        let items = workspace_params(&ctx.workspace)?
            .into_iter()
            .map(|param| CompletionItem {
                documentation: markdown_doc(format!(
                    "*{config}*: `params.{} = {}`",
                    param.name, param.default
                )),
                detail: Some(format!("default: {}", param.default)),
                kind: Some(CompletionItemKind::PROPERTY),
                label: param.name,
                ..Default::default()
            })
            .collect();
        Ok(items)
    }
}

/// Documents `params.name` from the parameter schema, falling back to the
/// default assigned in the params config
pub struct ParamHover;

impl HoverProvider for ParamHover {
    fn id(&self) -> &'static str {
        "params"
    }

    fn hover(&self, ctx: &CursorContext) -> ProviderResult<Option<Hover>> {
        let chain = ctx.dotted_chain();
        let ["params", name] = chain.as_slice() else {
            return Ok(None);
        };

        let schema_path = ctx.workspace.params_schema_path();
        if schema_path.is_file() {
            let schema = ParamSchema::load(&schema_path)?;
            if let Some(info) = schema.param_info(name) {
                return Ok(Some(markdown_hover(format!(
                    "### `params.{name}`\n\n{}",
                    info.to_markdown()
                ))));
            }
        }

        let params = workspace_params(&ctx.workspace)?;
        Ok(params.iter().find(|p| p.name == *name).map(|param| {
            markdown_hover(format!(
                "### `params.{name}`\n\n**Default:** `{}`\n\n*{}*",
                param.default,
                config_name(&ctx.workspace)
            ))
        }))
    }
}
