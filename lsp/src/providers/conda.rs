//! `conda` directive completion from the cached package index

use std::sync::Arc;

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind};

use super::{directive_argument, markdown_doc, CompletionProvider};
use crate::context::CursorContext;
use crate::error::ProviderResult;
use crate::indexes::Indexes;

/// Upper bound on items returned for one request
pub const MAX_PACKAGE_ITEMS: usize = 500;

pub struct CondaCompletion {
    indexes: Arc<Indexes>,
}

impl CondaCompletion {
    pub fn new(indexes: Arc<Indexes>) -> Self {
        Self { indexes }
    }
}

impl CompletionProvider for CondaCompletion {
    fn id(&self) -> &'static str {
        "conda"
    }

    fn complete(&self, ctx: &CursorContext) -> ProviderResult<Vec<CompletionItem>> {
        let Some(typed) = directive_argument(ctx.prefix(), "conda") else {
            return Ok(Vec::new());
        };
        // Nothing cached yet; a fetch has been started
        let Some(packages) = self.indexes.conda_packages()? else {
            return Ok(Vec::new());
        };

        // Newest builds are listed last
        let items = packages
            .iter()
            .rev()
            .filter(|pkg| pkg.name.starts_with(typed) || pkg.directive_text().starts_with(typed))
            .take(MAX_PACKAGE_ITEMS)
            .map(|pkg| {
                let text = pkg.directive_text();
                CompletionItem {
                    label: text.clone(),
                    kind: Some(CompletionItemKind::VALUE),
                    detail: Some(pkg.channel.clone()),
                    documentation: markdown_doc(format!("`{}`", pkg.spec())),
                    insert_text: Some(text),
                    ..Default::default()
                }
            })
            .collect();
        Ok(items)
    }
}
