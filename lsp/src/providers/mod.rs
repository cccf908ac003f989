//! Completion and hover providers
//!
//! Every editor feature is a provider looking at a [`CursorContext`]. A
//! provider decides for itself whether the cursor is somewhere it has
//! something to say, and returns nothing otherwise.
//!
//! # Adding a Provider
//!
//! 1. Create a new file in `providers/`
//! 2. Implement [`CompletionProvider`] or [`HoverProvider`] for your struct
//! 3. Register it in [`ProviderRegistry::new()`]

mod conda;
mod containers;
mod includes;
mod labels;
mod output_channels;
mod params;
mod process_info;

use std::sync::Arc;

use tower_lsp::lsp_types::{
    CompletionItem, Documentation, Hover, HoverContents, MarkupContent, MarkupKind,
};
use tracing::debug;

use crate::context::CursorContext;
use crate::error::ProviderResult;
use crate::indexes::Indexes;

pub use conda::CondaCompletion;
pub use containers::ContainerCompletion;
pub use includes::IncludeCompletion;
pub use labels::LabelCompletion;
pub use output_channels::{OutputChannelCompletion, OutputChannelHover};
pub use params::{ParamHover, ParamsCompletion};
pub use process_info::ProcessHover;

// ============================================================================
// Provider Traits
// ============================================================================

/// Offers completion items at the cursor
pub trait CompletionProvider: Send + Sync {
    /// Unique identifier, used in logs
    fn id(&self) -> &'static str;

    /// Items for the cursor position. Empty when the cursor is not somewhere
    /// this provider completes.
    fn complete(&self, ctx: &CursorContext) -> ProviderResult<Vec<CompletionItem>>;
}

/// Describes the symbol under the cursor
pub trait HoverProvider: Send + Sync {
    /// Unique identifier, used in logs
    fn id(&self) -> &'static str;

    fn hover(&self, ctx: &CursorContext) -> ProviderResult<Option<Hover>>;
}

// ============================================================================
// ProviderRegistry
// ============================================================================

/// All providers the server answers requests with
pub struct ProviderRegistry {
    completions: Vec<Box<dyn CompletionProvider>>,
    hovers: Vec<Box<dyn HoverProvider>>,
}

impl ProviderRegistry {
    pub fn new(indexes: Arc<Indexes>) -> Self {
        Self {
            completions: vec![
                Box::new(OutputChannelCompletion),
                Box::new(ParamsCompletion),
                Box::new(LabelCompletion),
                Box::new(IncludeCompletion),
                Box::new(CondaCompletion::new(Arc::clone(&indexes))),
                Box::new(ContainerCompletion::new(indexes)),
            ],
            // First hover found wins, most specific first
            hovers: vec![
                Box::new(ParamHover),
                Box::new(OutputChannelHover),
                Box::new(ProcessHover),
            ],
        }
    }

    /// Items from every provider, in registration order
    pub fn complete(&self, ctx: &CursorContext) -> ProviderResult<Vec<CompletionItem>> {
        let mut items = Vec::new();
        for provider in &self.completions {
            let found = provider.complete(ctx)?;
            if !found.is_empty() {
                debug!(provider = provider.id(), count = found.len(), "completions");
            }
            items.extend(found);
        }
        Ok(items)
    }

    pub fn hover(&self, ctx: &CursorContext) -> ProviderResult<Option<Hover>> {
        for provider in &self.hovers {
            if let Some(hover) = provider.hover(ctx)? {
                debug!(provider = provider.id(), "hover");
                return Ok(Some(hover));
            }
        }
        Ok(None)
    }

    /// Registered provider ids, completions first
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.completions
            .iter()
            .map(|p| p.id())
            .chain(self.hovers.iter().map(|p| p.id()))
    }
}

/// Text typed after a line-leading keyword, without the opening quote.
///
/// `None` unless the keyword stands on its own, so `labelled` does not
/// count as `label`.
pub(crate) fn directive_argument<'a>(prefix: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = prefix.trim_start().strip_prefix(keyword)?;
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(rest.trim_start().trim_start_matches(['\'', '"']))
}

pub(crate) fn markdown(value: impl Into<String>) -> MarkupContent {
    MarkupContent {
        kind: MarkupKind::Markdown,
        value: value.into(),
    }
}

pub(crate) fn markdown_doc(value: impl Into<String>) -> Option<Documentation> {
    Some(Documentation::MarkupContent(markdown(value)))
}

pub(crate) fn markdown_hover(value: impl Into<String>) -> Hover {
    Hover {
        contents: HoverContents::Markup(markdown(value)),
        range: None,
    }
}
