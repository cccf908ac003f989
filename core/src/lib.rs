//! Scanning Nextflow sources for the blocks, sections and channels that
//! editor completions and hovers are built from.
//!
//! The core is [`channels::channel_info`]: find a `process` or `workflow`
//! block by name, find a section inside it, and return the section's lines or
//! named channels. Everything else here locates the right file, or scans the
//! config files and package indexes that other completions draw on.

pub mod block;
pub mod channels;
pub mod cli;
pub mod config;
pub mod error;
pub mod include;
pub mod index;
pub mod labels;
pub mod params;
pub mod section;
pub mod workspace;

pub use block::{find_block_body, BlockKeyword, Span};
pub use channels::{channel_info, get_channel_info, BlockSummary};
pub use config::{Loader, NfscopeConfig};
pub use error::{CacheError, ScanError, ScanResult};
pub use section::{ChannelEntry, SectionKind};
pub use workspace::{LocatedBlock, Workspace};
