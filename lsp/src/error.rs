use nfscope_core::{CacheError, ScanError};
use thiserror::Error;

/// Why a completion or hover request could not be answered
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
