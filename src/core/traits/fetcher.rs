use crate::core::errors::Result;

/// Port for retrieving key material from its source URL.
pub trait Fetcher: Send + Sync {
    /// Download the full body at `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
