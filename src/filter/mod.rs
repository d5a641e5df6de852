pub mod bloom;

pub use bloom::BloomFilterPolicy;

/// Filter policy trait for determining if a key might exist
pub trait FilterPolicy: Send + Sync {
    /// Returns the name of this filter policy
    fn name(&self) -> &str;

    /// Create a filter for the given keys
    fn create_filter(&self, keys: &[&[u8]]) -> Vec<u8>;

    /// Returns false if the key is definitely absent, true if it might exist
    fn may_contain(&self, filter: &[u8], key: &[u8]) -> bool;
}
