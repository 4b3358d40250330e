use crate::error::BlobError;

/// BlobStore provides storage for uploaded binary files (profile pictures,
/// resumes).
///
/// Keys are path-like strings: `avatars/u123.png`, `resumes/u123.pdf`.
/// The default implementation (`FileStore`) maps keys to local filesystem
/// paths. Can be swapped for S3/OSS backends by implementing this trait.
pub trait BlobStore: Send + Sync {
    /// Store a blob. Overwrites if the key already exists.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Retrieve a blob. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Delete a blob. No-op if the key does not exist.
    fn delete(&self, key: &str) -> Result<(), BlobError>;
}
