use crate::domain::unsubscribe::ArtifactKey;
use crate::error::Result;

/// Destination for captured unsubscribe responses.
pub trait ArtifactStore {
    fn put(&self, key: &ArtifactKey, bytes: &[u8]) -> Result<()>;
}
