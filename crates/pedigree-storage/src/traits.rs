//! Storage backend trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use pedigree_core::PedigreeRepository;

/// Trait for storage backend implementations
///
/// Record operations come from `PedigreeRepository`; this adds the
/// lifecycle hooks the CLI drives.
#[async_trait]
pub trait StorageBackend: PedigreeRepository {
    /// Initialize the storage (create tables, run migrations, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;
}
