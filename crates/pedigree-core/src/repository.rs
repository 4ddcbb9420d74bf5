//! Repository trait definition

use crate::error::Result;
use crate::horse::{Horse, HorseId, NewHorse};
use crate::owner::{NewOwner, Owner, OwnerId};
use crate::parent::ParentLink;
use async_trait::async_trait;

/// Persistence operations the pedigree engine reads and writes through.
///
/// All storage backends implement this trait. The engine never locks or
/// transacts itself; `replace_parents` is expected to be atomic.
#[async_trait]
pub trait PedigreeRepository: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Horse Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a horse by ID
    async fn get_horse(&self, id: HorseId) -> Result<Option<Horse>>;

    /// Get all horses, ordered by ID
    async fn get_all_horses(&self) -> Result<Vec<Horse>>;

    /// Insert a horse and assign it a fresh ID
    async fn create_horse(&self, horse: NewHorse) -> Result<Horse>;

    /// Overwrite a stored horse; fails with `HorseNotFound` if it is missing
    async fn update_horse(&self, horse: &Horse) -> Result<Horse>;

    /// Delete a horse record (edges are removed separately)
    async fn delete_horse(&self, id: HorseId) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Parent Edge Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Edges where `horse_id` is the child, ordered by parent ID
    async fn get_parent_edges(&self, horse_id: HorseId) -> Result<Vec<ParentLink>>;

    /// Edges where `parent_id` is the parent, ordered by child ID
    async fn get_child_edges(&self, parent_id: HorseId) -> Result<Vec<ParentLink>>;

    /// Replace the whole parent set of a horse
    async fn replace_parents(&self, horse_id: HorseId, parent_ids: &[HorseId]) -> Result<()>;

    /// Delete all edges where `horse_id` is the child
    async fn delete_parent_edges(&self, horse_id: HorseId) -> Result<()>;

    /// Delete all edges where `parent_id` is the parent
    async fn delete_child_edges(&self, parent_id: HorseId) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Owner Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert an owner and assign it a fresh ID
    async fn create_owner(&self, owner: NewOwner) -> Result<Owner>;

    /// Get an owner by ID
    async fn get_owner(&self, id: OwnerId) -> Result<Option<Owner>>;

    /// Get all owners, ordered by ID
    async fn get_all_owners(&self) -> Result<Vec<Owner>>;
}
