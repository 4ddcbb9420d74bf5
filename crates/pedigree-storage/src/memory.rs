//! In-memory storage backend for testing

use crate::error::{StorageError, StorageResult};
use crate::traits::StorageBackend;
use async_trait::async_trait;
use pedigree_core::{
    Error, Horse, HorseId, NewHorse, NewOwner, Owner, OwnerId, ParentLink, PedigreeRepository,
    Result,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

/// In-memory storage backend
///
/// Useful for testing and temporary storage. Edges are kept as
/// `(child, parent)` pairs so both lookup directions come out sorted.
pub struct MemoryStorage {
    horses: RwLock<BTreeMap<HorseId, Horse>>,
    owners: RwLock<BTreeMap<OwnerId, Owner>>,
    edges: RwLock<BTreeSet<(HorseId, HorseId)>>,
    next_horse_id: AtomicI64,
    next_owner_id: AtomicI64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            horses: RwLock::new(BTreeMap::new()),
            owners: RwLock::new(BTreeMap::new()),
            edges: RwLock::new(BTreeSet::new()),
            next_horse_id: AtomicI64::new(1),
            next_owner_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Database(format!("Lock error: {}", e))
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl PedigreeRepository for MemoryStorage {
    // Horse operations

    async fn get_horse(&self, id: HorseId) -> Result<Option<Horse>> {
        let horses = self.horses.read().map_err(lock_error)?;
        Ok(horses.get(&id).cloned())
    }

    async fn get_all_horses(&self) -> Result<Vec<Horse>> {
        let horses = self.horses.read().map_err(lock_error)?;
        Ok(horses.values().cloned().collect())
    }

    async fn create_horse(&self, horse: NewHorse) -> Result<Horse> {
        let mut horses = self.horses.write().map_err(lock_error)?;
        let id = HorseId(self.next_horse_id.fetch_add(1, Ordering::SeqCst));
        let horse = horse.into_horse(id);
        horses.insert(id, horse.clone());
        Ok(horse)
    }

    async fn update_horse(&self, horse: &Horse) -> Result<Horse> {
        let mut horses = self.horses.write().map_err(lock_error)?;
        match horses.get_mut(&horse.id) {
            Some(stored) => {
                *stored = horse.clone();
                Ok(horse.clone())
            }
            None => Err(Error::HorseNotFound(horse.id)),
        }
    }

    async fn delete_horse(&self, id: HorseId) -> Result<()> {
        let mut horses = self.horses.write().map_err(lock_error)?;
        horses.remove(&id);
        Ok(())
    }

    // Edge operations

    async fn get_parent_edges(&self, horse_id: HorseId) -> Result<Vec<ParentLink>> {
        let edges = self.edges.read().map_err(lock_error)?;
        Ok(edges
            .range((horse_id, HorseId(i64::MIN))..=(horse_id, HorseId(i64::MAX)))
            .map(|&(child, parent)| ParentLink::new(child, parent))
            .collect())
    }

    async fn get_child_edges(&self, parent_id: HorseId) -> Result<Vec<ParentLink>> {
        let edges = self.edges.read().map_err(lock_error)?;
        Ok(edges
            .iter()
            .filter(|(_, parent)| *parent == parent_id)
            .map(|&(child, parent)| ParentLink::new(child, parent))
            .collect())
    }

    async fn replace_parents(&self, horse_id: HorseId, parent_ids: &[HorseId]) -> Result<()> {
        let mut edges = self.edges.write().map_err(lock_error)?;
        edges.retain(|(child, _)| *child != horse_id);
        edges.extend(parent_ids.iter().map(|parent| (horse_id, *parent)));
        Ok(())
    }

    async fn delete_parent_edges(&self, horse_id: HorseId) -> Result<()> {
        let mut edges = self.edges.write().map_err(lock_error)?;
        edges.retain(|(child, _)| *child != horse_id);
        Ok(())
    }

    async fn delete_child_edges(&self, parent_id: HorseId) -> Result<()> {
        let mut edges = self.edges.write().map_err(lock_error)?;
        edges.retain(|(_, parent)| *parent != parent_id);
        Ok(())
    }

    // Owner operations

    async fn create_owner(&self, owner: NewOwner) -> Result<Owner> {
        let mut owners = self.owners.write().map_err(lock_error)?;
        let id = OwnerId(self.next_owner_id.fetch_add(1, Ordering::SeqCst));
        let owner = owner.into_owner(id);
        owners.insert(id, owner.clone());
        Ok(owner)
    }

    async fn get_owner(&self, id: OwnerId) -> Result<Option<Owner>> {
        let owners = self.owners.read().map_err(lock_error)?;
        Ok(owners.get(&id).cloned())
    }

    async fn get_all_owners(&self) -> Result<Vec<Owner>> {
        let owners = self.owners.read().map_err(lock_error)?;
        Ok(owners.values().cloned().collect())
    }
}
