//! In-crate repository fixture for unit tests

use crate::error::{Error, Result};
use crate::horse::{Horse, HorseId, NewHorse, Sex};
use crate::owner::{NewOwner, Owner, OwnerId};
use crate::parent::ParentLink;
use crate::repository::PedigreeRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    horses: BTreeMap<HorseId, Horse>,
    owners: BTreeMap<OwnerId, Owner>,
    edges: Vec<ParentLink>,
    next_id: i64,
}

/// Map-backed repository that counts horse lookups
#[derive(Default)]
pub struct FakeRepository {
    state: Mutex<State>,
    horse_lookups: AtomicUsize,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a horse born on January 1st of `year`
    pub fn horse(&self, name: &str, year: i32, sex: Sex) -> Horse {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let horse = Horse::new(HorseId(state.next_id), name, date(year, 1, 1), sex);
        state.horses.insert(horse.id, horse.clone());
        horse
    }

    pub fn owner(&self, first: &str, last: &str) -> Owner {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let owner = NewOwner::new(first, last).into_owner(OwnerId(state.next_id));
        state.owners.insert(owner.id, owner.clone());
        owner
    }

    /// Record an edge without any checks, like a direct database write
    pub fn link(&self, child: &Horse, parent: &Horse) {
        self.link_ids(child.id, parent.id);
    }

    pub fn link_ids(&self, child: HorseId, parent: HorseId) {
        let mut state = self.state.lock().unwrap();
        state.edges.push(ParentLink::new(child, parent));
    }

    /// Remove a horse record but leave its edges dangling
    pub fn forget(&self, id: HorseId) {
        self.state.lock().unwrap().horses.remove(&id);
    }

    pub fn horse_lookups(&self) -> usize {
        self.horse_lookups.load(Ordering::SeqCst)
    }

    pub fn edge_count(&self) -> usize {
        self.state.lock().unwrap().edges.len()
    }
}

#[async_trait]
impl PedigreeRepository for FakeRepository {
    async fn get_horse(&self, id: HorseId) -> Result<Option<Horse>> {
        self.horse_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().horses.get(&id).cloned())
    }

    async fn get_all_horses(&self) -> Result<Vec<Horse>> {
        Ok(self.state.lock().unwrap().horses.values().cloned().collect())
    }

    async fn create_horse(&self, horse: NewHorse) -> Result<Horse> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let horse = horse.into_horse(HorseId(state.next_id));
        state.horses.insert(horse.id, horse.clone());
        Ok(horse)
    }

    async fn update_horse(&self, horse: &Horse) -> Result<Horse> {
        let mut state = self.state.lock().unwrap();
        match state.horses.get_mut(&horse.id) {
            Some(stored) => {
                *stored = horse.clone();
                Ok(horse.clone())
            }
            None => Err(Error::HorseNotFound(horse.id)),
        }
    }

    async fn delete_horse(&self, id: HorseId) -> Result<()> {
        self.state.lock().unwrap().horses.remove(&id);
        Ok(())
    }

    async fn get_parent_edges(&self, horse_id: HorseId) -> Result<Vec<ParentLink>> {
        let state = self.state.lock().unwrap();
        let mut edges: Vec<_> = state
            .edges
            .iter()
            .filter(|e| e.horse_id == horse_id)
            .copied()
            .collect();
        edges.sort_by_key(|e| e.parent_id);
        Ok(edges)
    }

    async fn get_child_edges(&self, parent_id: HorseId) -> Result<Vec<ParentLink>> {
        let state = self.state.lock().unwrap();
        let mut edges: Vec<_> = state
            .edges
            .iter()
            .filter(|e| e.parent_id == parent_id)
            .copied()
            .collect();
        edges.sort_by_key(|e| e.horse_id);
        Ok(edges)
    }

    async fn replace_parents(&self, horse_id: HorseId, parent_ids: &[HorseId]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.edges.retain(|e| e.horse_id != horse_id);
        for parent_id in parent_ids {
            state.edges.push(ParentLink::new(horse_id, *parent_id));
        }
        Ok(())
    }

    async fn delete_parent_edges(&self, horse_id: HorseId) -> Result<()> {
        self.state.lock().unwrap().edges.retain(|e| e.horse_id != horse_id);
        Ok(())
    }

    async fn delete_child_edges(&self, parent_id: HorseId) -> Result<()> {
        self.state.lock().unwrap().edges.retain(|e| e.parent_id != parent_id);
        Ok(())
    }

    async fn create_owner(&self, owner: NewOwner) -> Result<Owner> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let owner = owner.into_owner(OwnerId(state.next_id));
        state.owners.insert(owner.id, owner.clone());
        Ok(owner)
    }

    async fn get_owner(&self, id: OwnerId) -> Result<Option<Owner>> {
        Ok(self.state.lock().unwrap().owners.get(&id).cloned())
    }

    async fn get_all_owners(&self) -> Result<Vec<Owner>> {
        Ok(self.state.lock().unwrap().owners.values().cloned().collect())
    }
}
