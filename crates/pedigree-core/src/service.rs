//! Horse service: validated mutations, lookups, searches and trees

use crate::error::{Error, Result};
use crate::horse::{Horse, HorseDraft, HorseId, Sex};
use crate::limits::{self, DEFAULT_PARENT_SEARCH_LIMIT};
use crate::owner::{NewOwner, Owner, OwnerId};
use crate::parent::Parent;
use crate::query::{contains_ignore_case, HorseSearch};
use crate::repository::PedigreeRepository;
use crate::tree::{AncestorNode, TreeBuilder};
use crate::validation::{self, Validator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A horse with its owner and direct parents resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseDetail {
    #[serde(flatten)]
    pub horse: Horse,
    pub owner: Option<Owner>,
    pub parents: Vec<Parent>,
}

/// Entry point for everything callers do with horses and owners
#[derive(Clone)]
pub struct HorseService {
    repo: Arc<dyn PedigreeRepository>,
}

impl HorseService {
    pub fn new(repo: Arc<dyn PedigreeRepository>) -> Self {
        Self { repo }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Horses matching every filter of `search`, in ID order
    pub async fn search_horses(&self, search: &HorseSearch) -> Result<Vec<Horse>> {
        tracing::debug!("search_horses({:?})", search);
        let horses = self.repo.get_all_horses().await?;
        let owners = self.owner_map().await?;

        let found: Vec<Horse> = horses
            .into_iter()
            .filter(|h| {
                let owner = h.owner_id.and_then(|id| owners.get(&id));
                search.matches(h, owner)
            })
            .take(search.effective_limit())
            .collect();

        tracing::debug!("Found {} horses", found.len());
        Ok(found)
    }

    /// Parent candidates whose name contains `name`; blank names find nothing
    pub async fn search_parents(
        &self,
        name: &str,
        sex: Option<Sex>,
        limit: Option<usize>,
    ) -> Result<Vec<Horse>> {
        tracing::debug!("search_parents({}, {:?})", name, sex);
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut search = HorseSearch::new()
            .with_name(name)
            .with_limit(limit.unwrap_or(DEFAULT_PARENT_SEARCH_LIMIT));
        search.sex = sex;
        self.search_horses(&search).await
    }

    /// Get a horse with its owner and parents.
    ///
    /// References to missing records are reported as `Inconsistent`.
    pub async fn get_horse(&self, id: HorseId) -> Result<HorseDetail> {
        tracing::debug!("get_horse({})", id);
        let horse = self
            .repo
            .get_horse(id)
            .await?
            .ok_or(Error::HorseNotFound(id))?;
        self.detail(horse).await
    }

    /// Ancestor tree of a horse, `generations` deep (1-10)
    pub async fn family_tree(&self, id: HorseId, generations: u32) -> Result<AncestorNode> {
        tracing::debug!("family_tree({}, {})", id, generations);
        limits::validate_generations(generations)?;
        TreeBuilder::new(self.repo.as_ref()).build(id, generations).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate and store a new horse together with its parents
    pub async fn create_horse(&self, draft: HorseDraft) -> Result<HorseDetail> {
        tracing::debug!("create_horse({:?})", draft);
        let violations = Validator::new(self.repo.as_ref())
            .validate(&draft, None)
            .await?;
        if !violations.is_empty() {
            return Err(Error::validation(
                "Validation of horse for create failed",
                validation::messages(&violations),
            ));
        }

        let new_horse = draft
            .to_new_horse()
            .ok_or_else(|| Error::Internal("accepted draft is incomplete".to_string()))?;
        let horse = self.repo.create_horse(new_horse).await?;

        if let Some(parent_ids) = draft.parent_ids.as_deref() {
            if !parent_ids.is_empty() {
                self.repo.replace_parents(horse.id, parent_ids).await?;
            }
        }

        tracing::info!("Created horse {} ({})", horse.id, horse.name);
        self.detail(horse).await
    }

    /// Validate and apply a draft to an existing horse.
    ///
    /// The parent set is replaced only if the draft carries `parent_ids`.
    pub async fn update_horse(&self, id: HorseId, draft: HorseDraft) -> Result<HorseDetail> {
        tracing::debug!("update_horse({}, {:?})", id, draft);
        let mut horse = self
            .repo
            .get_horse(id)
            .await?
            .ok_or(Error::HorseNotFound(id))?;

        let violations = Validator::new(self.repo.as_ref())
            .validate(&draft, Some(id))
            .await?;
        if !violations.is_empty() {
            return Err(Error::validation(
                "Validation of horse for update failed",
                validation::messages(&violations),
            ));
        }

        horse.apply(&draft);
        let horse = self.repo.update_horse(&horse).await?;

        if let Some(parent_ids) = draft.parent_ids.as_deref() {
            self.repo.replace_parents(id, parent_ids).await?;
        }

        tracing::info!("Updated horse {} ({})", horse.id, horse.name);
        self.detail(horse).await
    }

    /// Delete a horse and every parent edge it takes part in
    pub async fn delete_horse(&self, id: HorseId) -> Result<()> {
        tracing::debug!("delete_horse({})", id);
        if self.repo.get_horse(id).await?.is_none() {
            return Err(Error::HorseNotFound(id));
        }

        self.repo.delete_parent_edges(id).await?;
        self.repo.delete_child_edges(id).await?;
        self.repo.delete_horse(id).await?;

        tracing::info!("Deleted horse {}", id);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Owners
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_owner(&self, owner: NewOwner) -> Result<Owner> {
        tracing::debug!("create_owner({:?})", owner);
        let violations = owner.violations();
        if !violations.is_empty() {
            return Err(Error::validation(
                "Validation of owner for create failed",
                violations,
            ));
        }

        let owner = self.repo.create_owner(owner).await?;
        tracing::info!("Created owner {} ({})", owner.id, owner.full_name());
        Ok(owner)
    }

    pub async fn get_owner(&self, id: OwnerId) -> Result<Owner> {
        self.repo
            .get_owner(id)
            .await?
            .ok_or(Error::OwnerNotFound(id))
    }

    pub async fn list_owners(&self) -> Result<Vec<Owner>> {
        self.repo.get_all_owners().await
    }

    /// Owners whose full name contains `name`
    pub async fn search_owners(&self, name: &str, limit: Option<usize>) -> Result<Vec<Owner>> {
        let owners = self.repo.get_all_owners().await?;
        Ok(owners
            .into_iter()
            .filter(|o| contains_ignore_case(&o.full_name(), name))
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn owner_map(&self) -> Result<HashMap<OwnerId, Owner>> {
        Ok(self
            .repo
            .get_all_owners()
            .await?
            .into_iter()
            .map(|o| (o.id, o))
            .collect())
    }

    async fn detail(&self, horse: Horse) -> Result<HorseDetail> {
        let owner = match horse.owner_id {
            Some(owner_id) => Some(self.repo.get_owner(owner_id).await?.ok_or_else(|| {
                Error::Inconsistent(format!(
                    "Owner {} referenced by horse {} not found",
                    owner_id, horse.id
                ))
            })?),
            None => None,
        };

        let mut parents = Vec::new();
        for edge in self.repo.get_parent_edges(horse.id).await? {
            let parent = self.repo.get_horse(edge.parent_id).await?.ok_or_else(|| {
                Error::Inconsistent(format!(
                    "Parent horse {} of horse {} not found",
                    edge.parent_id, horse.id
                ))
            })?;
            parents.push(Parent::new(parent));
        }

        Ok(HorseDetail {
            horse,
            owner,
            parents,
        })
    }
}
