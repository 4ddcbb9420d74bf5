//! Ancestor tree assembly
//!
//! Trees are built breadth-first over an arena: each horse and parent-edge
//! lookup is memoized by id, the number of nodes is capped, and the nested
//! [`AncestorNode`] is assembled once the walk is complete.

use crate::error::{Error, Result};
use crate::horse::{Horse, HorseId, Sex};
use crate::limits::{MAX_PARENTS, MAX_TREE_NODES};
use crate::parent::{ParentLink, ParentRole};
use crate::repository::PedigreeRepository;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// A horse in a family tree with its (possibly absent) parents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorNode {
    pub id: HorseId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
    pub mother: Option<Box<AncestorNode>>,
    pub father: Option<Box<AncestorNode>>,
    /// Whether this node's parents were looked up. `false` means the slots
    /// are empty because of the generation bound or node budget, not
    /// because no parent is recorded.
    pub expanded: bool,
}

impl AncestorNode {
    fn leaf(horse: Horse) -> Self {
        Self {
            id: horse.id,
            name: horse.name,
            date_of_birth: horse.date_of_birth,
            sex: horse.sex,
            mother: None,
            father: None,
            expanded: false,
        }
    }

    /// Parent in the given role
    pub fn parent(&self, role: ParentRole) -> Option<&AncestorNode> {
        match role {
            ParentRole::Mother => self.mother.as_deref(),
            ParentRole::Father => self.father.as_deref(),
        }
    }

    /// Number of generations present, counting this node as one
    pub fn depth(&self) -> u32 {
        let mother = self.mother.as_ref().map_or(0, |m| m.depth());
        let father = self.father.as_ref().map_or(0, |f| f.depth());
        1 + mother.max(father)
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.mother.as_ref().map_or(0, |m| m.node_count())
            + self.father.as_ref().map_or(0, |f| f.node_count())
    }
}

/// Work done while building a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub nodes: usize,
    pub horse_lookups: usize,
    pub edge_lookups: usize,
    pub dangling_edges: usize,
    pub budget_exhausted: bool,
}

struct Slot {
    horse: Horse,
    generation: u32,
    expanded: bool,
    mother: Option<usize>,
    father: Option<usize>,
}

impl Slot {
    fn new(horse: Horse, generation: u32) -> Self {
        Self {
            horse,
            generation,
            expanded: false,
            mother: None,
            father: None,
        }
    }
}

/// Memoized repository reads for a single build
struct Lookups<'a> {
    repo: &'a dyn PedigreeRepository,
    horses: HashMap<HorseId, Option<Horse>>,
    edges: HashMap<HorseId, Vec<ParentLink>>,
    stats: TreeStats,
}

impl<'a> Lookups<'a> {
    fn new(repo: &'a dyn PedigreeRepository) -> Self {
        Self {
            repo,
            horses: HashMap::new(),
            edges: HashMap::new(),
            stats: TreeStats::default(),
        }
    }

    async fn horse(&mut self, id: HorseId) -> Result<Option<Horse>> {
        if let Some(cached) = self.horses.get(&id) {
            return Ok(cached.clone());
        }
        self.stats.horse_lookups += 1;
        let horse = self.repo.get_horse(id).await?;
        self.horses.insert(id, horse.clone());
        Ok(horse)
    }

    async fn parent_edges(&mut self, id: HorseId) -> Result<Vec<ParentLink>> {
        if let Some(cached) = self.edges.get(&id) {
            return Ok(cached.clone());
        }
        self.stats.edge_lookups += 1;
        let edges = self.repo.get_parent_edges(id).await?;
        self.edges.insert(id, edges.clone());
        Ok(edges)
    }
}

/// Builds bounded-depth ancestor trees
pub struct TreeBuilder<'a> {
    repo: &'a dyn PedigreeRepository,
    node_budget: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(repo: &'a dyn PedigreeRepository) -> Self {
        Self {
            repo,
            node_budget: MAX_TREE_NODES,
        }
    }

    /// Cap the number of nodes in a tree
    pub fn with_node_budget(mut self, budget: usize) -> Self {
        self.node_budget = budget.max(1);
        self
    }

    /// Build the ancestor tree of `root_id`.
    ///
    /// The root is generation 0 and a node is included iff its generation is
    /// below `max_generations`, so `1` yields the root alone. The bound is
    /// expected to be validated by the caller.
    pub async fn build(&self, root_id: HorseId, max_generations: u32) -> Result<AncestorNode> {
        Ok(self.build_with_stats(root_id, max_generations).await?.0)
    }

    pub async fn build_with_stats(
        &self,
        root_id: HorseId,
        max_generations: u32,
    ) -> Result<(AncestorNode, TreeStats)> {
        tracing::debug!(
            "Building family tree: root={}, max_generations={}",
            root_id,
            max_generations
        );

        let mut lookups = Lookups::new(self.repo);
        let root = lookups
            .horse(root_id)
            .await?
            .ok_or(Error::HorseNotFound(root_id))?;

        let mut arena = vec![Slot::new(root, 0)];
        let mut queue: VecDeque<usize> = VecDeque::from([0]);

        while let Some(idx) = queue.pop_front() {
            let generation = arena[idx].generation;

            // parents would sit at generation + 1
            if generation + 1 >= max_generations {
                continue;
            }

            if arena.len() + MAX_PARENTS > self.node_budget {
                if !lookups.stats.budget_exhausted {
                    tracing::warn!(
                        "Family tree of horse {} reached the node budget of {}",
                        root_id,
                        self.node_budget
                    );
                }
                lookups.stats.budget_exhausted = true;
                continue;
            }

            let horse_id = arena[idx].horse.id;
            let mut mother: Option<Horse> = None;
            let mut father: Option<Horse> = None;

            for edge in lookups.parent_edges(horse_id).await? {
                let Some(parent) = lookups.horse(edge.parent_id).await? else {
                    tracing::warn!(
                        "Parent horse {} not found for horse {}",
                        edge.parent_id,
                        horse_id
                    );
                    lookups.stats.dangling_edges += 1;
                    continue;
                };

                let slot = match ParentRole::from(parent.sex) {
                    ParentRole::Mother => &mut mother,
                    ParentRole::Father => &mut father,
                };
                if let Some(previous) = slot.replace(parent) {
                    tracing::warn!(
                        "Horse {} has two parents of sex {}; dropping {}",
                        horse_id,
                        previous.sex,
                        previous.id
                    );
                }
            }

            arena[idx].expanded = true;
            if let Some(horse) = mother {
                arena[idx].mother = Some(arena.len());
                queue.push_back(arena.len());
                arena.push(Slot::new(horse, generation + 1));
            }
            if let Some(horse) = father {
                arena[idx].father = Some(arena.len());
                queue.push_back(arena.len());
                arena.push(Slot::new(horse, generation + 1));
            }
        }

        let mut stats = lookups.stats;
        stats.nodes = arena.len();
        let root = assemble(arena)?;

        tracing::debug!(
            "Family tree of {} has {} nodes ({} horse lookups, {} edge lookups)",
            root_id,
            stats.nodes,
            stats.horse_lookups,
            stats.edge_lookups
        );
        Ok((root, stats))
    }
}

/// Nest arena slots into nodes. Parents always have a higher index than
/// their child, so a reverse pass sees every parent before it is needed.
fn assemble(arena: Vec<Slot>) -> Result<AncestorNode> {
    let mut built: Vec<Option<AncestorNode>> = (0..arena.len()).map(|_| None).collect();

    for (idx, slot) in arena.into_iter().enumerate().rev() {
        let mut node = AncestorNode::leaf(slot.horse);
        node.expanded = slot.expanded;
        node.mother = slot.mother.and_then(|i| built[i].take()).map(Box::new);
        node.father = slot.father.and_then(|i| built[i].take()).map(Box::new);
        built[idx] = Some(node);
    }

    built
        .first_mut()
        .and_then(Option::take)
        .ok_or_else(|| Error::Internal("family tree has no root".to_string()))
}
