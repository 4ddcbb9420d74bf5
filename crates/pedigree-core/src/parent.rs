//! Parent edges between horses

use crate::horse::{Horse, HorseId, Sex};
use serde::{Deserialize, Serialize};

/// A stored fact that `parent_id` is a parent of `horse_id`.
///
/// The mother/father role is not stored; see [`ParentRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentLink {
    pub horse_id: HorseId,
    pub parent_id: HorseId,
}

impl ParentLink {
    pub fn new(horse_id: HorseId, parent_id: HorseId) -> Self {
        Self {
            horse_id,
            parent_id,
        }
    }
}

/// Role of a parent, derived from its sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentRole {
    Mother,
    Father,
}

impl From<Sex> for ParentRole {
    fn from(sex: Sex) -> Self {
        match sex {
            Sex::Female => Self::Mother,
            Sex::Male => Self::Father,
        }
    }
}

impl std::fmt::Display for ParentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mother => f.write_str("mother"),
            Self::Father => f.write_str("father"),
        }
    }
}

/// A resolved parent together with its derived role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent {
    pub horse: Horse,
    pub role: ParentRole,
}

impl Parent {
    pub fn new(horse: Horse) -> Self {
        let role = ParentRole::from(horse.sex);
        Self { horse, role }
    }
}
