//! Horse records and drafts

use crate::owner::OwnerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unique identifier for a horse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HorseId(pub i64);

impl HorseId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for HorseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for HorseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Sex of a horse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "FEMALE",
            Self::Male => "MALE",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" | "f" => Ok(Self::Female),
            "male" | "m" => Ok(Self::Male),
            other => Err(format!("Unknown sex: {}", other)),
        }
    }
}

/// A stored horse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horse {
    pub id: HorseId,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub date_of_birth: NaiveDate,

    pub sex: Sex,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<OwnerId>,
}

impl Horse {
    pub fn new(id: HorseId, name: impl Into<String>, date_of_birth: NaiveDate, sex: Sex) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            date_of_birth,
            sex,
            owner_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Copy the fields of an accepted draft onto this horse.
    ///
    /// Mandatory fields missing from the draft keep their current value;
    /// callers only apply drafts the validator has accepted.
    pub fn apply(&mut self, draft: &HorseDraft) {
        if let Some(name) = &draft.name {
            self.name = name.clone();
        }
        if let Some(date_of_birth) = draft.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(sex) = draft.sex {
            self.sex = sex;
        }
        self.description = draft.description.clone();
        self.owner_id = draft.owner_id;
    }
}

/// Data for inserting a horse; the repository assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHorse {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
    #[serde(default)]
    pub owner_id: Option<OwnerId>,
}

impl NewHorse {
    pub fn new(name: impl Into<String>, date_of_birth: NaiveDate, sex: Sex) -> Self {
        Self {
            name: name.into(),
            description: None,
            date_of_birth,
            sex,
            owner_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn into_horse(self, id: HorseId) -> Horse {
        Horse {
            id,
            name: self.name,
            description: self.description,
            date_of_birth: self.date_of_birth,
            sex: self.sex,
            owner_id: self.owner_id,
        }
    }
}

/// Candidate horse data submitted for create or update.
///
/// Every field is optional so that missing mandatory fields can be reported
/// by the validator together with all other problems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub owner_id: Option<OwnerId>,
    /// `None` keeps the stored parents on update; `Some` replaces them
    #[serde(default)]
    pub parent_ids: Option<Vec<HorseId>>,
}

impl HorseDraft {
    pub fn new(name: impl Into<String>, date_of_birth: NaiveDate, sex: Sex) -> Self {
        Self {
            name: Some(name.into()),
            date_of_birth: Some(date_of_birth),
            sex: Some(sex),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_parents(mut self, parent_ids: Vec<HorseId>) -> Self {
        self.parent_ids = Some(parent_ids);
        self
    }

    /// Draft describing an existing horse, keeping its stored parents
    pub fn from_horse(horse: &Horse) -> Self {
        Self {
            name: Some(horse.name.clone()),
            description: horse.description.clone(),
            date_of_birth: Some(horse.date_of_birth),
            sex: Some(horse.sex),
            owner_id: horse.owner_id,
            parent_ids: None,
        }
    }

    /// Convert an accepted draft into insert data.
    ///
    /// Returns `None` if a mandatory field is missing.
    pub fn to_new_horse(&self) -> Option<NewHorse> {
        Some(NewHorse {
            name: self.name.clone()?,
            description: self.description.clone(),
            date_of_birth: self.date_of_birth?,
            sex: self.sex?,
            owner_id: self.owner_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sex_parsing() {
        assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("MALE".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("m".parse::<Sex>().unwrap(), Sex::Male);
        assert!("gelding".parse::<Sex>().is_err());
    }

    #[test]
    fn test_sex_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), "\"FEMALE\"");
    }

    #[test]
    fn test_draft_to_new_horse() {
        let draft = HorseDraft::new("Wendy", date(2019, 4, 1), Sex::Female)
            .with_description("Bay mare")
            .with_parents(vec![HorseId(1)]);

        let new_horse = draft.to_new_horse().unwrap();
        assert_eq!(new_horse.name, "Wendy");
        assert_eq!(new_horse.description.as_deref(), Some("Bay mare"));

        let incomplete = HorseDraft {
            name: Some("Nameless".into()),
            ..Default::default()
        };
        assert!(incomplete.to_new_horse().is_none());
    }

    #[test]
    fn test_apply_draft() {
        let mut horse = Horse::new(HorseId(7), "Old", date(2015, 1, 1), Sex::Male)
            .with_description("to be cleared");
        let draft = HorseDraft::new("New", date(2016, 2, 2), Sex::Female);

        horse.apply(&draft);

        assert_eq!(horse.id, HorseId(7));
        assert_eq!(horse.name, "New");
        assert_eq!(horse.date_of_birth, date(2016, 2, 2));
        assert_eq!(horse.sex, Sex::Female);
        assert!(horse.description.is_none());
    }
}
