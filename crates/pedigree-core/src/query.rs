//! Query types for searching horses

use crate::horse::{Horse, Sex};
use crate::owner::Owner;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Horse search filters.
///
/// All given filters must match. Text filters are case-insensitive
/// substring matches; blank text filters are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseSearch {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Only horses born strictly before this date
    #[serde(default)]
    pub born_before: Option<NaiveDate>,

    #[serde(default)]
    pub sex: Option<Sex>,

    /// Matched against the owner's "First Last" name
    #[serde(default)]
    pub owner_name: Option<String>,

    #[serde(default)]
    pub limit: Option<usize>,
}

impl HorseSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn born_before(mut self, date: NaiveDate) -> Self {
        self.born_before = Some(date);
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn with_owner_name(mut self, owner_name: impl Into<String>) -> Self {
        self.owner_name = Some(owner_name.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check a horse against every filter; `owner` is the horse's owner, if any
    pub fn matches(&self, horse: &Horse, owner: Option<&Owner>) -> bool {
        if let Some(name) = active(&self.name) {
            if !contains_ignore_case(&horse.name, name) {
                return false;
            }
        }

        if let Some(description) = active(&self.description) {
            match &horse.description {
                Some(d) if contains_ignore_case(d, description) => {}
                _ => return false,
            }
        }

        if let Some(date) = self.born_before {
            if horse.date_of_birth >= date {
                return false;
            }
        }

        if let Some(sex) = self.sex {
            if horse.sex != sex {
                return false;
            }
        }

        if let Some(owner_name) = active(&self.owner_name) {
            match owner {
                Some(o) if contains_ignore_case(&o.full_name(), owner_name) => {}
                _ => return false,
            }
        }

        true
    }

    /// Effective result limit; zero or absent means unlimited
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => usize::MAX,
        }
    }
}

fn active(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().filter(|s| !s.trim().is_empty())
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
