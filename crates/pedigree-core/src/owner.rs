//! Owner records

use serde::{Deserialize, Serialize};

/// Unique identifier for an owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub i64);

impl OwnerId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::str::FromStr for OwnerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An owner of horses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Owner {
    /// "First Last", the form owner searches match against
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Data for creating a new owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOwner {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewOwner {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn into_owner(self, id: OwnerId) -> Owner {
        Owner {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }

    /// Collect every problem with this owner data
    pub fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.first_name.trim().is_empty() {
            violations.push("Owner first name is mandatory".to_string());
        }
        if self.last_name.trim().is_empty() {
            violations.push("Owner last name is mandatory".to_string());
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                violations.push(format!("Owner email '{}' is not a valid address", email));
            }
        }
        violations
    }
}
