//! Rule evaluation for horse drafts and their proposed parents
//!
//! Every rule runs on every call; problems are collected in evaluation order
//! so that a single rejected submission reports all of them at once.

use crate::error::Result;
use crate::horse::{Horse, HorseDraft, HorseId, Sex};
use crate::limits::{self, LimitError, MAX_PARENTS};
use crate::owner::OwnerId;
use crate::repository::PedigreeRepository;
use chrono::NaiveDate;
use serde::Serialize;

/// A single reason a draft is rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    MissingName,
    MissingDateOfBirth,
    MissingSex,
    BlankDescription,
    DescriptionTooLong { len: usize, max: usize },
    OwnerNotFound { owner_id: OwnerId },
    TooManyParents { count: usize, max: usize },
    ParentNotFound { parent_id: HorseId },
    OwnParent,
    ParentNotOlder { parent_id: HorseId },
    SameParentTwice,
    SameSexParents,
    NotOlderThanChild { child_id: HorseId },
    SexConflictsWithCoParent { child_id: HorseId },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "Horse name is mandatory"),
            Self::MissingDateOfBirth => write!(f, "Horse birthdate is mandatory"),
            Self::MissingSex => write!(f, "Horse gender is mandatory"),
            Self::BlankDescription => write!(f, "Horse description is given but blank"),
            Self::DescriptionTooLong { max, .. } => {
                write!(f, "Horse description too long: longer than {} characters", max)
            }
            Self::OwnerNotFound { owner_id } => {
                write!(f, "Owner with ID {} does not exist", owner_id)
            }
            Self::TooManyParents { max, .. } => {
                write!(f, "A horse can have at most {} parents", max)
            }
            Self::ParentNotFound { parent_id } => {
                write!(f, "Parent horse with ID {} does not exist", parent_id)
            }
            Self::OwnParent => write!(f, "A horse cannot be its own parent"),
            Self::ParentNotOlder { parent_id } => {
                write!(f, "Parent horse with ID {} must be born before the child", parent_id)
            }
            Self::SameParentTwice => write!(f, "Cannot have the same horse as both parents"),
            Self::SameSexParents => write!(f, "Parents must have different genders"),
            Self::NotOlderThanChild { child_id } => {
                write!(f, "Horse must be born before its child with ID {}", child_id)
            }
            Self::SexConflictsWithCoParent { child_id } => write!(
                f,
                "Changing gender conflicts with the other parent of child with ID {}",
                child_id
            ),
        }
    }
}

/// Render violations as the messages surfaced to callers
pub fn messages(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(ToString::to_string).collect()
}

/// Validator for horse drafts.
///
/// Only reads through the repository.
pub struct Validator<'a> {
    repo: &'a dyn PedigreeRepository,
}

impl<'a> Validator<'a> {
    pub fn new(repo: &'a dyn PedigreeRepository) -> Self {
        Self { repo }
    }

    /// Check a draft; `existing_id` is the horse being updated, `None` on create.
    ///
    /// Returns every violation found, empty if the draft is acceptable. `Err`
    /// only signals a repository failure.
    pub async fn validate(
        &self,
        draft: &HorseDraft,
        existing_id: Option<HorseId>,
    ) -> Result<Vec<Violation>> {
        tracing::debug!("Validating draft (existing: {:?})", existing_id);
        let mut violations = Vec::new();

        Self::check_fields(draft, &mut violations);

        if let Some(owner_id) = draft.owner_id {
            if self.repo.get_owner(owner_id).await?.is_none() {
                violations.push(Violation::OwnerNotFound { owner_id });
            }
        }

        let parent_ids = self.proposed_parents(draft, existing_id).await?;
        self.check_parents(&parent_ids, draft.date_of_birth, existing_id, &mut violations)
            .await?;

        if let Some(id) = existing_id {
            self.check_children(id, draft, &mut violations).await?;
        }

        if !violations.is_empty() {
            tracing::debug!("Draft rejected with {} violations", violations.len());
        }
        Ok(violations)
    }

    fn check_fields(draft: &HorseDraft, violations: &mut Vec<Violation>) {
        if draft.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            violations.push(Violation::MissingName);
        }
        if draft.date_of_birth.is_none() {
            violations.push(Violation::MissingDateOfBirth);
        }
        if draft.sex.is_none() {
            violations.push(Violation::MissingSex);
        }
        if let Some(description) = &draft.description {
            if description.trim().is_empty() {
                violations.push(Violation::BlankDescription);
            }
            if let Err(LimitError::DescriptionTooLong { len, max }) =
                limits::validate_description_len(description)
            {
                violations.push(Violation::DescriptionTooLong { len, max });
            }
        }
    }

    /// The parent set the horse will have once the draft is applied
    async fn proposed_parents(
        &self,
        draft: &HorseDraft,
        existing_id: Option<HorseId>,
    ) -> Result<Vec<HorseId>> {
        match (&draft.parent_ids, existing_id) {
            (Some(ids), _) => Ok(ids.clone()),
            (None, Some(id)) => Ok(self
                .repo
                .get_parent_edges(id)
                .await?
                .into_iter()
                .map(|edge| edge.parent_id)
                .collect()),
            (None, None) => Ok(Vec::new()),
        }
    }

    async fn check_parents(
        &self,
        parent_ids: &[HorseId],
        date_of_birth: Option<NaiveDate>,
        existing_id: Option<HorseId>,
        violations: &mut Vec<Violation>,
    ) -> Result<()> {
        if let Err(LimitError::TooManyParents { count, max }) =
            limits::validate_parent_count(parent_ids.len())
        {
            violations.push(Violation::TooManyParents { count, max });
            return Ok(());
        }

        let mut resolved: Vec<Horse> = Vec::with_capacity(MAX_PARENTS);
        let mut checked: Vec<HorseId> = Vec::with_capacity(MAX_PARENTS);
        for &parent_id in parent_ids {
            // a repeated id is reported once; the pair checks still see both
            if checked.contains(&parent_id) {
                if let Some(seen) = resolved.iter().find(|h| h.id == parent_id).cloned() {
                    resolved.push(seen);
                }
                continue;
            }
            checked.push(parent_id);

            let Some(parent) = self.repo.get_horse(parent_id).await? else {
                violations.push(Violation::ParentNotFound { parent_id });
                continue;
            };

            if existing_id == Some(parent_id) {
                violations.push(Violation::OwnParent);
            }
            if let Some(dob) = date_of_birth {
                if parent.date_of_birth >= dob {
                    violations.push(Violation::ParentNotOlder { parent_id });
                }
            }
            resolved.push(parent);
        }

        if let [first, second] = resolved.as_slice() {
            if first.id == second.id {
                violations.push(Violation::SameParentTwice);
            }
            if first.sex == second.sex {
                violations.push(Violation::SameSexParents);
            }
        }
        Ok(())
    }

    /// Keep the horse consistent with the children that already reference it
    async fn check_children(
        &self,
        id: HorseId,
        draft: &HorseDraft,
        violations: &mut Vec<Violation>,
    ) -> Result<()> {
        for edge in self.repo.get_child_edges(id).await? {
            let child_id = edge.horse_id;
            let Some(child) = self.repo.get_horse(child_id).await? else {
                tracing::warn!("Child horse {} of horse {} not found", child_id, id);
                continue;
            };

            if let Some(dob) = draft.date_of_birth {
                if dob >= child.date_of_birth {
                    violations.push(Violation::NotOlderThanChild { child_id });
                }
            }

            if let Some(sex) = draft.sex {
                if self.co_parent_has_sex(child_id, id, sex).await? {
                    violations.push(Violation::SexConflictsWithCoParent { child_id });
                }
            }
        }
        Ok(())
    }

    async fn co_parent_has_sex(&self, child_id: HorseId, id: HorseId, sex: Sex) -> Result<bool> {
        for edge in self.repo.get_parent_edges(child_id).await? {
            if edge.parent_id == id {
                continue;
            }
            if let Some(other) = self.repo.get_horse(edge.parent_id).await? {
                if other.sex == sex {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, FakeRepository};

    fn draft(year: i32, sex: Sex) -> HorseDraft {
        HorseDraft::new("Candidate", date(year, 6, 1), sex)
    }

    async fn run(repo: &FakeRepository, draft: &HorseDraft, id: Option<HorseId>) -> Vec<String> {
        let violations = Validator::new(repo).validate(draft, id).await.unwrap();
        messages(&violations)
    }

    #[tokio::test]
    async fn test_missing_fields_reported_together() {
        let repo = FakeRepository::new();
        let empty = HorseDraft::default();

        let messages = run(&repo, &empty, None).await;

        assert_eq!(
            messages,
            vec![
                "Horse name is mandatory",
                "Horse birthdate is mandatory",
                "Horse gender is mandatory",
            ]
        );
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let repo = FakeRepository::new();
        let mut d = draft(2020, Sex::Male);
        d.name = Some("   ".into());

        assert_eq!(run(&repo, &d, None).await, vec!["Horse name is mandatory"]);
    }

    #[tokio::test]
    async fn test_description_bounds() {
        let repo = FakeRepository::new();

        let ok = draft(2020, Sex::Male).with_description("x".repeat(4095));
        assert!(run(&repo, &ok, None).await.is_empty());

        let too_long = draft(2020, Sex::Male).with_description("x".repeat(4096));
        assert_eq!(
            run(&repo, &too_long, None).await,
            vec!["Horse description too long: longer than 4095 characters"]
        );

        let blank = draft(2020, Sex::Male).with_description("  \t");
        assert_eq!(
            run(&repo, &blank, None).await,
            vec!["Horse description is given but blank"]
        );
    }

    #[tokio::test]
    async fn test_unknown_owner() {
        let repo = FakeRepository::new();
        let owner = repo.owner("Anna", "Huber");

        let known = draft(2020, Sex::Male).with_owner(owner.id);
        assert!(run(&repo, &known, None).await.is_empty());

        let unknown = draft(2020, Sex::Male).with_owner(OwnerId(999));
        assert_eq!(
            run(&repo, &unknown, None).await,
            vec!["Owner with ID 999 does not exist"]
        );
    }

    #[tokio::test]
    async fn test_valid_mother_and_father_accepted() {
        let repo = FakeRepository::new();
        let a = repo.horse("A", 2010, Sex::Female);
        let b = repo.horse("B", 2008, Sex::Male);

        let c = HorseDraft::new("C", date(2022, 1, 1), Sex::Female).with_parents(vec![a.id, b.id]);

        assert!(run(&repo, &c, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_too_many_parents_skips_per_parent_checks() {
        let repo = FakeRepository::new();
        let a = repo.horse("A", 2010, Sex::Female);
        let b = repo.horse("B", 2030, Sex::Female);

        let d = draft(2020, Sex::Male).with_parents(vec![a.id, b.id, HorseId(404)]);
        let messages = run(&repo, &d, None).await;

        assert_eq!(messages, vec!["A horse can have at most 2 parents"]);
    }

    #[tokio::test]
    async fn test_missing_parent_reported_without_crash() {
        let repo = FakeRepository::new();
        let a = repo.horse("A", 2010, Sex::Female);

        let d = draft(2020, Sex::Male).with_parents(vec![a.id, HorseId(77)]);
        let messages = run(&repo, &d, None).await;

        // only one parent resolved, so no pair checks
        assert_eq!(messages, vec!["Parent horse with ID 77 does not exist"]);
    }

    #[tokio::test]
    async fn test_same_horse_twice() {
        let repo = FakeRepository::new();
        let a = repo.horse("A", 2010, Sex::Female);

        let d = draft(2020, Sex::Male).with_parents(vec![a.id, a.id]);
        let messages = run(&repo, &d, None).await;

        assert!(messages.contains(&"Cannot have the same horse as both parents".to_string()));
        // checked independently of the duplicate
        assert!(messages.contains(&"Parents must have different genders".to_string()));
        assert_eq!(repo.horse_lookups(), 1);
    }

    #[tokio::test]
    async fn test_same_sex_parents_with_valid_ages() {
        let repo = FakeRepository::new();
        let a = repo.horse("A", 2010, Sex::Male);
        let b = repo.horse("B", 2008, Sex::Male);

        let d = draft(2020, Sex::Male).with_parents(vec![a.id, b.id]);

        assert_eq!(
            run(&repo, &d, None).await,
            vec!["Parents must have different genders"]
        );
    }

    #[tokio::test]
    async fn test_parent_must_be_strictly_older() {
        let repo = FakeRepository::new();
        let same_day = repo.horse("Twin", 2020, Sex::Female);
        let younger = repo.horse("Foal", 2021, Sex::Male);

        let mut d = draft(2020, Sex::Male).with_parents(vec![same_day.id, younger.id]);
        d.date_of_birth = Some(date(2020, 1, 1));

        assert_eq!(
            run(&repo, &d, None).await,
            vec![
                format!("Parent horse with ID {} must be born before the child", same_day.id),
                format!("Parent horse with ID {} must be born before the child", younger.id),
            ]
        );
    }

    #[tokio::test]
    async fn test_cannot_be_own_parent() {
        let repo = FakeRepository::new();
        let horse = repo.horse("Self", 2015, Sex::Male);

        let d = HorseDraft::from_horse(&horse).with_parents(vec![horse.id]);
        let messages = run(&repo, &d, Some(horse.id)).await;

        // same birth date, so the age check fails too
        assert_eq!(
            messages,
            vec![
                "A horse cannot be its own parent".to_string(),
                format!("Parent horse with ID {} must be born before the child", horse.id),
            ]
        );
    }

    #[tokio::test]
    async fn test_repeated_parent_reported_once() {
        let repo = FakeRepository::new();
        let young = repo.horse("Young", 2021, Sex::Female);

        let d = draft(2020, Sex::Male).with_parents(vec![young.id, young.id]);

        assert_eq!(
            run(&repo, &d, None).await,
            vec![
                format!("Parent horse with ID {} must be born before the child", young.id),
                "Cannot have the same horse as both parents".to_string(),
                "Parents must have different genders".to_string(),
            ]
        );
        assert_eq!(repo.horse_lookups(), 1);
    }

    #[tokio::test]
    async fn test_repeated_missing_parent_reported_once() {
        let repo = FakeRepository::new();

        let d = draft(2020, Sex::Male).with_parents(vec![HorseId(9), HorseId(9)]);

        assert_eq!(
            run(&repo, &d, None).await,
            vec!["Parent horse with ID 9 does not exist"]
        );
    }

    #[tokio::test]
    async fn test_update_keeps_stored_parents_when_not_supplied() {
        let repo = FakeRepository::new();
        let mother = repo.horse("Mother", 2010, Sex::Female);
        let horse = repo.horse("Horse", 2015, Sex::Male);
        repo.link(&horse, &mother);

        // moving the birth date before the mother's is caught
        let mut d = HorseDraft::from_horse(&horse);
        d.date_of_birth = Some(date(2009, 1, 1));

        assert_eq!(
            run(&repo, &d, Some(horse.id)).await,
            vec![format!("Parent horse with ID {} must be born before the child", mother.id)]
        );
    }

    #[tokio::test]
    async fn test_update_must_stay_older_than_children() {
        let repo = FakeRepository::new();
        let sire = repo.horse("Sire", 2005, Sex::Male);
        let foal = repo.horse("Foal", 2012, Sex::Female);
        repo.link(&foal, &sire);

        let mut d = HorseDraft::from_horse(&sire);
        d.date_of_birth = Some(date(2013, 1, 1));

        assert_eq!(
            run(&repo, &d, Some(sire.id)).await,
            vec![format!("Horse must be born before its child with ID {}", foal.id)]
        );
    }

    #[tokio::test]
    async fn test_update_sex_change_conflicting_with_co_parent() {
        let repo = FakeRepository::new();
        let dam = repo.horse("Dam", 2005, Sex::Female);
        let sire = repo.horse("Sire", 2004, Sex::Male);
        let foal = repo.horse("Foal", 2012, Sex::Female);
        repo.link(&foal, &dam);
        repo.link(&foal, &sire);

        let mut d = HorseDraft::from_horse(&sire);
        d.sex = Some(Sex::Female);

        assert_eq!(
            run(&repo, &d, Some(sire.id)).await,
            vec![format!(
                "Changing gender conflicts with the other parent of child with ID {}",
                foal.id
            )]
        );

        // unchanged sex is fine
        let unchanged = HorseDraft::from_horse(&sire);
        assert!(run(&repo, &unchanged, Some(sire.id)).await.is_empty());
    }

    #[tokio::test]
    async fn test_violation_serializes_with_rule_tag() {
        let json = serde_json::to_value(Violation::ParentNotFound {
            parent_id: HorseId(5),
        })
        .unwrap();
        assert_eq!(json["rule"], "parent_not_found");
        assert_eq!(json["parent_id"], 5);
    }
}
