//! Input limits for horse records and tree retrieval

/// Maximum description length in characters (4095)
pub const MAX_DESCRIPTION_LEN: usize = 4095;

/// Maximum parents per horse (2)
pub const MAX_PARENTS: usize = 2;

/// Smallest accepted generation bound for a family tree (1)
pub const MIN_GENERATIONS: u32 = 1;

/// Largest accepted generation bound for a family tree (10)
pub const MAX_GENERATIONS: u32 = 10;

/// Maximum nodes in a single family tree; a complete 10-generation tree has 1023
pub const MAX_TREE_NODES: usize = (1 << (MAX_GENERATIONS + 1)) - 1;

/// Default number of results for parent candidate searches (5)
pub const DEFAULT_PARENT_SEARCH_LIMIT: usize = 5;

/// Limit violation
#[derive(Debug, Clone, PartialEq)]
pub enum LimitError {
    DescriptionTooLong { len: usize, max: usize },
    TooManyParents { count: usize, max: usize },
    GenerationsOutOfRange { value: u32, min: u32, max: u32 },
}

impl std::fmt::Display for LimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DescriptionTooLong { max, .. } => {
                write!(f, "Horse description too long: longer than {} characters", max)
            }
            Self::TooManyParents { max, .. } => {
                write!(f, "A horse can have at most {} parents", max)
            }
            Self::GenerationsOutOfRange { value, min, max } => {
                write!(
                    f,
                    "Maximum generations must be between {} and {}, got {}",
                    min, max, value
                )
            }
        }
    }
}

impl std::error::Error for LimitError {}

impl From<LimitError> for crate::Error {
    fn from(err: LimitError) -> Self {
        match err {
            LimitError::GenerationsOutOfRange { value, min, max } => {
                crate::Error::InvalidGenerations { value, min, max }
            }
            other => crate::Error::validation("Limit exceeded", vec![other.to_string()]),
        }
    }
}

/// Validate description length (counted in characters, not bytes)
pub fn validate_description_len(description: &str) -> Result<(), LimitError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(LimitError::DescriptionTooLong {
            len,
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

/// Validate number of proposed parents
pub fn validate_parent_count(count: usize) -> Result<(), LimitError> {
    if count > MAX_PARENTS {
        return Err(LimitError::TooManyParents {
            count,
            max: MAX_PARENTS,
        });
    }
    Ok(())
}

/// Validate the generation bound of a family tree request
pub fn validate_generations(generations: u32) -> Result<(), LimitError> {
    if !(MIN_GENERATIONS..=MAX_GENERATIONS).contains(&generations) {
        return Err(LimitError::GenerationsOutOfRange {
            value: generations,
            min: MIN_GENERATIONS,
            max: MAX_GENERATIONS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_description_len() {
        assert!(validate_description_len(&"x".repeat(4095)).is_ok());
        assert!(validate_description_len(&"x".repeat(4096)).is_err());
        // multi-byte characters count once each
        assert!(validate_description_len(&"ä".repeat(4095)).is_ok());
    }

    #[test]
    fn test_validate_parent_count() {
        assert!(validate_parent_count(0).is_ok());
        assert!(validate_parent_count(2).is_ok());
        assert_eq!(
            validate_parent_count(3),
            Err(LimitError::TooManyParents { count: 3, max: 2 })
        );
    }

    #[test]
    fn test_validate_generations() {
        assert!(validate_generations(1).is_ok());
        assert!(validate_generations(10).is_ok());
        assert!(validate_generations(0).is_err());
        assert!(validate_generations(11).is_err());
    }

    #[test]
    fn test_tree_node_budget() {
        assert_eq!(MAX_TREE_NODES, 2047);
    }
}
