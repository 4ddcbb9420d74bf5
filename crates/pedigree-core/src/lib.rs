//! Pedigree Core - Horse registry and ancestry engine
//!
//! This crate provides the domain types, the repository trait the storage
//! backends implement, the horse validator and the ancestor tree builder.

pub mod error;
pub mod horse;
pub mod limits;
pub mod owner;
pub mod parent;
pub mod query;
pub mod repository;
pub mod service;
pub mod tree;
pub mod validation;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use horse::{Horse, HorseDraft, HorseId, NewHorse, Sex};
pub use owner::{NewOwner, Owner, OwnerId};
pub use parent::{Parent, ParentLink, ParentRole};
pub use query::HorseSearch;
pub use repository::PedigreeRepository;
pub use service::{HorseDetail, HorseService};
pub use tree::{AncestorNode, TreeBuilder, TreeStats};
pub use validation::{Validator, Violation};
