//! Schema migrations for Pedigree storage backends
//!
//! Each schema version carries the SQL that upgrades the previous one.
//! Backends record the applied version and replay whatever is missing.

use crate::{StorageError, StorageResult};

/// Current schema version
pub const CURRENT_VERSION: u32 = 1;

/// Schema migration information
#[derive(Debug, Clone)]
pub struct SchemaVersion {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

const V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS owners (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT
);

CREATE TABLE IF NOT EXISTS horses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    date_of_birth TEXT NOT NULL,
    sex TEXT NOT NULL CHECK (sex IN ('FEMALE', 'MALE')),
    owner_id INTEGER REFERENCES owners(id)
);

CREATE TABLE IF NOT EXISTS horse_parent (
    horse_id INTEGER NOT NULL,
    parent_id INTEGER NOT NULL,
    PRIMARY KEY (horse_id, parent_id)
);

CREATE INDEX IF NOT EXISTS idx_horse_parent_parent ON horse_parent(parent_id);
CREATE INDEX IF NOT EXISTS idx_horses_owner ON horses(owner_id);
"#;

/// All schema versions with their migrations
pub fn get_migrations() -> Vec<SchemaVersion> {
    vec![SchemaVersion {
        version: 1,
        description: "Initial schema with owners, horses, and parent edges",
        sql: V1_SQL,
    }]
}

/// Migration trait for storage backends
pub trait Migratable {
    /// Get the current schema version from storage
    fn get_schema_version(&self) -> StorageResult<u32>;

    /// Set the schema version in storage
    fn set_schema_version(&self, version: u32) -> StorageResult<()>;

    /// Execute one migration's SQL
    fn apply(&self, migration: &SchemaVersion) -> StorageResult<()>;

    /// Run a specific migration
    fn run_migration(&self, version: u32) -> StorageResult<()> {
        let migration = get_migrations()
            .into_iter()
            .find(|m| m.version == version)
            .ok_or_else(|| StorageError::Migration(format!("Unknown schema version {}", version)))?;

        tracing::debug!("Applying migration v{}: {}", version, migration.description);
        self.apply(&migration)
    }

    /// Run migrations from current version to target version
    fn migrate_to(&self, target_version: u32) -> StorageResult<()> {
        let current = self.get_schema_version()?;

        if current == target_version {
            tracing::debug!("Schema already at version {}", target_version);
            return Ok(());
        }

        if current > target_version {
            tracing::warn!(
                "Schema version {} is newer than target {}. Downgrades not supported.",
                current,
                target_version
            );
            return Ok(());
        }

        tracing::info!("Migrating schema from v{} to v{}", current, target_version);

        for version in (current + 1)..=target_version {
            self.run_migration(version)?;
            self.set_schema_version(version)?;
            tracing::info!("Migrated to schema version {}", version);
        }

        Ok(())
    }

    /// Migrate to the latest version
    fn migrate_to_latest(&self) -> StorageResult<()> {
        self.migrate_to(CURRENT_VERSION)
    }
}
