//! SQLite storage backend

use crate::error::{StorageError, StorageResult};
use crate::migration::{Migratable, SchemaVersion};
use crate::traits::StorageBackend;
use async_trait::async_trait;
use chrono::NaiveDate;
use pedigree_core::{
    Error, Horse, HorseId, NewHorse, NewOwner, Owner, OwnerId, ParentLink, PedigreeRepository,
    Result, Sex,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const DATE_FORMAT: &str = "%Y-%m-%d";

const HORSE_COLUMNS: &str = "id, name, description, date_of_birth, sex, owner_id";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

/// A `horses` row before date and sex are parsed
struct HorseRow {
    id: i64,
    name: String,
    description: Option<String>,
    date_of_birth: String,
    sex: String,
    owner_id: Option<i64>,
}

impl HorseRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            date_of_birth: row.get(3)?,
            sex: row.get(4)?,
            owner_id: row.get(5)?,
        })
    }
}

impl TryFrom<HorseRow> for Horse {
    type Error = StorageError;

    fn try_from(row: HorseRow) -> StorageResult<Self> {
        let date_of_birth = NaiveDate::parse_from_str(&row.date_of_birth, DATE_FORMAT)
            .map_err(|e| {
                StorageError::InvalidData(format!(
                    "horse {}: bad date_of_birth '{}': {}",
                    row.id, row.date_of_birth, e
                ))
            })?;
        let sex: Sex = row
            .sex
            .parse()
            .map_err(|e| StorageError::InvalidData(format!("horse {}: {}", row.id, e)))?;

        Ok(Horse {
            id: HorseId(row.id),
            name: row.name,
            description: row.description,
            date_of_birth,
            sex,
            owner_id: row.owner_id.map(OwnerId),
        })
    }
}

fn owner_from_row(row: &Row<'_>) -> rusqlite::Result<Owner> {
    Ok(Owner {
        id: OwnerId(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
    })
}

fn edge_from_row(row: &Row<'_>) -> rusqlite::Result<ParentLink> {
    Ok(ParentLink::new(HorseId(row.get(0)?), HorseId(row.get(1)?)))
}

impl SqliteStorage {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path).map_err(|e| StorageError::Database(e.to_string()))?;

        let storage = Self { conn: Mutex::new(conn) };
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    /// Create an in-memory SQLite database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Database(e.to_string()))?;

        let storage = Self { conn: Mutex::new(conn) };
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }

    fn query_horses(&self, sql: &str, args: impl rusqlite::Params) -> StorageResult<Vec<Horse>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(args, HorseRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(Horse::try_from).collect()
    }

    fn query_edges(&self, sql: &str, id: HorseId) -> StorageResult<Vec<ParentLink>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let edges = stmt
            .query_map(params![id.get()], edge_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    fn execute(&self, sql: &str, args: impl rusqlite::Params) -> StorageResult<usize> {
        let conn = self.conn()?;
        Ok(conn.execute(sql, args)?)
    }
}

impl Migratable for SqliteStorage {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let conn = self.conn()?;
        let version = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.pragma_update(None, "user_version", version)?;
        Ok(())
    }

    fn apply(&self, migration: &SchemaVersion) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(migration.sql).map_err(|e| {
            StorageError::Migration(format!("v{} failed: {}", migration.version, e))
        })
    }
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    async fn initialize(&self) -> StorageResult<()> {
        self.migrate_to_latest()
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(true)
    }
}

#[async_trait]
impl PedigreeRepository for SqliteStorage {
    async fn get_horse(&self, id: HorseId) -> Result<Option<Horse>> {
        let row = {
            let conn = self.conn()?;
            conn.query_row(
                &format!("SELECT {} FROM horses WHERE id = ?1", HORSE_COLUMNS),
                params![id.get()],
                HorseRow::from_row,
            )
            .optional()
            .map_err(StorageError::from)?
        };

        match row {
            Some(row) => Ok(Some(Horse::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn get_all_horses(&self) -> Result<Vec<Horse>> {
        let sql = format!("SELECT {} FROM horses ORDER BY id", HORSE_COLUMNS);
        Ok(self.query_horses(&sql, [])?)
    }

    async fn create_horse(&self, horse: NewHorse) -> Result<Horse> {
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO horses (name, description, date_of_birth, sex, owner_id) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    horse.name,
                    horse.description,
                    horse.date_of_birth.format(DATE_FORMAT).to_string(),
                    horse.sex.as_str(),
                    horse.owner_id.map(|o| o.get()),
                ],
            )
            .map_err(StorageError::from)?;
            conn.last_insert_rowid()
        };

        Ok(horse.into_horse(HorseId(id)))
    }

    async fn update_horse(&self, horse: &Horse) -> Result<Horse> {
        let changed = self.execute(
            "UPDATE horses SET name = ?2, description = ?3, date_of_birth = ?4, sex = ?5, owner_id = ?6 WHERE id = ?1",
            params![
                horse.id.get(),
                horse.name,
                horse.description,
                horse.date_of_birth.format(DATE_FORMAT).to_string(),
                horse.sex.as_str(),
                horse.owner_id.map(|o| o.get()),
            ],
        )?;

        if changed == 0 {
            return Err(Error::HorseNotFound(horse.id));
        }
        Ok(horse.clone())
    }

    async fn delete_horse(&self, id: HorseId) -> Result<()> {
        self.execute("DELETE FROM horses WHERE id = ?1", params![id.get()])?;
        Ok(())
    }

    async fn get_parent_edges(&self, horse_id: HorseId) -> Result<Vec<ParentLink>> {
        Ok(self.query_edges(
            "SELECT horse_id, parent_id FROM horse_parent WHERE horse_id = ?1 ORDER BY parent_id",
            horse_id,
        )?)
    }

    async fn get_child_edges(&self, parent_id: HorseId) -> Result<Vec<ParentLink>> {
        Ok(self.query_edges(
            "SELECT horse_id, parent_id FROM horse_parent WHERE parent_id = ?1 ORDER BY horse_id",
            parent_id,
        )?)
    }

    async fn replace_parents(&self, horse_id: HorseId, parent_ids: &[HorseId]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        tx.execute(
            "DELETE FROM horse_parent WHERE horse_id = ?1",
            params![horse_id.get()],
        )
        .map_err(StorageError::from)?;
        for parent_id in parent_ids {
            tx.execute(
                "INSERT OR IGNORE INTO horse_parent (horse_id, parent_id) VALUES (?1, ?2)",
                params![horse_id.get(), parent_id.get()],
            )
            .map_err(StorageError::from)?;
        }

        tx.commit()
            .map_err(|e| StorageError::Transaction(e.to_string()))?;
        Ok(())
    }

    async fn delete_parent_edges(&self, horse_id: HorseId) -> Result<()> {
        self.execute(
            "DELETE FROM horse_parent WHERE horse_id = ?1",
            params![horse_id.get()],
        )?;
        Ok(())
    }

    async fn delete_child_edges(&self, parent_id: HorseId) -> Result<()> {
        self.execute(
            "DELETE FROM horse_parent WHERE parent_id = ?1",
            params![parent_id.get()],
        )?;
        Ok(())
    }

    async fn create_owner(&self, owner: NewOwner) -> Result<Owner> {
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO owners (first_name, last_name, email) VALUES (?1, ?2, ?3)",
                params![owner.first_name, owner.last_name, owner.email],
            )
            .map_err(StorageError::from)?;
            conn.last_insert_rowid()
        };

        Ok(owner.into_owner(OwnerId(id)))
    }

    async fn get_owner(&self, id: OwnerId) -> Result<Option<Owner>> {
        let conn = self.conn()?;
        let owner = conn
            .query_row(
                "SELECT id, first_name, last_name, email FROM owners WHERE id = ?1",
                params![id.get()],
                owner_from_row,
            )
            .optional()
            .map_err(StorageError::from)?;
        Ok(owner)
    }

    async fn get_all_owners(&self) -> Result<Vec<Owner>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, first_name, last_name, email FROM owners ORDER BY id")
            .map_err(StorageError::from)?;
        let owners = stmt
            .query_map([], owner_from_row)
            .map_err(StorageError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StorageError::from)?;
        Ok(owners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::CURRENT_VERSION;

    fn new_horse(name: &str, year: i32, sex: Sex) -> NewHorse {
        NewHorse::new(name, NaiveDate::from_ymd_opt(year, 1, 1).unwrap(), sex)
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.initialize().await.unwrap();
        assert!(storage.health_check().await.unwrap());

        let owner = storage
            .create_owner(NewOwner::new("Anna", "Huber").with_email("anna@example.org"))
            .await
            .unwrap();
        let horse = storage
            .create_horse(
                new_horse("Wendy", 2015, Sex::Female)
                    .with_description("Bay mare")
                    .with_owner(owner.id),
            )
            .await
            .unwrap();

        let retrieved = storage.get_horse(horse.id).await.unwrap().unwrap();
        assert_eq!(retrieved, horse);
        assert_eq!(storage.get_owner(owner.id).await.unwrap(), Some(owner));

        let mut changed = horse.clone();
        changed.description = None;
        changed.sex = Sex::Male;
        storage.update_horse(&changed).await.unwrap();
        assert_eq!(storage.get_horse(horse.id).await.unwrap(), Some(changed));

        storage.delete_horse(horse.id).await.unwrap();
        assert!(storage.get_horse(horse.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_horse() {
        let storage = SqliteStorage::in_memory().unwrap();
        let ghost = new_horse("Ghost", 2015, Sex::Male).into_horse(HorseId(42));

        let err = storage.update_horse(&ghost).await.unwrap_err();
        assert!(matches!(err, Error::HorseNotFound(HorseId(42))));
    }

    #[tokio::test]
    async fn test_sqlite_edges() {
        let storage = SqliteStorage::in_memory().unwrap();
        let foal = HorseId(10);

        storage
            .replace_parents(foal, &[HorseId(7), HorseId(3)])
            .await
            .unwrap();
        storage
            .replace_parents(HorseId(4), &[HorseId(3)])
            .await
            .unwrap();

        let ids: Vec<_> = storage
            .get_parent_edges(foal)
            .await
            .unwrap()
            .iter()
            .map(|e| e.parent_id)
            .collect();
        assert_eq!(ids, vec![HorseId(3), HorseId(7)]);

        let ids: Vec<_> = storage
            .get_child_edges(HorseId(3))
            .await
            .unwrap()
            .iter()
            .map(|e| e.horse_id)
            .collect();
        assert_eq!(ids, vec![HorseId(4), foal]);

        storage.replace_parents(foal, &[]).await.unwrap();
        assert!(storage.get_parent_edges(foal).await.unwrap().is_empty());

        storage.delete_child_edges(HorseId(3)).await.unwrap();
        assert!(storage.get_child_edges(HorseId(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pedigree.db");

        let id = {
            let storage = SqliteStorage::open(&path).unwrap();
            let dam = storage
                .create_horse(new_horse("Dam", 2010, Sex::Female))
                .await
                .unwrap();
            let foal = storage
                .create_horse(new_horse("Foal", 2020, Sex::Male))
                .await
                .unwrap();
            storage.replace_parents(foal.id, &[dam.id]).await.unwrap();
            foal.id
        };

        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(storage.get_schema_version().unwrap(), CURRENT_VERSION);
        assert_eq!(storage.get_all_horses().await.unwrap().len(), 2);
        assert_eq!(storage.get_parent_edges(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_row_is_reported() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage
            .execute(
                "INSERT INTO horses (name, date_of_birth, sex) VALUES ('Bad', 'yesterday', 'MALE')",
                [],
            )
            .unwrap();

        let err = storage.get_all_horses().await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
