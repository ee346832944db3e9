//! redb-backed snapshot store

use std::path::{Path, PathBuf};

use nimbus_api::{Endpoint, Snapshot};
use redb::{Database, ReadableTable, TableDefinition};
use tracing::{debug, info, instrument};

use crate::error::StoreError;
use crate::key;
use crate::traits::SnapshotStore;

/// Snapshots keyed by varint timestamp, valued by the JSON endpoint list.
const SNAPSHOTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("snapshots");

/// Snapshot store over a single redb database file
///
/// Writes are serialized by redb's single write transaction; reads run on
/// MVCC read transactions and never block writers.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    /// Open (or create) the database file and ensure the snapshot table exists
    ///
    /// # Errors
    /// Returns an error if the file cannot be created, is locked by another
    /// process, or the table cannot be created.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path)?;

        let txn = db.begin_write()?;
        txn.open_table(SNAPSHOTS)?;
        txn.commit()?;

        info!("snapshot store opened");
        Ok(Self { db, path })
    }

    /// Location of the database file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the database file
    pub fn close(self) {
        let Self { db, path } = self;
        drop(db);
        info!(path = %path.display(), "snapshot store closed");
    }
}

fn decode_endpoints(timestamp: i64, raw: &[u8]) -> Result<Vec<Endpoint>, StoreError> {
    serde_json::from_slice(raw).map_err(|source| StoreError::Decode { timestamp, source })
}

impl SnapshotStore for RedbStore {
    #[instrument(skip(self, endpoints), fields(count = endpoints.len()))]
    fn store(&self, timestamp: i64, endpoints: &[Endpoint]) -> Result<(), StoreError> {
        let value = serde_json::to_vec(endpoints)
            .map_err(|source| StoreError::Encode { timestamp, source })?;
        let key = key::encode(timestamp);

        let txn = self.db.begin_write()?;
        let replaced = {
            let mut table = txn.open_table(SNAPSHOTS)?;
            table.insert(key.as_slice(), value.as_slice())?.is_some()
        };
        txn.commit()?;

        debug!(replaced, "snapshot stored");
        Ok(())
    }

    fn list(&self) -> Result<Vec<Snapshot>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SNAPSHOTS)?;

        let mut snapshots = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let timestamp = key::decode(key.value())?;
            let endpoints = decode_endpoints(timestamp, value.value())?;
            snapshots.push(Snapshot::new(timestamp, endpoints));
        }

        debug!(count = snapshots.len(), "snapshots listed");
        Ok(snapshots)
    }

    fn get(&self, timestamp: i64) -> Result<Snapshot, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SNAPSHOTS)?;

        let key = key::encode(timestamp);
        let value = table
            .get(key.as_slice())?
            .ok_or(StoreError::NotFound(timestamp))?;

        let endpoints = decode_endpoints(timestamp, value.value())?;
        Ok(Snapshot::new(timestamp, endpoints))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn open_temp() -> (TempDir, RedbStore) {
        let dir = TempDir::new().unwrap();
        let store = RedbStore::open(dir.path().join("snapshots.db")).unwrap();
        (dir, store)
    }

    fn endpoint(kind: &str, name: &str, ip: &str) -> Endpoint {
        Endpoint::new(kind, name)
            .with_ip(ip.parse().unwrap())
            .with_cloud("gcp")
    }

    fn put_raw(store: &RedbStore, key: &[u8], value: &[u8]) {
        let txn = store.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(SNAPSHOTS).unwrap();
            table.insert(key, value).unwrap();
        }
        txn.commit().unwrap();
    }

    #[test]
    fn test_store_then_get() {
        let (_dir, store) = open_temp();
        let endpoints = vec![
            endpoint("instance", "web-1", "10.0.0.2"),
            endpoint("address", "lb", "2001:db8::10"),
            Endpoint::new("redis", "rc1a.mdb").with_cloud("yc"),
        ];

        store.store(1_700_000_000, &endpoints).unwrap();

        let snapshot = store.get(1_700_000_000).unwrap();
        assert_eq!(snapshot, Snapshot::new(1_700_000_000, endpoints));
    }

    #[test]
    fn test_empty_snapshot_is_not_missing() {
        let (_dir, store) = open_temp();

        store.store(42, &[]).unwrap();

        let snapshot = store.get(42).unwrap();
        assert!(snapshot.endpoints.is_empty());
        assert!(store.get(43).unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_missing() {
        let (_dir, store) = open_temp();
        let err = store.get(-5).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(-5)));
    }

    #[test]
    fn test_last_write_wins() {
        let (_dir, store) = open_temp();
        let first = vec![endpoint("instance", "old", "10.0.0.1")];
        let second = vec![endpoint("instance", "new", "10.0.0.2")];

        store.store(100, &first).unwrap();
        store.store(100, &second).unwrap();

        assert_eq!(store.get(100).unwrap().endpoints, second);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_list_returns_every_snapshot() {
        let (_dir, store) = open_temp();
        for t in [-3, 0, 7, 1_700_000_000, i64::MAX] {
            store.store(t, &[endpoint("instance", "vm", "10.0.0.1")]).unwrap();
        }

        let mut timestamps: Vec<i64> = store.list().unwrap().iter().map(|s| s.timestamp).collect();
        timestamps.sort_unstable();
        assert_eq!(timestamps, vec![-3, 0, 7, 1_700_000_000, i64::MAX]);
    }

    #[test]
    fn test_corrupted_value_is_an_error() {
        let (_dir, store) = open_temp();
        store.store(1, &[]).unwrap();
        put_raw(&store, &key::encode(2), b"{not json");

        let err = store.get(2).unwrap_err();
        assert!(matches!(err, StoreError::Decode { timestamp: 2, .. }));

        let err = store.list().unwrap_err();
        assert!(matches!(err, StoreError::Decode { timestamp: 2, .. }));
    }

    #[test]
    fn test_corrupted_key_is_an_error() {
        let (_dir, store) = open_temp();
        put_raw(&store, &[0x80], b"[]");

        assert!(matches!(store.list().unwrap_err(), StoreError::Key(_)));
    }

    #[test]
    fn test_reopen_keeps_snapshots() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshots.db");

        let store = RedbStore::open(&path).unwrap();
        store.store(9, &[endpoint("instance", "vm", "10.0.0.1")]).unwrap();
        store.close();

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get(9).unwrap().endpoints.len(), 1);
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_open_fails_while_held() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshots.db");

        let _held = RedbStore::open(&path).unwrap();
        assert!(RedbStore::open(&path).is_err());
    }
}
