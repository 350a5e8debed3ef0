use crate::domain::ports::StateBackend;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the local session state.
pub const CF_LOCAL_STATE: &str = "local_state";

/// A persistent key/value backend using RocksDB.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbBackend {
    db: Arc<DB>,
}

impl RocksDbBackend {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_state = ColumnFamilyDescriptor::new(CF_LOCAL_STATE, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_state])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn handle(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_LOCAL_STATE).ok_or_else(|| {
            MarketError::InternalError(Box::new(std::io::Error::other(
                "Local state column family not found",
            )))
        })
    }
}

#[async_trait]
impl StateBackend for RocksDbBackend {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.handle()?;
        Ok(self.db.get_cf(cf, key.as_bytes())?)
    }

    async fn save(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let cf = self.handle()?;
        self.db.put_cf(cf, key.as_bytes(), value)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let cf = self.handle()?;
        self.db.delete_cf(cf, key.as_bytes())?;
        Ok(())
    }
}
