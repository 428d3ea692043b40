use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::memory::{MemoryStore, Snapshot};
use super::RecordStore;
use crate::error::{DairyError, Result};
use crate::model::{Customer, CustomerId, Entry, EntryId, Payment, PaymentId};

/// Record store backed by a TOML file.
///
/// Every call loads the file under an OS lock on a sibling `.lock` file:
/// shared for reads, exclusive for the whole load, change and save cycle
/// of a mutation. Separate processes (and separate handles in one process)
/// therefore never overwrite each other's changes. A missing file is an
/// empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let store = Self {
            lock_path: path.with_extension("toml.lock"),
            path,
        };
        // Surface a corrupt file at open time rather than on first use.
        store.read(|_| Ok(()))?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> Result<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(unavailable)
    }

    fn load(&self) -> Result<MemoryStore> {
        if !self.path.exists() {
            return Ok(MemoryStore::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = toml::from_str(&content).map_err(|source| DairyError::StoreParse {
            path: self.path.clone(),
            source,
        })?;
        Ok(MemoryStore::from_snapshot(snapshot))
    }

    /// Run `f` against the current file contents under a shared lock.
    fn read<T>(&self, f: impl FnOnce(&MemoryStore) -> Result<T>) -> Result<T> {
        let lock = self.lock_file()?;
        lock.lock_shared().map_err(unavailable)?;
        f(&self.load()?)
    }

    /// Reload, apply `f` and save, all under one exclusive lock. If `f` or
    /// the save fails the file is left exactly as it was.
    fn write<T>(&self, f: impl FnOnce(&MemoryStore) -> Result<T>) -> Result<T> {
        let lock = self.lock_file()?;
        lock.lock().map_err(unavailable)?;
        let records = self.load()?;
        let out = f(&records)?;
        self.save(&records)?;
        Ok(out)
    }

    /// Replace the file with `records` (tmp file, then rename). The caller
    /// holds the exclusive lock.
    fn save(&self, records: &MemoryStore) -> Result<()> {
        let content = toml::to_string_pretty(&records.snapshot()?)
            .map_err(|e| DairyError::StoreUnavailable(e.to_string()))?;

        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content).map_err(unavailable)?;
        fs::rename(&tmp, &self.path).map_err(unavailable)?;
        debug!(path = %self.path.display(), "records saved");
        Ok(())
    }
}

fn unavailable(e: std::io::Error) -> DairyError {
    DairyError::StoreUnavailable(e.to_string())
}

impl RecordStore for FileStore {
    fn insert_customer(&self, customer: Customer) -> Result<()> {
        self.write(|records| records.insert_customer(customer))
    }

    fn customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        self.read(|records| records.customer(id))
    }

    fn customers(&self) -> Result<Vec<Customer>> {
        self.read(|records| records.customers())
    }

    fn insert_entry(&self, entry: Entry) -> Result<()> {
        self.write(|records| records.insert_entry(entry))
    }

    fn remove_entry(&self, id: EntryId) -> Result<()> {
        self.write(|records| records.remove_entry(id))
    }

    fn insert_payment(&self, payment: Payment) -> Result<()> {
        self.write(|records| records.insert_payment(payment))
    }

    fn remove_payment(&self, id: PaymentId) -> Result<()> {
        self.write(|records| records.remove_payment(id))
    }

    fn entries_between(
        &self,
        customer: CustomerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>> {
        self.read(|records| records.entries_between(customer, start, end))
    }

    fn payments_between(
        &self,
        customer: CustomerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Payment>> {
        self.read(|records| records.payments_between(customer, start, end))
    }

    fn update_due(
        &self,
        id: CustomerId,
        apply: &dyn Fn(Decimal) -> Result<Decimal>,
    ) -> Result<Decimal> {
        self.write(|records| records.update_due(id, apply))
    }
}
