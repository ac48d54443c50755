// 🗄️ Store contract
// What the service and the hierarchy resolver need from persistence

use crate::entities::{Bank, Country};
use crate::error::StoreError;

/// Outcome of a bulk insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkInsert {
    pub inserted: usize,
    pub duplicates: usize,
}

/// Persistence for banks and countries.
///
/// Implementations own concurrency control, including uniqueness of
/// `swift_code` across concurrent inserts.
pub trait BankStore: Send + Sync {
    /// `NotFound` when no bank carries `code`.
    fn find_by_code(&self, code: &str) -> Result<Bank, StoreError>;

    /// Every bank whose branch code equals `branch_code`, head office included.
    fn find_by_branch_code(&self, branch_code: &str) -> Result<Vec<Bank>, StoreError>;

    /// Banks of one country, ordered by SWIFT code.
    fn find_by_country(&self, country_iso2: &str) -> Result<Vec<Bank>, StoreError>;

    /// `NotFound` when the country is unknown.
    fn find_country(&self, country_iso2: &str) -> Result<Country, StoreError>;

    /// `AlreadyExists` when the SWIFT code is taken.
    fn insert_bank(&self, bank: &Bank) -> Result<(), StoreError>;

    /// Insert many banks, skipping (and counting) duplicates.
    fn insert_banks(&self, banks: &[Bank]) -> Result<BulkInsert, StoreError>;

    /// Insert, or merge into the stored country (see `Country::merge`).
    fn upsert_country(&self, country: &Country) -> Result<(), StoreError>;

    /// `NotFound` when nothing was deleted.
    fn delete_bank(&self, code: &str) -> Result<(), StoreError>;

    fn count_banks(&self) -> Result<i64, StoreError>;
}
