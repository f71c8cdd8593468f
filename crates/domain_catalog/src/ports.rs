//! Storage port for the country catalog
//!
//! The store is a transactional unit of work: writes are staged against
//! `&self` and take effect when `commit` runs, which reports the number of
//! rows the batch affected (zero is "nothing changed", not an error).

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};

use crate::country::{Country, NewCountry};

/// Port for persisting the country catalog
#[async_trait]
pub trait CountryStore: DomainPort {
    /// Loads the full persisted catalog
    async fn list_countries(&self) -> Result<Vec<Country>, PortError>;

    /// Stages a batch of new catalog rows
    async fn add_countries(&self, rows: Vec<NewCountry>) -> Result<(), PortError>;

    /// Stages an update of one catalog row, matched by id
    async fn update_country(&self, row: &Country) -> Result<(), PortError>;

    /// Applies all staged writes; returns the number of rows affected
    async fn commit(&self) -> Result<u64, PortError>;
}

/// In-memory mock of [`CountryStore`] for testing without a database.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::CountryId;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    struct Staged {
        inserts: Vec<NewCountry>,
        updates: Vec<Country>,
    }

    #[derive(Debug, Default)]
    struct Committed {
        rows: Vec<Country>,
        next_id: i32,
    }

    /// Mock catalog store with staged/committed split, so `commit` can report
    /// affected rows and abandoned sessions leave no trace.
    #[derive(Debug, Default)]
    pub struct MockCountryStore {
        committed: Arc<RwLock<Committed>>,
        staged: Arc<RwLock<Staged>>,
    }

    impl MockCountryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the committed catalog
        pub async fn with_countries(rows: Vec<NewCountry>) -> Self {
            let store = Self::new();
            {
                let mut committed = store.committed.write().await;
                for row in rows {
                    committed.next_id += 1;
                    let id = committed.next_id;
                    committed.rows.push(Country {
                        id: CountryId::new(id),
                        iso_code: row.iso_code,
                        name: row.name,
                        flag_url: row.flag_url,
                    });
                }
            }
            store
        }

        /// Committed rows, for assertions
        pub async fn snapshot(&self) -> Vec<Country> {
            self.committed.read().await.rows.clone()
        }
    }

    impl DomainPort for MockCountryStore {}

    #[async_trait]
    impl CountryStore for MockCountryStore {
        async fn list_countries(&self) -> Result<Vec<Country>, PortError> {
            Ok(self.committed.read().await.rows.clone())
        }

        async fn add_countries(&self, rows: Vec<NewCountry>) -> Result<(), PortError> {
            self.staged.write().await.inserts.extend(rows);
            Ok(())
        }

        async fn update_country(&self, row: &Country) -> Result<(), PortError> {
            self.staged.write().await.updates.push(row.clone());
            Ok(())
        }

        async fn commit(&self) -> Result<u64, PortError> {
            let mut staged = self.staged.write().await;
            let mut committed = self.committed.write().await;
            let mut affected = 0u64;

            for row in staged.inserts.drain(..) {
                committed.next_id += 1;
                let id = committed.next_id;
                committed.rows.push(Country {
                    id: CountryId::new(id),
                    iso_code: row.iso_code,
                    name: row.name,
                    flag_url: row.flag_url,
                });
                affected += 1;
            }
            for update in staged.updates.drain(..) {
                if let Some(row) = committed.rows.iter_mut().find(|r| r.id == update.id) {
                    *row = update;
                    affected += 1;
                }
            }

            Ok(affected)
        }
    }
}
