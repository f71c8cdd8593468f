//! Country catalog synchronization
//!
//! Reconciles the externally-fetched country list against the persisted
//! catalog by natural key. Missing codes are inserted, matched rows have only
//! their changed fields written, and rows absent from the feed stay persisted
//! so existing service-country links keep resolving.

use std::sync::Arc;
use tracing::{debug, info, warn};

use core_kernel::diff_by_natural_key;

use crate::country::{Country, NewCountry};
use crate::error::CatalogError;
use crate::feed::CountryFeed;
use crate::ports::CountryStore;

/// What one synchronization pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SyncSummary {
    /// Usable records received from the feed
    pub fetched: usize,
    /// New catalog rows created
    pub inserted: usize,
    /// Existing rows with at least one changed field
    pub updated: usize,
}

/// Synchronizes the persisted catalog from the external feed.
pub struct CountrySynchronizer {
    feed: Arc<dyn CountryFeed>,
    store: Arc<dyn CountryStore>,
}

impl CountrySynchronizer {
    pub fn new(feed: Arc<dyn CountryFeed>, store: Arc<dyn CountryStore>) -> Self {
        Self { feed, store }
    }

    /// Runs one synchronization pass: fetch, diff by ISO code, commit the
    /// whole batch once. An empty feed is a no-op, not a failure.
    pub async fn synchronize(&self) -> Result<SyncSummary, CatalogError> {
        let records = self.feed.fetch().await.map_err(CatalogError::Feed)?;
        if records.is_empty() {
            warn!("country feed returned no usable records, catalog left untouched");
            return Ok(SyncSummary {
                fetched: 0,
                inserted: 0,
                updated: 0,
            });
        }
        let fetched = records.len();

        let existing = self.store.list_countries().await?;
        let diff = diff_by_natural_key(
            &existing,
            records,
            |c: &Country| c.iso_code.clone(),
            |r| r.code.clone(),
        );

        let mut updated = 0usize;
        for (row, record) in diff.update {
            let mut next = row.clone();
            if next.name != record.name {
                next.name = record.name;
            }
            if next.flag_url != record.flag_url {
                next.flag_url = record.flag_url;
            }
            if next != row {
                debug!(iso_code = %next.iso_code, "updating catalog row from feed");
                self.store.update_country(&next).await?;
                updated += 1;
            }
        }

        let inserted = diff.insert.len();
        if inserted > 0 {
            let rows = diff
                .insert
                .into_iter()
                .map(|r| NewCountry {
                    iso_code: r.code,
                    name: r.name,
                    flag_url: r.flag_url,
                })
                .collect();
            self.store.add_countries(rows).await?;
        }

        self.store.commit().await?;
        info!(fetched, inserted, updated, "country catalog synchronized");

        Ok(SyncSummary {
            fetched,
            inserted,
            updated,
        })
    }
}
