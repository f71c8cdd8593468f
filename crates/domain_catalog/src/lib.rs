//! Country catalog domain
//!
//! The catalog is a shared reference table: services associate to countries by
//! id, and the catalog rows themselves are maintained by synchronizing against
//! an external feed keyed on the ISO 3166 alpha-3 code. Rows are created and
//! updated by synchronization, never deleted, so existing service-country
//! associations stay valid even when a country drops out of the feed.

pub mod country;
pub mod error;
pub mod feed;
pub mod ports;
pub mod sync;

pub use country::{Country, CountryRecord, NewCountry};
pub use error::CatalogError;
pub use feed::{CountryFeed, FeedConfig, RestCountriesClient};
pub use ports::CountryStore;
pub use sync::{CountrySynchronizer, SyncSummary};
