//! Country catalog entities

use core_kernel::CountryId;
use serde::{Deserialize, Serialize};

/// A persisted catalog row.
///
/// `iso_code` is the natural key (3-letter ISO 3166 alpha-3, unique); the
/// surrogate id exists for foreign keys from service-country links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub iso_code: String,
    pub name: String,
    pub flag_url: String,
}

/// A catalog row about to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCountry {
    pub iso_code: String,
    pub name: String,
    pub flag_url: String,
}

/// A country as fetched from the external feed, already reduced to the fields
/// the catalog persists. The localized (Spanish) translation is the name of
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRecord {
    pub code: String,
    pub name: String,
    pub flag_url: String,
}
