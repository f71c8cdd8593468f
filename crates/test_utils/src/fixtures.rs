//! Pre-built Test Fixtures
//!
//! Ready-to-use catalog rows and feed records, consistent and predictable
//! across the test suites.

use domain_catalog::{CountryRecord, NewCountry};

/// Fixture for country catalog test data
pub struct CountryFixtures;

impl CountryFixtures {
    pub fn colombia() -> NewCountry {
        NewCountry {
            iso_code: "COL".to_string(),
            name: "Colombia".to_string(),
            flag_url: "https://flagcdn.com/w320/co.png".to_string(),
        }
    }

    pub fn peru() -> NewCountry {
        NewCountry {
            iso_code: "PER".to_string(),
            name: "Perú".to_string(),
            flag_url: "https://flagcdn.com/w320/pe.png".to_string(),
        }
    }

    pub fn argentina() -> NewCountry {
        NewCountry {
            iso_code: "ARG".to_string(),
            name: "Argentina".to_string(),
            flag_url: "https://flagcdn.com/w320/ar.png".to_string(),
        }
    }

    /// The three standard catalog rows used by the integration suite
    pub fn standard_catalog() -> Vec<NewCountry> {
        vec![Self::colombia(), Self::peru(), Self::argentina()]
    }
}

/// Fixture for external feed test data
pub struct FeedFixtures;

impl FeedFixtures {
    /// Feed records matching [`CountryFixtures::standard_catalog`]
    pub fn standard_feed() -> Vec<CountryRecord> {
        CountryFixtures::standard_catalog()
            .into_iter()
            .map(|row| CountryRecord {
                code: row.iso_code,
                name: row.name,
                flag_url: row.flag_url,
            })
            .collect()
    }

    /// The standard feed with one row renamed, for update-path tests
    pub fn feed_with_renamed_colombia() -> Vec<CountryRecord> {
        let mut records = Self::standard_feed();
        for record in &mut records {
            if record.code == "COL" {
                record.name = "República de Colombia".to_string();
            }
        }
        records
    }
}
