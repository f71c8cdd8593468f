//! PostgreSQL country catalog store session
//!
//! Implements `domain_catalog::CountryStore`. The synchronizer stages one
//! batch of inserts and updates per pass and commits once.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{CountryId, DomainPort, PortError};
use domain_catalog::{Country, CountryStore, NewCountry};

use crate::error::DatabaseError;
use crate::stores::PgSession;

#[derive(sqlx::FromRow)]
struct CountryRow {
    id: i32,
    iso_code: String,
    name: String,
    flag_url: String,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Country {
            id: CountryId::new(row.id),
            iso_code: row.iso_code,
            name: row.name,
            flag_url: row.flag_url,
        }
    }
}

/// PostgreSQL-backed implementation of the country store port
pub struct PgCountryStore {
    session: PgSession,
}

impl PgCountryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            session: PgSession::new(pool),
        }
    }
}

impl DomainPort for PgCountryStore {}

#[async_trait]
impl CountryStore for PgCountryStore {
    async fn list_countries(&self) -> Result<Vec<Country>, PortError> {
        let rows = sqlx::query_as::<_, CountryRow>(
            "SELECT id, iso_code, name, flag_url FROM countries ORDER BY id",
        )
        .fetch_all(self.session.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, rows), fields(count = rows.len()))]
    async fn add_countries(&self, rows: Vec<NewCountry>) -> Result<(), PortError> {
        for row in rows {
            self.session
                .execute(
                    sqlx::query(
                        "INSERT INTO countries (iso_code, name, flag_url) VALUES ($1, $2, $3)",
                    )
                    .bind(row.iso_code)
                    .bind(row.name)
                    .bind(row.flag_url),
                )
                .await?;
        }
        Ok(())
    }

    async fn update_country(&self, row: &Country) -> Result<(), PortError> {
        self.session
            .execute(
                sqlx::query(
                    "UPDATE countries SET iso_code = $2, name = $3, flag_url = $4 WHERE id = $1",
                )
                .bind(row.id.value())
                .bind(row.iso_code.clone())
                .bind(row.name.clone())
                .bind(row.flag_url.clone()),
            )
            .await?;
        Ok(())
    }

    async fn commit(&self) -> Result<u64, PortError> {
        Ok(self.session.commit().await?)
    }
}
