//! PostgreSQL provider store session
//!
//! Implements `domain_providers::ProviderStore` over the schema in
//! `migrations/0001_schema.sql`. Build one session per logical operation;
//! the writer drives it through a single commit.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, CountryId, CustomFieldId, DomainPort, HealthCheckResult, HealthCheckable,
    PortError, ProviderId, ProviderServiceId, ServiceCountryId, ServiceId,
};
use domain_catalog::Country;
use domain_providers::{
    CountryServiceRow, CustomField, NewCustomField, NewProvider, NewProviderServiceLink,
    NewService, NewServiceCountryLink, Provider, ProviderServiceLink, ProviderServiceSummary,
    ProviderStore, Service, ServiceCountryLink,
};

use crate::error::DatabaseError;
use crate::stores::PgSession;

#[derive(sqlx::FromRow)]
struct ProviderRow {
    id: i32,
    nit: String,
    name: String,
    email: String,
}

impl From<ProviderRow> for Provider {
    fn from(row: ProviderRow) -> Self {
        Provider {
            id: ProviderId::new(row.id),
            nit: row.nit,
            name: row.name,
            email: row.email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CustomFieldRow {
    id: i32,
    provider_id: i32,
    field_name: String,
    field_value: String,
}

impl From<CustomFieldRow> for CustomField {
    fn from(row: CustomFieldRow) -> Self {
        CustomField {
            id: CustomFieldId::new(row.id),
            provider_id: ProviderId::new(row.provider_id),
            field_name: row.field_name,
            field_value: row.field_value,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: i32,
    name: String,
    value_per_hour_usd: String,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service {
            id: ServiceId::new(row.id),
            name: row.name,
            value_per_hour_usd: row.value_per_hour_usd,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProviderLinkRow {
    id: i32,
    provider_id: i32,
    service_id: i32,
}

impl From<ProviderLinkRow> for ProviderServiceLink {
    fn from(row: ProviderLinkRow) -> Self {
        ProviderServiceLink {
            id: ProviderServiceId::new(row.id),
            provider_id: ProviderId::new(row.provider_id),
            service_id: ServiceId::new(row.service_id),
        }
    }
}

#[derive(sqlx::FromRow)]
struct CountryLinkRow {
    id: i32,
    service_id: i32,
    country_id: i32,
}

impl From<CountryLinkRow> for ServiceCountryLink {
    fn from(row: CountryLinkRow) -> Self {
        ServiceCountryLink {
            id: ServiceCountryId::new(row.id),
            service_id: ServiceId::new(row.service_id),
            country_id: CountryId::new(row.country_id),
        }
    }
}

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

#[derive(sqlx::FromRow)]
struct SummaryRow {
    provider_name: String,
    provider_nit: String,
    service_name: String,
}

#[derive(sqlx::FromRow)]
struct CountryServiceJoinRow {
    country_name: String,
    service_id: i32,
    service_name: String,
    value_per_hour_usd: String,
}

/// PostgreSQL-backed implementation of the provider store port
pub struct PgProviderStore {
    session: PgSession,
}

impl PgProviderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            session: PgSession::new(pool),
        }
    }

    fn pool(&self) -> &PgPool {
        self.session.pool()
    }
}

impl DomainPort for PgProviderStore {}

#[async_trait]
impl HealthCheckable for PgProviderStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool())
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: "postgres-provider-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: "postgres-provider-store".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl ProviderStore for PgProviderStore {
    #[instrument(skip(self), fields(provider = %id))]
    async fn find_provider(&self, id: ProviderId) -> Result<Option<Provider>, PortError> {
        let row = sqlx::query_as::<_, ProviderRow>(
            "SELECT id, nit, name, email FROM providers WHERE id = $1",
        )
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(row.map(Into::into))
    }

    async fn list_providers(&self) -> Result<Vec<Provider>, PortError> {
        let rows = sqlx::query_as::<_, ProviderRow>(
            "SELECT id, nit, name, email FROM providers ORDER BY id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn custom_fields_for(
        &self,
        provider: ProviderId,
    ) -> Result<Vec<CustomField>, PortError> {
        let rows = sqlx::query_as::<_, CustomFieldRow>(
            "SELECT id, provider_id, field_name, field_value \
             FROM custom_fields WHERE provider_id = $1 ORDER BY id",
        )
        .bind(provider.value())
        .fetch_all(self.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(service = %id))]
    async fn find_service(&self, id: ServiceId) -> Result<Option<Service>, PortError> {
        let row = sqlx::query_as::<_, ServiceRow>(
            "SELECT id, name, value_per_hour_usd FROM services WHERE id = $1",
        )
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(row.map(Into::into))
    }

    async fn provider_links_for_provider(
        &self,
        provider: ProviderId,
    ) -> Result<Vec<ProviderServiceLink>, PortError> {
        let rows = sqlx::query_as::<_, ProviderLinkRow>(
            "SELECT id, provider_id, service_id \
             FROM provider_services WHERE provider_id = $1 ORDER BY id",
        )
        .bind(provider.value())
        .fetch_all(self.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn provider_links_for_service(
        &self,
        service: ServiceId,
    ) -> Result<Vec<ProviderServiceLink>, PortError> {
        let rows = sqlx::query_as::<_, ProviderLinkRow>(
            "SELECT id, provider_id, service_id \
             FROM provider_services WHERE service_id = $1 ORDER BY id",
        )
        .bind(service.value())
        .fetch_all(self.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn country_links_for(
        &self,
        service: ServiceId,
    ) -> Result<Vec<ServiceCountryLink>, PortError> {
        let rows = sqlx::query_as::<_, CountryLinkRow>(
            "SELECT id, service_id, country_id \
             FROM service_countries WHERE service_id = $1 ORDER BY id",
        )
        .bind(service.value())
        .fetch_all(self.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_country(&self, id: CountryId) -> Result<Option<Country>, PortError> {
        let row = sqlx::query_as::<_, CountryRow>(
            "SELECT id, iso_code, name, flag_url FROM countries WHERE id = $1",
        )
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn services_by_provider_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<ProviderServiceSummary>, PortError> {
        debug!("querying services by provider name fragment");
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT p.name AS provider_name, p.nit AS provider_nit, s.name AS service_name \
             FROM providers p \
             JOIN provider_services ps ON ps.provider_id = p.id \
             JOIN services s ON s.id = ps.service_id \
             WHERE p.name LIKE '%' || $1 || '%' \
             ORDER BY p.name, s.name",
        )
        .bind(fragment)
        .fetch_all(self.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| ProviderServiceSummary {
                provider_name: row.provider_name,
                provider_nit: row.provider_nit,
                service_name: row.service_name,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn services_by_country(
        &self,
        iso_code: &str,
    ) -> Result<Vec<CountryServiceRow>, PortError> {
        debug!("querying services by country");
        let rows = sqlx::query_as::<_, CountryServiceJoinRow>(
            "SELECT c.name AS country_name, s.id AS service_id, \
                    s.name AS service_name, s.value_per_hour_usd \
             FROM countries c \
             JOIN service_countries sc ON sc.country_id = c.id \
             JOIN services s ON s.id = sc.service_id \
             WHERE c.iso_code = $1 \
             ORDER BY c.name, s.name",
        )
        .bind(iso_code)
        .fetch_all(self.pool())
        .await
        .map_err(DatabaseError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| CountryServiceRow {
                country_name: row.country_name,
                service: Service {
                    id: ServiceId::new(row.service_id),
                    name: row.service_name,
                    value_per_hour_usd: row.value_per_hour_usd,
                },
            })
            .collect())
    }

    async fn insert_provider(&self, row: NewProvider) -> Result<ProviderId, PortError> {
        let id = self
            .session
            .insert_returning_id(
                sqlx::query_scalar(
                    "INSERT INTO providers (nit, name, email) VALUES ($1, $2, $3) RETURNING id",
                )
                .bind(row.nit)
                .bind(row.name)
                .bind(row.email),
            )
            .await?;
        Ok(ProviderId::new(id))
    }

    async fn insert_service(&self, row: NewService) -> Result<ServiceId, PortError> {
        let id = self
            .session
            .insert_returning_id(
                sqlx::query_scalar(
                    "INSERT INTO services (name, value_per_hour_usd) \
                     VALUES ($1, $2) RETURNING id",
                )
                .bind(row.name)
                .bind(row.value_per_hour_usd),
            )
            .await?;
        Ok(ServiceId::new(id))
    }

    async fn update_provider(&self, row: &Provider) -> Result<(), PortError> {
        self.session
            .execute(
                sqlx::query(
                    "UPDATE providers SET nit = $2, name = $3, email = $4 WHERE id = $1",
                )
                .bind(row.id.value())
                .bind(row.nit.clone())
                .bind(row.name.clone())
                .bind(row.email.clone()),
            )
            .await?;
        Ok(())
    }

    async fn update_service(&self, row: &Service) -> Result<(), PortError> {
        self.session
            .execute(
                sqlx::query(
                    "UPDATE services SET name = $2, value_per_hour_usd = $3 WHERE id = $1",
                )
                .bind(row.id.value())
                .bind(row.name.clone())
                .bind(row.value_per_hour_usd.clone()),
            )
            .await?;
        Ok(())
    }

    async fn update_custom_field(&self, row: &CustomField) -> Result<(), PortError> {
        self.session
            .execute(
                sqlx::query(
                    "UPDATE custom_fields SET field_name = $2, field_value = $3 WHERE id = $1",
                )
                .bind(row.id.value())
                .bind(row.field_name.clone())
                .bind(row.field_value.clone()),
            )
            .await?;
        Ok(())
    }

    async fn add_custom_fields(&self, rows: Vec<NewCustomField>) -> Result<(), PortError> {
        for row in rows {
            self.session
                .execute(
                    sqlx::query(
                        "INSERT INTO custom_fields (provider_id, field_name, field_value) \
                         VALUES ($1, $2, $3)",
                    )
                    .bind(row.provider_id.value())
                    .bind(row.field_name)
                    .bind(row.field_value),
                )
                .await?;
        }
        Ok(())
    }

    async fn add_provider_link(&self, row: NewProviderServiceLink) -> Result<(), PortError> {
        self.session
            .execute(
                sqlx::query(
                    "INSERT INTO provider_services (provider_id, service_id) VALUES ($1, $2)",
                )
                .bind(row.provider_id.value())
                .bind(row.service_id.value()),
            )
            .await?;
        Ok(())
    }

    async fn add_country_links(&self, rows: Vec<NewServiceCountryLink>) -> Result<(), PortError> {
        for row in rows {
            self.session
                .execute(
                    sqlx::query(
                        "INSERT INTO service_countries (service_id, country_id) VALUES ($1, $2)",
                    )
                    .bind(row.service_id.value())
                    .bind(row.country_id.value()),
                )
                .await?;
        }
        Ok(())
    }

    async fn remove_custom_fields(&self, ids: Vec<CustomFieldId>) -> Result<(), PortError> {
        let raw: Vec<i32> = ids.into_iter().map(|id| id.value()).collect();
        self.session
            .execute(sqlx::query("DELETE FROM custom_fields WHERE id = ANY($1)").bind(raw))
            .await?;
        Ok(())
    }

    async fn remove_provider_links(&self, ids: Vec<ProviderServiceId>) -> Result<(), PortError> {
        let raw: Vec<i32> = ids.into_iter().map(|id| id.value()).collect();
        self.session
            .execute(sqlx::query("DELETE FROM provider_services WHERE id = ANY($1)").bind(raw))
            .await?;
        Ok(())
    }

    async fn remove_country_links(&self, ids: Vec<ServiceCountryId>) -> Result<(), PortError> {
        let raw: Vec<i32> = ids.into_iter().map(|id| id.value()).collect();
        self.session
            .execute(sqlx::query("DELETE FROM service_countries WHERE id = ANY($1)").bind(raw))
            .await?;
        Ok(())
    }

    async fn remove_provider(&self, id: ProviderId) -> Result<(), PortError> {
        self.session
            .execute(sqlx::query("DELETE FROM providers WHERE id = $1").bind(id.value()))
            .await?;
        Ok(())
    }

    async fn remove_service(&self, id: ServiceId) -> Result<(), PortError> {
        self.session
            .execute(sqlx::query("DELETE FROM services WHERE id = $1").bind(id.value()))
            .await?;
        Ok(())
    }

    async fn commit(&self) -> Result<u64, PortError> {
        Ok(self.session.commit().await?)
    }
}
