//! Storage port for the provider domain
//!
//! The store is a transactional unit of work over the provider, custom-field,
//! service, and junction tables. Reads run against committed state; writes are
//! staged against `&self` and take effect when `commit` runs, which reports
//! the number of rows the batch affected (zero is "nothing changed", not an
//! error).
//!
//! The two parent inserts are the exception: they return the generated
//! surrogate id at call time, because dependent child rows cannot be built
//! until the parent id exists. This is the flush point of the two-phase
//! persist protocol.

use async_trait::async_trait;

use core_kernel::{
    CountryId, CustomFieldId, DomainPort, PortError, ProviderId, ProviderServiceId,
    ServiceCountryId, ServiceId,
};
use domain_catalog::Country;

use crate::provider::{CustomField, NewCustomField, NewProvider, Provider};
use crate::service::{
    CountryServiceRow, NewProviderServiceLink, NewService, NewServiceCountryLink,
    ProviderServiceLink, ProviderServiceSummary, Service, ServiceCountryLink,
};

/// Port for the transactional provider store
#[async_trait]
pub trait ProviderStore: DomainPort {
    // Reads

    async fn find_provider(&self, id: ProviderId) -> Result<Option<Provider>, PortError>;

    async fn list_providers(&self) -> Result<Vec<Provider>, PortError>;

    async fn custom_fields_for(&self, provider: ProviderId)
        -> Result<Vec<CustomField>, PortError>;

    async fn find_service(&self, id: ServiceId) -> Result<Option<Service>, PortError>;

    /// Links owned by one provider
    async fn provider_links_for_provider(
        &self,
        provider: ProviderId,
    ) -> Result<Vec<ProviderServiceLink>, PortError>;

    /// Links referencing one service, across all providers
    async fn provider_links_for_service(
        &self,
        service: ServiceId,
    ) -> Result<Vec<ProviderServiceLink>, PortError>;

    async fn country_links_for(
        &self,
        service: ServiceId,
    ) -> Result<Vec<ServiceCountryLink>, PortError>;

    async fn find_country(&self, id: CountryId) -> Result<Option<Country>, PortError>;

    /// Substring match on provider name, joined to the services offered
    async fn services_by_provider_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<ProviderServiceSummary>, PortError>;

    /// All services linked to the country with the given ISO code, one row
    /// per link. Empty when the code has no associations.
    async fn services_by_country(
        &self,
        iso_code: &str,
    ) -> Result<Vec<CountryServiceRow>, PortError>;

    // Writes

    /// Inserts and flushes a provider row, returning the generated id
    async fn insert_provider(&self, row: NewProvider) -> Result<ProviderId, PortError>;

    /// Inserts and flushes a service row, returning the generated id
    async fn insert_service(&self, row: NewService) -> Result<ServiceId, PortError>;

    async fn update_provider(&self, row: &Provider) -> Result<(), PortError>;

    async fn update_service(&self, row: &Service) -> Result<(), PortError>;

    async fn update_custom_field(&self, row: &CustomField) -> Result<(), PortError>;

    async fn add_custom_fields(&self, rows: Vec<NewCustomField>) -> Result<(), PortError>;

    async fn add_provider_link(&self, row: NewProviderServiceLink) -> Result<(), PortError>;

    async fn add_country_links(&self, rows: Vec<NewServiceCountryLink>) -> Result<(), PortError>;

    async fn remove_custom_fields(&self, ids: Vec<CustomFieldId>) -> Result<(), PortError>;

    async fn remove_provider_links(&self, ids: Vec<ProviderServiceId>) -> Result<(), PortError>;

    async fn remove_country_links(&self, ids: Vec<ServiceCountryId>) -> Result<(), PortError>;

    async fn remove_provider(&self, id: ProviderId) -> Result<(), PortError>;

    async fn remove_service(&self, id: ServiceId) -> Result<(), PortError>;

    /// Applies all staged writes; returns the number of rows affected
    async fn commit(&self) -> Result<u64, PortError>;
}

/// In-memory mock of [`ProviderStore`] for testing without a database.
///
/// Writes are staged and applied on commit, so tests observe the same
/// commit-boundary behavior as the Postgres sessions, including the
/// referential check on country links.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use domain_catalog::NewCountry;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    struct Committed {
        providers: Vec<Provider>,
        custom_fields: Vec<CustomField>,
        services: Vec<Service>,
        provider_links: Vec<ProviderServiceLink>,
        country_links: Vec<ServiceCountryLink>,
        countries: Vec<Country>,
        next_provider: i32,
        next_field: i32,
        next_service: i32,
        next_provider_link: i32,
        next_country_link: i32,
        next_country: i32,
    }

    #[derive(Debug)]
    enum Op {
        InsertProvider(Provider),
        InsertService(Service),
        UpdateProvider(Provider),
        UpdateService(Service),
        UpdateCustomField(CustomField),
        AddCustomFields(Vec<NewCustomField>),
        AddProviderLink(NewProviderServiceLink),
        AddCountryLinks(Vec<NewServiceCountryLink>),
        RemoveCustomFields(Vec<CustomFieldId>),
        RemoveProviderLinks(Vec<ProviderServiceId>),
        RemoveCountryLinks(Vec<ServiceCountryId>),
        RemoveProvider(ProviderId),
        RemoveService(ServiceId),
    }

    #[derive(Debug, Default)]
    pub struct MockProviderStore {
        committed: Arc<RwLock<Committed>>,
        staged: Arc<RwLock<Vec<Op>>>,
    }

    impl MockProviderStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts catalog rows directly into committed state, bypassing the
        /// unit of work. Returns the assigned ids in input order.
        pub async fn seed_countries(&self, rows: Vec<NewCountry>) -> Vec<CountryId> {
            let mut committed = self.committed.write().await;
            let mut ids = Vec::with_capacity(rows.len());
            for row in rows {
                committed.next_country += 1;
                let id = CountryId::new(committed.next_country);
                committed.countries.push(Country {
                    id,
                    iso_code: row.iso_code,
                    name: row.name,
                    flag_url: row.flag_url,
                });
                ids.push(id);
            }
            ids
        }

        // Committed-state snapshots for assertions

        pub async fn providers(&self) -> Vec<Provider> {
            self.committed.read().await.providers.clone()
        }

        pub async fn custom_fields(&self) -> Vec<CustomField> {
            self.committed.read().await.custom_fields.clone()
        }

        pub async fn services(&self) -> Vec<Service> {
            self.committed.read().await.services.clone()
        }

        pub async fn provider_links(&self) -> Vec<ProviderServiceLink> {
            self.committed.read().await.provider_links.clone()
        }

        pub async fn country_links(&self) -> Vec<ServiceCountryLink> {
            self.committed.read().await.country_links.clone()
        }

        /// Number of writes staged but not yet committed
        pub async fn staged_ops(&self) -> usize {
            self.staged.read().await.len()
        }
    }

    impl DomainPort for MockProviderStore {}

    #[async_trait]
    impl ProviderStore for MockProviderStore {
        async fn find_provider(&self, id: ProviderId) -> Result<Option<Provider>, PortError> {
            Ok(self
                .committed
                .read()
                .await
                .providers
                .iter()
                .find(|p| p.id == id)
                .cloned())
        }

        async fn list_providers(&self) -> Result<Vec<Provider>, PortError> {
            Ok(self.committed.read().await.providers.clone())
        }

        async fn custom_fields_for(
            &self,
            provider: ProviderId,
        ) -> Result<Vec<CustomField>, PortError> {
            Ok(self
                .committed
                .read()
                .await
                .custom_fields
                .iter()
                .filter(|f| f.provider_id == provider)
                .cloned()
                .collect())
        }

        async fn find_service(&self, id: ServiceId) -> Result<Option<Service>, PortError> {
            Ok(self
                .committed
                .read()
                .await
                .services
                .iter()
                .find(|s| s.id == id)
                .cloned())
        }

        async fn provider_links_for_provider(
            &self,
            provider: ProviderId,
        ) -> Result<Vec<ProviderServiceLink>, PortError> {
            Ok(self
                .committed
                .read()
                .await
                .provider_links
                .iter()
                .filter(|l| l.provider_id == provider)
                .cloned()
                .collect())
        }

        async fn provider_links_for_service(
            &self,
            service: ServiceId,
        ) -> Result<Vec<ProviderServiceLink>, PortError> {
            Ok(self
                .committed
                .read()
                .await
                .provider_links
                .iter()
                .filter(|l| l.service_id == service)
                .cloned()
                .collect())
        }

        async fn country_links_for(
            &self,
            service: ServiceId,
        ) -> Result<Vec<ServiceCountryLink>, PortError> {
            Ok(self
                .committed
                .read()
                .await
                .country_links
                .iter()
                .filter(|l| l.service_id == service)
                .cloned()
                .collect())
        }

        async fn find_country(&self, id: CountryId) -> Result<Option<Country>, PortError> {
            Ok(self
                .committed
                .read()
                .await
                .countries
                .iter()
                .find(|c| c.id == id)
                .cloned())
        }

        async fn services_by_provider_name(
            &self,
            fragment: &str,
        ) -> Result<Vec<ProviderServiceSummary>, PortError> {
            let committed = self.committed.read().await;
            let mut rows = Vec::new();
            for provider in committed
                .providers
                .iter()
                .filter(|p| p.name.contains(fragment))
            {
                for link in committed
                    .provider_links
                    .iter()
                    .filter(|l| l.provider_id == provider.id)
                {
                    if let Some(service) =
                        committed.services.iter().find(|s| s.id == link.service_id)
                    {
                        rows.push(ProviderServiceSummary {
                            provider_name: provider.name.clone(),
                            provider_nit: provider.nit.clone(),
                            service_name: service.name.clone(),
                        });
                    }
                }
            }
            Ok(rows)
        }

        async fn services_by_country(
            &self,
            iso_code: &str,
        ) -> Result<Vec<CountryServiceRow>, PortError> {
            let committed = self.committed.read().await;
            let mut rows = Vec::new();
            for country in committed.countries.iter().filter(|c| c.iso_code == iso_code) {
                for link in committed
                    .country_links
                    .iter()
                    .filter(|l| l.country_id == country.id)
                {
                    if let Some(service) =
                        committed.services.iter().find(|s| s.id == link.service_id)
                    {
                        rows.push(CountryServiceRow {
                            country_name: country.name.clone(),
                            service: service.clone(),
                        });
                    }
                }
            }
            Ok(rows)
        }

        async fn insert_provider(&self, row: NewProvider) -> Result<ProviderId, PortError> {
            // Flush point: the id is allocated now so children can reference it
            let id = {
                let mut committed = self.committed.write().await;
                committed.next_provider += 1;
                ProviderId::new(committed.next_provider)
            };
            self.staged.write().await.push(Op::InsertProvider(Provider {
                id,
                nit: row.nit,
                name: row.name,
                email: row.email,
            }));
            Ok(id)
        }

        async fn insert_service(&self, row: NewService) -> Result<ServiceId, PortError> {
            let id = {
                let mut committed = self.committed.write().await;
                committed.next_service += 1;
                ServiceId::new(committed.next_service)
            };
            self.staged.write().await.push(Op::InsertService(Service {
                id,
                name: row.name,
                value_per_hour_usd: row.value_per_hour_usd,
            }));
            Ok(id)
        }

        async fn update_provider(&self, row: &Provider) -> Result<(), PortError> {
            self.staged
                .write()
                .await
                .push(Op::UpdateProvider(row.clone()));
            Ok(())
        }

        async fn update_service(&self, row: &Service) -> Result<(), PortError> {
            self.staged.write().await.push(Op::UpdateService(row.clone()));
            Ok(())
        }

        async fn update_custom_field(&self, row: &CustomField) -> Result<(), PortError> {
            self.staged
                .write()
                .await
                .push(Op::UpdateCustomField(row.clone()));
            Ok(())
        }

        async fn add_custom_fields(&self, rows: Vec<NewCustomField>) -> Result<(), PortError> {
            self.staged.write().await.push(Op::AddCustomFields(rows));
            Ok(())
        }

        async fn add_provider_link(&self, row: NewProviderServiceLink) -> Result<(), PortError> {
            self.staged.write().await.push(Op::AddProviderLink(row));
            Ok(())
        }

        async fn add_country_links(
            &self,
            rows: Vec<NewServiceCountryLink>,
        ) -> Result<(), PortError> {
            self.staged.write().await.push(Op::AddCountryLinks(rows));
            Ok(())
        }

        async fn remove_custom_fields(&self, ids: Vec<CustomFieldId>) -> Result<(), PortError> {
            self.staged.write().await.push(Op::RemoveCustomFields(ids));
            Ok(())
        }

        async fn remove_provider_links(
            &self,
            ids: Vec<ProviderServiceId>,
        ) -> Result<(), PortError> {
            self.staged.write().await.push(Op::RemoveProviderLinks(ids));
            Ok(())
        }

        async fn remove_country_links(
            &self,
            ids: Vec<ServiceCountryId>,
        ) -> Result<(), PortError> {
            self.staged.write().await.push(Op::RemoveCountryLinks(ids));
            Ok(())
        }

        async fn remove_provider(&self, id: ProviderId) -> Result<(), PortError> {
            self.staged.write().await.push(Op::RemoveProvider(id));
            Ok(())
        }

        async fn remove_service(&self, id: ServiceId) -> Result<(), PortError> {
            self.staged.write().await.push(Op::RemoveService(id));
            Ok(())
        }

        async fn commit(&self) -> Result<u64, PortError> {
            let ops: Vec<Op> = self.staged.write().await.drain(..).collect();
            let mut committed = self.committed.write().await;

            // Referential check up front: a real transaction rolls back
            // wholesale, so nothing may apply when any link is dangling
            for op in &ops {
                if let Op::AddCountryLinks(rows) = op {
                    for row in rows {
                        if !committed.countries.iter().any(|c| c.id == row.country_id) {
                            return Err(PortError::Conflict {
                                message: format!(
                                    "country {} is not in the catalog",
                                    row.country_id
                                ),
                            });
                        }
                    }
                }
            }

            let mut affected = 0u64;

            for op in ops {
                match op {
                    Op::InsertProvider(row) => {
                        committed.providers.push(row);
                        affected += 1;
                    }
                    Op::InsertService(row) => {
                        committed.services.push(row);
                        affected += 1;
                    }
                    Op::UpdateProvider(row) => {
                        if let Some(p) = committed.providers.iter_mut().find(|p| p.id == row.id) {
                            *p = row;
                            affected += 1;
                        }
                    }
                    Op::UpdateService(row) => {
                        if let Some(s) = committed.services.iter_mut().find(|s| s.id == row.id) {
                            *s = row;
                            affected += 1;
                        }
                    }
                    Op::UpdateCustomField(row) => {
                        if let Some(f) =
                            committed.custom_fields.iter_mut().find(|f| f.id == row.id)
                        {
                            *f = row;
                            affected += 1;
                        }
                    }
                    Op::AddCustomFields(rows) => {
                        for row in rows {
                            committed.next_field += 1;
                            let id = CustomFieldId::new(committed.next_field);
                            committed.custom_fields.push(CustomField {
                                id,
                                provider_id: row.provider_id,
                                field_name: row.field_name,
                                field_value: row.field_value,
                            });
                            affected += 1;
                        }
                    }
                    Op::AddProviderLink(row) => {
                        committed.next_provider_link += 1;
                        let id = ProviderServiceId::new(committed.next_provider_link);
                        committed.provider_links.push(ProviderServiceLink {
                            id,
                            provider_id: row.provider_id,
                            service_id: row.service_id,
                        });
                        affected += 1;
                    }
                    Op::AddCountryLinks(rows) => {
                        for row in rows {
                            committed.next_country_link += 1;
                            let id = ServiceCountryId::new(committed.next_country_link);
                            committed.country_links.push(ServiceCountryLink {
                                id,
                                service_id: row.service_id,
                                country_id: row.country_id,
                            });
                            affected += 1;
                        }
                    }
                    Op::RemoveCustomFields(ids) => {
                        let before = committed.custom_fields.len();
                        committed.custom_fields.retain(|f| !ids.contains(&f.id));
                        affected += (before - committed.custom_fields.len()) as u64;
                    }
                    Op::RemoveProviderLinks(ids) => {
                        let before = committed.provider_links.len();
                        committed.provider_links.retain(|l| !ids.contains(&l.id));
                        affected += (before - committed.provider_links.len()) as u64;
                    }
                    Op::RemoveCountryLinks(ids) => {
                        let before = committed.country_links.len();
                        committed.country_links.retain(|l| !ids.contains(&l.id));
                        affected += (before - committed.country_links.len()) as u64;
                    }
                    Op::RemoveProvider(id) => {
                        let before = committed.providers.len();
                        committed.providers.retain(|p| p.id != id);
                        affected += (before - committed.providers.len()) as u64;
                    }
                    Op::RemoveService(id) => {
                        let before = committed.services.len();
                        committed.services.retain(|s| s.id != id);
                        affected += (before - committed.services.len()) as u64;
                    }
                }
            }

            Ok(affected)
        }
    }
}
