//! Provider aggregate writer
//!
//! Orchestrates creates, reconciling updates, and deletes of the provider
//! aggregate through the transactional store. Every operation is a single
//! unit of work: either all of its writes commit or none do.

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::{diff_children, ProviderId, WriteOutcome};

use crate::error::ProviderError;
use crate::ports::ProviderStore;
use crate::provider::{
    CompleteProvider, CompleteService, CustomField, NewCustomField, NewProvider,
    NewProviderGraph, Provider, ProviderUpdate,
};
use crate::service::{NewProviderServiceLink, NewService, NewServiceCountryLink};

/// Writer for the provider aggregate
#[derive(Clone)]
pub struct ProviderWriter {
    store: Arc<dyn ProviderStore>,
}

impl ProviderWriter {
    pub fn new(store: Arc<dyn ProviderStore>) -> Self {
        Self { store }
    }

    /// Creates a provider together with its custom fields, fresh services,
    /// and service-country associations, in one transaction.
    ///
    /// The provider row is flushed first so child rows can reference its id;
    /// each nested service is flushed the same way before its links.
    pub async fn create(&self, graph: NewProviderGraph) -> Result<ProviderId, ProviderError> {
        let provider_id = self
            .store
            .insert_provider(NewProvider {
                nit: graph.nit,
                name: graph.name,
                email: graph.email,
            })
            .await?;

        if !graph.custom_fields.is_empty() {
            let rows = graph
                .custom_fields
                .into_iter()
                .map(|field| NewCustomField {
                    provider_id,
                    field_name: field.field_name,
                    field_value: field.field_value,
                })
                .collect();
            self.store.add_custom_fields(rows).await?;
        }

        for service in graph.services {
            let service_id = self
                .store
                .insert_service(NewService {
                    name: service.name,
                    value_per_hour_usd: service.value_per_hour_usd,
                })
                .await?;
            self.store
                .add_provider_link(NewProviderServiceLink {
                    provider_id,
                    service_id,
                })
                .await?;
            if !service.countries.is_empty() {
                // The country list is a set: a country named twice is one link.
                let mut seen = Vec::new();
                let links = service
                    .countries
                    .into_iter()
                    .filter(|country_id| {
                        if seen.contains(country_id) {
                            return false;
                        }
                        seen.push(*country_id);
                        true
                    })
                    .map(|country_id| NewServiceCountryLink {
                        service_id,
                        country_id,
                    })
                    .collect();
                self.store.add_country_links(links).await?;
            }
        }

        let affected = self.store.commit().await?;
        info!(provider = %provider_id, rows = affected, "provider aggregate created");
        Ok(provider_id)
    }

    /// Updates a provider's scalar fields and reconciles its custom fields
    /// against the incoming set.
    ///
    /// Incoming fields with a known id update their row; fields without an id
    /// insert; persisted fields absent from the set are removed. A positive
    /// incoming id that matches no persisted row is inserted as new and
    /// logged. Services are not touched by this operation.
    pub async fn update(&self, update: ProviderUpdate) -> Result<WriteOutcome, ProviderError> {
        let Some(current) = self.store.find_provider(update.id).await? else {
            return Ok(WriteOutcome::not_found("provider", update.id));
        };

        if current.nit != update.nit || current.name != update.name || current.email != update.email
        {
            self.store
                .update_provider(&Provider {
                    id: current.id,
                    nit: update.nit,
                    name: update.name,
                    email: update.email,
                })
                .await?;
        }

        let existing = self.store.custom_fields_for(update.id).await?;
        let diff = diff_children(
            existing,
            update.custom_fields,
            |row| row.id.value(),
            |dto| dto.id.value(),
        );
        if !diff.unknown_ids.is_empty() {
            warn!(
                provider = %update.id,
                ids = ?diff.unknown_ids,
                "incoming custom fields claim unknown ids; inserting as new rows"
            );
        }

        if !diff.remove.is_empty() {
            let ids = diff.remove.into_iter().map(|row| row.id).collect();
            self.store.remove_custom_fields(ids).await?;
        }
        for (row, dto) in diff.update {
            if row.field_name != dto.field_name || row.field_value != dto.field_value {
                self.store
                    .update_custom_field(&CustomField {
                        id: row.id,
                        provider_id: row.provider_id,
                        field_name: dto.field_name,
                        field_value: dto.field_value,
                    })
                    .await?;
            }
        }
        if !diff.insert.is_empty() {
            let rows = diff
                .insert
                .into_iter()
                .map(|dto| NewCustomField {
                    provider_id: update.id,
                    field_name: dto.field_name,
                    field_value: dto.field_value,
                })
                .collect();
            self.store.add_custom_fields(rows).await?;
        }

        let affected = self.store.commit().await?;
        if affected == 0 {
            return Ok(WriteOutcome::no_changes("provider", update.id));
        }
        info!(provider = %update.id, rows = affected, "provider aggregate updated");
        Ok(WriteOutcome::Applied)
    }

    /// Deletes a provider, its custom fields, and its links to services.
    /// The services themselves stay persisted; other providers may offer
    /// them.
    pub async fn delete(&self, id: ProviderId) -> Result<WriteOutcome, ProviderError> {
        if self.store.find_provider(id).await?.is_none() {
            return Ok(WriteOutcome::not_found("provider", id));
        }

        let fields = self.store.custom_fields_for(id).await?;
        if !fields.is_empty() {
            let ids = fields.into_iter().map(|row| row.id).collect();
            self.store.remove_custom_fields(ids).await?;
        }
        let links = self.store.provider_links_for_provider(id).await?;
        if !links.is_empty() {
            let ids = links.into_iter().map(|row| row.id).collect();
            self.store.remove_provider_links(ids).await?;
        }
        self.store.remove_provider(id).await?;

        let affected = self.store.commit().await?;
        info!(provider = %id, rows = affected, "provider aggregate deleted");
        Ok(WriteOutcome::Applied)
    }

    /// Lists provider rows without their children
    pub async fn list(&self) -> Result<Vec<Provider>, ProviderError> {
        Ok(self.store.list_providers().await?)
    }

    /// Lists providers with custom fields, services, and the services'
    /// countries eagerly resolved.
    ///
    /// Links pointing at rows that no longer exist are skipped rather than
    /// failing the whole read. Output is ordered by name at every level so
    /// the graph is stable across calls.
    pub async fn list_complete(&self) -> Result<Vec<CompleteProvider>, ProviderError> {
        let mut providers = self.store.list_providers().await?;
        providers.sort_by(|a, b| a.name.cmp(&b.name));

        let mut complete = Vec::with_capacity(providers.len());
        for provider in providers {
            let custom_fields = self
                .store
                .custom_fields_for(provider.id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();

            let mut services = Vec::new();
            let mut seen = Vec::new();
            for link in self.store.provider_links_for_provider(provider.id).await? {
                if seen.contains(&link.service_id) {
                    continue;
                }
                seen.push(link.service_id);
                let Some(service) = self.store.find_service(link.service_id).await? else {
                    warn!(link = %link.id, service = %link.service_id, "skipping link to missing service");
                    continue;
                };
                let mut countries = Vec::new();
                let mut seen_countries = Vec::new();
                for country_link in self.store.country_links_for(service.id).await? {
                    if seen_countries.contains(&country_link.country_id) {
                        continue;
                    }
                    seen_countries.push(country_link.country_id);
                    match self.store.find_country(country_link.country_id).await? {
                        Some(country) => countries.push(country),
                        None => warn!(
                            link = %country_link.id,
                            country = %country_link.country_id,
                            "skipping link to missing country"
                        ),
                    }
                }
                countries.sort_by(|a, b| a.name.cmp(&b.name));
                services.push(CompleteService {
                    id: service.id,
                    name: service.name,
                    value_per_hour_usd: service.value_per_hour_usd,
                    countries,
                });
            }
            services.sort_by(|a, b| a.name.cmp(&b.name));

            complete.push(CompleteProvider {
                id: provider.id,
                nit: provider.nit,
                name: provider.name,
                email: provider.email,
                custom_fields,
                services,
            });
        }
        Ok(complete)
    }
}
