//! Service aggregate writer
//!
//! Services are shared rows: many providers may link to one service, and one
//! service may be available in many countries. The writer owns the service
//! row and its country associations; provider links are owned by the
//! provider aggregate and are only touched here when the service itself is
//! deleted.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use core_kernel::{diff_children, ServiceId, WriteOutcome};

use crate::error::ProviderError;
use crate::ports::ProviderStore;
use crate::service::{
    CountryServices, NewService, NewServiceCountryLink, ProviderServiceSummary, Service,
    ServiceUpdate,
};

/// Writer for the service aggregate
#[derive(Clone)]
pub struct ServiceWriter {
    store: Arc<dyn ProviderStore>,
}

impl ServiceWriter {
    pub fn new(store: Arc<dyn ProviderStore>) -> Self {
        Self { store }
    }

    /// Creates a bare service row. Country associations are attached through
    /// [`ServiceWriter::update`]; provider links through the provider
    /// aggregate.
    pub async fn create(&self, row: NewService) -> Result<ServiceId, ProviderError> {
        let id = self.store.insert_service(row).await?;
        self.store.commit().await?;
        info!(service = %id, "service created");
        Ok(id)
    }

    /// Updates a service's scalar fields and reconciles its country
    /// associations against the incoming set.
    ///
    /// Countries present in the set and already linked keep their link row;
    /// newly listed countries gain a link; linked countries absent from the
    /// set are unlinked. A country id not in the catalog fails the whole
    /// operation.
    pub async fn update(&self, update: ServiceUpdate) -> Result<WriteOutcome, ProviderError> {
        let Some(current) = self.store.find_service(update.id).await? else {
            return Ok(WriteOutcome::not_found("service", update.id));
        };

        if current.name != update.name || current.value_per_hour_usd != update.value_per_hour_usd {
            self.store
                .update_service(&Service {
                    id: current.id,
                    name: update.name,
                    value_per_hour_usd: update.value_per_hour_usd,
                })
                .await?;
        }

        // Links are identified by the country they point at, so a country
        // kept across the update is a matched pair and issues no write.
        // The incoming list is a set: a country named twice is one link.
        let mut countries = update.countries;
        let mut seen = Vec::with_capacity(countries.len());
        countries.retain(|country_id| {
            if seen.contains(country_id) {
                return false;
            }
            seen.push(*country_id);
            true
        });
        let existing = self.store.country_links_for(update.id).await?;
        let diff = diff_children(
            existing,
            countries,
            |link| link.country_id.value(),
            |country| country.value(),
        );

        if !diff.remove.is_empty() {
            let ids = diff.remove.into_iter().map(|link| link.id).collect();
            self.store.remove_country_links(ids).await?;
        }
        if !diff.insert.is_empty() {
            let links = diff
                .insert
                .into_iter()
                .map(|country_id| NewServiceCountryLink {
                    service_id: update.id,
                    country_id,
                })
                .collect();
            self.store.add_country_links(links).await?;
        }

        let affected = self.store.commit().await?;
        if affected == 0 {
            return Ok(WriteOutcome::no_changes("service", update.id));
        }
        info!(service = %update.id, rows = affected, "service updated");
        Ok(WriteOutcome::Applied)
    }

    /// Deletes a service together with its country associations and every
    /// provider link that references it.
    pub async fn delete(&self, id: ServiceId) -> Result<WriteOutcome, ProviderError> {
        if self.store.find_service(id).await?.is_none() {
            return Ok(WriteOutcome::not_found("service", id));
        }

        let country_links = self.store.country_links_for(id).await?;
        if !country_links.is_empty() {
            let ids = country_links.into_iter().map(|link| link.id).collect();
            self.store.remove_country_links(ids).await?;
        }
        let provider_links = self.store.provider_links_for_service(id).await?;
        if !provider_links.is_empty() {
            let ids = provider_links.into_iter().map(|link| link.id).collect();
            self.store.remove_provider_links(ids).await?;
        }
        self.store.remove_service(id).await?;

        let affected = self.store.commit().await?;
        info!(service = %id, rows = affected, "service deleted");
        Ok(WriteOutcome::Applied)
    }

    /// Services offered by providers whose name contains the given fragment
    pub async fn services_by_provider_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<ProviderServiceSummary>, ProviderError> {
        Ok(self.store.services_by_provider_name(fragment).await?)
    }

    /// Services available in the country with the given ISO code, grouped by
    /// country name. An unknown code yields an empty list, not an error.
    pub async fn services_by_country(
        &self,
        iso_code: &str,
    ) -> Result<Vec<CountryServices>, ProviderError> {
        let rows = self.store.services_by_country(iso_code).await?;

        let mut grouped: BTreeMap<String, Vec<Service>> = BTreeMap::new();
        for row in rows {
            grouped.entry(row.country_name).or_default().push(row.service);
        }
        Ok(grouped
            .into_iter()
            .map(|(country_name, services)| CountryServices {
                country_name,
                services,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockProviderStore;
    use crate::provider::NewProvider;
    use crate::service::NewProviderServiceLink;
    use core_kernel::CountryId;
    use domain_catalog::NewCountry;

    fn writer() -> (ServiceWriter, Arc<MockProviderStore>) {
        let store = Arc::new(MockProviderStore::new());
        (ServiceWriter::new(store.clone()), store)
    }

    fn support() -> NewService {
        NewService {
            name: "Support".into(),
            value_per_hour_usd: "45.50".into(),
        }
    }

    async fn seed_two_countries(store: &MockProviderStore) -> Vec<CountryId> {
        store
            .seed_countries(vec![
                NewCountry {
                    iso_code: "COL".into(),
                    name: "Colombia".into(),
                    flag_url: "https://flagcdn.com/w320/co.png".into(),
                },
                NewCountry {
                    iso_code: "PER".into(),
                    name: "Perú".into(),
                    flag_url: "https://flagcdn.com/w320/pe.png".into(),
                },
            ])
            .await
    }

    #[tokio::test]
    async fn create_commits_a_service_row() {
        let (writer, store) = writer();
        let id = writer.create(support()).await.unwrap();
        assert!(id.is_assigned());
        let services = store.services().await;
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].id, id);
    }

    #[tokio::test]
    async fn update_of_missing_service_is_not_found() {
        let (writer, store) = writer();
        let update = ServiceUpdate {
            id: ServiceId::new(12),
            name: "Support".into(),
            value_per_hour_usd: "1".into(),
            countries: vec![],
        };
        let outcome = writer.update(update).await.unwrap();
        assert_eq!(outcome, WriteOutcome::not_found("service", 12));
        assert_eq!(store.staged_ops().await, 0);
    }

    #[tokio::test]
    async fn update_with_identical_data_reports_no_changes() {
        let (writer, store) = writer();
        let countries = seed_two_countries(&store).await;
        let id = writer.create(support()).await.unwrap();
        let update = ServiceUpdate {
            id,
            name: "Support".into(),
            value_per_hour_usd: "45.50".into(),
            countries: vec![countries[0]],
        };
        assert!(writer.update(update.clone()).await.unwrap().is_applied());

        let outcome = writer.update(update).await.unwrap();
        assert_eq!(outcome, WriteOutcome::no_changes("service", id.value()));
    }

    #[tokio::test]
    async fn update_collapses_repeated_country_ids() {
        let (writer, store) = writer();
        let countries = seed_two_countries(&store).await;
        let id = writer.create(support()).await.unwrap();

        let update = ServiceUpdate {
            id,
            name: "Support".into(),
            value_per_hour_usd: "45.50".into(),
            countries: vec![countries[0], countries[0], countries[1]],
        };
        assert!(writer.update(update).await.unwrap().is_applied());
        let links = store.country_links().await;
        assert_eq!(links.len(), 2);

        // Repeating an already-linked country is not a change either
        let again = ServiceUpdate {
            id,
            name: "Support".into(),
            value_per_hour_usd: "45.50".into(),
            countries: vec![countries[0], countries[0], countries[1]],
        };
        let outcome = writer.update(again).await.unwrap();
        assert_eq!(outcome, WriteOutcome::no_changes("service", id.value()));
        assert_eq!(store.country_links().await.len(), 2);
    }

    #[tokio::test]
    async fn update_reconciles_country_links() {
        let (writer, store) = writer();
        let countries = seed_two_countries(&store).await;
        let id = writer.create(support()).await.unwrap();

        let first = ServiceUpdate {
            id,
            name: "Support".into(),
            value_per_hour_usd: "45.50".into(),
            countries: vec![countries[0]],
        };
        assert!(writer.update(first).await.unwrap().is_applied());
        let kept_link = store.country_links().await[0].clone();

        // Keep the first country, add the second
        let second = ServiceUpdate {
            id,
            name: "Support".into(),
            value_per_hour_usd: "45.50".into(),
            countries: countries.clone(),
        };
        assert!(writer.update(second).await.unwrap().is_applied());
        let links = store.country_links().await;
        assert_eq!(links.len(), 2);
        // The kept association did not churn its row
        assert!(links.contains(&kept_link));

        // Replace the whole set with only the second country
        let third = ServiceUpdate {
            id,
            name: "Support".into(),
            value_per_hour_usd: "60".into(),
            countries: vec![countries[1]],
        };
        assert!(writer.update(third).await.unwrap().is_applied());
        let links = store.country_links().await;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].country_id, countries[1]);
        assert_eq!(store.services().await[0].value_per_hour_usd, "60");
    }

    #[tokio::test]
    async fn update_rejects_countries_missing_from_the_catalog() {
        let (writer, store) = writer();
        let id = writer.create(support()).await.unwrap();
        let update = ServiceUpdate {
            id,
            name: "Support".into(),
            value_per_hour_usd: "45.50".into(),
            countries: vec![CountryId::new(404)],
        };
        let err = writer.update(update).await.unwrap_err();
        assert!(matches!(err, ProviderError::Store(_)));
        assert!(store.country_links().await.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_country_and_provider_links() {
        let (writer, store) = writer();
        let countries = seed_two_countries(&store).await;
        let id = writer.create(support()).await.unwrap();
        writer
            .update(ServiceUpdate {
                id,
                name: "Support".into(),
                value_per_hour_usd: "45.50".into(),
                countries,
            })
            .await
            .unwrap();

        // A provider offering this service, linked directly through the store
        let provider = store
            .insert_provider(NewProvider {
                nit: "1".into(),
                name: "Acme".into(),
                email: "a@b.co".into(),
            })
            .await
            .unwrap();
        store
            .add_provider_link(NewProviderServiceLink {
                provider_id: provider,
                service_id: id,
            })
            .await
            .unwrap();
        store.commit().await.unwrap();

        let outcome = writer.delete(id).await.unwrap();
        assert!(outcome.is_applied());
        assert!(store.services().await.is_empty());
        assert!(store.country_links().await.is_empty());
        assert!(store.provider_links().await.is_empty());
        assert_eq!(store.providers().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_of_missing_service_is_not_found() {
        let (writer, _) = writer();
        let outcome = writer.delete(ServiceId::new(5)).await.unwrap();
        assert!(outcome.is_not_found());
    }

    #[tokio::test]
    async fn services_by_country_groups_under_the_country_name() {
        let (writer, store) = writer();
        let countries = seed_two_countries(&store).await;
        let support = writer.create(support()).await.unwrap();
        let audit = writer
            .create(NewService {
                name: "Auditing".into(),
                value_per_hour_usd: "80".into(),
            })
            .await
            .unwrap();

        for id in [support, audit] {
            writer
                .update(ServiceUpdate {
                    id,
                    name: store.services().await.iter().find(|s| s.id == id).unwrap().name.clone(),
                    value_per_hour_usd: store
                        .services()
                        .await
                        .iter()
                        .find(|s| s.id == id)
                        .unwrap()
                        .value_per_hour_usd
                        .clone(),
                    countries: vec![countries[0]],
                })
                .await
                .unwrap();
        }

        let grouped = writer.services_by_country("COL").await.unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].country_name, "Colombia");
        assert_eq!(grouped[0].services.len(), 2);

        let empty = writer.services_by_country("BRA").await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn services_by_provider_name_matches_on_substring() {
        let (writer, store) = writer();
        let service = writer.create(support()).await.unwrap();
        let provider = store
            .insert_provider(NewProvider {
                nit: "900123".into(),
                name: "Acme Consulting".into(),
                email: "ops@acme.co".into(),
            })
            .await
            .unwrap();
        store
            .add_provider_link(NewProviderServiceLink {
                provider_id: provider,
                service_id: service,
            })
            .await
            .unwrap();
        store.commit().await.unwrap();

        let rows = writer.services_by_provider_name("Acme").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].provider_nit, "900123");
        assert_eq!(rows[0].service_name, "Support");

        assert!(writer
            .services_by_provider_name("Globex")
            .await
            .unwrap()
            .is_empty());
    }
}
